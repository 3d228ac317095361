//! Centralized error types for the dashboard.
//!
//! Every failure the dashboard can hit falls into one of four buckets:
//! a missing file, a JSON decode failure, a network failure, or anything
//! else. Each bucket degrades to a default or previous value at the call
//! site; these types carry enough context for the log line and for the
//! message shown to the user.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` for text that ends up in an HTTP body or on screen.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config store error: {0}")]
    ConfigStore(#[from] ConfigStoreError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a short message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::ConfigStore(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Render(_) => "The display could not be updated.",
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Errors reading or writing the persisted config document.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode config document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigStoreError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigStoreError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigStoreError::Decode { .. } => "Configuration file is malformed. Using defaults.",
            ConfigStoreError::Encode(_) => "Configuration could not be saved.",
            ConfigStoreError::Io { .. } => "Configuration file could not be accessed.",
        }
    }

    /// Wrap an IO error, mapping `NotFound` to its own variant.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigStoreError::NotFound(path)
        } else {
            ConfigStoreError::Io { path, source }
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out.",
            NetworkError::ServerError { status, .. } if *status == 401 => {
                "Weather API key is invalid. Check settings."
            }
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues."
            }
            NetworkError::ServerError { .. } => "The weather request failed.",
            NetworkError::InvalidResponse(_) => "Received an unexpected response.",
        }
    }
}

/// Weather client errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// The payload decoded as JSON but lacks a field the dashboard needs.
    #[error("Unexpected weather schema: {0}")]
    UnexpectedSchema(String),

    #[error("Icon decode failed: {0}")]
    Image(String),

    #[error("No API key configured")]
    MissingApiKey,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(e) => e.user_message(),
            WeatherError::UnexpectedSchema(_) => "The weather service changed its response format.",
            WeatherError::Image(_) => "Weather icon unavailable.",
            WeatherError::MissingApiKey => "No weather API key configured.",
        }
    }
}

/// Drawing and frame output errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Text rendering failed: {0}")]
    Font(String),

    #[error("Frame output failed: {0}")]
    Sink(String),
}

impl From<std::convert::Infallible> for RenderError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        WeatherError::Network(e.into_network_error())
    }
}
