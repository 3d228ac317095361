use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// A single validation finding
#[derive(Debug, Clone)]
pub struct SettingsValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for SettingsValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of settings validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<SettingsValidationError>,
    pub warnings: Vec<SettingsValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(SettingsValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(SettingsValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Runtime settings for the dashboard process itself.
///
/// This is distinct from the config document edited over HTTP: settings
/// decide where things live and how often they run, the document holds the
/// user's API key, coordinates and tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path of the JSON config document
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Companion HTML page served at `/`
    #[serde(default = "default_index_page")]
    pub index_page: PathBuf,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub weather: WeatherSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_index_page() -> PathBuf {
    PathBuf::from("index.html")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerSettings {
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// Base URL of the current-weather API
    pub api_base_url: String,

    /// Base URL the icon bitmaps are served from
    pub icon_base_url: String,

    /// Seconds between scheduled refreshes
    pub refresh_seconds: u64,

    /// Per-request timeout
    pub request_timeout_seconds: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openweathermap.org".to_string(),
            icon_base_url: "https://openweathermap.org".to_string(),
            refresh_seconds: 300,
            request_timeout_seconds: 10,
        }
    }
}

/// Where rendered frames go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Headless,
    #[default]
    Png,
    Framebuffer,
    Window,
}

/// Pixel layout of a Linux framebuffer device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FramebufferFormat {
    #[default]
    Rgb565,
    Xrgb8888,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Label shown in the quote bar
    pub quote_text: String,

    /// Milliseconds between frames
    pub frame_interval_ms: u64,

    pub sink: SinkKind,

    pub png_path: PathBuf,

    pub framebuffer_device: PathBuf,

    pub framebuffer_format: FramebufferFormat,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            quote_text: "Home Dashboard".to_string(),
            frame_interval_ms: 1000,
            sink: SinkKind::default(),
            png_path: PathBuf::from("dashboard.png"),
            framebuffer_device: PathBuf::from("/dev/fb1"),
            framebuffer_format: FramebufferFormat::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            index_page: default_index_page(),
            server: ServerSettings::default(),
            weather: WeatherSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path)?;
            tracing::info!("Wrote default settings to {}", path.display());
            return Ok(settings);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        let settings: Settings =
            toml::from_str(&contents).context("Failed to parse settings file")?;

        Ok(settings)
    }

    /// Validate settings that may have been adjusted after loading
    /// (e.g. by command-line overrides).
    ///
    /// Warnings are logged; errors fail the load.
    pub fn into_validated(self) -> Result<(Self, ValidationResult)> {
        let validation = self.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Settings validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Settings warning: {}", warning);
        }

        Ok((self, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);
        self.validate_url(&self.weather.icon_base_url, "weather.icon_base_url", &mut result);

        if self.weather.refresh_seconds == 0 {
            result.add_error("weather.refresh_seconds", "Refresh interval must be greater than 0");
        } else if self.weather.refresh_seconds < 60 {
            result.add_warning(
                "weather.refresh_seconds",
                "Refreshing more than once a minute may exhaust the API quota",
            );
        }

        if self.weather.request_timeout_seconds == 0 {
            result.add_error(
                "weather.request_timeout_seconds",
                "Request timeout must be greater than 0",
            );
        }

        if self.display.frame_interval_ms == 0 {
            result.add_error("display.frame_interval_ms", "Frame interval must be greater than 0");
        }

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if self.display.quote_text.trim().is_empty() {
            result.add_warning("display.quote_text", "Quote bar will be blank");
        }

        if !self.index_page.exists() {
            result.add_warning(
                "index_page",
                format!("Page does not exist: {}", self.index_page.display()),
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create settings directory")?;
            }
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        std::fs::write(path, contents).context("Failed to write settings file")?;

        Ok(())
    }

    /// `<config dir>/homedash/settings.toml`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("homedash");

        Ok(config_dir.join("settings.toml"))
    }
}
