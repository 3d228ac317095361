pub mod error;
pub mod settings;

pub use error::{AppError, ConfigStoreError, NetworkError, RenderError, WeatherError};
pub use settings::{
    DisplaySettings, FramebufferFormat, ServerSettings, Settings, SinkKind, ValidationResult,
    WeatherSettings,
};

use anyhow::Result;

/// Initialize logging for the dashboard process.
///
/// Honours `RUST_LOG`; defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("homedash core initialized");
    Ok(())
}
