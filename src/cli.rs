use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use homedash_core::Settings;

/// Small-screen home dashboard with clock, weather, to-do list and a
/// config endpoint on the local network.
#[derive(Debug, Parser)]
#[command(name = "homedash", version)]
pub struct Cli {
    /// Settings file (TOML). Created with defaults if missing.
    #[arg(long, env = "HOMEDASH_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// JSON config document, overriding `data_file` from the settings.
    #[arg(long, env = "HOMEDASH_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Port for the config service, overriding `server.port`.
    #[arg(long, env = "HOMEDASH_PORT")]
    pub port: Option<u16>,
}

impl Cli {
    /// Load settings and apply command-line overrides, then validate.
    pub fn load_settings(&self) -> Result<Settings> {
        let path = match &self.settings {
            Some(path) => path.clone(),
            None => Settings::default_path()?,
        };

        let mut settings = Settings::load_from(&path)?;
        self.apply_overrides(&mut settings);

        let (settings, _) = settings.into_validated()?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(data_file) = &self.data_file {
            settings.data_file = data_file.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
    }
}
