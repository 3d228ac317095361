mod cli;
mod runner;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use homedash_server::{AppState, DashboardState};
use homedash_services::ConfigStore;
use homedash_weather::WeatherProvider;
use tokio::sync::Notify;

use crate::cli::Cli;
use crate::runner::Runner;

#[tokio::main]
async fn main() -> Result<()> {
    homedash_core::init()?;

    let cli = Cli::parse();
    let settings = cli.load_settings()?;

    let mut store = ConfigStore::new(&settings.data_file);
    if !store.load() {
        tracing::info!("No usable config at {} yet", store.path().display());
    }
    let dashboard = DashboardState::new(store).shared();
    let refresh = Arc::new(Notify::new());

    let provider =
        WeatherProvider::new(&settings.weather).context("Failed to build weather client")?;
    let sink = homedash_ui::open_sink(&settings.display).context("Failed to open display")?;

    let listener = homedash_server::bind(&settings.server).await?;
    let app_state = AppState::new(
        Arc::clone(&dashboard),
        Arc::clone(&refresh),
        settings.index_page.clone(),
    );
    tokio::spawn(async move {
        if let Err(e) = homedash_server::serve(listener, app_state).await {
            tracing::error!("Config service stopped: {}", e);
        }
    });

    let runner = Runner::new(&settings, dashboard, provider, refresh, sink);
    if !runner.update_weather().await {
        tracing::info!("API key not found on initial load. Waiting for update.");
    }

    tracing::info!("homedash started");
    runner.run().await?;
    tracing::info!("homedash stopped");
    Ok(())
}
