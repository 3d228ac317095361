//! The render/fetch loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use homedash_core::{AppError, RenderError, Settings};
use homedash_server::SharedDashboard;
use homedash_ui::{Canvas, Dashboard, FrameModel, FrameSink};
use homedash_weather::WeatherProvider;
use tokio::sync::Notify;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

pub struct Runner {
    dashboard: SharedDashboard,
    provider: WeatherProvider,
    refresh: Arc<Notify>,
    renderer: Dashboard,
    canvas: Canvas,
    sink: Box<dyn FrameSink>,
    quote: String,
    frame_interval: Duration,
    weather_interval: Duration,
}

impl Runner {
    pub fn new(
        settings: &Settings,
        dashboard: SharedDashboard,
        provider: WeatherProvider,
        refresh: Arc<Notify>,
        sink: Box<dyn FrameSink>,
    ) -> Self {
        Self {
            dashboard,
            provider,
            refresh,
            renderer: Dashboard::new(Local::now().naive_local()),
            canvas: Canvas::screen(),
            sink,
            quote: settings.display.quote_text.clone(),
            frame_interval: Duration::from_millis(settings.display.frame_interval_ms),
            weather_interval: Duration::from_secs(settings.weather.refresh_seconds),
        }
    }

    /// Fetch weather if a key is configured. Returns whether a fetch was attempted.
    pub async fn update_weather(&self) -> bool {
        let request = self.dashboard.lock().weather_request();
        let Some((location, api_key)) = request else {
            return false;
        };

        let snapshot = self.provider.fetch_or_log(location, &api_key).await;

        let icon_to_fetch = {
            let mut dashboard = self.dashboard.lock();
            if let (None, Some(stale)) = (&snapshot, &dashboard.weather) {
                tracing::info!(
                    "Keeping weather from {}",
                    stale.fetched_at.with_timezone(&Local).format("%H:%M")
                );
            }
            dashboard.apply_weather(snapshot);
            dashboard
                .weather
                .as_ref()
                .map(|w| w.icon_id.clone())
                .filter(|id| dashboard.icons.needs_fetch(id))
        };

        if let Some(icon_id) = icon_to_fetch {
            match self.provider.fetch_icon(&icon_id).await {
                Ok(icon) => self.dashboard.lock().icons.store(icon),
                Err(e) => log_failure(&format!("Weather icon {} unavailable", icon_id), e),
            }
        }
        true
    }

    /// React to a config write or reload: re-fetch, or drop stale weather
    /// when the key was removed.
    pub async fn on_config_changed(&self) {
        tracing::info!("Reloading configuration and data");
        if !self.update_weather().await {
            self.dashboard.lock().clear_weather();
        }
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        {
            let dashboard = self.dashboard.lock();
            let weather = dashboard.weather.as_ref();
            let model = FrameModel {
                now: Local::now().naive_local(),
                weather,
                icon: weather.and_then(|w| dashboard.icons.get(&w.icon_id)),
                tasks: &dashboard.store.current().tasks,
                quote: &self.quote,
            };
            let change = self.renderer.render(&mut self.canvas, &model)?;
            if change.clock {
                tracing::debug!("Clock now {}", self.renderer.clock().clock());
            }
        }
        self.sink.present(&self.canvas)
    }

    fn draw(&mut self) {
        if let Err(e) = self.render_frame() {
            log_failure("Frame dropped", e);
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut frame_tick = interval(self.frame_interval);
        frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut weather_tick =
            interval_at(Instant::now() + self.weather_interval, self.weather_interval);
        weather_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let refresh = Arc::clone(&self.refresh);
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                _ = refresh.notified() => {
                    self.on_config_changed().await;
                    weather_tick.reset();
                    self.draw();
                }
                _ = weather_tick.tick() => {
                    self.update_weather().await;
                }
                _ = frame_tick.tick() => {
                    let reloaded = self.dashboard.lock().store.load();
                    if reloaded {
                        self.on_config_changed().await;
                        weather_tick.reset();
                    }
                    self.draw();
                    if self.sink.poll_quit() {
                        tracing::info!("Display closed");
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

fn log_failure(context: &str, error: impl Into<AppError>) {
    let error = error.into();
    tracing::warn!("{}: {}. {}", context, error, error.user_message());
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
