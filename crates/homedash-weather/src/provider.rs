//! OpenWeatherMap current-weather client.

use std::time::Duration;

use chrono::Utc;
use homedash_core::error::ReqwestErrorExt;
use homedash_core::{NetworkError, WeatherError, WeatherSettings};
use reqwest::Client;
use tracing::instrument;

use crate::types::{CurrentWeatherResponse, Location, WeatherIcon, WeatherSnapshot};

const USER_AGENT: &str = concat!("homedash/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    api_base_url: String,
    icon_base_url: String,
}

impl WeatherProvider {
    pub fn new(settings: &WeatherSettings) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            icon_base_url: settings.icon_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current conditions for `location`. One attempt, no retry.
    #[instrument(skip(self, api_key), level = "info")]
    pub async fn fetch(
        &self,
        location: Location,
        api_key: &str,
    ) -> Result<WeatherSnapshot, WeatherError> {
        if api_key.trim().is_empty() {
            return Err(WeatherError::MissingApiKey);
        }

        let url = format!("{}/data/2.5/weather", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("APPID", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: CurrentWeatherResponse = response
            .json()
            .await
            .map_err(|e| e.into_network_error())?;
        let snapshot = body.into_snapshot(Utc::now())?;

        tracing::info!(
            "Weather updated: {} {}",
            snapshot.temperature_label(),
            snapshot.description
        );
        Ok(snapshot)
    }

    /// `fetch()` with the failure logged; the caller keeps what it had.
    pub async fn fetch_or_log(&self, location: Location, api_key: &str) -> Option<WeatherSnapshot> {
        match self.fetch(location, api_key).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Failed to fetch weather data: {}. {}", e, e.user_message());
                None
            }
        }
    }

    /// Download and decode the bitmap for an icon code such as `10d`.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_icon(&self, icon_id: &str) -> Result<WeatherIcon, WeatherError> {
        let url = format!("{}/img/wn/{}@2x.png", self.icon_base_url, icon_id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message: format!("icon {} unavailable", icon_id),
            }
            .into());
        }

        let bytes = response.bytes().await?;
        WeatherIcon::from_png(icon_id, &bytes)
    }
}
