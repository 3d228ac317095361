use chrono::{DateTime, Utc};
use homedash_core::WeatherError;
use serde::{Deserialize, Serialize};

/// Side length of the icon bitmap drawn on the weather tile.
pub const ICON_SIZE: u32 = 100;

const KELVIN_OFFSET: f64 = 273.15;

/// Geographic location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Current conditions as shown on the weather tile.
///
/// Only ever built from a complete response, so every field is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Degrees Celsius, rounded to one decimal
    pub temperature_c: f64,
    pub description: String,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Provider icon code, e.g. `10d`
    pub icon_id: String,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn temperature_label(&self) -> String {
        format!("{:.1}°C", self.temperature_c)
    }

    pub fn humidity_label(&self) -> String {
        format!("Humidity: {}%", self.humidity)
    }
}

/// Convert Kelvin to Celsius rounded to one decimal place.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    ((kelvin - KELVIN_OFFSET) * 10.0).round() / 10.0
}

/// Raw `/data/2.5/weather` payload.
///
/// Every field is optional so a schema change surfaces as
/// `WeatherError::UnexpectedSchema` instead of a decode failure.
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentWeatherResponse {
    main: Option<MainReadings>,
    #[serde(default)]
    weather: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    description: Option<String>,
    icon: Option<String>,
}

impl CurrentWeatherResponse {
    pub(crate) fn into_snapshot(
        self,
        fetched_at: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let main = self
            .main
            .ok_or_else(|| WeatherError::UnexpectedSchema("missing `main`".into()))?;
        let temp = main
            .temp
            .ok_or_else(|| WeatherError::UnexpectedSchema("missing `main.temp`".into()))?;
        let humidity = main
            .humidity
            .ok_or_else(|| WeatherError::UnexpectedSchema("missing `main.humidity`".into()))?;

        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::UnexpectedSchema("empty `weather` list".into()))?;
        let description = condition.description.ok_or_else(|| {
            WeatherError::UnexpectedSchema("missing `weather[0].description`".into())
        })?;
        let icon_id = condition
            .icon
            .ok_or_else(|| WeatherError::UnexpectedSchema("missing `weather[0].icon`".into()))?;

        Ok(WeatherSnapshot {
            temperature_c: kelvin_to_celsius(temp),
            description,
            humidity: humidity.round().clamp(0.0, 100.0) as u8,
            icon_id,
            fetched_at,
        })
    }
}

/// Decoded condition icon, RGBA8, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherIcon {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl WeatherIcon {
    /// Decode PNG bytes and scale them to `ICON_SIZE` square.
    pub fn from_png(id: impl Into<String>, bytes: &[u8]) -> Result<Self, WeatherError> {
        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| WeatherError::Image(e.to_string()))?;
        let scaled = decoded
            .resize_exact(ICON_SIZE, ICON_SIZE, image::imageops::FilterType::Triangle)
            .to_rgba8();

        Ok(Self {
            id: id.into(),
            width: scaled.width(),
            height: scaled.height(),
            pixels: scaled.into_raw(),
        })
    }

    /// RGBA value at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
