//! Weather service for the dashboard
//!
//! Fetches current conditions from the OpenWeatherMap API and decodes the
//! condition icon for display.

pub mod cache;
pub mod provider;
pub mod types;

pub use cache::IconCache;
pub use provider::WeatherProvider;
pub use types::*;
