use std::path::PathBuf;
use std::sync::Arc;

use homedash_services::ConfigStore;
use homedash_weather::{IconCache, Location, WeatherSnapshot};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Everything the render loop and the HTTP service both touch.
///
/// Lives behind one mutex; never hold the guard across an `.await`.
#[derive(Debug)]
pub struct DashboardState {
    pub store: ConfigStore,
    pub weather: Option<WeatherSnapshot>,
    pub icons: IconCache,
}

pub type SharedDashboard = Arc<Mutex<DashboardState>>;

impl DashboardState {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            weather: None,
            icons: IconCache::new(),
        }
    }

    pub fn shared(self) -> SharedDashboard {
        Arc::new(Mutex::new(self))
    }

    /// Coordinates and key for a weather request, if a key is configured.
    pub fn weather_request(&self) -> Option<(Location, String)> {
        let doc = self.store.current();
        doc.has_api_key().then(|| {
            let (latitude, longitude) = doc.weather_location();
            (Location::new(latitude, longitude), doc.api_key.clone())
        })
    }

    /// Replace the snapshot on success; a failed fetch keeps the old one.
    pub fn apply_weather(&mut self, snapshot: Option<WeatherSnapshot>) {
        if let Some(snapshot) = snapshot {
            self.weather = Some(snapshot);
        }
    }

    pub fn clear_weather(&mut self) {
        self.weather = None;
        self.icons.clear();
    }
}

/// Axum state for the config routes.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dashboard: SharedDashboard,
    /// Wakes the render loop after a config write.
    pub refresh: Arc<Notify>,
    pub index_page: Arc<PathBuf>,
}

impl AppState {
    pub fn new(dashboard: SharedDashboard, refresh: Arc<Notify>, index_page: PathBuf) -> Self {
        Self {
            dashboard,
            refresh,
            index_page: Arc::new(index_page),
        }
    }
}
