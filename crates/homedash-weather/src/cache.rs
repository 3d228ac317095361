//! Last decoded weather icon, keyed by icon code.

use crate::types::WeatherIcon;

#[derive(Debug, Default)]
pub struct IconCache {
    icon: Option<WeatherIcon>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached icon if it matches `icon_id`.
    pub fn get(&self, icon_id: &str) -> Option<&WeatherIcon> {
        self.icon.as_ref().filter(|icon| icon.id == icon_id)
    }

    /// Whether `icon_id` has to be downloaded.
    pub fn needs_fetch(&self, icon_id: &str) -> bool {
        self.get(icon_id).is_none()
    }

    pub fn store(&mut self, icon: WeatherIcon) {
        tracing::debug!("Caching weather icon {}", icon.id);
        self.icon = Some(icon);
    }

    pub fn clear(&mut self) {
        self.icon = None;
    }
}
