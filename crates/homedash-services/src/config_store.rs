//! File-backed config store.
//!
//! Keeps an in-memory mirror of the config document and reloads it only
//! when the file's modification time moves past the last successful load.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use homedash_core::ConfigStoreError;
use serde_json::{Map, Value};

use crate::document::{ConfigDocument, ConfigUpdate};

/// JSON config document on disk plus its in-memory mirror.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: ConfigDocument,
    last_modified: Option<SystemTime>,
}

impl ConfigStore {
    /// Create a store for `path`. Nothing is read until `load()`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: ConfigDocument::default(),
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory mirror as of the last successful load or write.
    pub fn current(&self) -> &ConfigDocument {
        &self.current
    }

    pub fn has_api_key(&self) -> bool {
        self.current.has_api_key()
    }

    /// Reload the document if the file changed since the last load.
    ///
    /// Returns whether a reload happened. Failures are logged and leave the
    /// previous values in place.
    pub fn load(&mut self) -> bool {
        match self.try_load() {
            Ok(reloaded) => reloaded,
            Err(ConfigStoreError::NotFound(path)) => {
                tracing::debug!("{} not found, keeping current configuration", path.display());
                false
            }
            Err(e) => {
                tracing::error!("Error loading config: {}", e);
                false
            }
        }
    }

    /// `load()` with the failure surfaced.
    pub fn try_load(&mut self) -> Result<bool, ConfigStoreError> {
        let modified = modified_time(&self.path)?;

        if self.last_modified.is_some_and(|last| modified <= last) {
            return Ok(false);
        }

        tracing::info!("{} has been updated, reloading", self.path.display());
        let document = read_document(&self.path)?;

        self.current = document;
        self.last_modified = Some(modified);
        Ok(true)
    }

    /// Read the file fresh, ignoring the in-memory mirror.
    ///
    /// Returns the default document when the file is absent or not a JSON
    /// object. Mistyped keys default one by one.
    pub fn read_persisted(&self) -> ConfigDocument {
        ConfigDocument::from_object(&self.read_object())
    }

    /// The persisted object as stored, for handing back to clients.
    ///
    /// Unknown keys and well-typed values come back verbatim; missing or
    /// mistyped keys are filled in as `read_persisted` would decode them.
    pub fn read_persisted_json(&self) -> Value {
        Value::Object(ConfigDocument::normalize_object(self.read_object()))
    }

    fn read_object(&self) -> Map<String, Value> {
        match read_object(&self.path) {
            Ok(object) => object,
            Err(ConfigStoreError::NotFound(path)) => {
                tracing::warn!("{} not found, returning empty config", path.display());
                Map::new()
            }
            Err(e) => {
                tracing::error!("{}. Returning empty config", e);
                Map::new()
            }
        }
    }

    /// Merge `update` over the persisted document and write it back.
    ///
    /// The mirror and tracked modification time are updated so the next
    /// `load()` does not re-read what was just written.
    pub fn write(&mut self, update: ConfigUpdate) -> Result<ConfigDocument, ConfigStoreError> {
        let mut document = self.read_persisted();
        document.apply(update);

        let bytes = document.to_pretty_json().map_err(ConfigStoreError::Encode)?;
        write_atomically(&self.path, &bytes)?;

        self.last_modified = modified_time(&self.path).ok();
        self.current = document.clone();

        tracing::info!("Wrote configuration to {}", self.path.display());
        Ok(document)
    }
}

fn modified_time(path: &Path) -> Result<SystemTime, ConfigStoreError> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| ConfigStoreError::from_io(path, e))
}

fn read_object(path: &Path) -> Result<Map<String, Value>, ConfigStoreError> {
    let contents = fs::read(path).map_err(|e| ConfigStoreError::from_io(path, e))?;
    serde_json::from_slice(&contents).map_err(|source| ConfigStoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn read_document(path: &Path) -> Result<ConfigDocument, ConfigStoreError> {
    read_object(path).map(|object| ConfigDocument::from_object(&object))
}

/// Write to a sibling temp file and rename over the target so readers never
/// observe a half-written document.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ConfigStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ConfigStoreError::from_io(parent, e))?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, bytes).map_err(|e| ConfigStoreError::from_io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| ConfigStoreError::from_io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Task;
    use std::time::Duration;

    fn bump_mtime(path: &Path) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();
    }

    #[test]
    fn test_load_missing_file_is_no_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::new(dir.path().join("config.json"));

        assert!(!store.load());
        assert_eq!(store.current(), &ConfigDocument::default());
    }

    #[test]
    fn test_load_reads_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"apiKey": "k", "latitude": 1.5, "longitude": 2.5, "tasks": []}"#)
            .unwrap();
        let mut store = ConfigStore::new(&path);

        assert!(store.load());
        assert_eq!(store.current().api_key, "k");
        assert!(!store.load(), "unchanged file must not reload");
    }

    #[test]
    fn test_load_picks_up_newer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"apiKey": "first"}"#).unwrap();
        let mut store = ConfigStore::new(&path);
        assert!(store.load());

        fs::write(&path, r#"{"apiKey": "second"}"#).unwrap();
        bump_mtime(&path);

        assert!(store.load());
        assert_eq!(store.current().api_key, "second");
    }

    #[test]
    fn test_malformed_file_keeps_previous_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"apiKey": "good"}"#).unwrap();
        let mut store = ConfigStore::new(&path);
        assert!(store.load());

        fs::write(&path, "{ not json").unwrap();
        bump_mtime(&path);

        assert!(!store.load());
        assert_eq!(store.current().api_key, "good");
        assert!(matches!(
            store.try_load(),
            Err(ConfigStoreError::Decode { .. })
        ));
    }

    #[test]
    fn test_write_does_not_trigger_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::new(dir.path().join("config.json"));

        store
            .write(ConfigUpdate {
                api_key: Some("k".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert!(!store.load());
        assert_eq!(store.current().api_key, "k");
    }

    #[test]
    fn test_write_merges_over_persisted_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"apiKey": "k", "latitude": 1.0, "longitude": 2.0, "tasks": [{"taskText": "a", "isChecked": true}]}"#,
        )
        .unwrap();
        let mut store = ConfigStore::new(&path);

        let written = store
            .write(ConfigUpdate {
                longitude: Some(-3.0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(written.api_key, "k");
        assert_eq!(written.latitude, 1.0);
        assert_eq!(written.longitude, -3.0);
        assert_eq!(written.tasks, vec![Task::new("a", true)]);
        assert_eq!(store.read_persisted(), written);
    }

    #[test]
    fn test_write_over_malformed_file_starts_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "garbage").unwrap();
        let mut store = ConfigStore::new(&path);

        let written = store
            .write(ConfigUpdate {
                api_key: Some("k".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(written.api_key, "k");
        assert_eq!(written.latitude, 0.0);
        assert!(written.tasks.is_empty());
    }

    #[test]
    fn test_mistyped_field_survives_load_and_partial_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"apiKey":"secret","latitude":40,"longitude":-75,"tasks":[{"taskText":"a","isChecked":"yes"}]}"#,
        )
        .unwrap();
        let mut store = ConfigStore::new(&path);

        assert!(store.load());
        assert_eq!(store.current().api_key, "secret");
        assert_eq!(store.current().weather_location(), (40.0, -75.0));
        assert_eq!(store.read_persisted().api_key, "secret");

        let written = store
            .write(ConfigUpdate {
                tasks: Some(vec![]),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(written.api_key, "secret");
        assert_eq!(written.latitude, 40.0);
        assert_eq!(written.longitude, -75.0);
        assert!(written.tasks.is_empty());
        assert_eq!(store.read_persisted(), written);
    }

    #[test]
    fn test_persisted_json_passes_stored_values_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"apiKey": "k", "latitude": 40, "extra": [1]}"#).unwrap();
        let store = ConfigStore::new(&path);

        let json = store.read_persisted_json();

        assert_eq!(json["latitude"], serde_json::json!(40));
        assert_eq!(json["extra"], serde_json::json!([1]));
        assert_eq!(json["longitude"], serde_json::json!(0.0));
        assert_eq!(json["tasks"], serde_json::json!([]));
    }

    #[test]
    fn test_persisted_json_without_file_is_default_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));

        assert_eq!(
            store.read_persisted_json(),
            serde_json::to_value(ConfigDocument::default()).unwrap()
        );
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::new(dir.path().join("config.json"));

        store.write(ConfigUpdate::default()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("config.json")]);
    }
}
