//! The persisted config document and partial updates to it.
//!
//! On disk the document is a JSON object with exactly four keys:
//! `apiKey`, `latitude`, `longitude` and `tasks`. Each key decodes on its
//! own: a missing or mistyped key takes its default and the rest of the
//! document survives, so a hand-edited file still loads.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single to-do entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub task_text: String,
    pub is_checked: bool,
}

impl Task {
    pub fn new(task_text: impl Into<String>, is_checked: bool) -> Self {
        Self {
            task_text: task_text.into(),
            is_checked,
        }
    }
}

/// The user-editable configuration: API key, coordinates and tasks.
///
/// Deserializes from any JSON object through [`ConfigDocument::from_object`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct ConfigDocument {
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub tasks: Vec<Task>,
}

impl From<Map<String, Value>> for ConfigDocument {
    fn from(object: Map<String, Value>) -> Self {
        Self::from_object(&object)
    }
}

impl ConfigDocument {
    /// The stored object with the four keys checked. Well-typed values and
    /// unknown keys pass through untouched; anything else is replaced by
    /// its decoded value.
    pub fn normalize_object(mut object: Map<String, Value>) -> Map<String, Value> {
        let document = Self::from_object(&object);
        let tasks = document
            .tasks
            .iter()
            .map(|t| serde_json::json!({"taskText": t.task_text, "isChecked": t.is_checked}))
            .collect();
        let decoded = [
            ("apiKey", Value::from(document.api_key)),
            ("latitude", Value::from(document.latitude)),
            ("longitude", Value::from(document.longitude)),
            ("tasks", Value::Array(tasks)),
        ];

        for (key, value) in decoded {
            if !object.get(key).is_some_and(|raw| well_typed(key, raw)) {
                object.insert(key.to_string(), value);
            }
        }
        object
    }

    /// Decode each key independently, defaulting only the ones that fail.
    ///
    /// A task entry without text is dropped; the other entries are kept.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: field(object, "apiKey", |v| v.as_str().map(str::to_string))
                .unwrap_or(defaults.api_key),
            latitude: field(object, "latitude", coordinate_value).unwrap_or(defaults.latitude),
            longitude: field(object, "longitude", coordinate_value)
                .unwrap_or(defaults.longitude),
            tasks: field(object, "tasks", tasks_value).unwrap_or(defaults.tasks),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// `(latitude, longitude)` for the weather request.
    pub fn weather_location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Merge `update` over this document; absent fields keep their value.
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(api_key) = update.api_key {
            self.api_key = api_key;
        }
        if let Some(latitude) = update.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = update.longitude {
            self.longitude = longitude;
        }
        if let Some(tasks) = update.tasks {
            self.tasks = tasks;
        }
    }

    /// Serialize with four-space indentation.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Caller-supplied fields to merge over the persisted document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default, deserialize_with = "optional_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "optional_coordinate")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.api_key.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.tasks.is_none()
    }
}

/// Coordinates arrive as numbers from JSON clients and as strings from
/// HTML forms; both are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid coordinate: {:?}", s))),
        }
    }
}

fn field<T>(object: &Map<String, Value>, key: &str, decode: fn(&Value) -> Option<T>) -> Option<T> {
    let value = object.get(key)?;
    let decoded = decode(value);
    if decoded.is_none() {
        tracing::warn!("Ignoring malformed {} in config: {}", key, value);
    }
    decoded
}

fn well_typed(key: &str, raw: &Value) -> bool {
    match key {
        "apiKey" => raw.is_string(),
        "latitude" | "longitude" => raw.is_number(),
        "tasks" => raw.as_array().is_some_and(|entries| {
            entries.iter().all(|entry| {
                entry.get("taskText").is_some_and(Value::is_string)
                    && entry.get("isChecked").is_some_and(Value::is_boolean)
            })
        }),
        _ => true,
    }
}

fn coordinate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn tasks_value(value: &Value) -> Option<Vec<Task>> {
    let entries = value.as_array()?;
    let tasks = entries
        .iter()
        .filter_map(|entry| {
            let task = task_value(entry);
            if task.is_none() {
                tracing::warn!("Dropping malformed task in config: {}", entry);
            }
            task
        })
        .collect();
    Some(tasks)
}

/// A task needs its text; a mistyped `isChecked` reads as unchecked.
fn task_value(value: &Value) -> Option<Task> {
    let object = value.as_object()?;
    let task_text = object.get("taskText")?.as_str()?;
    let is_checked = object
        .get("isChecked")
        .and_then(Value::as_bool)
        .unwrap_or_default();
    Some(Task::new(task_text, is_checked))
}

fn optional_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_f64)
        .transpose()
}
