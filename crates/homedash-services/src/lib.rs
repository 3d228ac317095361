pub mod config_store;
pub mod document;

pub use config_store::ConfigStore;
pub use document::{ConfigDocument, ConfigUpdate, Task};
