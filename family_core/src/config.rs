//! Store configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Limits and tuning knobs of the save store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of named saves.
    pub max_saves: usize,

    /// Maximum byte length of the serialized save map, before encoding.
    pub max_payload_bytes: usize,

    /// Version stamped on every record and checked on the auto-save slot.
    pub schema_version: String,

    /// Quiet period before a scheduled auto-save is written.
    pub autosave_debounce_ms: u64,

    /// Longest accepted save name.
    pub name_max_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_saves: 50,
            max_payload_bytes: 1024 * 1024,
            schema_version: "1.0.0".to_string(),
            autosave_debounce_ms: 2000,
            name_max_length: 50,
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The auto-save debounce window.
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}
