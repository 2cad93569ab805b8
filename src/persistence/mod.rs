//! Saved settings files
//!
//! A settings file is the flat configuration object plus an optional `name`
//! and `timestamp`. Loading goes through the same field-by-field merge as
//! live configuration changes, so partial files and files written by older
//! versions (missing or extra keys) still load.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::settings::{Config, ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form, typically ISO 8601 as written by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub config: Config,
}

impl SettingsSnapshot {
    pub fn new(config: Config) -> Self {
        Self {
            name: None,
            timestamp: None,
            config,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a settings file. Keys missing from the file keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(map) = value else {
            return Err(ConfigError::NotAnObject);
        };

        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_owned);
        let name = text("name");
        let timestamp = text("timestamp");

        let mut config = Config::default();
        config.merge_patch(&map);
        log::info!(
            "Loaded settings '{}'",
            name.as_deref().unwrap_or("unnamed")
        );

        Ok(Self {
            name,
            timestamp,
            config,
        })
    }
}
