//! Runtime settings consulted for debug-mode overrides.
//!
//! Settings are plain JSON values keyed by name. Components only read them;
//! nothing here is persisted.

use crate::error::{Result, ScrollcastError};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Read access to runtime settings.
pub trait SettingsStore: Send + Sync {
    /// Integer value stored under `key`, if present and integral.
    fn get_integer(&self, key: &str) -> Option<i64>;
}

/// In-memory settings store.
///
/// Values may be changed at any time; readers observe the latest value on
/// their next read.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, Value>>,
}

impl MemorySettings {
    /// Create an empty settings store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        debug!(%key, %value, "Setting changed");
        self.values.write().insert(key, value);
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.write().remove(key)
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    /// Non-negative integer stored under `key`.
    ///
    /// Missing keys yield `Ok(None)`; any other kind of value is rejected.
    pub fn get_unsigned(&self, key: &str) -> Result<Option<u64>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| ScrollcastError::InvalidSetting {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
        }
    }

    /// Number of stored settings.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether no settings are stored.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Build a store from a JSON object (`{"key": value, ...}`).
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: Value = serde_json::from_slice(data)
            .map_err(|e| ScrollcastError::Serialization(format!("Invalid JSON: {}", e)))?;

        let Value::Object(map) = raw else {
            return Err(ScrollcastError::Serialization(
                "Settings must be a JSON object".into(),
            ));
        };

        Ok(Self {
            values: RwLock::new(map.into_iter().collect()),
        })
    }

    /// Load settings from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

impl SettingsStore for MemorySettings {
    fn get_integer(&self, key: &str) -> Option<i64> {
        self.values.read().get(key).and_then(Value::as_i64)
    }
}
