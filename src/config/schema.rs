//! Shape of a loaded configuration.
//!
//! The skeleton does not impose a schema: a config file is any JSON object or
//! TOML table, and each routine reads the keys it cares about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String keys mapped to arbitrary values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ConfigMap(Map<String, Value>);

impl ConfigMap {
    /// Create an empty config (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string value. Non-string values yield `None`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ConfigMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
