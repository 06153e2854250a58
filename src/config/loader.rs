//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config::schema::ConfigMap;

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in config file {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The file parsed, but its root is not a key/value mapping.
    #[error("config file {} must contain an object at its root", .path.display())]
    NotAnObject { path: PathBuf },
}

impl ConfigError {
    /// Path of the offending config file.
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::NotFound { path }
            | ConfigError::Read { path, .. }
            | ConfigError::Json { path, .. }
            | ConfigError::Toml { path, .. }
            | ConfigError::NotAnObject { path } => path,
        }
    }
}

/// Load a config file. `.toml` files are parsed as TOML, anything else as JSON.
pub fn load_config(path: &Path) -> Result<ConfigMap, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = if is_toml(path) {
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    match value {
        Value::Object(map) => Ok(ConfigMap::from(map)),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}
