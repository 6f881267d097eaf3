use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};

/// Engine configuration from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Local store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Remote sync configuration.
    #[serde(default)]
    pub sync: SyncConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))
    }
}

/// Local store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database holding blobs and metadata.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/shelf.db")
}

/// Remote sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Whether imports mirror book bytes to the remote blob area.
    #[serde(default = "default_upload_enabled")]
    pub upload_enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            upload_enabled: default_upload_enabled(),
        }
    }
}

fn default_upload_enabled() -> bool {
    true
}
