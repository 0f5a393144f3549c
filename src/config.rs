//! Client Configuration
//!
//! Loaded from a JSON file next to the app data; every field has a default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{SyncError, SyncResult};
use crate::sync::{DEFAULT_HISTORY_SLOT, DEFAULT_QUEUE_SLOT};

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "WALK_SYNC_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub health_check_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub store_path: PathBuf,
    pub queue_slot: String,
    pub history_slot: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            health_check_interval_secs: 30,
            request_timeout_secs: 10,
            store_path: PathBuf::from("walk_sync.db"),
            queue_slot: DEFAULT_QUEUE_SLOT.to_string(),
            history_slot: DEFAULT_HISTORY_SLOT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> SyncResult<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                SyncError::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                SyncError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                config.api_base_url = url;
            }
        }

        Ok(config)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
