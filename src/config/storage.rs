//! Persistence location configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Locations of the JSON state files.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the state files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn subscriptions_path(&self) -> PathBuf {
        self.data_dir.join("subscriptions.json")
    }

    pub fn cooldowns_path(&self) -> PathBuf {
        self.data_dir.join("cooldowns.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
