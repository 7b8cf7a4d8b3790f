//! Reference data storage configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where moderator and channel lists live
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the reference-data JSON files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
