//! Local storage configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where files live on disk
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON snapshot of the last extracted receipt
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Directory receiving uploaded images
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// Directory with `index.html` and other static assets
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            uploads_dir: default_uploads_dir(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("last_result.json")
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}
