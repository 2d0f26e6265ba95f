//! Local Upload Store Adapter - Implementation of UploadStore.
//!
//! Keeps each uploaded receipt image under the uploads directory using the
//! client's filename. A later upload with the same name replaces the earlier
//! file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{UploadError, UploadStore};

/// Uploads kept in a local directory.
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    base_path: PathBuf,
}

impl LocalUploadStore {
    /// Creates a store rooted at `base_path`; the directory is created on first save.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Reduces a client filename to its last path component.
    ///
    /// `../../etc/passwd` becomes `passwd`; names with no usable component are rejected.
    pub fn safe_file_name(filename: &str) -> Result<String, UploadError> {
        Path::new(filename.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .map(str::to_string)
            .ok_or_else(|| UploadError::InvalidFilename(filename.to_string()))
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, UploadError> {
        let name = Self::safe_file_name(filename)?;

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            UploadError::Io(format!(
                "no se pudo crear la carpeta de subidas {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let path = self.base_path.join(name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| UploadError::Io(format!("no se pudo escribir {}: {}", path.display(), e)))?;

        Ok(path)
    }
}
