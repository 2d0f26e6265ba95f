//! Upload Store Port - Keeps a copy of every uploaded receipt image.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving an upload
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("nombre de archivo inválido: {0:?}")]
    InvalidFilename(String),

    #[error("no se pudo escribir el archivo: {0}")]
    Io(String),
}

/// Port for retaining uploaded files.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Save bytes under the given client filename, overwriting any file of the same name.
    ///
    /// Returns the path written.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, UploadError>;
}
