//! Document Cache Port - The single slot holding the last extracted receipt.
//!
//! One document at a time: `store` replaces it wholesale, `load` returns it.
//! There is no merging, versioning or expiry.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::receipt::ExtractedDocument;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// The in-memory slot was updated but the snapshot could not be written.
    #[error("failed to persist snapshot to {path}: {message}")]
    Persist { path: String, message: String },

    #[error("failed to serialize document: {0}")]
    Serialization(String),
}

/// Where a loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Memory,
    Snapshot,
}

/// Port for the last-document slot.
#[async_trait]
pub trait DocumentCache: Send + Sync {
    /// Replace the current document.
    ///
    /// # Errors
    /// `CacheError::Persist` when a durable copy could not be written. The
    /// in-memory slot holds the new document regardless.
    async fn store(&self, document: ExtractedDocument) -> Result<(), CacheError>;

    /// Load the current document, `None` when nothing has been extracted yet.
    async fn load(&self) -> Option<(ExtractedDocument, CacheSource)>;
}
