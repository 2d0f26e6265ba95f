//! Snapshot Document Cache Adapter
//!
//! Keeps the last extracted document in memory and mirrors it to a JSON
//! snapshot file, so a restarted process can still answer questions about
//! the receipt extracted before the restart.
//!
//! # Consistency
//!
//! The slot's write lock is held while the snapshot is written, so two
//! concurrent stores cannot interleave their file writes. Snapshots are
//! written to a temporary file and renamed into place, so a reader never
//! sees a half-written file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::domain::receipt::ExtractedDocument;
use crate::ports::{CacheError, CacheSource, DocumentCache};

/// Memory slot backed by an on-disk snapshot
#[derive(Debug, Clone)]
pub struct SnapshotDocumentCache {
    slot: Arc<RwLock<Option<ExtractedDocument>>>,
    snapshot_path: PathBuf,
}

impl SnapshotDocumentCache {
    /// Create a cache with an empty slot and the given snapshot location
    ///
    /// # Example
    /// ```ignore
    /// let cache = SnapshotDocumentCache::new("last_result.json");
    /// ```
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    /// Location of the snapshot file
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .snapshot_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.snapshot_path.with_file_name(name)
    }

    fn persist_error(&self, message: impl ToString) -> CacheError {
        CacheError::Persist {
            path: self.snapshot_path.display().to_string(),
            message: message.to_string(),
        }
    }

    async fn write_snapshot(&self, document: &ExtractedDocument) -> Result<(), CacheError> {
        if let Some(parent) = self.snapshot_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.persist_error(e))?;
        }

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, json)
            .await
            .map_err(|e| self.persist_error(e))?;
        fs::rename(&temp, &self.snapshot_path)
            .await
            .map_err(|e| self.persist_error(e))?;

        Ok(())
    }

    async fn read_snapshot(&self) -> Option<ExtractedDocument> {
        let text = match fs::read_to_string(&self.snapshot_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.snapshot_path.display(), "Failed to read snapshot: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<ExtractedDocument>(&text) {
            Ok(doc) if !doc.is_empty() => Some(doc),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %self.snapshot_path.display(), "Ignoring unparsable snapshot: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl DocumentCache for SnapshotDocumentCache {
    async fn store(&self, document: ExtractedDocument) -> Result<(), CacheError> {
        let mut slot = self.slot.write().await;
        let result = self.write_snapshot(&document).await;
        *slot = Some(document);

        if result.is_ok() {
            tracing::debug!(path = %self.snapshot_path.display(), "Snapshot written");
        }
        result
    }

    async fn load(&self) -> Option<(ExtractedDocument, CacheSource)> {
        {
            let slot = self.slot.read().await;
            if let Some(doc) = slot.as_ref().filter(|doc| !doc.is_empty()) {
                return Some((doc.clone(), CacheSource::Memory));
            }
        }

        self.read_snapshot()
            .await
            .map(|doc| (doc, CacheSource::Snapshot))
    }
}
