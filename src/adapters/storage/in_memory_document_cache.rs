//! In-Memory Document Cache Adapter
//!
//! Holds the last document in memory only.
//! Useful for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::receipt::ExtractedDocument;
use crate::ports::{CacheError, CacheSource, DocumentCache};

/// In-memory last-document slot
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentCache {
    slot: Arc<RwLock<Option<ExtractedDocument>>>,
}

impl InMemoryDocumentCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache already holding a document (useful for tests)
    pub fn with_document(document: ExtractedDocument) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(document))),
        }
    }

    /// Empty the slot
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }
}

#[async_trait]
impl DocumentCache for InMemoryDocumentCache {
    async fn store(&self, document: ExtractedDocument) -> Result<(), CacheError> {
        *self.slot.write().await = Some(document);
        Ok(())
    }

    async fn load(&self) -> Option<(ExtractedDocument, CacheSource)> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|doc| !doc.is_empty())
            .map(|doc| (doc.clone(), CacheSource::Memory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(series: &str) -> ExtractedDocument {
        ExtractedDocument::from_value(json!({"series": series})).unwrap()
    }

    #[tokio::test]
    async fn empty_cache_has_no_document() {
        assert!(InMemoryDocumentCache::new().load().await.is_none());
    }

    #[tokio::test]
    async fn store_then_load_round_trips() {
        let cache = InMemoryDocumentCache::new();
        cache.store(doc("B001")).await.unwrap();

        let (loaded, source) = cache.load().await.unwrap();
        assert_eq!(loaded, doc("B001"));
        assert_eq!(source, CacheSource::Memory);
    }

    #[tokio::test]
    async fn store_replaces_wholesale() {
        let cache = InMemoryDocumentCache::with_document(
            ExtractedDocument::from_value(json!({"series": "B001", "number": 7})).unwrap(),
        );
        cache.store(doc("F002")).await.unwrap();

        let (loaded, _) = cache.load().await.unwrap();
        assert_eq!(loaded, doc("F002"));
        assert!(loaded.as_map().get("number").is_none());
    }

    #[tokio::test]
    async fn empty_object_counts_as_no_document() {
        let cache = InMemoryDocumentCache::new();
        cache
            .store(ExtractedDocument::from_value(json!({})).unwrap())
            .await
            .unwrap();
        assert!(cache.load().await.is_none());
    }

    #[tokio::test]
    async fn clear_empties_slot() {
        let cache = InMemoryDocumentCache::with_document(doc("B001"));
        cache.clear().await;
        assert!(cache.load().await.is_none());
    }
}
