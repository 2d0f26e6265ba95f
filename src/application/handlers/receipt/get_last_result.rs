//! GetLastResultHandler - Query handler for the cached receipt.

use std::sync::Arc;

use crate::domain::receipt::ExtractedDocument;
use crate::ports::{CacheSource, DocumentCache};

/// Query for the most recently extracted receipt.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetLastResultQuery;

/// The cached receipt and where it was found.
#[derive(Debug, Clone)]
pub struct LastResult {
    pub document: ExtractedDocument,
    pub source: CacheSource,
}

/// Handler for reading the cached receipt.
pub struct GetLastResultHandler {
    cache: Arc<dyn DocumentCache>,
}

impl GetLastResultHandler {
    pub fn new(cache: Arc<dyn DocumentCache>) -> Self {
        Self { cache }
    }

    /// `None` when nothing has been extracted yet.
    pub async fn handle(&self, _query: GetLastResultQuery) -> Option<LastResult> {
        self.cache
            .load()
            .await
            .map(|(document, source)| LastResult { document, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryDocumentCache;
    use serde_json::json;

    #[tokio::test]
    async fn empty_cache_has_no_result() {
        let handler = GetLastResultHandler::new(Arc::new(InMemoryDocumentCache::new()));
        assert!(handler.handle(GetLastResultQuery).await.is_none());
    }

    #[tokio::test]
    async fn returns_cached_document() {
        let doc = ExtractedDocument::from_value(json!({"series": "F001"})).unwrap();
        let handler =
            GetLastResultHandler::new(Arc::new(InMemoryDocumentCache::with_document(doc.clone())));

        let result = handler.handle(GetLastResultQuery).await.unwrap();

        assert_eq!(result.document, doc);
        assert_eq!(result.source, CacheSource::Memory);
    }
}
