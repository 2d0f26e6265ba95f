//! Storage Adapters
//!
//! Implementations of the DocumentCache and UploadStore ports.
//!
//! ## Available Adapters
//!
//! - **SnapshotDocumentCache** - In-memory slot plus a JSON snapshot on disk
//! - **InMemoryDocumentCache** - In-memory slot only (testing/development)
//! - **LocalUploadStore** - Uploaded images kept in a local directory
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryDocumentCache, SnapshotDocumentCache};
//!
//! // Production: survives restarts through the snapshot file
//! let cache = SnapshotDocumentCache::new("last_result.json");
//!
//! // Testing: memory only
//! let cache = InMemoryDocumentCache::new();
//! ```

mod in_memory_document_cache;
mod local_upload_store;
mod snapshot_document_cache;

pub use in_memory_document_cache::InMemoryDocumentCache;
pub use local_upload_store::LocalUploadStore;
pub use snapshot_document_cache::SnapshotDocumentCache;
