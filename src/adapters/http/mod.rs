//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.

pub mod receipt;

// Re-export key types for convenience
pub use receipt::{receipt_router, ReceiptAppState};
