//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI inference and transcription, plus mocks
//! - `http` - Axum REST API
//! - `storage` - Document cache and upload store
//! - `validation` - JSON Schema validation of receipts

pub mod ai;
pub mod http;
pub mod storage;
pub mod validation;
