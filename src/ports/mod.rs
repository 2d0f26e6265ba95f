//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Multimodal inference (extraction and Q&A)
//! - `Transcriber` - Speech-to-text for spoken questions
//! - `DocumentCache` - Last extracted receipt
//! - `UploadStore` - Retained receipt images
//! - `ReceiptSchemaValidator` - Receipt shape validation

mod ai_provider;
mod document_cache;
mod schema_validator;
mod transcriber;
mod upload_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, ContentPart, FinishReason,
    ImageDetail, Message, MessageRole, RequestMetadata, ResponseFormat, TokenUsage,
};
pub use document_cache::{CacheError, CacheSource, DocumentCache};
pub use schema_validator::{ReceiptSchemaValidator, SchemaError, SchemaViolation};
pub use transcriber::{
    AudioClip, Transcriber, Transcript, TranscriptionError, DEFAULT_AUDIO_FILENAME,
};
pub use upload_store::{UploadError, UploadStore};
