//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (extract, ask, transcribe) change or consume the cached receipt;
//! the single query reads it.

pub mod handlers;

pub use handlers::{
    AskQuestionCommand, AskQuestionError, AskQuestionHandler, AskQuestionResult,
    ExtractReceiptCommand, ExtractReceiptConfig, ExtractReceiptError, ExtractReceiptHandler,
    ExtractReceiptResult, GetLastResultHandler, GetLastResultQuery, LastResult,
    TranscribeQuestionCommand, TranscribeQuestionError, TranscribeQuestionHandler,
    TranscribeQuestionResult,
};
