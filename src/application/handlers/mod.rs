//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod receipt;

pub use receipt::{
    AskQuestionCommand, AskQuestionError, AskQuestionHandler, AskQuestionResult,
    ExtractReceiptCommand, ExtractReceiptConfig, ExtractReceiptError, ExtractReceiptHandler,
    ExtractReceiptResult, GetLastResultHandler, GetLastResultQuery, LastResult,
    TranscribeQuestionCommand, TranscribeQuestionError, TranscribeQuestionHandler,
    TranscribeQuestionResult, DEFAULT_IMAGE_FILENAME,
};
