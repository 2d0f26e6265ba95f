//! Receipt command and query handlers.

mod ask_question;
mod extract_receipt;
mod get_last_result;
mod transcribe_question;

pub use ask_question::{AskQuestionCommand, AskQuestionError, AskQuestionHandler, AskQuestionResult};
pub use extract_receipt::{
    ExtractReceiptCommand, ExtractReceiptConfig, ExtractReceiptError, ExtractReceiptHandler,
    ExtractReceiptResult, DEFAULT_IMAGE_FILENAME,
};
pub use get_last_result::{GetLastResultHandler, GetLastResultQuery, LastResult};
pub use transcribe_question::{
    TranscribeQuestionCommand, TranscribeQuestionError, TranscribeQuestionHandler,
    TranscribeQuestionResult,
};
