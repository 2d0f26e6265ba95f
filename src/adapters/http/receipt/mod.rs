//! HTTP adapter for receipt endpoints.
//!
//! Exposes extraction, question answering (typed and spoken), the last
//! result, a health check and the static page.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ChatRequest, ChatResponse, ErrorResponse, ExtractResponse, HealthResponse, NoResultResponse,
    TranscribeResponse,
};
pub use handlers::{ReceiptApiError, ReceiptAppState, UPLOAD_FIELD};
pub use routes::{receipt_router, receipt_routes};
