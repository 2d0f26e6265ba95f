//! Axum router configuration for receipt endpoints.

use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use super::handlers::{chat, extract_receipt, get_result, health, transcribe, ReceiptAppState};

/// Create the receipt API router.
///
/// # Routes
/// - `POST /extract` - Extract a receipt from an uploaded image (multipart `file`)
/// - `POST /chat` - Ask about the last receipt (`{"message": "..."}`)
/// - `POST /transcribe` - Ask about the last receipt by voice (multipart `file`)
/// - `GET /result` - The last receipt, 404 before the first extraction
pub fn receipt_routes() -> Router<ReceiptAppState> {
    Router::new()
        .route("/extract", post(extract_receipt))
        .route("/chat", post(chat))
        .route("/transcribe", post(transcribe))
        .route("/result", get(get_result))
}

/// Create the complete application router.
///
/// Mounts the API under `/api`, `GET /health`, the page at `GET /` and the
/// static directory under `/static`. Request bodies are capped at
/// `max_upload_bytes`.
///
/// # Example
///
/// ```ignore
/// let app = receipt_router(state, "static", 10 * 1024 * 1024)
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn receipt_router(
    state: ReceiptAppState,
    static_dir: impl AsRef<Path>,
    max_upload_bytes: usize,
) -> Router {
    let static_dir = static_dir.as_ref();

    Router::new()
        .nest("/api", receipt_routes())
        .route("/health", get(health))
        .with_state(state)
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
