//! HTTP handlers for receipt endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::receipt::{
    AskQuestionCommand, AskQuestionError, AskQuestionHandler, ExtractReceiptCommand,
    ExtractReceiptError, ExtractReceiptHandler, GetLastResultHandler, GetLastResultQuery,
    TranscribeQuestionCommand, TranscribeQuestionError, TranscribeQuestionHandler,
};

use super::dto::{
    ChatRequest, ChatResponse, ErrorResponse, ExtractResponse, HealthResponse, NoResultResponse,
    TranscribeResponse,
};

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for the receipt endpoints.
#[derive(Clone)]
pub struct ReceiptAppState {
    pub extract: Arc<ExtractReceiptHandler>,
    pub ask: Arc<AskQuestionHandler>,
    pub transcribe: Arc<TranscribeQuestionHandler>,
    pub last_result: Arc<GetLastResultHandler>,
}

impl ReceiptAppState {
    pub fn new(
        extract: Arc<ExtractReceiptHandler>,
        ask: Arc<AskQuestionHandler>,
        transcribe: Arc<TranscribeQuestionHandler>,
        last_result: Arc<GetLastResultHandler>,
    ) -> Self {
        Self {
            extract,
            ask,
            transcribe,
            last_result,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/extract - Extract a receipt from an uploaded image
pub async fn extract_receipt(
    State(state): State<ReceiptAppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, ReceiptApiError> {
    let (filename, bytes) = read_upload(multipart?).await?;

    let result = state
        .extract
        .handle(ExtractReceiptCommand::new(filename, bytes))
        .await?;

    Ok(Json(ExtractResponse {
        ok: true,
        data: result.document,
        issues: result
            .issues
            .into_iter()
            .map(|issue| issue.message().to_string())
            .collect(),
    }))
}

/// POST /api/chat - Answer a typed question about the last receipt
pub async fn chat(
    State(state): State<ReceiptAppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ReceiptApiError> {
    let Json(req) = payload?;

    let result = state.ask.handle(AskQuestionCommand::new(req.message)).await?;

    Ok(Json(ChatResponse {
        ok: true,
        answer: result.answer,
    }))
}

/// POST /api/transcribe - Answer a spoken question about the last receipt
pub async fn transcribe(
    State(state): State<ReceiptAppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ReceiptApiError> {
    let (filename, bytes) = read_upload(multipart?).await?;

    let result = state
        .transcribe
        .handle(TranscribeQuestionCommand::new(filename, bytes))
        .await?;

    Ok(Json(TranscribeResponse {
        ok: true,
        transcript: result.transcript,
        answer: result.answer,
    }))
}

/// GET /api/result - The cached receipt as is, or 404
pub async fn get_result(State(state): State<ReceiptAppState>) -> Response {
    match state.last_result.handle(GetLastResultQuery).await {
        Some(result) => (StatusCode::OK, Json(result.document)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(NoResultResponse::default())).into_response(),
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Reads the `file` field, returning its client filename and bytes.
async fn read_upload(mut multipart: Multipart) -> Result<(Option<String>, Vec<u8>), ReceiptApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok((filename, bytes.to_vec()));
    }

    Err(ReceiptApiError::new(format!(
        "Falta el archivo en el campo '{}'.",
        UPLOAD_FIELD
    )))
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

/// Any receipt endpoint failure; rendered as the 400 envelope.
#[derive(Debug)]
pub struct ReceiptApiError(String);

impl ReceiptApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<ExtractReceiptError> for ReceiptApiError {
    fn from(err: ExtractReceiptError) -> Self {
        tracing::warn!("Extraction failed: {}", err);
        Self(err.to_string())
    }
}

impl From<AskQuestionError> for ReceiptApiError {
    fn from(err: AskQuestionError) -> Self {
        tracing::debug!("Question failed: {}", err);
        Self(err.to_string())
    }
}

impl From<TranscribeQuestionError> for ReceiptApiError {
    fn from(err: TranscribeQuestionError) -> Self {
        tracing::warn!("Spoken question failed: {}", err);
        Self(err.to_string())
    }
}

impl From<MultipartError> for ReceiptApiError {
    fn from(err: MultipartError) -> Self {
        Self(err.body_text())
    }
}

impl From<MultipartRejection> for ReceiptApiError {
    fn from(err: MultipartRejection) -> Self {
        Self(err.body_text())
    }
}

impl From<JsonRejection> for ReceiptApiError {
    fn from(err: JsonRejection) -> Self {
        Self(err.body_text())
    }
}

impl IntoResponse for ReceiptApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(self.0))).into_response()
    }
}
