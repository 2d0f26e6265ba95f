//! HTTP DTOs for receipt endpoints.
//!
//! Every JSON answer except `/api/result` carries an `ok` flag; failures use
//! the `{ok: false, error}` envelope.

use serde::{Deserialize, Serialize};

use crate::domain::receipt::ExtractedDocument;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub ok: bool,
    pub data: ExtractedDocument,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub ok: bool,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscribeResponse {
    pub ok: bool,
    pub transcript: String,
    pub answer: String,
}

/// Failure envelope, always sent with 400.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

/// 404 payload of `GET /api/result` before any extraction.
#[derive(Debug, Clone, Serialize)]
pub struct NoResultResponse {
    pub message: String,
}

impl Default for NoResultResponse {
    fn default() -> Self {
        Self {
            message: "Sin datos aún. Sube una boleta.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
