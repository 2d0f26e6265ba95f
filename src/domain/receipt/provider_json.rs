//! Parsing of the provider's text output into a receipt document.
//!
//! Even in JSON mode the provider occasionally wraps its answer in a
//! markdown code fence. One repair pass strips the fence and an optional
//! `json` language tag before giving up.

use serde_json::Value;
use thiserror::Error;

use super::document::ExtractedDocument;

/// Provider output that could not be turned into a document.
#[derive(Debug, Error)]
pub enum ProviderJsonError {
    #[error("la respuesta del modelo no es JSON válido: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("la respuesta del modelo no es un objeto JSON")]
    NotAnObject,
}

/// Parses provider text, retrying once with code fences removed.
pub fn parse_document(text: &str) -> Result<ExtractedDocument, ProviderJsonError> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(strip_code_fence(text))?,
    };

    ExtractedDocument::from_value(value).ok_or(ProviderJsonError::NotAnObject)
}

/// Removes a surrounding markdown fence and a leading `json` tag.
///
/// Text that does not start with a fence is only trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let inner = trimmed.trim_matches(|c: char| c == '`' || c.is_whitespace());
    match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => inner[4..].trim_start(),
        _ => inner,
    }
}
