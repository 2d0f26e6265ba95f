//! Receipt domain - Extracted Peruvian receipts and the rules they must satisfy.
//!
//! Everything here is pure: no I/O, no provider calls.

mod document;
mod image;
pub mod prompts;
mod provider_json;
mod rules;

pub use document::{ExtractedDocument, ReceiptTotals};
pub use image::ReceiptImage;
pub use prompts::QuestionSource;
pub use provider_json::{parse_document, strip_code_fence, ProviderJsonError};
pub use rules::{ReceiptRules, ValidationIssue, AMOUNT_TOLERANCE, IGV_RATE};

/// Receipt JSON Schema, embedded at compile time.
pub const RECEIPT_SCHEMA: &str = include_str!("schemas/boleta_peru.schema.json");
