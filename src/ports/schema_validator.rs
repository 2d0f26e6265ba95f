//! Schema Validator Port - Receipt shape validation interface.
//!
//! The extraction handler depends on this trait, while adapters (like
//! JsonSchemaValidator) provide the implementation.

use serde_json::Value;
use thiserror::Error;

use crate::domain::receipt::ExtractedDocument;

/// Port for validating extracted documents against the receipt schema.
///
/// # Contract
///
/// Implementations must:
/// - Confirm the schema itself is well-formed before using it
/// - Report every violation, not only the first
/// - Provide schema access for introspection
pub trait ReceiptSchemaValidator: Send + Sync {
    /// Validate a document against the receipt schema.
    fn validate(&self, document: &ExtractedDocument) -> Result<(), SchemaError>;

    /// Get the raw JSON Schema.
    fn schema(&self) -> &Value;
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("Falta el campo obligatorio: {field}")]
    MissingRequired { field: String },

    #[error("Tipo inválido en {field}: se esperaba {expected}, llegó {actual}")]
    InvalidType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("El valor de {field} es menor que el mínimo {min}")]
    BelowMinimum { field: String, min: String },

    #[error("El campo {field} tiene menos de {min} caracteres")]
    TooShort { field: String, min: usize },

    #[error("El campo {field} debe ser uno de {allowed}")]
    NotInEnum { field: String, allowed: String },

    #[error("Campo no esperado: {field}")]
    UnexpectedField { field: String },
}

impl SchemaViolation {
    /// Path of the offending field.
    pub fn field(&self) -> &str {
        match self {
            SchemaViolation::MissingRequired { field }
            | SchemaViolation::InvalidType { field, .. }
            | SchemaViolation::BelowMinimum { field, .. }
            | SchemaViolation::TooShort { field, .. }
            | SchemaViolation::NotInEnum { field, .. }
            | SchemaViolation::UnexpectedField { field } => field,
        }
    }
}

/// Errors from schema validation.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The schema definition itself is malformed.
    #[error("esquema inválido en {path}: {reason}")]
    InvalidSchema { path: String, reason: String },

    /// The document does not conform.
    #[error("la boleta no cumple el esquema: {}", summarize(.0))]
    Violations(Vec<SchemaViolation>),
}

impl SchemaError {
    /// Violations carried by this error (empty for schema definition errors).
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            SchemaError::Violations(v) => v,
            SchemaError::InvalidSchema { .. } => &[],
        }
    }
}

fn summarize(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
