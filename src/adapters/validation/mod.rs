//! Validation Adapters - Schema validation implementations.
//!
//! Contains the adapter validating extracted receipts against the embedded JSON Schema.

mod json_schema_validator;

pub use json_schema_validator::JsonSchemaValidator;
