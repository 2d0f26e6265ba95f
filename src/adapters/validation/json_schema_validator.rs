//! JSON Schema Validator - Implementation of ReceiptSchemaValidator.
//!
//! Interprets the subset of JSON Schema the receipt schema is written in:
//! `type` (single or list), `properties`, `required`, `items`,
//! `additionalProperties` (boolean), `enum`, `minimum` and `minLength`.
//! Annotation keywords (`$schema`, `title`, `description`) are accepted and
//! ignored. Any other keyword makes the schema invalid, so a schema edit
//! that relies on unsupported behaviour fails loudly instead of silently
//! passing everything.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::domain::receipt::{ExtractedDocument, RECEIPT_SCHEMA};
use crate::ports::{ReceiptSchemaValidator, SchemaError, SchemaViolation};

const TYPE_NAMES: &[&str] = &[
    "object", "array", "string", "number", "integer", "boolean", "null",
];

const ANNOTATIONS: &[&str] = &["$schema", "$id", "title", "description", "examples"];

/// Parsed embedded receipt schema.
static RECEIPT_SCHEMA_VALUE: Lazy<Result<Value, String>> =
    Lazy::new(|| serde_json::from_str(RECEIPT_SCHEMA).map_err(|e| e.to_string()));

/// JSON Schema-based validator.
///
/// # Thread Safety
///
/// Immutable after construction; `Send + Sync` and shareable across requests.
#[derive(Debug, Clone)]
pub struct JsonSchemaValidator {
    schema: Value,
}

impl JsonSchemaValidator {
    /// Validator for the embedded receipt schema.
    ///
    /// # Errors
    /// `SchemaError::InvalidSchema` if the embedded schema does not parse or
    /// is not well-formed.
    pub fn receipt() -> Result<Self, SchemaError> {
        let schema = RECEIPT_SCHEMA_VALUE
            .as_ref()
            .map_err(|reason| SchemaError::InvalidSchema {
                path: "root".to_string(),
                reason: reason.clone(),
            })?
            .clone();
        Self::new(schema)
    }

    /// Validator for an arbitrary schema, checked for well-formedness first.
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        Self::check_schema(&schema)?;
        Ok(Self { schema })
    }

    /// Confirms a schema only uses supported keywords with well-formed values.
    pub fn check_schema(schema: &Value) -> Result<(), SchemaError> {
        check_node(schema, "root")
    }

    /// Validates any JSON value, collecting every violation.
    pub fn validate_value(&self, value: &Value) -> Result<(), SchemaError> {
        let mut violations = Vec::new();
        walk(&self.schema, value, "", &mut violations);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Violations(violations))
        }
    }
}

impl ReceiptSchemaValidator for JsonSchemaValidator {
    fn validate(&self, document: &ExtractedDocument) -> Result<(), SchemaError> {
        self.validate_value(&Value::Object(document.as_map().clone()))
    }

    fn schema(&self) -> &Value {
        &self.schema
    }
}

// =========================================================================
// Schema well-formedness
// =========================================================================

fn invalid(path: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidSchema {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn check_node(node: &Value, path: &str) -> Result<(), SchemaError> {
    let obj = node
        .as_object()
        .ok_or_else(|| invalid(path, "schema must be an object"))?;

    for (keyword, value) in obj {
        let here = format!("{}.{}", path, keyword);
        match keyword.as_str() {
            "type" => check_type_keyword(value, &here)?,
            "properties" => {
                let props = value
                    .as_object()
                    .ok_or_else(|| invalid(&here, "must be an object"))?;
                for (name, sub) in props {
                    check_node(sub, &format!("{}.{}", here, name))?;
                }
            }
            "required" => {
                let names = value
                    .as_array()
                    .ok_or_else(|| invalid(&here, "must be an array"))?;
                if !names.iter().all(Value::is_string) {
                    return Err(invalid(&here, "must contain only strings"));
                }
            }
            "items" => check_node(value, &here)?,
            "additionalProperties" => {
                if !value.is_boolean() {
                    return Err(invalid(&here, "only boolean values are supported"));
                }
            }
            "enum" => {
                let values = value
                    .as_array()
                    .ok_or_else(|| invalid(&here, "must be an array"))?;
                if values.is_empty() {
                    return Err(invalid(&here, "must not be empty"));
                }
            }
            "minimum" => {
                if !value.is_number() {
                    return Err(invalid(&here, "must be a number"));
                }
            }
            "minLength" => {
                if !value.is_u64() {
                    return Err(invalid(&here, "must be a non-negative integer"));
                }
            }
            k if ANNOTATIONS.contains(&k) => {}
            other => return Err(invalid(&here, format!("unsupported keyword '{}'", other))),
        }
    }

    Ok(())
}

fn check_type_keyword(value: &Value, path: &str) -> Result<(), SchemaError> {
    let known = |v: &Value| v.as_str().is_some_and(|t| TYPE_NAMES.contains(&t));

    match value {
        Value::String(_) if known(value) => Ok(()),
        Value::Array(types) if !types.is_empty() && types.iter().all(known) => Ok(()),
        _ => Err(invalid(path, "must name a JSON type or a list of JSON types")),
    }
}

// =========================================================================
// Instance validation
// =========================================================================

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "root".to_string()
    } else {
        path.to_string()
    }
}

fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        other => type_of(value) == other,
    }
}

fn walk(schema: &Value, value: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let Some(expected) = schema.get("type") {
        let allowed: Vec<&str> = match expected {
            Value::String(t) => vec![t.as_str()],
            Value::Array(ts) => ts.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if !allowed.iter().any(|t| matches_type(value, t)) {
            out.push(SchemaViolation::InvalidType {
                field: display_path(path),
                expected: allowed.join(" | "),
                actual: type_of(value).to_string(),
            });
            // Further keywords assume the right type.
            return;
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            out.push(SchemaViolation::NotInEnum {
                field: display_path(path),
                allowed: allowed
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
    }

    if let (Some(min), Some(actual)) = (
        schema.get("minimum").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if actual < min {
            out.push(SchemaViolation::BelowMinimum {
                field: display_path(path),
                min: schema["minimum"].to_string(),
            });
        }
    }

    if let (Some(min), Some(actual)) = (
        schema.get("minLength").and_then(Value::as_u64),
        value.as_str(),
    ) {
        if (actual.chars().count() as u64) < min {
            out.push(SchemaViolation::TooShort {
                field: display_path(path),
                min: min as usize,
            });
        }
    }

    if let Some(obj) = value.as_object() {
        walk_object(schema, obj, path, out);
    }

    if let (Some(item_schema), Some(items)) = (schema.get("items"), value.as_array()) {
        for (i, item) in items.iter().enumerate() {
            walk(item_schema, item, &format!("{}[{}]", path, i), out);
        }
    }
}

fn walk_object(
    schema: &Map<String, Value>,
    obj: &Map<String, Value>,
    path: &str,
    out: &mut Vec<SchemaViolation>,
) {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(name) {
                out.push(SchemaViolation::MissingRequired {
                    field: child_path(path, name),
                });
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));

    for (name, field_value) in obj {
        match properties.and_then(|p| p.get(name)) {
            Some(field_schema) => walk(field_schema, field_value, &child_path(path, name), out),
            None if closed => out.push(SchemaViolation::UnexpectedField {
                field: child_path(path, name),
            }),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn receipt_validator() -> JsonSchemaValidator {
        JsonSchemaValidator::receipt().expect("embedded schema is valid")
    }

    fn doc(value: Value) -> ExtractedDocument {
        ExtractedDocument::from_value(value).unwrap()
    }

    #[test]
    fn embedded_receipt_schema_is_well_formed() {
        let validator = receipt_validator();
        assert_eq!(validator.schema()["type"], "object");
    }

    #[test]
    fn minimal_receipt_passes() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {"op_gravada": 100.00, "igv": 18.00, "total": 118.00}
        }));
        assert!(receipt_validator().validate(&d).is_ok());
    }

    #[test]
    fn full_receipt_passes() {
        let d = doc(json!({
            "document_type": "boleta",
            "issuer": {"ruc": "20123456789", "name": "Bodega Don Pepe", "address": "Av. Lima 123"},
            "series": "B001",
            "number": 4521,
            "issue_date": "2024-03-15",
            "currency": "PEN",
            "customer": {"doc_type": "DNI", "doc_number": "44556677"},
            "items": [
                {"description": "Pan francés", "quantity": 10, "unit_price": 0.3, "subtotal": 3.0},
                {"description": "Leche", "quantity": 2, "unit": "UND", "unit_price": 4.5, "subtotal": 9.0}
            ],
            "totals": {"op_gravada": 10.17, "igv": 1.83, "total": 12.0},
            "payment_method": "efectivo"
        }));
        assert!(receipt_validator().validate(&d).is_ok());
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let d = doc(json!({"issuer": {}}));
        let err = receipt_validator().validate(&d).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(SchemaViolation::field).collect();

        assert_eq!(fields, vec!["series", "totals", "issuer.ruc"]);
    }

    #[test]
    fn wrong_types_carry_nested_paths() {
        let d = doc(json!({
            "issuer": {"ruc": 20123456789u64},
            "series": "B001",
            "totals": {"total": "118.00"},
            "items": [{"description": "Pan", "quantity": "dos"}]
        }));
        let err = receipt_validator().validate(&d).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(SchemaViolation::field).collect();

        assert!(fields.contains(&"issuer.ruc"));
        assert!(fields.contains(&"totals.total"));
        assert!(fields.contains(&"items[0].quantity"));
    }

    #[test]
    fn integers_satisfy_number() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {"total": 118}
        }));
        assert!(receipt_validator().validate(&d).is_ok());
    }

    #[test]
    fn enum_and_minimum_are_enforced() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "currency": "EUR",
            "totals": {"total": -1.0}
        }));
        let err = receipt_validator().validate(&d).unwrap_err();
        let violations = err.violations();

        assert!(violations
            .iter()
            .any(|v| matches!(v, SchemaViolation::NotInEnum { field, .. } if field == "currency")));
        assert!(violations
            .iter()
            .any(|v| matches!(v, SchemaViolation::BelowMinimum { field, .. } if field == "totals.total")));
    }

    #[test]
    fn closed_objects_reject_unknown_fields() {
        let validator = JsonSchemaValidator::new(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"a": {"type": "string"}}
        }))
        .unwrap();

        let err = validator.validate_value(&json!({"a": "x", "b": 1})).unwrap_err();
        assert_eq!(
            err.violations(),
            &[SchemaViolation::UnexpectedField {
                field: "b".to_string()
            }]
        );
    }

    #[test]
    fn type_mismatch_at_root_is_reported_as_root() {
        let validator = JsonSchemaValidator::new(json!({"type": "object"})).unwrap();
        let err = validator.validate_value(&json!([1])).unwrap_err();
        assert_eq!(err.violations()[0].field(), "root");
    }

    #[test]
    fn check_schema_rejects_unknown_type_names() {
        let err = JsonSchemaValidator::check_schema(&json!({"type": "decimal"})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema { .. }));
    }

    #[test]
    fn check_schema_rejects_unsupported_keywords() {
        let err = JsonSchemaValidator::check_schema(&json!({
            "type": "object",
            "properties": {"ruc": {"type": "string", "pattern": "^[0-9]{11}$"}}
        }))
        .unwrap_err();

        match err {
            SchemaError::InvalidSchema { path, reason } => {
                assert_eq!(path, "root.properties.ruc.pattern");
                assert!(reason.contains("pattern"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_schema_rejects_malformed_required() {
        assert!(JsonSchemaValidator::check_schema(&json!({"required": "ruc"})).is_err());
        assert!(JsonSchemaValidator::check_schema(&json!({"required": [1]})).is_err());
        assert!(JsonSchemaValidator::check_schema(&json!("object")).is_err());
    }
}
