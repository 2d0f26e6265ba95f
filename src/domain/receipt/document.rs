//! Extracted receipt document.
//!
//! The provider returns a loosely-typed record: fields it cannot read are
//! omitted rather than nulled, numbers sometimes arrive as strings, and the
//! line items vary in shape. The document is therefore kept as a JSON object
//! and read through lenient accessors instead of being forced into a rigid
//! struct.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A receipt as extracted by the inference provider.
///
/// Immutable once built; a new extraction replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedDocument(Map<String, Value>);

impl ExtractedDocument {
    /// Builds a document from any JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// An empty object carries no receipt data and is treated as "no document".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Issuer tax id (RUC), only when present as a string.
    pub fn issuer_ruc(&self) -> Option<&str> {
        self.0
            .get("issuer")
            .and_then(|issuer| issuer.get("ruc"))
            .and_then(Value::as_str)
    }

    /// Document series code (e.g. `B001`), only when present as a string.
    pub fn series(&self) -> Option<&str> {
        self.0.get("series").and_then(Value::as_str)
    }

    /// Monetary totals, with missing or unreadable amounts as 0.0.
    pub fn totals(&self) -> ReceiptTotals {
        let totals = self.0.get("totals");
        let amount = |key: &str| totals.and_then(|t| t.get(key)).map_or(0.0, numeric);

        ReceiptTotals {
            op_gravada: amount("op_gravada"),
            op_inafecta: amount("op_inafecta"),
            op_exonerada: amount("op_exonerada"),
            discounts: amount("discounts"),
            igv: amount("igv"),
            total: amount("total"),
        }
    }

    /// Line items, empty when absent or not a list.
    pub fn line_items(&self) -> &[Value] {
        self.0
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pretty-printed JSON, as embedded in chat prompts and the snapshot file.
    pub fn to_pretty_json(&self) -> String {
        // A map of JSON values always serializes.
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    /// Borrow the underlying object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// The totals group read as plain numbers.
///
/// Field names follow the SUNAT receipt vocabulary: *gravada* is the taxable
/// base, *inafecta* is outside the tax scope, *exonerada* is tax-exempt.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReceiptTotals {
    pub op_gravada: f64,
    pub op_inafecta: f64,
    pub op_exonerada: f64,
    pub discounts: f64,
    pub igv: f64,
    pub total: f64,
}

/// Reads a JSON number or numeric string; anything else is 0.0.
fn numeric(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}
