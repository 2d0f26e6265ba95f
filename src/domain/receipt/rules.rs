//! Receipt Rules - Format and arithmetic checks for Peruvian receipts.
//!
//! These checks run after extraction and are advisory: a receipt that breaks
//! them is still stored and returned, with the violations listed alongside.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::document::ExtractedDocument;

/// Peruvian IGV standard rate.
pub const IGV_RATE: f64 = 0.18;

/// Absolute tolerance for monetary comparisons, in soles.
pub const AMOUNT_TOLERANCE: f64 = 0.02;

/// Length of a RUC.
const RUC_LENGTH: usize = 11;

/// One rule violation, worded for the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationIssue(String);

impl ValidationIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rule checks over an extracted receipt.
pub struct ReceiptRules;

impl ReceiptRules {
    /// Runs every rule and returns the violations.
    ///
    /// # Order
    /// RUC format, series format, IGV consistency, total consistency.
    /// An empty list means the receipt passed.
    pub fn check(doc: &ExtractedDocument) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !Self::is_valid_ruc(doc.issuer_ruc()) {
            issues.push(ValidationIssue::new(
                "RUC inválido: debe tener 11 dígitos.",
            ));
        }

        if !Self::is_valid_series(doc.series()) {
            issues.push(ValidationIssue::new(
                "Serie inválida: debe ser letra + 3 dígitos (ej. B001).",
            ));
        }

        let t = doc.totals();

        if t.op_gravada > 0.0 {
            let expected_igv = Self::expected_igv(t.op_gravada);
            if !approx_equal(t.igv, expected_igv) {
                issues.push(ValidationIssue::new(format!(
                    "IGV inconsistente: esperado ~ {:.2}, encontrado {:.2}.",
                    expected_igv, t.igv
                )));
            }
        }

        let expected_total =
            round2(t.op_gravada + t.op_inafecta + t.op_exonerada + t.igv - t.discounts);
        if !approx_equal(t.total, expected_total) {
            issues.push(ValidationIssue::new(format!(
                "Total inconsistente: esperado ~ {:.2}, encontrado {:.2}.",
                expected_total, t.total
            )));
        }

        issues
    }

    /// A RUC is exactly eleven ASCII digits.
    pub fn is_valid_ruc(ruc: Option<&str>) -> bool {
        ruc.is_some_and(|r| r.len() == RUC_LENGTH && r.chars().all(|c| c.is_ascii_digit()))
    }

    /// A series is one letter followed by three digits.
    pub fn is_valid_series(series: Option<&str>) -> bool {
        let Some(series) = series else {
            return false;
        };
        let mut chars = series.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let rest: Vec<char> = chars.collect();

        first.is_alphabetic() && rest.len() == 3 && rest.iter().all(|c| c.is_ascii_digit())
    }

    /// IGV owed on a taxable base, rounded to cents.
    pub fn expected_igv(op_gravada: f64) -> f64 {
        round2(op_gravada * IGV_RATE)
    }
}

/// Rounds the exact binary value to cents, so `2.75 * 0.18` (stored just
/// below 0.495) becomes 0.49 rather than 0.50.
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= AMOUNT_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> ExtractedDocument {
        ExtractedDocument::from_value(value).unwrap()
    }

    fn messages(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(ValidationIssue::message).collect()
    }

    #[test]
    fn well_formed_receipt_has_no_issues() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {"op_gravada": 100.00, "igv": 18.00, "total": 118.00}
        }));

        assert!(ReceiptRules::check(&d).is_empty());
    }

    #[test]
    fn ruc_format() {
        assert!(ReceiptRules::is_valid_ruc(Some("12345678901")));
        assert!(!ReceiptRules::is_valid_ruc(Some("1234567890")));
        assert!(!ReceiptRules::is_valid_ruc(Some("1234567890A")));
        assert!(!ReceiptRules::is_valid_ruc(Some("123456789012")));
        assert!(!ReceiptRules::is_valid_ruc(None));
    }

    #[test]
    fn series_format() {
        assert!(ReceiptRules::is_valid_series(Some("B001")));
        assert!(ReceiptRules::is_valid_series(Some("F123")));
        assert!(!ReceiptRules::is_valid_series(Some("B1")));
        assert!(!ReceiptRules::is_valid_series(Some("0012")));
        assert!(!ReceiptRules::is_valid_series(Some("BB01")));
        assert!(!ReceiptRules::is_valid_series(Some("")));
        assert!(!ReceiptRules::is_valid_series(None));
    }

    #[test]
    fn issues_follow_rule_order() {
        let d = doc(json!({
            "issuer": {"ruc": "123"},
            "series": "X1",
            "totals": {"op_gravada": 100.0, "igv": 10.0, "total": 500.0}
        }));

        let issues = ReceiptRules::check(&d);
        let msgs = messages(&issues);

        assert_eq!(msgs.len(), 4);
        assert!(msgs[0].starts_with("RUC inválido"));
        assert!(msgs[1].starts_with("Serie inválida"));
        assert!(msgs[2].starts_with("IGV inconsistente"));
        assert!(msgs[3].starts_with("Total inconsistente"));
    }

    #[test]
    fn igv_issue_reports_expected_and_found() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {"op_gravada": 50.0, "igv": 10.0, "total": 60.0}
        }));

        let issues = ReceiptRules::check(&d);

        assert_eq!(
            issues[0].message(),
            "IGV inconsistente: esperado ~ 9.00, encontrado 10.00."
        );
    }

    #[test]
    fn igv_within_tolerance_passes() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {"op_gravada": 100.0, "igv": 18.02, "total": 118.02}
        }));

        assert!(ReceiptRules::check(&d).is_empty());
    }

    #[test]
    fn expected_igv_rounds_the_stored_product() {
        // 2.75 * 0.18 and 2.25 * 0.18 land just below the half cent.
        assert_eq!(ReceiptRules::expected_igv(2.75), 0.49);
        assert_eq!(ReceiptRules::expected_igv(2.25), 0.40);
        assert_eq!(ReceiptRules::expected_igv(100.0), 18.0);
    }

    #[test]
    fn small_base_near_half_cent_passes() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {"op_gravada": 2.75, "igv": 0.48, "total": 3.23}
        }));

        assert!(ReceiptRules::check(&d).is_empty());
    }

    #[test]
    fn small_base_near_half_cent_reports_rounded_down_igv() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {"op_gravada": 2.25, "igv": 0.30, "total": 2.55}
        }));

        assert_eq!(
            messages(&ReceiptRules::check(&d)),
            vec!["IGV inconsistente: esperado ~ 0.40, encontrado 0.30."]
        );
    }

    #[test]
    fn igv_is_not_checked_without_taxable_base() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {"op_exonerada": 25.5, "igv": 3.0, "total": 28.5}
        }));

        assert!(ReceiptRules::check(&d).is_empty());
    }

    #[test]
    fn discounts_reduce_expected_total() {
        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {
                "op_gravada": 100.0,
                "op_inafecta": 5.0,
                "igv": 18.0,
                "discounts": 3.0,
                "total": 120.0
            }
        }));

        assert!(ReceiptRules::check(&d).is_empty());
    }

    #[test]
    fn missing_totals_compare_against_zero() {
        let d = doc(json!({"issuer": {"ruc": "20123456789"}, "series": "B001"}));
        assert!(ReceiptRules::check(&d).is_empty());

        let d = doc(json!({
            "issuer": {"ruc": "20123456789"},
            "series": "B001",
            "totals": {"total": 12.5}
        }));
        assert_eq!(
            messages(&ReceiptRules::check(&d)),
            vec!["Total inconsistente: esperado ~ 0.00, encontrado 12.50."]
        );
    }

    fn cents() -> impl Strategy<Value = f64> {
        (0u32..1_000_000).prop_map(|c| c as f64 / 100.0)
    }

    proptest! {
        #[test]
        fn exact_total_never_flags_total(
            gravada in cents(),
            inafecta in cents(),
            exonerada in cents(),
            igv in cents(),
            discounts in cents(),
        ) {
            let total = gravada + inafecta + exonerada + igv - discounts;
            let d = doc(json!({
                "totals": {
                    "op_gravada": gravada,
                    "op_inafecta": inafecta,
                    "op_exonerada": exonerada,
                    "igv": igv,
                    "discounts": discounts,
                    "total": total
                }
            }));

            let issues = ReceiptRules::check(&d);
            prop_assert!(issues.iter().all(|i| !i.message().starts_with("Total inconsistente")));
        }

        #[test]
        fn wrong_igv_is_flagged_with_both_amounts(
            gravada_cents in 1u32..1_000_000,
            offset_cents in 3i64..100_000,
            above in any::<bool>(),
        ) {
            let gravada = gravada_cents as f64 / 100.0;
            let expected = ReceiptRules::expected_igv(gravada);
            let offset = offset_cents as f64 / 100.0;
            let igv = if above { expected + offset } else { expected - offset };

            let d = doc(json!({"totals": {"op_gravada": gravada, "igv": igv}}));
            let issues = ReceiptRules::check(&d);
            let igv_issue = issues
                .iter()
                .find(|i| i.message().starts_with("IGV inconsistente"));

            prop_assert!(igv_issue.is_some());
            let msg = igv_issue.unwrap().message();
            let expected_text = format!("{:.2}", expected);
            let found_text = format!("{:.2}", igv);
            prop_assert!(msg.contains(&expected_text));
            prop_assert!(msg.contains(&found_text));
        }
    }
}
