//! Numeric bound normalization and `multipleOf` fallback dispatch.

use serde_json::{Map, Value};

use crate::diag::{DiagCode, Diagnostic, Phase};
use crate::pointer::Pointer;
use crate::rational::{decimal, is_multiple_of_float, Bound, BoundRange, Rational};

/// Which `multipleOf` fallback mode to use, selected by configuration
/// (§4.2) rather than inferred per-value.
#[derive(Debug, Clone, Copy)]
pub enum MultipleOfMode {
    Exact,
    Decimal { precision: u32 },
    Float { precision: f64 },
}

/// Build the merged [`BoundRange`] for a numeric subschema's own
/// `minimum`/`maximum`/`exclusiveMinimum`/`exclusiveMaximum` keywords
/// (already numeric-form post-normalization).
#[must_use]
pub fn bound_range(keywords: &Map<String, Value>) -> BoundRange {
    let mut range = BoundRange::new();
    if let Some(v) = keywords.get("minimum").and_then(Value::as_f64) {
        range.tighten_lower(Bound { value: Rational::from_f64_exact(v).unwrap_or_else(|| Rational::from_i64(0)), exclusive: false });
    }
    if let Some(v) = keywords.get("exclusiveMinimum").and_then(Value::as_f64) {
        range.tighten_lower(Bound { value: Rational::from_f64_exact(v).unwrap_or_else(|| Rational::from_i64(0)), exclusive: true });
    }
    if let Some(v) = keywords.get("maximum").and_then(Value::as_f64) {
        range.tighten_upper(Bound { value: Rational::from_f64_exact(v).unwrap_or_else(|| Rational::from_i64(0)), exclusive: false });
    }
    if let Some(v) = keywords.get("exclusiveMaximum").and_then(Value::as_f64) {
        range.tighten_upper(Bound { value: Rational::from_f64_exact(v).unwrap_or_else(|| Rational::from_i64(0)), exclusive: true });
    }
    range
}

fn is_integer_typed(keywords: &Map<String, Value>) -> bool {
    match keywords.get("type") {
        Some(Value::String(s)) => s == "integer",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("integer")),
        _ => false,
    }
}

/// Analyze a numeric subschema's bounds, emitting `UNSAT_NUMERIC_BOUNDS`
/// when the bounds cross/meet under exclusivity, or when the integer-
/// restricted domain is empty.
#[must_use]
pub fn analyze(keywords: &Map<String, Value>, canon_path: &Pointer) -> (BoundRange, Option<Diagnostic>) {
    let range = bound_range(keywords);
    let unsat = if range.range_empty() {
        true
    } else {
        is_integer_typed(keywords) && range.integer_domain_empty()
    };
    let diag = unsat.then(|| {
        Diagnostic::new(DiagCode::UnsatNumericBounds, canon_path.clone(), Phase::Compose)
            .with_details(serde_json::json!({"lower": range.lower.as_ref().map(|b| b.value.to_f64()), "upper": range.upper.as_ref().map(|b| b.value.to_f64())}))
    });
    (range, diag)
}

/// Decide whether `value` is a multiple of `modulus` under `mode`.
#[must_use]
pub fn multiple_of_satisfied(value: f64, modulus: f64, mode: MultipleOfMode) -> bool {
    match mode {
        MultipleOfMode::Exact => match (Rational::from_f64_exact(value), Rational::from_f64_exact(modulus)) {
            (Some(v), Some(m)) if !m.is_zero() => v.is_multiple_of(&m),
            _ => false,
        },
        MultipleOfMode::Decimal { precision } => match (Rational::from_f64_exact(value), Rational::from_f64_exact(modulus)) {
            (Some(v), Some(m)) => decimal::is_multiple_of_decimal(&v, &m, precision),
            _ => false,
        },
        MultipleOfMode::Float { precision } => is_multiple_of_float(value, modulus, precision),
    }
}
