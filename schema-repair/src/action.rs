//! Repair action families.
//!
//! Each family produces a new candidate value at an instance location;
//! `repair_loop` decides whether the candidate is accepted by re-validating
//! and checking score monotonicity.

use std::collections::BTreeSet;

use serde_json::Value;

use schema_core::compose::CoverageEntry;
use schema_core::pointer::Pointer;

/// One repair action, fully parameterized so it can be replayed and
/// serialized into an [`crate::action_log::ActionLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum RepairAction {
    NumericNudge { instance_path: Pointer, delta: f64 },
    MultipleOfSnap { instance_path: Pointer, modulus: f64 },
    PadTruncate { instance_path: Pointer, target_len: usize },
    AddRequired { instance_path: Pointer, property: String, witness: Value },
    RenameProperty { instance_path: Pointer, from: String, to: String },
}

impl RepairAction {
    /// The JSON Schema keyword this action targets, used for tier gating.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::NumericNudge { .. } => "minimum",
            Self::MultipleOfSnap { .. } => "multipleOf",
            Self::PadTruncate { .. } => "maxLength",
            Self::AddRequired { .. } => "required",
            Self::RenameProperty { .. } => "propertyNames",
        }
    }
}

/// Nudge a numeric value by `±1` for integers, or by `10^-precision` for
/// floats (formatted internally as `"1e-P"`, computed here as a plain
/// `f64` delta).
#[must_use]
pub fn numeric_nudge(value: f64, is_integer: bool, decimal_precision: u32, toward_larger: bool) -> f64 {
    let delta = if is_integer { 1.0 } else { 10f64.powi(-i32::try_from(decimal_precision).unwrap_or(0)) };
    if toward_larger { value + delta } else { value - delta }
}

/// Snap `value` to the nearest multiple of `modulus`: `round(value / m) * m`.
#[must_use]
pub fn multiple_of_snap(value: f64, modulus: f64) -> f64 {
    if modulus == 0.0 {
        return value;
    }
    (value / modulus).round() * modulus
}

/// Pad or truncate `s` to exactly `target_len` Unicode code points.
#[must_use]
pub fn pad_truncate(s: &str, target_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() >= target_len {
        chars.into_iter().take(target_len).collect()
    } else {
        let mut out: String = chars.into_iter().collect();
        out.extend(std::iter::repeat('x').take(target_len - out.chars().count()));
        out
    }
}

/// Synthesize a minimal witness value for an added required property,
/// based on its subschema's declared `type` (and `enum`, when present).
#[must_use]
pub fn synthesize_required_witness(subschema: &Value) -> Value {
    if let Some(first) = subschema.get("enum").and_then(Value::as_array).and_then(|a| a.first()) {
        return first.clone();
    }
    match subschema.get("type").and_then(Value::as_str) {
        Some("integer") | Some("number") => Value::from(0),
        Some("string") => Value::from(""),
        Some("boolean") => Value::from(false),
        Some("array") => Value::Array(Vec::new()),
        Some("object") => Value::Object(serde_json::Map::new()),
        _ => Value::Null,
    }
}

/// Every `propertyNames.enum` member that is a legal rename target, in
/// lexicographic order: not already present on the instance, not already
/// attempted and rejected this repair run, and (when a must-cover entry
/// applies) declared by the coverage index.
#[must_use]
pub fn rename_candidates(enum_values: &[String], present: &BTreeSet<String>, tried: &BTreeSet<String>, must_cover: Option<&CoverageEntry>) -> Vec<String> {
    let mut candidates: Vec<String> = enum_values
        .iter()
        .filter(|name| !present.contains(*name) && !tried.contains(*name))
        .filter(|name| must_cover.is_none_or(|entry| entry.has(name)))
        .cloned()
        .collect();
    candidates.sort();
    candidates
}

/// The single best rename candidate, gated by the must-cover coverage
/// entry when one applies. A thin convenience over [`rename_candidates`]
/// for callers that don't need to track previously-tried names.
#[must_use]
pub fn pick_rename_candidate(enum_values: &[String], present: &BTreeSet<String>, must_cover: Option<&CoverageEntry>) -> Option<String> {
    rename_candidates(enum_values, present, &BTreeSet::new(), must_cover).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_nudge_is_unit_delta() {
        assert_eq!(numeric_nudge(5.0, true, 0, true), 6.0);
        assert_eq!(numeric_nudge(5.0, true, 0, false), 4.0);
    }

    #[test]
    fn float_nudge_uses_decimal_precision() {
        let nudged = numeric_nudge(1.0, false, 2, true);
        assert!((nudged - 1.01).abs() < 1e-9);
    }

    #[test]
    fn multiple_of_snap_rounds_to_nearest_multiple() {
        assert_eq!(multiple_of_snap(11.0, 5.0), 10.0);
        assert_eq!(multiple_of_snap(13.0, 5.0), 15.0);
    }

    #[test]
    fn pad_truncate_is_code_point_exact() {
        assert_eq!(pad_truncate("hello", 3), "hel");
        assert_eq!(pad_truncate("hi", 4).chars().count(), 4);
        assert!(pad_truncate("hi", 4).starts_with("hi"));
    }

    #[test]
    fn witness_uses_enum_first_member_when_present() {
        let schema = json!({"type": "string", "enum": ["b", "a"]});
        assert_eq!(synthesize_required_witness(&schema), json!("b"));
    }

    #[test]
    fn witness_defaults_by_type() {
        assert_eq!(synthesize_required_witness(&json!({"type": "integer"})), json!(0));
        assert_eq!(synthesize_required_witness(&json!({"type": "string"})), json!(""));
        assert_eq!(synthesize_required_witness(&json!({"type": "array"})), json!([]));
    }

    #[test]
    fn rename_candidate_picks_smallest_non_present() {
        let present: BTreeSet<String> = ["a".to_string()].into_iter().collect();
        let candidate = pick_rename_candidate(&["c".to_string(), "a".to_string(), "b".to_string()], &present, None);
        assert_eq!(candidate, Some("b".to_string()));
    }

    #[test]
    fn rename_candidate_none_when_all_present() {
        let present: BTreeSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        let candidate = pick_rename_candidate(&["a".to_string(), "b".to_string()], &present, None);
        assert_eq!(candidate, None);
    }

    #[test]
    fn rename_candidates_excludes_previously_tried_names() {
        let present = BTreeSet::new();
        let tried: BTreeSet<String> = ["a".to_string()].into_iter().collect();
        let candidates = rename_candidates(&["a".to_string(), "b".to_string(), "c".to_string()], &present, &tried, None);
        assert_eq!(candidates, vec!["b".to_string(), "c".to_string()]);
    }
}
