//! Per-JSON-type scalar generation: string, number, integer, boolean, null.
//!
//! Boundary representatives for inclusive bounds, Unicode-code-point-exact
//! string lengths, and the smallest `multipleOf`-compatible representative
//! near an exclusive bound. Pattern witnesses route through
//! `schema_core::automata` with a literal fallback when a pattern can't be
//! lifted to a closed enum.

use serde_json::{Map, Value};

use schema_core::automata::lift::{lift, LiftBudget};
use schema_core::compose::numeric;
use schema_core::rng::SplitMix64;

use schema_repair::action::{multiple_of_snap, pad_truncate};

const DEFAULT_MAX_LENGTH: usize = 16;

fn type_keyword<'a>(keywords: &'a Map<String, Value>) -> Option<&'a str> {
    keywords.get("type").and_then(Value::as_str)
}

/// Synthesize a string honoring `minLength`/`maxLength`/`pattern`.
#[must_use]
pub fn generate_string(keywords: &Map<String, Value>, regex_complexity_cap: usize) -> Value {
    let min_length = keywords.get("minLength").and_then(Value::as_u64).unwrap_or(0) as usize;
    let max_length = keywords.get("maxLength").and_then(Value::as_u64).map_or(DEFAULT_MAX_LENGTH, |v| v as usize);
    let target_len = min_length.max(1).min(max_length.max(min_length));

    if let Some(Value::String(pattern)) = keywords.get("pattern") {
        let budget = LiftBudget { max_states: regex_complexity_cap, max_length: max_length.max(8), max_candidates: 64 };
        let outcome = lift(pattern, budget);
        if let Some(literals) = outcome.lifted_source.filter(|l| !l.is_empty()) {
            return Value::from(literals[0].clone());
        }
        // Unliftable pattern (capped, infinite, or unanchored): fall back to
        // a length-honoring literal. The pattern witness itself is only
        // guaranteed when lift() succeeds; this keeps generation total.
    }

    Value::from(pad_truncate("s", target_len))
}

/// Pick a representative value within `[lower, upper]`, honoring
/// exclusivity and a `multipleOf` constraint when present.
fn numeric_representative(keywords: &Map<String, Value>, is_integer: bool) -> f64 {
    let range = numeric::bound_range(keywords);
    let mut value = match (&range.lower, &range.upper) {
        (Some(lo), _) => {
            let base = lo.value.to_f64();
            if lo.exclusive { base + if is_integer { 1.0 } else { 1.0 } } else { base }
        }
        (None, Some(hi)) => {
            let base = hi.value.to_f64();
            if hi.exclusive { base - 1.0 } else { base }
        }
        (None, None) => 0.0,
    };
    if let Some(upper) = &range.upper {
        let cap = if upper.exclusive { upper.value.to_f64() - 1.0 } else { upper.value.to_f64() };
        if value > cap {
            value = cap;
        }
    }
    if is_integer {
        value = value.round();
    }
    if let Some(modulus) = keywords.get("multipleOf").and_then(Value::as_f64) {
        if modulus != 0.0 {
            value = multiple_of_snap(value, modulus);
        }
    }
    value
}

/// Synthesize a number honoring bounds and `multipleOf`.
///
/// `multipleOf` fallback mode (exact/decimal/float) governs how *repair*
/// re-checks a candidate, not how generation rounds its first guess; the
/// generator always snaps to the nearest exact multiple.
#[must_use]
pub fn generate_number(keywords: &Map<String, Value>) -> Value {
    let value = numeric_representative(keywords, false);
    serde_json::Number::from_f64(value).map_or_else(|| Value::from(0), Value::Number)
}

/// Synthesize an integer honoring bounds and `multipleOf`.
#[must_use]
pub fn generate_integer(keywords: &Map<String, Value>) -> Value {
    let value = numeric_representative(keywords, true);
    Value::from(value as i64)
}

/// Synthesize a boolean, alternating by the per-location PRNG draw.
#[must_use]
pub fn generate_boolean(rng: &mut SplitMix64) -> Value {
    Value::from(rng.next_below(2) == 1)
}

/// The sole `null` value.
#[must_use]
pub fn generate_null() -> Value {
    Value::Null
}

/// Dispatch by declared `type` to the scalar generator, or fall back to a
/// boolean for an untyped/unrecognized schema (the widest easy default).
#[must_use]
pub fn generate_scalar(keywords: &Map<String, Value>, rng: &mut SplitMix64, regex_complexity_cap: usize) -> Value {
    match type_keyword(keywords) {
        Some("string") => generate_string(keywords, regex_complexity_cap),
        Some("number") => generate_number(keywords),
        Some("integer") => generate_integer(keywords),
        Some("boolean") => generate_boolean(rng),
        Some("null") => generate_null(),
        _ => generate_boolean(rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_honors_min_length() {
        let keywords = json!({"type": "string", "minLength": 5}).as_object().unwrap().clone();
        let value = generate_string(&keywords, 512);
        assert!(value.as_str().unwrap().chars().count() >= 5);
    }

    #[test]
    fn string_pattern_lifts_to_literal() {
        let keywords = json!({"type": "string", "pattern": "^(?:red|blue)$"}).as_object().unwrap().clone();
        let value = generate_string(&keywords, 512);
        let s = value.as_str().unwrap();
        assert!(s == "red" || s == "blue");
    }

    #[test]
    fn number_honors_minimum() {
        let keywords = json!({"type": "number", "minimum": 5.5}).as_object().unwrap().clone();
        let value = generate_number(&keywords);
        assert!(value.as_f64().unwrap() >= 5.5);
    }

    #[test]
    fn integer_snaps_to_multiple_of() {
        let keywords = json!({"type": "integer", "minimum": 1, "multipleOf": 5}).as_object().unwrap().clone();
        let value = generate_integer(&keywords);
        assert_eq!(value.as_i64().unwrap() % 5, 0);
    }

    #[test]
    fn boolean_generation_is_deterministic_for_seed() {
        let mut a = SplitMix64::new(3);
        let mut b = SplitMix64::new(3);
        assert_eq!(generate_boolean(&mut a), generate_boolean(&mut b));
    }
}
