//! Array `contains`/`minContains`/`maxContains` collection against capacity.

use serde_json::{Map, Value};

use crate::diag::{DiagCode, Diagnostic, Phase};
use crate::pointer::Pointer;

/// One `contains` need collected from a node or an `allOf` branch.
#[derive(Debug, Clone, Copy)]
pub struct ContainsNeed {
    pub min: u64,
    pub max: Option<u64>,
}

/// `true` when two `contains` subschemas are provably disjoint: either by
/// `const`/`enum` value-set disjointness, or by disjoint type sets
/// (treating `integer` as a subset of `number`, so `integer` and `number`
/// are never provably disjoint from each other).
#[must_use]
pub fn provably_disjoint(a: &Value, b: &Value) -> bool {
    if let (Some(enum_a), Some(enum_b)) = (enum_values(a), enum_values(b)) {
        return enum_a.is_disjoint(&enum_b);
    }
    if let (Some(types_a), Some(types_b)) = (type_set(a), type_set(b)) {
        let a_has_number_family = types_a.contains("integer") || types_a.contains("number");
        let b_has_number_family = types_b.contains("integer") || types_b.contains("number");
        if a_has_number_family && b_has_number_family {
            return false;
        }
        return types_a.is_disjoint(&types_b);
    }
    false
}

fn enum_values(schema: &Value) -> Option<std::collections::BTreeSet<String>> {
    let obj = schema.as_object()?;
    if let Some(c) = obj.get("const") {
        return Some(std::collections::BTreeSet::from([c.to_string()]));
    }
    let arr = obj.get("enum")?.as_array()?;
    Some(arr.iter().map(ToString::to_string).collect())
}

fn type_set(schema: &Value) -> Option<std::collections::BTreeSet<String>> {
    let obj = schema.as_object()?;
    match obj.get("type")? {
        Value::String(s) => Some(std::collections::BTreeSet::from([s.clone()])),
        Value::Array(items) => Some(items.iter().filter_map(|v| v.as_str().map(String::from)).collect()),
        _ => None,
    }
}

/// `effectiveMaxItems = min(maxItems, tupleCap)`, where `tupleCap` comes
/// from a closed tuple (`items: false` with a fixed `prefixItems` length).
#[must_use]
pub fn effective_max_items(keywords: &Map<String, Value>) -> Option<u64> {
    let max_items = keywords.get("maxItems").and_then(Value::as_u64);
    let tuple_cap = if matches!(keywords.get("items"), Some(Value::Bool(false))) {
        keywords.get("prefixItems").and_then(Value::as_array).map(|a| a.len() as u64)
    } else {
        None
    };
    match (max_items, tuple_cap) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Collect every `contains` need from `keywords` itself and its `allOf`
/// branches, sum the minimums, and emit `CONTAINS_UNSAT_BY_SUM` if the sum
/// exceeds `effectiveMaxItems` -- strong if pairwise disjointness is
/// provable, otherwise an `unsatHints` entry with `provable: false`.
#[must_use]
pub fn analyze(keywords: &Map<String, Value>, canon_path: &Pointer) -> Option<Diagnostic> {
    let mut needs: Vec<(ContainsNeed, &Value)> = Vec::new();
    collect_needs(keywords, &mut needs);
    if needs.is_empty() {
        return None;
    }
    let sum_min: u64 = needs.iter().map(|(n, _)| n.min).sum();
    let Some(cap) = effective_max_items(keywords) else { return None };
    if sum_min <= cap {
        return None;
    }
    let mut provable = true;
    'outer: for i in 0..needs.len() {
        for j in (i + 1)..needs.len() {
            if !provably_disjoint(needs[i].1, needs[j].1) {
                provable = false;
                break 'outer;
            }
        }
    }
    let details = serde_json::json!({"sumMin": sum_min, "maxItems": cap});
    Some(
        Diagnostic::new(DiagCode::ContainsUnsatBySum, canon_path.clone(), Phase::Compose)
            .with_provable(provable)
            .with_details(details),
    )
}

fn collect_needs<'a>(keywords: &'a Map<String, Value>, out: &mut Vec<(ContainsNeed, &'a Value)>) {
    if let Some(contains) = keywords.get("contains") {
        let min = keywords.get("minContains").and_then(Value::as_u64).unwrap_or(1);
        let max = keywords.get("maxContains").and_then(Value::as_u64);
        out.push((ContainsNeed { min, max }, contains));
    }
    if let Some(Value::Array(branches)) = keywords.get("allOf") {
        for branch in branches {
            if let Some(branch_obj) = branch.as_object() {
                collect_needs(branch_obj, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disjoint_by_const() {
        let a = json!({"const": 1});
        let b = json!({"const": 2});
        assert!(provably_disjoint(&a, &b));
    }

    #[test]
    fn integer_and_number_not_disjoint() {
        let a = json!({"type": "integer"});
        let b = json!({"type": "number"});
        assert!(!provably_disjoint(&a, &b));
    }

    #[test]
    fn unsat_by_sum_provable() {
        let keywords = json!({
            "type": "array",
            "maxItems": 2,
            "allOf": [
                {"contains": {"const": 1}, "minContains": 2},
                {"contains": {"const": 2}, "minContains": 2}
            ]
        })
        .as_object()
        .unwrap()
        .clone();
        let diag = analyze(&keywords, &Pointer::root()).unwrap();
        assert_eq!(diag.provable, Some(true));
        assert!(diag.is_unsatisfiable());
    }

    #[test]
    fn unsat_by_sum_not_provable() {
        let keywords = json!({
            "type": "array",
            "maxItems": 2,
            "allOf": [
                {"contains": {"type": "string"}, "minContains": 2},
                {"contains": {"minLength": 3}, "minContains": 2}
            ]
        })
        .as_object()
        .unwrap()
        .clone();
        let diag = analyze(&keywords, &Pointer::root()).unwrap();
        assert_eq!(diag.provable, Some(false));
        assert!(!diag.is_unsatisfiable());
    }

    #[test]
    fn single_need_exceeding_capacity_is_provable() {
        let keywords = json!({"type": "array", "maxItems": 2, "minContains": 3, "contains": {}})
            .as_object()
            .unwrap()
            .clone();
        let diag = analyze(&keywords, &Pointer::root()).unwrap();
        assert_eq!(diag.provable, Some(true));
        assert!(diag.is_unsatisfiable());
    }

    #[test]
    fn effective_max_items_uses_tuple_cap() {
        let keywords = json!({"items": false, "prefixItems": [1, 2, 3]}).as_object().unwrap().clone();
        assert_eq!(effective_max_items(&keywords), Some(3));
    }
}
