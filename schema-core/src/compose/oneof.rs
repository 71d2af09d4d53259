//! `oneOf` branch exclusivity: pick a discriminant when the branches already
//! disambiguate themselves, otherwise fall back to a deterministic
//! per-branch tie-break so two runs with the same seed always pick the same
//! branch to generate from.

use serde_json::Value;

use crate::rng::exclusivity_rand;

/// How a set of `oneOf` branches is told apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Discriminant {
    /// A property name whose `const`/`enum` value differs across every
    /// branch, usable to pick a branch without guessing.
    Key(String),
    /// No shared discriminating key found; branches are told apart only by
    /// the deterministic tie-break weight assigned to each.
    TieBreak,
}

/// A property name present (with a `const` or single-valued `enum`) in every
/// branch's `properties`, whose values are pairwise distinct across branches.
#[must_use]
pub fn find_discriminant(branches: &[Value]) -> Option<String> {
    let first = branches.first()?.get("properties")?.as_object()?;
    'candidate: for key in first.keys() {
        let mut seen = std::collections::BTreeSet::new();
        for branch in branches {
            let Some(value) = branch.get("properties").and_then(|p| p.get(key)) else { continue 'candidate };
            let discriminating = value.get("const").or_else(|| {
                value.get("enum").and_then(Value::as_array).filter(|a| a.len() == 1).and_then(|a| a.first())
            });
            let Some(discriminating) = discriminating else { continue 'candidate };
            if !seen.insert(discriminating.to_string()) {
                continue 'candidate;
            }
        }
        return Some(key.clone());
    }
    None
}

/// Classify how `branches` at `canon_path` should be disambiguated.
#[must_use]
pub fn discriminant(branches: &[Value]) -> Discriminant {
    find_discriminant(branches).map_or(Discriminant::TieBreak, Discriminant::Key)
}

/// Deterministically pick one of `branch_count` branches when no
/// discriminant exists, via `(seed, canonPath)`-derived tie-break weights.
#[must_use]
pub fn pick_branch(seed: u64, canon_path: &str, branch_count: usize) -> usize {
    if branch_count == 0 {
        return 0;
    }
    let weight = exclusivity_rand(seed, canon_path);
    ((weight * branch_count as f64) as usize).min(branch_count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_const_discriminant() {
        let branches = vec![
            json!({"properties": {"kind": {"const": "a"}}}),
            json!({"properties": {"kind": {"const": "b"}}}),
        ];
        assert_eq!(discriminant(&branches), Discriminant::Key("kind".to_string()));
    }

    #[test]
    fn no_discriminant_falls_back_to_tie_break() {
        let branches = vec![json!({"properties": {"x": {"type": "string"}}}), json!({"properties": {"x": {"type": "integer"}}})];
        assert_eq!(discriminant(&branches), Discriminant::TieBreak);
    }

    #[test]
    fn duplicate_discriminant_values_rejected() {
        let branches = vec![
            json!({"properties": {"kind": {"const": "a"}}}),
            json!({"properties": {"kind": {"const": "a"}}}),
        ];
        assert_eq!(discriminant(&branches), Discriminant::TieBreak);
    }

    #[test]
    fn pick_branch_deterministic() {
        let a = pick_branch(1, "#/oneOf", 3);
        let b = pick_branch(1, "#/oneOf", 3);
        assert_eq!(a, b);
        assert!(a < 3);
    }

    #[test]
    fn pick_branch_zero_branches_is_zero() {
        assert_eq!(pick_branch(1, "#/oneOf", 0), 0);
    }
}
