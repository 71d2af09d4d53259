//! Admissible key universes for object subschemas.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::automata::lift::{lift, LiftBudget};
use crate::diag::{DiagCode, Diagnostic, Phase};
use crate::pointer::Pointer;

/// Where a name in a [`CoverageEntry`]'s universe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Provenance {
    Properties,
    PatternProperties,
    PropertyNamesSynthetic,
}

/// The admissible key universe of an object subschema at one location.
#[derive(Debug, Clone, Default)]
pub struct CoverageEntry {
    declared: BTreeSet<String>,
    pub provenance: Vec<Provenance>,
    /// Present only when the universe is finite and within the
    /// enumeration cap; `None` means "provably infinite or capped" --
    /// callers must fall back to a predicate, not an enumeration.
    enumerate: Option<Vec<String>>,
    /// `true` when `additionalProperties: false` and presence pressure
    /// (`minProperties > |certain required|`) together forbid inventing
    /// names outside this universe.
    pub must_cover: bool,
}

impl CoverageEntry {
    /// `true` if `name` is known to be in the admissible universe.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        if self.declared.contains(name) {
            return true;
        }
        self.enumerate.as_ref().is_some_and(|names| names.iter().any(|n| n == name))
    }

    #[must_use]
    pub fn enumerate(&self) -> Option<&[String]> {
        self.enumerate.as_deref()
    }
}

const ENUM_CAP: usize = 64;

/// Build the [`CoverageEntry`] for an object subschema.
#[must_use]
pub fn analyze(keywords: &Map<String, Value>, canon_path: &Pointer) -> (CoverageEntry, Option<Diagnostic>) {
    let mut entry = CoverageEntry::default();
    let mut literals: Vec<String> = Vec::new();

    if let Some(Value::Object(props)) = keywords.get("properties") {
        entry.provenance.push(Provenance::Properties);
        for name in props.keys() {
            entry.declared.insert(name.clone());
            literals.push(name.clone());
        }
    }

    let mut capped = false;
    if let Some(Value::Object(pattern_props)) = keywords.get("patternProperties") {
        entry.provenance.push(Provenance::PatternProperties);
        for pattern in pattern_props.keys() {
            let anchored = if pattern.starts_with('^') && pattern.ends_with('$') {
                pattern.clone()
            } else {
                format!("^(?:{pattern})$")
            };
            let outcome = lift(&anchored, LiftBudget::default());
            if outcome.can_lift {
                if let Some(source) = outcome.lifted_source {
                    literals.extend(source);
                } else {
                    capped = true;
                }
            } else {
                capped = true;
            }
        }
    }

    if let Some(names_schema) = keywords.get("propertyNames") {
        if let Some(enum_values) = names_schema.get("enum").and_then(Value::as_array) {
            entry.provenance.push(Provenance::PropertyNamesSynthetic);
            for v in enum_values {
                if let Some(s) = v.as_str() {
                    literals.push(s.to_string());
                }
            }
        }
    }

    let mut diag = None;
    if !capped && literals.len() <= ENUM_CAP {
        literals.sort();
        literals.dedup();
        entry.enumerate = Some(literals);
    } else {
        diag = Some(Diagnostic::new(DiagCode::ComplexityCapEnum, canon_path.clone(), Phase::Compose));
    }

    let required_count = keywords.get("required").and_then(Value::as_array).map_or(0, Vec::len);
    let min_properties = keywords.get("minProperties").and_then(Value::as_u64).unwrap_or(0);
    let ap_false = matches!(keywords.get("additionalProperties"), Some(Value::Bool(false)));
    entry.must_cover = ap_false && min_properties > required_count as u64;

    (entry, diag)
}
