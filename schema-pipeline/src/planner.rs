//! Coverage target planning: walk the composed schema once, enumerate the
//! concrete obligations ("this `required` key", "this numeric bound",
//! "this `oneOf` branch") each enabled dimension expects generation to
//! exercise, capped so a pathological schema can't blow the report up.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use schema_core::compose::ComposeResult;
use schema_core::diag::{canonical_hash, domain};
use schema_core::normalize::{CanonicalSchema, SchemaNode};
use schema_core::pointer::Pointer;

use crate::options::CoverageDimensions;

/// One obligation the planner expects `generate` to exercise somewhere
/// across the run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CoverageTarget {
    pub id: String,
    pub dimension: &'static str,
    pub canon_path: Pointer,
    pub operation_key: String,
}

fn target_id(canon_path: &Pointer, dimension: &str, operation_key: &str) -> String {
    let payload = serde_json::json!({
        "canonPath": canon_path.as_fragment(),
        "dimension": dimension,
        "operationKey": operation_key,
    });
    let bytes = schema_core::diag::canonical_json_bytes(&payload);
    let hash = canonical_hash(domain::PARAMS, &bytes);
    format!("cov:1:1:{}", hash.as_str())
}

fn push_target(out: &mut Vec<CoverageTarget>, canon_path: &Pointer, dimension: &'static str, operation_key: impl Into<String>) {
    let operation_key = operation_key.into();
    let id = target_id(canon_path, dimension, &operation_key);
    out.push(CoverageTarget { id, dimension, canon_path: canon_path.clone(), operation_key });
}

/// One `(dimension, operationKey)` pair whose targets were truncated by a
/// planner cap.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlannerCapHit {
    pub dimension: &'static str,
    pub operation_key: String,
}

/// Result of one planning pass.
#[derive(Debug, Clone, Default)]
pub struct PlanOutcome {
    pub targets: Vec<CoverageTarget>,
    /// `true` if any per-dimension or per-operation cap truncated the plan.
    pub planner_caps_hit: bool,
    pub planner_caps_hit_entries: Vec<PlannerCapHit>,
}

/// Derive coverage targets for every enabled dimension.
#[must_use]
pub fn plan(schema: &CanonicalSchema, compose: &ComposeResult, dimensions: CoverageDimensions, max_targets_per_dimension: usize, max_targets_per_operation: usize) -> PlanOutcome {
    let mut raw = Vec::new();

    for (id, node) in schema.iter() {
        let SchemaNode::Object { keywords, children, .. } = node else { continue };
        let canon_path = schema.pointer_of(id);

        if dimensions.structure {
            if let Some(Value::Array(required)) = keywords.get("required") {
                for name in required.iter().filter_map(Value::as_str) {
                    push_target(&mut raw, canon_path, "structure", format!("required:{name}"));
                }
            }
            if children.contains_key("contains") {
                push_target(&mut raw, canon_path, "structure", "contains");
            }
            if keywords.contains_key("if") && children.contains_key("then") {
                push_target(&mut raw, canon_path, "structure", "if_then_else:then");
            }
        }

        if dimensions.boundary {
            for keyword in ["minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum", "minLength", "maxLength", "minItems", "maxItems", "multipleOf"] {
                if keywords.contains_key(keyword) {
                    push_target(&mut raw, canon_path, "boundary", keyword);
                }
            }
        }

        if dimensions.type_union {
            if let Some(Value::Array(branches)) = keywords.get("oneOf") {
                for i in 0..branches.len() {
                    push_target(&mut raw, canon_path, "type_union", format!("oneOf:{i}"));
                }
            }
            if let Some(Value::Array(branches)) = keywords.get("anyOf") {
                for i in 0..branches.len() {
                    push_target(&mut raw, canon_path, "type_union", format!("anyOf:{i}"));
                }
            }
        }
    }

    cap(raw, max_targets_per_dimension, max_targets_per_operation)
}

fn cap(mut raw: Vec<CoverageTarget>, max_per_dimension: usize, max_per_operation: usize) -> PlanOutcome {
    raw.sort();
    let mut by_dimension: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut by_operation: BTreeMap<(&'static str, String), usize> = BTreeMap::new();
    let mut caps_hit: BTreeSet<(&'static str, String)> = BTreeSet::new();
    let mut targets = Vec::with_capacity(raw.len());

    for target in raw {
        let dimension_count = by_dimension.entry(target.dimension).or_insert(0);
        if *dimension_count >= max_per_dimension {
            caps_hit.insert((target.dimension, target.operation_key.clone()));
            continue;
        }
        let operation_count = by_operation.entry((target.dimension, target.operation_key.clone())).or_insert(0);
        if *operation_count >= max_per_operation {
            caps_hit.insert((target.dimension, target.operation_key.clone()));
            continue;
        }
        *dimension_count += 1;
        *operation_count += 1;
        targets.push(target);
    }

    let planner_caps_hit = !caps_hit.is_empty();
    let planner_caps_hit_entries = caps_hit.into_iter().map(|(dimension, operation_key)| PlannerCapHit { dimension, operation_key }).collect();
    PlanOutcome { targets, planner_caps_hit, planner_caps_hit_entries }
}
