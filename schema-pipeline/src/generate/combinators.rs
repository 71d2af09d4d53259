//! `oneOf`/`anyOf`/`allOf`/`if`-`then`-`else` branch selection.
//!
//! `oneOf` and `anyOf` both pick a single branch to generate from --
//! deciding satisfiability against every branch simultaneously is out of
//! scope, so one admissible witness stands in for the whole union. `allOf`
//! takes the cheap path instead: merge object branches key-by-key (later
//! branch wins on conflict), or fall through to the last non-object branch
//! for scalar/array intersections.

use serde_json::{Map, Value};

use schema_core::compose::oneof::pick_branch;
use schema_core::diag::{DiagCode, Diagnostic, Phase};
use schema_core::pointer::Pointer;

use super::{generate_at, Children, CoverageEvent, GenContext};

pub(crate) fn generate_one_of(ctx: &mut GenContext, canon_path: &Pointer, children: &Children, branch_count: usize, instance_path: &Pointer) -> Value {
    let idx = pick_branch(ctx.seed, &canon_path.as_fragment(), branch_count);
    ctx.sink.push(CoverageEvent {
        canon_path: canon_path.clone(),
        dimension: "type_union",
        operation_key: format!("oneOf:{idx}"),
        instance_path: instance_path.clone(),
    });
    children
        .get(&format!("oneOf/{idx}"))
        .map_or(Value::Null, |id| generate_at(ctx, *id, instance_path))
}

pub(crate) fn generate_any_of(ctx: &mut GenContext, canon_path: &Pointer, children: &Children, branch_count: usize, instance_path: &Pointer) -> Value {
    let tag = format!("{}/anyOf", canon_path.as_fragment());
    let idx = pick_branch(ctx.seed, &tag, branch_count);
    ctx.sink.push(CoverageEvent {
        canon_path: canon_path.clone(),
        dimension: "type_union",
        operation_key: format!("anyOf:{idx}"),
        instance_path: instance_path.clone(),
    });
    children
        .get(&format!("anyOf/{idx}"))
        .map_or(Value::Null, |id| generate_at(ctx, *id, instance_path))
}

pub(crate) fn generate_all_of(ctx: &mut GenContext, children: &Children, branch_count: usize, instance_path: &Pointer) -> Value {
    let mut merged = Map::new();
    let mut last_non_object = Value::Null;
    let mut saw_object = false;

    for i in 0..branch_count {
        let Some(id) = children.get(&format!("allOf/{i}")) else { continue };
        match generate_at(ctx, *id, instance_path) {
            Value::Object(branch_fields) => {
                saw_object = true;
                merged.extend(branch_fields);
            }
            other => last_non_object = other,
        }
    }

    if saw_object {
        Value::Object(merged)
    } else {
        last_non_object
    }
}

/// Generate directly from the `then` branch, ignoring `if` evaluation --
/// the if-aware-lite heuristic. A fully evaluated `if`/`then`/`else` would
/// need the same conditional solving this crate otherwise doesn't attempt.
pub(crate) fn generate_if_then_else(ctx: &mut GenContext, canon_path: &Pointer, children: &Children, instance_path: &Pointer) -> Value {
    ctx.sink.push(CoverageEvent {
        canon_path: canon_path.clone(),
        dimension: "structure",
        operation_key: "if_then_else:then".to_string(),
        instance_path: instance_path.clone(),
    });
    ctx.diag.record_run(Diagnostic::new(DiagCode::IfAwareHintApplied, canon_path.clone(), Phase::Generate));
    children
        .get("then")
        .map_or(Value::Object(Map::new()), |id| generate_at(ctx, *id, instance_path))
}
