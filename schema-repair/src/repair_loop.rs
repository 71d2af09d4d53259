//! The bounded repair fixed-point loop.
//!
//! Structured like the teacher's `search::search` expansion loop, but with
//! one current instance instead of a frontier of alternative states: each
//! pass re-validates, proposes exactly one action, and accepts it only if
//! it doesn't make the score worse.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use schema_core::normalize::SchemaNode;
use schema_core::pointer::Pointer;

use crate::action::{self, RepairAction};
use crate::action_log::{ActionLog, ActionRecord};
use crate::contract::{RepairWorld, ValidationError};
use crate::error::RepairError;
use crate::scorer::ErrorScorer;
use crate::tier::is_action_allowed;
use crate::policy::RepairPolicy;

/// Outcome of one repair run.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub instance: Value,
    pub errors_remaining: u32,
    pub log: ActionLog,
    pub result: Result<(), RepairError>,
}

/// Drive `instance` toward a zero-error fixed point against `world`,
/// scoring progress with `scorer` and staying within `policy`'s budgets.
#[must_use]
pub fn repair(mut instance: Value, world: &dyn RepairWorld, scorer: &dyn ErrorScorer, policy: &RepairPolicy) -> RepairOutcome {
    let mut log = ActionLog::new();
    let mut errors = world.validator().validate(&instance);
    let mut score = scorer.score(&errors);
    let mut stagnation = 0u32;
    let mut tried_renames: BTreeMap<Pointer, BTreeSet<String>> = BTreeMap::new();

    if score == 0 {
        return RepairOutcome { instance, errors_remaining: 0, log, result: Ok(()) };
    }

    for cycle in 1..=policy.attempts_remaining {
        let Some(error) = errors.first() else { break };

        let action = match plan_action(error, world, &tried_renames) {
            Ok(Some(action)) => action,
            Ok(None) => {
                stagnation += 1;
                if stagnation > policy.stagnation_budget {
                    return exhausted(instance, score, cycle, log);
                }
                continue;
            }
            Err(e) => return RepairOutcome { instance, errors_remaining: score, log, result: Err(e) },
        };

        if !is_action_allowed(action.keyword(), policy.in_g_valid) {
            stagnation += 1;
            if stagnation > policy.stagnation_budget {
                return exhausted(instance, score, cycle, log);
            }
            continue;
        }

        let Some(candidate) = apply_action(&instance, &action) else {
            if let RepairAction::RenameProperty { to, .. } = &action {
                return RepairOutcome { instance, errors_remaining: score, log, result: Err(RepairError::RepairEvalGuardFail { candidate: to.clone() }) };
            }
            stagnation += 1;
            if stagnation > policy.stagnation_budget {
                return exhausted(instance, score, cycle, log);
            }
            continue;
        };

        let candidate_errors = world.validator().validate(&candidate);
        let candidate_score = scorer.score(&candidate_errors);
        let accepted = candidate_score <= score;

        if let RepairAction::RenameProperty { instance_path, to, .. } = &action {
            if !accepted {
                tried_renames.entry(instance_path.clone()).or_default().insert(to.clone());
            }
        }

        log.push(ActionRecord { cycle, action, score_before: score, score_after: candidate_score, accepted });

        if accepted {
            let stalled = candidate_score == score;
            instance = candidate;
            errors = candidate_errors;
            score = candidate_score;
            if score == 0 {
                return RepairOutcome { instance, errors_remaining: 0, log, result: Ok(()) };
            }
            stagnation = if stalled { stagnation + 1 } else { 0 };
        } else {
            stagnation += 1;
        }

        if stagnation > policy.stagnation_budget {
            return exhausted(instance, score, cycle, log);
        }
    }

    exhausted(instance, score, policy.attempts_remaining, log)
}

fn exhausted(instance: Value, score: u32, cycles: u32, log: ActionLog) -> RepairOutcome {
    RepairOutcome {
        instance,
        errors_remaining: score,
        log,
        result: Err(RepairError::UnsatBudgetExhausted { cycles, last_error_count: score }),
    }
}

/// Propose an action to address `error`, looking up its subschema in
/// `world`'s canonical schema when the action family needs one (synthesized
/// witnesses, rename candidates). `tried_renames` excludes rename targets
/// already attempted and rejected this run, so repeated cycles walk the
/// candidate list instead of re-proposing the same failed rename forever.
///
/// Returns `Ok(None)` when no action family handles `error.keyword` (the
/// caller treats this as ordinary stagnation), and `Err` when the rename
/// family's preflight is irrecoverably exhausted or the coverage index is
/// missing an entry it should have.
fn plan_action(error: &ValidationError, world: &dyn RepairWorld, tried_renames: &BTreeMap<Pointer, BTreeSet<String>>) -> Result<Option<RepairAction>, RepairError> {
    let schema = world.schema();
    match error.keyword.as_str() {
        "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" => {
            let Some(current) = error.params.get("value").and_then(Value::as_f64) else { return Ok(None) };
            let is_integer = error.params.get("isInteger").and_then(Value::as_bool).unwrap_or(false);
            let precision = error.params.get("decimalPrecision").and_then(Value::as_u64).unwrap_or(2) as u32;
            let toward_larger = matches!(error.keyword.as_str(), "minimum" | "exclusiveMinimum");
            let delta = action::numeric_nudge(current, is_integer, precision, toward_larger) - current;
            Ok(Some(RepairAction::NumericNudge { instance_path: error.instance_path.clone(), delta }))
        }
        "multipleOf" => {
            let Some(modulus) = error.params.get("multipleOf").and_then(Value::as_f64) else { return Ok(None) };
            Ok(Some(RepairAction::MultipleOfSnap { instance_path: error.instance_path.clone(), modulus }))
        }
        "minLength" | "maxLength" => {
            let Some(target_len) = error.params.get("limit").and_then(Value::as_u64) else { return Ok(None) };
            Ok(Some(RepairAction::PadTruncate { instance_path: error.instance_path.clone(), target_len: target_len as usize }))
        }
        "required" => {
            let Some(property) = error.params.get("missingProperty").and_then(Value::as_str) else { return Ok(None) };
            let property = property.to_string();
            let Some(node_id) = schema.node_at(&error.canon_path) else { return Ok(None) };
            let witness = schema.resolve_property(node_id, &property).map_or(Value::Null, |(id, _via)| {
                let SchemaNode::Object { keywords, .. } = schema.get(id) else { return Value::Null };
                action::synthesize_required_witness(&Value::Object(keywords.clone()))
            });
            Ok(Some(RepairAction::AddRequired { instance_path: error.instance_path.clone(), property, witness }))
        }
        "propertyNames" | "additionalProperties" => {
            let Some(offending) = error.params.get("additionalProperty").and_then(Value::as_str) else { return Ok(None) };
            let offending = offending.to_string();
            let Some(node_id) = schema.node_at(&error.canon_path) else { return Ok(None) };
            let SchemaNode::Object { keywords, .. } = schema.get(node_id) else { return Ok(None) };
            let Some(enum_values) = keywords.get("propertyNames").and_then(|n| n.get("enum")).and_then(Value::as_array) else {
                return Ok(None);
            };
            let enum_values: Vec<String> = enum_values.iter().filter_map(|v| v.as_str().map(String::from)).collect();
            let present: BTreeSet<String> = error.params.get("present").and_then(Value::as_array).map_or_else(BTreeSet::new, |a| {
                a.iter().filter_map(|v| v.as_str().map(String::from)).collect()
            });
            let entry = world.coverage_index().get(&error.canon_path);
            if entry.is_none() {
                return Err(RepairError::MustCoverIndexMissing { canon_path: error.canon_path.as_fragment() });
            }
            let must_cover = entry.filter(|e| e.must_cover);
            let tried = tried_renames.get(&error.instance_path).cloned().unwrap_or_default();
            let candidates = action::rename_candidates(&enum_values, &present, &tried, must_cover);
            let Some(to) = candidates.into_iter().next() else {
                return Err(RepairError::RepairRenamePreflightFail);
            };
            Ok(Some(RepairAction::RenameProperty { instance_path: error.instance_path.clone(), from: offending, to }))
        }
        _ => Ok(None),
    }
}

/// Apply `action` to `instance`, returning the candidate value, or `None`
/// if the targeted location can't be found (a local failure, logged by the
/// caller and not treated as irrecoverable on its own).
fn apply_action(instance: &Value, action: &RepairAction) -> Option<Value> {
    let mut candidate = instance.clone();
    match action {
        RepairAction::NumericNudge { instance_path, delta } => {
            let slot = locate_mut(&mut candidate, instance_path)?;
            let was_integer = slot.is_i64() || slot.is_u64();
            let current = slot.as_f64()?;
            *slot = numeric_value(current + delta, was_integer);
        }
        RepairAction::MultipleOfSnap { instance_path, modulus } => {
            let slot = locate_mut(&mut candidate, instance_path)?;
            let was_integer = slot.is_i64() || slot.is_u64();
            let current = slot.as_f64()?;
            *slot = numeric_value(action::multiple_of_snap(current, *modulus), was_integer);
        }
        RepairAction::PadTruncate { instance_path, target_len } => {
            let slot = locate_mut(&mut candidate, instance_path)?;
            let current = slot.as_str()?;
            *slot = Value::from(action::pad_truncate(current, *target_len));
        }
        RepairAction::AddRequired { instance_path, property, witness } => {
            let slot = locate_mut(&mut candidate, instance_path)?;
            let obj = slot.as_object_mut()?;
            obj.insert(property.clone(), witness.clone());
        }
        RepairAction::RenameProperty { instance_path, from, to } => {
            let slot = locate_mut(&mut candidate, instance_path)?;
            let obj = slot.as_object_mut()?;
            let value = obj.remove(from)?;
            obj.insert(to.clone(), value);
        }
    }
    Some(candidate)
}

/// Write a repaired numeric value back as an `i64` when the slot it
/// replaces was integer-typed and the result is whole, otherwise as an
/// `f64`. `Value::from(f64)` alone would silently turn an
/// originally-integer slot into a JSON `number`, which the structural
/// validator's `type` check would then perpetually reject.
fn numeric_value(value: f64, was_integer: bool) -> Value {
    if was_integer && value.fract() == 0.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn locate_mut<'a>(value: &'a mut Value, pointer: &Pointer) -> Option<&'a mut Value> {
    let mut current = value;
    for token in pointer.tokens() {
        current = match current {
            Value::Object(map) => map.get_mut(token)?,
            Value::Array(items) => items.get_mut(token.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
