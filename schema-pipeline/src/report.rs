//! Assembles the `coverage-report/v1` JSON document.
//!
//! Follows the teacher's `harness::bundle` pattern: build the document with
//! `serde_json::json!` directly rather than a derive-`Serialize` struct,
//! since the wire shape (key casing, nesting) is the contract, not a Rust
//! type the caller is meant to construct by hand.

use serde_json::{json, Value};

use schema_core::diag::{ContentHash, DiagnosticsEnvelope};
use schema_repair::ActionLog;

use crate::evaluator::EvaluationResult;
use crate::planner::PlannerCapHit;

const SUMMARY_UNCOVERED_CAP: usize = 200;

/// Everything [`build`] needs to assemble one report.
pub struct ReportInput<'a> {
    pub schema_hash: &'a ContentHash,
    pub seed: u64,
    pub max_instances: usize,
    pub actual_instances: usize,
    pub dimensions_enabled: Vec<&'static str>,
    pub exclude_unreachable: bool,
    pub started_at_ms: u128,
    pub duration_ms: u128,
    pub summary_mode: bool,
    pub evaluation: &'a EvaluationResult,
    pub planner_caps_hit: &'a [PlannerCapHit],
    pub min_coverage_overall: Option<f64>,
    pub diag: &'a DiagnosticsEnvelope,
    pub repair_logs: &'a [ActionLog],
}

fn diagnostic_json(diagnostic: &schema_core::diag::Diagnostic) -> Value {
    json!({
        "code": diagnostic.code.to_string(),
        "canonPath": diagnostic.canon_path.as_fragment(),
        "phase": diagnostic.phase.to_string(),
        "provable": diagnostic.provable,
        "details": diagnostic.details,
    })
}

/// Assemble the final `coverage-report/v1` document.
#[must_use]
pub fn build(input: &ReportInput) -> Value {
    let evaluation = input.evaluation;
    let coverage_status = if evaluation.is_fully_covered() { "full" } else { "partial" };

    let mut uncovered: Vec<Value> = evaluation
        .uncovered_targets()
        .into_iter()
        .map(|t| json!({"id": t.id, "dimension": t.dimension, "canonPath": t.canon_path.as_fragment(), "operationKey": t.operation_key}))
        .collect();
    let uncovered_truncated = input.summary_mode && uncovered.len() > SUMMARY_UNCOVERED_CAP;
    if uncovered_truncated {
        uncovered.truncate(SUMMARY_UNCOVERED_CAP);
    }

    let targets: Vec<Value> = if input.summary_mode {
        Vec::new()
    } else {
        evaluation
            .targets
            .iter()
            .map(|t| {
                json!({
                    "id": t.target.id,
                    "dimension": t.target.dimension,
                    "canonPath": t.target.canon_path.as_fragment(),
                    "operationKey": t.target.operation_key,
                    "status": target_status_str(t.status),
                })
            })
            .collect()
    };

    let by_dimension: serde_json::Map<String, Value> = evaluation
        .by_dimension
        .iter()
        .map(|(dimension, counts)| ((*dimension).to_string(), json!({"covered": counts.covered, "total": counts.total})))
        .collect();
    let by_operation: serde_json::Map<String, Value> = evaluation
        .by_operation
        .iter()
        .map(|(operation_key, counts)| (operation_key.clone(), json!({"covered": counts.covered, "total": counts.total})))
        .collect();
    let targets_by_status: serde_json::Map<String, Value> =
        evaluation.targets_by_status().into_iter().map(|(status, count)| (target_status_str(status).to_string(), json!(count))).collect();

    let repair_summary: Vec<Value> = input
        .repair_logs
        .iter()
        .map(|log| json!({"attempted": log.records().len(), "accepted": log.accepted_count()}))
        .collect();

    let planner_caps_hit: Vec<Value> =
        input.planner_caps_hit.iter().map(|hit| json!({"dimension": hit.dimension, "operationKey": hit.operation_key})).collect();

    let thresholds = input.min_coverage_overall.map(|overall| json!({"overall": overall}));

    json!({
        "version": "coverage-report/v1",
        "reportMode": if input.summary_mode { "summary" } else { "full" },
        "engine": {"name": "schema-pipeline", "version": env!("CARGO_PKG_VERSION")},
        "run": {
            "schemaHash": input.schema_hash.as_str(),
            "seed": input.seed,
            "masterSeed": input.seed,
            "maxInstances": input.max_instances,
            "actualInstances": input.actual_instances,
            "dimensionsEnabled": input.dimensions_enabled,
            "excludeUnreachable": input.exclude_unreachable,
            "startedAt": input.started_at_ms,
            "durationMs": input.duration_ms,
        },
        "metrics": {
            "coverageStatus": coverage_status,
            "overall": {"covered": evaluation.overall.covered, "total": evaluation.overall.total},
            "byDimension": by_dimension,
            "byOperation": by_operation,
            "targetsByStatus": targets_by_status,
            "thresholds": thresholds,
            "repair": repair_summary,
        },
        "targets": targets,
        "uncoveredTargets": uncovered,
        "uncoveredTargetsTruncated": uncovered_truncated,
        "unsatisfiedHints": input.diag.unsat_hints.iter().map(diagnostic_json).collect::<Vec<_>>(),
        "diagnostics": {
            "fatal": input.diag.fatal.iter().map(diagnostic_json).collect::<Vec<_>>(),
            "warn": input.diag.warn.iter().map(diagnostic_json).collect::<Vec<_>>(),
            "plannerCapsHit": planner_caps_hit,
            "notes": input.diag.run.iter().map(diagnostic_json).collect::<Vec<_>>(),
        },
    })
}

fn target_status_str(status: crate::evaluator::TargetStatus) -> &'static str {
    match status {
        crate::evaluator::TargetStatus::Covered => "covered",
        crate::evaluator::TargetStatus::Uncovered => "uncovered",
        crate::evaluator::TargetStatus::Unreachable => "unreachable",
    }
}
