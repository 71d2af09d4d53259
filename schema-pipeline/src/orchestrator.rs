//! The pipeline orchestrator: wires normalize → compose → plan → generate
//! → repair → validate → report into one fail-closed run, the way the
//! teacher's `runner::run` wires kernel stages into one bundle without
//! owning any of their logic itself.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use schema_core::compose::{compose, CoverageEntry, ComposeOptions, ComposeResult};
use schema_core::diag::{canonical_hash, canonical_json_bytes, domain, DiagCode, Diagnostic, Phase};
use schema_core::normalize::{normalize, CanonicalSchema, NormalizeFailure, NormalizeOptions};
use schema_core::pointer::Pointer;
use schema_repair::{repair, DistinctSignatureScorer, RepairError, RepairPolicy, RepairWorld, Validator};

use crate::evaluator::evaluate;
use crate::generate::{generate, GenerateOptions};
use crate::options::{validate as validate_options, OptionsError, PipelineOptions};
use crate::planner::plan;
use crate::report::{build, ReportInput};
use crate::validator::StructuralValidator;

/// Outcome of one named pipeline stage.
#[derive(Debug, Clone)]
pub enum StageStatus {
    Completed,
    Skipped,
    Failed(String),
}

/// Everything one `Pipeline::run` call produces.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub report: Value,
    pub instances: Vec<Value>,
    pub stages: Vec<(&'static str, StageStatus)>,
}

/// Why the orchestrator refused to run at all, before any stage executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    InvalidOptions(OptionsError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOptions(e) => write!(f, "invalid options: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {}

struct PipelineWorld<'a> {
    schema: &'a CanonicalSchema,
    coverage_index: &'a BTreeMap<Pointer, CoverageEntry>,
    validator: StructuralValidator<'a>,
}

impl RepairWorld for PipelineWorld<'_> {
    fn schema(&self) -> &CanonicalSchema {
        self.schema
    }

    fn coverage_index(&self) -> &BTreeMap<Pointer, CoverageEntry> {
        self.coverage_index
    }

    fn validator(&self) -> &dyn Validator {
        &self.validator
    }
}

/// Canon paths the compose phase proved fatally unsatisfiable, when
/// `excludeUnreachable` asks the evaluator to drop targets rooted there.
fn unreachable_canon_paths(compose_result: &ComposeResult, exclude_unreachable: bool) -> BTreeSet<String> {
    if !exclude_unreachable {
        return BTreeSet::new();
    }
    compose_result.diag.fatal.iter().map(|d| d.canon_path.as_fragment()).collect()
}

/// Runs the full schema-to-coverage-report pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Execute one pipeline run over `schema_value`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidOptions`] if `options` fails
    /// [`crate::options::validate`]; every later failure (normalize,
    /// compose) is reported as a [`StageStatus::Failed`] entry instead of
    /// a `Result::Err`, so a caller always gets a `PipelineResult` back.
    pub fn run(schema_value: &Value, options: &PipelineOptions) -> Result<PipelineResult, PipelineError> {
        validate_options(options).map_err(PipelineError::InvalidOptions)?;

        let started_at = std::time::SystemTime::now();
        let started_at_ms = started_at.duration_since(std::time::UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
        let clock = std::time::Instant::now();

        let mut stages: Vec<(&'static str, StageStatus)> = Vec::new();

        let normalized = match normalize(schema_value, &NormalizeOptions::default()) {
            Ok(normalized) => {
                stages.push(("normalize", StageStatus::Completed));
                normalized
            }
            Err(failure) => {
                stages.push(("normalize", StageStatus::Failed(describe_normalize_failure(&failure))));
                return Ok(failed_result(stages));
            }
        };
        let schema = &normalized.canonical;

        let compose_opts = ComposeOptions { multiple_of_mode: options.multiple_of_mode, ref_mode: options.ref_mode, regex_state_cap: options.regex_complexity_cap, seed: options.seed };
        let composed = compose(schema, &compose_opts, None);
        stages.push(("compose", StageStatus::Completed));

        if composed.diag.has_fatal() {
            stages.push(("plan", StageStatus::Skipped));
            stages.push(("generate", StageStatus::Skipped));
            stages.push(("repair", StageStatus::Skipped));
            let schema_hash = canonical_hash(domain::SCHEMA, &canonical_json_bytes(schema_value));
            let evaluation = evaluate(&[], &[], &BTreeSet::new());
            let report = build(&ReportInput {
                schema_hash: &schema_hash,
                seed: options.seed,
                max_instances: options.count,
                actual_instances: 0,
                dimensions_enabled: options.dimensions.enabled(),
                exclude_unreachable: options.exclude_unreachable,
                started_at_ms,
                duration_ms: clock.elapsed().as_millis(),
                summary_mode: options.summary_mode,
                evaluation: &evaluation,
                planner_caps_hit: &[],
                min_coverage_overall: options.min_coverage_overall,
                diag: &composed.diag,
                repair_logs: &[],
            });
            return Ok(PipelineResult { report, instances: Vec::new(), stages });
        }

        let plan_outcome = plan(schema, &composed, options.dimensions, options.max_targets_per_dimension, options.max_targets_per_operation);
        stages.push(("plan", StageStatus::Completed));

        let generate_opts = GenerateOptions { enum_cap: options.enum_cap, regex_complexity_cap: options.regex_complexity_cap };
        let mut outcome = generate(options.count, options.seed, schema, &composed, &generate_opts);
        stages.push(("generate", StageStatus::Completed));

        let validator = StructuralValidator::new(schema);
        let world = PipelineWorld { schema, coverage_index: &composed.coverage_index, validator };
        let scorer = DistinctSignatureScorer;
        let policy = RepairPolicy { attempts_remaining: options.repair_attempts_budget, stagnation_budget: options.repair_stagnation_budget, in_g_valid: false };

        let mut diag = composed.diag.clone();
        diag.merge(outcome.diag.clone());
        let mut repair_logs = Vec::with_capacity(outcome.instances.len());
        for (index, instance) in outcome.instances.iter_mut().enumerate() {
            let initial_errors = world.validator().validate(instance);
            if initial_errors.is_empty() {
                continue;
            }
            let repair_outcome = repair(instance.clone(), &world, &scorer, &policy);
            if let Err(failure) = &repair_outcome.result {
                diag.record(repair_failure_diagnostic(failure, index));
            }
            *instance = repair_outcome.instance;
            repair_logs.push(repair_outcome.log);
        }
        stages.push(("repair", StageStatus::Completed));

        let unreachable = unreachable_canon_paths(&composed, options.exclude_unreachable);
        let evaluation = evaluate(&plan_outcome.targets, outcome.sink.events(), &unreachable);
        stages.push(("evaluate", StageStatus::Completed));

        let schema_hash = canonical_hash(domain::SCHEMA, &canonical_json_bytes(schema_value));
        let report = build(&ReportInput {
            schema_hash: &schema_hash,
            seed: options.seed,
            max_instances: options.count,
            actual_instances: outcome.instances.len(),
            dimensions_enabled: options.dimensions.enabled(),
            exclude_unreachable: options.exclude_unreachable,
            started_at_ms,
            duration_ms: clock.elapsed().as_millis(),
            summary_mode: options.summary_mode,
            evaluation: &evaluation,
            planner_caps_hit: &plan_outcome.planner_caps_hit_entries,
            min_coverage_overall: options.min_coverage_overall,
            diag: &diag,
            repair_logs: &repair_logs,
        });
        stages.push(("report", StageStatus::Completed));

        Ok(PipelineResult { report, instances: outcome.instances, stages })
    }
}

/// Translate a repair failure into a wire-level diagnostic so a report
/// consumer can see *why* an instance came out still failing validation,
/// instead of only noticing via its own re-validation pass.
fn repair_failure_diagnostic(failure: &RepairError, instance_index: usize) -> Diagnostic {
    let (code, canon_path) = match failure {
        RepairError::MustCoverIndexMissing { canon_path } => (DiagCode::MustCoverIndexMissing, Pointer::parse(canon_path).unwrap_or_else(Pointer::root)),
        RepairError::RepairEvalGuardFail { .. } => (DiagCode::RepairEvalGuardFail, Pointer::root()),
        RepairError::RepairRenamePreflightFail => (DiagCode::RepairRenamePreflightFail, Pointer::root()),
        RepairError::UnsatBudgetExhausted { .. } => (DiagCode::UnsatBudgetExhausted, Pointer::root()),
    };
    let details = serde_json::json!({"instanceIndex": instance_index, "message": failure.to_string()});
    Diagnostic::new(code, canon_path, Phase::Repair).with_details(details)
}

fn failed_result(stages: Vec<(&'static str, StageStatus)>) -> PipelineResult {
    PipelineResult { report: serde_json::json!({"version": "coverage-report/v1", "reportMode": "failed"}), instances: Vec::new(), stages }
}

fn describe_normalize_failure(failure: &NormalizeFailure) -> String {
    format!("{failure:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn runs_end_to_end_on_a_simple_object_schema() {
        let schema = json!({"type": "object", "required": ["name"], "properties": {"name": {"type": "string", "minLength": 1}}});
        let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
        assert_eq!(result.instances.len(), PipelineOptions::default().count);
        assert_eq!(result.report["version"], json!("coverage-report/v1"));
    }

    #[test]
    fn rejects_invalid_options_before_any_stage_runs() {
        let schema = json!({"type": "object"});
        let options = PipelineOptions { count: 0, ..PipelineOptions::default() };
        let err = Pipeline::run(&schema, &options).unwrap_err();
        assert_eq!(err, PipelineError::InvalidOptions(OptionsError::ZeroCount));
    }

    #[test]
    fn fatal_unsat_schema_skips_generation() {
        let schema = json!({"type": "integer", "minimum": 10, "maximum": 5});
        let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
        assert!(result.instances.is_empty());
        assert!(matches!(result.stages.iter().find(|(name, _)| *name == "generate").unwrap().1, StageStatus::Skipped));
    }

    #[test]
    fn repaired_instances_pass_the_structural_validator() {
        let schema = json!({"type": "integer", "minimum": 100});
        let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
        let normalized = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let validator = StructuralValidator::new(&normalized.canonical);
        for instance in &result.instances {
            assert!(validator.validate(instance).is_empty());
        }
    }

    #[test]
    fn exhausted_repair_surfaces_a_warn_diagnostic() {
        // minimum == maximum but multipleOf is incompatible with both: the
        // nudge and snap actions perpetually trade one violation for the
        // other, so repair can never reach a zero-error fixed point.
        let schema = json!({"type": "integer", "minimum": 10, "maximum": 10, "multipleOf": 3});
        let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
        assert!(result.report["diagnostics"]["warn"].as_array().unwrap().iter().any(|d| d["code"] == json!("UNSAT_BUDGET_EXHAUSTED") && d["phase"] == json!("repair")));
    }

    #[test]
    fn must_cover_index_missing_surfaces_its_own_code() {
        let diagnostic = repair_failure_diagnostic(&RepairError::MustCoverIndexMissing { canon_path: "#".to_string() }, 0);
        assert_eq!(diagnostic.code, DiagCode::MustCoverIndexMissing);
    }

    #[test]
    fn repair_eval_guard_fail_surfaces_its_own_code() {
        let diagnostic = repair_failure_diagnostic(&RepairError::RepairEvalGuardFail { candidate: "b".to_string() }, 0);
        assert_eq!(diagnostic.code, DiagCode::RepairEvalGuardFail);
    }

    #[test]
    fn repair_rename_preflight_fail_surfaces_its_own_code() {
        let diagnostic = repair_failure_diagnostic(&RepairError::RepairRenamePreflightFail, 0);
        assert_eq!(diagnostic.code, DiagCode::RepairRenamePreflightFail);
    }
}
