//! Black-box conformance tests: drive the pipeline end to end from a raw
//! JSON Schema value, the way a caller outside this workspace would.

use schema_core::normalize::{normalize, NormalizeOptions};
use schema_pipeline::orchestrator::Pipeline;
use schema_pipeline::options::PipelineOptions;
use schema_pipeline::validator::StructuralValidator;
use schema_repair::{Validator, ValidationError};
use serde_json::json;

fn validation_errors_for(schema: &serde_json::Value, instance: &serde_json::Value) -> Vec<ValidationError> {
    let canonical = normalize(schema, &NormalizeOptions::default()).unwrap().canonical;
    StructuralValidator::new(&canonical).validate(instance)
}

#[test]
fn simple_object_schema_produces_conformant_instances() {
    let schema = json!({
        "type": "object",
        "required": ["id", "name"],
        "properties": {
            "id": {"type": "integer", "minimum": 1},
            "name": {"type": "string", "minLength": 1, "maxLength": 20}
        },
        "additionalProperties": false
    });
    let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
    assert_eq!(result.instances.len(), PipelineOptions::default().count);
    for instance in &result.instances {
        assert!(validation_errors_for(&schema, instance).is_empty());
    }
}

#[test]
fn numeric_bounds_are_honored_across_the_batch() {
    let schema = json!({"type": "number", "minimum": 10.5, "maximum": 20.0, "multipleOf": 0.5});
    let options = PipelineOptions { count: 16, ..PipelineOptions::default() };
    let result = Pipeline::run(&schema, &options).unwrap();
    for instance in &result.instances {
        let v = instance.as_f64().unwrap();
        assert!((10.5..=20.0).contains(&v));
    }
}

#[test]
fn tuple_items_and_contains_are_satisfied() {
    let schema = json!({
        "type": "array",
        "prefixItems": [{"type": "string"}, {"type": "integer"}],
        "items": {"type": "boolean"},
        "contains": {"const": true},
        "minItems": 3
    });
    let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
    for instance in &result.instances {
        let items = instance.as_array().unwrap();
        assert!(items.len() >= 3);
        assert!(items.contains(&json!(true)));
    }
}

#[test]
fn one_of_selects_exactly_one_admissible_branch() {
    let schema = json!({"oneOf": [
        {"type": "string", "const": "a"},
        {"type": "integer", "const": 1}
    ]});
    let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
    for instance in &result.instances {
        assert!(*instance == json!("a") || *instance == json!(1));
    }
}

#[test]
fn fatal_unsat_schema_yields_an_empty_batch_with_diagnostics() {
    let schema = json!({"type": "integer", "minimum": 10, "maximum": 5});
    let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
    assert!(result.instances.is_empty());
    assert!(!result.report["diagnostics"]["fatal"].as_array().unwrap().is_empty());
}

#[test]
fn repair_converges_on_an_out_of_range_required_property() {
    let schema = json!({
        "type": "object",
        "required": ["score"],
        "properties": {"score": {"type": "integer", "minimum": 1000}}
    });
    let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
    for instance in &result.instances {
        assert!(validation_errors_for(&schema, instance).is_empty());
    }
}

#[test]
fn same_seed_and_schema_produce_identical_instances() {
    let schema = json!({
        "type": "object",
        "required": ["a", "b"],
        "properties": {"a": {"type": "string", "pattern": "^(?:x|y|z)$"}, "b": {"type": "integer", "minimum": 0, "maximum": 100}}
    });
    let options = PipelineOptions { seed: 1234, ..PipelineOptions::default() };
    let first = Pipeline::run(&schema, &options).unwrap();
    let second = Pipeline::run(&schema, &options).unwrap();
    assert_eq!(first.instances, second.instances);
    assert_eq!(first.report, second.report);
}

#[test]
fn different_seeds_need_not_agree() {
    let schema = json!({"oneOf": [{"const": 1}, {"const": 2}, {"const": 3}, {"const": 4}, {"const": 5}]});
    let a = Pipeline::run(&schema, &PipelineOptions { seed: 1, ..PipelineOptions::default() }).unwrap();
    let b = Pipeline::run(&schema, &PipelineOptions { seed: 2, ..PipelineOptions::default() }).unwrap();
    // Not asserting inequality (a collision is legal), only that both runs
    // are internally self-consistent and well-formed.
    assert_eq!(a.instances.len(), b.instances.len());
}

#[test]
fn invalid_options_are_rejected_before_any_stage_runs() {
    let schema = json!({"type": "object"});
    let options = PipelineOptions { enum_cap: 0, ..PipelineOptions::default() };
    assert!(Pipeline::run(&schema, &options).is_err());
}

#[test]
fn coverage_report_tracks_required_and_boundary_targets() {
    let schema = json!({
        "type": "object",
        "required": ["count"],
        "properties": {"count": {"type": "integer", "minimum": 0, "maximum": 10}}
    });
    let result = Pipeline::run(&schema, &PipelineOptions::default()).unwrap();
    assert_eq!(result.report["metrics"]["coverageStatus"], json!("full"));
}
