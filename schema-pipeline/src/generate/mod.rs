//! Deterministic instance generation.
//!
//! One master [`SplitMix64`] seeded from the caller's `seed`; every
//! subtree draws a sub-seed mixed from `(canonPath, dimension, counter)`
//! via [`subtree_seed`] rather than sharing the master generator's
//! position, so generation order never depends on how many values a
//! sibling subtree happened to draw. Per-JSON-type strategy lives in its
//! own module, mirroring the teacher's per-domain `worlds/*.rs` split.

pub mod array;
pub mod combinators;
pub mod object;
pub mod scalar;
pub mod sink;

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use schema_core::compose::ComposeResult;
use schema_core::diag::DiagnosticsEnvelope;
use schema_core::normalize::{CanonicalSchema, NodeId, SchemaNode};
use schema_core::pointer::Pointer;
use schema_core::rng::{subtree_seed, SplitMix64};

pub use sink::{CoverageEvent, CoverageSink};

/// Per-run configuration generation actually needs (a narrow slice of
/// [`crate::options::PipelineOptions`] -- this module doesn't otherwise
/// depend on the full options surface).
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    pub enum_cap: usize,
    pub regex_complexity_cap: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { enum_cap: 64, regex_complexity_cap: 512 }
    }
}

/// Threaded through every recursive `generate_at` call: read-only schema
/// and analysis data, plus the write-only coverage sink and the run's
/// informational diagnostics bucket.
pub(crate) struct GenContext<'a> {
    pub schema: &'a CanonicalSchema,
    pub compose: &'a ComposeResult,
    pub enum_cap: usize,
    pub regex_complexity_cap: usize,
    pub seed: u64,
    pub sink: &'a mut CoverageSink,
    pub diag: &'a mut DiagnosticsEnvelope,
}

/// Output of one `generate()` call: every synthesized instance plus the
/// coverage it exercised and the informational diagnostics it recorded
/// along the way.
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub instances: Vec<Value>,
    pub sink: CoverageSink,
    pub diag: DiagnosticsEnvelope,
}

/// Synthesize `count` instances for `schema`, deterministically from `seed`.
#[must_use]
pub fn generate(count: usize, seed: u64, schema: &CanonicalSchema, compose: &ComposeResult, options: &GenerateOptions) -> GenerateOutcome {
    let mut sink = CoverageSink::new();
    let mut diag = DiagnosticsEnvelope::new();
    let mut instances = Vec::with_capacity(count);
    for i in 0..count {
        let instance_seed = subtree_seed(seed, "#", "instance", i as u64);
        let mut ctx = GenContext {
            schema,
            compose,
            enum_cap: options.enum_cap,
            regex_complexity_cap: options.regex_complexity_cap,
            seed: instance_seed,
            sink: &mut sink,
            diag: &mut diag,
        };
        instances.push(generate_at(&mut ctx, schema.root(), &Pointer::root()));
    }
    GenerateOutcome { instances, sink, diag }
}

fn is_object_like(keywords: &Map<String, Value>) -> bool {
    matches!(keywords.get("type"), Some(Value::String(t)) if t == "object")
        || keywords.contains_key("properties")
        || keywords.contains_key("patternProperties")
        || keywords.contains_key("propertyNames")
        || keywords.contains_key("required")
}

fn is_array_like(keywords: &Map<String, Value>) -> bool {
    matches!(keywords.get("type"), Some(Value::String(t)) if t == "array")
        || keywords.contains_key("items")
        || keywords.contains_key("prefixItems")
        || keywords.contains_key("contains")
}

/// Recursively synthesize a value for the schema node at `id`, landing it
/// at `instance_path`.
pub(crate) fn generate_at(ctx: &mut GenContext, id: NodeId, instance_path: &Pointer) -> Value {
    let canon_path = ctx.schema.pointer_of(id).clone();
    let (keywords, children, ref_target) = match ctx.schema.get(id) {
        SchemaNode::Boolean(true) => return Value::Object(Map::new()),
        SchemaNode::Boolean(false) => return Value::Null,
        SchemaNode::Object { keywords, children, ref_target } => (keywords, children, *ref_target),
    };

    if let Some(target) = ref_target {
        return generate_at(ctx, target, instance_path);
    }
    if let Some(const_value) = keywords.get("const") {
        return const_value.clone();
    }
    if let Some(Value::Array(values)) = keywords.get("enum") {
        if let Some(first) = values.first() {
            return first.clone();
        }
    }
    if let Some(Value::Array(branches)) = keywords.get("oneOf") {
        return combinators::generate_one_of(ctx, &canon_path, children, branches.len(), instance_path);
    }
    if let Some(Value::Array(branches)) = keywords.get("anyOf") {
        return combinators::generate_any_of(ctx, &canon_path, children, branches.len(), instance_path);
    }
    if let Some(Value::Array(branches)) = keywords.get("allOf") {
        return combinators::generate_all_of(ctx, children, branches.len(), instance_path);
    }
    if keywords.contains_key("if") && children.contains_key("then") {
        return combinators::generate_if_then_else(ctx, &canon_path, children, instance_path);
    }
    if is_object_like(keywords) {
        return object::generate_object(ctx, &canon_path, keywords, children, instance_path);
    }
    if is_array_like(keywords) {
        return array::generate_array(ctx, &canon_path, keywords, children, instance_path);
    }
    let mut rng = SplitMix64::new(subtree_seed(ctx.seed, &canon_path.as_fragment(), "scalar", 0));
    scalar::generate_scalar(keywords, &mut rng, ctx.regex_complexity_cap)
}

pub(crate) type Children = BTreeMap<String, NodeId>;

#[cfg(test)]
mod tests {
    use super::*;
    use schema_core::compose::{compose, ComposeOptions};
    use schema_core::normalize::{normalize, NormalizeOptions};
    use serde_json::json;

    fn compose_schema(schema: Value) -> (CanonicalSchema, ComposeResult) {
        let normalized = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let result = compose(&normalized.canonical, &ComposeOptions::default(), None);
        (normalized.canonical, result)
    }

    #[test]
    fn generates_required_count_of_instances() {
        let (schema, result) = compose_schema(json!({"type": "object", "properties": {"a": {"type": "string"}}}));
        let outcome = generate(5, 1, &schema, &result, &GenerateOptions::default());
        assert_eq!(outcome.instances.len(), 5);
    }

    #[test]
    fn generation_is_deterministic_for_seed() {
        let (schema, result) = compose_schema(json!({"type": "object", "required": ["a"], "properties": {"a": {"type": "integer", "minimum": 3}}}));
        let a = generate(3, 42, &schema, &result, &GenerateOptions::default());
        let b = generate(3, 42, &schema, &result, &GenerateOptions::default());
        assert_eq!(a.instances, b.instances);
    }

    #[test]
    fn required_property_always_present() {
        let (schema, result) = compose_schema(json!({"type": "object", "required": ["a"], "properties": {"a": {"type": "string"}}}));
        let outcome = generate(4, 7, &schema, &result, &GenerateOptions::default());
        for instance in &outcome.instances {
            assert!(instance.get("a").is_some());
        }
    }

    #[test]
    fn const_value_is_returned_verbatim() {
        let (schema, result) = compose_schema(json!({"const": 42}));
        let outcome = generate(1, 0, &schema, &result, &GenerateOptions::default());
        assert_eq!(outcome.instances[0], json!(42));
    }
}
