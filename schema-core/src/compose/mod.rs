//! The composition engine: static analysis over a [`CanonicalSchema`],
//! producing everything downstream generation and repair need without
//! re-walking the schema themselves.

pub mod arrays;
pub mod gvalid;
pub mod numeric;
pub mod objects;
pub mod oneof;
pub mod refs;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::automata::product::ProductSummary;
use crate::automata::{dfa, nfa, parser, product};
use crate::diag::{DiagCode, Diagnostic, DiagnosticsEnvelope, Phase};
use crate::normalize::{CanonicalSchema, NodeId, SchemaNode};
use crate::pointer::Pointer;
use crate::resolve::Resolver;
use crate::rng::exclusivity_rand;

pub use gvalid::GValidMotif;
pub use numeric::MultipleOfMode;
pub use objects::CoverageEntry;
pub use oneof::Discriminant;
pub use refs::RefMode;

/// Configuration for one [`compose`] run.
#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    pub multiple_of_mode: MultipleOfMode,
    pub ref_mode: RefMode,
    pub regex_state_cap: usize,
    pub seed: u64,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self { multiple_of_mode: MultipleOfMode::Exact, ref_mode: RefMode::Lax, regex_state_cap: 512, seed: 0 }
    }
}

/// Everything the composition engine derives from a canonical schema.
#[derive(Debug, Clone, Default)]
pub struct ComposeResult {
    pub coverage_index: BTreeMap<Pointer, CoverageEntry>,
    pub g_valid: BTreeMap<Pointer, GValidMotif>,
    pub diag: DiagnosticsEnvelope,
    pub name_dfa_summary: BTreeMap<NodeId, ProductSummary>,
    pub branch_decisions: BTreeMap<NodeId, f64>,
}

/// Statically analyze `schema`, walking every arena node once.
#[must_use]
pub fn compose(schema: &CanonicalSchema, opts: &ComposeOptions, resolver: Option<&dyn Resolver>) -> ComposeResult {
    let mut result = ComposeResult::default();

    for (id, node) in schema.iter() {
        let SchemaNode::Object { keywords, .. } = node else { continue };
        let canon_path = schema.pointer_of(id);

        let (_, numeric_diag) = numeric::analyze(keywords, canon_path);
        if let Some(diag) = numeric_diag {
            result.diag.record(diag);
        }

        if let Some(diag) = arrays::analyze(keywords, canon_path) {
            result.diag.record(diag);
        }

        let has_object_universe_keyword =
            keywords.contains_key("properties") || keywords.contains_key("patternProperties") || keywords.contains_key("propertyNames");
        if has_object_universe_keyword {
            let (entry, diag) = objects::analyze(keywords, canon_path);
            if let Some(diag) = diag {
                result.diag.record(diag);
            }
            result.coverage_index.insert(canon_path.clone(), entry);
        }

        if let Some(Value::String(pattern)) = keywords.get("pattern") {
            analyze_pattern(pattern, id, canon_path, opts, &mut result);
        }

        if let Some(Value::Array(branches)) = keywords.get("oneOf") {
            analyze_one_of(branches, id, canon_path, opts, &mut result);
        }

        if let Some(Value::String(uri)) = keywords.get("$ref") {
            if uri.starts_with("http://") || uri.starts_with("https://") {
                analyze_external_ref(uri, canon_path, opts, resolver, &mut result);
            }
        }
    }

    walk_gvalid(schema, schema.root(), gvalid::AncestorFlags::default(), &mut result.g_valid);

    result
}

fn analyze_pattern(pattern: &str, id: NodeId, canon_path: &Pointer, opts: &ComposeOptions, result: &mut ComposeResult) {
    match parser::parse(pattern) {
        Ok(ast) => {
            let n = nfa::compile(&ast.ast);
            let d = dfa::compile(&n);
            let product = product::build(&[d], opts.regex_state_cap);
            let summary = product.summarize();
            if summary.caps_hit {
                result.diag.record(Diagnostic::new(DiagCode::ComplexityCapPatterns, canon_path.clone(), Phase::Compose));
            }
            result.name_dfa_summary.insert(id, summary);
        }
        Err(parser::ParseError::Lookaround | parser::ParseError::Backreference) => {
            result.diag.record(Diagnostic::new(DiagCode::LookaroundOrBackref, canon_path.clone(), Phase::Compose));
        }
        Err(_) => {}
    }
}

fn analyze_one_of(branches: &[Value], id: NodeId, canon_path: &Pointer, opts: &ComposeOptions, result: &mut ComposeResult) {
    if oneof::discriminant(branches) == Discriminant::TieBreak {
        let weight = exclusivity_rand(opts.seed, &canon_path.as_fragment());
        result.branch_decisions.insert(id, weight);
        let details = serde_json::json!({"exclusivityRand": weight});
        result.diag.record_run(Diagnostic::new(DiagCode::OneOfExclusivityTieBreak, canon_path.clone(), Phase::Compose).with_details(details));
    }
}

fn analyze_external_ref(uri: &str, canon_path: &Pointer, opts: &ComposeOptions, resolver: Option<&dyn Resolver>, result: &mut ComposeResult) {
    let Some(resolver) = resolver else {
        let code = match opts.ref_mode {
            RefMode::Strict => DiagCode::UnresolvedReference,
            RefMode::Lax => DiagCode::ExternalRefSkippedLax,
        };
        result.diag.record(Diagnostic::new(code, canon_path.clone(), Phase::Compose).with_details(serde_json::json!({"uri": uri})));
        return;
    };
    if let Err(diag) = refs::resolve_external(resolver, uri, canon_path, opts.ref_mode) {
        result.diag.record(diag);
    }
}

fn walk_gvalid(schema: &CanonicalSchema, id: NodeId, ancestors: gvalid::AncestorFlags, out: &mut BTreeMap<Pointer, GValidMotif>) {
    let motif = gvalid::classify(schema, id, ancestors);
    out.insert(schema.pointer_of(id).clone(), motif);

    let SchemaNode::Object { keywords, children, .. } = schema.get(id) else { return };
    let next_ancestors = ancestors.descend(
        keywords.contains_key("unevaluatedProperties") || keywords.contains_key("unevaluatedItems"),
    );
    for child_id in children.values() {
        walk_gvalid(schema, *child_id, next_ancestors, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, NormalizeOptions};
    use serde_json::json;

    #[test]
    fn end_to_end_contains_unsat_is_fatal() {
        let schema = json!({"type": "array", "maxItems": 2, "minContains": 3, "contains": {}});
        let normalized = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let result = compose(&normalized.canonical, &ComposeOptions::default(), None);
        assert!(result.diag.has_fatal());
    }

    #[test]
    fn coverage_index_built_for_object_nodes() {
        let schema = json!({"type": "object", "properties": {"a": {}, "b": {}}});
        let normalized = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let result = compose(&normalized.canonical, &ComposeOptions::default(), None);
        let entry = result.coverage_index.get(normalized.canonical.pointer_of(normalized.canonical.root())).unwrap();
        assert!(entry.has("a"));
        assert!(entry.has("b"));
    }

    #[test]
    fn one_of_without_discriminant_records_branch_decision() {
        let schema = json!({"oneOf": [{"type": "string"}, {"type": "integer"}]});
        let normalized = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let result = compose(&normalized.canonical, &ComposeOptions::default(), None);
        assert_eq!(result.branch_decisions.len(), 1);
        assert!(result.diag.run.iter().any(|d| d.code == DiagCode::OneOfExclusivityTieBreak));
    }

    #[test]
    fn external_ref_without_resolver_is_lax_warning_by_default() {
        let schema = json!({"$ref": "https://example.com/shared.json"});
        let normalized = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let result = compose(&normalized.canonical, &ComposeOptions::default(), None);
        assert!(!result.diag.has_fatal());
        assert_eq!(result.diag.warn.len(), 1);
    }

    #[test]
    fn simple_object_gets_g_valid_motif_at_root() {
        let schema = json!({"type": "object", "required": ["a"], "properties": {"a": {"type": "string"}}});
        let normalized = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let result = compose(&normalized.canonical, &ComposeOptions::default(), None);
        let root_pointer = normalized.canonical.pointer_of(normalized.canonical.root()).clone();
        assert_eq!(result.g_valid.get(&root_pointer), Some(&GValidMotif::SimpleObjectRequired));
    }
}
