//! Object instance generation: required properties first, then enough of
//! the admissible key universe to satisfy `must_cover` presence pressure.

use serde_json::{Map, Value};

use schema_core::diag::{DiagCode, Diagnostic, Phase};
use schema_core::normalize::NodeId;
use schema_core::pointer::Pointer;

use super::{generate_at, Children, CoverageEvent, GenContext};

/// Synthesize an object honoring `required` and, when the universe is
/// closed and presence pressure demands it, enough extra keys to reach
/// `minProperties` without stepping outside the declared/enumerated names.
pub(crate) fn generate_object(ctx: &mut GenContext, canon_path: &Pointer, keywords: &Map<String, Value>, children: &Children, instance_path: &Pointer) -> Value {
    let mut obj = Map::new();

    let required: Vec<String> = keywords
        .get("required")
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();

    for name in &required {
        insert_property(ctx, canon_path, children, &mut obj, name, instance_path);
        ctx.sink.push(CoverageEvent {
            canon_path: canon_path.clone(),
            dimension: "structure",
            operation_key: format!("required:{name}"),
            instance_path: instance_path.child(name.clone()),
        });
    }

    if let Some(entry) = ctx.compose.coverage_index.get(canon_path) {
        if entry.must_cover {
            let min_properties = keywords.get("minProperties").and_then(Value::as_u64).unwrap_or(0) as usize;
            if let Some(names) = entry.enumerate() {
                for name in names {
                    if obj.len() >= min_properties {
                        break;
                    }
                    if obj.contains_key(name) {
                        continue;
                    }
                    insert_property(ctx, canon_path, children, &mut obj, name, instance_path);
                }
            }
        }
    }

    Value::Object(obj)
}

/// Resolve `name`'s subschema starting from the object node at `canon_path`,
/// following `$ref` edges and descending into `allOf` branches when the
/// property isn't declared directly. A property sourced through `allOf`
/// records `EVALTRACE_PROP_SOURCE` so a consumer can see it wasn't declared
/// at the node itself.
fn insert_property(ctx: &mut GenContext, canon_path: &Pointer, children: &Children, obj: &mut Map<String, Value>, name: &str, instance_path: &Pointer) {
    let child_path = instance_path.child(name.to_string());
    let node_id = ctx.schema.node_at(canon_path);
    let resolved: Option<(NodeId, Vec<usize>)> = node_id.and_then(|id| ctx.schema.resolve_property(id, name));

    let value = match resolved.as_ref() {
        Some((id, _via)) => generate_at(ctx, *id, &child_path),
        None => match children.get(&format!("properties/{name}")) {
            Some(id) => generate_at(ctx, *id, &child_path),
            None => Value::String(String::new()),
        },
    };

    if let Some((_, via)) = &resolved {
        if !via.is_empty() {
            let details = serde_json::json!({"name": name, "via": via.iter().map(|i| format!("allOf/{i}")).collect::<Vec<_>>()});
            ctx.diag.record_run(Diagnostic::new(DiagCode::EvalTracePropSource, canon_path.clone(), Phase::Generate).with_details(details));
        }
    }

    obj.insert(name.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_core::compose::{compose, ComposeOptions};
    use schema_core::diag::DiagnosticsEnvelope;
    use schema_core::normalize::{normalize, NormalizeOptions};
    use serde_json::json;

    fn compose_schema(schema: Value) -> (schema_core::normalize::CanonicalSchema, schema_core::compose::ComposeResult) {
        let normalized = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let result = compose(&normalized.canonical, &ComposeOptions::default(), None);
        (normalized.canonical, result)
    }

    fn root_keywords_and_children(schema: &schema_core::normalize::CanonicalSchema) -> (Map<String, Value>, Children) {
        match schema.get(schema.root()) {
            schema_core::normalize::SchemaNode::Object { keywords, children, .. } => (keywords.clone(), children.clone()),
            schema_core::normalize::SchemaNode::Boolean(_) => unreachable!(),
        }
    }

    #[test]
    fn required_properties_are_typed_by_their_subschema() {
        let (schema, result) = compose_schema(json!({
            "type": "object",
            "required": ["count"],
            "properties": {"count": {"type": "integer", "minimum": 3}}
        }));
        let (keywords, children) = root_keywords_and_children(&schema);
        let mut ctx_sink = super::super::CoverageSink::new();
        let mut ctx_diag = DiagnosticsEnvelope::new();
        let mut ctx = GenContext { schema: &schema, compose: &result, enum_cap: 64, regex_complexity_cap: 512, seed: 1, sink: &mut ctx_sink, diag: &mut ctx_diag };
        let value = generate_object(&mut ctx, &Pointer::root(), &keywords, &children, &Pointer::root());
        assert!(value.get("count").unwrap().as_i64().unwrap() >= 3);
    }

    #[test]
    fn must_cover_pads_to_min_properties_from_closed_universe() {
        let (schema, result) = compose_schema(json!({
            "type": "object",
            "properties": {"a": {}, "b": {}, "c": {}},
            "required": ["a"],
            "minProperties": 3,
            "additionalProperties": false
        }));
        let (keywords, children) = root_keywords_and_children(&schema);
        let mut ctx_sink = super::super::CoverageSink::new();
        let mut ctx_diag = DiagnosticsEnvelope::new();
        let mut ctx = GenContext { schema: &schema, compose: &result, enum_cap: 64, regex_complexity_cap: 512, seed: 9, sink: &mut ctx_sink, diag: &mut ctx_diag };
        let value = generate_object(&mut ctx, &Pointer::root(), &keywords, &children, &Pointer::root());
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn required_property_sourced_through_all_of_records_eval_trace() {
        let (schema, result) = compose_schema(json!({
            "type": "object",
            "required": ["count"],
            "allOf": [{"properties": {"count": {"type": "integer", "minimum": 3}}}]
        }));
        let (keywords, children) = root_keywords_and_children(&schema);
        let mut ctx_sink = super::super::CoverageSink::new();
        let mut ctx_diag = DiagnosticsEnvelope::new();
        let mut ctx = GenContext { schema: &schema, compose: &result, enum_cap: 64, regex_complexity_cap: 512, seed: 1, sink: &mut ctx_sink, diag: &mut ctx_diag };
        let value = generate_object(&mut ctx, &Pointer::root(), &keywords, &children, &Pointer::root());
        assert!(value.get("count").unwrap().as_i64().unwrap() >= 3);
        assert!(ctx_diag.run.iter().any(|d| d.code == schema_core::diag::DiagCode::EvalTracePropSource));
    }
}
