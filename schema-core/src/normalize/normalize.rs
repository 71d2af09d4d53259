//! The normalization pass: source schema -> canonical schema + pointer map.
//!
//! Implemented as a single recursive rewrite that walks the origin
//! document and the canonical document in lock step, so every location
//! visited can be recorded in the pointer map the moment it is produced,
//! rather than rewriting first and re-deriving the mapping from scratch
//! afterward. Pure function: the source `Value` is never mutated, matching
//! the teacher's `carrier::compile` contract.

use std::fmt;

use serde_json::{Map, Value};

use crate::pointer::{Pointer, PointerMap, PointerMapError};

use super::dialect::{keyword_table, Dialect, KeywordTable};
use super::notes::Note;
use super::schema::{CanonicalSchema, NodeId, SchemaNode};

const SINGLE_SCHEMA_KEYWORDS: &[&str] =
    &["additionalProperties", "propertyNames", "additionalItems", "contains", "not", "if", "then", "else"];
const ARRAY_SCHEMA_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];
const MAP_SCHEMA_KEYWORDS: &[&str] = &["properties", "patternProperties", "dependentSchemas"];
const ALL_CANONICAL_URLS: &[&str] = &[
    "http://json-schema.org/draft-04/schema#",
    "http://json-schema.org/draft-06/schema#",
    "http://json-schema.org/draft-07/schema#",
    "https://json-schema.org/draft/2019-09/schema",
    "https://json-schema.org/draft/2020-12/schema",
];

/// Options controlling normalization. Currently empty; reserved so callers
/// don't need a breaking signature change when a knob is added.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions;

/// Output of a successful normalization.
#[derive(Debug, Clone)]
pub struct NormalizeResult {
    pub canonical: CanonicalSchema,
    pub pointer_map: PointerMap,
    pub notes: Vec<Note>,
}

/// Why normalization failed outright (as opposed to a [`Note`], which is
/// recoverable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeFailure {
    /// The same canonical pointer was produced from two different origins
    /// -- a structural bug in the rewrite, not a property of the input.
    PointerCollision(PointerMapError),
    /// The root schema is neither a JSON object nor a boolean.
    InvalidRootShape,
}

impl fmt::Display for NormalizeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointerCollision(e) => write!(f, "pointer collision during normalization: {e}"),
            Self::InvalidRootShape => write!(f, "schema root must be a JSON object or boolean"),
        }
    }
}

impl std::error::Error for NormalizeFailure {}

struct Context {
    table: KeywordTable,
    pointer_map: PointerMap,
    notes: Vec<Note>,
}

/// Canonicalize `schema`, producing a [`CanonicalSchema`] arena, the
/// origin/canon [`PointerMap`], and any [`Note`]s.
///
/// # Errors
///
/// Returns [`NormalizeFailure`] if the root isn't a valid schema shape, or
/// (should it ever happen) if the rewrite produces a duplicate canonical
/// pointer for two different origins.
pub fn normalize(schema: &Value, _opts: &NormalizeOptions) -> Result<NormalizeResult, NormalizeFailure> {
    if !schema.is_object() && !schema.is_boolean() {
        return Err(NormalizeFailure::InvalidRootShape);
    }
    let dialect = Dialect::detect(schema);
    let table = keyword_table(dialect);
    let mut ctx = Context { table, pointer_map: PointerMap::new(), notes: Vec::new() };

    let canonical_value = rewrite(schema, &Pointer::root(), &Pointer::root(), &mut ctx)
        .map_err(NormalizeFailure::PointerCollision)?;

    let mut builder = CanonicalSchema::builder();
    let root = build_arena(&canonical_value, &Pointer::root(), &mut builder);
    resolve_refs(&canonical_value, &Pointer::root(), &mut builder, &mut ctx.notes);
    let canonical = builder.finish(root);

    Ok(NormalizeResult { canonical, pointer_map: ctx.pointer_map, notes: ctx.notes })
}

fn rewrite(value: &Value, origin: &Pointer, canon: &Pointer, ctx: &mut Context) -> Result<Value, PointerMapError> {
    ctx.pointer_map.insert(canon.clone(), origin.clone())?;
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Object(map) => rewrite_object(map, origin, canon, ctx),
        other => Ok(other.clone()),
    }
}

fn rewrite_object(map: &Map<String, Value>, origin: &Pointer, canon: &Pointer, ctx: &mut Context) -> Result<Value, PointerMapError> {
    let mut out = Map::new();
    rewrite_exclusive_bounds(map, ctx.table, &mut out);

    for (key, val) in map {
        if matches!(key.as_str(), "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum") {
            continue; // handled by rewrite_exclusive_bounds above
        }
        if key == ctx.table.id_keyword {
            if let Some(id) = val.as_str() {
                if ALL_CANONICAL_URLS.contains(&id) {
                    ctx.notes.push(Note::BundleIdStripped { canon_path: canon.clone(), id: id.to_string() });
                    continue;
                }
            }
            out.insert("$id".to_string(), val.clone());
            continue;
        }
        if key == "$ref" {
            out.insert(key.clone(), rewrite_ref(val, ctx.table));
            continue;
        }
        if MAP_SCHEMA_KEYWORDS.contains(&key.as_str()) || key == ctx.table.definitions_keyword || key == "$defs" || key == "definitions" {
            let mapped_key = map_definitions_key(key, ctx.table);
            let rewritten = rewrite_named_map(val, key, &mapped_key, origin, canon, ctx)?;
            merge_definitions(&mut out, mapped_key, rewritten, canon, ctx);
            continue;
        }
        if ARRAY_SCHEMA_KEYWORDS.contains(&key.as_str()) {
            out.insert(key.clone(), rewrite_array(val, key, origin, canon, ctx)?);
            continue;
        }
        if SINGLE_SCHEMA_KEYWORDS.contains(&key.as_str()) {
            let o = origin.child(key.clone());
            let c = canon.child(key.clone());
            out.insert(key.clone(), rewrite(val, &o, &c, ctx)?);
            continue;
        }
        if key == "items" {
            out.insert(key.clone(), rewrite_items(val, origin, canon, ctx)?);
            continue;
        }
        out.insert(key.clone(), val.clone());
    }
    Ok(Value::Object(out))
}

fn rewrite_exclusive_bounds(map: &Map<String, Value>, table: KeywordTable, out: &mut Map<String, Value>) {
    if table.exclusive_bounds_are_boolean {
        if let Some(min) = map.get("minimum") {
            if matches!(map.get("exclusiveMinimum"), Some(Value::Bool(true))) {
                out.insert("exclusiveMinimum".to_string(), min.clone());
            } else {
                out.insert("minimum".to_string(), min.clone());
            }
        }
        if let Some(max) = map.get("maximum") {
            if matches!(map.get("exclusiveMaximum"), Some(Value::Bool(true))) {
                out.insert("exclusiveMaximum".to_string(), max.clone());
            } else {
                out.insert("maximum".to_string(), max.clone());
            }
        }
    } else {
        for key in ["minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum"] {
            if let Some(v) = map.get(key) {
                out.insert(key.to_string(), v.clone());
            }
        }
    }
}

fn map_definitions_key(key: &str, table: KeywordTable) -> String {
    if key == table.definitions_keyword && key != "$defs" {
        "$defs".to_string()
    } else {
        key.to_string()
    }
}

fn rewrite_named_map(
    val: &Value,
    original_key: &str,
    mapped_key: &str,
    origin: &Pointer,
    canon: &Pointer,
    ctx: &mut Context,
) -> Result<Value, PointerMapError> {
    let Value::Object(entries) = val else {
        return Ok(val.clone());
    };
    let is_schema_map = mapped_key == "$defs" || original_key == "properties" || original_key == "patternProperties" || original_key == "dependentSchemas";
    if !is_schema_map {
        return Ok(val.clone());
    }
    let mut out = Map::new();
    for (name, child) in entries {
        let o = origin.child(original_key.to_string()).child(name.clone());
        let c = canon.child(mapped_key.to_string()).child(name.clone());
        out.insert(name.clone(), rewrite(child, &o, &c, ctx)?);
    }
    Ok(Value::Object(out))
}

fn merge_definitions(out: &mut Map<String, Value>, mapped_key: String, rewritten: Value, canon: &Pointer, ctx: &mut Context) {
    if mapped_key != "$defs" {
        out.insert(mapped_key, rewritten);
        return;
    }
    let Value::Object(new_entries) = rewritten else {
        out.insert(mapped_key, rewritten);
        return;
    };
    let existing = out.entry("$defs".to_string()).or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(existing_map) = existing else { return };
    for (name, val) in new_entries {
        if existing_map.contains_key(&name) {
            ctx.notes.push(Note::DefinitionsDefsConflict { canon_path: canon.clone(), name: name.clone() });
        } else {
            existing_map.insert(name, val);
        }
    }
}

fn rewrite_array(val: &Value, key: &str, origin: &Pointer, canon: &Pointer, ctx: &mut Context) -> Result<Value, PointerMapError> {
    let Value::Array(items) = val else {
        return Ok(val.clone());
    };
    let mut out = Vec::new();
    let mut canon_index = 0usize;
    for (i, item) in items.iter().enumerate() {
        let o = origin.child(key.to_string()).index(i);
        if key == "allOf" && matches!(item, Value::Bool(true)) {
            ctx.notes.push(Note::TrivialBranchUnwrapped { canon_path: canon.child(key.to_string()).index(i) });
            continue;
        }
        if matches!(key, "allOf" | "anyOf" | "oneOf") && matches!(item, Value::Bool(false)) {
            ctx.notes.push(Note::TrivialBranchUnwrapped { canon_path: canon.child(key.to_string()).index(i) });
            continue;
        }
        let c = canon.child(key.to_string()).index(canon_index);
        out.push(rewrite(item, &o, &c, ctx)?);
        canon_index += 1;
    }
    Ok(Value::Array(out))
}

fn rewrite_items(val: &Value, origin: &Pointer, canon: &Pointer, ctx: &mut Context) -> Result<Value, PointerMapError> {
    match val {
        Value::Array(items) => {
            let mut out = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let o = origin.child("items").index(i);
                let c = canon.child("items").index(i);
                out.push(rewrite(item, &o, &c, ctx)?);
            }
            Ok(Value::Array(out))
        }
        _ => {
            let o = origin.child("items");
            let c = canon.child("items");
            rewrite(val, &o, &c, ctx)
        }
    }
}

fn rewrite_ref(val: &Value, table: KeywordTable) -> Value {
    let Some(s) = val.as_str() else { return val.clone() };
    if table.definitions_keyword == "$defs" {
        return val.clone();
    }
    let Some(pointer) = Pointer::parse(s) else { return val.clone() };
    let tokens = pointer.tokens();
    if tokens.first().map(String::as_str) == Some(table.definitions_keyword) {
        let mut rewritten = Pointer::root().child("$defs");
        for t in &tokens[1..] {
            rewritten = rewritten.child(t.clone());
        }
        return Value::String(rewritten.as_fragment());
    }
    val.clone()
}

fn build_arena(value: &Value, pointer: &Pointer, builder: &mut super::schema::CanonicalSchemaBuilder) -> NodeId {
    match value {
        Value::Bool(b) => builder.push(pointer.clone(), SchemaNode::Boolean(*b)),
        Value::Object(map) => {
            let mut children = std::collections::BTreeMap::new();
            for (key, val) in map {
                collect_children(key, val, pointer, builder, &mut children);
            }
            builder.push(pointer.clone(), SchemaNode::Object { keywords: map.clone(), children, ref_target: None })
        }
        _ => builder.push(pointer.clone(), SchemaNode::Boolean(true)),
    }
}

fn collect_children(
    key: &str,
    val: &Value,
    pointer: &Pointer,
    builder: &mut super::schema::CanonicalSchemaBuilder,
    children: &mut std::collections::BTreeMap<String, NodeId>,
) {
    if SINGLE_SCHEMA_KEYWORDS.contains(&key) || (key == "items" && !val.is_array()) {
        if val.is_object() || val.is_boolean() {
            let id = build_arena(val, &pointer.child(key.to_string()), builder);
            children.insert(key.to_string(), id);
        }
        return;
    }
    if key == "items" {
        if let Value::Array(items) = val {
            for (i, item) in items.iter().enumerate() {
                let id = build_arena(item, &pointer.child("items").index(i), builder);
                children.insert(format!("items/{i}"), id);
            }
        }
        return;
    }
    if ARRAY_SCHEMA_KEYWORDS.contains(&key) {
        if let Value::Array(items) = val {
            for (i, item) in items.iter().enumerate() {
                let id = build_arena(item, &pointer.child(key.to_string()).index(i), builder);
                children.insert(format!("{key}/{i}"), id);
            }
        }
        return;
    }
    if key == "$defs" || MAP_SCHEMA_KEYWORDS.contains(&key) {
        if let Value::Object(entries) = val {
            for (name, child) in entries {
                let id = build_arena(child, &pointer.child(key.to_string()).child(name.clone()), builder);
                children.insert(format!("{key}/{name}"), id);
            }
        }
    }
}

fn resolve_refs(value: &Value, pointer: &Pointer, builder: &mut super::schema::CanonicalSchemaBuilder, notes: &mut Vec<Note>) {
    if let Value::Object(map) = value {
        if let Some(Value::String(r)) = map.get("$ref") {
            if let Some(target_ptr) = r.strip_prefix('#').and_then(Pointer::parse) {
                if let Some(this_id) = builder.node_at(pointer) {
                    match builder.node_at(&target_ptr) {
                        Some(target_id) => builder.set_ref_target(this_id, target_id),
                        None => notes.push(Note::UnreachableRefTarget { canon_path: pointer.clone(), reference: r.clone() }),
                    }
                }
            }
        }
        for (key, val) in map {
            walk_refs_children(key, val, pointer, builder, notes);
        }
    }
}

fn walk_refs_children(key: &str, val: &Value, pointer: &Pointer, builder: &mut super::schema::CanonicalSchemaBuilder, notes: &mut Vec<Note>) {
    match val {
        Value::Object(_) | Value::Bool(_) if SINGLE_SCHEMA_KEYWORDS.contains(&key) => {
            resolve_refs(val, &pointer.child(key.to_string()), builder, notes);
        }
        Value::Array(items) if key == "items" || ARRAY_SCHEMA_KEYWORDS.contains(&key) => {
            for (i, item) in items.iter().enumerate() {
                resolve_refs(item, &pointer.child(key.to_string()).index(i), builder, notes);
            }
        }
        Value::Object(_) if key == "items" => {
            resolve_refs(val, &pointer.child("items"), builder, notes);
        }
        Value::Object(entries) if key == "$defs" || MAP_SCHEMA_KEYWORDS.contains(&key) => {
            for (name, child) in entries {
                resolve_refs(child, &pointer.child(key.to_string()).child(name.clone()), builder, notes);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pure_function_leaves_source_untouched() {
        let schema = json!({"type": "object", "definitions": {"x": {"type": "string"}}});
        let before = schema.clone();
        let _ = normalize(&schema, &NormalizeOptions).unwrap();
        assert_eq!(schema, before);
    }

    #[test]
    fn relocates_definitions_to_defs() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "definitions": {"x": {"type": "string"}},
            "$ref": "#/definitions/x"
        });
        let result = normalize(&schema, &NormalizeOptions).unwrap();
        let root = result.canonical.get(result.canonical.root());
        let SchemaNode::Object { keywords, .. } = root else { panic!("root must be object") };
        assert!(keywords.contains_key("$defs"));
        assert!(!keywords.contains_key("definitions"));
        assert_eq!(keywords.get("$ref").unwrap(), "#/$defs/x");
    }

    #[test]
    fn pointer_map_round_trips() {
        let schema = json!({"definitions": {"x": {"type": "string"}}});
        let result = normalize(&schema, &NormalizeOptions).unwrap();
        let canon = Pointer::parse("/$defs/x").unwrap();
        let origin = result.pointer_map.origin_of(&canon).unwrap();
        assert_eq!(origin.as_str(), "/definitions/x");
    }

    #[test]
    fn drops_trivial_allof_true_branch() {
        let schema = json!({"allOf": [true, {"type": "string"}]});
        let result = normalize(&schema, &NormalizeOptions).unwrap();
        assert!(result.notes.iter().any(|n| matches!(n, Note::TrivialBranchUnwrapped { .. })));
        let root = result.canonical.get(result.canonical.root());
        let SchemaNode::Object { keywords, .. } = root else { panic!() };
        assert_eq!(keywords.get("allOf").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn draft4_boolean_exclusive_minimum_converted() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "minimum": 5,
            "exclusiveMinimum": true
        });
        let result = normalize(&schema, &NormalizeOptions).unwrap();
        let root = result.canonical.get(result.canonical.root());
        let SchemaNode::Object { keywords, .. } = root else { panic!() };
        assert_eq!(keywords.get("exclusiveMinimum").unwrap(), 5);
        assert!(!keywords.contains_key("minimum"));
    }

    #[test]
    fn bundled_colliding_id_is_stripped() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$id": "http://json-schema.org/draft-07/schema#",
            "type": "object"
        });
        let result = normalize(&schema, &NormalizeOptions).unwrap();
        assert!(result.notes.iter().any(|n| matches!(n, Note::BundleIdStripped { .. })));
        let root = result.canonical.get(result.canonical.root());
        let SchemaNode::Object { keywords, .. } = root else { panic!() };
        assert!(!keywords.contains_key("$id"));
    }

    #[test]
    fn arena_resolves_local_ref() {
        let schema = json!({
            "$defs": {"x": {"type": "string"}},
            "properties": {"a": {"$ref": "#/$defs/x"}}
        });
        let result = normalize(&schema, &NormalizeOptions).unwrap();
        let root_id = result.canonical.root();
        let SchemaNode::Object { children, .. } = result.canonical.get(root_id) else { panic!() };
        let prop_a = *children.get("properties/a").unwrap();
        let SchemaNode::Object { ref_target, .. } = result.canonical.get(prop_a) else { panic!() };
        assert!(ref_target.is_some());
    }

    #[test]
    fn invalid_root_shape_rejected() {
        let schema = json!("not a schema");
        assert_eq!(normalize(&schema, &NormalizeOptions).unwrap_err(), NormalizeFailure::InvalidRootShape);
    }

    #[test]
    fn resolve_property_follows_ref_behind_an_allof_branch() {
        let schema = json!({
            "$defs": {"shared": {"properties": {"count": {"type": "integer", "minimum": 3}}}},
            "allOf": [{"$ref": "#/$defs/shared"}]
        });
        let result = normalize(&schema, &NormalizeOptions).unwrap();
        let root_id = result.canonical.root();
        let (resolved, via) = result.canonical.resolve_property(root_id, "count").unwrap();
        assert_eq!(via, vec![0]);
        let SchemaNode::Object { keywords, .. } = result.canonical.get(resolved) else { panic!() };
        assert_eq!(keywords.get("minimum").unwrap(), 3);
    }

    #[test]
    fn resolve_property_returns_none_for_absent_property() {
        let schema = json!({"properties": {"a": {"type": "string"}}});
        let result = normalize(&schema, &NormalizeOptions).unwrap();
        let root_id = result.canonical.root();
        assert!(result.canonical.resolve_property(root_id, "missing").is_none());
    }
}
