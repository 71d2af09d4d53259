//! Reference structural validator: the in-process [`Validator`] implementation
//! the orchestrator wires into [`schema_repair::RepairWorld`] by default.
//! Re-checks type, bounds, `required`, `pattern`, `enum`/`const` -- the same
//! keyword surface `generate` targets, not a general-purpose JSON Schema
//! validator.

use serde_json::{Number, Value};

use schema_core::automata::{dfa, nfa, parser};
use schema_core::compose::numeric;
use schema_core::normalize::{CanonicalSchema, NodeId, SchemaNode};
use schema_core::pointer::Pointer;
use schema_repair::{ValidationError, Validator};

/// Validates an instance against a [`CanonicalSchema`] by walking both in
/// lockstep.
pub struct StructuralValidator<'a> {
    schema: &'a CanonicalSchema,
}

impl<'a> StructuralValidator<'a> {
    #[must_use]
    pub fn new(schema: &'a CanonicalSchema) -> Self {
        Self { schema }
    }
}

impl Validator for StructuralValidator<'_> {
    fn validate(&self, instance: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        walk(self.schema, self.schema.root(), instance, &Pointer::root(), &mut errors);
        errors
    }
}

fn error(keyword: &str, canon_path: &Pointer, instance_path: &Pointer, params: Value) -> ValidationError {
    ValidationError { keyword: keyword.to_string(), canon_path: canon_path.clone(), instance_path: instance_path.clone(), params }
}

fn walk(schema: &CanonicalSchema, id: NodeId, instance: &Value, instance_path: &Pointer, errors: &mut Vec<ValidationError>) {
    let canon_path = schema.pointer_of(id).clone();
    match schema.get(id) {
        SchemaNode::Boolean(true) => {}
        SchemaNode::Boolean(false) => errors.push(error("false_schema", &canon_path, instance_path, Value::Null)),
        SchemaNode::Object { keywords, children, ref_target } => {
            if let Some(target) = *ref_target {
                walk(schema, target, instance, instance_path, errors);
                return;
            }

            check_type(keywords, instance, &canon_path, instance_path, errors);
            check_const_and_enum(keywords, instance, &canon_path, instance_path, errors);

            match instance {
                Value::Number(n) => check_numeric(keywords, n, &canon_path, instance_path, errors),
                Value::String(s) => check_string(keywords, s, &canon_path, instance_path, errors),
                Value::Array(items) => check_array(schema, keywords, children, items, &canon_path, instance_path, errors),
                Value::Object(map) => check_object(schema, keywords, children, map, &canon_path, instance_path, errors),
                Value::Bool(_) | Value::Null => {}
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_type(keywords: &serde_json::Map<String, Value>, instance: &Value, canon_path: &Pointer, instance_path: &Pointer, errors: &mut Vec<ValidationError>) {
    let Some(declared) = keywords.get("type") else { return };
    let actual = json_type_name(instance);
    let satisfied = match declared {
        Value::String(t) => t == actual || (t == "number" && actual == "integer"),
        Value::Array(types) => types.iter().filter_map(Value::as_str).any(|t| t == actual || (t == "number" && actual == "integer")),
        _ => true,
    };
    if !satisfied {
        errors.push(error("type", canon_path, instance_path, serde_json::json!({"expected": declared, "actual": actual})));
    }
}

fn check_const_and_enum(keywords: &serde_json::Map<String, Value>, instance: &Value, canon_path: &Pointer, instance_path: &Pointer, errors: &mut Vec<ValidationError>) {
    if let Some(expected) = keywords.get("const") {
        if expected != instance {
            errors.push(error("const", canon_path, instance_path, expected.clone()));
        }
    }
    if let Some(Value::Array(values)) = keywords.get("enum") {
        if !values.contains(instance) {
            errors.push(error("enum", canon_path, instance_path, Value::Array(values.clone())));
        }
    }
}

/// The decimal precision a repair nudge should step by for a non-integer
/// value: however many fractional digits `multipleOf` (when present)
/// declares, or two otherwise.
fn decimal_precision(keywords: &serde_json::Map<String, Value>) -> u64 {
    keywords
        .get("multipleOf")
        .and_then(Value::as_f64)
        .map(|m| format!("{m}").split('.').nth(1).map_or(0, str::len) as u64)
        .unwrap_or(2)
}

fn check_numeric(keywords: &serde_json::Map<String, Value>, n: &Number, canon_path: &Pointer, instance_path: &Pointer, errors: &mut Vec<ValidationError>) {
    let Some(value) = n.as_f64() else { return };
    let is_integer = n.is_i64() || n.is_u64();
    let range = numeric::bound_range(keywords);
    if let Some(lower) = &range.lower {
        let violates = if lower.exclusive { value <= lower.value.to_f64() } else { value < lower.value.to_f64() };
        if violates {
            let keyword = if lower.exclusive { "exclusiveMinimum" } else { "minimum" };
            let params = serde_json::json!({"limit": lower.value.to_f64(), "value": value, "isInteger": is_integer, "decimalPrecision": decimal_precision(keywords)});
            errors.push(error(keyword, canon_path, instance_path, params));
        }
    }
    if let Some(upper) = &range.upper {
        let violates = if upper.exclusive { value >= upper.value.to_f64() } else { value > upper.value.to_f64() };
        if violates {
            let keyword = if upper.exclusive { "exclusiveMaximum" } else { "maximum" };
            let params = serde_json::json!({"limit": upper.value.to_f64(), "value": value, "isInteger": is_integer, "decimalPrecision": decimal_precision(keywords)});
            errors.push(error(keyword, canon_path, instance_path, params));
        }
    }
    if let Some(modulus) = keywords.get("multipleOf").and_then(Value::as_f64) {
        if modulus != 0.0 && !numeric::multiple_of_satisfied(value, modulus, numeric::MultipleOfMode::Exact) {
            errors.push(error("multipleOf", canon_path, instance_path, serde_json::json!({"multipleOf": modulus})));
        }
    }
}

fn pattern_matches(pattern: &str, value: &str) -> bool {
    let Ok(ast) = parser::parse(pattern) else { return true };
    let n = nfa::compile(&ast.ast);
    let d = dfa::compile(&n);
    let mut state = d.start;
    for c in value.chars() {
        let Some(edge) = d.states[state].edges.iter().find(|e| c >= e.lo && c <= e.hi) else { return false };
        state = edge.target;
    }
    d.states[state].accept
}

fn check_string(keywords: &serde_json::Map<String, Value>, s: &str, canon_path: &Pointer, instance_path: &Pointer, errors: &mut Vec<ValidationError>) {
    let length = s.chars().count();
    if let Some(min) = keywords.get("minLength").and_then(Value::as_u64) {
        if length < min as usize {
            errors.push(error("minLength", canon_path, instance_path, serde_json::json!({"limit": min})));
        }
    }
    if let Some(max) = keywords.get("maxLength").and_then(Value::as_u64) {
        if length > max as usize {
            errors.push(error("maxLength", canon_path, instance_path, serde_json::json!({"limit": max})));
        }
    }
    if let Some(Value::String(pattern)) = keywords.get("pattern") {
        if !pattern_matches(pattern, s) {
            errors.push(error("pattern", canon_path, instance_path, serde_json::json!({"pattern": pattern})));
        }
    }
}

fn check_array(schema: &CanonicalSchema, keywords: &serde_json::Map<String, Value>, children: &std::collections::BTreeMap<String, NodeId>, items: &[Value], canon_path: &Pointer, instance_path: &Pointer, errors: &mut Vec<ValidationError>) {
    if let Some(min) = keywords.get("minItems").and_then(Value::as_u64) {
        if items.len() < min as usize {
            errors.push(error("minItems", canon_path, instance_path, serde_json::json!({"limit": min})));
        }
    }
    if let Some(max) = keywords.get("maxItems").and_then(Value::as_u64) {
        if items.len() > max as usize {
            errors.push(error("maxItems", canon_path, instance_path, serde_json::json!({"limit": max})));
        }
    }
    for (i, item) in items.iter().enumerate() {
        let item_path = instance_path.index(i);
        let item_id = children.get(&format!("prefixItems/{i}")).or_else(|| children.get("items"));
        if let Some(id) = item_id {
            walk(schema, *id, item, &item_path, errors);
        }
    }
    if let Some(contains_id) = children.get("contains") {
        let any_matches = items.iter().enumerate().any(|(i, item)| {
            let mut probe = Vec::new();
            walk(schema, *contains_id, item, &instance_path.index(i), &mut probe);
            probe.is_empty()
        });
        if !items.is_empty() && !any_matches {
            errors.push(error("contains", canon_path, instance_path, Value::Null));
        }
    }
}

fn check_object(schema: &CanonicalSchema, keywords: &serde_json::Map<String, Value>, children: &std::collections::BTreeMap<String, NodeId>, map: &serde_json::Map<String, Value>, canon_path: &Pointer, instance_path: &Pointer, errors: &mut Vec<ValidationError>) {
    if let Some(Value::Array(required)) = keywords.get("required") {
        for name in required.iter().filter_map(Value::as_str) {
            if !map.contains_key(name) {
                errors.push(error("required", canon_path, instance_path, serde_json::json!({"missing": name, "missingProperty": name})));
            }
        }
    }
    if let Some(min) = keywords.get("minProperties").and_then(Value::as_u64) {
        if map.len() < min as usize {
            errors.push(error("minProperties", canon_path, instance_path, serde_json::json!({"limit": min})));
        }
    }
    check_property_names(keywords, map, canon_path, instance_path, errors);
    for (name, value) in map {
        if let Some(id) = children.get(&format!("properties/{name}")) {
            walk(schema, *id, value, &instance_path.child(name.clone()), errors);
        }
    }
}

/// `propertyNames.enum` closes the key universe: any present key outside
/// it is reported the same way plain `additionalProperties: false` would
/// be, carrying enough of the present-key set for a rename repair to pick
/// a replacement that doesn't collide with what's already there.
fn check_property_names(keywords: &serde_json::Map<String, Value>, map: &serde_json::Map<String, Value>, canon_path: &Pointer, instance_path: &Pointer, errors: &mut Vec<ValidationError>) {
    let Some(enum_values) = keywords.get("propertyNames").and_then(|n| n.get("enum")).and_then(Value::as_array) else {
        return;
    };
    let allowed: std::collections::BTreeSet<&str> = enum_values.iter().filter_map(Value::as_str).collect();
    let present: Vec<Value> = map.keys().map(|k| Value::from(k.clone())).collect();
    for name in map.keys() {
        if !allowed.contains(name.as_str()) {
            let params = serde_json::json!({"additionalProperty": name, "present": present.clone()});
            errors.push(error("propertyNames", canon_path, instance_path, params));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_core::compose::{compose, ComposeOptions};
    use schema_core::normalize::{normalize, NormalizeOptions};
    use serde_json::json;

    fn schema_for(value: Value) -> CanonicalSchema {
        normalize(&value, &NormalizeOptions::default()).unwrap().canonical
    }

    #[test]
    fn missing_required_property_is_reported() {
        let schema = schema_for(json!({"type": "object", "required": ["a"], "properties": {"a": {}}}));
        let validator = StructuralValidator::new(&schema);
        let errors = validator.validate(&json!({}));
        let missing = errors.iter().find(|e| e.keyword == "required").expect("required error");
        assert_eq!(missing.params["missingProperty"], json!("a"));
    }

    #[test]
    fn out_of_range_minimum_is_reported() {
        let schema = schema_for(json!({"type": "integer", "minimum": 10}));
        let validator = StructuralValidator::new(&schema);
        let errors = validator.validate(&json!(3));
        let violation = errors.iter().find(|e| e.keyword == "minimum").expect("minimum error");
        assert_eq!(violation.params["value"], json!(3.0));
        assert_eq!(violation.params["isInteger"], json!(true));
    }

    #[test]
    fn property_outside_closed_name_universe_is_reported() {
        let schema = schema_for(json!({"type": "object", "propertyNames": {"enum": ["a", "b"]}}));
        let validator = StructuralValidator::new(&schema);
        let errors = validator.validate(&json!({"a": 1, "x": 2}));
        let violation = errors.iter().find(|e| e.keyword == "propertyNames").expect("propertyNames error");
        assert_eq!(violation.params["additionalProperty"], json!("x"));
        assert!(violation.params["present"].as_array().unwrap().contains(&json!("a")));
    }

    #[test]
    fn valid_instance_has_no_errors() {
        let schema = schema_for(json!({"type": "object", "required": ["a"], "properties": {"a": {"type": "string", "minLength": 1}}}));
        let validator = StructuralValidator::new(&schema);
        let errors = validator.validate(&json!({"a": "x"}));
        assert!(errors.is_empty());
    }

    #[test]
    fn pattern_mismatch_is_reported() {
        let schema = schema_for(json!({"type": "string", "pattern": "^(?:red|blue)$"}));
        let validator = StructuralValidator::new(&schema);
        let errors = validator.validate(&json!("green"));
        assert!(errors.iter().any(|e| e.keyword == "pattern"));
    }

    #[test]
    fn compose_and_validate_agree_on_a_generated_instance() {
        use crate::generate::{generate, GenerateOptions};
        let schema = schema_for(json!({"type": "object", "required": ["n"], "properties": {"n": {"type": "integer", "minimum": 5}}}));
        let composed = compose(&schema, &ComposeOptions::default(), None);
        let outcome = generate(1, 0, &schema, &composed, &GenerateOptions::default());
        let validator = StructuralValidator::new(&schema);
        assert!(validator.validate(&outcome.instances[0]).is_empty());
    }
}
