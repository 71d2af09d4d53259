//! `G_valid` motif classification: which locations are simple enough that
//! structural generation alone guarantees validity, without a downstream
//! validate-and-repair cycle.

use crate::normalize::{CanonicalSchema, NodeId, SchemaNode};

/// The motif recognized at a location, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GValidMotif {
    /// An object whose `required` properties have simple (non-combinator)
    /// subschemas: filling them in structurally is always valid.
    SimpleObjectRequired,
    /// An array whose `items`/`contains` subschema is itself simple.
    ArrayItemsContainsSimple,
    /// An object with `additionalProperties: false` whose full coverage
    /// universe was established by `compose::objects`.
    ApFalseMustCover,
    None,
}

/// Ancestor flags threaded down the compose walk that disqualify every
/// motif below them regardless of their own local shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct AncestorFlags {
    pub unguarded_unevaluated: bool,
}

impl AncestorFlags {
    #[must_use]
    pub fn descend(self, node_keywords_has_unevaluated: bool) -> Self {
        Self { unguarded_unevaluated: self.unguarded_unevaluated || node_keywords_has_unevaluated }
    }
}

fn has_unguarded_unevaluated(node: &SchemaNode) -> bool {
    let SchemaNode::Object { keywords, .. } = node else { return false };
    keywords.contains_key("unevaluatedProperties") || keywords.contains_key("unevaluatedItems")
}

fn is_simple(schema: &CanonicalSchema, id: NodeId) -> bool {
    match schema.get(id) {
        SchemaNode::Boolean(b) => *b,
        SchemaNode::Object { keywords, ref_target, .. } => {
            if ref_target.is_some() {
                return false;
            }
            const COMBINATORS: &[&str] = &["allOf", "anyOf", "oneOf", "not", "if", "then", "else"];
            !COMBINATORS.iter().any(|k| keywords.contains_key(*k))
        }
    }
}

/// Classify the motif at `id`, given the ancestor flags accumulated on the
/// path from the root.
#[must_use]
pub fn classify(schema: &CanonicalSchema, id: NodeId, ancestors: AncestorFlags) -> GValidMotif {
    let node = schema.get(id);
    let flags = ancestors.descend(has_unguarded_unevaluated(node));
    if flags.unguarded_unevaluated {
        return GValidMotif::None;
    }

    let SchemaNode::Object { keywords, children, .. } = node else {
        return GValidMotif::None;
    };

    let is_object_typed = matches!(keywords.get("type"), Some(serde_json::Value::String(s)) if s == "object");
    if is_object_typed {
        if matches!(keywords.get("additionalProperties"), Some(serde_json::Value::Bool(false))) {
            return GValidMotif::ApFalseMustCover;
        }
        let required_simple = keywords.get("required").and_then(serde_json::Value::as_array).is_none_or(|required| {
            required.iter().filter_map(|r| r.as_str()).all(|name| {
                children
                    .get(&format!("properties/{name}"))
                    .is_none_or(|child_id| is_simple(schema, *child_id))
            })
        });
        if required_simple {
            return GValidMotif::SimpleObjectRequired;
        }
    }

    let is_array_typed = matches!(keywords.get("type"), Some(serde_json::Value::String(s)) if s == "array");
    if is_array_typed {
        let unique_items = matches!(keywords.get("uniqueItems"), Some(serde_json::Value::Bool(true)));
        if !unique_items {
            let items_simple = children.get("items").is_none_or(|id| is_simple(schema, *id));
            let contains_simple = children.get("contains").is_none_or(|id| is_simple(schema, *id));
            if items_simple && contains_simple {
                return GValidMotif::ArrayItemsContainsSimple;
            }
        }
    }

    GValidMotif::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, NormalizeOptions};
    use serde_json::json;

    #[test]
    fn simple_object_required_classified() {
        let schema = json!({
            "type": "object",
            "required": ["a"],
            "properties": {"a": {"type": "string"}}
        });
        let result = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let motif = classify(&result.canonical, result.canonical.root(), AncestorFlags::default());
        assert_eq!(motif, GValidMotif::SimpleObjectRequired);
    }

    #[test]
    fn unguarded_unevaluated_disqualifies() {
        let schema = json!({
            "type": "object",
            "unevaluatedProperties": false,
            "required": ["a"],
            "properties": {"a": {"type": "string"}}
        });
        let result = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let motif = classify(&result.canonical, result.canonical.root(), AncestorFlags::default());
        assert_eq!(motif, GValidMotif::None);
    }

    #[test]
    fn unique_items_disqualifies_array_motif() {
        let schema = json!({"type": "array", "uniqueItems": true, "items": {"type": "string"}});
        let result = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let motif = classify(&result.canonical, result.canonical.root(), AncestorFlags::default());
        assert_eq!(motif, GValidMotif::None);
    }

    #[test]
    fn ap_false_object_classified() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "additionalProperties": false
        });
        let result = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let motif = classify(&result.canonical, result.canonical.root(), AncestorFlags::default());
        assert_eq!(motif, GValidMotif::ApFalseMustCover);
    }

    #[test]
    fn combinator_child_is_not_simple() {
        let schema = json!({
            "type": "object",
            "required": ["a"],
            "properties": {"a": {"anyOf": [{"type": "string"}, {"type": "integer"}]}}
        });
        let result = normalize(&schema, &NormalizeOptions::default()).unwrap();
        let motif = classify(&result.canonical, result.canonical.root(), AncestorFlags::default());
        assert_eq!(motif, GValidMotif::None);
    }
}
