//! Array instance generation: tuple-form `prefixItems`, then `items` padding
//! up to `minItems`, with a `contains` witness folded into the last slot.

use serde_json::{Map, Value};

use schema_core::pointer::Pointer;

use super::{generate_at, Children, CoverageEvent, GenContext};

pub(crate) fn generate_array(ctx: &mut GenContext, canon_path: &Pointer, keywords: &Map<String, Value>, children: &Children, instance_path: &Pointer) -> Value {
    let min_items = keywords.get("minItems").and_then(Value::as_u64).unwrap_or(0) as usize;
    let max_items = keywords.get("maxItems").and_then(Value::as_u64).map(|v| v as usize);
    let has_contains = children.contains_key("contains");
    let mut target_len = min_items;
    if has_contains {
        target_len = target_len.max(1);
    }
    if let Some(max_items) = max_items {
        target_len = target_len.min(max_items.max(min_items));
    }

    let mut items = Vec::new();
    let mut i = 0;
    while let Some(id) = children.get(&format!("prefixItems/{i}")) {
        let child_path = instance_path.index(items.len());
        items.push(generate_at(ctx, *id, &child_path));
        i += 1;
    }

    let items_schema_id = children.get("items").copied();
    while items.len() < target_len {
        let child_path = instance_path.index(items.len());
        let value = items_schema_id.map_or(Value::Null, |id| generate_at(ctx, id, &child_path));
        items.push(value);
    }

    if let Some(contains_id) = children.get("contains") {
        let idx = items.len().saturating_sub(1);
        let child_path = instance_path.index(idx);
        let witness = generate_at(ctx, *contains_id, &child_path);
        if items.is_empty() {
            items.push(witness);
        } else {
            items[idx] = witness;
        }
        ctx.sink.push(CoverageEvent {
            canon_path: canon_path.clone(),
            dimension: "structure",
            operation_key: "contains".to_string(),
            instance_path: child_path,
        });
    }

    Value::Array(items)
}
