//! Canonical serialization, content hashing, and the diagnostic vocabulary.

pub mod canon;
pub mod codes;
pub mod envelope;
pub mod hash;

pub use canon::canonical_json_bytes;
pub use codes::{DiagCode, Phase};
pub use envelope::{Diagnostic, DiagnosticsEnvelope};
pub use hash::{canonical_hash, domain, ContentHash};

use serde_json::Value;

/// Normalize `-0`-valued numbers in `value` to `0`, recursively, without
/// otherwise reordering arrays or keys.
fn normalize_negative_zero(value: &Value) -> Value {
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if f == 0.0 {
                    return Value::from(0);
                }
            }
            value.clone()
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize_negative_zero).collect()),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), normalize_negative_zero(v));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// A stable, deterministic key for a parameter object: key-sorted,
/// `-0`-normalized, array-order-preserved canonical JSON, hashed under the
/// `params` domain. Used wherever two logically identical parameter
/// objects (e.g. a repair action's arguments) must compare equal
/// regardless of construction order.
#[must_use]
pub fn stable_params_key(params: &Value) -> ContentHash {
    let normalized = normalize_negative_zero(params);
    canonical_hash(domain::PARAMS, &canonical_json_bytes(&normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stable_params_key_ignores_key_order() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(stable_params_key(&a), stable_params_key(&b));
    }

    #[test]
    fn stable_params_key_normalizes_negative_zero() {
        let a = json!({"x": -0.0});
        let b = json!({"x": 0});
        assert_eq!(stable_params_key(&a), stable_params_key(&b));
    }

    #[test]
    fn stable_params_key_preserves_array_order() {
        let a = json!({"xs": [1, 2, 3]});
        let b = json!({"xs": [3, 2, 1]});
        assert_ne!(stable_params_key(&a), stable_params_key(&b));
    }
}
