//! Canonical JSON serialization for structural hashing.
//!
//! Generalizes the teacher's integer-only canonicalizer to the full JSON
//! value space: schemas and generated instances both need hashing here,
//! and instances routinely contain non-integer numbers. Object keys sort
//! by byte order (equivalent to Rust's `str` ordering for valid UTF-8),
//! encoding is compact (no insignificant whitespace), strings follow
//! RFC 8259 escaping, and numbers serialize through a canonical
//! shortest-round-trip decimal form so `-0.0` and `0` hash identically and
//! two numbers with different source formatting but the same value hash
//! the same.

use serde_json::{Number, Value};

/// Serialize `value` to its canonical byte representation.
#[must_use]
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(canonical_number(n).as_bytes()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out);
                out.push(b':');
                write_value(&map[*key], out);
            }
            out.push(b'}');
        }
    }
}

/// Canonicalize a number: exact integers serialize without a decimal
/// point (the teacher's integer fast path); everything else goes through
/// `f64`'s shortest-round-trip `Display`, with `-0` folded to `0`.
fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    let f = n.as_f64().unwrap_or(0.0);
    if f == 0.0 {
        return "0".to_string();
    }
    if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e18 {
        return format!("{f:.0}");
    }
    format!("{f}")
}

fn write_string(s: &str, out: &mut Vec<u8>) {
    out.push(b'"');
    for c in s.chars() {
        match c {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                out.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_object_keys() {
        let v = json!({"b": 1, "a": 2});
        assert_eq!(canonical_json_bytes(&v), br#"{"a":2,"b":1}"#);
    }

    #[test]
    fn compact_no_whitespace() {
        let v = json!([1, 2, 3]);
        assert_eq!(canonical_json_bytes(&v), b"[1,2,3]");
    }

    #[test]
    fn negative_zero_folds_to_zero() {
        let v = json!(-0.0);
        assert_eq!(canonical_json_bytes(&v), b"0");
    }

    #[test]
    fn integral_float_has_no_decimal_point() {
        let v = json!(4.0);
        assert_eq!(canonical_json_bytes(&v), b"4");
    }

    #[test]
    fn fractional_float_uses_shortest_form() {
        let v = json!(0.1);
        assert_eq!(canonical_json_bytes(&v), b"0.1");
    }

    #[test]
    fn escapes_strings_per_rfc8259() {
        let v = json!("a\"b\\c\nd");
        let bytes = canonical_json_bytes(&v);
        assert_eq!(bytes, br#""a\"b\\c\nd""#);
    }

    #[test]
    fn nested_structures_round_trip_deterministically() {
        let a = json!({"z": [1, 2, {"y": true}], "a": null});
        let b = json!({"a": null, "z": [1, 2, {"y": true}]});
        assert_eq!(canonical_json_bytes(&a), canonical_json_bytes(&b));
    }
}
