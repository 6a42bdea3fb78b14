use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::EngineError;
use crate::rule::RulePlugin;
use crate::snapshot::ProjectSnapshot;

/// Canonical JSON encoding: object keys sorted bytewise, compact
/// separators, numbers rendered exactly as serde_json renders them.
/// Equal values encode to equal bytes regardless of key insertion order,
/// which is what the version-diff feature hashes against.
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(value, &mut buf);
    buf
}

fn write_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => buf.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(s, buf),
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_value(item, buf);
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
            buf.push(b'{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_string(key, buf);
                buf.push(b':');
                write_value(value, buf);
            }
            buf.push(b'}');
        }
    }
}

fn write_string(s: &str, buf: &mut Vec<u8>) {
    buf.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                let mut esc = [0u8; 6];
                esc.copy_from_slice(b"\\u0000");
                let hex = b"0123456789abcdef";
                esc[4] = hex[((c as u32) >> 4) as usize];
                esc[5] = hex[((c as u32) & 0xf) as usize];
                buf.extend_from_slice(&esc);
            }
            c => {
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

/// Lowercase-hex SHA-256 of the canonical encoding.
pub fn content_hash(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json_bytes(value));
    format!("{:x}", hasher.finalize())
}

/// Content identity of a rule plugin, for version diffing.
pub fn ruleset_hash(plugin: &RulePlugin) -> Result<String, EngineError> {
    let value = serde_json::to_value(plugin)
        .map_err(|err| EngineError(format!("ruleset encode: {}", err)))?;
    Ok(content_hash(&value))
}

/// Content identity of a project snapshot (raw project plus computed
/// values).
pub fn snapshot_hash(snapshot: &ProjectSnapshot<'_>) -> String {
    let wrapper = serde_json::json!({
        "computed": snapshot.computed().clone(),
        "project": snapshot.raw().clone(),
    });
    content_hash(&wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_change_the_hash() {
        let a = json!({ "b": 1, "a": { "y": 2, "x": 3 } });
        let b = json!({ "a": { "x": 3, "y": 2 }, "b": 1 });
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn different_values_hash_differently() {
        assert_ne!(content_hash(&json!({ "a": 1 })), content_hash(&json!({ "a": 2 })));
        assert_ne!(content_hash(&json!(null)), content_hash(&json!(false)));
    }

    #[test]
    fn canonical_encoding_is_compact_and_sorted() {
        let value = json!({ "b": [1, "x"], "a": true });
        assert_eq!(
            String::from_utf8(canonical_json_bytes(&value)).expect("utf8"),
            r#"{"a":true,"b":[1,"x"]}"#
        );
    }

    #[test]
    fn strings_escape_control_characters() {
        let value = json!("line\nbreak\u{1}");
        assert_eq!(
            String::from_utf8(canonical_json_bytes(&value)).expect("utf8"),
            "\"line\\nbreak\\u0001\""
        );
    }

    #[test]
    fn ruleset_hash_is_stable_across_runs() {
        let plugin: RulePlugin = serde_json::from_value(json!({
            "id": "electrical",
            "name": "Electrical",
            "area": "electrical",
            "rules": [{
                "id": "R1", "regulation_id": "RTIEBT", "severity": "warning",
                "conditions": [{ "field": "a", "operator": "exists" }]
            }]
        }))
        .expect("plugin");
        assert_eq!(
            ruleset_hash(&plugin).expect("hash"),
            ruleset_hash(&plugin).expect("hash")
        );
    }
}
