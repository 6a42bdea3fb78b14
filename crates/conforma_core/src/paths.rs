use serde_json::Value;

/// Outcome of resolving a dotted field path.
///
/// `NotFound` is distinct from `Found(&Value::Null)`: an absent field must
/// never be conflated with a field explicitly set to null, false, or zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    Found(&'a Value),
    NotFound,
}

impl<'a> Resolution<'a> {
    pub fn found(self) -> Option<&'a Value> {
        match self {
            Resolution::Found(value) => Some(value),
            Resolution::NotFound => None,
        }
    }

    pub fn is_not_found(self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

/// Resolve a dotted path (`electrical.rcdSensitivity`) against a nested
/// value tree. Any absent segment, non-object intermediate, or malformed
/// path yields `NotFound`: a rule referencing a garbage path means "data
/// not available", not an engine failure.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Resolution<'a> {
    let segments = match parse_path(path) {
        Some(segments) => segments,
        None => return Resolution::NotFound,
    };
    resolve_segments(root, &segments)
}

pub(crate) fn resolve_segments<'a>(root: &'a Value, segments: &[&str]) -> Resolution<'a> {
    let mut current = root;
    for segment in segments {
        let obj = match current.as_object() {
            Some(obj) => obj,
            None => return Resolution::NotFound,
        };
        match obj.get(*segment) {
            Some(next) => current = next,
            None => return Resolution::NotFound,
        }
    }
    Resolution::Found(current)
}

pub(crate) fn parse_path(path: &str) -> Option<Vec<&str>> {
    if path.is_empty() {
        return None;
    }
    let mut segments = Vec::new();
    for segment in path.split('.') {
        if !is_identifier(segment) {
            return None;
        }
        segments.push(segment);
    }
    Some(segments)
}

fn is_identifier(segment: &str) -> bool {
    let mut bytes = segment.bytes();
    let first = match bytes.next() {
        Some(b) => b,
        None => return false,
    };
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return false;
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_paths() {
        let project = json!({ "electrical": { "rcdSensitivity": 30 } });
        assert_eq!(
            resolve_path(&project, "electrical.rcdSensitivity"),
            Resolution::Found(&json!(30))
        );
    }

    #[test]
    fn absent_segments_are_not_found() {
        let project = json!({ "electrical": { "rcdSensitivity": 30 } });
        assert!(resolve_path(&project, "electrical.missing").is_not_found());
        assert!(resolve_path(&project, "fireSafety.riskCategory").is_not_found());
        assert!(resolve_path(&project, "electrical.rcdSensitivity.deeper").is_not_found());
    }

    #[test]
    fn explicit_null_and_false_are_found() {
        let project = json!({ "hvac": { "present": false, "note": null } });
        assert_eq!(
            resolve_path(&project, "hvac.present"),
            Resolution::Found(&json!(false))
        );
        assert_eq!(
            resolve_path(&project, "hvac.note"),
            Resolution::Found(&Value::Null)
        );
    }

    #[test]
    fn malformed_paths_are_not_found() {
        let project = json!({ "a": 1 });
        for path in ["", ".", "a.", ".a", "a..b", "1a", "a b"] {
            assert!(
                resolve_path(&project, path).is_not_found(),
                "expected NotFound for `{}`",
                path
            );
        }
    }
}
