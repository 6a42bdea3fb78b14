use serde_json::Value;

use crate::paths::{parse_path, resolve_segments, Resolution};

/// Namespace prefix for derived values computed upstream of the engine.
pub const COMPUTED_NAMESPACE: &str = "computed";

/// An immutable view over a project description plus its precomputed
/// derived values. The engine only ever borrows; it never mutates and
/// never recomputes `computed.*` entries.
#[derive(Debug, Clone, Copy)]
pub struct ProjectSnapshot<'a> {
    raw: &'a Value,
    computed: &'a Value,
}

impl<'a> ProjectSnapshot<'a> {
    pub fn new(raw: &'a Value, computed: &'a Value) -> Self {
        ProjectSnapshot { raw, computed }
    }

    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    pub fn computed(&self) -> &'a Value {
        self.computed
    }

    /// Resolve a dotted path. `computed.*` paths resolve against the
    /// derived-values tree; everything else against the raw project.
    pub fn resolve(&self, path: &str) -> Resolution<'a> {
        let segments = match parse_path(path) {
            Some(segments) => segments,
            None => return Resolution::NotFound,
        };
        match segments.split_first() {
            Some((&first, rest)) if first == COMPUTED_NAMESPACE => {
                resolve_segments(self.computed, rest)
            }
            _ => resolve_segments(self.raw, &segments),
        }
    }
}
