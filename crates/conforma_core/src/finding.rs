use serde::{Deserialize, Serialize};

use crate::rule::Severity;

/// The evaluated outcome of one triggered rule against one project.
/// Skipped rules never produce a Finding; they are visible only through
/// coverage metrics and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    /// The owning rule's id; downstream consumers (cost estimation,
    /// remediation planning) key off it.
    pub id: String,
    pub area: String,
    pub regulation: String,
    #[serde(default)]
    pub article: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub current_value: String,
    #[serde(default)]
    pub required_value: String,
    #[serde(default)]
    pub remediation: String,
}
