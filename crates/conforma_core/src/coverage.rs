use serde::{Deserialize, Serialize};

use crate::evaluate::RuleEvaluation;
use crate::rule::RulePlugin;

/// Per-plugin coverage accounting. The invariant
/// `evaluated_rules + skipped_rules == total_rules` holds always;
/// disabled rules count as skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleEvaluationMetrics {
    pub plugin_id: String,
    pub plugin_name: String,
    pub area: String,
    pub total_rules: usize,
    pub evaluated_rules: usize,
    pub skipped_rules: usize,
    pub coverage_percent: u8,
}

/// Percentage of rules with enough data to be decided, rounded to the
/// nearest integer. An empty rule set covers vacuously: nothing to
/// evaluate means nothing is missing, so 100, not 0.
pub fn coverage_percent(evaluated: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((evaluated as f64 / total as f64) * 100.0).round() as u8
}

pub fn plugin_metrics(plugin: &RulePlugin, evaluations: &[RuleEvaluation]) -> RuleEvaluationMetrics {
    let total_rules = plugin.rules.len();
    let evaluated_rules = evaluations
        .iter()
        .filter(|e| e.outcome.is_evaluated())
        .count();
    let skipped_rules = total_rules - evaluated_rules;
    RuleEvaluationMetrics {
        plugin_id: plugin.id.clone(),
        plugin_name: plugin.name.clone(),
        area: plugin.area.clone(),
        total_rules,
        evaluated_rules,
        skipped_rules,
        coverage_percent: coverage_percent(evaluated_rules, total_rules),
    }
}
