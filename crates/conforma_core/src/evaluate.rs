use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::condition::{evaluate_condition, ConditionEval};
use crate::coverage::{plugin_metrics, RuleEvaluationMetrics};
use crate::finding::Finding;
use crate::interpolate::{interpolate, ValueFormatter};
use crate::rule::{DeclarativeRule, RulePlugin};
use crate::snapshot::ProjectSnapshot;
use crate::tables::LookupTables;
use crate::validate::validate_rule;

/// Verdict for one rule against one project.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The rule's trigger condition is disproven: the project complies.
    Pass,
    /// All conditions hold: the project violates the rule.
    Fail(Finding),
    /// The rule was not decided; the reason says why.
    Skip(SkipReason),
}

impl RuleOutcome {
    /// Pass and Fail count as evaluated; Skip does not.
    pub fn is_evaluated(&self) -> bool {
        matches!(self, RuleOutcome::Pass | RuleOutcome::Fail(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SkipReason {
    Disabled,
    Excluded,
    Malformed {
        violations: Vec<String>,
    },
    InsufficientData {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        missing_fields: Vec<String>,
        detail: String,
    },
}

/// A structured record of why a rule was skipped. Diagnostics are the
/// engine's only observability channel; they are data, never a panic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule_id: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluation {
    pub rule_id: String,
    pub outcome: RuleOutcome,
}

/// Everything one plugin produced in one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginEvaluation {
    pub plugin_id: String,
    pub plugin_name: String,
    pub area: String,
    pub evaluations: Vec<RuleEvaluation>,
    pub findings: Vec<Finding>,
    pub metrics: RuleEvaluationMetrics,
    /// Union of the field paths whose absence caused skips; feeds the
    /// "N fields missing" coverage messaging.
    pub missing_fields: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Evaluate one rule. See SkipReason for the non-decided outcomes.
///
/// Exclusions are OR-combined: one proven-true exclusion skips the rule,
/// and a skipped exclusion is treated as not-true. Conditions are
/// AND-combined in authored order with short-circuiting: the first
/// definite false proves compliance regardless of later unknowns, while
/// a skip met before any false makes the whole rule a skip.
pub fn evaluate_rule(
    rule: &DeclarativeRule,
    plugin: &RulePlugin,
    snapshot: &ProjectSnapshot<'_>,
    tables: &LookupTables,
    formatter: &ValueFormatter,
) -> RuleOutcome {
    if !rule.enabled {
        return RuleOutcome::Skip(SkipReason::Disabled);
    }

    // Authoring-time validation runs upstream; a malformed rule that
    // still arrives is permanently skipped, never counted as Pass.
    let violations = validate_rule(rule);
    if !violations.is_empty() {
        return RuleOutcome::Skip(SkipReason::Malformed { violations });
    }

    for exclusion in &rule.exclusions {
        if evaluate_condition(exclusion, snapshot, tables) == ConditionEval::Holds {
            return RuleOutcome::Skip(SkipReason::Excluded);
        }
    }

    for cond in &rule.conditions {
        match evaluate_condition(cond, snapshot, tables) {
            ConditionEval::Fails => return RuleOutcome::Pass,
            ConditionEval::Skipped(diag) => {
                return RuleOutcome::Skip(SkipReason::InsufficientData {
                    missing_fields: diag.missing_field.into_iter().collect(),
                    detail: diag.detail,
                })
            }
            ConditionEval::Holds => {}
        }
    }

    RuleOutcome::Fail(build_finding(rule, plugin, snapshot, formatter))
}

fn build_finding(
    rule: &DeclarativeRule,
    plugin: &RulePlugin,
    snapshot: &ProjectSnapshot<'_>,
    formatter: &ValueFormatter,
) -> Finding {
    let regulation = plugin
        .regulation_title(&rule.regulation_id)
        .unwrap_or(&rule.regulation_id)
        .to_string();
    Finding {
        id: rule.id.clone(),
        area: plugin.area.clone(),
        regulation,
        article: rule.article.clone(),
        severity: rule.severity,
        description: interpolate(&rule.description, snapshot, formatter),
        current_value: interpolate(&rule.current_value_template, snapshot, formatter),
        required_value: interpolate(&rule.required_value, snapshot, formatter),
        remediation: rule.remediation.clone(),
    }
}

/// Evaluate every rule of a plugin, in authored order. Deterministic:
/// findings, metrics, and diagnostics depend only on the inputs.
pub fn evaluate_plugin(
    plugin: &RulePlugin,
    snapshot: &ProjectSnapshot<'_>,
    tables: &LookupTables,
    formatter: &ValueFormatter,
) -> PluginEvaluation {
    let mut evaluations = Vec::with_capacity(plugin.rules.len());
    let mut findings = Vec::new();
    let mut missing_fields = BTreeSet::new();
    let mut diagnostics = Vec::new();

    for rule in &plugin.rules {
        let outcome = evaluate_rule(rule, plugin, snapshot, tables, formatter);
        match &outcome {
            RuleOutcome::Fail(finding) => findings.push(finding.clone()),
            RuleOutcome::Skip(SkipReason::Malformed { violations }) => {
                diagnostics.push(Diagnostic {
                    rule_id: rule.id.clone(),
                    detail: format!("malformed rule: {}", violations.join("; ")),
                });
            }
            RuleOutcome::Skip(SkipReason::InsufficientData {
                missing_fields: fields,
                detail,
            }) => {
                missing_fields.extend(fields.iter().cloned());
                diagnostics.push(Diagnostic {
                    rule_id: rule.id.clone(),
                    detail: detail.clone(),
                });
            }
            RuleOutcome::Pass
            | RuleOutcome::Skip(SkipReason::Disabled)
            | RuleOutcome::Skip(SkipReason::Excluded) => {}
        }
        evaluations.push(RuleEvaluation {
            rule_id: rule.id.clone(),
            outcome,
        });
    }

    let metrics = plugin_metrics(plugin, &evaluations);
    PluginEvaluation {
        plugin_id: plugin.id.clone(),
        plugin_name: plugin.name.clone(),
        area: plugin.area.clone(),
        evaluations,
        findings,
        metrics,
        missing_fields,
        diagnostics,
    }
}

/// Evaluate a set of plugins in input order.
pub fn evaluate_plugins(
    plugins: &[RulePlugin],
    snapshot: &ProjectSnapshot<'_>,
    tables: &LookupTables,
    formatter: &ValueFormatter,
) -> Vec<PluginEvaluation> {
    plugins
        .iter()
        .map(|plugin| evaluate_plugin(plugin, snapshot, tables, formatter))
        .collect()
}

/// Flat finding list across plugins, in evaluation order.
pub fn collect_findings(evaluations: &[PluginEvaluation]) -> Vec<Finding> {
    evaluations
        .iter()
        .flat_map(|e| e.findings.iter().cloned())
        .collect()
}

/// Coverage metrics across plugins, in evaluation order.
pub fn collect_metrics(evaluations: &[PluginEvaluation]) -> Vec<RuleEvaluationMetrics> {
    evaluations.iter().map(|e| e.metrics.clone()).collect()
}
