use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use conforma_formula::parse_formula;

use crate::rule::{DeclarativeRule, Operator, RuleCondition, RulePlugin};

/// One violated authoring invariant on one rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleViolation {
    pub rule_id: String,
    pub message: String,
}

/// Structural validation of a single rule. Returns every violated
/// invariant, not just the first, so authors fix a rule in one pass.
pub fn validate_rule(rule: &DeclarativeRule) -> Vec<String> {
    let mut violations = Vec::new();
    if rule.id.trim().is_empty() {
        violations.push("rule id must not be empty".to_string());
    }
    if rule.conditions.is_empty() {
        violations.push("rule must have at least one condition".to_string());
    }
    for (index, cond) in rule.conditions.iter().enumerate() {
        for message in validate_condition(cond) {
            violations.push(format!("condition {}: {}", index + 1, message));
        }
    }
    for (index, cond) in rule.exclusions.iter().enumerate() {
        for message in validate_condition(cond) {
            violations.push(format!("exclusion {}: {}", index + 1, message));
        }
    }
    violations
}

fn validate_condition(cond: &RuleCondition) -> Vec<String> {
    let mut messages = Vec::new();
    if cond.field.trim().is_empty() {
        messages.push("field path must not be empty".to_string());
    }

    if cond.operator.is_lookup() {
        if cond.table.as_deref().map_or(true, str::is_empty) {
            messages.push(format!("operator '{}' requires a table", cond.operator));
        }
        if cond.keys.is_empty() {
            messages.push(format!("operator '{}' requires keys", cond.operator));
        }
    }

    if cond.operator.is_ordinal() {
        if cond.scale.is_empty() {
            messages.push(format!("operator '{}' requires a scale", cond.operator));
        }
        if !cond.value.is_string() {
            messages.push(format!(
                "operator '{}' requires a category token value",
                cond.operator
            ));
        }
    }

    if cond.operator.is_formula() {
        match cond.formula.as_deref() {
            None | Some("") => {
                messages.push(format!("operator '{}' requires a formula", cond.operator))
            }
            Some(source) => {
                if let Err(errs) = parse_formula(source) {
                    let first = errs
                        .first()
                        .map(|e| e.message.clone())
                        .unwrap_or_else(|| "unknown error".to_string());
                    messages.push(format!("formula does not parse: {}", first));
                }
            }
        }
    }

    match cond.operator {
        Operator::Between => {
            let ok = cond
                .value
                .as_array()
                .map_or(false, |bounds| bounds.len() == 2 && bounds.iter().all(Value::is_number));
            if !ok {
                messages.push("'between' requires a [low, high] numeric pair".to_string());
            }
        }
        Operator::In | Operator::NotIn => {
            if !cond.value.is_array() {
                messages.push(format!("operator '{}' requires an array value", cond.operator));
            }
        }
        Operator::Gt
        | Operator::Gte
        | Operator::Lt
        | Operator::Lte
        | Operator::Eq
        | Operator::Neq => {
            if cond.value.is_null() {
                messages.push(format!("operator '{}' requires a value", cond.operator));
            }
        }
        _ => {}
    }

    messages
}

/// Plugin-level validation: per-rule invariants plus duplicate ids.
pub fn validate_plugin(plugin: &RulePlugin) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for rule in &plugin.rules {
        if !rule.id.is_empty() && !seen.insert(rule.id.as_str()) {
            violations.push(RuleViolation {
                rule_id: rule.id.clone(),
                message: "duplicate rule id within plugin".to_string(),
            });
        }
        for message in validate_rule(rule) {
            violations.push(RuleViolation {
                rule_id: rule.id.clone(),
                message,
            });
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(value: serde_json::Value) -> DeclarativeRule {
        serde_json::from_value(value).expect("rule")
    }

    #[test]
    fn well_formed_rule_has_no_violations() {
        let rule = rule(json!({
            "id": "R1",
            "regulation_id": "REG-1",
            "severity": "critical",
            "conditions": [
                { "field": "electrical.hasRcd", "operator": "==", "value": false }
            ]
        }));
        assert!(validate_rule(&rule).is_empty());
    }

    #[test]
    fn all_violations_are_reported_at_once() {
        let rule = rule(json!({
            "id": "",
            "regulation_id": "REG-1",
            "severity": "critical",
            "conditions": []
        }));
        let violations = validate_rule(&rule);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("id"));
        assert!(violations[1].contains("at least one condition"));
    }

    #[test]
    fn lookup_and_ordinal_metadata_requirements() {
        let rule = rule(json!({
            "id": "R2",
            "regulation_id": "REG-1",
            "severity": "warning",
            "conditions": [
                { "field": "a", "operator": "lookup_gte" },
                { "field": "b", "operator": "ordinal_lt", "value": 3 }
            ]
        }));
        let violations = validate_rule(&rule);
        assert!(violations.iter().any(|v| v.contains("requires a table")));
        assert!(violations.iter().any(|v| v.contains("requires keys")));
        assert!(violations.iter().any(|v| v.contains("requires a scale")));
        assert!(violations.iter().any(|v| v.contains("category token")));
    }

    #[test]
    fn formula_must_parse_at_validation_time() {
        let rule = rule(json!({
            "id": "R3",
            "regulation_id": "REG-1",
            "severity": "info",
            "conditions": [
                { "field": "a", "operator": "formula_gt", "formula": "b +" }
            ]
        }));
        let violations = validate_rule(&rule);
        assert!(violations.iter().any(|v| v.contains("does not parse")));
    }

    #[test]
    fn comparison_operators_require_a_value() {
        let rule = rule(json!({
            "id": "R4",
            "regulation_id": "REG-1",
            "severity": "warning",
            "conditions": [
                { "field": "a", "operator": ">" },
                { "field": "b", "operator": "exists" }
            ]
        }));
        let violations = validate_rule(&rule);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("requires a value"));
    }

    #[test]
    fn duplicate_rule_ids_are_flagged_at_plugin_level() {
        let plugin: RulePlugin = serde_json::from_value(json!({
            "id": "electrical",
            "name": "Electrical",
            "area": "electrical",
            "rules": [
                {
                    "id": "R1", "regulation_id": "REG-1", "severity": "info",
                    "conditions": [{ "field": "a", "operator": "exists" }]
                },
                {
                    "id": "R1", "regulation_id": "REG-1", "severity": "info",
                    "conditions": [{ "field": "b", "operator": "exists" }]
                }
            ]
        }))
        .expect("plugin");
        let violations = validate_plugin(&plugin);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, "R1");
        assert!(violations[0].message.contains("duplicate"));
    }
}
