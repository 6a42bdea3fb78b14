use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::rule::RulePlugin;

/// Compliance interaction between two specialties: project fields that
/// rules of both reference, and the rules involved on each side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrossSpecialtyPair {
    pub specialty_a: String,
    pub specialty_b: String,
    pub shared_fields: Vec<String>,
    pub rules_from_a: Vec<String>,
    pub rules_from_b: Vec<String>,
    pub total_rules: usize,
}

/// Static analysis over rule definitions: for every pair of selected
/// specialties, intersect the field paths their rules reference
/// (condition and exclusion fields plus lookup keys). Never evaluates
/// rules and never touches the project snapshot.
///
/// Pairs are emitted in sorted (a, b) order; selected specialties that
/// match no plugin are ignored; fewer than two resolvable specialties
/// yield no pairs.
pub fn cross_specialty_pairs(
    plugins: &[RulePlugin],
    selected: &[String],
) -> Vec<CrossSpecialtyPair> {
    let mut areas: Vec<&str> = selected
        .iter()
        .map(String::as_str)
        .filter(|area| plugins.iter().any(|p| p.area == *area))
        .collect();
    areas.sort_unstable();
    areas.dedup();

    let mut pairs = Vec::new();
    for (i, area_a) in areas.iter().enumerate() {
        for area_b in &areas[i + 1..] {
            if let Some(pair) = analyze_pair(plugins, area_a, area_b) {
                pairs.push(pair);
            }
        }
    }
    pairs
}

fn analyze_pair(plugins: &[RulePlugin], area_a: &str, area_b: &str) -> Option<CrossSpecialtyPair> {
    let fields_a = area_field_refs(plugins, area_a);
    let fields_b = area_field_refs(plugins, area_b);
    let shared: BTreeSet<String> = fields_a.intersection(&fields_b).cloned().collect();
    if shared.is_empty() {
        return None;
    }

    let rules_from_a = referencing_rules(plugins, area_a, &shared);
    let rules_from_b = referencing_rules(plugins, area_b, &shared);
    let total_rules = rules_from_a.len() + rules_from_b.len();
    Some(CrossSpecialtyPair {
        specialty_a: area_a.to_string(),
        specialty_b: area_b.to_string(),
        shared_fields: shared.into_iter().collect(),
        rules_from_a,
        rules_from_b,
        total_rules,
    })
}

fn area_field_refs(plugins: &[RulePlugin], area: &str) -> BTreeSet<String> {
    plugins
        .iter()
        .filter(|p| p.area == area)
        .flat_map(|p| p.rules.iter())
        .flat_map(|rule| rule.field_refs())
        .collect()
}

/// Rule ids in `area` referencing at least one shared field, in authored
/// order.
fn referencing_rules(plugins: &[RulePlugin], area: &str, shared: &BTreeSet<String>) -> Vec<String> {
    plugins
        .iter()
        .filter(|p| p.area == area)
        .flat_map(|p| p.rules.iter())
        .filter(|rule| rule.field_refs().iter().any(|field| shared.contains(field)))
        .map(|rule| rule.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plugins() -> Vec<RulePlugin> {
        serde_json::from_value(json!([
            {
                "id": "electrical",
                "name": "Electrical",
                "area": "electrical",
                "rules": [
                    {
                        "id": "E1", "regulation_id": "RTIEBT", "severity": "warning",
                        "conditions": [
                            { "field": "electrical.contractedPower", "operator": ">", "value": 41.4 }
                        ]
                    },
                    {
                        "id": "E2", "regulation_id": "RTIEBT", "severity": "info",
                        "conditions": [
                            { "field": "electrical.hasGenerator", "operator": "exists" }
                        ]
                    }
                ]
            },
            {
                "id": "hvac",
                "name": "HVAC",
                "area": "hvac",
                "rules": [
                    {
                        "id": "H1", "regulation_id": "RECS", "severity": "warning",
                        "conditions": [
                            { "field": "electrical.contractedPower", "operator": ">=", "value": 20.7 },
                            { "field": "hvac.totalThermalPower", "operator": ">", "value": 25 }
                        ]
                    }
                ]
            },
            {
                "id": "fireSafety",
                "name": "Fire Safety",
                "area": "fireSafety",
                "rules": [
                    {
                        "id": "F1", "regulation_id": "SCIE", "severity": "critical",
                        "conditions": [
                            {
                                "field": "fireSafety.riskCategory",
                                "operator": "lookup_gte",
                                "table": "fire_resistance",
                                "keys": ["buildingType"]
                            }
                        ]
                    }
                ]
            }
        ]))
        .expect("plugins")
    }

    fn selected(areas: &[&str]) -> Vec<String> {
        areas.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn reports_shared_fields_between_specialties() {
        let pairs = cross_specialty_pairs(&plugins(), &selected(&["electrical", "hvac"]));
        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert_eq!(pair.specialty_a, "electrical");
        assert_eq!(pair.specialty_b, "hvac");
        assert_eq!(pair.shared_fields, vec!["electrical.contractedPower".to_string()]);
        assert_eq!(pair.rules_from_a, vec!["E1".to_string()]);
        assert_eq!(pair.rules_from_b, vec!["H1".to_string()]);
        assert_eq!(pair.total_rules, 2);
    }

    #[test]
    fn disjoint_specialties_emit_no_pair() {
        let pairs = cross_specialty_pairs(&plugins(), &selected(&["electrical", "fireSafety"]));
        assert!(pairs.is_empty());
    }

    #[test]
    fn three_way_selection_emits_each_intersecting_pair_once() {
        let pairs =
            cross_specialty_pairs(&plugins(), &selected(&["hvac", "electrical", "fireSafety"]));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].specialty_a, "electrical");
        assert_eq!(pairs[0].specialty_b, "hvac");
    }

    #[test]
    fn unknown_or_single_selection_yields_nothing() {
        assert!(cross_specialty_pairs(&plugins(), &selected(&["electrical"])).is_empty());
        assert!(cross_specialty_pairs(&plugins(), &selected(&["electrical", "acoustics"]))
            .is_empty());
        assert!(cross_specialty_pairs(&plugins(), &[]).is_empty());
    }
}
