use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::finding::Finding;
use crate::rule::Severity;

/// Reserved domain id for findings whose specialty is not in the
/// taxonomy. A taxonomy gap must never silently lose data.
pub const UNGROUPED_DOMAIN: &str = "ungrouped";

/// The hand-maintained specialty → domain classification, passed in as
/// versioned configuration so taxonomy changes never touch evaluation
/// logic. Domain order here is the presentation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainTaxonomy {
    pub version: u32,
    pub domains: Vec<DomainEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainEntry {
    pub id: String,
    pub label: String,
    pub specialties: Vec<String>,
}

impl DomainTaxonomy {
    fn domain_index(&self, area: &str) -> Option<usize> {
        self.domains
            .iter()
            .position(|d| d.specialties.iter().any(|s| s == area))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub pass: usize,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
            Severity::Pass => self.pass += 1,
        }
    }

    pub fn merge(&mut self, other: &SeverityCounts) {
        self.critical += other.critical;
        self.warning += other.warning;
        self.info += other.info;
        self.pass += other.pass;
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info + self.pass
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisHierarchy {
    pub domains: Vec<DomainNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainNode {
    pub id: String,
    pub label: String,
    pub counts: SeverityCounts,
    pub specialties: Vec<SpecialtyNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecialtyNode {
    pub area: String,
    pub counts: SeverityCounts,
    pub regulations: Vec<RegulationNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegulationNode {
    pub regulation: String,
    pub counts: SeverityCounts,
    pub findings: Vec<Finding>,
}

/// Group the flat finding list into Domain → Specialty → Regulation with
/// severity counts rolled up at every level. Pure; one pass over the
/// findings plus one pass to assemble nodes. Domains follow taxonomy
/// order with `ungrouped` last; specialties and regulations sort
/// lexicographically; findings keep evaluation order.
pub fn build_hierarchy(findings: &[Finding], taxonomy: &DomainTaxonomy) -> AnalysisHierarchy {
    let ungrouped_index = taxonomy.domains.len();
    let mut grouped: BTreeMap<usize, BTreeMap<String, BTreeMap<String, Vec<Finding>>>> =
        BTreeMap::new();

    for finding in findings {
        let index = taxonomy
            .domain_index(&finding.area)
            .unwrap_or(ungrouped_index);
        grouped
            .entry(index)
            .or_default()
            .entry(finding.area.clone())
            .or_default()
            .entry(finding.regulation.clone())
            .or_default()
            .push(finding.clone());
    }

    let mut domains = Vec::with_capacity(grouped.len());
    for (index, specialties) in grouped {
        let (id, label) = if index == ungrouped_index {
            (UNGROUPED_DOMAIN.to_string(), UNGROUPED_DOMAIN.to_string())
        } else {
            let entry = &taxonomy.domains[index];
            (entry.id.clone(), entry.label.clone())
        };

        let mut domain_counts = SeverityCounts::default();
        let mut specialty_nodes = Vec::with_capacity(specialties.len());
        for (area, regulations) in specialties {
            let mut specialty_counts = SeverityCounts::default();
            let mut regulation_nodes = Vec::with_capacity(regulations.len());
            for (regulation, findings) in regulations {
                let mut counts = SeverityCounts::default();
                for finding in &findings {
                    counts.add(finding.severity);
                }
                specialty_counts.merge(&counts);
                regulation_nodes.push(RegulationNode {
                    regulation,
                    counts,
                    findings,
                });
            }
            domain_counts.merge(&specialty_counts);
            specialty_nodes.push(SpecialtyNode {
                area,
                counts: specialty_counts,
                regulations: regulation_nodes,
            });
        }

        domains.push(DomainNode {
            id,
            label,
            counts: domain_counts,
            specialties: specialty_nodes,
        });
    }

    AnalysisHierarchy { domains }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> DomainTaxonomy {
        serde_json::from_value(serde_json::json!({
            "version": 1,
            "domains": [
                {
                    "id": "installations",
                    "label": "Instalações Técnicas",
                    "specialties": ["electrical", "hvac"]
                },
                {
                    "id": "safety",
                    "label": "Segurança",
                    "specialties": ["fireSafety"]
                }
            ]
        }))
        .expect("taxonomy")
    }

    fn finding(area: &str, regulation: &str, severity: Severity) -> Finding {
        Finding {
            id: format!("{}-{}", area, regulation),
            area: area.to_string(),
            regulation: regulation.to_string(),
            article: String::new(),
            severity,
            description: String::new(),
            current_value: String::new(),
            required_value: String::new(),
            remediation: String::new(),
        }
    }

    #[test]
    fn rolls_up_counts_across_levels() {
        // One critical + two warnings across two specialties of the same
        // domain: the domain node reports the sum of its children.
        let findings = vec![
            finding("electrical", "RTIEBT", Severity::Critical),
            finding("electrical", "RTIEBT", Severity::Warning),
            finding("hvac", "RECS", Severity::Warning),
        ];
        let hierarchy = build_hierarchy(&findings, &taxonomy());
        assert_eq!(hierarchy.domains.len(), 1);
        let domain = &hierarchy.domains[0];
        assert_eq!(domain.id, "installations");
        assert_eq!(domain.counts.critical, 1);
        assert_eq!(domain.counts.warning, 2);
        assert_eq!(
            domain.counts.total(),
            domain
                .specialties
                .iter()
                .map(|s| s.counts.total())
                .sum::<usize>()
        );
    }

    #[test]
    fn domains_follow_taxonomy_order() {
        let findings = vec![
            finding("fireSafety", "SCIE", Severity::Info),
            finding("electrical", "RTIEBT", Severity::Warning),
        ];
        let hierarchy = build_hierarchy(&findings, &taxonomy());
        let ids: Vec<&str> = hierarchy.domains.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["installations", "safety"]);
    }

    #[test]
    fn unknown_specialty_lands_in_ungrouped_not_dropped() {
        let findings = vec![
            finding("electrical", "RTIEBT", Severity::Warning),
            finding("acoustics", "RRAE", Severity::Critical),
        ];
        let hierarchy = build_hierarchy(&findings, &taxonomy());
        let last = hierarchy.domains.last().expect("domains");
        assert_eq!(last.id, UNGROUPED_DOMAIN);
        assert_eq!(last.counts.critical, 1);
        let total: usize = hierarchy.domains.iter().map(|d| d.counts.total()).sum();
        assert_eq!(total, findings.len());
    }

    #[test]
    fn regulations_group_within_specialty() {
        let findings = vec![
            finding("electrical", "RTIEBT", Severity::Warning),
            finding("electrical", "RSIUEE", Severity::Info),
            finding("electrical", "RTIEBT", Severity::Pass),
        ];
        let hierarchy = build_hierarchy(&findings, &taxonomy());
        let specialty = &hierarchy.domains[0].specialties[0];
        assert_eq!(specialty.regulations.len(), 2);
        // Lexicographic regulation order.
        assert_eq!(specialty.regulations[0].regulation, "RSIUEE");
        assert_eq!(specialty.regulations[1].regulation, "RTIEBT");
        assert_eq!(specialty.regulations[1].findings.len(), 2);
        assert_eq!(specialty.counts.pass, 1);
    }
}
