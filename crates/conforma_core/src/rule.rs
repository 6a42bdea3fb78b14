use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Pass,
}

/// Closed set of condition operators. Unknown tags are rejected by serde
/// at the deserialization boundary; runtime dispatch is exhaustive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    Exists,
    NotExists,
    In,
    NotIn,
    Between,
    LookupGt,
    LookupGte,
    LookupLt,
    LookupLte,
    LookupEq,
    LookupNeq,
    OrdinalLt,
    OrdinalLte,
    OrdinalGt,
    OrdinalGte,
    #[serde(alias = "computed_gt")]
    FormulaGt,
    #[serde(alias = "computed_gte")]
    FormulaGte,
    #[serde(alias = "computed_lt")]
    FormulaLt,
    #[serde(alias = "computed_lte")]
    FormulaLte,
    #[serde(alias = "computed_eq")]
    FormulaEq,
    #[serde(alias = "computed_neq")]
    FormulaNeq,
}

impl Operator {
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Operator::LookupGt
                | Operator::LookupGte
                | Operator::LookupLt
                | Operator::LookupLte
                | Operator::LookupEq
                | Operator::LookupNeq
        )
    }

    pub fn is_ordinal(&self) -> bool {
        matches!(
            self,
            Operator::OrdinalLt | Operator::OrdinalLte | Operator::OrdinalGt | Operator::OrdinalGte
        )
    }

    pub fn is_formula(&self) -> bool {
        matches!(
            self,
            Operator::FormulaGt
                | Operator::FormulaGte
                | Operator::FormulaLt
                | Operator::FormulaLte
                | Operator::FormulaEq
                | Operator::FormulaNeq
        )
    }

    /// The comparator embedded in this operator, for the families that
    /// compare against something (literal, table cell, scale rank, or
    /// formula result).
    pub fn comparison(&self) -> Option<CmpOp> {
        match self {
            Operator::Gt | Operator::LookupGt | Operator::OrdinalGt | Operator::FormulaGt => {
                Some(CmpOp::Gt)
            }
            Operator::Gte | Operator::LookupGte | Operator::OrdinalGte | Operator::FormulaGte => {
                Some(CmpOp::Gte)
            }
            Operator::Lt | Operator::LookupLt | Operator::OrdinalLt | Operator::FormulaLt => {
                Some(CmpOp::Lt)
            }
            Operator::Lte | Operator::LookupLte | Operator::OrdinalLte | Operator::FormulaLte => {
                Some(CmpOp::Lte)
            }
            Operator::Eq | Operator::LookupEq | Operator::FormulaEq => Some(CmpOp::Eq),
            Operator::Neq | Operator::LookupNeq | Operator::FormulaNeq => Some(CmpOp::Neq),
            Operator::Exists
            | Operator::NotExists
            | Operator::In
            | Operator::NotIn
            | Operator::Between => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Eq => "==",
            Operator::Neq => "!=",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Between => "between",
            Operator::LookupGt => "lookup_gt",
            Operator::LookupGte => "lookup_gte",
            Operator::LookupLt => "lookup_lt",
            Operator::LookupLte => "lookup_lte",
            Operator::LookupEq => "lookup_eq",
            Operator::LookupNeq => "lookup_neq",
            Operator::OrdinalLt => "ordinal_lt",
            Operator::OrdinalLte => "ordinal_lte",
            Operator::OrdinalGt => "ordinal_gt",
            Operator::OrdinalGte => "ordinal_gte",
            Operator::FormulaGt => "formula_gt",
            Operator::FormulaGte => "formula_gte",
            Operator::FormulaLt => "formula_lt",
            Operator::FormulaLte => "formula_lte",
            Operator::FormulaEq => "formula_eq",
            Operator::FormulaNeq => "formula_neq",
        };
        f.write_str(repr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    pub fn apply(&self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Neq => ordering != Ordering::Equal,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Gte => ordering != Ordering::Less,
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Lte => ordering != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleCondition {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scale: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeclarativeRule {
    pub id: String,
    pub regulation_id: String,
    #[serde(default)]
    pub article: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<RuleCondition>,
    #[serde(default)]
    pub remediation: String,
    #[serde(default)]
    pub required_value: String,
    #[serde(default)]
    pub current_value_template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl DeclarativeRule {
    /// Every project field this rule reads: condition and exclusion
    /// `field`s plus lookup `keys`. Formula-internal references are not
    /// part of the cross-specialty contract.
    pub fn field_refs(&self) -> BTreeSet<String> {
        let mut refs = BTreeSet::new();
        for cond in self.conditions.iter().chain(self.exclusions.iter()) {
            refs.insert(cond.field.clone());
            for key in &cond.keys {
                refs.insert(key.clone());
            }
        }
        refs
    }
}

/// Display metadata for a legal/normative document. Not used by
/// evaluation beyond naming findings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Regulation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub legal_force: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RulePlugin {
    pub id: String,
    pub name: String,
    pub area: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regulations: Vec<Regulation>,
    #[serde(default)]
    pub rules: Vec<DeclarativeRule>,
}

impl RulePlugin {
    pub fn regulation_title(&self, regulation_id: &str) -> Option<&str> {
        self.regulations
            .iter()
            .find(|r| r.id == regulation_id)
            .map(|r| r.title.as_str())
    }
}
