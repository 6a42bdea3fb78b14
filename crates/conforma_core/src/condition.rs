use serde_json::Value;

use conforma_formula::parse_formula;

use crate::formula::eval_formula;
use crate::paths::Resolution;
use crate::rule::{CmpOp, Operator, RuleCondition};
use crate::snapshot::ProjectSnapshot;
use crate::tables::LookupTables;

/// Outcome of a single condition. `Skipped` means "cannot be decided with
/// the data at hand" and must propagate as a skip, never as false.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionEval {
    Holds,
    Fails,
    Skipped(SkipDiag),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkipDiag {
    pub detail: String,
    pub missing_field: Option<String>,
}

impl ConditionEval {
    fn from_bool(holds: bool) -> Self {
        if holds {
            ConditionEval::Holds
        } else {
            ConditionEval::Fails
        }
    }

    fn skipped(detail: impl Into<String>) -> Self {
        ConditionEval::Skipped(SkipDiag {
            detail: detail.into(),
            missing_field: None,
        })
    }

    fn missing(field: &str) -> Self {
        ConditionEval::Skipped(SkipDiag {
            detail: format!("field '{}' not present in project data", field),
            missing_field: Some(field.to_string()),
        })
    }
}

/// Evaluate one condition against the snapshot. Deterministic, pure, and
/// total: malformed metadata yields `Skipped` with a diagnostic, because a
/// malformed rule must never crash a batch of independent evaluations.
pub fn evaluate_condition(
    cond: &RuleCondition,
    snapshot: &ProjectSnapshot<'_>,
    tables: &LookupTables,
) -> ConditionEval {
    match cond.operator {
        Operator::Exists => match snapshot.resolve(&cond.field) {
            Resolution::Found(value) => ConditionEval::from_bool(value_present(value)),
            Resolution::NotFound => ConditionEval::Fails,
        },
        Operator::NotExists => match snapshot.resolve(&cond.field) {
            Resolution::Found(_) => ConditionEval::Fails,
            Resolution::NotFound => ConditionEval::Holds,
        },
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte | Operator::Eq
        | Operator::Neq => compare_against_literal(cond, snapshot),
        Operator::In | Operator::NotIn => membership(cond, snapshot),
        Operator::Between => between(cond, snapshot),
        Operator::LookupGt
        | Operator::LookupGte
        | Operator::LookupLt
        | Operator::LookupLte
        | Operator::LookupEq
        | Operator::LookupNeq => lookup(cond, snapshot, tables),
        Operator::OrdinalLt | Operator::OrdinalLte | Operator::OrdinalGt
        | Operator::OrdinalGte => ordinal(cond, snapshot),
        Operator::FormulaGt
        | Operator::FormulaGte
        | Operator::FormulaLt
        | Operator::FormulaLte
        | Operator::FormulaEq
        | Operator::FormulaNeq => formula(cond, snapshot),
    }
}

/// `exists` truthiness: null, false, empty string, and empty array do not
/// count as a present value.
fn value_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Object(_) => true,
    }
}

pub(crate) fn numeric(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Resolve a key field value to the string index used to address a lookup
/// table row or column. Only string values are valid indices.
fn index_string(value: &Value) -> Option<String> {
    value.as_str().map(|s| s.to_string())
}

/// Equality across JSON values, with numbers compared by value so that
/// `30` and `30.0` are equal.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare_against_literal(cond: &RuleCondition, snapshot: &ProjectSnapshot<'_>) -> ConditionEval {
    let actual = match snapshot.resolve(&cond.field) {
        Resolution::Found(value) => value,
        Resolution::NotFound => return ConditionEval::missing(&cond.field),
    };
    let cmp = match cond.operator.comparison() {
        Some(cmp) => cmp,
        None => return ConditionEval::skipped("operator carries no comparator"),
    };
    match cmp {
        CmpOp::Eq => ConditionEval::from_bool(loose_eq(actual, &cond.value)),
        CmpOp::Neq => ConditionEval::from_bool(!loose_eq(actual, &cond.value)),
        _ => match (numeric(actual), numeric(&cond.value)) {
            (Some(a), Some(b)) => match a.partial_cmp(&b) {
                Some(ordering) => ConditionEval::from_bool(cmp.apply(ordering)),
                None => ConditionEval::skipped(format!(
                    "values for '{}' are not comparable",
                    cond.field
                )),
            },
            _ => ConditionEval::skipped(format!(
                "operator '{}' needs numeric operands for '{}'",
                cond.operator, cond.field
            )),
        },
    }
}

fn membership(cond: &RuleCondition, snapshot: &ProjectSnapshot<'_>) -> ConditionEval {
    let actual = match snapshot.resolve(&cond.field) {
        Resolution::Found(value) => value,
        Resolution::NotFound => return ConditionEval::missing(&cond.field),
    };
    let options = match cond.value.as_array() {
        Some(options) => options,
        None => {
            return ConditionEval::skipped(format!(
                "operator '{}' needs an array value",
                cond.operator
            ))
        }
    };
    let hit = options.iter().any(|option| loose_eq(actual, option));
    match cond.operator {
        Operator::In => ConditionEval::from_bool(hit),
        _ => ConditionEval::from_bool(!hit),
    }
}

fn between(cond: &RuleCondition, snapshot: &ProjectSnapshot<'_>) -> ConditionEval {
    let actual = match snapshot.resolve(&cond.field) {
        Resolution::Found(value) => value,
        Resolution::NotFound => return ConditionEval::missing(&cond.field),
    };
    let actual = match numeric(actual) {
        Some(n) => n,
        None => {
            return ConditionEval::skipped(format!(
                "'between' needs a numeric field, '{}' is not",
                cond.field
            ))
        }
    };
    let bounds = cond
        .value
        .as_array()
        .filter(|bounds| bounds.len() == 2)
        .and_then(|bounds| Some((numeric(&bounds[0])?, numeric(&bounds[1])?)));
    match bounds {
        Some((low, high)) => ConditionEval::from_bool(low <= actual && actual <= high),
        None => ConditionEval::skipped("'between' needs a [low, high] numeric pair"),
    }
}

fn lookup(
    cond: &RuleCondition,
    snapshot: &ProjectSnapshot<'_>,
    tables: &LookupTables,
) -> ConditionEval {
    let cmp = match cond.operator.comparison() {
        Some(cmp) => cmp,
        None => return ConditionEval::skipped("operator carries no comparator"),
    };
    let table_name = match cond.table.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => {
            return ConditionEval::skipped(format!(
                "operator '{}' without a table",
                cond.operator
            ))
        }
    };
    let table = match tables.get(table_name) {
        Some(table) => table,
        None => {
            return ConditionEval::skipped(format!("lookup table '{}' not available", table_name))
        }
    };
    if cond.keys.is_empty() {
        return ConditionEval::skipped(format!("operator '{}' without keys", cond.operator));
    }

    let mut resolved_keys = Vec::with_capacity(cond.keys.len());
    for key_path in &cond.keys {
        let key_value = match snapshot.resolve(key_path) {
            Resolution::Found(value) => value,
            Resolution::NotFound => return ConditionEval::missing(key_path),
        };
        match index_string(key_value) {
            Some(key) => resolved_keys.push(key),
            None => {
                return ConditionEval::skipped(format!(
                    "key field '{}' does not resolve to a table index",
                    key_path
                ))
            }
        }
    }

    let cell = match table.cell(&resolved_keys) {
        Ok(cell) => cell,
        Err(detail) => {
            return ConditionEval::skipped(format!("table '{}': {}", table_name, detail))
        }
    };
    let actual = match snapshot.resolve(&cond.field) {
        Resolution::Found(value) => value,
        Resolution::NotFound => return ConditionEval::missing(&cond.field),
    };

    if let (Some(a), Some(b)) = (numeric(actual), numeric(cell)) {
        return match a.partial_cmp(&b) {
            Some(ordering) => ConditionEval::from_bool(cmp.apply(ordering)),
            None => ConditionEval::skipped(format!(
                "values for '{}' are not comparable",
                cond.field
            )),
        };
    }

    if let (Some(a), Some(b)) = (actual.as_str(), cell.as_str()) {
        if !table.ordering.is_empty() {
            let rank_a = match table.rank(a) {
                Some(rank) => rank,
                None => {
                    return ConditionEval::skipped(format!(
                        "token '{}' not in the ordering of table '{}'",
                        a, table_name
                    ))
                }
            };
            let rank_b = match table.rank(b) {
                Some(rank) => rank,
                None => {
                    return ConditionEval::skipped(format!(
                        "cell '{}' not in the ordering of table '{}'",
                        b, table_name
                    ))
                }
            };
            return ConditionEval::from_bool(cmp.apply(rank_a.cmp(&rank_b)));
        }
    }

    match cmp {
        CmpOp::Eq => ConditionEval::from_bool(loose_eq(actual, cell)),
        CmpOp::Neq => ConditionEval::from_bool(!loose_eq(actual, cell)),
        _ => ConditionEval::skipped(format!(
            "table '{}' has no value ordering for ranked comparison",
            table_name
        )),
    }
}

fn ordinal(cond: &RuleCondition, snapshot: &ProjectSnapshot<'_>) -> ConditionEval {
    let cmp = match cond.operator.comparison() {
        Some(cmp) => cmp,
        None => return ConditionEval::skipped("operator carries no comparator"),
    };
    if cond.scale.is_empty() {
        return ConditionEval::skipped(format!("operator '{}' without a scale", cond.operator));
    }
    let actual = match snapshot.resolve(&cond.field) {
        Resolution::Found(value) => value,
        Resolution::NotFound => return ConditionEval::missing(&cond.field),
    };
    let actual = match actual.as_str() {
        Some(token) => token,
        None => {
            return ConditionEval::skipped(format!(
                "ordinal field '{}' must resolve to a category token",
                cond.field
            ))
        }
    };
    let target = match cond.value.as_str() {
        Some(token) => token,
        None => return ConditionEval::skipped("ordinal value must be a category token"),
    };
    let rank_actual = match cond.scale.iter().position(|t| t == actual) {
        Some(rank) => rank,
        None => {
            return ConditionEval::skipped(format!("token '{}' not found in scale", actual))
        }
    };
    let rank_target = match cond.scale.iter().position(|t| t == target) {
        Some(rank) => rank,
        None => {
            return ConditionEval::skipped(format!("token '{}' not found in scale", target))
        }
    };
    ConditionEval::from_bool(cmp.apply(rank_actual.cmp(&rank_target)))
}

fn formula(cond: &RuleCondition, snapshot: &ProjectSnapshot<'_>) -> ConditionEval {
    let cmp = match cond.operator.comparison() {
        Some(cmp) => cmp,
        None => return ConditionEval::skipped("operator carries no comparator"),
    };
    let source = match cond.formula.as_deref() {
        Some(source) if !source.is_empty() => source,
        _ => {
            return ConditionEval::skipped(format!(
                "operator '{}' without a formula",
                cond.operator
            ))
        }
    };
    let expr = match parse_formula(source) {
        Ok(expr) => expr,
        Err(errs) => {
            let first = errs
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "unknown error".to_string());
            return ConditionEval::skipped(format!("formula does not parse: {}", first));
        }
    };
    let threshold = match eval_formula(&expr, snapshot) {
        Ok(threshold) => threshold,
        Err(fault) => {
            return ConditionEval::Skipped(SkipDiag {
                detail: format!("formula: {}", fault.detail),
                missing_field: fault.missing_field,
            })
        }
    };
    let actual = match snapshot.resolve(&cond.field) {
        Resolution::Found(value) => value,
        Resolution::NotFound => return ConditionEval::missing(&cond.field),
    };
    let actual = match numeric(actual) {
        Some(n) => n,
        None => {
            return ConditionEval::skipped(format!(
                "formula comparison needs a numeric field, '{}' is not",
                cond.field
            ))
        }
    };
    match actual.partial_cmp(&threshold) {
        Some(ordering) => ConditionEval::from_bool(cmp.apply(ordering)),
        None => ConditionEval::skipped("formula result is not comparable"),
    }
}
