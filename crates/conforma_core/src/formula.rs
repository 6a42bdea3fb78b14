use conforma_formula::FormulaExpr;

use crate::condition::numeric;
use crate::paths::Resolution;
use crate::snapshot::ProjectSnapshot;

/// Why a formula could not be evaluated. Skip-grade, never an error: the
/// owning condition propagates it as insufficient data.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaFault {
    pub detail: String,
    pub missing_field: Option<String>,
}

impl FormulaFault {
    fn new(detail: impl Into<String>) -> Self {
        FormulaFault {
            detail: detail.into(),
            missing_field: None,
        }
    }
}

/// Evaluate a parsed formula against the snapshot. Field references
/// resolve through the same path resolver as conditions.
pub fn eval_formula(
    expr: &FormulaExpr,
    snapshot: &ProjectSnapshot<'_>,
) -> Result<f64, FormulaFault> {
    match expr {
        FormulaExpr::Number { value } => Ok(*value),
        FormulaExpr::FieldRef { path } => match snapshot.resolve(path) {
            Resolution::NotFound => Err(FormulaFault {
                detail: format!("field '{}' not present in project data", path),
                missing_field: Some(path.clone()),
            }),
            Resolution::Found(value) => numeric(value).ok_or_else(|| {
                FormulaFault::new(format!("field '{}' is not numeric", path))
            }),
        },
        FormulaExpr::Neg { expr } => Ok(-eval_formula(expr, snapshot)?),
        FormulaExpr::Add { left, right } => {
            Ok(eval_formula(left, snapshot)? + eval_formula(right, snapshot)?)
        }
        FormulaExpr::Subtract { left, right } => {
            Ok(eval_formula(left, snapshot)? - eval_formula(right, snapshot)?)
        }
        FormulaExpr::Multiply { left, right } => {
            Ok(eval_formula(left, snapshot)? * eval_formula(right, snapshot)?)
        }
        FormulaExpr::Divide { left, right } => {
            let divisor = eval_formula(right, snapshot)?;
            if divisor == 0.0 {
                return Err(FormulaFault::new("division by zero"));
            }
            Ok(eval_formula(left, snapshot)? / divisor)
        }
        FormulaExpr::Min { left, right } => {
            Ok(eval_formula(left, snapshot)?.min(eval_formula(right, snapshot)?))
        }
        FormulaExpr::Max { left, right } => {
            Ok(eval_formula(left, snapshot)?.max(eval_formula(right, snapshot)?))
        }
    }
}
