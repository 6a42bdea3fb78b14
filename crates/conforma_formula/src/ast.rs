use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A restricted arithmetic expression over project field paths.
///
/// Formulas never read anything except the fields they name: evaluation is
/// delegated to the engine crate, which owns field resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FormulaExpr {
    Number {
        value: f64,
    },
    FieldRef {
        path: String,
    },
    Neg {
        expr: Box<FormulaExpr>,
    },
    Add {
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    Subtract {
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    Multiply {
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    Divide {
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    Min {
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    Max {
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
}

impl FormulaExpr {
    /// Every field path the formula references, in sorted order.
    pub fn field_refs(&self) -> BTreeSet<String> {
        let mut refs = BTreeSet::new();
        self.collect_refs(&mut refs);
        refs
    }

    fn collect_refs(&self, refs: &mut BTreeSet<String>) {
        match self {
            FormulaExpr::Number { .. } => {}
            FormulaExpr::FieldRef { path } => {
                refs.insert(path.clone());
            }
            FormulaExpr::Neg { expr } => expr.collect_refs(refs),
            FormulaExpr::Add { left, right }
            | FormulaExpr::Subtract { left, right }
            | FormulaExpr::Multiply { left, right }
            | FormulaExpr::Divide { left, right }
            | FormulaExpr::Min { left, right }
            | FormulaExpr::Max { left, right } => {
                left.collect_refs(refs);
                right.collect_refs(refs);
            }
        }
    }
}
