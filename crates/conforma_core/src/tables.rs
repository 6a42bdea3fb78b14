use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A row of a lookup table: either a direct cell (1-D table, addressed by
/// one key) or a column map (2-D table, addressed by row then column).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TableRow {
    Columns(BTreeMap<String, Value>),
    Cell(Value),
}

/// A named reference table used by `lookup_*` operators to compare a field
/// against a context-dependent threshold.
///
/// `ordering` ranks categorical cell values low to high, e.g.
/// `["I", "II", "III", "IV"]`. Ordering comparators on non-numeric cells
/// require it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LookupTable {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordering: Vec<String>,
    #[serde(default)]
    pub rows: BTreeMap<String, TableRow>,
}

impl LookupTable {
    /// Address a cell by resolved key strings. One key for 1-D tables,
    /// two (row, column) for 2-D tables.
    pub fn cell(&self, keys: &[String]) -> Result<&Value, String> {
        let (row_key, rest) = match keys.split_first() {
            Some(split) => split,
            None => return Err("lookup requires at least one key".to_string()),
        };
        let row = self
            .rows
            .get(row_key)
            .ok_or_else(|| format!("no table row for key '{}'", row_key))?;
        match (row, rest) {
            (TableRow::Cell(value), []) => Ok(value),
            (TableRow::Cell(_), _) => Err(format!(
                "table row '{}' holds a single cell but {} keys were given",
                row_key,
                keys.len()
            )),
            (TableRow::Columns(_), []) => Err(format!(
                "table row '{}' needs a column key",
                row_key
            )),
            (TableRow::Columns(columns), [column_key]) => columns.get(column_key).ok_or_else(|| {
                format!("no column '{}' in table row '{}'", column_key, row_key)
            }),
            (TableRow::Columns(_), _) => Err(format!(
                "too many keys ({}) for table row '{}'",
                keys.len(),
                row_key
            )),
        }
    }

    /// Rank of a categorical token within the table's value ordering.
    pub fn rank(&self, token: &str) -> Option<usize> {
        self.ordering.iter().position(|t| t == token)
    }
}

/// The full set of lookup tables supplied as static configuration,
/// keyed by table name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LookupTables {
    #[serde(flatten)]
    tables: BTreeMap<String, LookupTable>,
}

impl LookupTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, table: LookupTable) {
        self.tables.insert(name.into(), table);
    }

    pub fn get(&self, name: &str) -> Option<&LookupTable> {
        self.tables.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
