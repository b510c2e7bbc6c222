use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::AppError;

/// A single spreadsheet value. Columns mix kinds freely, so there is no
/// per-column typing until a column is profiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            // Whole numbers print without a trailing ".0"
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Cell::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Raw rectangular cell data with no structural interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl Grid {
    /// Builds a grid, padding ragged rows with `Cell::Empty`.
    pub fn new(mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows.iter_mut() {
            row.resize(width, Cell::Empty);
        }
        Self { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// The first `n` rows, used for header detection on large sheets.
    pub fn head(&self, n: usize) -> Grid {
        Grid {
            rows: self.rows.iter().take(n).cloned().collect(),
            width: self.width,
        }
    }
}

/// Normalized rows with unique, non-empty column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Checks the table invariants: at least one column, no empty or
    /// duplicated column names, every row as wide as the header and none
    /// entirely empty.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self, AppError> {
        if columns.is_empty() {
            return Err(AppError::MalformedTable("table has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.is_empty() {
                return Err(AppError::MalformedTable("empty column name".to_string()));
            }
            if !seen.insert(column.as_str()) {
                return Err(AppError::MalformedTable(format!(
                    "duplicate column name '{}'",
                    column
                )));
            }
        }

        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(AppError::MalformedTable(format!(
                    "row {} has {} cells, expected {}",
                    idx,
                    row.len(),
                    columns.len()
                )));
            }
            if row.iter().all(Cell::is_empty) {
                return Err(AppError::MalformedTable(format!("row {} is empty", idx)));
            }
        }

        Ok(Self {
            name: name.into(),
            columns,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All cells of one column, top to bottom.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().filter_map(move |row| row.get(column))
    }
}

/// Stable short identifier for one configured report, e.g. `cost_estimating`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ReportKey(String);

impl ReportKey {
    /// Slugs a display label ("Cost Estimating") into a key ("cost_estimating").
    pub fn new(label: &str) -> Self {
        let mut key = String::with_capacity(label.len());
        for c in label.trim().chars() {
            if c.is_alphanumeric() {
                key.extend(c.to_lowercase());
            } else if !key.ends_with('_') {
                key.push('_');
            }
        }
        ReportKey(key.trim_matches('_').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ReportKey {
    fn from(value: String) -> Self {
        ReportKey::new(&value)
    }
}

impl From<&str> for ReportKey {
    fn from(value: &str) -> Self {
        ReportKey::new(value)
    }
}

impl From<ReportKey> for String {
    fn from(value: ReportKey) -> Self {
        value.0
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical comparable form of a person's name. Compared, never displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedName(String);

impl NormalizedName {
    pub(crate) fn from_tokens(tokens: Vec<String>) -> Self {
        NormalizedName(tokens.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_pads_ragged_rows() {
        let grid = Grid::new(vec![vec!["a".into()], vec!["b".into(), "c".into(), "d".into()]]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.row(0).unwrap(), &[Cell::from("a"), Cell::Empty, Cell::Empty]);
    }

    #[test]
    fn table_rejects_duplicate_columns() {
        let err = Table::new("t", vec!["A".into(), "A".into()], vec![]).unwrap_err();
        assert!(matches!(err, AppError::MalformedTable(_)));
    }

    #[test]
    fn table_rejects_empty_rows() {
        let err = Table::new("t", vec!["A".into()], vec![vec![Cell::Empty]]).unwrap_err();
        assert!(matches!(err, AppError::MalformedTable(_)));
    }

    #[test]
    fn get_looks_cells_up_by_column_name() {
        let table = Table::new(
            "t",
            vec!["Project".into(), "Cost".into()],
            vec![vec!["P-1".into(), Cell::from(12.5)]],
        )
        .unwrap();
        assert_eq!(table.get(0, "Cost"), Some(&Cell::Number(12.5)));
        assert!(table.get(1, "Cost").is_none());
        assert!(table.get(0, "Owner").is_none());
    }

    #[test]
    fn report_key_slugs_labels() {
        assert_eq!(ReportKey::new("Cost Estimating").as_str(), "cost_estimating");
        assert_eq!(ReportKey::new("  Order  Data! ").as_str(), "order_data");
        assert_eq!(ReportKey::new("cost_estimating").as_str(), "cost_estimating");
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(Cell::Number(42.0).to_string(), "42");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Empty.to_string(), "");
    }
}
