use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;
use crate::models::{NormalizedName, Table};

static NAME_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;\s]+").expect("delimiter pattern is valid"));

/// Substrings that mark a column as holding a person's name, in no
/// particular priority; column order decides between matches.
pub const NAME_COLUMN_KEYWORDS: [&str; 4] = ["assign", "estimator", "owner", "name"];

/// "Sauer, Shaun", "shaun sauer" and "SHAUN   SAUER," all normalize to the
/// same value: lowercase tokens, split on commas, semicolons and
/// whitespace, sorted and joined by single spaces.
pub fn normalize_name(raw: &str) -> NormalizedName {
    let mut tokens: Vec<String> = NAME_DELIMITERS
        .split(&raw.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    tokens.sort();
    NormalizedName::from_tokens(tokens)
}

/// Exact equality after normalization; no partial or fuzzy matching.
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

/// Every column whose name looks like it holds a person, plus the one
/// picked (the first in column order).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnCandidates {
    pub matches: Vec<String>,
    pub chosen: Option<String>,
}

impl ColumnCandidates {
    pub fn is_ambiguous(&self) -> bool {
        self.matches.len() > 1
    }
}

pub fn rank_name_columns(columns: &[String]) -> ColumnCandidates {
    let matches: Vec<String> = columns
        .iter()
        .filter(|col| {
            let lowered = col.to_lowercase();
            NAME_COLUMN_KEYWORDS.iter().any(|kw| lowered.contains(kw))
        })
        .cloned()
        .collect();
    let chosen = matches.first().cloned();
    ColumnCandidates { matches, chosen }
}

/// Indices of rows whose `name_column` cell names `target_name`. Empty
/// cells never match.
pub fn find_matching_rows(
    table: &Table,
    name_column: &str,
    target_name: &str,
) -> Result<Vec<usize>, AppError> {
    let col = table.column_index(name_column).ok_or_else(|| AppError::ColumnNotFound {
        column: name_column.to_string(),
        available: table.columns().to_vec(),
    })?;

    let target = normalize_name(target_name);
    if target.is_empty() {
        return Ok(Vec::new());
    }

    Ok(table
        .column_values(col)
        .enumerate()
        .filter(|(_, cell)| !cell.is_empty() && normalize_name(&cell.to_string()) == target)
        .map(|(idx, _)| idx)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Grid};
    use crate::services::excel::normalizer::normalize;

    fn schedule() -> Table {
        let rows = [
            ["Project", "Assigned To", "Estimator", "Owner"],
            ["P-1", "Sauer, Shaun", "Doe, Jane", "x"],
            ["P-2", "Doe, Jane", "", "x"],
            ["P-3", "SHAUN   SAUER,", "Sauer, Shaun", "x"],
            ["P-4", "", "Shaun A. Sauer", "x"],
        ];
        let grid = Grid::new(
            rows.iter()
                .map(|r| r.iter().map(|v| Cell::from(*v)).collect())
                .collect(),
        );
        normalize(&grid, 0).unwrap()
    }

    #[test]
    fn normalizes_order_case_and_punctuation() {
        assert!(names_match("Sauer, Shaun", "shaun   sauer"));
        assert!(names_match("SHAUN   SAUER,", "shaun sauer"));
        assert!(names_match("Sauer;Shaun", "Shaun Sauer"));
        assert!(!names_match("Shaun Sauer", "Shaun A. Sauer"));
        assert_eq!(normalize_name("Sauer, Shaun").as_str(), "sauer shaun");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["Sauer, Shaun", "  ;;", "Jane Q. Public", "ÉLODIE dupont"] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(once.as_str()), once);
        }
    }

    #[test]
    fn blank_input_normalizes_to_empty() {
        assert!(normalize_name(" , ; ").is_empty());
    }

    #[test]
    fn ranks_name_columns_in_column_order() {
        let table = schedule();
        let candidates = rank_name_columns(table.columns());
        assert_eq!(candidates.matches, ["Assigned To", "Estimator", "Owner"]);
        assert_eq!(candidates.chosen.as_deref(), Some("Assigned To"));
        assert!(candidates.is_ambiguous());

        let none = rank_name_columns(&["Project".to_string()]);
        assert_eq!(none.chosen, None);
    }

    #[test]
    fn finds_matching_rows() {
        let table = schedule();
        assert_eq!(find_matching_rows(&table, "Assigned To", "Shaun Sauer").unwrap(), [0, 2]);
        assert_eq!(find_matching_rows(&table, "Estimator", "shaun sauer").unwrap(), [2]);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let table = schedule();
        assert!(find_matching_rows(&table, "Assigned To", "Nobody Here").unwrap().is_empty());
        assert!(find_matching_rows(&table, "Assigned To", "").unwrap().is_empty());
    }

    #[test]
    fn unknown_column_is_an_error() {
        let table = schedule();
        let err = find_matching_rows(&table, "Assignee", "Shaun Sauer").unwrap_err();
        assert!(matches!(err, AppError::ColumnNotFound { .. }));
    }
}
