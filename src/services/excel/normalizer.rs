use std::collections::HashSet;

use super::utils::{is_placeholder_name, placeholder_name, unique_column_name};
use crate::error::AppError;
use crate::models::{Cell, Grid, Table};

/// What normalization removed or renamed, for callers that report it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub header_row: usize,
    pub dropped_columns: Vec<String>,
    pub dropped_rows: usize,
    /// (name as written in the header, name used in the table)
    pub renamed_columns: Vec<(String, String)>,
}

pub fn normalize(grid: &Grid, header_row: usize) -> Result<Table, AppError> {
    normalize_named(grid, header_row, "").map(|(table, _)| table)
}

/// Re-slices `grid` at `header_row` and cleans the result:
///
/// 1. header cells, stringified and trimmed, become column names (blank
///    ones get an `Unnamed: N` placeholder)
/// 2. rows below the header become data rows
/// 3. placeholder columns with no data are dropped
/// 4. fully empty rows are dropped
/// 5. repeated names are suffixed `_2`, `_3`, ... in column order
pub fn normalize_named(
    grid: &Grid,
    header_row: usize,
    name: &str,
) -> Result<(Table, NormalizeReport), AppError> {
    let header = grid.row(header_row).ok_or_else(|| {
        AppError::MalformedTable(format!(
            "header row {} is out of bounds for a grid of {} rows",
            header_row,
            grid.height()
        ))
    })?;

    let raw_names = header_names(header);

    let data_rows: Vec<&[Cell]> = grid.rows().skip(header_row + 1).collect();

    let mut report = NormalizeReport { header_row, ..Default::default() };
    let kept: Vec<usize> = raw_names
        .iter()
        .enumerate()
        .filter_map(|(idx, col_name)| {
            let dead = is_placeholder_name(col_name)
                && data_rows.iter().all(|row| row[idx].is_empty());
            if dead {
                report.dropped_columns.push(col_name.clone());
                None
            } else {
                Some(idx)
            }
        })
        .collect();

    if kept.is_empty() {
        return Err(AppError::MalformedTable(format!(
            "no columns left after cleanup (header row {})",
            header_row
        )));
    }

    let mut existing_names = HashSet::new();
    let columns: Vec<String> = kept
        .iter()
        .map(|&idx| {
            let unique = unique_column_name(&raw_names[idx], &mut existing_names);
            if unique != raw_names[idx] {
                report.renamed_columns.push((raw_names[idx].clone(), unique.clone()));
            }
            unique
        })
        .collect();

    let rows: Vec<Vec<Cell>> = data_rows
        .iter()
        .map(|row| kept.iter().map(|&idx| row[idx].clone()).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(Cell::is_empty))
        .collect();
    report.dropped_rows = data_rows.len() - rows.len();

    if !report.renamed_columns.is_empty() {
        tracing::warn!("Renamed duplicate columns: {:?}", report.renamed_columns);
    }
    tracing::debug!(
        "Normalized at header row {}: {} columns ({} dropped), {} rows ({} empty dropped)",
        header_row,
        columns.len(),
        report.dropped_columns.len(),
        rows.len(),
        report.dropped_rows
    );

    let table = Table::new(name, columns, rows)?;
    Ok((table, report))
}

/// Trimmed header cells, with `Unnamed: N` standing in for blank ones.
pub(crate) fn header_names(header: &[Cell]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let trimmed = cell.to_string().trim().to_string();
            if trimmed.is_empty() {
                placeholder_name(idx)
            } else {
                trimmed
            }
        })
        .collect()
}
