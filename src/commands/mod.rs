//! Console presentation for each CLI entry point. Everything here writes to
//! a caller-supplied writer so output can be captured in tests.

use std::io::{self, Write};

use crate::models::{Cell, Table};

pub mod assignments;
pub mod diagnose;
pub mod explore;
pub mod load;
pub mod scan;

const RULE_WIDTH: usize = 60;
const MAX_CELL_WIDTH: usize = 40;

pub(crate) fn rule(out: &mut impl Write, width: usize) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(width))
}

pub(crate) fn banner(out: &mut impl Write, title: &str) -> io::Result<()> {
    rule(out, RULE_WIDTH)?;
    writeln!(out, "{}", title)?;
    rule(out, RULE_WIDTH)
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(max_chars.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

/// "a, b, c... (+2 more)"
pub(crate) fn preview_list(items: &[String], limit: usize) -> String {
    let shown = items.iter().take(limit).cloned().collect::<Vec<_>>().join(", ");
    if items.len() > limit {
        format!("{}... (+{} more)", shown, items.len() - limit)
    } else {
        shown
    }
}

/// Prints selected rows of a table, first `max_columns` columns, padded
/// to the widest value in each column.
pub(crate) fn write_rows(
    out: &mut impl Write,
    table: &Table,
    rows: &[usize],
    max_columns: usize,
) -> io::Result<()> {
    let columns: Vec<&String> = table.columns().iter().take(max_columns).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .filter_map(|&r| table.rows().get(r))
        .map(|row| {
            row.iter()
                .take(columns.len())
                .map(|c: &Cell| truncate(&c.to_string(), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(truncate(name, MAX_CELL_WIDTH).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(name, &w)| format!("{:<w$}", truncate(name, MAX_CELL_WIDTH), w = w))
        .collect();
    writeln!(out, "  {}", header.join("  ").trim_end())?;

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(value, &w)| format!("{:<w$}", value, w = w))
            .collect();
        writeln!(out, "  {}", line.join("  ").trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grid;
    use crate::services::excel::normalizer::normalize;

    #[test]
    fn truncates_long_values() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn previews_lists() {
        let items: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(preview_list(&items, 5), "a, b, c");
        assert_eq!(preview_list(&items, 2), "a, b... (+1 more)");
    }

    #[test]
    fn writes_aligned_rows() {
        let grid = Grid::new(vec![
            vec!["Project".into(), "Status".into()],
            vec!["P-100".into(), "Open".into()],
        ]);
        let table = normalize(&grid, 0).unwrap();

        let mut out = Vec::new();
        write_rows(&mut out, &table, &[0], 5).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "  Project  Status\n  P-100    Open\n");
    }
}
