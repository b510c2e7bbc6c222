use std::io::{self, Write};

use super::write_rows;
use crate::models::Table;
use crate::services::catalog::Assignments;

const PREVIEW_ROWS: usize = 10;

pub fn write_assignments(
    out: &mut impl Write,
    table: &Table,
    found: &Assignments,
) -> io::Result<()> {
    if found.candidates.is_ambiguous() {
        writeln!(out, "Possible name columns: {}", found.candidates.matches.join(", "))?;
    }
    writeln!(out, "Searching column '{}' of {}", found.column, found.report)?;
    writeln!(out)?;
    writeln!(out, "Found {} rows assigned to {}", found.rows.len(), found.user_name)?;

    if !found.rows.is_empty() {
        writeln!(out)?;
        let preview: Vec<usize> = found.rows.iter().copied().take(PREVIEW_ROWS).collect();
        write_rows(out, table, &preview, 8)?;
        if found.rows.len() > PREVIEW_ROWS {
            writeln!(out, "  ... and {} more", found.rows.len() - PREVIEW_ROWS)?;
        }
    }
    Ok(())
}
