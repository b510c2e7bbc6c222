use std::io::{self, Write};
use std::path::Path;

use super::{rule, write_rows};
use crate::services::explorer::{ColumnHit, FileSchema};

const SAMPLE_ROWS: usize = 2;
const SAMPLE_COLUMNS: usize = 5;

pub fn write_folder(out: &mut impl Write, folder: &Path, results: &[FileSchema]) -> io::Result<()> {
    rule(out, 80)?;
    writeln!(out, "EXPLORING ALL FILES IN: {}", folder.display())?;
    rule(out, 80)?;
    writeln!(out)?;
    writeln!(out, "Loaded {} files", results.len())?;

    for (i, schema) in results.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "[{}/{}] {}", i + 1, results.len(), schema.file_name)?;
        writeln!(out, "{}", "-".repeat(80))?;
        if schema.header_row > 0 {
            writeln!(
                out,
                "   Header detected at row {} (skipping {} title rows)",
                schema.header_row + 1,
                schema.header_row
            )?;
        }
        writeln!(out, "   Columns ({}): {}", schema.columns.len(), super::preview_list(&schema.columns, 8))?;

        if schema.sample_rows > 0 {
            writeln!(out)?;
            writeln!(out, "   Sample data (first {} rows, first {} columns):", SAMPLE_ROWS, SAMPLE_COLUMNS)?;
            let rows: Vec<usize> = (0..schema.sample_rows.min(SAMPLE_ROWS)).collect();
            write_rows(out, &schema.sample, &rows, SAMPLE_COLUMNS)?;
        }
    }

    writeln!(out)?;
    rule(out, 80)?;
    writeln!(out, "SUMMARY")?;
    rule(out, 80)?;
    writeln!(out)?;
    writeln!(out, "Files by category:")?;
    for schema in results {
        writeln!(out, "   {:20} - {:2} columns - {}", schema.prefix(), schema.columns.len(), schema.file_name)?;
    }
    Ok(())
}

pub fn write_column_hits(out: &mut impl Write, term: &str, hits: &[ColumnHit]) -> io::Result<()> {
    writeln!(out, "Searching for columns containing: '{}'", term)?;
    writeln!(out, "{}", "-".repeat(80))?;

    if hits.is_empty() {
        writeln!(out, "No files found with columns containing '{}'", term)?;
        return Ok(());
    }

    for hit in hits {
        writeln!(out, "FOUND: {}", hit.file_name)?;
        if hit.header_row > 0 {
            writeln!(out, "   (Header at row {})", hit.header_row + 1)?;
        }
        writeln!(out, "   Columns: {}", hit.columns.join(", "))?;
    }
    writeln!(out)?;
    writeln!(out, "Found {} files with matching columns", hits.len())
}
