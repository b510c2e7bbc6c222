use std::io::{self, Write};

use super::{banner, rule, truncate, write_rows};
use crate::services::catalog::LoadedReport;
use crate::services::excel::analyzer::{analyze_table, kind_counts};

const SAMPLE_ROWS: usize = 3;
const SAMPLE_COLUMNS: usize = 8;

pub fn write_report(out: &mut impl Write, report: &LoadedReport) -> io::Result<()> {
    let table = &report.table;
    banner(out, &format!("REPORT EXPLORER: {}", report.key.as_str().to_uppercase()))?;

    writeln!(out)?;
    writeln!(out, "Dataset Shape: {} rows x {} columns", table.height(), table.width())?;
    writeln!(out, "Header row: {}", report.normalize.header_row)?;
    if !report.normalize.dropped_columns.is_empty() {
        writeln!(out, "Dropped empty columns: {}", report.normalize.dropped_columns.join(", "))?;
    }
    for (from, to) in &report.normalize.renamed_columns {
        writeln!(out, "Renamed duplicate column '{}' to '{}'", from, to)?;
    }

    let columns = analyze_table(table);
    writeln!(out)?;
    writeln!(out, "All Columns ({}):", columns.len())?;
    for (i, column) in columns.iter().enumerate() {
        writeln!(
            out,
            " {:2}. {:40} [{}] - {} values ({:.1}% empty)",
            i + 1,
            truncate(&column.name, 40),
            column.data_type.as_str(),
            column.non_null_count,
            column.null_percent
        )?;
    }

    writeln!(out)?;
    writeln!(out, "First {} Rows:", SAMPLE_ROWS.min(table.height()))?;
    let rows: Vec<usize> = (0..table.height().min(SAMPLE_ROWS)).collect();
    write_rows(out, table, &rows, SAMPLE_COLUMNS)?;

    writeln!(out)?;
    writeln!(out, "Data Types:")?;
    for (kind, count) in kind_counts(&columns) {
        writeln!(out, "  {:10} {}", kind.as_str(), count)?;
    }

    writeln!(out)?;
    rule(out, 60)
}
