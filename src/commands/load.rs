use std::io::{self, Write};

use super::{banner, preview_list, rule};
use crate::services::catalog::{LoadSummary, ReportCatalog};
use crate::services::excel::source::GridSource;

pub fn write_load_summary<S: GridSource>(
    out: &mut impl Write,
    catalog: &ReportCatalog<S>,
    summary: &LoadSummary,
) -> io::Result<()> {
    banner(out, "REPORT DATA LOADER")?;
    writeln!(out, "Loading reports from: {}", catalog.config().base_folder.display())?;

    for report in catalog.reports() {
        writeln!(out)?;
        writeln!(out, "Loaded {}", report.key)?;
        writeln!(out, "  From: {}", report.path.display())?;
        if report.normalize.header_row > 0 {
            writeln!(
                out,
                "  Header at row {} (skipped {} title rows)",
                report.normalize.header_row + 1,
                report.normalize.header_row
            )?;
        }
        writeln!(out, "  {} rows x {} columns", report.table.height(), report.table.width())?;
        writeln!(out, "  Columns: {}", preview_list(report.table.columns(), 5))?;
    }

    for failure in &summary.failures {
        writeln!(out)?;
        writeln!(out, "Error loading {}", failure.key)?;
        writeln!(out, "  Path: {}", failure.path.display())?;
        writeln!(out, "  {}", failure.error)?;
    }

    writeln!(out)?;
    rule(out, 60)?;
    writeln!(out, "Successfully loaded {}/{} reports", summary.succeeded, summary.attempted)?;
    writeln!(out, "Last load: {}", summary.loaded_at.format("%Y-%m-%d %H:%M:%S"))?;
    rule(out, 60)
}

pub fn write_summary_stats<S: GridSource>(
    out: &mut impl Write,
    catalog: &ReportCatalog<S>,
) -> io::Result<()> {
    banner(out, "SUMMARY STATISTICS")?;
    for stats in catalog.summary() {
        writeln!(out)?;
        writeln!(out, "Report: {}", stats.key.as_str().to_uppercase())?;
        writeln!(out, "  * Total Rows: {}", stats.rows)?;
        writeln!(out, "  * Columns: {}", stats.columns)?;
        if !stats.date_columns.is_empty() {
            writeln!(out, "  * Date Columns: {}", stats.date_columns.join(", "))?;
        }
    }
    Ok(())
}

pub fn write_summary_json(out: &mut impl Write, summary: &LoadSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)
}
