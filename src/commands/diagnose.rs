use std::io::{self, Write};
use std::path::Path;

use super::{rule, truncate};
use crate::models::Grid;
use crate::services::excel::header::{Likelihood, RowScore};

const RAW_WIDTH: usize = 80;

/// Raw cell dump followed by the per-row header scoring.
pub fn write_diagnosis(
    out: &mut impl Write,
    path: &Path,
    grid: &Grid,
    scores: &[RowScore],
    detected: usize,
) -> io::Result<()> {
    rule(out, RAW_WIDTH)?;
    writeln!(out, "RAW FILE INSPECTION: {}", path.display())?;
    rule(out, RAW_WIDTH)?;
    writeln!(out)?;
    writeln!(out, "Showing first {} rows (0-indexed):", grid.height())?;
    writeln!(out)?;

    for (idx, row) in grid.rows().enumerate() {
        writeln!(out, "Row {}:", idx)?;
        for (col_idx, cell) in row.iter().enumerate().filter(|(_, c)| !c.is_empty()) {
            writeln!(out, "  Col {}: {}", col_idx, truncate(&cell.to_string(), 50))?;
        }
        writeln!(out)?;
    }

    rule(out, RAW_WIDTH)?;
    writeln!(out, "AUTO-DETECTION ANALYSIS")?;
    rule(out, RAW_WIDTH)?;

    for score in scores {
        writeln!(out)?;
        writeln!(out, "Row {} Analysis (score {:.1}):", score.row, score.score)?;
        writeln!(out, "  - Filled cells: {}/{}", score.filled, score.width)?;
        writeln!(out, "  - Text cells: {}", score.text)?;
        writeln!(out, "  - Unique values: {}", score.distinct)?;
        if !score.keywords.is_empty() {
            writeln!(out, "  - Header keywords found: {}", score.keywords.join(", "))?;
        }
        match score.likelihood() {
            Likelihood::High => writeln!(out, "  HIGH likelihood this is the header row")?,
            Likelihood::Low => writeln!(out, "  LOW likelihood (mostly empty)")?,
            Likelihood::TitleRow => writeln!(out, "  WARNING: Probably a title row (all same value)")?,
            Likelihood::Unclear => {}
        }
    }

    writeln!(out)?;
    writeln!(out, "Detected header at row {}", detected)?;
    rule(out, RAW_WIDTH)
}
