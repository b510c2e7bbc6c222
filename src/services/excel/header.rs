//! Finds the header row in a report whose real header sits below an unknown
//! number of title rows.
//!
//! Each row is scored on its own:
//!
//! * fill: share of non-empty cells, weighted 100
//! * text: share of text cells, weighted 50
//! * keywords: 30 per header keyword found in the lowercased row text
//! * distinctness: +20 above three distinct values, -50 for a single
//!   repeated value (a title banner)
//!
//! The first row to strictly beat the running best wins, so ties go to the
//! earliest row and a sample where nothing scores above zero yields row 0.

use serde::Serialize;
use std::collections::HashSet;

use crate::models::{Cell, Grid};

pub const DEFAULT_SCAN_ROWS: usize = 20;

pub const HEADER_KEYWORDS: [&str; 17] = [
    "project", "name", "date", "status", "phase", "number",
    "assigned", "estimator", "location", "region", "pmo",
    "start", "end", "complete", "due", "schedule", "id",
];

const FILL_WEIGHT: f64 = 100.0;
const TEXT_WEIGHT: f64 = 50.0;
const KEYWORD_WEIGHT: f64 = 30.0;
const DISTINCT_BONUS: f64 = 20.0;
const BANNER_PENALTY: f64 = 50.0;

/// Rough human-readable verdict on a row, shown by the diagnose command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Likelihood {
    High,
    Low,
    TitleRow,
    Unclear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowScore {
    pub row: usize,
    pub width: usize,
    pub filled: usize,
    pub text: usize,
    pub distinct: usize,
    pub keywords: Vec<&'static str>,
    pub score: f64,
}

impl RowScore {
    pub fn likelihood(&self) -> Likelihood {
        let half = self.width as f64 * 0.5;
        if self.filled as f64 > half && self.text as f64 > half && self.distinct > 3 {
            Likelihood::High
        } else if self.filled < 3 {
            Likelihood::Low
        } else if self.distinct == 1 {
            Likelihood::TitleRow
        } else {
            Likelihood::Unclear
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeaderDetector {
    keywords: Vec<&'static str>,
}

impl Default for HeaderDetector {
    fn default() -> Self {
        Self { keywords: HEADER_KEYWORDS.to_vec() }
    }
}

impl HeaderDetector {
    pub fn score_row(&self, row_idx: usize, row: &[Cell]) -> RowScore {
        let width = row.len();
        let values: Vec<String> = row
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();
        let filled = values.len();
        let text = row.iter().filter(|c| c.is_text()).count();
        let distinct = values.iter().collect::<HashSet<_>>().len();

        let row_text = values.join(" ").to_lowercase();
        let keywords: Vec<&'static str> = if row_text.is_empty() {
            Vec::new()
        } else {
            self.keywords
                .iter()
                .copied()
                .filter(|kw| row_text.contains(kw))
                .collect()
        };

        let mut score = 0.0;
        if width > 0 {
            score += filled as f64 / width as f64 * FILL_WEIGHT;
            score += text as f64 / width as f64 * TEXT_WEIGHT;
        }
        score += keywords.len() as f64 * KEYWORD_WEIGHT;
        if distinct > 3 {
            score += DISTINCT_BONUS;
        } else if distinct == 1 {
            score -= BANNER_PENALTY;
        }

        RowScore { row: row_idx, width, filled, text, distinct, keywords, score }
    }

    /// Scores at most `max_rows` leading rows (at least one).
    pub fn score_rows(&self, grid: &Grid, max_rows: usize) -> Vec<RowScore> {
        grid.rows()
            .take(max_rows.max(1))
            .enumerate()
            .map(|(idx, row)| self.score_row(idx, row))
            .collect()
    }

    pub fn detect(&self, grid: &Grid, max_rows: usize) -> usize {
        let mut best_row = 0;
        let mut best_score = 0.0;

        for candidate in self.score_rows(grid, max_rows) {
            tracing::debug!(
                "Header candidate row {}: score {:.1} (filled {}/{}, text {}, distinct {}, keywords {:?})",
                candidate.row,
                candidate.score,
                candidate.filled,
                candidate.width,
                candidate.text,
                candidate.distinct,
                candidate.keywords
            );
            if candidate.score > best_score {
                best_score = candidate.score;
                best_row = candidate.row;
            }
        }

        best_row
    }
}

pub fn score_rows(grid: &Grid, max_rows: usize) -> Vec<RowScore> {
    HeaderDetector::default().score_rows(grid, max_rows)
}

/// Zero-based index of the most likely header row; never fails.
pub fn detect_header_row(grid: &Grid, max_rows: usize) -> usize {
    HeaderDetector::default().detect(grid, max_rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    #[test]
    fn header_below_title_banner() {
        let grid = Grid::new(vec![
            text_row(&["SD-09 Cost Estimating Schedule", "", "", "", ""]),
            text_row(&["", "", "", "", ""]),
            text_row(&["Project ID", "Project Name", "Status", "Estimator", "Due Date"]),
            vec![
                Cell::Number(1001.0),
                "Main St".into(),
                "Open".into(),
                "Sauer, Shaun".into(),
                Cell::Empty,
            ],
        ]);
        assert_eq!(detect_header_row(&grid, DEFAULT_SCAN_ROWS), 2);
    }

    #[test]
    fn single_row_grid_is_row_zero() {
        let grid = Grid::new(vec![text_row(&["x", "x"])]);
        assert_eq!(detect_header_row(&grid, 20), 0);
    }

    #[test]
    fn empty_grid_defaults_to_zero() {
        assert_eq!(detect_header_row(&Grid::default(), 20), 0);
        let blank = Grid::new(vec![vec![Cell::Empty; 4]; 5]);
        assert_eq!(detect_header_row(&blank, 20), 0);
    }

    #[test]
    fn ties_keep_the_earliest_row() {
        let row = text_row(&["Project", "Status", "Region", "Phase"]);
        let grid = Grid::new(vec![text_row(&["", "", "", ""]), row.clone(), row]);
        assert_eq!(detect_header_row(&grid, 20), 1);
    }

    #[test]
    fn scan_is_bounded_by_max_rows() {
        let grid = Grid::new(vec![
            text_row(&["Banner", "Banner", "", ""]),
            text_row(&["", "", "", ""]),
            text_row(&["Project", "Status", "Region", "Phase"]),
        ]);
        assert_eq!(detect_header_row(&grid, 2), 0);
        assert_eq!(detect_header_row(&grid, 0), 0);
        assert_eq!(score_rows(&grid, 0).len(), 1);
    }

    #[test]
    fn score_breakdown() {
        let detector = HeaderDetector::default();
        let row = text_row(&["Project Number", "Status", "Assigned To", "Location"]);
        let score = detector.score_row(0, &row);

        // "project", "number", "status", "assigned", "location"
        assert_eq!(score.keywords.len(), 5);
        assert_eq!(score.score, 100.0 + 50.0 + 150.0 + 20.0);
        assert_eq!(score.likelihood(), Likelihood::High);
    }

    #[test]
    fn banner_row_is_penalized() {
        let detector = HeaderDetector::default();
        let row = text_row(&["Report", "Report", "Report", ""]);
        let score = detector.score_row(0, &row);
        assert_eq!(score.distinct, 1);
        assert_eq!(score.score, 75.0 + 37.5 - 50.0);
        assert_eq!(score.likelihood(), Likelihood::TitleRow);
    }

    #[test]
    fn mostly_empty_row_is_low() {
        let detector = HeaderDetector::default();
        let row = vec![Cell::Number(3.0), Cell::Empty, Cell::Empty];
        assert_eq!(detector.score_row(0, &row).likelihood(), Likelihood::Low);
    }
}
