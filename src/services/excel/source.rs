use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

use super::utils::parse_date_string;
use crate::error::AppError;
use crate::models::{Cell, Grid};

/// Produces raw cell grids for a file locator.
///
/// `limit` asks for at most that many rows; header detection only needs a
/// short prefix of a large report.
pub trait GridSource: Send + Sync {
    fn read_grid(&self, path: &Path, limit: Option<usize>) -> Result<Grid, AppError>;
}

/// Reads the first worksheet of any workbook format calamine understands.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookSource;

impl GridSource for WorkbookSource {
    fn read_grid(&self, path: &Path, limit: Option<usize>) -> Result<Grid, AppError> {
        if !path.exists() {
            return Err(AppError::SourceNotFound { path: path.to_path_buf() });
        }

        let decode_error = |message: String| AppError::SourceDecode {
            path: path.to_path_buf(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| {
            tracing::error!("Failed to open workbook {}: {}", path.display(), e);
            decode_error(format!("Failed to open workbook: {}", e))
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| decode_error("No sheets found in workbook".to_string()))?
            .map_err(|e| decode_error(format!("Failed to read worksheet: {}", e)))?;

        let grid = range_to_grid(&range, limit);
        tracing::debug!(
            "Read {} rows x {} columns from {}",
            grid.height(),
            grid.width(),
            path.display()
        );
        Ok(grid)
    }
}

pub fn range_to_grid(range: &Range<Data>, limit: Option<usize>) -> Grid {
    let rows = range
        .rows()
        .take(limit.unwrap_or(usize::MAX))
        .map(|row| row.iter().map(to_cell).collect())
        .collect();
    Grid::new(rows)
}

pub fn to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => Cell::DateTime(dt),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_date_string(s) {
            Some(dt) => Cell::DateTime(dt),
            None => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};
    use chrono::NaiveDate;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkbookSource
            .read_grid(&dir.path().join("absent.xlsx"), None)
            .unwrap_err();
        assert!(matches!(err, AppError::SourceNotFound { .. }));
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"this is not a zip archive").unwrap();

        let err = WorkbookSource.read_grid(&path, Some(20)).unwrap_err();
        assert!(matches!(err, AppError::SourceDecode { .. }));
    }

    #[test]
    fn range_conversion_respects_limit() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("Project".to_string()));
        range.set_value((0, 1), Data::String("Status".to_string()));
        range.set_value((1, 0), Data::Int(7));
        range.set_value((2, 1), Data::Bool(true));

        let grid = range_to_grid(&range, Some(2));
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.row(1).unwrap(), &[Cell::Number(7.0), Cell::Empty]);
    }

    #[test]
    fn workbook_values_map_to_cells() {
        let noon = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let cases = [
            (Data::Empty, Cell::Empty),
            (Data::String("Open".into()), Cell::Text("Open".into())),
            (Data::Int(7), Cell::Number(7.0)),
            (Data::Float(2.5), Cell::Number(2.5)),
            (Data::Bool(false), Cell::Bool(false)),
            (
                Data::DateTime(ExcelDateTime::new(45292.5, ExcelDateTimeType::DateTime, false)),
                Cell::DateTime(noon),
            ),
            // Past the last representable date
            (
                Data::DateTime(ExcelDateTime::new(1e10, ExcelDateTimeType::DateTime, false)),
                Cell::Number(1e10),
            ),
            (Data::DateTimeIso("not a date".into()), Cell::Text("not a date".into())),
            (Data::DurationIso("PT1H30M".into()), Cell::Text("PT1H30M".into())),
            (Data::Error(CellErrorType::NA), Cell::Text("#N/A".into())),
        ];

        for (value, expected) in cases {
            assert_eq!(to_cell(&value), expected, "converting {:?}", value);
        }
        assert_eq!(to_cell(&Data::Int(7)).to_string(), "7");
    }

    #[test]
    fn empty_strings_become_empty_cells() {
        assert_eq!(to_cell(&Data::String(String::new())), Cell::Empty);
        assert_eq!(to_cell(&Data::DateTimeIso("2024-01-02".into())).to_string(), "2024-01-02 00:00:00");
    }
}
