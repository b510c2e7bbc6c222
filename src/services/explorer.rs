use glob::Pattern;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::Table;
use crate::services::excel::header::detect_header_row;
use crate::services::excel::normalizer::{header_names, normalize_named};
use crate::services::excel::source::GridSource;

const SAMPLE_ROWS: usize = 5;

/// Structure of one file found while scanning a folder.
#[derive(Debug, Clone, Serialize)]
pub struct FileSchema {
    pub file_name: String,
    pub header_row: usize,
    pub columns: Vec<String>,
    pub sample_rows: usize,
    #[serde(skip)]
    pub sample: Table,
}

impl FileSchema {
    /// Report family prefix, e.g. "sd-09" for "sd-09 Cost Estimating Schedule.xlsx".
    pub fn prefix(&self) -> &str {
        self.file_name
            .split_whitespace()
            .next()
            .unwrap_or(&self.file_name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnHit {
    pub file_name: String,
    pub header_row: usize,
    pub columns: Vec<String>,
}

pub fn matching_files(folder: &Path, pattern: &str) -> Result<Vec<PathBuf>, AppError> {
    if !folder.is_dir() {
        return Err(AppError::SourceNotFound { path: folder.to_path_buf() });
    }

    let full_pattern = format!("{}/{}", Pattern::escape(&folder.to_string_lossy()), pattern);
    let mut files: Vec<PathBuf> = glob::glob(&full_pattern)?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect();
    files.sort();
    Ok(files)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Names of the detected header row, before any column is dropped.
fn raw_header<S: GridSource + ?Sized>(
    source: &S,
    path: &Path,
    scan_rows: usize,
) -> Result<(usize, Vec<String>), AppError> {
    let head = source.read_grid(path, Some(scan_rows))?;
    let header_row = detect_header_row(&head, scan_rows);
    let row = head
        .row(header_row)
        .ok_or_else(|| AppError::MalformedTable(format!("no header row in {}", path.display())))?;
    Ok((header_row, header_names(row)))
}

/// Detects the header and normalizes the first few data rows of one file.
pub fn inspect_file<S: GridSource + ?Sized>(
    source: &S,
    path: &Path,
    scan_rows: usize,
    sample_rows: usize,
) -> Result<FileSchema, AppError> {
    let file_name = file_name_of(path);

    let head = source.read_grid(path, Some(scan_rows))?;
    let header_row = detect_header_row(&head, scan_rows);

    let grid = source.read_grid(path, Some(header_row + 1 + sample_rows))?;
    let (sample, _) = normalize_named(&grid, header_row, &file_name)?;

    Ok(FileSchema {
        file_name,
        header_row,
        columns: sample.columns().to_vec(),
        sample_rows: sample.height(),
        sample,
    })
}

/// Inspects every file in `folder` matching `pattern`. Files that fail to
/// load are logged and left out.
pub fn explore_folder<S: GridSource + ?Sized>(
    source: &S,
    folder: &Path,
    pattern: &str,
    scan_rows: usize,
) -> Result<Vec<FileSchema>, AppError> {
    let files = matching_files(folder, pattern)?;
    tracing::info!("Found {} files in {}", files.len(), folder.display());

    let mut results = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        tracing::debug!("[{}/{}] {}", i + 1, files.len(), path.display());
        match inspect_file(source, path, scan_rows, SAMPLE_ROWS) {
            Ok(schema) => results.push(schema),
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(results)
}

/// Files with at least one column whose name contains `term`, ignoring case.
pub fn find_files_with_column<S: GridSource + ?Sized>(
    source: &S,
    folder: &Path,
    pattern: &str,
    term: &str,
    scan_rows: usize,
) -> Result<Vec<ColumnHit>, AppError> {
    let needle = term.to_lowercase();
    let mut hits = Vec::new();

    for path in matching_files(folder, pattern)? {
        let (header_row, names) = match raw_header(source, &path, scan_rows) {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let columns: Vec<String> = names
            .into_iter()
            .filter(|c| c.to_lowercase().contains(&needle))
            .collect();
        if !columns.is_empty() {
            hits.push(ColumnHit {
                file_name: file_name_of(&path),
                header_row,
                columns,
            });
        }
    }

    Ok(hits)
}
