use chrono::{DateTime, Local};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{Config, USER_NAME_VAR};
use crate::error::AppError;
use crate::models::{ReportKey, Table};
use crate::services::excel::header::HeaderDetector;
use crate::services::excel::normalizer::{normalize_named, NormalizeReport};
use crate::services::excel::source::GridSource;
use crate::services::name_matcher::{find_matching_rows, rank_name_columns, ColumnCandidates};

/// One successfully loaded report.
#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub key: ReportKey,
    pub path: PathBuf,
    pub table: Table,
    pub normalize: NormalizeReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub key: ReportKey,
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<LoadFailure>,
    pub loaded_at: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportStats {
    pub key: ReportKey,
    pub rows: usize,
    pub columns: usize,
    pub header_row: usize,
    pub date_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Assignments {
    pub report: ReportKey,
    pub column: String,
    pub candidates: ColumnCandidates,
    pub user_name: String,
    pub rows: Vec<usize>,
}

/// Named reports loaded through detect + normalize, keyed by ReportKey.
pub struct ReportCatalog<S> {
    config: Config,
    source: S,
    detector: HeaderDetector,
    reports: BTreeMap<ReportKey, LoadedReport>,
    loaded_at: Option<DateTime<Local>>,
}

impl<S: GridSource> ReportCatalog<S> {
    pub fn new(config: Config, source: S) -> Self {
        Self {
            config,
            source,
            detector: HeaderDetector::default(),
            reports: BTreeMap::new(),
            loaded_at: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loads every configured report. A failing report is recorded and left
    /// out; the rest still load. The previous mapping is replaced wholesale.
    pub fn load_all(&mut self) -> LoadSummary {
        let start = Instant::now();
        let paths = self.config.all_file_paths();
        tracing::info!(
            "Loading {} reports from {}",
            paths.len(),
            self.config.base_folder.display()
        );

        let this = &*self;
        let results: Vec<(ReportKey, PathBuf, Result<LoadedReport, AppError>)> = paths
            .into_par_iter()
            .map(|(key, path)| {
                let result = this.load_report(&key, &path);
                (key, path, result)
            })
            .collect();

        let attempted = results.len();
        let mut reports = BTreeMap::new();
        let mut failures = Vec::new();
        for (key, path, result) in results {
            match result {
                Ok(report) => {
                    reports.insert(key, report);
                }
                Err(e) => {
                    if e.is_source_failure() {
                        tracing::warn!("Failed to load report {}: {}", key, e);
                    } else {
                        tracing::error!("Unexpected error loading report {}: {}", key, e);
                    }
                    failures.push(LoadFailure { key, path, error: e.to_string() });
                }
            }
        }

        let loaded_at = Local::now();
        self.reports = reports;
        self.loaded_at = Some(loaded_at);

        tracing::info!(
            "Loaded {}/{} reports in {:?}",
            self.reports.len(),
            attempted,
            start.elapsed()
        );

        LoadSummary {
            attempted,
            succeeded: self.reports.len(),
            failures,
            loaded_at,
        }
    }

    /// Runs the full pipeline for one file without touching the catalog.
    pub fn load_report(&self, key: &ReportKey, path: &Path) -> Result<LoadedReport, AppError> {
        let start = Instant::now();
        tracing::info!("Loading {} from {}", key, path.display());

        let grid = self.source.read_grid(path, None)?;
        let scan_rows = self.config.header_scan_rows;
        let header_row = self.detector.detect(&grid.head(scan_rows), scan_rows);
        if header_row > 0 {
            tracing::info!("{}: header detected at row {} (skipping {} title rows)", key, header_row, header_row);
        }

        let (table, normalize) = normalize_named(&grid, header_row, key.as_str())?;

        tracing::info!(
            "{}: loaded {} rows x {} columns in {:?}",
            key,
            table.height(),
            table.width(),
            start.elapsed()
        );

        Ok(LoadedReport {
            key: key.clone(),
            path: path.to_path_buf(),
            table,
            normalize,
        })
    }

    pub fn get(&self, key: &ReportKey) -> Option<&LoadedReport> {
        self.reports.get(key)
    }

    pub fn table(&self, key: &ReportKey) -> Result<&Table, AppError> {
        self.reports
            .get(key)
            .map(|r| &r.table)
            .ok_or_else(|| AppError::ReportNotLoaded(key.clone()))
    }

    pub fn reports(&self) -> impl Iterator<Item = &LoadedReport> {
        self.reports.values()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.loaded_at
    }

    pub fn summary(&self) -> Vec<ReportStats> {
        self.reports
            .values()
            .map(|report| ReportStats {
                key: report.key.clone(),
                rows: report.table.height(),
                columns: report.table.width(),
                header_row: report.normalize.header_row,
                date_columns: report
                    .table
                    .columns()
                    .iter()
                    .filter(|c| c.to_lowercase().contains("date"))
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// Rows of `report` (default: the configured assignments report)
    /// naming `user_name` (default: the configured user). Without an
    /// explicit column the first name-like column is used and every
    /// candidate is returned alongside it.
    pub fn find_assignments(
        &self,
        report: Option<&ReportKey>,
        column: Option<&str>,
        user_name: Option<&str>,
    ) -> Result<Assignments, AppError> {
        let report = report.unwrap_or(&self.config.assignments_report).clone();
        let table = self.table(&report)?;
        let user_name = user_name.unwrap_or(self.config.user_name.as_str()).to_string();
        if user_name.trim().is_empty() {
            return Err(AppError::Config(format!(
                "no user name configured; set user_name in the config file or {}",
                USER_NAME_VAR
            )));
        }

        let candidates = rank_name_columns(table.columns());
        let column = match column {
            Some(column) => column.to_string(),
            None => candidates.chosen.clone().ok_or_else(|| AppError::ColumnNotFound {
                column: "<name column>".to_string(),
                available: table.columns().to_vec(),
            })?,
        };
        if candidates.is_ambiguous() {
            tracing::info!("Name column candidates in {}: {:?}; using '{}'", report, candidates.matches, column);
        }

        let rows = find_matching_rows(table, &column, &user_name)?;
        tracing::info!("Found {} rows in {} assigned to {}", rows.len(), report, user_name);

        Ok(Assignments { report, column, candidates, user_name, rows })
    }
}
