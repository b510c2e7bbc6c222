use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use dotenvy::dotenv;

use crate::error::AppError;
use crate::models::ReportKey;
use crate::services::excel::header::DEFAULT_SCAN_ROWS;

pub const CONFIG_PATH_VAR: &str = "SHEET_REPORTS_CONFIG";
pub const BASE_FOLDER_VAR: &str = "SHEET_REPORTS_BASE_FOLDER";
pub const USER_NAME_VAR: &str = "SHEET_REPORTS_USER_NAME";

fn default_header_scan_rows() -> usize {
    DEFAULT_SCAN_ROWS
}

fn default_file_pattern() -> String {
    "*.xlsx".to_string()
}

fn default_assignments_report() -> ReportKey {
    ReportKey::new("cost_estimating")
}

fn default_reports() -> Vec<ReportSource> {
    [
        ("Cost Estimating", "sd-09 Cost Estimating Schedule.xlsx"),
        ("Milestone Schedule", "sd-01 Milestone Schedule.xlsx"),
        ("Contract Schedule", "sd-01 Contract Schedule.xlsx"),
        ("Order Data", "sd-17 PGE Gas Ops Order Data.xlsx"),
    ]
    .into_iter()
    .map(|(label, file_name)| ReportSource {
        key: ReportKey::new(label),
        file_name: file_name.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReportSource {
    pub key: ReportKey,
    pub file_name: String,
}

/// On-disk shape of the TOML config; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_folder: Option<PathBuf>,
    user_name: Option<String>,
    assignments_report: Option<ReportKey>,
    archive_folder: Option<PathBuf>,
    database_path: Option<PathBuf>,
    header_scan_rows: Option<usize>,
    file_pattern: Option<String>,
    reports: Option<Vec<ReportSource>>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_folder: PathBuf,
    pub reports: Vec<ReportSource>,
    pub user_name: String,
    pub assignments_report: ReportKey,
    /// Storage conventions for callers; nothing in the loader reads them.
    pub archive_folder: PathBuf,
    pub database_path: PathBuf,
    pub header_scan_rows: usize,
    pub file_pattern: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base_folder(PathBuf::from("."))
    }
}

impl Config {
    pub fn with_base_folder(base_folder: PathBuf) -> Self {
        Config {
            archive_folder: base_folder.join("Data").join("Archive"),
            database_path: base_folder.join("Data").join("project_tracker.db"),
            base_folder,
            reports: default_reports(),
            user_name: String::new(),
            assignments_report: default_assignments_report(),
            header_scan_rows: default_header_scan_rows(),
            file_pattern: default_file_pattern(),
        }
    }

    /// Loads `.env`, then the TOML file (explicit path, else the
    /// `SHEET_REPORTS_CONFIG` variable, else built-in defaults), then
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        dotenv().ok();

        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                let text = std::fs::read_to_string(&path).map_err(|e| {
                    AppError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&text)?
            }
            None => Config::default(),
        };

        if let Ok(base) = std::env::var(BASE_FOLDER_VAR) {
            config.rebase(PathBuf::from(base));
        }
        if let Ok(user) = std::env::var(USER_NAME_VAR) {
            config.user_name = user;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        let file: ConfigFile = toml::from_str(text)?;

        let mut config = Config::with_base_folder(file.base_folder.unwrap_or_else(|| PathBuf::from(".")));
        if let Some(archive) = file.archive_folder {
            config.archive_folder = archive;
        }
        if let Some(db) = file.database_path {
            config.database_path = db;
        }
        if let Some(user) = file.user_name {
            config.user_name = user;
        }
        if let Some(report) = file.assignments_report {
            config.assignments_report = report;
        }
        if let Some(rows) = file.header_scan_rows {
            config.header_scan_rows = rows;
        }
        if let Some(pattern) = file.file_pattern {
            config.file_pattern = pattern;
        }
        if let Some(reports) = file.reports {
            config.reports = reports;
        }

        config.validate()?;
        Ok(config)
    }

    /// Moves the base folder, carrying derived storage paths along with it.
    fn rebase(&mut self, base_folder: PathBuf) {
        if let Ok(rest) = self.archive_folder.strip_prefix(&self.base_folder) {
            self.archive_folder = base_folder.join(rest);
        }
        if let Ok(rest) = self.database_path.strip_prefix(&self.base_folder) {
            self.database_path = base_folder.join(rest);
        }
        self.base_folder = base_folder;
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.header_scan_rows == 0 {
            return Err(AppError::Config("header_scan_rows must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        for report in &self.reports {
            if report.key.as_str().is_empty() {
                return Err(AppError::Config(format!(
                    "report for '{}' has an empty key",
                    report.file_name
                )));
            }
            if !seen.insert(&report.key) {
                return Err(AppError::Config(format!("duplicate report key '{}'", report.key)));
            }
        }
        Ok(())
    }

    pub fn file_path(&self, key: &ReportKey) -> Option<PathBuf> {
        self.reports
            .iter()
            .find(|r| &r.key == key)
            .map(|r| self.base_folder.join(&r.file_name))
    }

    pub fn all_file_paths(&self) -> Vec<(ReportKey, PathBuf)> {
        self.reports
            .iter()
            .map(|r| (r.key.clone(), self.base_folder.join(&r.file_name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that change the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [CONFIG_PATH_VAR, BASE_FOLDER_VAR, USER_NAME_VAR] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn defaults_cover_the_four_schedules() {
        let config = Config::with_base_folder(PathBuf::from("/reports"));
        let keys: Vec<&str> = config.reports.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            ["cost_estimating", "milestone_schedule", "contract_schedule", "order_data"]
        );
        assert_eq!(config.archive_folder, PathBuf::from("/reports/Data/Archive"));
        assert_eq!(
            config.file_path(&ReportKey::new("order_data")),
            Some(PathBuf::from("/reports/sd-17 PGE Gas Ops Order Data.xlsx"))
        );
    }

    #[test]
    fn toml_labels_become_report_keys() {
        let config = Config::from_toml(
            r#"
            base_folder = "/data"
            user_name = "Shaun Sauer"
            header_scan_rows = 12

            [[reports]]
            key = "Cost Estimating"
            file_name = "ce.xlsx"
            "#,
        )
        .unwrap();

        assert_eq!(config.user_name, "Shaun Sauer");
        assert_eq!(config.header_scan_rows, 12);
        assert_eq!(config.reports.len(), 1);
        assert_eq!(config.reports[0].key.as_str(), "cost_estimating");
        assert_eq!(config.database_path, PathBuf::from("/data/Data/project_tracker.db"));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = Config::from_toml(
            r#"
            [[reports]]
            key = "Order Data"
            file_name = "a.xlsx"

            [[reports]]
            key = "order_data"
            file_name = "b.xlsx"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn zero_scan_rows_is_rejected() {
        let err = Config::from_toml("header_scan_rows = 0").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn rebase_moves_derived_paths() {
        let mut config = Config::with_base_folder(PathBuf::from("/old"));
        config.rebase(PathBuf::from("/new"));
        assert_eq!(config.archive_folder, PathBuf::from("/new/Data/Archive"));
        assert_eq!(config.database_path, PathBuf::from("/new/Data/project_tracker.db"));
    }

    #[test]
    fn load_reads_config_var_then_applies_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet_reports.toml");
        std::fs::write(
            &path,
            r#"
            base_folder = "/file/base"
            user_name = "File User"
            header_scan_rows = 15
            "#,
        )
        .unwrap();

        clear_env();
        std::env::set_var(CONFIG_PATH_VAR, &path);
        let from_file = Config::load(None);

        std::env::set_var(BASE_FOLDER_VAR, "/env/base");
        std::env::set_var(USER_NAME_VAR, "Env User");
        let overridden = Config::load(None);
        clear_env();

        let from_file = from_file.unwrap();
        assert_eq!(from_file.base_folder, PathBuf::from("/file/base"));
        assert_eq!(from_file.user_name, "File User");

        let config = overridden.unwrap();
        assert_eq!(config.header_scan_rows, 15);
        assert_eq!(config.base_folder, PathBuf::from("/env/base"));
        assert_eq!(config.user_name, "Env User");
        assert_eq!(config.archive_folder, PathBuf::from("/env/base/Data/Archive"));
        assert_eq!(config.database_path, PathBuf::from("/env/base/Data/project_tracker.db"));
    }

    #[test]
    fn explicit_path_wins_over_config_var() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&explicit, "user_name = \"Explicit\"").unwrap();

        clear_env();
        std::env::set_var(CONFIG_PATH_VAR, dir.path().join("absent.toml"));
        let loaded = Config::load(Some(&explicit));
        let missing = Config::load(None);
        clear_env();

        assert_eq!(loaded.unwrap().user_name, "Explicit");
        assert!(matches!(missing.unwrap_err(), AppError::Config(_)));
    }
}
