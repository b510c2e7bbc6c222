use std::path::PathBuf;
use thiserror::Error;

use crate::models::ReportKey;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Failed to decode {}: {message}", path.display())]
    SourceDecode { path: PathBuf, message: String },

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Column '{column}' not found (available: {})", available.join(", "))]
    ColumnNotFound { column: String, available: Vec<String> },

    #[error("Report '{0}' is not loaded")]
    ReportNotLoaded(ReportKey),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Errors the catalog records as "this report failed to load".
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            AppError::SourceNotFound { .. }
                | AppError::SourceDecode { .. }
                | AppError::MalformedTable(_)
                | AppError::Io(_)
        )
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<glob::PatternError> for AppError {
    fn from(err: glob::PatternError) -> Self {
        AppError::Config(format!("Invalid file pattern: {}", err))
    }
}
