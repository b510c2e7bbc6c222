//! Loads spreadsheet reports whose real header sits somewhere below a few
//! title rows, normalizes them into tables and finds the rows assigned to
//! a person.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use models::{Cell, Grid, ReportKey, Table};
pub use services::catalog::ReportCatalog;
pub use services::excel::{detect_header_row, normalize, GridSource, WorkbookSource};
pub use services::name_matcher::{find_matching_rows, names_match, normalize_name};
