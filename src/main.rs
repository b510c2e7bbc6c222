use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sheet_reports::commands::{assignments, diagnose, explore, load, scan};
use sheet_reports::config::Config;
use sheet_reports::logging;
use sheet_reports::models::ReportKey;
use sheet_reports::services::catalog::{LoadSummary, ReportCatalog};
use sheet_reports::services::excel::header::{detect_header_row, score_rows};
use sheet_reports::services::excel::{GridSource, WorkbookSource};
use sheet_reports::services::explorer::{explore_folder, find_files_with_column};

#[derive(Parser)]
#[command(name = "sheet-reports")]
#[command(author, version, about = "Load, normalize and search exported spreadsheet reports")]
struct Cli {
    /// TOML configuration file (default: $SHEET_REPORTS_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every configured report and print a summary
    Load {
        /// Print the load summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the schema and first rows of one report
    Explore {
        /// Report key or label, e.g. cost_estimating
        report: String,
    },

    /// Find rows naming the configured person
    Assignments {
        /// Report key (default: the configured assignments report)
        #[arg(short, long)]
        report: Option<String>,

        /// Column holding names (default: auto-detect)
        #[arg(short, long)]
        column: Option<String>,

        /// Person to search for (default: the configured user name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Dump the first rows of a file and the header scoring for each
    Diagnose {
        /// Spreadsheet file, absolute or relative to the base folder
        file: PathBuf,

        /// Number of rows to inspect
        #[arg(short, long, default_value = "10")]
        rows: usize,
    },

    /// Detect headers and list the columns of every file in the base folder
    Scan {
        /// File glob inside the base folder (default: from config)
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// List files with a column whose name contains a term
    Search {
        term: String,

        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Print the configuration, then load, explore and search as a smoke test
    Check,
}

fn main() -> Result<()> {
    logging::init_logging()?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Load { json } => run_load(&mut out, config, json),
        Commands::Explore { report } => run_explore(&mut out, config, &ReportKey::new(&report)),
        Commands::Assignments { report, column, name } => {
            let report = report.map(|r| ReportKey::new(&r));
            run_assignments(&mut out, config, report.as_ref(), column.as_deref(), name.as_deref())
        }
        Commands::Diagnose { file, rows } => run_diagnose(&mut out, &config, &file, rows),
        Commands::Scan { pattern } => {
            let pattern = pattern.unwrap_or_else(|| config.file_pattern.clone());
            let results = explore_folder(&WorkbookSource, &config.base_folder, &pattern, config.header_scan_rows)?;
            scan::write_folder(&mut out, &config.base_folder, &results)?;
            Ok(())
        }
        Commands::Search { term, pattern } => {
            let pattern = pattern.unwrap_or_else(|| config.file_pattern.clone());
            let hits = find_files_with_column(
                &WorkbookSource,
                &config.base_folder,
                &pattern,
                &term,
                config.header_scan_rows,
            )?;
            scan::write_column_hits(&mut out, &term, &hits)?;
            Ok(())
        }
        Commands::Check => run_check(&mut out, config),
    }
}

fn load_catalog(config: Config) -> (ReportCatalog<WorkbookSource>, LoadSummary) {
    let mut catalog = ReportCatalog::new(config, WorkbookSource);
    let summary = catalog.load_all();
    (catalog, summary)
}

fn run_load(out: &mut impl Write, config: Config, json: bool) -> Result<()> {
    let (catalog, summary) = load_catalog(config);
    if json {
        load::write_summary_json(out, &summary)?;
    } else {
        load::write_load_summary(out, &catalog, &summary)?;
        writeln!(out)?;
        load::write_summary_stats(out, &catalog)?;
    }
    Ok(())
}

fn run_explore(out: &mut impl Write, config: Config, key: &ReportKey) -> Result<()> {
    let path = config
        .file_path(key)
        .with_context(|| format!("Report '{}' is not configured", key))?;
    let catalog = ReportCatalog::new(config, WorkbookSource);
    let report = catalog
        .load_report(key, &path)
        .with_context(|| format!("Failed to load report '{}'", key))?;
    explore::write_report(out, &report)?;
    Ok(())
}

fn run_assignments(
    out: &mut impl Write,
    config: Config,
    report: Option<&ReportKey>,
    column: Option<&str>,
    name: Option<&str>,
) -> Result<()> {
    let (catalog, _) = load_catalog(config);
    let found = catalog
        .find_assignments(report, column, name)
        .context("Cannot search this report")?;
    let table = catalog.table(&found.report)?;
    assignments::write_assignments(out, table, &found)?;
    Ok(())
}

fn run_diagnose(out: &mut impl Write, config: &Config, file: &Path, rows: usize) -> Result<()> {
    let path = if file.exists() {
        file.to_path_buf()
    } else {
        config.base_folder.join(file)
    };

    let grid = WorkbookSource
        .read_grid(&path, Some(rows.max(1)))
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let scores = score_rows(&grid, rows);
    let detected = detect_header_row(&grid, rows);
    diagnose::write_diagnosis(out, &path, &grid, &scores, detected)?;
    Ok(())
}

fn run_check(out: &mut impl Write, config: Config) -> Result<()> {
    writeln!(out, "PROJECT TRACKER - QUICK START CHECK")?;
    writeln!(out)?;
    writeln!(out, "1. Configuration")?;
    writeln!(out, "   Base folder: {}", config.base_folder.display())?;
    writeln!(out, "   Your name: {}", config.user_name)?;
    writeln!(out, "   Files to load:")?;
    for report in &config.reports {
        writeln!(out, "      - {}: {}", report.key, report.file_name)?;
    }

    writeln!(out)?;
    writeln!(out, "2. Loading reports")?;
    let (catalog, summary) = load_catalog(config);
    load::write_load_summary(out, &catalog, &summary)?;
    if let Some(loaded_at) = catalog.loaded_at() {
        writeln!(out, "   Loaded at: {}", loaded_at.format("%Y-%m-%d %H:%M:%S"))?;
    }
    if catalog.is_empty() {
        writeln!(out)?;
        writeln!(out, "ERROR: No files loaded successfully!")?;
        writeln!(out, "   Check that the base folder and file names are correct")?;
        return Ok(());
    }

    let main_report = catalog.config().assignments_report.clone();
    if let Some(report) = catalog.get(&main_report) {
        writeln!(out)?;
        writeln!(out, "3. Exploring {}", main_report)?;
        explore::write_report(out, report)?;

        writeln!(out)?;
        writeln!(out, "4. Finding your assignments")?;
        match catalog.find_assignments(None, None, None) {
            Ok(found) => assignments::write_assignments(out, &report.table, &found)?,
            Err(e) => writeln!(out, "   Cannot search this report: {}", e)?,
        }
    }
    Ok(())
}
