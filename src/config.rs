//! Configuration handling for tablewatch

use std::path::PathBuf;

use crate::logging::Profile;
use crate::store::DEFAULT_TABLE;

/// Columns that identify a project in the grouped report
pub const DEFAULT_GROUP_COLUMNS: [&str; 7] = [
    "Rep Name",
    "Project Name",
    "Project City",
    "Project State",
    "Quote Name",
    "Create Date",
    "Quote Status",
];

/// Columns listed under each project in the grouped report
pub const DEFAULT_DETAIL_COLUMNS: [&str; 4] = [
    "Product Group",
    "Product SKU",
    "Product Quantity",
    "Product Total Amount",
];

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Html,
}

/// Configuration for a check run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the ingested export
    pub input_file: PathBuf,
    /// Path to the SQLite database holding the current snapshot
    pub database: PathBuf,
    /// Name of the snapshot table
    pub table_name: String,
    /// Columns that identify a project group in the report
    pub group_columns: Vec<String>,
    /// Columns shown for each record within a group
    pub detail_columns: Vec<String>,
    /// Output format
    pub output_format: OutputFormat,
    /// Colored terminal output
    pub color: bool,
    /// For Excel files: which sheet to read
    pub sheet_name: Option<String>,
    /// Rows above the header row to skip
    pub skip_rows: usize,
    /// Compute and report differences without saving the new snapshot
    pub dry_run: bool,
    /// Log output style
    pub log_profile: Profile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            database: PathBuf::from("tablewatch.db"),
            table_name: DEFAULT_TABLE.to_string(),
            group_columns: DEFAULT_GROUP_COLUMNS.iter().map(|s| s.to_string()).collect(),
            detail_columns: DEFAULT_DETAIL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            output_format: OutputFormat::default(),
            color: false,
            sheet_name: None,
            skip_rows: 0,
            dry_run: false,
            log_profile: Profile::default(),
        }
    }
}

impl Config {
    /// Create a new Config for an input file
    pub fn new(input_file: PathBuf) -> Self {
        Self {
            input_file,
            ..Default::default()
        }
    }

    /// Set the snapshot database path
    pub fn with_database(mut self, database: PathBuf) -> Self {
        self.database = database;
        self
    }

    /// Set the snapshot table name
    pub fn with_table_name(mut self, name: String) -> Self {
        self.table_name = name;
        self
    }

    /// Set report group columns
    pub fn with_group_columns(mut self, columns: Vec<String>) -> Self {
        self.group_columns = columns;
        self
    }

    /// Set report detail columns
    pub fn with_detail_columns(mut self, columns: Vec<String>) -> Self {
        self.detail_columns = columns;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enable colored terminal output
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: String) -> Self {
        self.sheet_name = Some(name);
        self
    }

    /// Set number of banner rows above the header
    pub fn with_skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set log output style
    pub fn with_log_profile(mut self, profile: Profile) -> Self {
        self.log_profile = profile;
        self
    }
}
