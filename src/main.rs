//! tablewatch - report records added to or removed from a tabular export

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use tablewatch::check::{run_check, CheckOptions};
use tablewatch::config::{Config, OutputFormat, DEFAULT_DETAIL_COLUMNS, DEFAULT_GROUP_COLUMNS};
use tablewatch::logging::{self, Profile};
use tablewatch::parser::ParserFactory;
use tablewatch::report::{RendererFactory, ReportFormatter};
use tablewatch::store::{SqliteStore, DEFAULT_TABLE};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
    Html,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Html => OutputFormat::Html,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorWhen {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

impl From<LogFormat> for Profile {
    fn from(f: LogFormat) -> Self {
        match f {
            LogFormat::Human => Profile::Human,
            LogFormat::Json => Profile::Json,
        }
    }
}

/// Report records added to or removed from a tabular export since the last run
#[derive(Parser, Debug)]
#[command(name = "tablewatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Export to check (CSV or Excel)
    input: PathBuf,

    /// SQLite database holding the current snapshot
    #[arg(short, long, default_value = "tablewatch.db")]
    database: PathBuf,

    /// Table that holds the snapshot
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// Column(s) identifying a project in the report (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    group_column: Vec<String>,

    /// Column(s) listed for each record in the report (comma-separated)
    #[arg(long, value_delimiter = ',')]
    detail_column: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// When to color terminal output
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorWhen,

    /// For Excel files: which sheet to read
    #[arg(long)]
    sheet: Option<String>,

    /// Rows above the header row to skip
    #[arg(long, default_value_t = 0)]
    skip_rows: usize,

    /// Report differences without saving the new snapshot
    #[arg(long)]
    dry_run: bool,

    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value = "human")]
    log_format: LogFormat,
}

fn main() -> ExitCode {
    match run() {
        Ok(has_changes) => {
            if has_changes {
                ExitCode::from(1) // Differences found
            } else {
                ExitCode::SUCCESS // No differences
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn or_defaults(columns: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if columns.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        columns
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorWhen::Always => true,
        ColorWhen::Never => false,
        ColorWhen::Auto => std::io::stdout().is_terminal(),
    };

    let mut config = Config::new(cli.input)
        .with_database(cli.database)
        .with_table_name(cli.table)
        .with_group_columns(or_defaults(cli.group_column, &DEFAULT_GROUP_COLUMNS))
        .with_detail_columns(or_defaults(cli.detail_column, &DEFAULT_DETAIL_COLUMNS))
        .with_output_format(cli.format.into())
        .with_color(color)
        .with_skip_rows(cli.skip_rows)
        .with_dry_run(cli.dry_run)
        .with_log_profile(cli.log_format.into());
    if let Some(sheet) = cli.sheet {
        config = config.with_sheet_name(sheet);
    }

    logging::init(config.log_profile);

    // Ingest
    let table = ParserFactory::new()
        .parse(&config.input_file, &config)
        .with_context(|| format!("Failed to parse input file: {}", config.input_file.display()))?;

    let formatter = ReportFormatter::new(config.group_columns.clone(), config.detail_columns.clone());

    let mut store = SqliteStore::open_with_table(&config.database, &config.table_name)
        .with_context(|| format!("Failed to open database: {}", config.database.display()))?;

    let outcome = run_check(
        &mut store,
        &table,
        &formatter,
        CheckOptions {
            dry_run: config.dry_run,
        },
    )?;
    store.close()?;

    // Render output
    let renderer = RendererFactory::create(config.output_format, config.color);
    let mut stdout = std::io::stdout().lock();
    renderer.render(&outcome.sections, &mut stdout)?;

    Ok(outcome.has_changes())
}
