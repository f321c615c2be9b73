//! Dash CLI - replay a seasonal dataset through the dashboard engine
//!
//! Commands:
//! - summarize: Load a dataset, apply a season selection, print the view model
//! - validate: Check a dataset and report every invalid record
//! - palette: Print the season legend colors

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use seasonal_dash::{
    DashboardController, DashboardError, RawPoint, SelectionState, SeriesStore, DASH_VERSION,
};
use tracing::{info, Level};

/// Dash - seasonal series selection and aggregation engine
#[derive(Parser)]
#[command(name = "dash")]
#[command(version = DASH_VERSION)]
#[command(about = "Filter and aggregate seasonal datasets", long_about = None)]
struct Cli {
    /// Log verbosity (written to stderr)
    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a dataset and print the resulting view model
    Summarize {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Comma-separated active seasons (default: all)
        #[arg(long, value_delimiter = ',')]
        seasons: Option<Vec<String>>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Validate a dataset
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the season legend colors
    Palette {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_writer(io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), DashCliError> {
    match command {
        Commands::Summarize {
            input,
            seasons,
            format,
        } => cmd_summarize(&input, seasons.as_deref(), format),
        Commands::Validate { input, json } => cmd_validate(&input, json),
        Commands::Palette { json } => cmd_palette(json),
    }
}

fn read_input(input: &Path) -> Result<String, DashCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("Reading dataset from stdin (end with Ctrl-D)...");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn cmd_summarize(
    input: &Path,
    seasons: Option<&[String]>,
    format: OutputFormat,
) -> Result<(), DashCliError> {
    let json = read_input(input)?;

    let mut controller = DashboardController::new();
    if let Some(names) = seasons {
        controller.set_selection(SelectionState::from_names(names)?);
    }
    controller.load_json(&json)?;

    let view = controller.current_view().ok_or(DashCliError::NoView)?;
    info!(
        revision = view.revision,
        points = view.filtered_series.len(),
        "view model ready"
    );

    let output = match format {
        OutputFormat::Json => view.to_json()?,
        OutputFormat::JsonPretty => view.to_json_pretty()?,
    };
    println!("{}", output);

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), DashCliError> {
    let records = RawPoint::parse_array(&read_input(input)?)?;

    let (valid_points, errors) = match SeriesStore::load_records(&records) {
        Ok(store) => (store.len(), Vec::new()),
        Err(e) => {
            let errors: Vec<String> = if e.causes().is_empty() {
                vec![e.to_string()]
            } else {
                e.causes().iter().map(|c| c.to_string()).collect()
            };
            (0, errors)
        }
    };

    let report = ValidationReport {
        total_records: records.len(),
        valid_points,
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records: {}", report.total_records);
        println!("Loaded points: {}", report.valid_points);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {}", err);
            }
        }
    }

    if report.errors.is_empty() {
        Ok(())
    } else {
        Err(DashCliError::ValidationFailed(report.errors.len()))
    }
}

fn cmd_palette(json: bool) -> Result<(), DashCliError> {
    let legend = seasonal_dash::view::legend(&SelectionState::all());

    if json {
        println!("{}", serde_json::to_string_pretty(&legend)?);
    } else {
        for entry in &legend {
            println!("{:<8} {}", entry.label, entry.color);
        }
    }

    Ok(())
}

// Error types

#[derive(Debug)]
enum DashCliError {
    Io(io::Error),
    Dashboard(DashboardError),
    Json(serde_json::Error),
    NoView,
    ValidationFailed(usize),
}

impl From<io::Error> for DashCliError {
    fn from(e: io::Error) -> Self {
        DashCliError::Io(e)
    }
}

impl From<DashboardError> for DashCliError {
    fn from(e: DashboardError) -> Self {
        DashCliError::Dashboard(e)
    }
}

impl From<serde_json::Error> for DashCliError {
    fn from(e: serde_json::Error) -> Self {
        DashCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<DashCliError> for CliError {
    fn from(e: DashCliError) -> Self {
        match e {
            DashCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            DashCliError::Dashboard(e) if e.is_empty_dataset() => CliError {
                code: "EMPTY_DATASET".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the input array contains at least one record".to_string()),
            },
            DashCliError::Dashboard(DashboardError::UnknownSeasonTag(name)) => CliError {
                code: "UNKNOWN_SEASON".to_string(),
                message: format!("Unknown season: {}", name),
                hint: Some("Use spring, summer, autumn or winter".to_string()),
            },
            DashCliError::Dashboard(e) => CliError {
                code: "LOAD_FAILED".to_string(),
                message: e.to_string(),
                hint: Some("Run 'dash validate' for details".to_string()),
            },
            DashCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            DashCliError::NoView => CliError {
                code: "NO_VIEW".to_string(),
                message: "No view model was published".to_string(),
                hint: None,
            },
            DashCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_points: usize,
    errors: Vec<String>,
}
