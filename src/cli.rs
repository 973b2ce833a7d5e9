//! Command-line interface components.

use crate::config::{CompressionAlgorithm, Config, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crimes-processor")]
#[command(about = "Reshape French crime-statistics releases (PN/GN) into long-form records")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Reshape every input file and write one combined output
    Process(ProcessArgs),
    /// Show how each sheet of a file would be handled, without writing anything
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ProcessArgs {
    /// Files or directories to process (directories are searched recursively)
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output file (CSV unless the extension or --format says parquet)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (csv, parquet)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, value_name = "ALGORITHM")]
    pub compression: Option<CompressionAlgorithm>,

    /// Number of files processed concurrently
    #[arg(short = 'j', long, value_name = "COUNT")]
    pub workers: Option<usize>,

    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only process files with exactly this name
    #[arg(long, value_name = "NAME")]
    pub source_name: Option<String>,

    /// Rows shown per service in the preview
    #[arg(long, value_name = "ROWS", conflicts_with = "no_preview")]
    pub preview: Option<usize>,

    /// Do not print a preview of the output
    #[arg(long)]
    pub no_preview: bool,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Workbook or delimited file to inspect
    #[arg(value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Map verbosity flags to a tracing level
pub fn get_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the level derived from the flags.
pub fn setup_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crimes_processor={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();
}

impl ProcessArgs {
    /// Layer the command-line flags over the file and environment configuration
    pub fn build_config(&self) -> crate::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if !self.inputs.is_empty() {
            config = config.with_inputs(self.inputs.clone());
        }
        if let Some(output) = &self.output {
            config = config.with_output_path(output);
        }
        if let Some(format) = self.format {
            config = config.with_format(format);
        }
        if let Some(compression) = self.compression {
            config = config.with_compression(compression);
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(name) = &self.source_name {
            config = config.with_source_name(name.clone());
        }
        if self.no_preview || self.quiet {
            config = config.with_preview_rows(0);
        } else if let Some(rows) = self.preview {
            config = config.with_preview_rows(rows);
        }

        Ok(config)
    }
}

/// Command execution
pub mod commands {
    use super::*;
    use crate::processor::{DatasetProcessor, SheetOutcome, SheetReport, inspect_file};
    use anyhow::{Context, Result};
    use colored::*;
    use tracing::{debug, info};

    pub async fn run(command: Commands) -> Result<()> {
        match command {
            Commands::Process(args) => run_process(args).await,
            Commands::Inspect(args) => run_inspect(args),
        }
    }

    async fn run_process(args: ProcessArgs) -> Result<()> {
        setup_logging(get_log_level(args.verbose, args.quiet));
        debug!("Command line arguments: {:?}", args);

        let config = args
            .build_config()
            .context("Failed to load configuration")?;
        info!(
            "Processing {} input(s) into {}",
            config.processing.inputs.len(),
            config.output.path.display()
        );

        let stats = DatasetProcessor::new(config)?
            .quiet(args.quiet)
            .process()
            .await?;

        if stats.records_emitted == 0 {
            anyhow::bail!(
                "No records produced ({} file(s) failed, {} sheet(s) failed)",
                stats.files_failed,
                stats.sheets_failed
            );
        }
        Ok(())
    }

    fn run_inspect(args: InspectArgs) -> Result<()> {
        setup_logging(get_log_level(args.verbose, false));

        for input in &args.inputs {
            let reports = inspect_file(input)
                .with_context(|| format!("Failed to inspect {}", input.display()))?;
            println!("{}", input.display().to_string().bright_green().bold());
            for report in &reports {
                println!("{}", format_report(report));
            }
            println!();
        }
        Ok(())
    }

    /// One line per sheet, plus the value columns of kept sheets
    pub fn format_report(report: &SheetReport) -> String {
        let name = report.sheet_name.as_deref().unwrap_or("(file)");
        let year = report
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        let service = report.service.map(|s| s.code()).unwrap_or("-");

        match &report.outcome {
            SheetOutcome::Kept {
                header_row,
                level_count,
                data_rows,
                value_columns,
            } => format!(
                "  {} {} [{} {}] header row {}, {} level(s), {} data row(s)\n    columns: {}",
                "kept".bright_cyan(),
                name.bright_white(),
                year,
                service,
                header_row,
                level_count,
                data_rows,
                value_columns.join(", ")
            ),
            SheetOutcome::Skipped { reason } => format!(
                "  {} {} [{} {}] {}",
                "skip".bright_yellow(),
                name,
                year,
                service,
                reason.bright_black()
            ),
        }
    }
}
