//! Main processing engine.
//!
//! Orchestrates the complete workflow: input discovery, concurrent per-file
//! reshaping, record serialization and the run summary.

pub mod discovery;
pub mod pipeline;
pub mod streaming;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{discovery::FileDiscovery, streaming::StreamingProcessor, writer::RecordWriter};

use crate::config::Config;
use crate::error::Result;

use colored::*;
use std::path::PathBuf;
use std::time::Instant;

pub use pipeline::{FileOutput, SheetOutcome, SheetReport, inspect_file, process_file, process_sheet};
pub use writer::format_preview;

/// Counters for one processing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub sheets_processed: usize,
    pub sheets_skipped: usize,
    pub sheets_failed: usize,
    pub records_emitted: usize,
    /// Values present but unparseable, recorded as 0
    pub values_recovered: usize,
    pub output_path: Option<PathBuf>,
    pub processing_time_ms: u128,
}

/// Main processor for crime-statistics releases
#[derive(Debug)]
pub struct DatasetProcessor {
    config: Config,
    file_discovery: FileDiscovery,
    streaming_processor: StreamingProcessor,
    record_writer: RecordWriter,
    quiet: bool,
}

impl DatasetProcessor {
    /// Create a processor from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let file_discovery =
            FileDiscovery::new(&config.processing).excluding(&config.output.path);
        let streaming_processor = StreamingProcessor::new(config.processing.workers);
        let record_writer =
            RecordWriter::new(config.output.path.clone(), config.output.resolved_format())
                .with_compression(config.output.compression);

        Ok(Self {
            config,
            file_discovery,
            streaming_processor,
            record_writer,
            quiet: false,
        })
    }

    /// Suppress the progress bar, banner, summary and preview
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self.streaming_processor = self.streaming_processor.with_progress(!quiet);
        self
    }

    /// Main processing entry point
    ///
    /// Nothing is written when no record was produced.
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let output_path = self.record_writer.output_path();
        if !self.quiet {
            println!("{}", "Starting crime statistics processing".bright_green().bold());
            println!("  {} {}", "Output:".bright_cyan(), output_path.display());
        }

        let files = self.file_discovery.discover()?;
        if !self.quiet {
            println!(
                "  {} {} input files",
                "Found".bright_green(),
                files.len().to_string().bright_white().bold()
            );
        }

        let (records, mut stats) = self.streaming_processor.process_files(&files).await;

        if !records.is_empty() {
            self.record_writer.write(&records)?;
            stats.output_path = Some(output_path.to_path_buf());
        }
        stats.processing_time_ms = start_time.elapsed().as_millis();

        if !self.quiet {
            print_summary(&stats);
            if self.config.output.preview_rows > 0 && !records.is_empty() {
                println!("\n{}", "Preview".bright_green().bold());
                println!("{}", format_preview(&records, self.config.output.preview_rows));
            }
        }

        Ok(stats)
    }
}

/// Print the colored run summary
pub fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {} processed, {} skipped",
        "Sheets:".bright_cyan(),
        stats.sheets_processed.to_string().bright_white(),
        stats.sheets_skipped
    );
    if stats.sheets_failed > 0 {
        println!(
            "  {} {}",
            "Sheets failed:".bright_red(),
            stats.sheets_failed.to_string().bright_red().bold()
        );
    }
    if stats.values_recovered > 0 {
        println!(
            "  {} {}",
            "Values recovered to 0:".bright_yellow(),
            stats.values_recovered
        );
    }
    println!(
        "  {} {}",
        "Total records:".bright_cyan(),
        stats.records_emitted.to_string().bright_white().bold()
    );
    if let Some(path) = &stats.output_path {
        println!("  {} {}", "Written to:".bright_cyan(), path.display());
    }
}
