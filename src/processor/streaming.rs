//! Concurrent file processing
//!
//! Files are independent, so each one runs on the blocking pool while a
//! bounded number are in flight. Results are collected in input order, which
//! keeps the output deterministic for a given input list.

use super::ProcessingStats;
use super::pipeline::{FileOutput, process_file};
use crate::error::{CrimesError, Result};
use crate::models::LongRecord;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio::task;
use tracing::{debug, warn};

/// Fan-out over input files with controlled parallelism
#[derive(Debug, Clone)]
pub struct StreamingProcessor {
    workers: usize,
    show_progress: bool,
}

impl StreamingProcessor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message("Processing files");
        pb
    }

    /// Process files concurrently; a failing file is logged and counted, never fatal
    pub async fn process_files(&self, files: &[PathBuf]) -> (Vec<LongRecord>, ProcessingStats) {
        let pb = self.progress_bar(files.len());
        let concurrent_limit = self.workers.min(files.len()).max(1);
        debug!(
            "Processing {} files with {} workers",
            files.len(),
            concurrent_limit
        );

        let results: Vec<(PathBuf, Result<FileOutput>)> = stream::iter(files.iter().cloned())
            .map(|path| {
                let pb = pb.clone();
                async move {
                    if let Some(file_name) = path.file_name() {
                        pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
                    }
                    let task_path = path.clone();
                    let result = task::spawn_blocking(move || process_file(&task_path))
                        .await
                        .map_err(|e| {
                            CrimesError::processing_interrupted(format!(
                                "worker for {} stopped: {}",
                                path.display(),
                                e
                            ))
                        })
                        .and_then(|result| result);
                    pb.inc(1);
                    (path, result)
                }
            })
            .buffered(concurrent_limit)
            .collect()
            .await;

        pb.finish_with_message("All files processed");

        let mut records = Vec::new();
        let mut stats = ProcessingStats::default();
        for (path, result) in results {
            match result {
                Ok(output) => {
                    debug!(
                        "Processed {}: {} records",
                        path.display(),
                        output.records.len()
                    );
                    stats.files_processed += 1;
                    stats.sheets_processed += output.sheets_processed;
                    stats.sheets_skipped += output.sheets_skipped;
                    stats.sheets_failed += output.sheets_failed;
                    stats.values_recovered += output.values_recovered;
                    records.extend(output.records);
                }
                Err(e) => {
                    warn!("Failed to process {}: {:#}", path.display(), e);
                    stats.files_failed += 1;
                }
            }
        }
        stats.records_emitted = records.len();

        (records, stats)
    }
}
