//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! environment variables, then command-line flags (applied by the binary
//! through the `with_*` builders).

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_INPUT_EXTENSIONS, DEFAULT_OUTPUT_FILE,
    DEFAULT_PREVIEW_ROWS, ENV_FORMAT, ENV_OUTPUT, ENV_WORKERS,
};
use crate::error::{CrimesError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Output serialization format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// UTF-8 CSV with a byte order mark
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    /// Infer the format from a file extension, CSV unless it names Parquet
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("parquet") | Some("pq") => OutputFormat::Parquet,
            _ => OutputFormat::Csv,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CrimesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" | "pq" => Ok(OutputFormat::Parquet),
            other => Err(CrimesError::configuration(format!(
                "unknown output format '{other}' (expected csv or parquet)"
            ))),
        }
    }
}

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    #[default]
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = CrimesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(CrimesError::configuration(format!(
                "unknown compression '{other}' (expected snappy, zstd, lz4 or none)"
            ))),
        }
    }
}

/// What to read and how hard to work at it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Files or directories to process
    pub inputs: Vec<PathBuf>,

    /// File extensions accepted during directory discovery
    pub extensions: Vec<String>,

    /// Number of files processed concurrently
    pub workers: usize,

    /// Only process files with exactly this name
    pub source_name: Option<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            extensions: DEFAULT_INPUT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            workers: num_cpus::get(),
            source_name: None,
        }
    }
}

/// Where and how records are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,

    /// Explicit format; inferred from the path extension when absent
    pub format: Option<OutputFormat>,

    /// Parquet compression, ignored for CSV
    pub compression: CompressionAlgorithm,

    /// Rows shown per service in the preview (0 disables it)
    pub preview_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            format: None,
            compression: CompressionAlgorithm::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl OutputConfig {
    pub fn resolved_format(&self) -> OutputFormat {
        self.format
            .unwrap_or_else(|| OutputFormat::from_path(&self.path))
    }
}

/// Global configuration for crime-statistics processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

impl Config {
    /// `<config_dir>/crimes-processor/config.toml`, when a config dir exists
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CrimesError::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then the config file, then the process environment
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path().filter(|path| path.is_file()) {
                Some(path) => {
                    debug!("Loading config from {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_OUTPUT).filter(|v| !v.trim().is_empty()) {
            self.output.path = PathBuf::from(path);
        }
        if let Some(workers) = lookup(ENV_WORKERS) {
            self.processing.workers = workers.trim().parse().map_err(|_| {
                CrimesError::configuration(format!("{ENV_WORKERS} must be a number, got '{workers}'"))
            })?;
        }
        if let Some(format) = lookup(ENV_FORMAT) {
            self.output.format = Some(format.parse()?);
        }
        Ok(())
    }

    /// Reject settings that cannot produce a run
    pub fn validate(&self) -> Result<()> {
        if self.processing.workers == 0 {
            return Err(CrimesError::configuration("workers must be at least 1"));
        }
        if self.processing.inputs.is_empty() {
            return Err(CrimesError::configuration("no input files or directories given"));
        }
        let output = absolute(&self.output.path);
        if self
            .processing
            .inputs
            .iter()
            .any(|input| absolute(input) == output)
        {
            return Err(CrimesError::configuration(format!(
                "output path {} is also an input",
                self.output.path.display()
            )));
        }
        Ok(())
    }

    pub fn with_inputs(mut self, inputs: Vec<PathBuf>) -> Self {
        self.processing.inputs = inputs;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.processing.workers = workers;
        self
    }

    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.processing.source_name = Some(source_name.into());
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.path = path.into();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output.format = Some(format);
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.output.preview_rows = rows;
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.output.compression = compression;
        self
    }
}

/// Absolute form of a path for comparisons; falls back to the path itself
pub(crate) fn absolute(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
