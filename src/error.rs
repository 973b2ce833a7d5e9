//! Error handling for crime-statistics reshaping operations.
//!
//! Only I/O-shape failures are raised, and only at file or sheet granularity.
//! Header location, depth inference, metadata extraction and numeric
//! normalization all have total fallbacks and never produce an error.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrimesError {
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// No encoding/separator/engine combination produced a table with enough columns
    #[error("Unreadable source {path}: {reason}")]
    UnreadableSource { path: PathBuf, reason: String },

    /// Sheet is not a service sheet, or resolves to too few columns after cleanup
    #[error("Unmappable sheet '{sheet}' in {path}: {reason}")]
    UnmappableSheet {
        path: PathBuf,
        sheet: String,
        reason: String,
    },

    /// A file yielded zero usable sheets
    #[error("No data produced from {path}")]
    NoDataProduced { path: PathBuf },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Output error for {path}: {reason}")]
    Output { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl CrimesError {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    pub fn unreadable_source(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnreadableSource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn unmappable_sheet(
        path: impl Into<PathBuf>,
        sheet: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnmappableSheet {
            path: path.into(),
            sheet: sheet.into(),
            reason: reason.into(),
        }
    }

    pub fn no_data_produced(path: impl Into<PathBuf>) -> Self {
        Self::NoDataProduced { path: path.into() }
    }

    pub fn output(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Output {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Expected skips (non-data sheets) that should not be reported as failures
    pub fn is_silent_skip(&self) -> bool {
        matches!(self, Self::UnmappableSheet { .. })
    }
}

impl From<std::io::Error> for CrimesError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<toml::de::Error> for CrimesError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid configuration file: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrimesError>;
