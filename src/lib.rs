//! Crimes Processor Library
//!
//! Reshapes French crime-statistics releases (Police Nationale and
//! Gendarmerie Nationale) from wide sheets with stacked headers into one
//! long-form record stream with a fixed eight-column schema.
//!
//! This library provides tools for:
//! - Loading workbooks and delimited text with encoding and separator fallbacks
//! - Locating the header row and inferring how many label levels sit above it
//! - Flattening stacked labels into column keys with department and perimeter side metadata
//! - Extracting year and service from sheet and file names
//! - Normalizing French-formatted counts into non-negative integers
//! - Writing the combined records as CSV or Parquet

pub mod assembler;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod loader;
pub mod metadata;
pub mod models;
pub mod normalize;
pub mod processor;
pub mod reshape;

pub use config::{CompressionAlgorithm, Config, OutputFormat};
pub use error::{CrimesError, Result};
pub use models::{LongRecord, RawGrid, Service, SourceDescriptor};
pub use normalize::normalize;
pub use processor::{DatasetProcessor, ProcessingStats, inspect_file, process_file};
