//! Source loading
//!
//! Turns a file, or one sheet of a workbook, into a [`RawGrid`] of cell texts.
//! Workbook formats go through calamine; everything else is read as delimited
//! text with encoding and separator fallback.

pub mod delimited;
pub mod workbook;

use std::path::Path;

use crate::error::Result;
use crate::models::RawGrid;

pub use workbook::{Engine, is_workbook, list_sheets};

/// How a source file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Multi-sheet workbook, read one sheet at a time
    Workbook,
    /// Single-table delimited text
    Delimited,
}

impl SourceKind {
    pub fn of(path: &Path) -> Self {
        if is_workbook(path) {
            SourceKind::Workbook
        } else {
            SourceKind::Delimited
        }
    }
}

/// Load a grid from a path, or from one of its sheets for workbook formats
pub fn load(path: &Path, sheet: Option<&str>) -> Result<RawGrid> {
    match (SourceKind::of(path), sheet) {
        (SourceKind::Workbook, Some(sheet)) => workbook::load_sheet(path, sheet),
        (SourceKind::Workbook, None) => {
            let sheets = list_sheets(path)?;
            let first = sheets.first().map(String::as_str).unwrap_or_default();
            workbook::load_sheet(path, first)
        }
        (SourceKind::Delimited, _) => delimited::load(path),
    }
}
