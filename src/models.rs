//! Core data structures for crime-statistics reshaping.
//!
//! Defines the raw cell grid, header and column descriptions, the source
//! descriptor carried through a sheet, and the canonical long-form record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Raw 2-D grid of cell texts for one file or sheet, no column typing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a grid from anything string-like, mostly for fixtures
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of the longest row; ragged rows read as empty past their end
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell text, empty when out of range
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Number of cells in a row that are not blank after trimming
    pub fn non_empty_cells(&self, row: usize) -> usize {
        self.rows
            .get(row)
            .map(|r| r.iter().filter(|cell| !cell.trim().is_empty()).count())
            .unwrap_or(0)
    }
}

/// Reporting service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    /// Police Nationale
    #[serde(rename = "PN")]
    Pn,
    /// Gendarmerie Nationale
    #[serde(rename = "GN")]
    Gn,
}

impl Service {
    pub fn code(&self) -> &'static str {
        match self {
            Service::Pn => "PN",
            Service::Gn => "GN",
        }
    }

    /// Parse an exact (case-insensitive) service code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "PN" => Some(Service::Pn),
            "GN" => Some(Service::Gn),
            _ => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Location and depth of the stacked header rows of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSpec {
    /// Row holding the bottom header level (0-based)
    pub header_row_index: usize,
    /// Number of stacked header rows, 1 to 3
    pub level_count: usize,
}

impl HeaderSpec {
    pub fn new(header_row_index: usize, level_count: usize) -> Self {
        let max_levels = header_row_index + 1;
        Self {
            header_row_index,
            level_count: level_count.clamp(1, 3).min(max_levels),
        }
    }

    /// First row of the stacked header block
    pub fn first_label_row(&self) -> usize {
        self.header_row_index + 1 - self.level_count
    }

    /// First data row below the header block
    pub fn first_data_row(&self) -> usize {
        self.header_row_index + 1
    }

    pub fn is_multi_level(&self) -> bool {
        self.level_count > 1
    }
}

/// One flattened data column with its side-channel metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// Unique flattened key within the sheet
    pub key: String,
    /// Department code from the top header level (verbatim label when no code)
    pub department_code: Option<String>,
    /// Scope qualifier from the middle header level
    pub perimeter: Option<String>,
}

impl ResolvedColumn {
    /// Column without side metadata (single-level header)
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            department_code: None,
            perimeter: None,
        }
    }

    pub fn has_side_metadata(&self) -> bool {
        self.department_code.is_some() || self.perimeter.is_some()
    }
}

/// Where a sheet came from and what its name says about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub path: PathBuf,
    pub sheet_name: Option<String>,
    pub year: Option<i32>,
    pub service: Option<Service>,
}

impl SourceDescriptor {
    /// Human-readable location for log messages
    pub fn label(&self) -> String {
        match &self.sheet_name {
            Some(sheet) => format!("{} [{}]", self.path.display(), sheet),
            None => self.path.display().to_string(),
        }
    }
}

/// Canonical long-form record
///
/// Fields are only readable once assembled; the field order of the output
/// schema is `annee, service, departement, perimetre, CSP, code_index,
/// libelle_index, nombre_faits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRecord {
    annee: Option<i32>,
    service: String,
    departement: String,
    perimetre: String,
    #[serde(rename = "CSP")]
    csp: String,
    code_index: String,
    libelle_index: String,
    nombre_faits: u64,
}

impl LongRecord {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        annee: Option<i32>,
        service: String,
        departement: String,
        perimetre: String,
        csp: String,
        code_index: String,
        libelle_index: String,
        nombre_faits: u64,
    ) -> Self {
        Self {
            annee,
            service,
            departement,
            perimetre,
            csp,
            code_index,
            libelle_index,
            nombre_faits,
        }
    }

    pub fn annee(&self) -> Option<i32> {
        self.annee
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn departement(&self) -> &str {
        &self.departement
    }

    pub fn perimetre(&self) -> &str {
        &self.perimetre
    }

    pub fn csp(&self) -> &str {
        &self.csp
    }

    pub fn code_index(&self) -> &str {
        &self.code_index
    }

    pub fn libelle_index(&self) -> &str {
        &self.libelle_index
    }

    pub fn nombre_faits(&self) -> u64 {
        self.nombre_faits
    }

    /// Field values in output column order, for previews
    pub fn to_fields(&self) -> [String; 8] {
        [
            self.annee.map(|y| y.to_string()).unwrap_or_default(),
            self.service.clone(),
            self.departement.clone(),
            self.perimetre.clone(),
            self.csp.clone(),
            self.code_index.clone(),
            self.libelle_index.clone(),
            self.nombre_faits.to_string(),
        ]
    }
}
