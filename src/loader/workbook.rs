//! Workbook reading through calamine
//!
//! Each file is opened with the reader matching its extension first and with
//! calamine's auto-detecting reader second. Cells are rendered to text so the
//! rest of the pipeline sees the same thing a delimited export would hold.

use calamine::{Data, Ods, Range, Reader, Sheets, Xls, Xlsb, Xlsx, open_workbook, open_workbook_auto};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, trace};

use crate::constants::{MIN_TABLE_COLUMNS, WORKBOOK_EXTENSIONS};
use crate::error::{CrimesError, Result};
use crate::models::RawGrid;

type Workbook = Sheets<BufReader<File>>;

/// Workbook reading engines, tried in preference order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Xlsx,
    Xls,
    Xlsb,
    Ods,
    Auto,
}

impl Engine {
    pub fn name(&self) -> &'static str {
        match self {
            Engine::Xlsx => "xlsx",
            Engine::Xls => "xls",
            Engine::Xlsb => "xlsb",
            Engine::Ods => "ods",
            Engine::Auto => "auto",
        }
    }

    fn open(self, path: &Path) -> std::result::Result<Workbook, String> {
        match self {
            Engine::Xlsx => open_workbook::<Xlsx<_>, _>(path)
                .map(Sheets::Xlsx)
                .map_err(|e| e.to_string()),
            Engine::Xls => open_workbook::<Xls<_>, _>(path)
                .map(Sheets::Xls)
                .map_err(|e| e.to_string()),
            Engine::Xlsb => open_workbook::<Xlsb<_>, _>(path)
                .map(Sheets::Xlsb)
                .map_err(|e| e.to_string()),
            Engine::Ods => open_workbook::<Ods<_>, _>(path)
                .map(Sheets::Ods)
                .map_err(|e| e.to_string()),
            Engine::Auto => open_workbook_auto(path).map_err(|e| e.to_string()),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether the file extension names a workbook format
pub fn is_workbook(path: &Path) -> bool {
    extension(path).is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.as_str()))
}

/// Engines to try for a path: the format-specific reader, then auto-detection
pub fn engines_for(path: &Path) -> Vec<Engine> {
    let native = match extension(path).as_deref() {
        Some("xlsx") | Some("xlsm") => Some(Engine::Xlsx),
        Some("xls") => Some(Engine::Xls),
        Some("xlsb") => Some(Engine::Xlsb),
        Some("ods") => Some(Engine::Ods),
        _ => None,
    };
    native.into_iter().chain(std::iter::once(Engine::Auto)).collect()
}

/// Sheet names in workbook order
pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    let mut last_error = String::from("no engine available");

    for engine in engines_for(path) {
        match engine.open(path) {
            Ok(workbook) => {
                let names = workbook.sheet_names().to_vec();
                trace!("{}: {} sheets via {}", path.display(), names.len(), engine.name());
                return Ok(names);
            }
            Err(reason) => {
                trace!("{}: {} engine failed: {}", path.display(), engine.name(), reason);
                last_error = reason;
            }
        }
    }

    Err(CrimesError::unreadable_source(path, last_error))
}

/// Load one sheet into a grid with at least [`MIN_TABLE_COLUMNS`] columns
pub fn load_sheet(path: &Path, sheet: &str) -> Result<RawGrid> {
    read_sheet_with_width(path, sheet, MIN_TABLE_COLUMNS)
}

/// Read one sheet whatever its width
///
/// Width is left to header resolution, which skips narrow sheets quietly.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<RawGrid> {
    read_sheet_with_width(path, sheet, 0)
}

fn read_sheet_with_width(path: &Path, sheet: &str, min_width: usize) -> Result<RawGrid> {
    let mut last_error = String::from("no engine available");

    for engine in engines_for(path) {
        let mut workbook = match engine.open(path) {
            Ok(workbook) => workbook,
            Err(reason) => {
                last_error = reason;
                continue;
            }
        };

        match workbook.worksheet_range(sheet) {
            Ok(range) => {
                let grid = range_to_grid(&range);
                if grid.width() >= min_width {
                    debug!(
                        "Read sheet '{}' of {} via {} engine ({} rows)",
                        sheet,
                        path.display(),
                        engine.name(),
                        grid.row_count()
                    );
                    return Ok(grid);
                }
                last_error = format!(
                    "sheet '{}' has {} column(s) via {} engine",
                    sheet,
                    grid.width(),
                    engine.name()
                );
            }
            Err(e) => last_error = format!("sheet '{sheet}': {e}"),
        }
    }

    Err(CrimesError::unreadable_source(path, last_error))
}

/// Convert a calamine range to a grid anchored at cell A1
pub fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![String::new(); col_offset];
        cells.extend(row.iter().map(render_cell));
        rows.push(cells);
    }

    RawGrid::new(rows)
}

/// Render a cell to the text a delimited export would hold
pub fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => render_float(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => render_float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

// Integers without decimals
fn render_float(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
