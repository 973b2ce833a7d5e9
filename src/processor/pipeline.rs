//! Per-file and per-sheet processing
//!
//! One sheet goes through header location, stacked-header resolution,
//! melting and record assembly. A workbook runs that for every service sheet
//! it holds; failures stay with the sheet that caused them.

use crate::assembler::{Assembly, assemble};
use crate::error::{CrimesError, Result};
use crate::header::{locate_header_row, resolve_sheet};
use crate::loader::{SourceKind, delimited, list_sheets, workbook};
use crate::metadata::{self, SourceMetadata, is_service_sheet};
use crate::models::{LongRecord, RawGrid, Service, SourceDescriptor};
use crate::reshape::melt;
use std::path::Path;
use tracing::{debug, warn};

/// Records and counters produced by one file
#[derive(Debug, Clone, Default)]
pub struct FileOutput {
    pub records: Vec<LongRecord>,
    pub sheets_processed: usize,
    pub sheets_skipped: usize,
    pub sheets_failed: usize,
    pub values_recovered: usize,
}

impl FileOutput {
    fn absorb(&mut self, assembly: Assembly) {
        self.sheets_processed += 1;
        self.values_recovered += assembly.recovered_values;
        self.records.extend(assembly.records);
    }
}

fn descriptor(path: &Path, sheet_name: Option<&str>, meta: SourceMetadata) -> SourceDescriptor {
    SourceDescriptor {
        path: path.to_path_buf(),
        sheet_name: sheet_name.map(str::to_string),
        year: meta.year,
        service: meta.service,
    }
}

/// Turn one loaded grid into records
pub fn process_sheet(grid: &RawGrid, source: &SourceDescriptor) -> Result<Assembly> {
    let header_row = locate_header_row(grid);
    let sheet = resolve_sheet(grid, header_row).map_err(|e| {
        CrimesError::unmappable_sheet(
            &source.path,
            source.sheet_name.clone().unwrap_or_default(),
            e.to_string(),
        )
    })?;

    let assembly = assemble(melt(&sheet), source);
    debug!(
        "{}: {} records from {} rows x {} columns",
        source.label(),
        assembly.records.len(),
        sheet.data_row_count(),
        sheet.value_column_count()
    );
    Ok(assembly)
}

/// Process every service sheet of a workbook, or the single table of a delimited file
///
/// Fails with `NoDataProduced` when no sheet could be processed.
pub fn process_file(path: &Path) -> Result<FileOutput> {
    let file_meta = metadata::extract_from_path(path);
    let mut output = FileOutput::default();

    match SourceKind::of(path) {
        SourceKind::Workbook => {
            for sheet_name in list_sheets(path)? {
                if !is_service_sheet(&sheet_name) {
                    debug!("Skipping non-service sheet '{}'", sheet_name);
                    output.sheets_skipped += 1;
                    continue;
                }

                let meta = metadata::extract(&sheet_name).or(file_meta);
                let source = descriptor(path, Some(&sheet_name), meta);
                let result = workbook::read_sheet(path, &sheet_name)
                    .and_then(|grid| process_sheet(&grid, &source));

                match result {
                    Ok(assembly) => output.absorb(assembly),
                    Err(e) if e.is_silent_skip() => {
                        debug!("Skipping sheet: {}", e);
                        output.sheets_skipped += 1;
                    }
                    Err(e) => {
                        warn!("Failed to process {}: {}", source.label(), e);
                        output.sheets_failed += 1;
                    }
                }
            }
        }
        SourceKind::Delimited => {
            if !file_meta.is_complete() {
                warn!(
                    "Could not extract year/service from {} (year={:?}, service={:?})",
                    path.display(),
                    file_meta.year,
                    file_meta.service.map(|s| s.code())
                );
            }
            let grid = delimited::load(path)?;
            let assembly = process_sheet(&grid, &descriptor(path, None, file_meta))?;
            output.absorb(assembly);
        }
    }

    if output.sheets_processed == 0 {
        return Err(CrimesError::no_data_produced(path));
    }
    Ok(output)
}

/// What processing would make of one sheet, without assembling records
#[derive(Debug, Clone)]
pub struct SheetReport {
    pub sheet_name: Option<String>,
    pub year: Option<i32>,
    pub service: Option<Service>,
    pub outcome: SheetOutcome,
}

#[derive(Debug, Clone)]
pub enum SheetOutcome {
    Kept {
        header_row: usize,
        level_count: usize,
        data_rows: usize,
        value_columns: Vec<String>,
    },
    Skipped {
        reason: String,
    },
}

fn inspect_grid(grid: &RawGrid) -> SheetOutcome {
    let header_row = locate_header_row(grid);
    match resolve_sheet(grid, header_row) {
        Ok(sheet) => SheetOutcome::Kept {
            header_row: sheet.spec.header_row_index,
            level_count: sheet.spec.level_count,
            data_rows: sheet.data_row_count(),
            value_columns: sheet.columns.into_iter().map(|c| c.key).collect(),
        },
        Err(e) => SheetOutcome::Skipped {
            reason: e.to_string(),
        },
    }
}

/// Describe how each sheet of a file would be handled
pub fn inspect_file(path: &Path) -> Result<Vec<SheetReport>> {
    let file_meta = metadata::extract_from_path(path);

    match SourceKind::of(path) {
        SourceKind::Workbook => {
            let mut reports = Vec::new();
            for sheet_name in list_sheets(path)? {
                let meta = metadata::extract(&sheet_name).or(file_meta);
                let outcome = if !is_service_sheet(&sheet_name) {
                    SheetOutcome::Skipped {
                        reason: "not a service sheet".to_string(),
                    }
                } else {
                    match workbook::read_sheet(path, &sheet_name) {
                        Ok(grid) => inspect_grid(&grid),
                        Err(e) => SheetOutcome::Skipped {
                            reason: e.to_string(),
                        },
                    }
                };
                reports.push(SheetReport {
                    sheet_name: Some(sheet_name),
                    year: meta.year,
                    service: meta.service,
                    outcome,
                });
            }
            Ok(reports)
        }
        SourceKind::Delimited => {
            let grid = delimited::load(path)?;
            Ok(vec![SheetReport {
                sheet_name: None,
                year: file_meta.year,
                service: file_meta.service,
                outcome: inspect_grid(&grid),
            }])
        }
    }
}
