//! Integration tests for the processor module
//!
//! Fixtures are real files in a temporary directory: delimited text written
//! directly, workbooks written with rust_xlsxwriter. Numeric-looking cells are
//! stored as numbers so the workbook reader's cell rendering is exercised.

use crate::config::Config;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};

pub mod basic_processing;
pub mod multi_sheet;

pub type Rows = Vec<Vec<&'static str>>;

/// Write a workbook with the given sheets, in order
pub fn write_workbook(path: &Path, sheets: &[(&str, Rows)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet().set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(n) => {
                        sheet.write_number(r as u32, c as u16, n).unwrap();
                    }
                    Err(_) => {
                        sheet.write_string(r as u32, c as u16, *cell).unwrap();
                    }
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

/// Three header levels: department, perimeter, category
pub fn pn_three_level_rows() -> Rows {
    vec![
        vec!["Crimes et délits enregistrés par les services de police"],
        vec![],
        vec!["Département", "", "01", "01"],
        vec!["Périmètre", "", "Métropole", "Métropole"],
        vec!["Code", "Libellé", "CSP1", "CSP2"],
        vec!["100", "Vol", "12", "7"],
    ]
}

/// Two header levels with a duplicated category label
pub fn gn_two_level_rows() -> Rows {
    vec![
        vec!["Département", "", "2A - Corse-du-Sud", "75 - Paris"],
        vec!["Code", "Libellé", "Total", "Total"],
        vec!["100", "Vol", "1 234", "-"],
        vec!["101", "Recel", "3", "n/a"],
    ]
}

pub fn notice_rows() -> Rows {
    vec![vec!["Lisez-moi"], vec!["Source : ministère de l'Intérieur"]]
}

/// Workbook with a notice sheet and one PN and one GN service sheet for 2015
pub fn write_release_workbook(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    write_workbook(
        &path,
        &[
            ("Notice", notice_rows()),
            ("Services PN 2015", pn_three_level_rows()),
            ("Services GN 2015", gn_two_level_rows()),
        ],
    );
    path
}

pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Configuration with fixed workers and no preview
pub fn test_config(inputs: Vec<PathBuf>, output: PathBuf) -> Config {
    Config::default()
        .with_inputs(inputs)
        .with_output_path(output)
        .with_workers(2)
        .with_preview_rows(0)
}
