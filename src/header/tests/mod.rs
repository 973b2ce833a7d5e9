//! Test utilities for header location and resolution
//!
//! Grid fixtures mimic the layouts found in the PN/GN releases: a preamble,
//! an optional stack of department/perimeter rows and the code/label row.

use crate::models::RawGrid;


/// Helper to build a grid from string slices
pub fn grid(rows: &[&[&str]]) -> RawGrid {
    RawGrid::from_rows(rows.iter().map(|row| row.iter().copied()))
}

/// Three-level sheet: department, perimeter, category over two value columns
pub fn create_three_level_grid() -> RawGrid {
    grid(&[
        &["Crimes et délits enregistrés", "", "", ""],
        &["", "", "", ""],
        &["Département", "", "01", "01"],
        &["Périmètre", "", "Métropole", "Métropole"],
        &["Code", "Libellé", "CSP1", "CSP2"],
        &["100", "Vol", "12", "7"],
        &["101", "Recel", "1 234", ""],
    ])
}

/// Single-level sheet whose value keys embed the department code
pub fn create_single_level_grid() -> RawGrid {
    grid(&[
        &["Index", "Libellé index", "Paris 75", "Corse 2A", "Ain 01"],
        &["1", "Règlements de compte", "3", "1", "0"],
        &["2", "Homicides", "25", "-", "2"],
    ])
}
