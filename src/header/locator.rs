//! Header row location
//!
//! The first scanned row matching a rule wins; rules are tried in order, so a
//! keyword row anywhere in the scan window beats an earlier wide row.

use crate::constants::{HEADER_KEYWORDS, MAX_HEADER_SCAN_ROWS, MIN_HEADER_CELLS};
use crate::models::RawGrid;

/// A named predicate over one grid row
pub struct HeaderRule {
    pub name: &'static str,
    pub matches: fn(&[String]) -> bool,
}

/// Header rules in precedence order
pub const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        name: "keyword",
        matches: has_header_keyword,
    },
    HeaderRule {
        name: "wide row",
        matches: is_wide_row,
    },
];

fn has_header_keyword(row: &[String]) -> bool {
    row.iter().any(|cell| {
        let cell = cell.trim().to_lowercase();
        HEADER_KEYWORDS.iter().any(|keyword| cell.contains(keyword))
    })
}

fn is_wide_row(row: &[String]) -> bool {
    row.iter().filter(|cell| !cell.trim().is_empty()).count() >= MIN_HEADER_CELLS
}

/// 0-based index of the row where column headers begin, row 0 if nothing matches
pub fn locate_header_row(grid: &RawGrid) -> usize {
    let scan = grid.row_count().min(MAX_HEADER_SCAN_ROWS);
    let rows = &grid.rows()[..scan];

    HEADER_RULES
        .iter()
        .find_map(|rule| rows.iter().position(|row| (rule.matches)(row)))
        .unwrap_or(0)
}
