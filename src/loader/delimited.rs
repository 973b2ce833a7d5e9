//! Delimited text reading
//!
//! Exports of the crime tables come in several encodings and with whatever
//! separator the exporting tool picked. Every encoding is tried in turn and,
//! within it, every separator; the first parse wide enough to hold a code
//! column, a label column and one value column wins.

use encoding_rs::WINDOWS_1252;
use std::path::Path;
use tracing::{debug, trace};

use crate::constants::{
    DELIMITED_ENCODINGS, DELIMITED_SEPARATORS, MIN_TABLE_COLUMNS, SNIFF_SAMPLE_LINES,
    SNIFF_SEPARATORS, UTF8_BOM,
};
use crate::error::{CrimesError, Result};
use crate::models::RawGrid;

/// Decode raw bytes with one of the supported encodings
///
/// UTF-8 is strict and drops a leading byte order mark; latin-1 cannot fail.
pub fn decode(bytes: &[u8], encoding: &str) -> std::result::Result<String, String> {
    match encoding {
        "utf-8" => {
            let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| format!("not valid utf-8: {e}"))
        }
        "cp1252" => {
            let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
            if had_errors {
                Err("not valid cp1252".to_string())
            } else {
                Ok(text.into_owned())
            }
        }
        "latin-1" => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        other => Err(format!("unsupported encoding '{other}'")),
    }
}

/// Split decoded text into rows with the given separator
pub fn parse_rows(text: &str, separator: u8) -> std::result::Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect()
}

/// Pick the separator giving the most consistent field count over the first lines
///
/// Returns `None` when no candidate splits the first line at all.
pub fn sniff_separator(text: &str) -> Option<u8> {
    let sample: Vec<&str> = text.lines().take(SNIFF_SAMPLE_LINES).collect();
    let mut best = None;
    let mut best_score = 0usize;

    for &separator in SNIFF_SEPARATORS {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(separator)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let Some(&target) = counts.first() else {
            return None;
        };
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count();
        let score = consistent * target;
        if score > best_score {
            best_score = score;
            best = Some(separator);
        }
    }

    best
}

fn separator_name(separator: u8) -> String {
    match separator {
        b'\t' => "tab".to_string(),
        other => format!("'{}'", char::from(other)),
    }
}

/// Load a delimited file into a grid with at least [`MIN_TABLE_COLUMNS`] columns
pub fn load(path: &Path) -> Result<RawGrid> {
    let bytes =
        std::fs::read(path).map_err(|e| CrimesError::unreadable_source(path, e.to_string()))?;
    load_bytes(path, &bytes)
}

pub(crate) fn load_bytes(path: &Path, bytes: &[u8]) -> Result<RawGrid> {
    let mut last_error = String::from("file is empty");

    for &encoding in DELIMITED_ENCODINGS {
        let text = match decode(bytes, encoding) {
            Ok(text) => text,
            Err(reason) => {
                trace!("{}: {}", path.display(), reason);
                last_error = reason;
                continue;
            }
        };

        for &separator in DELIMITED_SEPARATORS {
            match parse_rows(&text, separator) {
                Ok(rows) => {
                    let grid = RawGrid::new(rows);
                    if grid.width() >= MIN_TABLE_COLUMNS {
                        debug!(
                            "Read {} as {} with {} separator ({} rows)",
                            path.display(),
                            encoding,
                            separator_name(separator),
                            grid.row_count()
                        );
                        return Ok(grid);
                    }
                    last_error = format!(
                        "{} column(s) with {} and {} separator",
                        grid.width(),
                        encoding,
                        separator_name(separator)
                    );
                }
                Err(e) => last_error = e.to_string(),
            }
        }
    }

    // Last resort: let the sample decide the separator
    let text = decode(bytes, "utf-8").or_else(|_| decode(bytes, "latin-1"));
    if let Ok(text) = text {
        if let Some(separator) = sniff_separator(&text) {
            match parse_rows(&text, separator) {
                Ok(rows) => {
                    let grid = RawGrid::new(rows);
                    if grid.width() >= MIN_TABLE_COLUMNS {
                        debug!(
                            "Read {} with detected {} separator",
                            path.display(),
                            separator_name(separator)
                        );
                        return Ok(grid);
                    }
                }
                Err(e) => last_error = e.to_string(),
            }
        }
    }

    Err(CrimesError::unreadable_source(path, last_error))
}
