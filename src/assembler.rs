//! Record assembly
//!
//! Joins melted rows with what the file or sheet name says about them and
//! produces the canonical [`LongRecord`] stream.

use crate::header::resolver::DEPARTMENT_RE;
use crate::models::{LongRecord, SourceDescriptor};
use crate::normalize::normalize_detailed;
use crate::reshape::LongRow;

/// Records produced from one sheet
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub records: Vec<LongRecord>,
    /// Values present but unparseable, recorded as 0
    pub recovered_values: usize,
}

/// Normalize a department label to its code
///
/// Numeric codes are zero-padded to two digits (`1` → `01`, overseas `971`
/// unchanged), Corsican codes keep their letter. A label without a code
/// becomes empty.
pub fn normalize_department(label: &str) -> String {
    let Some(found) = DEPARTMENT_RE.find(label.trim()) else {
        return String::new();
    };
    let code = found.as_str();
    if code.chars().all(|c| c.is_ascii_digit()) {
        format!("{code:0>2}")
    } else {
        code.to_string()
    }
}

/// Build records in output schema order from melted rows
pub fn assemble(rows: Vec<LongRow>, source: &SourceDescriptor) -> Assembly {
    let service = source
        .service
        .map(|s| s.code().to_string())
        .unwrap_or_default();

    let mut recovered_values = 0;
    let records = rows
        .into_iter()
        .map(|row| {
            let value = normalize_detailed(&row.raw_value);
            if value.is_recovered() {
                recovered_values += 1;
            }
            LongRecord::new(
                source.year,
                service.clone(),
                normalize_department(&row.departement),
                row.perimetre,
                row.csp,
                row.code_index,
                row.libelle_index,
                value.value(),
            )
        })
        .collect();

    Assembly {
        records,
        recovered_values,
    }
}
