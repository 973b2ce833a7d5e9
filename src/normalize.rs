//! Locale-aware numeric normalization
//!
//! Every cell value entering a [`LongRecord`](crate::models::LongRecord) goes
//! through [`normalize`]. The function is total: whatever the input, it
//! returns a non-negative integer. French-style separators are understood
//! (`1 234`, `1.234,56`, `3,0`); anything unusable becomes 0.
//!
//! Rounding is half-to-even (`2.5` → 2, `3.5` → 4), negative values clamp to 0
//! and values beyond `u64::MAX` saturate.

use crate::constants::{DEGENERATE_NUMBERS, EMPTY_VALUE_MARKERS};

/// How a value was turned into a count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalized {
    /// Parsed from numeric text
    Parsed(u64),
    /// Blank or an explicit missing marker
    Empty,
    /// Text present but unusable, recovered to 0
    Recovered,
}

impl Normalized {
    pub fn value(self) -> u64 {
        match self {
            Normalized::Parsed(v) => v,
            Normalized::Empty | Normalized::Recovered => 0,
        }
    }

    pub fn is_recovered(self) -> bool {
        matches!(self, Normalized::Recovered)
    }
}

/// Convert heterogeneous numeric text into a non-negative integer
pub fn normalize(raw: &str) -> u64 {
    normalize_detailed(raw).value()
}

/// Same as [`normalize`], reporting whether the value needed recovery
pub fn normalize_detailed(raw: &str) -> Normalized {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();
    if EMPTY_VALUE_MARKERS.contains(&lowered.as_str()) {
        return Normalized::Empty;
    }

    // char::is_whitespace covers NBSP and the narrow NBSP used as a French thousands separator
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

    let unified = match (compact.contains('.'), compact.contains(',')) {
        (true, true) => compact.replace('.', "").replace(',', "."),
        (false, true) => compact.replace(',', "."),
        _ => compact,
    };

    let numeric: String = unified
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if DEGENERATE_NUMBERS.contains(&numeric.as_str()) {
        return Normalized::Recovered;
    }

    match numeric.parse::<f64>() {
        Ok(value) if value.is_finite() => Normalized::Parsed(to_count(value)),
        _ => Normalized::Recovered,
    }
}

fn to_count(value: f64) -> u64 {
    let rounded = value.round_ties_even();
    if rounded <= 0.0 {
        0
    } else {
        // `as` saturates at u64::MAX
        rounded as u64
    }
}
