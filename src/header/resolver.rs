//! Stacked header resolution
//!
//! Depth inference looks at the two rows above the located header row. The
//! label block is then read column by column into a [`LabelStack`], upper
//! levels are forward-filled across merged cells, and every stack is
//! flattened into a unique key plus department/perimeter side metadata.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use crate::constants::{
    DEPARTMENT_PATTERN, KEY_SUFFIX_SEPARATOR, MIN_HEADER_CELLS, MIN_TABLE_COLUMNS, NULL_MARKERS,
};
use crate::models::{HeaderSpec, RawGrid, ResolvedColumn};

pub(crate) static DEPARTMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEPARTMENT_PATTERN).expect("valid department pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("only {found} columns left after cleanup")]
    TooFewColumns { found: usize },
}

/// Header labels of one column, top to bottom; absent levels are empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelStack {
    pub top: String,
    pub mid: String,
    pub bot: String,
}

impl LabelStack {
    /// Build from 1 to 3 levels; a 2-level stack has an empty middle
    pub fn from_levels(levels: &[String]) -> Self {
        match levels {
            [bot] => Self {
                bot: bot.clone(),
                ..Default::default()
            },
            [top, bot] => Self {
                top: top.clone(),
                mid: String::new(),
                bot: bot.clone(),
            },
            [top, mid, bot, ..] => Self {
                top: top.clone(),
                mid: mid.clone(),
                bot: bot.clone(),
            },
            [] => Self::default(),
        }
    }
}

/// Flattening result for one column, before uniqueness is enforced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatLabel {
    pub key: String,
    pub department_code: String,
    pub perimeter: String,
}

/// Sheet after header resolution and cleanup
///
/// Every row of `rows` starts with the code and label cells, followed by one
/// cell per entry of `columns`.
#[derive(Debug, Clone)]
pub struct ResolvedSheet {
    pub spec: HeaderSpec,
    /// Value columns, in grid order
    pub columns: Vec<ResolvedColumn>,
    pub rows: Vec<Vec<String>>,
    /// Side metadata by flattened key; empty for single-level headers
    pub side_table: HashMap<String, ResolvedColumn>,
}

impl ResolvedSheet {
    pub fn value_column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Number of stacked header rows ending at `header_row`
pub fn infer_level_count(grid: &RawGrid, header_row: usize) -> usize {
    if header_row >= 2 && grid.non_empty_cells(header_row - 2) >= MIN_HEADER_CELLS {
        3
    } else if header_row >= 1 && grid.non_empty_cells(header_row - 1) >= MIN_HEADER_CELLS {
        2
    } else {
        1
    }
}

fn is_blank_label(label: &str) -> bool {
    let label = label.trim();
    label.is_empty() || NULL_MARKERS.contains(&label.to_lowercase().as_str())
}

/// Flatten one label stack into key, department code and perimeter
///
/// The department code is the first `\d{1,3}[AB]?` run of the top label, or
/// the top label verbatim when it holds no code.
pub fn flatten_labels(stack: &LabelStack) -> FlatLabel {
    let top = stack.top.trim();
    let mid = stack.mid.trim();
    let bot = stack.bot.trim();

    let department_code = DEPARTMENT_RE
        .find(top)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| top.to_string());

    let perimeter = if is_blank_label(mid) {
        String::new()
    } else {
        mid.to_string()
    };

    let key = if !is_blank_label(bot) {
        bot
    } else if !is_blank_label(mid) {
        mid
    } else {
        top
    };

    FlatLabel {
        key: key.to_string(),
        department_code,
        perimeter,
    }
}

/// Forward-fill upper header levels across merged cells
///
/// A blank label inherits its left neighbour's label while every higher level
/// was inherited too; a fresh label at a higher level stops the fill below it.
fn fill_merged_levels(levels: &mut [Vec<String>]) {
    let Some((_, upper)) = levels.split_last_mut() else {
        return;
    };
    let width = upper.first().map(Vec::len).unwrap_or(0);
    let mut inherited = vec![true; width];

    for level in upper.iter_mut() {
        let mut last = String::new();
        for col in 0..level.len() {
            if col == 0 || !inherited[col] {
                last = level[col].clone();
                continue;
            }
            if level[col].trim().is_empty() {
                level[col] = last.clone();
            } else {
                inherited[col] = false;
                last = level[col].clone();
            }
        }
    }
}

fn unique_key(key: &str, seen: &mut HashMap<String, usize>, used: &mut HashSet<String>) -> String {
    let count = seen.entry(key.to_string()).or_insert(0);
    let mut candidate = if *count == 0 {
        key.to_string()
    } else {
        format!("{key}{KEY_SUFFIX_SEPARATOR}{count}")
    };
    while used.contains(&candidate) {
        *count += 1;
        candidate = format!("{key}{KEY_SUFFIX_SEPARATOR}{count}");
    }
    *count += 1;
    used.insert(candidate.clone());
    candidate
}

/// Resolve the header block starting at `header_row` and clean the data below it
pub fn resolve_sheet(grid: &RawGrid, header_row: usize) -> Result<ResolvedSheet, ResolveError> {
    let spec = HeaderSpec::new(header_row, infer_level_count(grid, header_row));
    let width = grid.width();

    let mut levels: Vec<Vec<String>> = (spec.first_label_row()..=spec.header_row_index)
        .map(|row| (0..width).map(|col| grid.cell(row, col).trim().to_string()).collect())
        .collect();
    if spec.is_multi_level() {
        fill_merged_levels(&mut levels);
    }

    let data_rows: Vec<Vec<String>> = grid
        .rows()
        .iter()
        .skip(spec.first_data_row())
        .map(|row| (0..width).map(|col| row.get(col).cloned().unwrap_or_default()).collect())
        .filter(|row: &Vec<String>| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    let kept: Vec<usize> = (0..width)
        .filter(|&col| data_rows.iter().any(|row| !row[col].trim().is_empty()))
        .collect();

    debug!(
        "Header resolved: row={}, levels={}, {} of {} columns kept, {} data rows",
        spec.header_row_index,
        spec.level_count,
        kept.len(),
        width,
        data_rows.len()
    );

    if kept.len() < MIN_TABLE_COLUMNS {
        return Err(ResolveError::TooFewColumns { found: kept.len() });
    }

    let mut seen = HashMap::new();
    let mut used = HashSet::new();
    let mut columns = Vec::with_capacity(kept.len().saturating_sub(2));
    let mut side_table = HashMap::new();

    for (position, &col) in kept.iter().enumerate() {
        let stack_levels: Vec<String> = levels.iter().map(|level| level[col].clone()).collect();
        let flat = flatten_labels(&LabelStack::from_levels(&stack_levels));
        let raw_key = if flat.key.is_empty() {
            format!("column_{}", col + 1)
        } else {
            flat.key.clone()
        };
        let key = unique_key(&raw_key, &mut seen, &mut used);

        // code_index and libelle_index, renamed positionally
        if position < 2 {
            continue;
        }

        let column = if spec.is_multi_level() {
            let column = ResolvedColumn {
                key: key.clone(),
                department_code: Some(flat.department_code),
                perimeter: (!flat.perimeter.is_empty()).then_some(flat.perimeter),
            };
            side_table.insert(key, column.clone());
            column
        } else {
            ResolvedColumn::plain(key)
        };
        columns.push(column);
    }

    let rows = data_rows
        .into_iter()
        .map(|row| kept.iter().map(|&col| row[col].clone()).collect())
        .collect();

    Ok(ResolvedSheet {
        spec,
        columns,
        rows,
        side_table,
    })
}
