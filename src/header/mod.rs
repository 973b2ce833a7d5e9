//! Header location and stacked-header resolution
//!
//! Government releases put a variable amount of preamble above their tables
//! and stack one to three header rows over the value columns. This module
//! turns a [`RawGrid`](crate::models::RawGrid) into a [`ResolvedSheet`]: a
//! grid whose first two columns are the infraction code and label, whose value
//! columns carry unique flattened keys, and whose department/perimeter labels
//! are kept in a side table.
//!
//! ## Architecture
//!
//! - [`locator`] - finds the row where column headers begin
//! - [`resolver`] - infers header depth, flattens label stacks, cleans the grid
//!
//! Neither step can fail on its own: location and depth inference have total
//! fallbacks. Only a sheet that ends up with fewer than three columns is
//! rejected.

pub mod locator;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use locator::{HEADER_RULES, HeaderRule, locate_header_row};
pub use resolver::{
    FlatLabel, LabelStack, ResolveError, ResolvedSheet, flatten_labels, infer_level_count,
    resolve_sheet,
};
