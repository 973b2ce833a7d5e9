//! Application constants for the crimes processor
//!
//! Detection thresholds, reader fallback orders, rule patterns and the
//! canonical output schema used throughout the pipeline.

// =============================================================================
// Source Loading
// =============================================================================

/// Minimum number of columns for a table to be accepted
/// (code, label, at least one value column)
pub const MIN_TABLE_COLUMNS: usize = 3;

/// Encodings tried for delimited text, outer loop
pub const DELIMITED_ENCODINGS: &[&str] = &["utf-8", "cp1252", "latin-1"];

/// Separators tried for delimited text, inner loop
pub const DELIMITED_SEPARATORS: &[u8] = &[b';', b',', b'\t'];

/// Candidates for the last-resort separator detection pass
pub const SNIFF_SEPARATORS: &[u8] = &[b'\t', b';', b',', b'|'];

/// Number of leading lines inspected by the separator detection pass
pub const SNIFF_SAMPLE_LINES: usize = 10;

/// File extensions read through a workbook engine
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// File extensions accepted during directory discovery by default
pub const DEFAULT_INPUT_EXTENSIONS: &[&str] =
    &["csv", "txt", "tsv", "xlsx", "xlsm", "xls", "xlsb", "ods"];

// =============================================================================
// Header Detection
// =============================================================================

/// Maximum number of rows scanned when locating the header row
pub const MAX_HEADER_SCAN_ROWS: usize = 80;

/// Minimum non-empty cells for a row to count as a header level
pub const MIN_HEADER_CELLS: usize = 3;

/// Header keywords (matched as substrings of lower-cased, trimmed cells)
pub const HEADER_KEYWORDS: &[&str] = &["code", "libell", "libellé"];

/// Label values treated as absent in header levels
pub const NULL_MARKERS: &[&str] = &["nan"];

/// Department code embedded in a header label ("75 - Paris", "2A - Corse")
pub const DEPARTMENT_PATTERN: &str = r"(\d{1,3}[AB]?)";

/// Trailing department code stripped from single-level column keys
pub const TRAILING_DEPARTMENT_PATTERN: &str = r"\b\d{1,3}[AB]?$";

/// Separator used when disambiguating duplicated column keys
pub const KEY_SUFFIX_SEPARATOR: &str = "__";

// =============================================================================
// Metadata Extraction
// =============================================================================

/// Sheets kept for processing; anything else is skipped silently
pub const SERVICE_SHEET_PATTERN: &str = r"(?i)services\s*(pn|gn)|\bpn\b|\bgn\b";

/// Whole-word service code
pub const SERVICE_CODE_PATTERN: &str = r"(?i)\b(GN|PN)\b";

/// Accepted release years
pub const MIN_YEAR: i32 = 2012;
pub const MAX_YEAR: i32 = 2029;

// =============================================================================
// Numeric Normalization
// =============================================================================

/// Cell values that normalize to zero without parsing (compared lower-cased)
pub const EMPTY_VALUE_MARKERS: &[&str] = &["", "-", "nan", "na"];

/// Leftovers that cannot be parsed once non-numeric characters are stripped
pub const DEGENERATE_NUMBERS: &[&str] = &["", "-", ".", "-."];

// =============================================================================
// Output
// =============================================================================

/// Canonical output columns, in order
pub const OUTPUT_COLUMNS: &[&str] = &[
    "annee",
    "service",
    "departement",
    "perimetre",
    "CSP",
    "code_index",
    "libelle_index",
    "nombre_faits",
];

/// Default output file name
pub const DEFAULT_OUTPUT_FILE: &str = "crimes_clean_2012_2021.csv";

/// Default number of rows shown per service in the preview
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// UTF-8 byte order mark written at the start of CSV output
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// =============================================================================
// Configuration
// =============================================================================

/// Application directory name under the user's config directory
pub const CONFIG_DIR_NAME: &str = "crimes-processor";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overrides
pub const ENV_OUTPUT: &str = "CRIMES_PROCESSOR_OUTPUT";
pub const ENV_WORKERS: &str = "CRIMES_PROCESSOR_WORKERS";
pub const ENV_FORMAT: &str = "CRIMES_PROCESSOR_FORMAT";
