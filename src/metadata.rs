//! Year and reporting-service extraction from file and sheet names
//!
//! Releases encode their metadata inconsistently: `Services PN 2015`,
//! `crimes-gendarmerie-2016.csv`, `tableau_gn_2019.xlsx`. Both extractions are
//! expressed as ordered rule lists evaluated until one applies, so precedence
//! is explicit.
//!
//! Known risk: `gendarmerie` is checked before `police`, so a name that
//! contains both words always resolves to GN.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::constants::{MAX_YEAR, MIN_YEAR, SERVICE_CODE_PATTERN, SERVICE_SHEET_PATTERN};
use crate::models::Service;

static SERVICE_SHEET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SERVICE_SHEET_PATTERN).expect("valid service sheet pattern"));
static SERVICE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SERVICE_CODE_PATTERN).expect("valid service code pattern"));
static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

/// A named rule resolving a service from a name; `None` means "not applicable"
pub struct ServiceRule {
    pub name: &'static str,
    pub resolve: fn(&str) -> Option<Service>,
}

/// Service rules in precedence order, first applicable wins
pub const SERVICE_RULES: &[ServiceRule] = &[
    ServiceRule {
        name: "whole-word code",
        resolve: whole_word_code,
    },
    ServiceRule {
        name: "gendarmerie",
        resolve: mentions_gendarmerie,
    },
    ServiceRule {
        name: "police",
        resolve: mentions_police,
    },
    ServiceRule {
        name: "gn without pn",
        resolve: gn_without_pn,
    },
    ServiceRule {
        name: "pn without gn",
        resolve: pn_without_gn,
    },
];

fn whole_word_code(name: &str) -> Option<Service> {
    SERVICE_CODE_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Service::from_code(m.as_str()))
}

fn mentions_gendarmerie(name: &str) -> Option<Service> {
    contains_lower(name, "gendarmerie").then_some(Service::Gn)
}

fn mentions_police(name: &str) -> Option<Service> {
    contains_lower(name, "police").then_some(Service::Pn)
}

fn gn_without_pn(name: &str) -> Option<Service> {
    (contains_lower(name, "gn") && !contains_lower(name, "pn")).then_some(Service::Gn)
}

fn pn_without_gn(name: &str) -> Option<Service> {
    (contains_lower(name, "pn") && !contains_lower(name, "gn")).then_some(Service::Pn)
}

fn contains_lower(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

/// Year and service derived from a name; both may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceMetadata {
    pub year: Option<i32>,
    pub service: Option<Service>,
}

impl SourceMetadata {
    /// Fill missing fields from a fallback, field by field
    pub fn or(self, fallback: SourceMetadata) -> Self {
        Self {
            year: self.year.or(fallback.year),
            service: self.service.or(fallback.service),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.year.is_some() && self.service.is_some()
    }
}

/// Extract year and service from a file or sheet name
pub fn extract(name: &str) -> SourceMetadata {
    SourceMetadata {
        year: extract_year(name),
        service: extract_service(name),
    }
}

/// Extract metadata from the file name component of a path
pub fn extract_from_path(path: &Path) -> SourceMetadata {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    extract(&file_name)
}

/// First standalone 4-digit run within the accepted release years
pub fn extract_year(name: &str) -> Option<i32> {
    DIGIT_RUN_RE
        .find_iter(name)
        .filter(|m| m.as_str().len() == 4 && m.as_str().starts_with("20"))
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .find(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
}

/// Evaluate [`SERVICE_RULES`] in order
pub fn extract_service(name: &str) -> Option<Service> {
    SERVICE_RULES.iter().find_map(|rule| (rule.resolve)(name))
}

/// Whether a workbook sheet holds service statistics
pub fn is_service_sheet(sheet_name: &str) -> bool {
    SERVICE_SHEET_RE.is_match(sheet_name)
}
