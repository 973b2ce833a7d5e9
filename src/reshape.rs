//! Wide-to-long reshaping
//!
//! A resolved sheet holds one row per infraction and one column per
//! department/category. Melting it gives one [`LongRow`] per
//! (infraction, value column) pair, still carrying the raw cell text.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::{KEY_SUFFIX_SEPARATOR, TRAILING_DEPARTMENT_PATTERN};
use crate::header::ResolvedSheet;
use crate::header::resolver::DEPARTMENT_RE;

static TRAILING_DEPARTMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(TRAILING_DEPARTMENT_PATTERN).expect("valid trailing department pattern")
});

/// Disambiguation counter appended to repeated column keys
static KEY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}\d+$", regex::escape(KEY_SUFFIX_SEPARATOR)))
        .expect("valid key suffix pattern")
});

/// One melted cell before numeric normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRow {
    pub code_index: String,
    pub libelle_index: String,
    pub csp: String,
    pub raw_value: String,
    /// Department label as found in the header, not yet normalized
    pub departement: String,
    pub perimetre: String,
}

/// Department and category label for a column without side metadata
///
/// The department is the first code found in the key; a code at the very end
/// of the key is stripped to leave the category label. A `__n` counter added
/// for repeated keys is set aside first and kept on the category.
pub fn split_single_level_key(key: &str) -> (String, String) {
    let (label, suffix) = match KEY_SUFFIX_RE.find(key) {
        Some(m) => (&key[..m.start()], m.as_str()),
        None => (key, ""),
    };
    let department = DEPARTMENT_RE
        .find(label)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let category = TRAILING_DEPARTMENT_RE.replace(label, "").trim().to_string();
    (department, format!("{category}{suffix}"))
}

/// Melt a resolved sheet into exactly `rows × value columns` long rows
pub fn melt(sheet: &ResolvedSheet) -> Vec<LongRow> {
    // Column attributes do not depend on the row
    let attributes: Vec<(String, String, String)> = sheet
        .columns
        .iter()
        .map(|column| match sheet.side_table.get(&column.key) {
            Some(side) => (
                column.key.trim().to_string(),
                side.department_code.as_deref().unwrap_or("").trim().to_string(),
                side.perimeter.as_deref().unwrap_or("").trim().to_string(),
            ),
            None => {
                let (department, category) = split_single_level_key(&column.key);
                (category, department, String::new())
            }
        })
        .collect();

    let mut long_rows = Vec::with_capacity(sheet.rows.len() * attributes.len());
    for row in &sheet.rows {
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
        let code_index = cell(0).trim();
        let libelle_index = cell(1).trim();

        for (offset, (csp, departement, perimetre)) in attributes.iter().enumerate() {
            long_rows.push(LongRow {
                code_index: code_index.to_string(),
                libelle_index: libelle_index.to_string(),
                csp: csp.clone(),
                raw_value: cell(offset + 2).to_string(),
                departement: departement.clone(),
                perimetre: perimetre.clone(),
            });
        }
    }

    long_rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::resolve_sheet;
    use crate::models::RawGrid;
    use crate::normalize::normalize;

    fn single_level_sheet() -> ResolvedSheet {
        let grid = RawGrid::from_rows(vec![
            vec!["Index", "Libellé index", "Paris 75", "Corse 2A", "Total"],
            vec!["1", " Règlements de compte ", "3", "1", "4"],
            vec!["2", "Homicides", "25", "-", "25"],
        ]);
        resolve_sheet(&grid, 0).unwrap()
    }

    #[test]
    fn test_split_single_level_key() {
        assert_eq!(
            split_single_level_key("Paris 75"),
            ("75".to_string(), "Paris".to_string())
        );
        assert_eq!(
            split_single_level_key("Corse 2A"),
            ("2A".to_string(), "Corse".to_string())
        );
        assert_eq!(
            split_single_level_key("Total"),
            (String::new(), "Total".to_string())
        );
    }

    #[test]
    fn test_split_repeated_single_level_key() {
        assert_eq!(
            split_single_level_key("Total__1"),
            (String::new(), "Total__1".to_string())
        );
        assert_eq!(
            split_single_level_key("Paris 75__1"),
            ("75".to_string(), "Paris__1".to_string())
        );
        assert_eq!(
            split_single_level_key("Corse 2A__12"),
            ("2A".to_string(), "Corse__12".to_string())
        );
    }

    #[test]
    fn test_melt_repeated_single_level_headers() {
        let grid = RawGrid::from_rows(vec![
            vec!["Code", "Libellé", "Total", "Total", "Paris 75", "Paris 75"],
            vec!["1", "Vol", "3", "4", "5", "6"],
        ]);
        let sheet = resolve_sheet(&grid, 0).unwrap();
        let rows = melt(&sheet);

        let columns: Vec<_> = rows
            .iter()
            .map(|r| (r.csp.as_str(), r.departement.as_str()))
            .collect();
        assert_eq!(
            columns,
            vec![
                ("Total", ""),
                ("Total__1", ""),
                ("Paris", "75"),
                ("Paris__1", "75"),
            ]
        );
    }

    #[test]
    fn test_melt_cardinality() {
        let sheet = single_level_sheet();
        let rows = melt(&sheet);

        // 2 data rows × (5 columns - 2 id columns)
        assert_eq!(rows.len(), 6);
        let raw: Vec<_> = sheet.rows.iter().flat_map(|r| r[2..].to_vec()).collect();
        for (long, source) in rows.iter().zip(&raw) {
            assert_eq!(normalize(&long.raw_value), normalize(source));
        }
    }

    #[test]
    fn test_melt_single_level_metadata() {
        let rows = melt(&single_level_sheet());

        assert_eq!(rows[0].libelle_index, "Règlements de compte");
        assert_eq!(rows[0].csp, "Paris");
        assert_eq!(rows[0].departement, "75");
        assert_eq!(rows[0].perimetre, "");
        assert_eq!(rows[1].csp, "Corse");
        assert_eq!(rows[1].departement, "2A");
        assert_eq!(rows[2].csp, "Total");
        assert_eq!(rows[2].departement, "");
        assert_eq!(rows[4].raw_value, "-");
    }

    #[test]
    fn test_melt_uses_side_table() {
        let grid = RawGrid::from_rows(vec![
            vec!["Département", "", "01", "01"],
            vec!["Périmètre", "", "Métropole", "Métropole"],
            vec!["Code", "Libellé", "CSP1", "CSP2"],
            vec!["100", "Vol", "12", "7"],
        ]);
        let sheet = resolve_sheet(&grid, 2).unwrap();
        let rows = melt(&sheet);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].csp, "CSP1");
        assert_eq!(rows[0].departement, "01");
        assert_eq!(rows[0].perimetre, "Métropole");
        assert_eq!(rows[1].csp, "CSP2");
        assert_eq!(rows[1].raw_value, "7");
    }
}
