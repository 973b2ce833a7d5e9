//! Multi-sheet and multi-file tests

use super::*;
use crate::models::Service;
use crate::processor::process_file;
use crate::processor::streaming::StreamingProcessor;
use tempfile::TempDir;

#[test]
fn test_sheet_metadata_falls_back_to_file_name() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crimes-gendarmerie-2016.xlsx");
    write_workbook(
        &path,
        &[
            ("Services PN", pn_three_level_rows()),
            ("GN", gn_two_level_rows()),
        ],
    );

    let output = process_file(&path).unwrap();
    assert_eq!(output.sheets_processed, 2);
    assert!(output.records.iter().all(|r| r.annee() == Some(2016)));

    // the sheet name wins over the file name when it names a service
    assert_eq!(output.records[0].service(), "PN");
    assert_eq!(output.records.last().unwrap().service(), "GN");
}

#[test]
fn test_missing_metadata_yields_empty_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "tableau.csv",
        b"Code;Libelle;Total\n1;Vol;3\n",
    );

    let output = process_file(&path).unwrap();
    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].annee(), None);
    assert_eq!(output.records[0].service(), "");
}

#[test]
fn test_sheets_processed_in_workbook_order() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crimes-2015.xlsx");
    write_workbook(
        &path,
        &[
            ("Services GN 2015", gn_two_level_rows()),
            ("Notice", notice_rows()),
            ("Services PN 2015", pn_three_level_rows()),
        ],
    );

    let output = process_file(&path).unwrap();
    let services: Vec<_> = output.records.iter().map(|r| r.service()).collect();
    assert_eq!(services, vec!["GN", "GN", "GN", "GN", "PN", "PN"]);
}

#[tokio::test]
async fn test_output_order_follows_input_order() {
    let temp_dir = TempDir::new().unwrap();
    let mut files = Vec::new();
    for (name, value) in [("a-pn-2013.csv", "7"), ("b-gn-2014.csv", "8"), ("c-pn-2015.csv", "9")] {
        let content = format!("Code;Libelle;Total\n1;Vol;{value}\n");
        files.push(write_file(temp_dir.path(), name, content.as_bytes()));
    }

    let (records, stats) = StreamingProcessor::new(3)
        .with_progress(false)
        .process_files(&files)
        .await;

    assert_eq!(stats.files_processed, 3);
    let values: Vec<_> = records.iter().map(|r| r.nombre_faits()).collect();
    assert_eq!(values, vec![7, 8, 9]);
    let years: Vec<_> = records.iter().map(|r| r.annee()).collect();
    assert_eq!(years, vec![Some(2013), Some(2014), Some(2015)]);
    assert_eq!(records[1].service(), Service::Gn.code());
}

#[tokio::test]
async fn test_no_files() {
    let (records, stats) = StreamingProcessor::new(2)
        .with_progress(false)
        .process_files(&[])
        .await;

    assert!(records.is_empty());
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.files_failed, 0);
}
