//! Basic processing integration tests

use super::*;
use crate::config::OutputFormat;
use crate::constants::UTF8_BOM;
use crate::processor::{DatasetProcessor, process_file};
use polars::prelude::{ParquetReader, SerReader};
use tempfile::TempDir;

#[test]
fn test_workbook_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_release_workbook(temp_dir.path(), "crimes.xlsx");

    let output = process_file(&path).unwrap();

    assert_eq!(output.sheets_processed, 2);
    assert_eq!(output.sheets_skipped, 1);
    assert_eq!(output.sheets_failed, 0);
    // PN: 1 row x 2 columns, GN: 2 rows x 2 columns
    assert_eq!(output.records.len(), 6);

    let pn: Vec<_> = output
        .records
        .iter()
        .filter(|r| r.service() == "PN")
        .collect();
    assert_eq!(pn.len(), 2);
    for (record, (csp, value)) in pn.iter().zip([("CSP1", 12), ("CSP2", 7)]) {
        assert_eq!(record.annee(), Some(2015));
        assert_eq!(record.departement(), "01");
        assert_eq!(record.perimetre(), "Métropole");
        assert_eq!(record.code_index(), "100");
        assert_eq!(record.libelle_index(), "Vol");
        assert_eq!(record.csp(), csp);
        assert_eq!(record.nombre_faits(), value);
    }
}

#[test]
fn test_two_level_sheet_records() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_release_workbook(temp_dir.path(), "crimes.xlsx");

    let output = process_file(&path).unwrap();
    let gn: Vec<_> = output
        .records
        .iter()
        .filter(|r| r.service() == "GN")
        .map(|r| {
            (
                r.code_index().to_string(),
                r.departement().to_string(),
                r.csp().to_string(),
                r.nombre_faits(),
            )
        })
        .collect();

    assert_eq!(
        gn,
        vec![
            ("100".to_string(), "2A".to_string(), "Total".to_string(), 1234),
            ("100".to_string(), "75".to_string(), "Total__1".to_string(), 0),
            ("101".to_string(), "2A".to_string(), "Total".to_string(), 3),
            ("101".to_string(), "75".to_string(), "Total__1".to_string(), 0),
        ]
    );
    assert!(output.records.iter().all(|r| r.annee() == Some(2015)));
    // "n/a" is recovered, "-" is an explicit empty marker
    assert_eq!(output.values_recovered, 1);
}

#[test]
fn test_delimited_single_level_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "crimes-pn-2014.csv",
        "Index;Libellé index;Paris 75;Corse 2A\n1;Homicides;25;-\n2;Vols;1 234;3\n".as_bytes(),
    );

    let output = process_file(&path).unwrap();
    assert_eq!(output.sheets_processed, 1);
    assert_eq!(output.records.len(), 4);

    let first = &output.records[0];
    assert_eq!(first.annee(), Some(2014));
    assert_eq!(first.service(), "PN");
    assert_eq!(first.departement(), "75");
    assert_eq!(first.csp(), "Paris");
    assert_eq!(first.perimetre(), "");
    assert_eq!(first.nombre_faits(), 25);

    assert_eq!(output.records[1].departement(), "2A");
    assert_eq!(output.records[1].csp(), "Corse");
    assert_eq!(output.records[2].nombre_faits(), 1234);
}

#[tokio::test]
async fn test_processing_pipeline_writes_csv() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("releases");
    fs::create_dir_all(&input_dir).unwrap();
    write_release_workbook(&input_dir, "crimes-2015.xlsx");
    let output_path = temp_dir.path().join("out").join("crimes_clean.csv");

    let processor = DatasetProcessor::new(test_config(vec![input_dir], output_path.clone()))
        .unwrap()
        .quiet(true);
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.sheets_processed, 2);
    assert_eq!(stats.sheets_skipped, 1);
    assert_eq!(stats.records_emitted, 6);
    assert_eq!(stats.output_path, Some(output_path.clone()));

    let bytes = fs::read(&output_path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    // header plus one line per record
    assert_eq!(text.lines().count(), 7);
    assert!(text.contains("2015,PN,01,Métropole,CSP1,100,Vol,12"));
}

#[tokio::test]
async fn test_processing_pipeline_writes_parquet() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_release_workbook(temp_dir.path(), "crimes-2015.xlsx");
    let output_path = temp_dir.path().join("records.data");

    let config = test_config(vec![input], output_path.clone()).with_format(OutputFormat::Parquet);
    let stats = DatasetProcessor::new(config)
        .unwrap()
        .quiet(true)
        .process()
        .await
        .unwrap();
    assert_eq!(stats.records_emitted, 6);

    let df = ParquetReader::new(fs::File::open(&output_path).unwrap())
        .finish()
        .unwrap();
    assert_eq!(df.height(), 6);
    assert_eq!(df.width(), 8);
}
