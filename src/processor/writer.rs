//! Record serialization
//!
//! The record stream is collected into a Polars `DataFrame` with the
//! canonical column order and written either as CSV (UTF-8 with a byte order
//! mark, so spreadsheet tools pick the right encoding for accented labels) or
//! as Parquet.

use crate::config::{CompressionAlgorithm, OutputFormat};
use crate::constants::{OUTPUT_COLUMNS, UTF8_BOM};
use crate::error::{CrimesError, Result};
use crate::models::{LongRecord, Service};

use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writer for the long-form record stream
#[derive(Debug, Clone)]
pub struct RecordWriter {
    output_path: PathBuf,
    format: OutputFormat,
    compression: CompressionAlgorithm,
}

impl RecordWriter {
    pub fn new(output_path: PathBuf, format: OutputFormat) -> Self {
        Self {
            output_path,
            format,
            compression: CompressionAlgorithm::default(),
        }
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Build the output frame, one column per schema field
    pub fn to_dataframe(records: &[LongRecord]) -> Result<DataFrame> {
        let annee: Vec<Option<i32>> = records.iter().map(LongRecord::annee).collect();
        let service: Vec<&str> = records.iter().map(LongRecord::service).collect();
        let departement: Vec<&str> = records.iter().map(LongRecord::departement).collect();
        let perimetre: Vec<&str> = records.iter().map(LongRecord::perimetre).collect();
        let csp: Vec<&str> = records.iter().map(LongRecord::csp).collect();
        let code_index: Vec<&str> = records.iter().map(LongRecord::code_index).collect();
        let libelle_index: Vec<&str> = records.iter().map(LongRecord::libelle_index).collect();
        let nombre_faits: Vec<u64> = records.iter().map(LongRecord::nombre_faits).collect();

        Ok(df!(
            "annee" => annee,
            "service" => service,
            "departement" => departement,
            "perimetre" => perimetre,
            "CSP" => csp,
            "code_index" => code_index,
            "libelle_index" => libelle_index,
            "nombre_faits" => nombre_faits,
        )?)
    }

    /// Write all records, creating parent directories; returns the row count
    pub fn write(&self, records: &[LongRecord]) -> Result<usize> {
        if let Some(parent) = self.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CrimesError::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }

        let mut df = Self::to_dataframe(records)?;
        let mut file = File::create(&self.output_path).map_err(|e| {
            CrimesError::io(
                format!("Failed to create {}", self.output_path.display()),
                e,
            )
        })?;

        match self.format {
            OutputFormat::Csv => {
                file.write_all(UTF8_BOM)?;
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(&mut df)
                    .map_err(|e| CrimesError::output(&self.output_path, e.to_string()))?;
            }
            OutputFormat::Parquet => {
                ParquetWriter::new(file)
                    .with_compression(self.compression.to_polars_compression())
                    .finish(&mut df)
                    .map_err(|e| CrimesError::output(&self.output_path, e.to_string()))?;
            }
        }

        debug!(
            "Wrote {} records to {} as {}",
            df.height(),
            self.output_path.display(),
            self.format.name()
        );
        Ok(df.height())
    }
}

/// Header plus the first `rows` PN records, then the first `rows` GN records
pub fn format_preview(records: &[LongRecord], rows: usize) -> String {
    let mut lines = vec![OUTPUT_COLUMNS.join(",")];

    for service in [Service::Pn, Service::Gn] {
        lines.push(format!("-- {} --", service));
        let selected: Vec<&LongRecord> = records
            .iter()
            .filter(|r| r.service() == service.code())
            .take(rows)
            .collect();
        if selected.is_empty() {
            lines.push("[no rows]".to_string());
        }
        lines.extend(selected.iter().map(|r| r.to_fields().join(",")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(service: &str, csp: &str, value: u64) -> LongRecord {
        LongRecord::new(
            Some(2015),
            service.to_string(),
            "01".to_string(),
            "Métropole".to_string(),
            csp.to_string(),
            "100".to_string(),
            "Vol".to_string(),
            value,
        )
    }

    #[test]
    fn test_dataframe_schema() {
        let df = RecordWriter::to_dataframe(&[record("PN", "CSP1", 12)]).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.get_column_names_str(), OUTPUT_COLUMNS);
        assert_eq!(df.column("annee").unwrap().dtype(), &DataType::Int32);
        assert_eq!(df.column("nombre_faits").unwrap().dtype(), &DataType::UInt64);
        assert_eq!(df.column("CSP").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_csv_has_bom_and_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("out.csv");
        let writer = RecordWriter::new(path.clone(), OutputFormat::Csv);

        let written = writer
            .write(&[record("PN", "CSP1", 12), record("GN", "CSP2", 7)])
            .unwrap();
        assert_eq!(written, 2);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("annee,service,departement,perimetre,CSP,code_index,libelle_index,nombre_faits")
        );
        assert_eq!(lines.next(), Some("2015,PN,01,Métropole,CSP1,100,Vol,12"));
    }

    #[test]
    fn test_missing_year_written_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let record = LongRecord::new(
            None,
            String::new(),
            String::new(),
            String::new(),
            "Total".to_string(),
            "1".to_string(),
            "Vol".to_string(),
            3,
        );

        RecordWriter::new(path.clone(), OutputFormat::Csv)
            .write(&[record])
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        // a missing year is left bare while empty text cells are quoted
        assert_eq!(text.lines().nth(1), Some(",\"\",\"\",\"\",Total,1,Vol,3"));
    }

    #[test]
    fn test_parquet_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.parquet");
        let writer = RecordWriter::new(path.clone(), OutputFormat::Parquet)
            .with_compression(CompressionAlgorithm::Zstd);

        writer.write(&[record("GN", "CSP1", 5)]).unwrap();

        let file = File::open(&path).unwrap();
        let df = ParquetReader::new(file).finish().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.get_column_names_str(), OUTPUT_COLUMNS);
    }

    #[test]
    fn test_preview_sections() {
        let records = vec![
            record("GN", "g1", 1),
            record("PN", "p1", 2),
            record("PN", "p2", 3),
            record("PN", "p3", 4),
        ];
        let preview = format_preview(&records, 2);
        let lines: Vec<&str> = preview.lines().collect();

        assert_eq!(lines[0], OUTPUT_COLUMNS.join(","));
        assert_eq!(lines[1], "-- PN --");
        assert!(lines[2].contains(",p1,"));
        assert!(lines[3].contains(",p2,"));
        assert_eq!(lines[4], "-- GN --");
        assert!(lines[5].contains(",g1,"));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_preview_without_rows() {
        let preview = format_preview(&[], 5);
        assert_eq!(preview.matches("[no rows]").count(), 2);
    }
}
