//! Input file discovery
//!
//! Inputs may be files or directories. Directories are walked recursively
//! and filtered by extension; explicit files are taken as given. The output
//! file is never treated as an input, and paths come back sorted so record
//! order does not depend on directory iteration order.

use crate::config::{ProcessingConfig, absolute};
use crate::error::{CrimesError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File discovery component
#[derive(Debug)]
pub struct FileDiscovery {
    inputs: Vec<PathBuf>,
    extensions: Vec<String>,
    source_name: Option<String>,
    exclude: Option<PathBuf>,
}

impl FileDiscovery {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            inputs: config.inputs.clone(),
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            source_name: config.source_name.clone(),
            exclude: None,
        }
    }

    /// Never return this path, typically the output file
    pub fn excluding(mut self, path: &Path) -> Self {
        self.exclude = Some(absolute(path));
        self
    }

    /// Discover all input files, sorted and deduplicated
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in &self.inputs {
            if input.is_file() {
                files.push(input.clone());
            } else if input.is_dir() {
                debug!("Searching for input files in: {}", input.display());
                for entry in WalkDir::new(input).follow_links(true) {
                    let entry = entry.map_err(|e| {
                        CrimesError::io(
                            format!("Failed to walk {}", input.display()),
                            e.into(),
                        )
                    })?;
                    if entry.file_type().is_file() && self.has_accepted_extension(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
            } else {
                return Err(CrimesError::io(
                    format!("Input not found: {}", input.display()),
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ));
            }
        }

        files.retain(|path| !self.is_excluded(path) && self.matches_source_name(path));
        files.sort();
        files.dedup();

        debug!("Found {} input files", files.len());
        Ok(files)
    }

    fn has_accepted_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|excluded| absolute(path) == *excluded)
    }

    fn matches_source_name(&self, path: &Path) -> bool {
        match &self.source_name {
            Some(name) => path.file_name().is_some_and(|n| n == name.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to create a directory of mixed release files
    fn create_release_dir(temp_dir: &TempDir) -> PathBuf {
        let root = temp_dir.path().join("releases");
        let nested = root.join("2016");
        fs::create_dir_all(&nested).unwrap();

        fs::write(root.join("crimes-2015.xlsx"), "x").unwrap();
        fs::write(root.join("crimes-pn-2014.csv"), "x").unwrap();
        fs::write(root.join("README.md"), "x").unwrap();
        fs::write(nested.join("crimes-gn-2016.CSV"), "x").unwrap();

        root
    }

    fn processing(inputs: Vec<PathBuf>) -> ProcessingConfig {
        ProcessingConfig {
            inputs,
            ..Default::default()
        }
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_discover_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_release_dir(&temp_dir);

        let files = FileDiscovery::new(&processing(vec![root])).discover().unwrap();

        // sorted by full path: 2016/ sorts before the top-level files
        assert_eq!(
            names(&files),
            vec!["crimes-gn-2016.CSV", "crimes-2015.xlsx", "crimes-pn-2014.csv"]
        );
    }

    #[test]
    fn test_output_file_is_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_release_dir(&temp_dir);
        let output = root.join("crimes-pn-2014.csv");

        let files = FileDiscovery::new(&processing(vec![root]))
            .excluding(&output)
            .discover()
            .unwrap();

        assert!(!files.contains(&output));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_source_name_filter() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_release_dir(&temp_dir);

        let mut config = processing(vec![root]);
        config.source_name = Some("crimes-2015.xlsx".to_string());
        let files = FileDiscovery::new(&config).discover().unwrap();

        assert_eq!(names(&files), vec!["crimes-2015.xlsx"]);
    }

    #[test]
    fn test_explicit_files_bypass_extension_filter() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_release_dir(&temp_dir);
        let readme = root.join("README.md");

        let files = FileDiscovery::new(&processing(vec![readme.clone(), readme.clone()]))
            .discover()
            .unwrap();

        assert_eq!(files, vec![readme]);
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = FileDiscovery::new(&processing(vec![missing])).discover();
        assert!(matches!(result, Err(CrimesError::Io { .. })));
    }
}
