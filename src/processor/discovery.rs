//! Input discovery for batch ingestion
//!
//! Expands command-line inputs into the list of files to ingest. Directories
//! are walked recursively and only files with a recognised export extension
//! are kept; files named directly are always kept so that an unsupported one
//! is reported as a failed run rather than silently ignored.

use crate::error::{IngestError, Result};
use crate::models::{extension_of, FileFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File discovery component for export uploads
#[derive(Debug, Default)]
pub struct FileDiscovery {
    skipped: usize,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files skipped inside directories because of their extension
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Discover all input files, sorted within each directory
    ///
    /// ```text
    /// uploads/
    ///   2023/
    ///     morning_run.tcx
    ///     commute.fit
    ///   notes.txt          (skipped)
    ///   splits.csv
    /// ```
    pub fn discover(&mut self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            if !input.exists() {
                return Err(IngestError::InputNotFound {
                    path: input.clone(),
                });
            }

            if input.is_dir() {
                files.extend(self.discover_directory(input)?);
            } else {
                files.push(input.clone());
            }
        }

        debug!(
            "Found {} input files ({} skipped)",
            files.len(),
            self.skipped
        );
        Ok(files)
    }

    fn discover_directory(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| IngestError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            if is_export_file(&path) {
                files.push(path);
            } else {
                warn!("Skipping unsupported file: {}", path.display());
                self.skipped += 1;
            }
        }

        Ok(files)
    }
}

/// Check if a path has one of the supported export extensions
pub fn is_export_file(path: &Path) -> bool {
    FileFormat::from_extension(&extension_of(path)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to create a nested upload directory
    fn create_upload_tree(temp_dir: &TempDir) -> PathBuf {
        let root = temp_dir.path().join("uploads");
        let nested = root.join("2023");
        fs::create_dir_all(&nested).unwrap();

        fs::write(nested.join("morning_run.tcx"), "tcx").unwrap();
        fs::write(nested.join("commute.fit"), "fit").unwrap();
        fs::write(root.join("splits.csv"), "csv").unwrap();
        fs::write(root.join("ride.gpx"), "gpx").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();
        fs::write(root.join("SHOUTING.TCX"), "ignored").unwrap();

        root
    }

    #[test]
    fn test_discover_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_upload_tree(&temp_dir);

        let mut discovery = FileDiscovery::new();
        let files = discovery.discover(&[root.clone()]).unwrap();

        assert_eq!(files.len(), 4);
        assert_eq!(discovery.skipped_count(), 2);
        assert!(files.iter().all(|f| is_export_file(f)));
        assert!(files.contains(&root.join("2023").join("commute.fit")));
    }

    #[test]
    fn test_discovery_order_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_upload_tree(&temp_dir);

        let first = FileDiscovery::new().discover(&[root.clone()]).unwrap();
        let second = FileDiscovery::new().discover(&[root]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_explicit_file_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("activity.kml");
        fs::write(&file, "kml").unwrap();

        let files = FileDiscovery::new().discover(&[file.clone()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.tcx");

        match FileDiscovery::new().discover(&[missing.clone()]) {
            Err(IngestError::InputNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected InputNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_is_export_file() {
        assert!(is_export_file(Path::new("run.tcx")));
        assert!(is_export_file(Path::new("/path/to/ride.fit")));
        assert!(is_export_file(Path::new("laps.csv")));
        assert!(!is_export_file(Path::new("route.kml")));
        assert!(!is_export_file(Path::new("README")));
        assert!(!is_export_file(Path::new("ride.GPX"))); // Case sensitive
    }
}
