//! Core data structures for activity ingestion.
//!
//! Defines the supported export formats, the per-format decoder output rows,
//! the two persisted entity kinds, and run statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Export formats accepted by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Fit,
    Gpx,
    Tcx,
}

impl FileFormat {
    /// Map a declared extension to a format. Matching is case-sensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "csv" => Some(FileFormat::Csv),
            "fit" => Some(FileFormat::Fit),
            "gpx" => Some(FileFormat::Gpx),
            "tcx" => Some(FileFormat::Tcx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Fit => "fit",
            FileFormat::Gpx => "gpx",
            FileFormat::Tcx => "tcx",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Text after the last `.` of the file name, case preserved.
///
/// A name without a dot yields the whole name, so that it fails dispatch
/// with the name itself in the error.
pub fn extension_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => name,
    }
}

/// The two entity kinds produced by a decode run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Point,
    Lap,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Point => f.write_str("point"),
            EntityKind::Lap => f.write_str("lap"),
        }
    }
}

/// One decoded sample before owner/entry stamping
#[derive(Debug, Clone, PartialEq)]
pub struct PointRow {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
    pub speed: Option<f64>,
    pub lap_number: Option<u32>,
}

impl PointRow {
    /// A row at the given position with every optional field unset
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            timestamp: None,
            heart_rate: None,
            cadence: None,
            speed: None,
            lap_number: None,
        }
    }
}

/// One decoded lap summary before owner/entry stamping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapRow {
    pub number: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub total_distance: Option<f64>,
    pub total_elapsed_time: Option<f64>,
    pub max_speed: Option<f64>,
    pub max_heart_rate: Option<f64>,
    pub avg_heart_rate: Option<f64>,
}

/// Output of one decoder pass over one file
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedActivity {
    pub format: FileFormat,
    pub laps: Vec<LapRow>,
    pub points: Vec<PointRow>,
    /// Samples omitted because they carried no position
    pub dropped_points: usize,
}

impl DecodedActivity {
    pub fn new(format: FileFormat) -> Self {
        Self {
            format,
            laps: Vec::new(),
            points: Vec::new(),
            dropped_points: 0,
        }
    }
}

/// Owner and parent-entry identifiers stamped onto every entity of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryStamp {
    pub owner_id: i64,
    pub entry_id: i64,
}

impl EntryStamp {
    pub fn new(owner_id: i64, entry_id: i64) -> Self {
        Self { owner_id, entry_id }
    }
}

/// Persisted track point
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub owner_id: i64,
    pub entry_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
    pub speed: Option<f64>,
    /// Not unique: groups points of one lap within a single decode run
    pub lap_number: Option<u32>,
}

/// Persisted lap summary
#[derive(Debug, Clone, PartialEq)]
pub struct Lap {
    pub owner_id: i64,
    pub entry_id: i64,
    pub number: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub total_distance: Option<f64>,
    pub total_elapsed_time: Option<f64>,
    pub max_speed: Option<f64>,
    pub max_heart_rate: Option<f64>,
    pub avg_heart_rate: Option<f64>,
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub format: FileFormat,
    pub points_persisted: usize,
    pub laps_persisted: usize,
    pub points_dropped: usize,
}

/// Processing statistics across a batch of files
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_points: usize,
    pub total_laps: usize,
    pub points_dropped: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    pub fn record(&mut self, summary: &RunSummary) {
        self.files_processed += 1;
        self.total_points += summary.points_persisted;
        self.total_laps += summary.laps_persisted;
        self.points_dropped += summary.points_dropped;
    }
}
