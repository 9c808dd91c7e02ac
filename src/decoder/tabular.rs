//! CSV lap export decoder
//!
//! Each row is one lap summary. There is no point-level data, no lap number
//! and no start time in this format.

use super::fields::{parse_duration_seconds, parse_number};
use super::Decoder;
use crate::error::{IngestError, Result};
use crate::models::{DecodedActivity, FileFormat, LapRow};
use csv::StringRecord;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const DISTANCE_COLUMN: &str = "Distance";
pub const TIME_COLUMN: &str = "Time";
pub const MOVING_TIME_COLUMN: &str = "Moving Time";

const REQUIRED_COLUMNS: [&str; 3] = [DISTANCE_COLUMN, TIME_COLUMN, MOVING_TIME_COLUMN];

/// Column name to index mapping for the header row
#[derive(Debug, Clone)]
struct ColumnMapping {
    name_to_index: HashMap<String, usize>,
}

impl ColumnMapping {
    fn analyze(path: &Path, headers: &StringRecord) -> Result<Self> {
        let name_to_index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(index, header)| (header.trim().to_string(), index))
            .collect();

        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !name_to_index.contains_key(**column))
        {
            return Err(IngestError::missing_field(path, *missing));
        }

        Ok(Self { name_to_index })
    }

    /// Trimmed cell value, `None` when empty
    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.name_to_index
            .get(column)
            .and_then(|&index| record.get(index))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Decoder for `.csv` lap exports
#[derive(Debug, Default, Clone, Copy)]
pub struct TabularDecoder;

impl TabularDecoder {
    /// Decode CSV content from any reader
    pub fn decode_reader<R: Read>(&self, path: &Path, reader: R) -> Result<DecodedActivity> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mapping = ColumnMapping::analyze(path, csv_reader.headers()?)?;

        let mut decoded = DecodedActivity::new(FileFormat::Csv);
        for result in csv_reader.records() {
            let record = result?;
            decoded.laps.push(lap_row(path, &mapping, &record)?);
        }

        debug!("CSV decode: {} laps", decoded.laps.len());
        Ok(decoded)
    }
}

impl Decoder for TabularDecoder {
    fn format(&self) -> FileFormat {
        FileFormat::Csv
    }

    fn decode(&self, path: &Path) -> Result<DecodedActivity> {
        info!("Decoding CSV file: {}", path.display());
        let file = std::fs::File::open(path)?;
        self.decode_reader(path, file)
    }
}

fn duration_cell(
    path: &Path,
    mapping: &ColumnMapping,
    record: &StringRecord,
    column: &str,
) -> Result<Option<f64>> {
    mapping
        .get(record, column)
        .map(|value| {
            parse_duration_seconds(value).ok_or_else(|| IngestError::invalid_value(path, column, value))
        })
        .transpose()
}

fn lap_row(path: &Path, mapping: &ColumnMapping, record: &StringRecord) -> Result<LapRow> {
    // Elapsed "Time" is validated but has no lap field; moving time is stored.
    duration_cell(path, mapping, record, TIME_COLUMN)?;

    Ok(LapRow {
        total_distance: mapping
            .get(record, DISTANCE_COLUMN)
            .map(|value| parse_number(path, DISTANCE_COLUMN, value))
            .transpose()?,
        total_elapsed_time: duration_cell(path, mapping, record, MOVING_TIME_COLUMN)?,
        ..LapRow::default()
    })
}
