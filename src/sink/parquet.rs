//! Parquet entity sink
//!
//! Writes each batch to its own file under the output directory:
//!
//! ```text
//! output/
//!   points/entry_<entry_id>.parquet
//!   laps/entry_<entry_id>.parquet
//! ```
//!
//! Timestamps are stored as millisecond datetimes in UTC without a zone tag.
//! Writing a second batch of the same kind for the same entry replaces the
//! earlier file.

use super::EntitySink;
use crate::config::ParquetSinkConfig;
use crate::error::{IngestError, Result};
use crate::models::{EntityKind, Lap, Point};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const POINTS_DIR: &str = "points";
pub const LAPS_DIR: &str = "laps";

/// Writes entity batches as Parquet files, one per entry and entity kind
#[derive(Debug, Clone)]
pub struct ParquetSink {
    output_dir: PathBuf,
    config: ParquetSinkConfig,
}

impl ParquetSink {
    pub fn new(output_dir: impl Into<PathBuf>, config: ParquetSinkConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            config,
        }
    }

    /// Location of the file holding one entry's entities of `kind`
    pub fn file_path(&self, kind: EntityKind, entry_id: i64) -> PathBuf {
        let dir = match kind {
            EntityKind::Point => POINTS_DIR,
            EntityKind::Lap => LAPS_DIR,
        };
        self.output_dir
            .join(dir)
            .join(format!("entry_{}.parquet", entry_id))
    }

    fn write(&self, kind: EntityKind, entry_id: i64, mut df: DataFrame) -> Result<usize> {
        let path = self.file_path(kind, entry_id);
        let rows = df.height();

        self.write_dataframe(&path, &mut df)
            .map_err(|e| IngestError::sink(kind, format!("{}: {}", path.display(), e)))?;

        debug!("Wrote {} {} rows to {}", rows, kind, path.display());
        Ok(rows)
    }

    fn write_dataframe(&self, path: &Path, df: &mut DataFrame) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        ParquetWriter::new(file)
            .with_compression(self.config.compression.to_polars_compression())
            .with_statistics(self.config.statistics())
            .with_row_group_size(self.config.row_group_size)
            .finish(df)?;

        Ok(())
    }
}

fn millis(values: impl Iterator<Item = Option<DateTime<Utc>>>) -> Vec<Option<i64>> {
    values.map(|ts| ts.map(|t| t.timestamp_millis())).collect()
}

fn datetime_column(name: &str, values: Vec<Option<i64>>) -> PolarsResult<Column> {
    Column::new(name.into(), values).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// Build the points table in column order
pub fn points_frame(points: &[Point]) -> PolarsResult<DataFrame> {
    let f64s = |f: fn(&Point) -> Option<f64>| points.iter().map(f).collect::<Vec<_>>();

    DataFrame::new(vec![
        Column::new("owner_id".into(), points.iter().map(|p| p.owner_id).collect::<Vec<_>>()),
        Column::new("entry_id".into(), points.iter().map(|p| p.entry_id).collect::<Vec<_>>()),
        Column::new("latitude".into(), points.iter().map(|p| p.latitude).collect::<Vec<_>>()),
        Column::new("longitude".into(), points.iter().map(|p| p.longitude).collect::<Vec<_>>()),
        Column::new("altitude".into(), f64s(|p| p.altitude)),
        datetime_column("timestamp", millis(points.iter().map(|p| p.timestamp)))?,
        Column::new("heart_rate".into(), f64s(|p| p.heart_rate)),
        Column::new("cadence".into(), f64s(|p| p.cadence)),
        Column::new("speed".into(), f64s(|p| p.speed)),
        Column::new(
            "lap_number".into(),
            points.iter().map(|p| p.lap_number).collect::<Vec<_>>(),
        ),
    ])
}

/// Build the laps table in column order
pub fn laps_frame(laps: &[Lap]) -> PolarsResult<DataFrame> {
    let f64s = |f: fn(&Lap) -> Option<f64>| laps.iter().map(f).collect::<Vec<_>>();

    DataFrame::new(vec![
        Column::new("owner_id".into(), laps.iter().map(|l| l.owner_id).collect::<Vec<_>>()),
        Column::new("entry_id".into(), laps.iter().map(|l| l.entry_id).collect::<Vec<_>>()),
        Column::new("number".into(), laps.iter().map(|l| l.number).collect::<Vec<_>>()),
        datetime_column("start_time", millis(laps.iter().map(|l| l.start_time)))?,
        Column::new("total_distance".into(), f64s(|l| l.total_distance)),
        Column::new("total_elapsed_time".into(), f64s(|l| l.total_elapsed_time)),
        Column::new("max_speed".into(), f64s(|l| l.max_speed)),
        Column::new("max_heart_rate".into(), f64s(|l| l.max_heart_rate)),
        Column::new("avg_heart_rate".into(), f64s(|l| l.avg_heart_rate)),
    ])
}

impl EntitySink for ParquetSink {
    fn persist_points(&mut self, points: &[Point]) -> Result<usize> {
        let Some(first) = points.first() else {
            return Ok(0);
        };
        let df = points_frame(points).map_err(|e| IngestError::sink(EntityKind::Point, e.to_string()))?;
        self.write(EntityKind::Point, first.entry_id, df)
    }

    fn persist_laps(&mut self, laps: &[Lap]) -> Result<usize> {
        let Some(first) = laps.first() else {
            return Ok(0);
        };
        let df = laps_frame(laps).map_err(|e| IngestError::sink(EntityKind::Lap, e.to_string()))?;
        self.write(EntityKind::Lap, first.entry_id, df)
    }
}
