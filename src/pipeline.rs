//! Decode, map and persist one file.
//!
//! A run is synchronous and single-threaded: the decoder reads the whole file,
//! both tables are mapped, then points and laps are persisted in that order.
//! There is no rollback; a failed lap write leaves the points in place.

use crate::decoder::resolve;
use crate::error::Result;
use crate::mapper::{to_entities, Entities, Table};
use crate::models::{extension_of, EntryStamp, RunSummary};
use crate::sink::EntitySink;
use std::path::Path;
use tracing::{debug, info};

/// Runs the ingestion steps for one uploaded file
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineRunner;

impl PipelineRunner {
    pub fn new() -> Self {
        Self
    }

    /// Ingest `path`, declared as `extension`, into `sink`.
    ///
    /// Fails with `UnsupportedFormat` before touching the file or the sink
    /// when the extension is not one of `csv`, `fit`, `gpx`, `tcx`.
    pub fn run<S>(
        &self,
        path: &Path,
        extension: &str,
        stamp: EntryStamp,
        sink: &mut S,
    ) -> Result<RunSummary>
    where
        S: EntitySink + ?Sized,
    {
        let decoder = resolve(extension)?;
        let activity = decoder.decode(path)?;

        let points = to_entities(Table::Points(activity.points), stamp);
        let laps = to_entities(Table::Laps(activity.laps), stamp);

        let points_persisted = persist_batch(sink, &points)?;
        let laps_persisted = persist_batch(sink, &laps)?;

        info!(
            "Ingested {} for entry {}: {} points, {} laps",
            path.display(),
            stamp.entry_id,
            points_persisted,
            laps_persisted
        );

        Ok(RunSummary {
            format: activity.format,
            points_persisted,
            laps_persisted,
            points_dropped: activity.dropped_points,
        })
    }

    /// Ingest `path`, taking the format from its file extension
    pub fn run_file<S>(&self, path: &Path, stamp: EntryStamp, sink: &mut S) -> Result<RunSummary>
    where
        S: EntitySink + ?Sized,
    {
        self.run(path, &extension_of(path), stamp, sink)
    }
}

fn persist_batch<S>(sink: &mut S, entities: &Entities) -> Result<usize>
where
    S: EntitySink + ?Sized,
{
    if entities.is_empty() {
        debug!("Skipping empty {} batch", entities.kind());
        return Ok(0);
    }
    sink.persist(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::models::{EntityKind, FileFormat, Lap, Point};
    use crate::sink::MemorySink;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Records calls and fails on the configured entity kind
    #[derive(Default)]
    struct FailingSink {
        fail_on: Option<EntityKind>,
        calls: Vec<EntityKind>,
    }

    impl EntitySink for FailingSink {
        fn persist_points(&mut self, points: &[Point]) -> Result<usize> {
            self.calls.push(EntityKind::Point);
            if self.fail_on == Some(EntityKind::Point) {
                return Err(IngestError::sink(EntityKind::Point, "store unavailable"));
            }
            Ok(points.len())
        }

        fn persist_laps(&mut self, laps: &[Lap]) -> Result<usize> {
            self.calls.push(EntityKind::Lap);
            if self.fail_on == Some(EntityKind::Lap) {
                return Err(IngestError::sink(EntityKind::Lap, "store unavailable"));
            }
            Ok(laps.len())
        }
    }

    const TCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
  <Activities>
    <Activity Sport="Running">
      <Lap StartTime="2021-05-01T10:00:00Z">
        <DistanceMeters>1000</DistanceMeters>
        <Track>
          <Trackpoint>
            <Time>2021-05-01T10:00:00Z</Time>
            <Position><LatitudeDegrees>51.5</LatitudeDegrees><LongitudeDegrees>-0.1</LongitudeDegrees></Position>
          </Trackpoint>
          <Trackpoint>
            <Time>2021-05-01T10:00:05Z</Time>
            <Position><LatitudeDegrees>51.6</LatitudeDegrees><LongitudeDegrees>-0.2</LongitudeDegrees></Position>
          </Trackpoint>
        </Track>
      </Lap>
    </Activity>
  </Activities>
</TrainingCenterDatabase>"#;

    fn temp_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_tcx_end_to_end() {
        let file = temp_file(TCX, ".tcx");
        let mut sink = MemorySink::new();

        let summary = PipelineRunner::new()
            .run(file.path(), "tcx", EntryStamp::new(11, 22), &mut sink)
            .unwrap();

        assert_eq!(summary.format, FileFormat::Tcx);
        assert_eq!(summary.points_persisted, 2);
        assert_eq!(summary.laps_persisted, 1);

        assert_eq!(sink.laps.len(), 1);
        assert_eq!(sink.laps[0].number, Some(1));
        assert_eq!(sink.laps[0].total_distance, Some(1000.0));
        assert_eq!(sink.points.len(), 2);
        assert!(sink.points.iter().all(|p| p.lap_number == Some(1)));
        assert!(sink.points.iter().all(|p| p.owner_id == 11 && p.entry_id == 22));
        assert_eq!(sink.batches, vec![EntityKind::Point, EntityKind::Lap]);
    }

    #[test]
    fn test_unsupported_extension_never_touches_sink() {
        let file = temp_file(TCX, ".xyz");
        let mut sink = FailingSink::default();

        let err = PipelineRunner::new()
            .run(file.path(), "xyz", EntryStamp::new(1, 1), &mut sink)
            .unwrap_err();

        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_failed_points_write_skips_laps() {
        let file = temp_file(TCX, ".tcx");
        let mut sink = FailingSink {
            fail_on: Some(EntityKind::Point),
            ..FailingSink::default()
        };

        let err = PipelineRunner::new()
            .run_file(file.path(), EntryStamp::new(1, 1), &mut sink)
            .unwrap_err();

        assert!(matches!(err, IngestError::Sink { kind: EntityKind::Point, .. }));
        assert_eq!(sink.calls, vec![EntityKind::Point]);
    }

    #[test]
    fn test_failed_laps_write_keeps_points() {
        let file = temp_file(TCX, ".tcx");
        let mut sink = FailingSink {
            fail_on: Some(EntityKind::Lap),
            ..FailingSink::default()
        };

        let result = PipelineRunner::new().run_file(file.path(), EntryStamp::new(1, 1), &mut sink);

        assert!(matches!(result, Err(IngestError::Sink { kind: EntityKind::Lap, .. })));
        assert_eq!(sink.calls, vec![EntityKind::Point, EntityKind::Lap]);
    }

    #[test]
    fn test_csv_run_skips_empty_points_batch() {
        let file = temp_file("Distance,Time,Moving Time\n5.0,00:10:00,00:09:30\n", ".csv");
        let mut sink = FailingSink::default();

        let summary = PipelineRunner::new()
            .run_file(file.path(), EntryStamp::new(1, 1), &mut sink)
            .unwrap();

        assert_eq!(summary.points_persisted, 0);
        assert_eq!(summary.laps_persisted, 1);
        assert_eq!(sink.calls, vec![EntityKind::Lap]);
    }

    #[test]
    fn test_decode_error_aborts_before_persist() {
        let file = temp_file("Distance,Time\n5.0,00:10:00\n", ".csv");
        let mut sink = FailingSink::default();

        let result = PipelineRunner::new().run(file.path(), "csv", EntryStamp::new(1, 1), &mut sink);

        assert!(matches!(result, Err(IngestError::MalformedRequiredField { .. })));
        assert!(sink.calls.is_empty());
    }
}
