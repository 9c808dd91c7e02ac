//! Integration tests for the processor module
//!
//! Runs the batch processor over small upload directories built in a
//! temporary location.

use std::fs;
use std::path::{Path, PathBuf};


pub const TCX_RUN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
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

pub const GPX_RIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="47.0" lon="8.0"><ele>410</ele></trkpt>
    <trkpt lat="47.1" lon="8.1"><ele>412</ele></trkpt>
    <trkpt lat="47.2" lon="8.2"><ele>415</ele></trkpt>
  </trkseg></trk>
</gpx>"#;

pub const CSV_SPLITS: &str = "Distance,Time,Moving Time\n1.0,05:10,05:00\n1.0,05:20,05:05\n";

/// Helper to write a file, creating parent directories
pub fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
