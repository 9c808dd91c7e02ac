//! Test utilities and fixture builders for the format decoders
//!
//! Builds small TCX, GPX and CSV documents in memory so each decoder test can
//! state exactly which elements are present.

use std::io::Write;
use tempfile::NamedTempFile;

use super::tcx::NAMESPACES;

// Test modules
mod fit_tests;

/// Wrap activity body markup in a TCX document declaring the usual prefixes
pub fn tcx_document(activity_body: &str) -> String {
    let declarations: String = NAMESPACES
        .iter()
        .map(|(prefix, uri)| format!(" xmlns:{}=\"{}\"", prefix, uri))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ns:TrainingCenterDatabase{declarations}>
  <ns:Activities>
    <ns:Activity Sport="Running">
      <ns:Id>2021-05-01T10:00:00Z</ns:Id>
{activity_body}
    </ns:Activity>
  </ns:Activities>
</ns:TrainingCenterDatabase>"#
    )
}

/// TCX trackpoint with position, time and optional extras
pub fn tcx_trackpoint(time: &str, lat: f64, lon: f64, extras: &str) -> String {
    format!(
        r#"<ns:Trackpoint>
  <ns:Time>{time}</ns:Time>
  <ns:Position>
    <ns:LatitudeDegrees>{lat}</ns:LatitudeDegrees>
    <ns:LongitudeDegrees>{lon}</ns:LongitudeDegrees>
  </ns:Position>
  {extras}
</ns:Trackpoint>"#
    )
}

/// Wrap track body markup in a GPX 1.1 document with the Garmin extension prefix
pub fn gpx_document(segment_body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test"
     xmlns="http://www.topografix.com/GPX/1/1"
     xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
  <trk>
    <name>Morning Ride</name>
    <trkseg>
{segment_body}
    </trkseg>
  </trk>
</gpx>"#
    )
}

/// Helper to create a temporary file with given content and suffix
pub fn create_temp_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut temp_file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(temp_file, "{}", content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}
