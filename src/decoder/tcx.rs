//! Training Center XML (TCX) decoder
//!
//! Only the first `Activity` is read. Laps are numbered by document order,
//! which is taken to be their chronological order; the document is not
//! checked for laps whose `StartTime` runs backwards.

use super::fields::{child, children, optional_child_number, parse_number, require_timestamp, text_of};
use super::Decoder;
use crate::error::{IngestError, Result};
use crate::models::{DecodedActivity, FileFormat, LapRow, PointRow};
use roxmltree::{Document, Node};
use std::path::Path;
use tracing::{debug, info};

/// Training Center Database v2, the document namespace
pub const TCD_NS: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
pub const USER_PROFILE_NS: &str = "http://www.garmin.com/xmlschemas/UserProfile/v2";
/// Activity extensions, home of the per-trackpoint `Speed`
pub const ACTIVITY_EXT_NS: &str = "http://www.garmin.com/xmlschemas/ActivityExtension/v2";
pub const PROFILE_EXT_NS: &str = "http://www.garmin.com/xmlschemas/ProfileExtension/v1";
pub const ACTIVITY_GOALS_NS: &str = "http://www.garmin.com/xmlschemas/ActivityGoals/v1";

/// Prefixes conventionally declared by TCX writers
pub const NAMESPACES: [(&str, &str); 5] = [
    ("ns", TCD_NS),
    ("ns2", USER_PROFILE_NS),
    ("ns3", ACTIVITY_EXT_NS),
    ("ns4", PROFILE_EXT_NS),
    ("ns5", ACTIVITY_GOALS_NS),
];

/// Decoder for `.tcx` files
#[derive(Debug, Default, Clone, Copy)]
pub struct TcxDecoder;

impl TcxDecoder {
    /// Decode TCX document text
    pub fn decode_str(&self, path: &Path, content: &str) -> Result<DecodedActivity> {
        let document = Document::parse(content)?;
        let activity = first_activity(&document)
            .ok_or_else(|| IngestError::missing_field(path, "Activities/Activity"))?;

        let mut decoded = DecodedActivity::new(FileFormat::Tcx);

        for (index, lap) in children(activity, TCD_NS, "Lap").enumerate() {
            let lap_no = index as u32 + 1;
            decoded.laps.push(LapRow {
                number: Some(lap_no),
                ..lap_summary(path, lap)?
            });

            for track in children(lap, TCD_NS, "Track") {
                for trackpoint in children(track, TCD_NS, "Trackpoint") {
                    match trackpoint_row(path, trackpoint)? {
                        Some(point) => decoded.points.push(PointRow {
                            lap_number: Some(lap_no),
                            ..point
                        }),
                        None => decoded.dropped_points += 1,
                    }
                }
            }
        }

        debug!(
            "TCX decode: {} laps, {} points, {} trackpoints without position",
            decoded.laps.len(),
            decoded.points.len(),
            decoded.dropped_points
        );

        Ok(decoded)
    }
}

impl Decoder for TcxDecoder {
    fn format(&self) -> FileFormat {
        FileFormat::Tcx
    }

    fn decode(&self, path: &Path) -> Result<DecodedActivity> {
        info!("Decoding TCX file: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        self.decode_str(path, &content)
    }
}

fn first_activity<'a, 'input>(document: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    let activities = child(document.root_element(), TCD_NS, "Activities")?;
    child(activities, TCD_NS, "Activity")
}

/// Value of a `<X><Value>n</Value></X>` heart-rate style element
fn nested_value(path: &Path, node: Node<'_, '_>, name: &str) -> Result<Option<f64>> {
    match child(node, TCD_NS, name) {
        Some(elem) => {
            let value = child(elem, TCD_NS, "Value")
                .ok_or_else(|| IngestError::missing_field(path, format!("{}/Value", name)))?;
            parse_number(path, name, text_of(value)).map(Some)
        }
        None => Ok(None),
    }
}

fn lap_summary(path: &Path, lap: Node<'_, '_>) -> Result<LapRow> {
    let start_time = lap
        .attribute("StartTime")
        .ok_or_else(|| IngestError::missing_field(path, "Lap/@StartTime"))?;

    Ok(LapRow {
        number: None,
        start_time: Some(require_timestamp(path, "StartTime", start_time)?),
        total_distance: optional_child_number(path, lap, TCD_NS, "DistanceMeters")?,
        total_elapsed_time: optional_child_number(path, lap, TCD_NS, "TotalTimeSeconds")?,
        max_speed: optional_child_number(path, lap, TCD_NS, "MaximumSpeed")?,
        max_heart_rate: nested_value(path, lap, "MaximumHeartRateBpm")?,
        avg_heart_rate: nested_value(path, lap, "AverageHeartRateBpm")?,
    })
}

/// Extract a trackpoint; `None` when it has no `Position`
fn trackpoint_row(path: &Path, trackpoint: Node<'_, '_>) -> Result<Option<PointRow>> {
    let Some(position) = child(trackpoint, TCD_NS, "Position") else {
        return Ok(None);
    };

    let coordinate = |name: &str| -> Result<f64> {
        let elem = child(position, TCD_NS, name)
            .ok_or_else(|| IngestError::missing_field(path, format!("Position/{}", name)))?;
        parse_number(path, name, text_of(elem))
    };
    let latitude = coordinate("LatitudeDegrees")?;
    let longitude = coordinate("LongitudeDegrees")?;

    let time = child(trackpoint, TCD_NS, "Time")
        .ok_or_else(|| IngestError::missing_field(path, "Trackpoint/Time"))?;

    let speed = trackpoint
        .descendants()
        .find(|n| n.is_element() && n.has_tag_name((ACTIVITY_EXT_NS, "Speed")))
        .map(|elem| parse_number(path, "Speed", text_of(elem)))
        .transpose()?;

    Ok(Some(PointRow {
        altitude: optional_child_number(path, trackpoint, TCD_NS, "AltitudeMeters")?,
        timestamp: Some(require_timestamp(path, "Time", text_of(time))?),
        heart_rate: nested_value(path, trackpoint, "HeartRateBpm")?,
        cadence: optional_child_number(path, trackpoint, TCD_NS, "Cadence")?,
        speed,
        ..PointRow::at(latitude, longitude)
    }))
}
