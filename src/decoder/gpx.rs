//! GPX decoder
//!
//! Reads the first segment of the first track. GPX has no laps, so every
//! point leaves `lap_number` unset and the lap table stays empty.

use super::fields::{child, parse_number, require_timestamp, text_of};
use super::Decoder;
use crate::error::{IngestError, Result};
use crate::models::{DecodedActivity, FileFormat, PointRow};
use roxmltree::{Document, Node};
use std::path::Path;
use tracing::{debug, info};

/// Garmin TrackPointExtension v1, carrying `hr` and `cad`
pub const TRACKPOINT_EXT_NS: &str = "http://www.garmin.com/xmlschemas/TrackPointExtension/v1";

/// Decoder for `.gpx` files
#[derive(Debug, Default, Clone, Copy)]
pub struct GpxDecoder;

impl GpxDecoder {
    /// Decode GPX document text
    pub fn decode_str(&self, path: &Path, content: &str) -> Result<DecodedActivity> {
        let document = Document::parse(content)?;
        let root = document.root_element();

        let track = first_named(root, "trk").ok_or_else(|| IngestError::missing_field(path, "trk"))?;
        let segment =
            first_named(track, "trkseg").ok_or_else(|| IngestError::missing_field(path, "trk/trkseg"))?;

        let mut decoded = DecodedActivity::new(FileFormat::Gpx);
        for trkpt in segment
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "trkpt")
        {
            decoded.points.push(point_row(path, trkpt)?);
        }

        debug!("GPX decode: {} points", decoded.points.len());
        Ok(decoded)
    }
}

impl Decoder for GpxDecoder {
    fn format(&self) -> FileFormat {
        FileFormat::Gpx
    }

    fn decode(&self, path: &Path) -> Result<DecodedActivity> {
        info!("Decoding GPX file: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        self.decode_str(path, &content)
    }
}

/// First element child by local name, so GPX 1.0 and 1.1 documents both match
fn first_named<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn point_row(path: &Path, trkpt: Node<'_, '_>) -> Result<PointRow> {
    let attribute = |name: &str| -> Result<f64> {
        let value = trkpt
            .attribute(name)
            .ok_or_else(|| IngestError::missing_field(path, format!("trkpt/@{}", name)))?;
        parse_number(path, name, value)
    };

    let altitude = first_named(trkpt, "ele")
        .map(|ele| parse_number(path, "ele", text_of(ele)))
        .transpose()?;
    let timestamp = first_named(trkpt, "time")
        .map(|time| require_timestamp(path, "time", text_of(time)))
        .transpose()?;

    let (heart_rate, cadence) = match first_named(trkpt, "extensions") {
        Some(extensions) => extension_metrics(path, extensions)?,
        None => (None, None),
    };

    Ok(PointRow {
        altitude,
        timestamp,
        heart_rate,
        cadence,
        ..PointRow::at(attribute("lat")?, attribute("lon")?)
    })
}

/// Heart rate and cadence from the first extension element only
fn extension_metrics(path: &Path, extensions: Node<'_, '_>) -> Result<(Option<f64>, Option<f64>)> {
    let Some(extension) = extensions.children().find(|n| n.is_element()) else {
        return Ok((None, None));
    };

    let metric = |name: &str| -> Result<Option<f64>> {
        child(extension, TRACKPOINT_EXT_NS, name)
            .map(|elem| parse_number(path, name, text_of(elem)))
            .transpose()
    };

    Ok((metric("hr")?, metric("cad")?))
}
