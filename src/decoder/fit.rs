//! FIT binary protocol decoder
//!
//! Messages are read with `fitparser`, reduced to [`Frame`] values, and
//! folded in file order. Lap numbering follows the lap frames: records seen
//! before a lap frame belong to that lap, and the lap frame closes it.

use super::fields::semicircles_to_degrees;
use super::Decoder;
use crate::error::Result;
use crate::models::{DecodedActivity, FileFormat, LapRow, PointRow};
use chrono::{DateTime, Utc};
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Message kinds the decoder distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Record,
    Lap,
    Other,
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Time(DateTime<Utc>),
}

/// One FIT data message, reduced to named numeric and time fields
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub kind: FrameKind,
    fields: HashMap<String, FieldValue>,
}

impl Frame {
    pub fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            fields: HashMap::new(),
        }
    }

    pub fn with_number(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), FieldValue::Number(value));
        self
    }

    pub fn with_time(mut self, name: &str, value: DateTime<Utc>) -> Self {
        self.fields.insert(name.to_string(), FieldValue::Time(value));
        self
    }

    /// Build a frame from a parsed FIT message, keeping fields with a
    /// numeric or timestamp value.
    pub fn from_record(record: &FitDataRecord) -> Self {
        let kind = match record.kind() {
            MesgNum::Record => FrameKind::Record,
            MesgNum::Lap => FrameKind::Lap,
            _ => FrameKind::Other,
        };

        let fields = record
            .fields()
            .iter()
            .filter_map(|field| field_value(field.value()).map(|v| (field.name().to_string(), v)))
            .collect();

        Self { kind, fields }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn time(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.fields.get(name) {
            Some(FieldValue::Time(value)) => Some(*value),
            _ => None,
        }
    }

    /// Primary field, falling back to its `enhanced_` counterpart
    fn number_or_enhanced(&self, name: &str) -> Option<f64> {
        self.number(name)
            .or_else(|| self.number(&format!("enhanced_{}", name)))
    }
}

fn field_value(value: &Value) -> Option<FieldValue> {
    let number = match value {
        Value::Timestamp(ts) => return Some(FieldValue::Time(ts.with_timezone(&Utc))),
        Value::Float64(v) => *v,
        Value::Float32(v) => f64::from(*v),
        Value::SInt8(v) => f64::from(*v),
        Value::UInt8(v) | Value::UInt8z(v) => f64::from(*v),
        Value::SInt16(v) => f64::from(*v),
        Value::UInt16(v) | Value::UInt16z(v) => f64::from(*v),
        Value::SInt32(v) => f64::from(*v),
        Value::UInt32(v) | Value::UInt32z(v) => f64::from(*v),
        Value::SInt64(v) => *v as f64,
        Value::UInt64(v) | Value::UInt64z(v) => *v as f64,
        _ => return None,
    };
    Some(FieldValue::Number(number))
}

/// Extract a point from a `record` frame; `None` unless both position
/// fields are present.
fn point_from_record(frame: &Frame) -> Option<PointRow> {
    let latitude = frame.number("position_lat")?;
    let longitude = frame.number("position_long")?;

    Some(PointRow {
        altitude: frame.number_or_enhanced("altitude"),
        timestamp: frame.time("timestamp"),
        heart_rate: frame.number("heart_rate"),
        cadence: frame.number("cadence"),
        speed: frame.number_or_enhanced("speed"),
        ..PointRow::at(
            semicircles_to_degrees(latitude),
            semicircles_to_degrees(longitude),
        )
    })
}

fn lap_from_frame(frame: &Frame) -> LapRow {
    LapRow {
        number: None,
        start_time: frame.time("start_time"),
        total_distance: frame.number("total_distance"),
        total_elapsed_time: frame.number("total_elapsed_time"),
        max_speed: frame.number_or_enhanced("max_speed"),
        max_heart_rate: frame.number("max_heart_rate"),
        avg_heart_rate: frame.number("avg_heart_rate"),
    }
}

/// Accumulator carried through the frame stream
#[derive(Debug)]
pub struct LapFold {
    current_lap: u32,
    laps: Vec<LapRow>,
    points: Vec<PointRow>,
    dropped: usize,
}

impl Default for LapFold {
    fn default() -> Self {
        Self {
            current_lap: 1,
            laps: Vec::new(),
            points: Vec::new(),
            dropped: 0,
        }
    }
}

impl LapFold {
    pub fn step(mut self, frame: Frame) -> Self {
        match frame.kind {
            FrameKind::Record => match point_from_record(&frame) {
                Some(point) => self.points.push(PointRow {
                    lap_number: Some(self.current_lap),
                    ..point
                }),
                None => self.dropped += 1,
            },
            FrameKind::Lap => {
                self.laps.push(LapRow {
                    number: Some(self.current_lap),
                    ..lap_from_frame(&frame)
                });
                self.current_lap += 1;
            }
            FrameKind::Other => {}
        }
        self
    }

    pub fn finish(self) -> DecodedActivity {
        DecodedActivity {
            format: FileFormat::Fit,
            laps: self.laps,
            points: self.points,
            dropped_points: self.dropped,
        }
    }
}

/// Fold a frame stream into lap and point rows
pub fn decode_frames<I>(frames: I) -> DecodedActivity
where
    I: IntoIterator<Item = Frame>,
{
    frames
        .into_iter()
        .fold(LapFold::default(), LapFold::step)
        .finish()
}

/// Decoder for `.fit` files
#[derive(Debug, Default, Clone, Copy)]
pub struct FitDecoder;

impl Decoder for FitDecoder {
    fn format(&self) -> FileFormat {
        FileFormat::Fit
    }

    fn decode(&self, path: &Path) -> Result<DecodedActivity> {
        info!("Decoding FIT file: {}", path.display());

        let mut file = File::open(path)?;
        let records = fitparser::from_reader(&mut file)?;
        debug!("Read {} FIT messages", records.len());

        let activity = decode_frames(records.iter().map(Frame::from_record));
        debug!(
            "FIT decode: {} laps, {} points, {} records without position",
            activity.laps.len(),
            activity.points.len(),
            activity.dropped_points
        );

        Ok(activity)
    }
}
