//! Row-to-entity mapping.
//!
//! Decoder rows become persisted entities by stamping owner and entry
//! identifiers. The table kind travels with the rows, so an empty table maps
//! to an empty entity list of the right kind.

use crate::models::{EntityKind, EntryStamp, Lap, LapRow, Point, PointRow};

/// A decoder output table tagged with its kind
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    Points(Vec<PointRow>),
    Laps(Vec<LapRow>),
}

/// Stamped entities of a single kind
#[derive(Debug, Clone, PartialEq)]
pub enum Entities {
    Points(Vec<Point>),
    Laps(Vec<Lap>),
}

impl Entities {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entities::Points(_) => EntityKind::Point,
            Entities::Laps(_) => EntityKind::Lap,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Entities::Points(points) => points.len(),
            Entities::Laps(laps) => laps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Map a tagged table to entities stamped with `stamp`
pub fn to_entities(table: Table, stamp: EntryStamp) -> Entities {
    match table {
        Table::Points(rows) => Entities::Points(to_points(rows, stamp)),
        Table::Laps(rows) => Entities::Laps(to_laps(rows, stamp)),
    }
}

pub fn to_points(rows: Vec<PointRow>, stamp: EntryStamp) -> Vec<Point> {
    rows.into_iter()
        .map(|row| Point {
            owner_id: stamp.owner_id,
            entry_id: stamp.entry_id,
            latitude: row.latitude,
            longitude: row.longitude,
            altitude: row.altitude,
            timestamp: row.timestamp,
            heart_rate: row.heart_rate,
            cadence: row.cadence,
            speed: row.speed,
            lap_number: row.lap_number,
        })
        .collect()
}

pub fn to_laps(rows: Vec<LapRow>, stamp: EntryStamp) -> Vec<Lap> {
    rows.into_iter()
        .map(|row| Lap {
            owner_id: stamp.owner_id,
            entry_id: stamp.entry_id,
            number: row.number,
            start_time: row.start_time,
            total_distance: row.total_distance,
            total_elapsed_time: row.total_elapsed_time,
            max_speed: row.max_speed,
            max_heart_rate: row.max_heart_rate,
            avg_heart_rate: row.avg_heart_rate,
        })
        .collect()
}
