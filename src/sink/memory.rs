//! In-process entity collector

use super::EntitySink;
use crate::error::Result;
use crate::models::{EntityKind, Lap, Point};

/// Collects persisted entities in memory, recording the order of calls
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub points: Vec<Point>,
    pub laps: Vec<Lap>,
    /// Entity kind of each non-empty batch, in call order
    pub batches: Vec<EntityKind>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntitySink for MemorySink {
    fn persist_points(&mut self, points: &[Point]) -> Result<usize> {
        if !points.is_empty() {
            self.batches.push(EntityKind::Point);
            self.points.extend_from_slice(points);
        }
        Ok(points.len())
    }

    fn persist_laps(&mut self, laps: &[Lap]) -> Result<usize> {
        if !laps.is_empty() {
            self.batches.push(EntityKind::Lap);
            self.laps.extend_from_slice(laps);
        }
        Ok(laps.len())
    }
}
