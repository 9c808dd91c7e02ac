//! Entity persistence
//!
//! A sink accepts homogeneous batches of one entity kind. The pipeline only
//! ever calls it with non-empty batches, but every sink also treats an empty
//! batch as a no-op.

pub mod memory;
pub mod parquet;

pub use memory::MemorySink;
pub use parquet::ParquetSink;

use crate::error::Result;
use crate::mapper::Entities;
use crate::models::{Lap, Point};

/// Bulk persistence of decoded entities
pub trait EntitySink {
    /// Persist a batch of points, returning the number written
    fn persist_points(&mut self, points: &[Point]) -> Result<usize>;

    /// Persist a batch of laps, returning the number written
    fn persist_laps(&mut self, laps: &[Lap]) -> Result<usize>;

    /// Persist a tagged batch through the matching typed method
    fn persist(&mut self, entities: &Entities) -> Result<usize> {
        match entities {
            Entities::Points(points) => self.persist_points(points),
            Entities::Laps(laps) => self.persist_laps(laps),
        }
    }
}
