//! Format decoders for fitness-tracker exports
//!
//! Each supported export format has its own decoder producing the same
//! [`DecodedActivity`] shape: ordered lap rows and ordered point rows.
//!
//! ## Architecture
//!
//! - [`fit`] - binary FIT protocol, lap boundaries from `lap` frames
//! - [`tcx`] - Training Center XML, laps and trackpoints nested per lap
//! - [`gpx`] - GPX track points with Garmin heart-rate/cadence extensions
//! - [`tabular`] - CSV export with one lap summary per row
//! - [`fields`] - shared field parsing helpers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use activity_ingest::decoder::resolve;
//!
//! # fn example() -> activity_ingest::Result<()> {
//! let decoder = resolve("tcx")?;
//! let activity = decoder.decode(std::path::Path::new("morning_run.tcx"))?;
//! println!("{} laps, {} points", activity.laps.len(), activity.points.len());
//! # Ok(())
//! # }
//! ```

pub mod fields;
pub mod fit;
pub mod gpx;
pub mod tabular;
pub mod tcx;

#[cfg(test)]
pub mod tests;

pub use fit::FitDecoder;
pub use gpx::GpxDecoder;
pub use tabular::TabularDecoder;
pub use tcx::TcxDecoder;

use crate::error::{IngestError, Result};
use crate::models::{DecodedActivity, FileFormat};
use std::path::Path;

/// A decoder for one export format
pub trait Decoder: Send + Sync {
    /// The format this decoder reads
    fn format(&self) -> FileFormat;

    /// Decode a whole file into lap and point rows in a single forward pass
    fn decode(&self, path: &Path) -> Result<DecodedActivity>;
}

impl FileFormat {
    /// The decoder for this format
    pub fn decoder(&self) -> Box<dyn Decoder> {
        match self {
            FileFormat::Csv => Box::new(TabularDecoder),
            FileFormat::Fit => Box::new(FitDecoder),
            FileFormat::Gpx => Box::new(GpxDecoder),
            FileFormat::Tcx => Box::new(TcxDecoder),
        }
    }
}

/// Select the decoder for a declared file extension.
///
/// Only `csv`, `fit`, `gpx` and `tcx` are accepted, matched case-sensitively.
pub fn resolve(extension: &str) -> Result<Box<dyn Decoder>> {
    FileFormat::from_extension(extension)
        .map(|format| format.decoder())
        .ok_or_else(|| IngestError::unsupported_format(extension))
}
