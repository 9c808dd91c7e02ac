//! Activity Ingest Library
//!
//! Decodes fitness-tracker exports in four formats into two normalized
//! record kinds, track points and laps, and persists them in batches.
//!
//! This library provides tools for:
//! - Decoding FIT, GPX, TCX and CSV lap exports with one decoder per format
//! - Reconstructing lap boundaries and tagging points with their lap number
//! - Stamping decoded rows with owner and entry identifiers
//! - Persisting entity batches to memory or to Parquet files
//! - Ingesting whole upload directories concurrently from the command line

pub mod cli;
pub mod config;
pub mod decoder;
pub mod error;
pub mod mapper;
pub mod models;
pub mod pipeline;
pub mod processor;
pub mod sink;

pub use config::IngestConfig;
pub use decoder::{Decoder, resolve};
pub use error::{IngestError, Result};
pub use mapper::{Entities, Table};
pub use models::{DecodedActivity, EntryStamp, FileFormat, Lap, LapRow, Point, PointRow, RunSummary};
pub use pipeline::PipelineRunner;
pub use sink::{EntitySink, MemorySink, ParquetSink};
