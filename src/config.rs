//! Configuration management and validation.
//!
//! Provides the batch ingestion settings and the Parquet sink options. A
//! configuration can be loaded from a TOML file; command-line flags are
//! applied on top of it by the binary.

use crate::error::{IngestError, Result};
use polars::prelude::{ParquetCompression, StatisticsOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(IngestError::Configuration {
                message: format!(
                    "unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionAlgorithm::Snappy => "snappy",
            CompressionAlgorithm::Zstd => "zstd",
            CompressionAlgorithm::Lz4 => "lz4",
            CompressionAlgorithm::Uncompressed => "none",
        };
        f.write_str(name)
    }
}

/// Parquet sink write options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParquetSinkConfig {
    /// Compression algorithm selection
    pub compression: CompressionAlgorithm,

    /// Enable column statistics for query pruning
    pub enable_statistics: bool,

    /// Rows per row group; `None` leaves the polars default
    pub row_group_size: Option<usize>,
}

impl Default for ParquetSinkConfig {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
            row_group_size: None,
        }
    }
}

impl ParquetSinkConfig {
    pub fn statistics(&self) -> StatisticsOptions {
        if self.enable_statistics {
            StatisticsOptions::default()
        } else {
            StatisticsOptions::empty()
        }
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn without_statistics(mut self) -> Self {
        self.enable_statistics = false;
        self
    }

    pub fn with_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = Some(rows);
        self
    }
}

/// Global configuration for batch ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum concurrent file processing
    pub max_concurrent_files: usize,

    /// Parquet output settings
    pub parquet: ParquetSinkConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: num_cpus::get(),
            parquet: ParquetSinkConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Load configuration from a TOML file. Keys left out keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IngestError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| IngestError::Configuration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(IngestError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }
        if self.parquet.row_group_size == Some(0) {
            return Err(IngestError::Configuration {
                message: "parquet.row_group_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Configure parquet output settings
    pub fn with_parquet(mut self, parquet: ParquetSinkConfig) -> Self {
        self.parquet = parquet;
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.parquet.compression = compression;
        self
    }
}
