//! Command-line interface components.

use crate::config::{CompressionAlgorithm, IngestConfig};
use crate::error::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "activity-ingest")]
#[command(about = "Decode FIT, GPX, TCX and CSV activity exports into track point and lap Parquet tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Export files or directories to ingest
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for Parquet files
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Owner identifier stamped onto every entity
    #[arg(long)]
    pub owner_id: i64,

    /// Entry identifier of the first file; later files count up from it
    #[arg(long, default_value_t = 1)]
    pub entry_id_start: i64,

    /// Declared extension for every input (csv, fit, gpx, tcx) instead of the file name's
    #[arg(long, value_name = "EXT")]
    pub format: Option<String>,

    /// TOML configuration file; flags given here take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, value_parser = parse_compression)]
    pub compression: Option<CompressionAlgorithm>,

    /// Maximum number of files ingested concurrently
    #[arg(long)]
    pub max_concurrent_files: Option<usize>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Load the configuration file, if any, and apply command-line overrides
    pub fn load_config(&self) -> Result<IngestConfig> {
        let mut config = match &self.config {
            Some(path) => IngestConfig::from_toml_file(path)?,
            None => IngestConfig::default(),
        };

        if let Some(compression) = self.compression {
            config = config.with_compression(compression);
        }
        if let Some(max_files) = self.max_concurrent_files {
            config = config.with_max_concurrent_files(max_files);
        }

        config.validate()?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }
}

fn parse_compression(value: &str) -> std::result::Result<CompressionAlgorithm, String> {
    value.parse().map_err(|e: crate::error::IngestError| e.to_string())
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("activity_ingest={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}
