//! Batch ingestion engine.
//!
//! Runs one independent pipeline per input file on blocking worker tasks,
//! with bounded concurrency. Each file gets its own entry identifier, its own
//! Parquet sink, and a single line in the summary when it fails.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use self::discovery::FileDiscovery;

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::models::{EntryStamp, ProcessingStats, RunSummary};
use crate::pipeline::PipelineRunner;
use crate::sink::ParquetSink;

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tokio::task;
use tracing::{debug, error};

/// One file scheduled for ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestJob {
    pub path: PathBuf,
    pub stamp: EntryStamp,
    /// Declared extension; taken from the file name when `None`
    pub extension: Option<String>,
}

/// Main processor for batch activity ingestion
#[derive(Debug)]
pub struct BatchProcessor {
    output_dir: PathBuf,
    owner_id: i64,
    entry_id_start: i64,
    format: Option<String>,
    config: IngestConfig,
    show_progress: bool,
}

impl BatchProcessor {
    /// Create a new batch processor writing under `output_dir`
    pub fn new(output_dir: PathBuf, owner_id: i64) -> Self {
        Self {
            output_dir,
            owner_id,
            entry_id_start: 1,
            format: None,
            config: IngestConfig::default(),
            show_progress: true,
        }
    }

    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// First entry identifier; later files count up from it
    pub fn with_entry_id_start(mut self, entry_id_start: i64) -> Self {
        self.entry_id_start = entry_id_start;
        self
    }

    /// Declare every input as this extension instead of reading it from the name
    pub fn with_format(mut self, extension: impl Into<String>) -> Self {
        self.format = Some(extension.into());
        self
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Assign entry identifiers to files in order
    pub fn plan(&self, files: Vec<PathBuf>) -> Vec<IngestJob> {
        files
            .into_iter()
            .zip(self.entry_id_start..)
            .map(|(path, entry_id)| IngestJob {
                path,
                stamp: EntryStamp::new(self.owner_id, entry_id),
                extension: self.format.clone(),
            })
            .collect()
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        // Falls back to the default style if the template fails to parse
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Ingesting files");
        pb
    }

    /// Discover files under `inputs` and ingest them all
    pub async fn process(&self, inputs: &[PathBuf]) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        println!("{}", "Starting activity ingestion".bright_green().bold());
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.output_dir.display()
        );

        println!("\n{}", "Discovering export files...".bright_yellow());
        let mut discovery = FileDiscovery::new();
        let files = discovery.discover(inputs)?;
        println!(
            "  {} {} files ({} skipped)",
            "Found".bright_green(),
            files.len().to_string().bright_white().bold(),
            discovery.skipped_count()
        );

        if files.is_empty() {
            return Ok(ProcessingStats {
                output_path: self.output_dir.clone(),
                processing_time_ms: start_time.elapsed().as_millis(),
                ..ProcessingStats::default()
            });
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;

        println!("\n{}", "Ingesting files...".bright_yellow());
        let mut stats = self.run_jobs(self.plan(files)).await;
        stats.processing_time_ms = start_time.elapsed().as_millis();

        self.print_summary(&stats);
        Ok(stats)
    }

    /// Run planned jobs concurrently, counting failures instead of stopping
    pub async fn run_jobs(&self, jobs: Vec<IngestJob>) -> ProcessingStats {
        let concurrent_limit = self.config.max_concurrent_files.clamp(1, jobs.len().max(1));
        debug!(
            "Running {} jobs with concurrency {}",
            jobs.len(),
            concurrent_limit
        );

        let pb = self.progress_bar(jobs.len());

        let initial = ProcessingStats {
            output_path: self.output_dir.clone(),
            ..ProcessingStats::default()
        };

        let stats = stream::iter(jobs)
            .map(|job| {
                let pb = pb.clone();
                let sink = ParquetSink::new(self.output_dir.clone(), self.config.parquet.clone());
                async move {
                    if let Some(file_name) = job.path.file_name() {
                        pb.set_message(format!("Ingesting: {}", file_name.to_string_lossy()));
                    }

                    let path = job.path.clone();
                    let result = task::spawn_blocking(move || run_job(job, sink))
                        .await
                        .unwrap_or_else(|e| {
                            Err(IngestError::Io(std::io::Error::other(format!(
                                "ingestion task failed: {}",
                                e
                            ))))
                        });
                    pb.inc(1);

                    if let Err(e) = &result {
                        error!("Failed to ingest {}: {}", path.display(), e);
                    }
                    result
                }
            })
            .buffer_unordered(concurrent_limit)
            .fold(initial, |mut stats, result| async move {
                match result {
                    Ok(summary) => stats.record(&summary),
                    Err(_) => stats.files_failed += 1,
                }
                stats
            })
            .await;

        pb.finish_with_message("Ingestion complete");
        stats
    }

    fn print_summary(&self, stats: &ProcessingStats) {
        println!("\n{}", "Ingestion Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Files ingested:".bright_cyan(),
            stats.files_processed.to_string().bright_white()
        );
        if stats.files_failed > 0 {
            println!(
                "  {} {}",
                "Files failed:".bright_red(),
                stats.files_failed.to_string().bright_red().bold()
            );
        }
        println!(
            "  {} {}",
            "Points:".bright_cyan(),
            stats.total_points.to_string().bright_white().bold()
        );
        println!(
            "  {} {}",
            "Laps:".bright_cyan(),
            stats.total_laps.to_string().bright_white().bold()
        );
        if stats.points_dropped > 0 {
            println!(
                "  {} {}",
                "Samples without position:".bright_yellow(),
                stats.points_dropped
            );
        }
    }
}

fn run_job(job: IngestJob, mut sink: ParquetSink) -> Result<RunSummary> {
    let runner = PipelineRunner::new();
    match &job.extension {
        Some(extension) => runner.run(&job.path, extension, job.stamp, &mut sink),
        None => runner.run_file(&job.path, job.stamp, &mut sink),
    }
}
