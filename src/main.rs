use activity_ingest::cli::{Args, setup_logging};
use activity_ingest::processor::BatchProcessor;
use anyhow::{Context, Result};
use clap::Parser;
use std::process;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(args)) {
        Ok(files_failed) if files_failed > 0 => process::exit(1),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Ingest every input and return the number of files that failed
async fn run(args: Args) -> Result<usize> {
    let config = args.load_config().context("Failed to load configuration")?;

    let mut processor = BatchProcessor::new(args.output_dir.clone(), args.owner_id)
        .with_entry_id_start(args.entry_id_start)
        .with_config(config);
    if let Some(format) = &args.format {
        processor = processor.with_format(format.clone());
    }

    let stats = processor
        .process(&args.inputs)
        .await
        .context("Ingestion failed")?;

    Ok(stats.files_failed)
}
