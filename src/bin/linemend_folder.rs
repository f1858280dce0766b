// Folder mode: merge wrapped lines in every text file under a directory tree,
// mirroring the tree under the output folder

use anyhow::Result;
use clap::Parser;
use linemend::config::{DEFAULT_EXTENSION, DEFAULT_FREQUENCY_THRESHOLD, DEFAULT_RANGE_SIZE};
use linemend::merge::DEFAULT_END_PUNCTUATION;
use linemend::{process_folder, BatchConfig, BatchLog, MergeOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "linemend-folder")]
#[command(about = "Remove unwanted line breaks in every text file of a folder")]
#[command(version)]
struct Args {
    /// Folder scanned recursively for input files
    input_folder: PathBuf,

    /// Folder receiving the cleaned files, same layout as the input
    output_folder: PathBuf,

    /// Size of the range around the most common line length
    #[arg(long, default_value_t = DEFAULT_RANGE_SIZE)]
    range_size: usize,

    /// Minimum fraction of lines the length range must cover
    #[arg(long, default_value_t = DEFAULT_FREQUENCY_THRESHOLD)]
    frequency_threshold: f64,

    /// Regex for punctuation that marks the end of a line
    #[arg(long, default_value = DEFAULT_END_PUNCTUATION)]
    end_punctuation: String,

    /// Extension of files to process
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Number of files processed concurrently (default: number of CPUs)
    #[arg(long)]
    workers: Option<usize>,

    /// Directory receiving the dated log file
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    /// Abort on first failed file
    #[arg(long)]
    fail_fast: bool,

    /// Suppress console progress bar
    #[arg(long)]
    no_progress: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    let mut config = BatchConfig::new(&args.input_folder, &args.output_folder);
    config.merge = MergeOptions::batch(args.range_size, args.frequency_threshold, &args.end_punctuation)?;
    config.extension = args.extension.trim_start_matches('.').to_string();
    config.workers = args.workers.unwrap_or_else(num_cpus::get);
    config.fail_fast = args.fail_fast;
    config.show_progress = !args.no_progress;
    config.validate()?;

    let log = Arc::new(BatchLog::create(&args.log_dir)?);
    let stats = process_folder(&config, Arc::clone(&log)).await?;

    if let Some(ref stats_path) = args.stats_out {
        stats.write_json(stats_path).await?;
        info!("Run statistics written to {}", stats_path.display());
    }

    println!(
        "Processed {} files: {} merged, {} unchanged, {} failed (log: {})",
        stats.files_discovered,
        stats.files_merged,
        stats.files_unchanged,
        stats.files_failed,
        log.path().display()
    );

    Ok(())
}
