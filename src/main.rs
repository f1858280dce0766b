use anyhow::{Context, Result};
use clap::Parser;
use linemend::merge::DEFAULT_END_PUNCTUATION;
use linemend::{reader, remove_line_breaks, MergeOptions};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "linemend")]
#[command(about = "Remove unwanted line breaks in a text file")]
#[command(version)]
struct Args {
    /// Input text file (UTF-8)
    input: PathBuf,

    /// Output text file
    output: PathBuf,

    /// Size of the range around the most common line length
    #[arg(long, default_value_t = 1)]
    range_size: usize,

    /// Regex for punctuation that marks the end of a line
    #[arg(long, default_value = DEFAULT_END_PUNCTUATION)]
    end_punctuation: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    let options = MergeOptions::single_file(args.range_size, &args.end_punctuation)?;

    let text = reader::read_utf8(&args.input).await?;
    let outcome = remove_line_breaks(&text, &options);
    match outcome.band {
        Some(band) => info!("Most common line length range: {}", band),
        None => info!("Most common line length range: (0, 0)"),
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    tokio::fs::write(&args.output, outcome.text.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        "Wrote {}: {} lines merged into {}",
        args.output.display(),
        outcome.lines_in,
        outcome.lines_out
    );

    Ok(())
}
