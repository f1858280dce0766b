// WHY: folder-mode driver; each file is an independent job whose only shared state
// is the batch log and the progress bar

use anyhow::{bail, Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::batch_log::BatchLog;
use crate::config::{BatchConfig, MergeOptions};
use crate::discovery::{collect_discovered_files, mirror_path, DiscoveryConfig};
use crate::merge::remove_line_breaks;
use crate::profiler::WrapBand;
use crate::reader::{AsyncFileReader, ReaderConfig};

/// Outcome of one file job
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Band found and merge applied
    Merged,
    /// No band cleared the threshold; text copied through
    Unchanged,
    Failed,
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    /// File path relative to the input folder
    pub path: String,
    pub encoding: Option<String>,
    pub band: Option<WrapBand>,
    pub lines_in: u64,
    pub lines_out: u64,
    pub bytes_read: u64,
    pub processing_time_ms: u64,
    pub status: FileStatus,
    pub error: Option<String>,
}

impl FileStats {
    fn failed(path: String, error: String) -> Self {
        Self {
            path,
            encoding: None,
            band: None,
            lines_in: 0,
            lines_out: 0,
            bytes_read: 0,
            processing_time_ms: 0,
            status: FileStatus::Failed,
            error: Some(error),
        }
    }
}

/// Aggregate report for one folder run
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    pub run_start: String,
    pub total_processing_time_ms: u64,
    pub files_discovered: u64,
    pub files_merged: u64,
    pub files_unchanged: u64,
    pub files_failed: u64,
    pub total_lines_in: u64,
    pub total_lines_out: u64,
    pub log_file: String,
    pub file_stats: Vec<FileStats>,
}

impl RunStats {
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write stats file {}", path.display()))
    }
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Read, decode, merge and write one file under the mirrored output path
pub async fn process_file(
    input_root: &Path,
    output_root: &Path,
    path: &Path,
    options: &MergeOptions,
    log: &BatchLog,
) -> Result<FileStats> {
    let start = Instant::now();
    let relative = relative_display(input_root, path);
    let output_path = mirror_path(input_root, output_root, path)?;

    log.info(format!("Processing {relative}"));

    let reader = AsyncFileReader::new(ReaderConfig::default());
    let (decoded, read_stats) = reader.read_decoded(path).await?;
    if decoded.had_errors {
        log.warn(format!(
            "{relative}: undecodable bytes replaced while decoding as {}",
            decoded.encoding
        ));
    }
    let encoding = decoded.encoding.to_string();

    let merge_options = options.clone();
    let text = decoded.text;
    let outcome = tokio::task::spawn_blocking(move || remove_line_breaks(&text, &merge_options))
        .await
        .context("Merge task failed")?;

    let status = match outcome.band {
        Some(band) => {
            log.info(format!("{relative}: most common line length range {band}"));
            FileStatus::Merged
        }
        None => {
            log.warn(format!(
                "{relative}: no line length range reached frequency threshold {}; range (0, 0), text left unchanged",
                options.frequency_threshold.unwrap_or_default()
            ));
            FileStatus::Unchanged
        }
    };

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    tokio::fs::write(&output_path, outcome.text.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    let stats = FileStats {
        path: relative.clone(),
        encoding: Some(encoding),
        band: outcome.band,
        lines_in: outcome.lines_in as u64,
        lines_out: outcome.lines_out as u64,
        bytes_read: read_stats.bytes_read,
        processing_time_ms: start.elapsed().as_millis() as u64,
        status,
        error: None,
    };

    log.info(format!(
        "Finished {relative}: {} lines -> {} lines in {}ms",
        stats.lines_in, stats.lines_out, stats.processing_time_ms
    ));

    Ok(stats)
}

fn progress_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Process every matching file under `config.input_root` on a pool of
/// `config.workers` concurrent jobs.
///
/// A failed or panicking job is logged and recorded as failed; the run goes on
/// unless `config.fail_fast` is set, in which case the first failure aborts it.
pub async fn process_folder(config: &BatchConfig, log: Arc<BatchLog>) -> Result<RunStats> {
    config.validate()?;
    let run_start = chrono::Local::now();
    let start = Instant::now();

    log.info(format!(
        "Starting batch: {} -> {} (range size {}, frequency threshold {:?}, {} workers)",
        config.input_root.display(),
        config.output_root.display(),
        config.merge.range_size,
        config.merge.frequency_threshold,
        config.workers
    ));

    let discovery_config = DiscoveryConfig {
        extension: config.extension.clone(),
    };
    let mut files = collect_discovered_files(&config.input_root, discovery_config).await?;

    // outputs written inside the input tree must not be picked up as inputs,
    // however the two roots are spelled
    tokio::fs::create_dir_all(&config.output_root)
        .await
        .with_context(|| format!("Failed to create output folder {}", config.output_root.display()))?;
    let canonical_input = tokio::fs::canonicalize(&config.input_root).await?;
    let canonical_output = tokio::fs::canonicalize(&config.output_root).await?;
    files.retain(|f| match f.strip_prefix(&config.input_root) {
        Ok(relative) => !canonical_input.join(relative).starts_with(&canonical_output),
        Err(_) => true,
    });
    log.info(format!("Found {} .{} files", files.len(), config.extension));

    let pb = progress_bar(files.len() as u64, config.show_progress);
    let input_root = Arc::new(config.input_root.clone());
    let output_root = Arc::new(config.output_root.clone());
    let options = Arc::new(config.merge.clone());

    let mut results = stream::iter(files.iter().cloned())
        .map(|path: PathBuf| {
            let input_root = Arc::clone(&input_root);
            let output_root = Arc::clone(&output_root);
            let options = Arc::clone(&options);
            let log = Arc::clone(&log);
            async move {
                let job_path = path.clone();
                let handle = tokio::spawn(async move {
                    process_file(&input_root, &output_root, &job_path, &options, &log).await
                });
                (path, handle.await)
            }
        })
        .buffer_unordered(config.workers);

    let mut file_stats = Vec::with_capacity(files.len());
    while let Some((path, joined)) = results.next().await {
        let relative = relative_display(&config.input_root, &path);
        let failure = match joined {
            Ok(Ok(stats)) => {
                file_stats.push(stats);
                None
            }
            Ok(Err(e)) => Some(format!("{e:#}")),
            Err(e) if e.is_panic() => Some(format!("worker panicked: {e}")),
            Err(e) => Some(format!("worker cancelled: {e}")),
        };

        if let Some(error) = failure {
            log.error(format!("Failed {relative}: {error}"));
            if config.fail_fast {
                pb.abandon();
                bail!("Aborting batch after failure in {relative}: {error}");
            }
            file_stats.push(FileStats::failed(relative.clone(), error));
        }

        pb.set_message(relative);
        pb.inc(1);
    }
    pb.finish_with_message("done");

    file_stats.sort_by(|a, b| a.path.cmp(&b.path));
    let count = |status: FileStatus| file_stats.iter().filter(|s| s.status == status).count() as u64;

    let stats = RunStats {
        run_start: run_start.to_rfc3339(),
        total_processing_time_ms: start.elapsed().as_millis() as u64,
        files_discovered: files.len() as u64,
        files_merged: count(FileStatus::Merged),
        files_unchanged: count(FileStatus::Unchanged),
        files_failed: count(FileStatus::Failed),
        total_lines_in: file_stats.iter().map(|s| s.lines_in).sum(),
        total_lines_out: file_stats.iter().map(|s| s.lines_out).sum(),
        log_file: log.path().display().to_string(),
        file_stats,
    };

    log.info(format!(
        "Batch complete in {}ms: {} merged, {} unchanged, {} failed",
        stats.total_processing_time_ms, stats.files_merged, stats.files_unchanged, stats.files_failed
    ));

    Ok(stats)
}
