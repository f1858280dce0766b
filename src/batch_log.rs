use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;

/// Dated, append-only log file for one folder-mode run
///
/// Owned by the batch driver and shared with workers by reference; every record
/// is a single locked `write_all`, so lines from concurrent jobs never interleave.
#[derive(Debug)]
pub struct BatchLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl BatchLog {
    /// Open (or append to) today's log file in `dir`
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let path = Self::log_path(dir, Local::now().date_naive());
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Log file name for a given day
    pub fn log_path(dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(format!("linemend_{}.log", date.format("%Y-%m-%d")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, message: impl AsRef<str>) {
        tracing::info!("{}", message.as_ref());
        self.record(Level::INFO, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        tracing::warn!("{}", message.as_ref());
        self.record(Level::WARN, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        tracing::error!("{}", message.as_ref());
        self.record(Level::ERROR, message.as_ref());
    }

    fn record(&self, level: Level, message: &str) {
        let line = format!(
            "{} - {} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            message
        );

        // a poisoned lock only means another worker panicked mid-write; the file is still usable
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = file.write_all(line.as_bytes()) {
            tracing::error!("Failed to write to batch log {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_log_path_is_dated() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let path = BatchLog::log_path(Path::new("/tmp/logs"), date);
        assert_eq!(path, PathBuf::from("/tmp/logs/linemend_2024-03-09.log"));
    }

    #[test]
    fn test_records_carry_level_and_message() {
        let temp_dir = TempDir::new().unwrap();
        let log = BatchLog::create(temp_dir.path()).unwrap();

        log.info("Processing a.txt");
        log.warn("No line length range found for b.txt");
        log.error("Failed c.txt");

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(" - INFO - Processing a.txt"));
        assert!(lines[1].ends_with(" - WARN - No line length range found for b.txt"));
        assert!(lines[2].ends_with(" - ERROR - Failed c.txt"));
    }

    #[test]
    fn test_reopening_appends() {
        let temp_dir = TempDir::new().unwrap();
        {
            let log = BatchLog::create(temp_dir.path()).unwrap();
            log.info("first run");
        }
        let log = BatchLog::create(temp_dir.path()).unwrap();
        log.info("second run");

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_concurrent_writes_stay_line_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(BatchLog::create(temp_dir.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.info(format!("worker {worker} file {i} {}", "x".repeat(200)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            assert!(line.contains(" - INFO - worker "), "corrupted line: {line}");
            assert!(line.ends_with(&"x".repeat(200)), "corrupted line: {line}");
        }
    }
}
