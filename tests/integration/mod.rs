// Integration test utilities shared by the folder and CLI tests

#![allow(dead_code)]

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::fs;
use tempfile::TempDir;

/// Temporary input/output/log folders for one folder-mode run
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub log_dir: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_root = temp_dir.path().join("input");
        let output_root = temp_dir.path().join("output");
        let log_dir = temp_dir.path().join("logs");
        fs::create_dir_all(&input_root).expect("Failed to create input folder");

        Self {
            temp_dir,
            input_root,
            output_root,
            log_dir,
        }
    }

    /// Write an input file, creating parent directories
    pub fn create_input_file<P: AsRef<Path>>(&self, relative_path: P, content: &[u8]) -> PathBuf {
        let file_path = self.input_root.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    pub fn output_path<P: AsRef<Path>>(&self, relative_path: P) -> PathBuf {
        self.output_root.join(relative_path)
    }

    pub fn read_output<P: AsRef<Path>>(&self, relative_path: P) -> String {
        fs::read_to_string(self.output_path(relative_path)).expect("Failed to read output file")
    }

    /// Contents of the single dated log file written into `log_dir`
    pub fn read_log(&self) -> String {
        let entry = fs::read_dir(&self.log_dir)
            .expect("Log directory missing")
            .filter_map(Result::ok)
            .find(|e| e.file_name().to_string_lossy().starts_with("linemend_"))
            .expect("No log file written");
        fs::read_to_string(entry.path()).expect("Failed to read log file")
    }
}

/// Compare two strings line by line, providing detailed diff on mismatch
pub fn assert_lines_eq(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines\n{}",
            context, expected_lines.len(), actual_lines.len(), actual
        );
    }

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context, i + 1, expected_line, actual_line
            );
        }
    }
}
