// WHY: option structs shared by both binaries and the library API; CLI parsing
// lives in the binaries, validation lives here

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::merge::EndPunctuation;

pub const DEFAULT_RANGE_SIZE: usize = 1;
pub const DEFAULT_FREQUENCY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_EXTENSION: &str = "txt";

/// Parameters of the wrap-band heuristic
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Half-width of the length band around the most common line length
    pub range_size: usize,
    /// Minimum fraction of counted lines the band must hold; `None` disables the check
    pub frequency_threshold: Option<f64>,
    pub end_punctuation: EndPunctuation,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            range_size: DEFAULT_RANGE_SIZE,
            frequency_threshold: None,
            end_punctuation: EndPunctuation::default(),
        }
    }
}

impl MergeOptions {
    /// Options for the single-file command
    pub fn single_file(range_size: usize, end_punctuation: &str) -> Result<Self> {
        Ok(Self {
            range_size,
            frequency_threshold: None,
            end_punctuation: EndPunctuation::new(end_punctuation)?,
        })
    }

    /// Options for folder mode, where a band must clear `frequency_threshold`
    pub fn batch(range_size: usize, frequency_threshold: f64, end_punctuation: &str) -> Result<Self> {
        let options = Self {
            range_size,
            frequency_threshold: Some(frequency_threshold),
            end_punctuation: EndPunctuation::new(end_punctuation)?,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.frequency_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                bail!("Frequency threshold must be between 0 and 1, got {threshold}");
            }
        }
        Ok(())
    }
}

/// Configuration for one folder-mode run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub merge: MergeOptions,
    /// Extension (without the dot) of files to process
    pub extension: String,
    /// Number of files processed concurrently
    pub workers: usize,
    /// Abort the run on the first failed file instead of logging and continuing
    pub fail_fast: bool,
    pub show_progress: bool,
}

impl BatchConfig {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            merge: MergeOptions {
                frequency_threshold: Some(DEFAULT_FREQUENCY_THRESHOLD),
                ..MergeOptions::default()
            },
            extension: DEFAULT_EXTENSION.to_string(),
            workers: num_cpus::get(),
            fail_fast: false,
            show_progress: true,
        }
    }

    /// Validate before any file is touched
    pub fn validate(&self) -> Result<()> {
        if !self.input_root.exists() {
            bail!("Input folder does not exist: {}", self.input_root.display());
        }
        if !self.input_root.is_dir() {
            bail!("Input path is not a directory: {}", self.input_root.display());
        }
        if self.workers == 0 {
            bail!("Worker count must be at least 1");
        }
        if self.extension.is_empty() {
            bail!("File extension must not be empty");
        }
        self.merge.validate()
    }
}
