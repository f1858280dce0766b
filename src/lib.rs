pub mod batch;
pub mod batch_log;
pub mod config;
pub mod discovery;
pub mod encoding;
pub mod merge;
pub mod profiler;
pub mod reader;

// Re-export the heuristic's main entry points
pub use merge::{
    merge_lines, prepare_lines, remove_line_breaks,
    EndPunctuation, MergeOutcome, DEFAULT_END_PUNCTUATION
};
pub use profiler::{find_wrap_band, LengthHistogram, WrapBand};

// Re-export folder-mode types
pub use batch::{process_file, process_folder, FileStats, FileStatus, RunStats};
pub use batch_log::BatchLog;
pub use config::{BatchConfig, MergeOptions};
