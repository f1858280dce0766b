use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, warn};

use crate::encoding::{decode_to_utf8, DecodedText};

/// Configuration for file reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Buffer size for async reading (default: 64KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics for one file read
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub bytes_read: u64,
    pub duration_ms: u64,
}

/// Async reader that loads whole files and decodes them to UTF-8
pub struct AsyncFileReader {
    config: ReaderConfig,
}

impl AsyncFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read raw bytes of `file_path`
    pub async fn read_bytes<P: AsRef<Path>>(&self, file_path: P) -> Result<(Vec<u8>, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        debug!("Starting async read of file: {}", path.display());

        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open file {}", path.display()))?;
        let capacity = file
            .metadata()
            .await
            .map(|m| m.len() as usize)
            .unwrap_or(0);

        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut bytes = Vec::with_capacity(capacity);
        reader
            .read_to_end(&mut bytes)
            .await
            .with_context(|| format!("Failed to read file {}", path.display()))?;

        let stats = ReadStats {
            file_path: path.display().to_string(),
            bytes_read: bytes.len() as u64,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };
        debug!("Read {} bytes from {} in {}ms", stats.bytes_read, stats.file_path, stats.duration_ms);

        Ok((bytes, stats))
    }

    /// Read `file_path` and decode it with the detected encoding.
    ///
    /// Only I/O errors are returned; undecodable bytes are replaced.
    pub async fn read_decoded<P: AsRef<Path>>(&self, file_path: P) -> Result<(DecodedText, ReadStats)> {
        let path = file_path.as_ref();
        let (bytes, stats) = self.read_bytes(path).await?;
        let decoded = decode_to_utf8(&bytes);

        if decoded.had_errors {
            warn!(
                "Undecodable bytes replaced in {} (decoded as {})",
                path.display(),
                decoded.encoding
            );
        }

        Ok((decoded, stats))
    }
}

/// Convenience function for reading a single file with default configuration
pub async fn read_decoded<P: AsRef<Path>>(file_path: P) -> Result<DecodedText> {
    let reader = AsyncFileReader::new(ReaderConfig::default());
    let (decoded, _stats) = reader.read_decoded(file_path).await?;
    Ok(decoded)
}

/// Strict UTF-8 read used by the single-file command
pub async fn read_utf8<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let path = file_path.as_ref();
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {} as UTF-8", path.display()))
}
