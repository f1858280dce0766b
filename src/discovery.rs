use anyhow::{Context, Result};
use futures::stream::{self, Stream, StreamExt};
use ignore::{WalkBuilder, WalkState};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_EXTENSION;

/// Configuration for file discovery behavior
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Extension (without the dot) a file must carry to be picked up
    pub extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Case-insensitive extension check
pub fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

/// Streams every regular file under `root_dir` carrying the configured extension.
///
/// The walk runs on `ignore`'s parallel walker in a dedicated thread; paths are
/// forwarded through a channel as they are found. Walk errors on individual
/// entries are logged and skipped.
pub fn discover_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<PathBuf>> {
    let root_path = root_dir.as_ref().to_path_buf();
    let (tx, rx) = mpsc::unbounded_channel::<Result<PathBuf>>();

    std::thread::spawn(move || {
        info!("Starting directory traversal in: {}", root_path.display());
        let traversal_start = std::time::Instant::now();

        let walker = WalkBuilder::new(&root_path)
            .threads((num_cpus::get() / 2).max(1))
            .follow_links(false)
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .build_parallel();

        walker.run(|| {
            let tx = tx.clone();
            let extension = config.extension.clone();
            Box::new(move |result: std::result::Result<ignore::DirEntry, ignore::Error>| {
                match result {
                    Ok(entry) => {
                        let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                        if is_file && has_extension(entry.path(), &extension) {
                            debug!("Found matching file: {}", entry.path().display());
                            if tx.send(Ok(entry.into_path())).is_err() {
                                return WalkState::Quit;
                            }
                        }
                    }
                    Err(e) => warn!("Directory walk error (continuing): {}", e),
                }
                WalkState::Continue
            })
        });

        info!(
            "Directory traversal completed in {}ms",
            traversal_start.elapsed().as_millis()
        );
    });

    stream::unfold(rx, |mut receiver| async move {
        receiver.recv().await.map(|result| (result, receiver))
    })
}

/// Collect all discovered files, sorted for deterministic dispatch order
pub async fn collect_discovered_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_files(root_dir, config));

    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    files.sort();
    info!("Discovered {} files total", files.len());
    Ok(files)
}

/// Output location for `file`: its path relative to `input_root`, re-rooted at `output_root`
pub fn mirror_path(input_root: &Path, output_root: &Path, file: &Path) -> Result<PathBuf> {
    let relative = file.strip_prefix(input_root).with_context(|| {
        format!(
            "{} is not inside input folder {}",
            file.display(),
            input_root.display()
        )
    })?;
    Ok(output_root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        let file_path = dir.join(name);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file_path, content).await?;
        Ok(file_path)
    }

    #[tokio::test]
    async fn test_discover_files_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default()).await.unwrap();
        assert_eq!(files.len(), 0);
    }

    #[tokio::test]
    async fn test_discover_files_matching_extension() {
        let temp_dir = TempDir::new().unwrap();

        create_test_file(temp_dir.path(), "book.txt", "content").await.unwrap();
        create_test_file(temp_dir.path(), "subdir/deeper/another.TXT", "content").await.unwrap();
        create_test_file(temp_dir.path(), ".hidden/third.txt", "content").await.unwrap();
        create_test_file(temp_dir.path(), "notes.md", "skip").await.unwrap();
        create_test_file(temp_dir.path(), "txt", "skip").await.unwrap();

        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default()).await.unwrap();
        assert_eq!(files.len(), 3);

        let file_names: Vec<String> = files.iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(file_names.contains(&"book.txt".to_string()));
        assert!(file_names.contains(&"another.TXT".to_string()));
        assert!(file_names.contains(&"third.txt".to_string()));
    }

    #[tokio::test]
    async fn test_discover_custom_extension() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "a.ocr", "content").await.unwrap();
        create_test_file(temp_dir.path(), "b.txt", "content").await.unwrap();

        let config = DiscoveryConfig { extension: ".ocr".to_string() };
        let files = collect_discovered_files(temp_dir.path(), config).await.unwrap();
        assert_eq!(files, vec![temp_dir.path().join("a.ocr")]);
    }

    #[tokio::test]
    async fn test_discovered_files_are_sorted() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c.txt", "a.txt", "b/z.txt", "b/a.txt"] {
            create_test_file(temp_dir.path(), name, "x").await.unwrap();
        }

        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default()).await.unwrap();
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn test_mirror_path() {
        let mirrored = mirror_path(
            Path::new("/data/in"),
            Path::new("/data/out"),
            Path::new("/data/in/vol1/page.txt"),
        )
        .unwrap();
        assert_eq!(mirrored, PathBuf::from("/data/out/vol1/page.txt"));

        assert!(mirror_path(Path::new("/data/in"), Path::new("/out"), Path::new("/elsewhere/x.txt")).is_err());
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a/b.txt"), "txt"));
        assert!(has_extension(Path::new("a/b.Txt"), ".txt"));
        assert!(!has_extension(Path::new("a/b.txt.bak"), "txt"));
        assert!(!has_extension(Path::new("a/txt"), "txt"));
    }
}
