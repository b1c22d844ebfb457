// src/scan.rs
// =============================================================================
// This module runs a whole scan: find files, extract links, check them.
//
// How it works:
// 1. Walk the root directory for markdown files
// 2. For each file (several files at a time):
//    a. Read it and extract its links (a file that can't be read shows up
//       as one broken result instead of stopping the scan)
//    b. Relative links: check the file exists next to the document
//    c. Absolute links: check over HTTP, `batch_size` URLs at a time
// 3. Collect everything into a ScanReport, files in sorted order
//
// Concurrency limits:
// - A semaphore with `concurrency` permits is shared by every file, so no
//   matter how many files are in flight, at most `concurrency` HTTP
//   checks run at the same time
// - Within one file, URLs go out in batches of `batch_size`
// =============================================================================

use crate::checker::{check_links, check_relative, LinkCheckResult, LinkStatus, Reachability};
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::extract::{extract_links, LinkKind};
use crate::walk::find_markdown_files;
use futures::stream::{self, StreamExt};
use regex::RegexSet;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::Semaphore;

/// Check results for one markdown file, in the order the links appear
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub results: Vec<LinkCheckResult>,
}

impl FileReport {
    pub fn broken(&self) -> impl Iterator<Item = &LinkCheckResult> {
        self.results.iter().filter(|r| !r.is_ok())
    }
}

/// Everything a scan found
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub files: Vec<FileReport>,
    /// Links that were checked
    pub checked: usize,
    /// Checked links that are not ok
    pub broken: usize,
    /// Absolute links matching an exclude pattern
    pub excluded: usize,
    /// Absolute links not checked because the scan was offline
    pub skipped: usize,
}

impl ScanReport {
    pub fn has_broken(&self) -> bool {
        self.broken > 0
    }
}

// Per-file counters that don't show up as results
#[derive(Debug, Default)]
struct FileScan {
    report: Option<FileReport>,
    excluded: usize,
    skipped: usize,
}

// Wraps a checker so every check first takes a permit from the shared
// semaphore
struct Throttled<'a, R> {
    inner: &'a R,
    permits: &'a Semaphore,
}

impl<R: Reachability> Reachability for Throttled<'_, R> {
    fn check(&self, url: String) -> impl Future<Output = LinkCheckResult> + Send {
        async move {
            // The semaphore is never closed, so this can't fail in practice
            let _permit = self.permits.acquire().await.ok();
            self.inner.check(url).await
        }
    }
}

// Scans every markdown file under `root`
//
// Parameters:
//   root: directory (or single markdown file) to scan
//   config: limits, excludes, offline mode, ...
//   checker: how absolute URLs get checked (HttpChecker in the CLI)
//
// Returns: the full report, or an error if the scan couldn't run at all
// (missing root, invalid exclude pattern)
pub async fn scan<R: Reachability>(
    root: &Path,
    config: &ScanConfig,
    checker: &R,
) -> Result<ScanReport, ScanError> {
    let files = find_markdown_files(root, config)?;
    let excludes = config.exclude_set()?;

    let permits = Semaphore::new(config.concurrency());
    let throttled = Throttled {
        inner: checker,
        permits: &permits,
    };

    tracing::info!(files = files.len(), root = %root.display(), "scanning");

    let scans: Vec<FileScan> = stream::iter(files)
        .map(|file| scan_file(file, config, &excludes, &throttled))
        .buffered(config.concurrency())
        .collect()
        .await;

    let mut report = ScanReport::default();
    for scan in scans {
        report.excluded += scan.excluded;
        report.skipped += scan.skipped;
        if let Some(file) = scan.report {
            report.checked += file.results.len();
            report.broken += file.broken().count();
            report.files.push(file);
        }
    }

    tracing::info!(
        checked = report.checked,
        broken = report.broken,
        excluded = report.excluded,
        "scan finished"
    );

    Ok(report)
}

// Scans a single markdown file
async fn scan_file<R: Reachability>(
    path: PathBuf,
    config: &ScanConfig,
    excludes: &RegexSet,
    checker: &R,
) -> FileScan {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "cannot read file");
            let result = LinkCheckResult::new(
                path.display().to_string(),
                LinkStatus::Error,
                format!("Failed to read file: {}", e),
            );
            return FileScan {
                report: Some(FileReport {
                    file: path,
                    results: vec![result],
                }),
                ..FileScan::default()
            };
        }
    };
    // Stray non-UTF-8 bytes become U+FFFD; the links around them still count
    let content = String::from_utf8_lossy(&bytes);

    let links = extract_links(&content);
    tracing::debug!(file = %path.display(), links = links.len(), "extracted links");

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut scan = FileScan::default();

    // One slot per link so results can be put back in document order
    let mut slots: Vec<Option<LinkCheckResult>> = vec![None; links.len()];
    let mut remote: Vec<(usize, String)> = Vec::new();

    for (i, link) in links.into_iter().enumerate() {
        match link.kind {
            LinkKind::Relative => slots[i] = Some(check_relative(base_dir, &link.target).await),
            LinkKind::Absolute if config.offline => scan.skipped += 1,
            LinkKind::Absolute if excludes.is_match(&link.target) => {
                tracing::debug!(url = %link.target, "excluded");
                scan.excluded += 1;
            }
            LinkKind::Absolute => remote.push((i, link.target)),
        }
    }

    for batch in remote.chunks(config.batch_size()) {
        let urls = batch.iter().map(|(_, url)| url.clone()).collect();
        let results = check_links(checker, urls, batch.len()).await;
        for ((i, _), result) in batch.iter().zip(results) {
            slots[*i] = Some(result);
        }
    }

    scan.report = Some(FileReport {
        file: path,
        results: slots.into_iter().flatten().collect(),
    });
    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // Marks URLs containing "dead" as broken and remembers what it saw
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl Reachability for Recorder {
        fn check(&self, url: String) -> impl Future<Output = LinkCheckResult> + Send {
            async move {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);

                self.seen.lock().unwrap().push(url.clone());
                if url.contains("dead") {
                    LinkCheckResult::new(url, LinkStatus::Broken, "HTTP 404")
                } else {
                    LinkCheckResult::new(url, LinkStatus::Ok, "HTTP 200")
                }
            }
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_scan_reports_relative_and_absolute() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/guide.md", "# Guide");
        write(
            dir.path(),
            "README.md",
            "[guide](docs/guide.md) https://ok.example.com [gone](missing.md) [dead](https://dead.example.com)",
        );

        let recorder = Recorder::default();
        let report = scan(dir.path(), &ScanConfig::default(), &recorder).await.unwrap();

        assert_eq!(report.files.len(), 2);
        let readme = &report.files[0];
        assert!(readme.file.ends_with("README.md"));

        let urls: Vec<_> = readme.results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "docs/guide.md",
                "https://ok.example.com",
                "missing.md",
                "https://dead.example.com",
            ]
        );
        assert_eq!(report.checked, 4);
        assert_eq!(report.broken, 2);
        assert!(report.has_broken());
    }

    #[tokio::test]
    async fn test_excluded_urls_are_not_checked() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "README.md",
            "https://skip.example.com/a https://keep.example.com/b",
        );

        let config = ScanConfig {
            exclude: vec![r"skip\.example\.com".to_string()],
            ..ScanConfig::default()
        };
        let recorder = Recorder::default();
        let report = scan(dir.path(), &config, &recorder).await.unwrap();

        assert_eq!(report.excluded, 1);
        assert_eq!(report.checked, 1);
        assert_eq!(
            *recorder.seen.lock().unwrap(),
            vec!["https://keep.example.com/b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_offline_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "README.md", "https://dead.example.com [x](nope.md)");

        let config = ScanConfig {
            offline: true,
            ..ScanConfig::default()
        };
        let recorder = Recorder::default();
        let report = scan(dir.path(), &config, &recorder).await.unwrap();

        assert!(recorder.seen.lock().unwrap().is_empty());
        assert_eq!(report.skipped, 1);
        assert_eq!(report.broken, 1);
        assert_eq!(report.files[0].results[0].url, "nope.md");
    }

    #[tokio::test]
    async fn test_concurrency_ceiling_holds_across_files() {
        let dir = tempfile::tempdir().unwrap();
        for f in 0..4 {
            let body: Vec<String> = (0..6)
                .map(|u| format!("https://host{}.example.com/{}", f, u))
                .collect();
            write(dir.path(), &format!("doc{}.md", f), &body.join("\n"));
        }

        let config = ScanConfig {
            concurrency: 2,
            batch_size: 3,
            ..ScanConfig::default()
        };
        let recorder = Recorder::default();
        let report = scan(dir.path(), &config, &recorder).await.unwrap();

        assert_eq!(report.checked, 24);
        assert!(recorder.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_non_utf8_file_does_not_sink_siblings() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "a.md",
            "https://one.example.com https://two.example.com",
        );
        fs::write(dir.path().join("b.md"), b"caf\xe9 [x](missing.md)").unwrap();

        let recorder = Recorder::default();
        let report = scan(dir.path(), &ScanConfig::default(), &recorder).await.unwrap();

        assert_eq!(report.files.len(), 2);
        let urls: Vec<_> = report.files[0].results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://one.example.com", "https://two.example.com"]);
        assert_eq!(recorder.seen.lock().unwrap().len(), 2);

        // The rest of the file is still scanned
        assert_eq!(report.files[1].results[0].url, "missing.md");
        assert_eq!(report.files[1].results[0].status, LinkStatus::Broken);
        assert_eq!(report.broken, 1);
    }

    #[tokio::test]
    async fn test_unreadable_file_becomes_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vanished.md");

        let recorder = Recorder::default();
        let scan = scan_file(path.clone(), &ScanConfig::default(), &RegexSet::empty(), &recorder).await;

        let report = scan.report.unwrap();
        assert_eq!(report.file, path);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].status, LinkStatus::Error);
        assert!(report.results[0]
            .message
            .as_deref()
            .unwrap()
            .contains("Failed to read file"));
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_exclude_fails_scan() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "README.md", "nothing");

        let config = ScanConfig {
            exclude: vec!["(".to_string()],
            ..ScanConfig::default()
        };
        let err = scan(dir.path(), &config, &Recorder::default()).await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern(_)));
    }
}
