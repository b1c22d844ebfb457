// src/walk/files.rs
// =============================================================================
// This module walks a directory tree and collects markdown files.
//
// How it works:
// 1. If the root is a file, it is the only file we scan
// 2. Otherwise walk the tree with `walkdir`
// 3. Prune any directory whose name is in the skip list (the walker never
//    even enters it, so a huge node_modules costs nothing)
// 4. Keep files whose extension is one of the markdown extensions
//
// Rust concepts:
// - filter_entry: prune a subtree during the walk
// - PathBuf vs &Path: owned vs borrowed paths
// =============================================================================

use crate::config::ScanConfig;
use crate::error::ScanError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

// Finds every markdown file under `root`
//
// Parameters:
//   root: directory (or single file) to scan
//   config: supplies skip_dirs and extensions
//
// Returns: sorted list of markdown file paths
pub fn find_markdown_files(root: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>, ScanError> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }

    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry, config));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // An unreadable subdirectory shouldn't sink the whole scan
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_markdown(entry.path(), config) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::debug!(count = files.len(), root = %root.display(), "found markdown files");

    Ok(files)
}

// The root itself is never skipped, even if it is called "target"
fn is_skipped_dir(entry: &DirEntry, config: &ScanConfig) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map_or(false, |name| config.skip_dirs.iter().any(|skip| skip == name))
}

fn is_markdown(path: &Path, config: &ScanConfig) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| config.is_markdown_extension(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# test\n").unwrap();
    }

    #[test]
    fn test_finds_nested_markdown_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "docs/guide.markdown");
        touch(dir.path(), "docs/deep/NOTES.MD");
        touch(dir.path(), "src/main.rs");

        let files = find_markdown_files(dir.path(), &ScanConfig::default()).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            rel,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("docs/deep/NOTES.MD"),
                PathBuf::from("docs/guide.markdown"),
            ]
        );
    }

    #[test]
    fn test_skips_configured_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "node_modules/pkg/README.md");
        touch(dir.path(), ".git/info.md");
        touch(dir.path(), "vendor/lib/README.md");

        let config = ScanConfig {
            skip_dirs: vec!["node_modules".into(), ".git".into(), "vendor".into()],
            ..ScanConfig::default()
        };
        let files = find_markdown_files(dir.path(), &config).unwrap();
        assert_eq!(files, vec![dir.path().join("README.md")]);
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "one.md");

        let root = dir.path().join("one.md");
        let files = find_markdown_files(&root, &ScanConfig::default()).unwrap();
        assert_eq!(files, vec![root]);
    }

    #[test]
    fn test_missing_root() {
        let err = find_markdown_files(Path::new("/no/such/dir"), &ScanConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound(_)));
    }
}
