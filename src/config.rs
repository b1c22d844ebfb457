// src/config.rs
// =============================================================================
// Settings for a scan.
//
// Where settings come from, lowest priority first:
// 1. Built-in defaults (ScanConfig::default())
// 2. An optional JSON config file (--config md-link-guardian.json)
// 3. Command-line flags / MD_LINK_GUARDIAN_* environment variables
//
// Example config file (every key is optional):
//   {
//     "concurrency": 20,
//     "batch_size": 5,
//     "exclude": ["^https://localhost", "linkedin\\.com"],
//     "skip_dirs": [".git", "node_modules", "vendor"]
//   }
// =============================================================================

use crate::error::ScanError;
use regex::RegexSet;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum number of HTTP checks in flight across all files
    pub concurrency: usize,
    /// How many URLs from one file are checked together
    pub batch_size: usize,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Redirects to follow before giving up
    pub max_redirects: usize,
    /// Extra attempts after a timeout or connection failure
    pub retries: u8,
    pub user_agent: String,
    /// Regexes; matching URLs are not checked
    pub exclude: Vec<String>,
    /// Directory names never descended into
    pub skip_dirs: Vec<String>,
    /// File extensions treated as markdown
    pub extensions: Vec<String>,
    /// Only check relative links (no network)
    pub offline: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 50,
            batch_size: 10,
            timeout_secs: 10,
            max_redirects: 5,
            retries: 1,
            user_agent: format!("md-link-guardian/{}", env!("CARGO_PKG_VERSION")),
            exclude: Vec::new(),
            skip_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
            ],
            extensions: vec!["md".to_string(), "markdown".to_string()],
            offline: false,
        }
    }
}

impl ScanConfig {
    // Loads a config file, filling in defaults for missing keys
    pub fn from_file(path: &Path) -> Result<Self, ScanError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ScanError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    // Compiles the exclude list; fails on the first invalid regex
    pub fn exclude_set(&self) -> Result<RegexSet, ScanError> {
        Ok(RegexSet::new(&self.exclude)?)
    }

    // Zero would stall the scan, so both limits are at least 1
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    pub fn is_markdown_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}
