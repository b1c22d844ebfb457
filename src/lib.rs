//! md-link-guardian: find broken links in directories of markdown files
//!
//! Modules:
//! - extract: pure link extraction (inline links, autolinks, bare URLs)
//! - checker: HTTP reachability and relative-file existence checks
//! - walk: recursive markdown file discovery
//! - scan: ties the three together with bounded concurrency

pub mod checker;
pub mod config;
pub mod error;
pub mod extract;
pub mod scan;
pub mod walk;

pub use checker::{HttpChecker, LinkCheckResult, LinkStatus, Reachability};
pub use config::ScanConfig;
pub use error::ScanError;
pub use extract::{
    extract_absolute_links, extract_links, extract_relative_links, looks_like_file_path,
    repair_unbalanced_parens, Link, LinkKind,
};
pub use scan::{scan, FileReport, ScanReport};
