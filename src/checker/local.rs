// src/checker/local.rs
// =============================================================================
// This module checks relative links against the filesystem.
//
// A relative link in docs/guide.md like [setup](../SETUP.md) is resolved
// against the directory the document lives in (docs/), so it points at
// SETUP.md in the repository root. If nothing exists there, it's broken.
//
// The lookup goes through tokio::fs so it doesn't block a runtime worker
// while the scanner has HTTP checks in flight.
// =============================================================================

use super::http::{LinkCheckResult, LinkStatus};
use std::path::Path;

// Checks that a relative link target exists on disk
//
// Parameters:
//   base_dir: directory of the markdown file containing the link
//   target: the relative target (fragment and query already removed)
pub async fn check_relative(base_dir: &Path, target: &str) -> LinkCheckResult {
    // Markdown authors often write spaces as %20 so the link renders
    let decoded = target.replace("%20", " ");
    let resolved = base_dir.join(&decoded);

    match tokio::fs::try_exists(&resolved).await {
        Ok(true) => LinkCheckResult::new(target, LinkStatus::Ok, "File exists"),
        Ok(false) => LinkCheckResult::new(
            target,
            LinkStatus::Broken,
            format!("No such file or directory: {}", resolved.display()),
        ),
        // e.g. permission denied on a parent directory
        Err(e) => LinkCheckResult::new(
            target,
            LinkStatus::Error,
            format!("Cannot access {}: {}", resolved.display(), e),
        ),
    }
}
