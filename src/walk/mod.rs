// src/walk/mod.rs
// =============================================================================
// This module finds the markdown files we are going to scan.
//
// Features:
// - Recursive walk starting from a directory (or a single file)
// - Skips directories like .git, node_modules and target
// - Matches markdown extensions case-insensitively
// - Returns files in sorted order so reports are stable between runs
// =============================================================================

mod files;

// Re-export the main walking function
pub use files::find_markdown_files;
