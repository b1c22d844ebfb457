// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - http: Makes HTTP requests to check if absolute links are alive
// - local: Checks that relative links point at files that exist
//
// Both produce the same LinkCheckResult, so the report doesn't need to
// care where a result came from.
// =============================================================================

mod http;
mod local;

pub use http::{check_links, HttpChecker, LinkCheckResult, LinkStatus, Reachability};
pub use local::check_relative;
