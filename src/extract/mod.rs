// src/extract/mod.rs
// =============================================================================
// This module contains the link extraction engine.
//
// Submodules:
// - markdown: Finds links in markdown text (inline, autolink, bare URL)
// - path: Decides whether a relative target looks like a file path
// - parens: Repairs URLs whose parentheses were captured unbalanced
//
// Everything in here is a pure function: text in, links out. No network,
// no filesystem, no state kept between calls. That makes it safe to call
// from as many tasks at once as we like.
// =============================================================================

mod markdown;
mod parens;
mod path;

pub use markdown::{
    extract_absolute_links, extract_links, extract_relative_links, is_url_shaped,
    strip_code_fences, Link, LinkKind,
};
pub use parens::{is_balanced, repair_unbalanced_parens, RepairRule, REPAIR_RULES};
pub use path::looks_like_file_path;
