// src/extract/markdown.rs
// =============================================================================
// This module extracts links from Markdown text.
//
// We recognise three shapes of link, in this order of precedence:
//   1. Inline links:   [label](target)   (also images: ![alt](src))
//   2. Autolinks:      <https://example.com>
//   3. Bare URLs:      see https://example.com for details.
//
// Each shape "claims" the span of text it matched, so a URL that is part of
// an inline link is not picked up again as a bare URL.
//
// Every target is then sorted into one of two buckets:
//   - Absolute: starts with http:// or https://
//   - Relative: a file reference like ./README.md or docs/guide.md
// Everything else (mailto:, tel:, /root-anchored, #anchors) is dropped.
//
// The regexes are compiled once and shared, but they are never used with a
// stored cursor: every call scans its input from the start.
//
// Rust concepts:
// - LazyLock: a static that is initialised the first time it is used
// - Ranges: to remember which byte spans of the text were already claimed
// - Iterators: filter_map / filter to turn candidates into links
// =============================================================================

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;
use url::Url;

use super::parens::repair_unbalanced_parens;
use super::path::looks_like_file_path;

// ``` ... ``` fenced code blocks (across lines, shortest match)
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());

// [label](target)
//
// The target is one or more of:
//   - a group "(...)" whose body has no ')'
//   - a single character that is not a parenthesis or newline
// and it ends at the first ')' that does not close such a group.
// Only one level of nesting is balanced: for "a_(b_(c)))" the target
// stops at "a_(b_(c)" and the last ')' is left outside.
static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]*\]\(((?:\([^)\n]*\)|[^()\n])+)\)").unwrap()
});

// <http://...> and <https://...>
static AUTOLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(https?://[^>\s]*)>").unwrap());

// http(s):// followed by anything that isn't whitespace or a quote
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'`<>]*"#).unwrap());

// A link title after the destination: [a](url "Title") or [a](url 'Title')
static LINK_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+(?:"[^"]*"|'[^']*')$"#).unwrap());

// scheme ":" as in mailto:, tel:, ftp:, javascript:
static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap());

// scheme://label.label.tld[:port] followed by a path, query, fragment or
// nothing, with no whitespace anywhere
static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[A-Za-z0-9-]{1,63}\.)+[A-Za-z]{2,63}(?::\d{1,5})?(?:[/?#]\S*)?$").unwrap()
});

/// Which bucket a link falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// http:// or https:// URL, checked over the network
    Absolute,
    /// File reference, checked against the filesystem
    Relative,
}

/// A link found in a markdown document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Normalized target (fragment and query removed for relative links)
    pub target: String,
    pub kind: LinkKind,
    /// Text exactly as captured between the delimiters
    pub raw: String,
    /// Byte offset of the match in the text after code fences are removed
    pub offset: usize,
}

// Which pattern produced a candidate; decides how its target is normalized
#[derive(Debug, Clone, Copy)]
enum Shape {
    Inline,
    Autolink,
    Bare,
}

struct Candidate<'a> {
    offset: usize,
    raw: &'a str,
    shape: Shape,
}

// Extracts all absolute (http/https) URLs from markdown text
//
// Example input:
//   "Check out [Rust](https://www.rust-lang.org)!"
//
// Example output:
//   vec!["https://www.rust-lang.org"]
pub fn extract_absolute_links(markdown: &str) -> Vec<String> {
    extract_links(markdown)
        .into_iter()
        .filter(|link| link.kind == LinkKind::Absolute)
        .map(|link| link.target)
        .collect()
}

// Extracts all relative file references from markdown text
//
// Example input:
//   "See [the guide](docs/guide.md#install)"
//
// Example output:
//   vec!["docs/guide.md"]
pub fn extract_relative_links(markdown: &str) -> Vec<String> {
    extract_links(markdown)
        .into_iter()
        .filter(|link| link.kind == LinkKind::Relative)
        .map(|link| link.target)
        .collect()
}

// Extracts every link, absolute and relative, in the order they appear
//
// Duplicates (same kind and target) are dropped; the first occurrence wins.
pub fn extract_links(markdown: &str) -> Vec<Link> {
    let text = strip_code_fences(markdown);

    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    for caps in INLINE_LINK.captures_iter(&text) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        claimed.push(whole.range());
        candidates.push(Candidate {
            offset: whole.start(),
            raw: target.as_str(),
            shape: Shape::Inline,
        });
    }

    let mut autolinks = Vec::new();
    for caps in AUTOLINK.captures_iter(&text) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if overlaps(&claimed, &whole.range()) {
            continue;
        }
        autolinks.push(whole.range());
        candidates.push(Candidate {
            offset: whole.start(),
            raw: target.as_str(),
            shape: Shape::Autolink,
        });
    }
    claimed.extend(autolinks);
    // Both lists are in start order; merge them so overlaps() can bisect
    claimed.sort_by_key(|span| span.start);

    for m in BARE_URL.find_iter(&text) {
        if overlaps(&claimed, &m.range()) {
            continue;
        }
        candidates.push(Candidate {
            offset: m.start(),
            raw: m.as_str(),
            shape: Shape::Bare,
        });
    }

    // Spans never overlap, so sorting by start gives document order
    candidates.sort_by_key(|c| c.offset);

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter_map(classify)
        .filter(|link| seen.insert((link.kind, link.target.clone())))
        .collect()
}

// Removes ``` fenced code blocks so code samples don't produce links
//
// Each block is replaced by a newline so text on either side doesn't
// get glued together into something that looks like a link.
pub fn strip_code_fences(markdown: &str) -> String {
    CODE_FENCE.replace_all(markdown, "\n").into_owned()
}

// Checks that an absolute URL has a believable host: dotted labels of
// letters, digits and '-' (at most 63 each) ending in an alphabetic TLD.
// It must also parse as a URL, which rules out ports above 65535.
pub fn is_url_shaped(url: &str) -> bool {
    URL_SHAPE.is_match(url) && Url::parse(url).is_ok()
}

// `claimed` holds non-overlapping spans sorted by start, so the only span
// that can overlap is the first one ending after `span` starts
fn overlaps(claimed: &[Range<usize>], span: &Range<usize>) -> bool {
    let idx = claimed.partition_point(|c| c.end <= span.start);
    claimed.get(idx).is_some_and(|c| c.start < span.end)
}

// Turns a raw candidate into a Link, or None if it should be dropped
fn classify(candidate: Candidate) -> Option<Link> {
    let target = match candidate.shape {
        Shape::Inline => normalize_destination(candidate.raw),
        Shape::Autolink => candidate.raw.trim().to_string(),
        Shape::Bare => trim_prose_punctuation(candidate.raw).to_string(),
    };

    if target.starts_with("http://") || target.starts_with("https://") {
        let url = repair_unbalanced_parens(&target);
        if !is_url_shaped(&url) {
            return None;
        }
        return Some(Link {
            target: url,
            kind: LinkKind::Absolute,
            raw: candidate.raw.to_string(),
            offset: candidate.offset,
        });
    }

    // mailto:, tel:, ftp: ... and root-anchored paths are not ours to check
    if URL_SCHEME.is_match(&target) || target.starts_with('/') {
        return None;
    }

    let path = strip_fragment_and_query(&target).trim();
    if path.is_empty() || !looks_like_file_path(path) {
        return None;
    }

    Some(Link {
        target: path.to_string(),
        kind: LinkKind::Relative,
        raw: candidate.raw.to_string(),
        offset: candidate.offset,
    })
}

// Cleans up what was captured between ( and ) of an inline link:
//   " <my file.md> "          -> "my file.md"
//   "https://a.com \"Title\"" -> "https://a.com"
fn normalize_destination(raw: &str) -> String {
    let target = raw.trim();

    if let Some(inner) = target.strip_prefix('<') {
        if let Some(end) = inner.find('>') {
            return inner[..end].trim().to_string();
        }
    }

    let target = match LINK_TITLE.find(target) {
        Some(title) => &target[..title.start()],
        None => target,
    };
    target.trim().to_string()
}

// Drops punctuation that belongs to the sentence rather than the URL
//
// A trailing ')' is only dropped while there are more ')' than '(',
// so "https://en.wikipedia.org/wiki/C_(programming_language)" survives
// but "(see https://example.com)" loses its closing paren.
fn trim_prose_punctuation(url: &str) -> &str {
    let mut url = url;
    loop {
        match url.chars().last() {
            Some('.' | ',' | ';' | ':' | '!' | '?') => url = &url[..url.len() - 1],
            Some(')') if url.matches(')').count() > url.matches('(').count() => {
                url = &url[..url.len() - 1]
            }
            _ => return url,
        }
    }
}

fn strip_fragment_and_query(target: &str) -> &str {
    match target.find(['#', '?']) {
        Some(idx) => &target[..idx],
        None => target,
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why regexes instead of a full markdown parser?
//    - We only care about link targets, not about rendering
//    - Prose and half-broken markdown still contain links worth checking,
//      and a strict parser would skip them
//
// 2. Why only one level of nested parentheses?
//    - The regex crate has no recursion, so arbitrary nesting can't be
//      expressed. One level covers Wikipedia's "Title_(disambiguation)"
//    - A doubly nested target keeps its inner ')' but loses the outer one
//
// 3. Why does `Candidate` borrow from `text`?
//    - Candidates only live until classify() turns them into owned Links,
//      so there is no need to copy every raw match up front
// -----------------------------------------------------------------------------
