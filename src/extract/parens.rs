// src/extract/parens.rs
// =============================================================================
// This module repairs URLs whose parentheses came out unbalanced.
//
// Why is this needed?
// - Markdown uses ')' to close a link: [text](target)
// - But URLs can contain parentheses too, e.g.
//     https://en.wikipedia.org/wiki/C_(programming_language)
// - Our link patterns only balance one level of nesting, and bare URLs in
//   prose lose trailing ')' characters to punctuation stripping
// - So sometimes we capture a URL with one paren too many or too few
//
// How it works:
// - Count '(' and ')'. If they match, the URL is left alone
// - Otherwise look up a repair rule by host (GitHub, Wikipedia, ...)
// - Hosts without a rule keep the URL as captured
//
// New domains are added by appending a RepairRule to REPAIR_RULES.
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// A repair strategy for one family of hosts
//
// host_matches: does this rule apply to the given (lowercased) host?
// repair: returns the fixed URL, or None to leave it untouched
pub struct RepairRule {
    pub name: &'static str,
    pub host_matches: fn(&str) -> bool,
    pub repair: fn(&str, &Url) -> Option<String>,
}

// The repair table, consulted in order; the first rule whose host matches
// and whose strategy produces a result wins
pub static REPAIR_RULES: &[RepairRule] = &[
    RepairRule {
        name: "github-blob",
        host_matches: is_github_host,
        repair: repair_github_blob,
    },
    RepairRule {
        name: "wikipedia-wiki",
        host_matches: is_wikipedia_host,
        repair: repair_wikipedia,
    },
];

// GitHub blob URL: everything through the last file extension in the path,
// optionally followed by a line-range fragment like #L10 or #L10-L20
static GITHUB_BLOB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://(?:www\.)?github\.com/[^/\s]+/[^/\s]+/blob/[^\s#?]*\.[A-Za-z0-9]+)(#L\d+(?:-L\d+)?)?")
        .unwrap()
});

// Returns true when the URL has as many '(' as ')'
pub fn is_balanced(url: &str) -> bool {
    let open = url.matches('(').count();
    let close = url.matches(')').count();
    open == close
}

// Fixes a URL whose parentheses don't balance
//
// Parameters:
//   url: an absolute URL as captured from markdown
//
// Returns: the repaired URL, or the input unchanged when it is balanced or
// no rule applies to its host
//
// Example:
//   "https://en.wikipedia.org/wiki/Foo)_bar" -> "https://en.wikipedia.org/wiki/Foo"
pub fn repair_unbalanced_parens(url: &str) -> String {
    if is_balanced(url) {
        return url.to_string();
    }

    // A URL that doesn't even parse has no host to dispatch on
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };
    let host = match parsed.host_str() {
        Some(host) => host.to_ascii_lowercase(),
        None => return url.to_string(),
    };

    for rule in REPAIR_RULES {
        if !(rule.host_matches)(&host) {
            continue;
        }
        if let Some(fixed) = (rule.repair)(url, &parsed) {
            tracing::debug!(rule = rule.name, from = url, to = %fixed, "repaired unbalanced parens");
            return fixed;
        }
    }

    url.to_string()
}

fn is_github_host(host: &str) -> bool {
    host == "github.com" || host == "www.github.com"
}

fn is_wikipedia_host(host: &str) -> bool {
    host.ends_with("wikipedia.org")
}

// Keep the blob path up to its file name, plus a line-range fragment if
// one follows immediately; anything after that is dropped
fn repair_github_blob(url: &str, parsed: &Url) -> Option<String> {
    if !parsed.path().contains("/blob/") {
        return None;
    }

    let caps = GITHUB_BLOB.captures(url)?;
    let mut fixed = caps[1].to_string();
    if let Some(lines) = caps.get(2) {
        fixed.push_str(lines.as_str());
    }
    Some(fixed)
}

// Cut the URL right before the first ')' that has no matching '('
fn repair_wikipedia(url: &str, parsed: &Url) -> Option<String> {
    if !parsed.path().starts_with("/wiki/") {
        return None;
    }

    let mut depth = 0usize;
    for (i, c) in url.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(url[..i].to_string()),
            ')' => depth -= 1,
            _ => {}
        }
    }

    // More '(' than ')': nothing to cut
    None
}
