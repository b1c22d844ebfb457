// src/extract/path.rs
// =============================================================================
// This module decides whether a relative link target looks like a file.
//
// Markdown in the wild is messy. Text that matches [label](target) is not
// always a link: code snippets like `foo[i](arg1, arg2)` or prose like
// [see](the section below) match too. Before we go looking for a file on
// disk we ask: "does this look like a path at all?"
//
// This is a heuristic, not a grammar. The rules below are applied in order
// and the first one that fires decides.
// =============================================================================

// File extensions we always treat as real file references
// (documents, code, markup, data, images)
const KNOWN_EXTENSIONS: &[&str] = &[
    // documents
    "md", "markdown", "mdx", "txt", "rst", "adoc", "org", "pdf", "html", "htm",
    // code
    "rs", "py", "js", "mjs", "cjs", "ts", "tsx", "jsx", "go", "java", "kt", "c", "h", "cc",
    "cpp", "hpp", "cs", "rb", "php", "swift", "sh", "bash", "zsh", "ps1", "sql", "lua",
    // markup and styles
    "css", "scss", "sass", "less", "xml", "svg", "vue",
    // data and config
    "json", "yaml", "yml", "toml", "ini", "cfg", "conf", "csv", "tsv", "lock", "ipynb",
    // images
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "ico", "avif",
];

// Bare code symbols that show up between parentheses in snippets
const CODE_SYMBOLS: &[&str] = &["=", "->", "=>", "{", "}", "()", "[]"];

// Returns true when a (fragment- and query-free) relative link target
// is worth checking as a file reference
//
// Examples:
//   "path/to/file.md" -> true
//   "directory/"      -> true
//   "arg1, arg2"      -> false  (looks like function arguments)
//   "key: value"      -> false  (looks like an object literal)
//   "123"             -> false  (just a number)
pub fn looks_like_file_path(candidate: &str) -> bool {
    // "./name" reads like an import specifier, not a file
    if let Some(rest) = candidate.strip_prefix("./") {
        if !rest.contains('/') && !rest.contains('.') {
            return false;
        }
    }

    if has_known_extension(candidate) {
        return true;
    }

    let spaces = candidate.matches(' ').count();

    if (candidate.contains('/') || candidate.contains('\\')) && spaces <= 1 {
        return true;
    }

    if spaces > 0 && candidate.contains([',', ':', '{', '}', '`']) {
        return false;
    }

    if CODE_SYMBOLS.contains(&candidate) || is_all_digits(candidate) {
        return false;
    }

    // A whole sentence in parentheses
    if candidate.split_whitespace().count() > 3 {
        return false;
    }

    true
}

fn has_known_extension(candidate: &str) -> bool {
    let file_name = candidate.rsplit(['/', '\\']).next().unwrap_or(candidate);
    match file_name.rsplit_once('.') {
        Some((_, ext)) => KNOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

fn is_all_digits(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit())
}
