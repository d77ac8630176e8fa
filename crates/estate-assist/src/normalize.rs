//! Text normalisation applied to queries and catalog text before matching.

use regex::Regex;
use std::sync::LazyLock;

// Compiled once, reused on every call.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex is valid"));
static NON_PRINTABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x20-\x7E]+").expect("non-printable regex is valid"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Strip tag-like substrings and non-printable/non-ASCII bytes, collapse
/// whitespace runs to single spaces and trim the ends.
///
/// Total and deterministic: never fails, same input gives same output.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = TAG_RE.replace_all(text, " ");
    let text = NON_PRINTABLE_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}
