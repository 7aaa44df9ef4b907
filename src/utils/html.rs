//! HTML helpers shared by the extractor and the alert formatter.

use std::sync::LazyLock;

use regex::Regex;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:[a-zA-Z][a-zA-Z0-9-]*|!doctype|!--)").unwrap());

/// Escape text for Telegram's HTML parse mode.
///
/// Telegram only recognises `&lt;`, `&gt;`, `&amp;` and `&quot;`, so this
/// escapes exactly those.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Heuristic check for markup, used to pick between DOM and plain-text extraction.
pub fn looks_like_html(raw: &str) -> bool {
    let mut end = raw.len().min(4096);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    TAG_PATTERN.is_match(&raw[..end].to_ascii_lowercase())
}
