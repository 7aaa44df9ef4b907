//! Text clean-up for page content flattened from the DOM.
//!
//! Text nodes on the listing page are frequently concatenated without a
//! separator ("…DivfNaReported by"), so both the extractor and the
//! fingerprinter repair those seams before doing anything else.

use std::sync::LazyLock;

use regex::Regex;

/// Field labels that appear glued to the preceding value.
static LABEL_SEAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([A-Za-z0-9])(Reported|Report|Amount|Domain|Addresses|Address|Category|Submitted|Description|Website|Chain|Lost)\b",
    )
    .unwrap()
});

/// Lowercase letter immediately followed by a capitalised word.
static CAMEL_SEAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z][a-z]{2,})").unwrap());

/// "<n> <unit> ago" glued to a following capital letter.
static AGO_SEAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:(\d+\s*[a-z]+\s*ago))([A-Z])").unwrap()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Insert a space before known field labels glued to the previous token.
///
/// This is the conservative repair used before pattern scans: it never
/// splits inside a wallet address unless the address is followed by a label.
pub fn split_label_seams(s: &str) -> String {
    LABEL_SEAM.replace_all(s, "$1 $2").into_owned()
}

/// Full repair used for fingerprinting: label seams, "ago" seams and
/// lowercase-to-capitalised-word seams.
pub fn repair_concatenation(s: &str) -> String {
    let s = split_label_seams(s);
    let s = AGO_SEAM.replace_all(&s, "$1 $2");
    CAMEL_SEAM.replace_all(&s, "$1 $2").into_owned()
}

/// Truncate to at most `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
