//! Relative-time phrases as rendered on the listing page ("5 minutes ago").

use std::sync::LazyLock;

use regex::Regex;

/// Matches a recency phrase anywhere in a block of text.
///
/// The numeric branch has no leading word boundary so that phrases glued to
/// the preceding word ("Scam5 minutes ago") still match, and there is no
/// trailing boundary so "agoReported" matches too.
pub static RECENCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\bjust now|\ba few seconds ago|(?:\babout\s+)?(?:\d+|\ban?)\s*(?:seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?)\s*ago)",
    )
    .unwrap()
});

/// Anchored form used to interpret a single phrase.
static PHRASE_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:about\s+)?(\d+|an?|a few)\s*(seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?)\s*ago$",
    )
    .unwrap()
});

/// Unit of a parsed recency phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// A recency phrase broken into quantity and unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    /// "just now"
    Now,
    /// "a few seconds ago"
    FewSeconds,
    /// "<n> <unit> ago"; "a"/"an" read as 1.
    Ago(u64, RecencyUnit),
}

/// Find the first recency phrase in `text`.
pub fn find_recency(text: &str) -> Option<regex::Match<'_>> {
    RECENCY_PATTERN.find(text)
}

/// Parse a recency phrase. Returns `None` for anything unrecognised.
pub fn parse_recency(phrase: &str) -> Option<Recency> {
    let normalized = phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    match normalized.as_str() {
        "just now" => return Some(Recency::Now),
        "a few seconds ago" => return Some(Recency::FewSeconds),
        _ => {}
    }

    let caps = PHRASE_PARTS.captures(&normalized)?;
    let quantity = match &caps[1] {
        "a" | "an" => 1,
        "a few" => return None,
        digits => digits.parse().ok()?,
    };
    let unit = match caps[2].trim_end_matches('s') {
        "second" | "sec" => RecencyUnit::Second,
        "minute" | "min" => RecencyUnit::Minute,
        "hour" | "hr" => RecencyUnit::Hour,
        "day" => RecencyUnit::Day,
        "week" => RecencyUnit::Week,
        "month" => RecencyUnit::Month,
        "year" => RecencyUnit::Year,
        _ => return None,
    };

    Some(Recency::Ago(quantity, unit))
}
