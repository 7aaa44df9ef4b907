//! Report category detection.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::OTHER_CATEGORY;
use crate::utils::collapse_whitespace;

const MIN_CATEGORY_LEN: usize = 3;
const MAX_CATEGORY_LEN: usize = 60;
const MAX_CATEGORY_WORDS: usize = 6;

/// Words that close a category heading.
const CATEGORY_NOUNS: &[&str] = &[
    "scam", "scheme", "fraud", "pull", "phishing", "hack", "exploit", "theft", "extortion",
    "impersonation", "ransomware", "swap", "other",
];

/// Keyword taxonomy, first match wins. Keywords are matched against the
/// lowercased item text.
static TAXONOMY: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Pig Butchering Scam", r"pig[\s-]?butcher"),
        ("Rug Pull", r"rug[\s-]?pull"),
        ("Sextortion Scam", r"sextortion"),
        ("Ransomware", r"ransomware|files (?:were |are )?encrypted"),
        ("SIM Swap Scam", r"sim[\s-]?swap"),
        ("Romance Scam", r"romance|dating (?:app|site)"),
        ("Airdrop Scam", r"airdrop"),
        ("Giveaway Scam", r"giveaway|double your"),
        ("Impersonation Scam", r"impersonat|pretend(?:ed|ing) to be|fake support"),
        ("Phishing Scam", r"phishing|seed phrase|recovery phrase|fake (?:website|login)"),
        ("Fake Project Scam", r"fake (?:project|token|nft)|honeypot"),
        ("Ponzi Scheme", r"ponzi|pyramid scheme"),
        ("Investment Scam", r"investment|trading platform|guaranteed (?:profit|return)"),
        ("Hack / Exploit", r"\bhack(?:ed|er)?\b|exploit|drained"),
        ("Extortion Scam", r"extortion|blackmail"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

/// Resolve the category for an item.
///
/// `leading` is the text before the item's recency phrase, if any. It is used
/// when it looks like a category label; otherwise the keyword taxonomy is
/// applied to `text`.
pub fn detect_category(leading: Option<&str>, text: &str) -> String {
    leading
        .map(collapse_whitespace)
        .filter(|l| is_plausible_category(l))
        .or_else(|| classify_by_keywords(text).map(str::to_string))
        .unwrap_or_else(|| OTHER_CATEGORY.to_string())
}

/// Whether `candidate` reads as a category heading on its own ("Rug Pull",
/// "Fake Exchange Scam"): a plausible label that either names a known
/// category or ends in a category noun. "Contacted me" is not one.
pub fn is_category_label(candidate: &str) -> bool {
    let candidate = collapse_whitespace(candidate);
    if !is_plausible_category(&candidate) {
        return false;
    }
    let last_word = candidate
        .rsplit(' ')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    classify_by_keywords(&candidate).is_some() || CATEGORY_NOUNS.contains(&last_word.as_str())
}

/// Keyword-taxonomy classification.
pub fn classify_by_keywords(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    TAXONOMY
        .iter()
        .find(|(_, pattern)| pattern.is_match(&lower))
        .map(|(name, _)| *name)
}

/// Reject leading phrases that are too short, too long, carry a URL, or read
/// like a sentence fragment rather than a label.
fn is_plausible_category(candidate: &str) -> bool {
    let len = candidate.chars().count();
    if !(MIN_CATEGORY_LEN..=MAX_CATEGORY_LEN).contains(&len) {
        return false;
    }

    let lower = candidate.to_lowercase();
    if lower.contains("http") || lower.contains("www.") || lower.contains("://") {
        return false;
    }

    if candidate.split_whitespace().count() > MAX_CATEGORY_WORDS {
        return false;
    }

    // Labels are capitalised and carry no sentence punctuation.
    let starts_upper = candidate.chars().next().is_some_and(|c| c.is_uppercase());
    starts_upper && !candidate.contains(['.', ',', ';', '!', '?'])
}
