//! Submitter extraction.

use std::sync::LazyLock;

use regex::Regex;

static REPORTED_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\breported\s*by\s*:?\s*@?([A-Za-z0-9][A-Za-z0-9_.@-]{1,63})").unwrap()
});

/// Words that follow "Reported by" on cards without a submitter.
const NOT_AN_AUTHOR: &[&str] = &[
    "amount", "domain", "address", "addresses", "category", "description", "chain", "on", "the",
    "a", "an",
];

/// Find the submitter named after "Reported by".
pub fn extract_author(text: &str) -> Option<String> {
    REPORTED_BY.captures_iter(text).find_map(|caps| {
        let name = caps[1].trim_end_matches(['.', '-']);
        let lower = name.to_lowercase();
        (!name.is_empty() && !NOT_AN_AUTHOR.contains(&lower.as_str())).then(|| name.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_by() {
        assert_eq!(
            extract_author("5 minutes ago Reported by satoshi_fan. Lost 1 BTC"),
            Some("satoshi_fan".to_string())
        );
        assert_eq!(
            extract_author("Reported by: @crypto.victim"),
            Some("crypto.victim".to_string())
        );
    }

    #[test]
    fn test_label_after_reported_by_is_not_author() {
        assert_eq!(extract_author("Reported by Amount lost 5 USD"), None);
        assert_eq!(extract_author("no submitter"), None);
    }
}
