//! Content fingerprints for scraped items.
//!
//! A fingerprint identifies what a report says, not when it was seen: the
//! recency phrase and position are left out, whitespace is collapsed and
//! glued tokens are split before hashing.

use sha2::{Digest, Sha256};

use crate::models::CandidateItem;
use crate::utils::{collapse_whitespace, repair_concatenation, RECENCY_PATTERN};

/// Stands in for every recency phrase in the normalized body.
pub const RECENCY_PLACEHOLDER: &str = "<time>";

/// Hex characters shown when a fingerprint is displayed.
pub const PREFIX_LEN: usize = 12;

/// Normalize item text for hashing.
pub fn normalize_body(text: &str) -> String {
    let padded = format!(" {} ", RECENCY_PLACEHOLDER);
    let without_time = RECENCY_PATTERN.replace_all(text, padded.as_str());
    collapse_whitespace(&repair_concatenation(&without_time))
}

/// SHA-256 over category, normalized body and author, hex encoded.
pub fn fingerprint(item: &CandidateItem) -> String {
    let mut hasher = Sha256::new();
    hasher.update(collapse_whitespace(&item.category).as_bytes());
    hasher.update([0x1f]);
    hasher.update(normalize_body(&item.raw_text).as_bytes());
    hasher.update([0x1f]);
    hasher.update(item.author_or_unknown().as_bytes());
    hex::encode(hasher.finalize())
}

/// Short form for logs and status output.
pub fn fingerprint_prefix(fingerprint: &str) -> &str {
    fingerprint.get(..PREFIX_LEN).unwrap_or(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: &str, raw_text: &str, author: Option<&str>) -> CandidateItem {
        CandidateItem {
            raw_text: raw_text.to_string(),
            position: 0,
            category: category.to_string(),
            author: author.map(str::to_string),
            recency_phrase: String::new(),
            monetary_amount: None,
            domain: None,
            addresses: Vec::new(),
            detail_id: None,
        }
    }

    #[test]
    fn test_invariant_to_recency_and_whitespace() {
        let a = item(
            "Phishing Scam",
            "Phishing Scam 2 minutes ago Reported by alice  fake   airdrop site",
            Some("alice"),
        );
        let b = item(
            "Phishing Scam",
            "Phishing Scam\n6 minutes agoReported by alice fake airdrop site",
            Some("alice"),
        );
        let c = item(
            "Phishing Scam",
            "Phishing Scam just now Reported by alice fake airdrop site",
            Some("alice"),
        );
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn test_position_ignored() {
        let a = item("Rug Pull", "Rug Pull 1 hour ago token gone", None);
        let mut b = a.clone();
        b.position = 7;
        b.recency_phrase = "1 hour ago".to_string();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_near_miss_differs() {
        let base = item("Phishing Scam", "Phishing Scam 2 minutes ago lost 500 USD", None);
        let other_amount = item("Phishing Scam", "Phishing Scam 2 minutes ago lost 600 USD", None);
        let other_category = item("Romance Scam", "Phishing Scam 2 minutes ago lost 500 USD", None);
        let other_author = item(
            "Phishing Scam",
            "Phishing Scam 2 minutes ago lost 500 USD",
            Some("bob"),
        );

        let fp = fingerprint(&base);
        assert_ne!(fp, fingerprint(&other_amount));
        assert_ne!(fp, fingerprint(&other_category));
        assert_ne!(fp, fingerprint(&other_author));
    }

    #[test]
    fn test_missing_author_is_unknown() {
        let none = item("Other", "text", None);
        let unknown = item("Other", "text", Some("unknown"));
        assert_eq!(fingerprint(&none), fingerprint(&unknown));
    }

    #[test]
    fn test_normalize_body() {
        assert_eq!(
            normalize_body("Rug Pull3 hours agoReported by  bob"),
            "Rug Pull <time> Reported by bob"
        );
    }

    #[test]
    fn test_hex_output() {
        let fp = fingerprint(&item("Other", "x", None));
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fingerprint_prefix(&fp).len(), PREFIX_LEN);
        assert_eq!(fingerprint_prefix("abc"), "abc");
    }
}
