//! Candidate items scraped from one fetch of the listing page.

use serde::Serialize;

use super::WalletAddress;

/// Category assigned when neither the leading phrase nor the keyword taxonomy match.
pub const OTHER_CATEGORY: &str = "Other";

/// Author shown when no submitter could be found.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// One report entry as observed during a single poll cycle.
///
/// Built once by the extractor and never mutated; only its fingerprint
/// outlives the cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateItem {
    /// Unprocessed text of the entry.
    pub raw_text: String,
    /// Index within this fetch's item list.
    pub position: usize,
    /// Report category, `OTHER_CATEGORY` when unmatched.
    pub category: String,
    /// Submitter, if the entry names one.
    pub author: Option<String>,
    /// Relative time as displayed, e.g. "5 minutes ago".
    pub recency_phrase: String,
    /// Amount with currency code, e.g. "1,234.56 USD".
    pub monetary_amount: Option<String>,
    /// Reported domain name.
    pub domain: Option<String>,
    /// Wallet addresses, de-duplicated and de-fragmented.
    pub addresses: Vec<WalletAddress>,
    /// Identifier of the entry's detail page.
    pub detail_id: Option<String>,
}

impl CandidateItem {
    /// Author or the `unknown` sentinel.
    pub fn author_or_unknown(&self) -> &str {
        self.author.as_deref().unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Plain address strings, in extraction order.
    pub fn address_strings(&self) -> Vec<&str> {
        self.addresses.iter().map(|a| a.address.as_str()).collect()
    }
}
