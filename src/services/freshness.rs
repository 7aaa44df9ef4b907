//! Freshness classification of recency phrases.

use serde::{Deserialize, Serialize};

use crate::utils::{parse_recency, Recency, RecencyUnit};

/// Default upper bound for "<n> minutes ago".
pub const DEFAULT_MAX_MINUTES: u64 = 3;

/// Default upper bound for "<n> seconds ago"; 50 and above count as stale.
pub const DEFAULT_MAX_SECONDS: u64 = 49;

/// Thresholds deciding whether an item is recent enough to alert on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessPolicy {
    pub max_minutes: u64,
    pub max_seconds: u64,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            max_minutes: DEFAULT_MAX_MINUTES,
            max_seconds: DEFAULT_MAX_SECONDS,
        }
    }
}

impl FreshnessPolicy {
    /// Classify a recency phrase. Unparsable phrases are not fresh.
    pub fn is_fresh(&self, recency_phrase: &str) -> bool {
        match parse_recency(recency_phrase) {
            Some(Recency::Now | Recency::FewSeconds) => true,
            Some(Recency::Ago(n, RecencyUnit::Second)) => n <= self.max_seconds,
            Some(Recency::Ago(n, RecencyUnit::Minute)) => n <= self.max_minutes,
            Some(Recency::Ago(..)) | None => false,
        }
    }
}

/// Classify with the default thresholds.
pub fn is_fresh(recency_phrase: &str) -> bool {
    FreshnessPolicy::default().is_fresh(recency_phrase)
}
