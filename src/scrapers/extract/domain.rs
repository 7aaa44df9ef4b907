//! Reported-domain extraction.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// TLDs accepted by the bare-domain scan. Explicit markers and URLs are not
/// restricted to this list.
const KNOWN_TLDS: &[&str] = &[
    "com", "net", "org", "io", "co", "xyz", "app", "finance", "exchange", "info", "biz",
    "online", "site", "top", "vip", "club", "live", "pro", "cc", "me", "us", "uk", "ru", "cn",
    "tech", "trade", "ai", "dev", "shop", "store", "link", "money", "cash", "network",
    "digital", "world", "global", "capital", "fund", "market", "website", "space", "ltd",
    "group", "icu", "asia", "in", "to", "gg", "fi", "ly",
];

const MIN_DOMAIN_LEN: usize = 4;

static DOMAIN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)reported\s*domain\s*:?\s*(?:https?://)?(?:www\.)?([a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)+)",
    )
    .unwrap()
});

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>()]+"#).unwrap());

static BARE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+([a-z]{2,24}))\b").unwrap()
});

/// Find the reported domain in `text`, ignoring any host in `ignored_hosts`
/// (typically the monitored site itself).
///
/// Preference order: an explicit "Reported domain" marker, the host of the
/// first URL, then a bare domain with a known TLD.
pub fn extract_domain(text: &str, ignored_hosts: &[String]) -> Option<String> {
    let is_ignored = |domain: &str| {
        ignored_hosts
            .iter()
            .any(|h| domain == h || domain.ends_with(&format!(".{}", h)))
    };

    if let Some(domain) = DOMAIN_MARKER
        .captures(text)
        .map(|c| normalize(&c[1]))
        .filter(|d| is_valid_domain(d))
    {
        return Some(domain);
    }

    let from_url = URL_PATTERN.find_iter(text).find_map(|m| {
        let host = Url::parse(m.as_str()).ok()?.host_str()?.to_string();
        let host = normalize(&host);
        (is_valid_domain(&host) && !is_ignored(&host)).then_some(host)
    });
    if from_url.is_some() {
        return from_url;
    }

    BARE_DOMAIN.captures_iter(text).find_map(|c| {
        let tld = c[2].to_ascii_lowercase();
        if !KNOWN_TLDS.contains(&tld.as_str()) {
            return None;
        }
        let domain = normalize(&c[1]);
        (is_valid_domain(&domain) && !is_ignored(&domain)).then_some(domain)
    })
}

fn normalize(domain: &str) -> String {
    let lower = domain.trim_end_matches('.').to_ascii_lowercase();
    lower.strip_prefix("www.").map(str::to_string).unwrap_or(lower)
}

/// Minimal structural validation: a dot, no empty label, sane length, no
/// label starting or ending with a hyphen, alphabetic TLD.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.len() < MIN_DOMAIN_LEN || domain.len() > 253 || !domain.contains('.') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels
        .iter()
        .any(|l| l.is_empty() || l.starts_with('-') || l.ends_with('-'))
    {
        return false;
    }
    labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignored() -> Vec<String> {
        vec!["chainabuse.com".to_string()]
    }

    #[test]
    fn test_marker_preferred() {
        let text = "see https://other.io/x Reported Domain: www.Fake-Exchange.com";
        assert_eq!(
            extract_domain(text, &ignored()),
            Some("fake-exchange.com".to_string())
        );
    }

    #[test]
    fn test_url_host_fallback_skips_ignored() {
        let text = "https://www.chainabuse.com/report/1 victim sent funds via https://pay.scam-wallet.app/login";
        assert_eq!(
            extract_domain(text, &ignored()),
            Some("pay.scam-wallet.app".to_string())
        );
    }

    #[test]
    fn test_bare_domain_requires_known_tld() {
        assert_eq!(
            extract_domain("they told me to log in at cryptotrade.vip today", &ignored()),
            Some("cryptotrade.vip".to_string())
        );
        assert_eq!(extract_domain("file named report.pdf attached", &ignored()), None);
    }

    #[test]
    fn test_no_domain() {
        assert_eq!(extract_domain("lost 500 USD, no website", &ignored()), None);
    }

    #[test]
    fn test_is_valid_domain() {
        assert!(is_valid_domain("a.io"));
        assert!(is_valid_domain("scam-site.com"));
        assert!(!is_valid_domain("localhost"));
        assert!(!is_valid_domain("a..com"));
        assert!(!is_valid_domain("-bad.com"));
        assert!(!is_valid_domain("x.c"));
        assert!(!is_valid_domain("site.c0m"));
    }
}
