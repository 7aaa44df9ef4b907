//! User agent selection.

use std::sync::atomic::{AtomicUsize, Ordering};

pub const USER_AGENT: &str = concat!("reportwatch/", env!("CARGO_PKG_VERSION"));

/// Browser agents used in impersonate mode. Listing pages served behind bot
/// protection reject unknown agents.
pub const BROWSER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:144.0) Gecko/20100101 Firefox/144.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/26.0 Safari/605.1.15",
];

static NEXT_BROWSER: AtomicUsize = AtomicUsize::new(0);

/// How the `User-Agent` header is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgent {
    /// `reportwatch/<version>`.
    Crate,
    /// A real browser agent, rotated each time a client is built.
    Impersonate,
    Custom(String),
}

impl UserAgent {
    /// Interpret the `user_agent` setting: unset is [`UserAgent::Crate`],
    /// `"impersonate"` (any case) rotates browser agents, anything else is sent as-is.
    pub fn from_config(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => UserAgent::Crate,
            Some(v) if v.eq_ignore_ascii_case("impersonate") => UserAgent::Impersonate,
            Some(v) => UserAgent::Custom(v.to_string()),
        }
    }

    /// Header value for the next client.
    pub fn header_value(&self) -> String {
        match self {
            UserAgent::Crate => USER_AGENT.to_string(),
            UserAgent::Impersonate => {
                let index = NEXT_BROWSER.fetch_add(1, Ordering::Relaxed) % BROWSER_AGENTS.len();
                BROWSER_AGENTS[index].to_string()
            }
            UserAgent::Custom(value) => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_uses_crate_agent() {
        assert_eq!(UserAgent::from_config(None), UserAgent::Crate);
        assert_eq!(UserAgent::from_config(Some("  ")), UserAgent::Crate);
        assert!(UserAgent::Crate.header_value().starts_with("reportwatch/"));
    }

    #[test]
    fn test_impersonate_rotates_browser_agents() {
        let agent = UserAgent::from_config(Some("Impersonate"));
        assert_eq!(agent, UserAgent::Impersonate);

        let first = agent.header_value();
        let second = agent.header_value();
        assert!(BROWSER_AGENTS.contains(&first.as_str()));
        assert!(BROWSER_AGENTS.contains(&second.as_str()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_custom_agent_passed_through() {
        assert_eq!(
            UserAgent::from_config(Some("ReportBot/2.0 (+ops@example.org)")).header_value(),
            "ReportBot/2.0 (+ops@example.org)"
        );
    }
}
