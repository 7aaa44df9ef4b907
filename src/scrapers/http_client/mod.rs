//! HTTP fetcher for the listing page.

mod user_agent;

pub use user_agent::{UserAgent, USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use tracing::debug;

use super::{FetchError, FetchResponse, Fetcher};
use crate::config::ProxyConfig;

/// Options for building an [`HttpFetcher`].
#[derive(Debug, Clone, Default)]
pub struct FetcherOptions {
    pub timeout: Duration,
    /// None = crate user agent, "impersonate" = real browser, other = literal.
    pub user_agent: Option<String>,
    /// Extra request headers sent with every fetch.
    pub headers: Vec<(String, String)>,
    pub proxy: Option<ProxyConfig>,
}

/// reqwest-backed [`Fetcher`].
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build the client. Invalid headers or proxy settings fail here rather
    /// than on the first fetch.
    pub fn new(options: &FetcherOptions) -> Result<Self, FetchError> {
        let user_agent = UserAgent::from_config(options.user_agent.as_deref()).header_value();

        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::Client(format!("invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::Client(format!("invalid value for header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let mut builder = Client::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .timeout(options.timeout)
            .gzip(true)
            .brotli(true);

        if let Some(proxy) = &options.proxy {
            let proxy = Proxy::all(proxy.url())
                .map_err(|e| FetchError::Client(format!("invalid proxy: {}", e)))?
                .basic_auth(&proxy.username, &proxy.password);
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content = response.text().await?;
        debug!("Fetched {} ({} bytes, HTTP {})", url, content.len(), status.as_u16());

        Ok(FetchResponse {
            content,
            status: status.as_u16(),
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_proxy_and_headers() {
        let options = FetcherOptions {
            timeout: Duration::from_secs(5),
            user_agent: Some("impersonate".to_string()),
            headers: vec![("Accept-Language".to_string(), "en-US".to_string())],
            proxy: Some("proxy.local:8080:user:secret".parse().unwrap()),
        };
        assert!(HttpFetcher::new(&options).is_ok());
    }

    #[test]
    fn test_rejects_bad_header() {
        let options = FetcherOptions {
            timeout: Duration::from_secs(5),
            headers: vec![("bad header".to_string(), "x".to_string())],
            ..Default::default()
        };
        assert!(matches!(HttpFetcher::new(&options), Err(FetchError::Client(_))));
    }
}
