//! Page retrieval and item extraction.

pub mod extract;
mod http_client;

pub use extract::{extract, Extractor, ExtractorConfig, ExtractorError};
pub use http_client::{FetcherOptions, HttpFetcher, UserAgent, USER_AGENT};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Raw page body (HTML or text).
    pub content: String,
    /// HTTP status, always 2xx.
    pub status: u16,
    /// Timestamp of retrieval.
    pub fetched_at: DateTime<Utc>,
}

/// Fetch failures. All of them abort the current poll cycle only.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Retrieves the raw content of a listing page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`. Non-2xx responses are errors.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}
