//! Telegram Bot API notifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Notifier, NotifyError};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts alerts to one chat through `sendMessage`.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    /// Point at another Bot API server (self-hosted or test double).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text: message,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        // The request URL carries the bot token, keep it out of errors.
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Connection(e.without_url().to_string()))?;

        let status = resp.status();
        let body: ApiResponse = resp
            .json()
            .await
            .map_err(|e| NotifyError::Parse(e.without_url().to_string()))?;

        if !status.is_success() || !body.ok {
            return Err(NotifyError::Api(format!(
                "HTTP {}: {}",
                status,
                body.description.unwrap_or_default()
            )));
        }

        debug!("Alert delivered to chat {}", self.chat_id);
        Ok(())
    }
}
