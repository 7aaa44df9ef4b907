//! Alert delivery.

mod format;
mod telegram;

pub use format::{display_body, format_message, item_link, MAX_MESSAGE_CHARS};
pub use telegram::{TelegramNotifier, TELEGRAM_API_BASE};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Notification delivery errors. Logged by the caller, never retried.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Sends one formatted alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Dry-run notifier that only logs the message.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        info!(target: "reportwatch::alert", "{}", message);
        Ok(())
    }
}
