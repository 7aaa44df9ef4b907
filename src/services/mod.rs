//! Detection logic shared by the poll loop, CLI and control surface.

pub mod fingerprint;
pub mod freshness;
pub mod notify;

pub use fingerprint::{fingerprint, fingerprint_prefix, normalize_body};
pub use freshness::{is_fresh, FreshnessPolicy};
pub use notify::{format_message, item_link, LogNotifier, Notifier, NotifyError, TelegramNotifier};
