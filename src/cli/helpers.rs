//! Wiring shared by several commands.

use crate::config::Settings;
use crate::monitor::Monitor;
use crate::repository::DedupStore;
use crate::scrapers::{Extractor, HttpFetcher};
use crate::services::{LogNotifier, Notifier, TelegramNotifier};

/// Open the dedup store named by the settings, loading any saved state.
pub fn open_store(settings: &Settings) -> DedupStore {
    DedupStore::open(&settings.state_path, settings.max_fingerprints)
}

pub fn build_extractor(settings: &Settings) -> anyhow::Result<Extractor> {
    Ok(Extractor::new(settings.extractor.clone())?)
}

pub fn build_fetcher(settings: &Settings) -> anyhow::Result<HttpFetcher> {
    Ok(HttpFetcher::new(&settings.fetcher_options())?)
}

/// Telegram when credentials are configured, otherwise a log-only dry run.
pub fn build_notifier(settings: &Settings) -> anyhow::Result<Box<dyn Notifier>> {
    match &settings.telegram {
        Some(telegram) => {
            let mut notifier = TelegramNotifier::new(
                &telegram.bot_token,
                &telegram.chat_id,
                settings.request_timeout,
            )?;
            if let Some(api_base) = &telegram.api_base {
                notifier = notifier.with_api_base(api_base);
            }
            Ok(Box::new(notifier))
        }
        None => {
            tracing::warn!("No Telegram credentials configured, alerts will only be logged");
            Ok(Box::new(LogNotifier))
        }
    }
}

/// Assemble a running monitor from settings.
pub fn build_monitor(settings: &Settings) -> anyhow::Result<Monitor> {
    let store = open_store(settings);
    tracing::info!(
        path = %store.path().display(),
        fingerprints = store.len(),
        "Loaded dedup store"
    );

    Ok(Monitor::new(
        settings.monitor_config(),
        Box::new(build_fetcher(settings)?),
        build_notifier(settings)?,
        build_extractor(settings)?,
        store,
    ))
}

/// Parse a bind address that can be:
/// - Just a port: "8787" -> 127.0.0.1:8787
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8787
/// - Host and port: "0.0.0.0:9000" -> 0.0.0.0:9000
pub fn parse_bind_address(bind: &str, default_port: u16) -> (String, u16) {
    if let Ok(port) = bind.parse::<u16>() {
        return ("127.0.0.1".to_string(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return (host.to_string(), port);
        }
    }

    (bind.to_string(), default_port)
}
