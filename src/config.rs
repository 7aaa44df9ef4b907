//! Configuration loading for reportwatch.
//!
//! A config file (TOML, YAML or JSON) is discovered with the prefer crate or
//! given explicitly, environment variables override secrets and deployment
//! knobs, and the result is resolved into an immutable [`Settings`] that is
//! validated once at startup.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::monitor::MonitorConfig;
use crate::repository::DEFAULT_MAX_FINGERPRINTS;
use crate::scrapers::{Extractor, ExtractorConfig, ExtractorError, FetcherOptions};
use crate::services::FreshnessPolicy;

pub const DEFAULT_TARGET_URL: &str = "https://www.chainabuse.com/reports";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_STATE_FILENAME: &str = "sent_hashes.json";

/// Path segment of detail pages, appended to the target origin when no
/// explicit detail base URL is configured.
const DETAIL_PATH: &str = "/scam-report";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid proxy '{0}': expected host:port:username:password")]
    InvalidProxy(String),

    #[error("Invalid {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error(transparent)]
    Extractor(#[from] ExtractorError),
}

/// Forward proxy, parsed from `host:port:username:password`.
///
/// The password may itself contain colons; everything after the third colon
/// belongs to it.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl ProxyConfig {
    /// Proxy URL without credentials.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl FromStr for ProxyConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidProxy(mask_proxy(s));
        let mut parts = s.trim().splitn(4, ':');

        let host = parts.next().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
        let port = parts
            .next()
            .and_then(|p| p.parse::<u16>().ok())
            .filter(|p| *p != 0)
            .ok_or_else(invalid)?;
        let username = parts.next().filter(|u| !u.is_empty()).ok_or_else(invalid)?;
        let password = parts.next().ok_or_else(invalid)?;

        Ok(Self {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:***", self.host, self.port, self.username)
    }
}

/// Keep only the host part of a raw proxy string for error messages.
fn mask_proxy(raw: &str) -> String {
    match raw.split_once(':') {
        Some((host, _)) => format!("{}:***", host),
        None => raw.to_string(),
    }
}

/// Telegram credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
    /// Bot API server; `None` uses the public endpoint.
    pub api_base: Option<String>,
}

impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &mask_secret(&self.bot_token))
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Show the first four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "***".to_string()
    } else {
        format!("{}***", visible)
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listing page to poll.
    pub target_url: String,
    /// Detail links are `{detail_base_url}/{id}`.
    pub detail_base_url: String,
    pub poll_interval: Duration,
    pub data_dir: PathBuf,
    /// Dedup store file.
    pub state_path: PathBuf,
    pub max_fingerprints: usize,
    /// None = crate user agent, "impersonate" = browser agent, other = literal.
    pub user_agent: Option<String>,
    pub request_timeout: Duration,
    pub headers: Vec<(String, String)>,
    pub proxy: Option<ProxyConfig>,
    pub extractor: ExtractorConfig,
    pub freshness: FreshnessPolicy,
    /// Zero disables the amount filter.
    pub min_amount: f64,
    /// None runs in dry-run mode (alerts are only logged).
    pub telegram: Option<TelegramSettings>,
    /// Control surface listen address.
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reportwatch");

        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            detail_base_url: String::new(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            state_path: data_dir.join(DEFAULT_STATE_FILENAME),
            data_dir,
            max_fingerprints: DEFAULT_MAX_FINGERPRINTS,
            user_agent: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            headers: Vec::new(),
            proxy: None,
            extractor: ExtractorConfig::default(),
            freshness: FreshnessPolicy::default(),
            min_amount: 0.0,
            telegram: None,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    /// Check cross-field consistency and fill derived values. Called once by
    /// [`load_settings_with_options`].
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let target = Url::parse(&self.target_url).map_err(|e| ConfigError::InvalidValue {
            field: "target_url",
            message: e.to_string(),
        })?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "target_url",
                message: format!("unsupported scheme '{}'", target.scheme()),
            });
        }
        let host = target
            .host_str()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "target_url",
                message: "missing host".to_string(),
            })?
            .to_string();

        if self.detail_base_url.is_empty() {
            self.detail_base_url = format!(
                "{}{}",
                target.origin().ascii_serialization(),
                DETAIL_PATH
            );
        } else {
            Url::parse(&self.detail_base_url).map_err(|e| ConfigError::InvalidValue {
                field: "detail_base_url",
                message: e.to_string(),
            })?;
        }

        if !self.extractor.ignored_hosts.contains(&host) {
            self.extractor.ignored_hosts.push(host);
        }

        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_fingerprints == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_fingerprints",
                message: "must be greater than zero".to_string(),
            });
        }
        if !self.min_amount.is_finite() || self.min_amount < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "alert.min_amount",
                message: "must be a non-negative number".to_string(),
            });
        }

        Extractor::new(self.extractor.clone())?;
        Ok(())
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            target_url: self.target_url.clone(),
            detail_base_url: self.detail_base_url.clone(),
            freshness: self.freshness,
            min_amount: self.min_amount,
        }
    }

    pub fn fetcher_options(&self) -> FetcherOptions {
        FetcherOptions {
            timeout: self.request_timeout,
            user_agent: self.user_agent.clone(),
            headers: self.headers.clone(),
            proxy: self.proxy.clone(),
        }
    }

    /// Effective settings as display rows with secrets masked.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let none = || "(none)".to_string();
        vec![
            ("target_url", self.target_url.clone()),
            ("detail_base_url", self.detail_base_url.clone()),
            ("poll_interval", format!("{}s", self.poll_interval.as_secs())),
            ("data_dir", self.data_dir.display().to_string()),
            ("state_file", self.state_path.display().to_string()),
            ("max_fingerprints", self.max_fingerprints.to_string()),
            (
                "user_agent",
                self.user_agent.clone().unwrap_or_else(|| "(default)".to_string()),
            ),
            ("request_timeout", format!("{}s", self.request_timeout.as_secs())),
            ("headers", self.headers.len().to_string()),
            (
                "proxy",
                self.proxy.as_ref().map(|p| p.to_string()).unwrap_or_else(none),
            ),
            (
                "item_selector",
                self.extractor.item_selector.clone().unwrap_or_else(none),
            ),
            ("detail_pattern", self.extractor.detail_pattern.clone()),
            (
                "freshness",
                format!(
                    "<= {} minutes, <= {} seconds",
                    self.freshness.max_minutes, self.freshness.max_seconds
                ),
            ),
            ("min_amount", self.min_amount.to_string()),
            (
                "telegram",
                match &self.telegram {
                    Some(t) => format!("chat {} (token {})", t.chat_id, mask_secret(&t.bot_token)),
                    None => "disabled (dry run)".to_string(),
                },
            ),
            ("bind", self.bind.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreshnessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Minimum parsed amount for an alert; 0 disables the filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing page URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// Base URL for detail links (default: target origin + /scam-report).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Dedup store path (default: data_dir/sent_hashes.json).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fingerprints: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// `host:port:username:password`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// CSS selector for report cards; empty string disables the HTML path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_pattern: Option<String>,
    #[serde(default)]
    pub freshness: FreshnessConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for discovery. A missing or
    /// unreadable discovered file falls back to defaults.
    pub async fn load() -> Self {
        match prefer::load("reportwatch").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring discovered config: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file, format chosen by extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

        let mut config: Config = match ext {
            "json" => serde_json::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?
            }
            _ => toml::from_str(&contents).map_err(|e| parse_err(e.to_string()))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file; `~` is expanded.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Override secrets and deployment knobs from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an
    /// injectable lookup. Empty values are ignored.
    pub fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat) = get("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(chat);
        }
        if let Some(proxy) = get("REPORTWATCH_PROXY") {
            tracing::debug!("Using proxy from REPORTWATCH_PROXY");
            self.proxy = Some(proxy);
        }
        if let Some(url) = get("REPORTWATCH_TARGET_URL") {
            tracing::debug!("Using REPORTWATCH_TARGET_URL from environment: {}", url);
            self.target_url = Some(url);
        }
        if let Some(dir) = get("REPORTWATCH_DATA_DIR") {
            tracing::debug!("Using REPORTWATCH_DATA_DIR from environment: {}", dir);
            self.data_dir = Some(dir);
        }
    }

    /// Apply configuration to settings. `base_dir` resolves relative paths.
    pub fn apply_to_settings(
        &self,
        settings: &mut Settings,
        base_dir: &Path,
    ) -> Result<(), ConfigError> {
        if let Some(ref url) = self.target_url {
            settings.target_url = url.trim().to_string();
        }
        if let Some(ref base) = self.detail_base_url {
            settings.detail_base_url = base.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = self.poll_interval_secs {
            settings.poll_interval = Duration::from_secs(secs);
        }
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        settings.state_path = match self.state_file {
            Some(ref state_file) => self.resolve_path(state_file, base_dir),
            None => settings.data_dir.join(DEFAULT_STATE_FILENAME),
        };
        if let Some(cap) = self.max_fingerprints {
            settings.max_fingerprints = cap;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = Duration::from_secs(timeout);
        }
        settings.headers = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(ref proxy) = self.proxy {
            settings.proxy = Some(proxy.parse()?);
        }

        if let Some(ref selector) = self.item_selector {
            let selector = selector.trim();
            settings.extractor.item_selector =
                (!selector.is_empty()).then(|| selector.to_string());
        }
        if let Some(ref pattern) = self.detail_pattern {
            settings.extractor.detail_pattern = pattern.clone();
        }

        if let Some(minutes) = self.freshness.max_minutes {
            settings.freshness.max_minutes = minutes;
        }
        if let Some(seconds) = self.freshness.max_seconds {
            settings.freshness.max_seconds = seconds;
        }
        if let Some(min_amount) = self.alert.min_amount {
            settings.min_amount = min_amount;
        }

        settings.telegram = match (&self.telegram.bot_token, &self.telegram.chat_id) {
            (Some(token), Some(chat_id)) => Some(TelegramSettings {
                bot_token: token.clone(),
                chat_id: chat_id.clone(),
                api_base: self.telegram.api_base.clone(),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "telegram",
                    message: "bot_token and chat_id must be set together".to_string(),
                })
            }
        };

        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        Ok(())
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides discovery).
    pub config_path: Option<PathBuf>,
}

/// Load, override and validate settings. Returns (Settings, Config).
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let mut config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };
    config.apply_env_overrides();

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir)?;
    settings.validate()?;

    tracing::debug!(
        "Loaded settings (config file: {})",
        config
            .source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_proxy_parse() {
        let proxy: ProxyConfig = "proxy.example.net:3128:alice:p:ss".parse().unwrap();
        assert_eq!(proxy.host, "proxy.example.net");
        assert_eq!(proxy.port, 3128);
        assert_eq!(proxy.username, "alice");
        assert_eq!(proxy.password, "p:ss");
        assert_eq!(proxy.url(), "http://proxy.example.net:3128");
        assert!(!format!("{:?} {}", proxy, proxy).contains("p:ss"));
    }

    #[test]
    fn test_proxy_rejects_malformed() {
        for bad in ["", "host", "host:port:u:p", "host:8080", "host:8080:user", ":8080:u:p", "h:0:u:p"] {
            assert!(bad.parse::<ProxyConfig>().is_err(), "accepted {:?}", bad);
        }
        let err = "host:80:user".parse::<ProxyConfig>().unwrap_err().to_string();
        assert!(!err.contains("user"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("123456:ABCDEF"), "1234***");
        assert_eq!(mask_secret("abc"), "***");
    }

    #[tokio::test]
    async fn test_load_toml_and_apply() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reportwatch.toml");
        std::fs::write(
            &path,
            r#"
target_url = "https://reports.example.org/latest"
poll_interval_secs = 45
data_dir = "state"
max_fingerprints = 500
proxy = "10.0.0.1:8080:bob:secret"

[headers]
Accept-Language = "en-US"

[freshness]
max_minutes = 5

[alert]
min_amount = 1000.0

[telegram]
bot_token = "123:abc"
chat_id = "-100"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        let mut settings = Settings::default();
        config
            .apply_to_settings(&mut settings, &config.base_dir().unwrap())
            .unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.target_url, "https://reports.example.org/latest");
        assert_eq!(settings.detail_base_url, "https://reports.example.org/scam-report");
        assert_eq!(settings.poll_interval, Duration::from_secs(45));
        assert_eq!(settings.data_dir, dir.path().join("state"));
        assert_eq!(settings.state_path, dir.path().join("state").join(DEFAULT_STATE_FILENAME));
        assert_eq!(settings.max_fingerprints, 500);
        assert_eq!(settings.proxy.as_ref().unwrap().port, 8080);
        assert_eq!(settings.headers, vec![("Accept-Language".to_string(), "en-US".to_string())]);
        assert_eq!(settings.freshness.max_minutes, 5);
        assert_eq!(settings.freshness.max_seconds, 49);
        assert_eq!(settings.min_amount, 1000.0);
        assert_eq!(settings.telegram.as_ref().unwrap().chat_id, "-100");
        assert!(settings
            .extractor
            .ignored_hosts
            .contains(&"reports.example.org".to_string()));
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempdir().unwrap();
        let yaml = dir.path().join("c.yaml");
        std::fs::write(&yaml, "target_url: https://a.example.com/\nbind: 0.0.0.0:9000\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.bind.as_deref(), Some("0.0.0.0:9000"));

        let json = dir.path().join("c.json");
        std::fs::write(&json, r#"{"poll_interval_secs": 10}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.poll_interval_secs, Some(10));
    }

    #[tokio::test]
    async fn test_parse_error_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "target_url = [").unwrap();
        assert!(matches!(
            Config::load_from_path(&path).await,
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TELEGRAM_BOT_TOKEN", "999:xyz"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("REPORTWATCH_TARGET_URL", "https://env.example.com/list"),
            ("REPORTWATCH_PROXY", "  "),
        ]);
        let mut config = Config {
            proxy: Some("p:1:u:pw".to_string()),
            ..Default::default()
        };
        config.apply_env_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.telegram.bot_token.as_deref(), Some("999:xyz"));
        assert_eq!(config.telegram.chat_id.as_deref(), Some("42"));
        assert_eq!(config.target_url.as_deref(), Some("https://env.example.com/list"));
        // Blank values do not clobber the file.
        assert_eq!(config.proxy.as_deref(), Some("p:1:u:pw"));
    }

    #[test]
    fn test_validation_fails_fast() {
        let base = Path::new("/tmp");

        let config = Config {
            proxy: Some("nonsense".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        assert!(matches!(
            config.apply_to_settings(&mut settings, base),
            Err(ConfigError::InvalidProxy(_))
        ));

        let config = Config {
            telegram: TelegramConfig {
                bot_token: Some("t".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.apply_to_settings(&mut Settings::default(), base).is_err());

        for config in [
            Config {
                target_url: Some("not a url".to_string()),
                ..Default::default()
            },
            Config {
                poll_interval_secs: Some(0),
                ..Default::default()
            },
            Config {
                item_selector: Some("div[".to_string()),
                ..Default::default()
            },
            Config {
                detail_pattern: Some("(unclosed".to_string()),
                ..Default::default()
            },
        ] {
            let mut settings = Settings::default();
            config.apply_to_settings(&mut settings, base).unwrap();
            assert!(settings.validate().is_err());
        }
    }

    #[test]
    fn test_summary_masks_secrets() {
        let mut settings = Settings::default();
        settings.proxy = Some("h:1:u:topsecret".parse().unwrap());
        settings.telegram = Some(TelegramSettings {
            bot_token: "123456:verysecret".to_string(),
            chat_id: "1".to_string(),
            api_base: None,
        });
        let text = format!("{:?}", settings.summary());
        assert!(!text.contains("topsecret"));
        assert!(!text.contains("verysecret"));
    }
}
