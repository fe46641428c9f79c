//! carlwatch configuration
//!
//! ## Configuration Sources
//!
//! 1. `--config <FILE>` or `carlwatch.json` in the data directory (optional)
//! 2. Built-in defaults
//! 3. Environment: `bot_token` and `chat_id` for Telegram delivery
//!
//! Example `carlwatch.json`:
//! ```json
//! {"timeout_seconds": 20, "max_retries": 3, "on_fetch_error": "skip"}
//! ```
//!
//! Secrets never live in the config file; they are read from the environment
//! only when a notification actually has to be sent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};

/// Carlcare brand-model-series endpoint
pub const CATALOG_ENDPOINT: &str =
    "https://service.carlcare.com/CarlcareBg/spare-parts-price/brand-model-series";

/// Country whose price list is watched
pub const CATALOG_COUNTRY: &str = "Indonesia";

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Config file looked up in the data directory
pub const CONFIG_FILE_NAME: &str = "carlwatch.json";

/// Working catalog, rewritten every run
pub const CATALOG_FILE_NAME: &str = "models.json";

/// Comparison baseline, rewritten only when new models are found
pub const SNAPSHOT_FILE_NAME: &str = "previous_models.json";

pub const BOT_TOKEN_ENV: &str = "bot_token";
pub const CHAT_ID_ENV: &str = "chat_id";

const MIN_TIMEOUT_SECONDS: u64 = 1;

/// What to do when the catalog cannot be fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFetchError {
    /// Continue with an empty catalog (writes `{}` to the working catalog)
    #[default]
    Empty,
    /// Abandon the run without touching any file
    Skip,
}

impl fmt::Display for OnFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnFetchError::Empty => f.write_str("empty"),
            OnFetchError::Skip => f.write_str("skip"),
        }
    }
}

/// Settings loaded from `carlwatch.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Feed URL, including the country query
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Telegram Bot API base URL (self-hosted Bot API servers differ)
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,

    /// Timeout for each HTTP request in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retries after the first attempt for transient HTTP failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each further retry
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default)]
    pub on_fetch_error: OnFetchError,

    /// Working catalog file, relative to the data directory
    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,

    /// Snapshot file, relative to the data directory
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: PathBuf,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            telegram_api_base: default_telegram_api_base(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            on_fetch_error: OnFetchError::default(),
            catalog_file: default_catalog_file(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

pub fn default_catalog_url() -> String {
    format!("{CATALOG_ENDPOINT}?country={CATALOG_COUNTRY}")
}

fn default_telegram_api_base() -> String {
    DEFAULT_TELEGRAM_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY.as_millis() as u64
}

fn default_catalog_file() -> PathBuf {
    PathBuf::from(CATALOG_FILE_NAME)
}

fn default_snapshot_file() -> PathBuf {
    PathBuf::from(SNAPSHOT_FILE_NAME)
}

/// Timeout and retry settings shared by every outbound HTTP call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for HttpSettings {
    fn default() -> Self {
        WatchConfig::default().http_settings()
    }
}

impl WatchConfig {
    /// Load from an explicit path; the file must exist
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: WatchConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `carlwatch.json` from a directory, falling back to defaults if absent
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, url) in [
            ("catalog_url", &self.catalog_url),
            ("telegram_api_base", &self.telegram_api_base),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "{field} must start with http:// or https:// (got '{url}')"
                )));
            }
        }

        if self.catalog_file == self.snapshot_file {
            return Err(ConfigError::Invalid(
                "catalog_file and snapshot_file must be different files".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve timeout and retry settings
    pub fn http_settings(&self) -> HttpSettings {
        let timeout_seconds = if self.timeout_seconds < MIN_TIMEOUT_SECONDS {
            warn!(
                "Configured timeout_seconds={} is too low; using minimum of {} seconds",
                self.timeout_seconds, MIN_TIMEOUT_SECONDS
            );
            MIN_TIMEOUT_SECONDS
        } else {
            self.timeout_seconds
        };

        HttpSettings {
            timeout: Duration::from_secs(timeout_seconds),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                base_delay: Duration::from_millis(self.retry_base_delay_ms),
            },
        }
    }
}

/// Resolved runtime settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the catalog and snapshot files
    pub data_dir: PathBuf,
    pub config: WatchConfig,
    /// Log notifications instead of sending them, and keep the snapshot as is
    pub dry_run: bool,
}

impl Settings {
    pub fn new(data_dir: impl Into<PathBuf>, config: WatchConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
            dry_run: false,
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.catalog_file)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.snapshot_file)
    }
}

/// Telegram bot credentials
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramCredentials {
    /// Read `bot_token` and `chat_id` from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve credentials through an arbitrary lookup
    ///
    /// Empty or whitespace-only values count as missing; a variable that is
    /// merely present is not enough.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = read(BOT_TOKEN_ENV);
        let chat_id = read(CHAT_ID_ENV);

        match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) => Ok(Self { bot_token, chat_id }),
            (bot_token, chat_id) => {
                let mut missing = Vec::new();
                if bot_token.is_none() {
                    missing.push(BOT_TOKEN_ENV);
                }
                if chat_id.is_none() {
                    missing.push(CHAT_ID_ENV);
                }
                Err(ConfigError::MissingEnv(missing))
            }
        }
    }
}
