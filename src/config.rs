use crate::error::{Error, Result};
use crate::polling::PollConfig;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.prd.realitydefender.xyz";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "REALITY_DEFENDER_API_KEY";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "REALITY_DEFENDER_BASE_URL";

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_POLLING_INTERVAL_MS: u64 = 2000;
const DEFAULT_MAX_WAIT_SECONDS: u64 = 300;
const DEFAULT_MAX_CONCURRENT_POLLS: usize = 8;
const DEFAULT_SHUTDOWN_GRACE_SECONDS: u64 = 5;

/// Configuration for the Reality Defender client
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API
    pub base_url: Option<String>,

    /// Timeout in seconds for HTTP requests
    pub timeout_seconds: Option<u64>,

    /// Default delay between result polls, in milliseconds
    pub polling_interval_ms: Option<u64>,

    /// Default wall-clock budget for waiting on a result, in seconds
    pub max_wait_seconds: Option<u64>,

    /// Maximum number of polls running at once on the worker pool
    pub max_concurrent_polls: Option<usize>,

    /// How long `close` waits for outstanding polls before aborting them
    pub shutdown_grace_seconds: Option<u64>,
}

impl Config {
    /// Build a configuration from `REALITY_DEFENDER_API_KEY` and the optional
    /// `REALITY_DEFENDER_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::InvalidConfig(format!("{API_KEY_ENV} is not set")))?;

        let config = Self {
            api_key,
            base_url: std::env::var(BASE_URL_ENV).ok(),
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("API key is required".to_string()));
        }

        if let Some(url) = &self.base_url {
            if url.trim().is_empty() {
                return Err(Error::InvalidConfig("Base URL cannot be empty".to_string()));
            }
        }

        if self.polling_interval_ms == Some(0) {
            return Err(Error::InvalidConfig(
                "Polling interval must be greater than zero".to_string(),
            ));
        }

        if self.max_concurrent_polls == Some(0) {
            return Err(Error::InvalidConfig(
                "At least one concurrent poll is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the base URL, falling back to the default if not set
    pub fn get_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Get the timeout in seconds, falling back to the default if not set
    pub fn get_timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn get_polling_interval(&self) -> Duration {
        Duration::from_millis(
            self.polling_interval_ms
                .unwrap_or(DEFAULT_POLLING_INTERVAL_MS),
        )
    }

    pub fn get_max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_seconds.unwrap_or(DEFAULT_MAX_WAIT_SECONDS))
    }

    pub fn get_max_concurrent_polls(&self) -> usize {
        self.max_concurrent_polls
            .unwrap_or(DEFAULT_MAX_CONCURRENT_POLLS)
    }

    pub fn get_shutdown_grace(&self) -> Duration {
        Duration::from_secs(
            self.shutdown_grace_seconds
                .unwrap_or(DEFAULT_SHUTDOWN_GRACE_SECONDS),
        )
    }

    /// Polling settings used when a call does not supply its own
    pub fn default_poll_config(&self) -> PollConfig {
        PollConfig::with_max_duration(self.get_polling_interval(), self.get_max_wait())
    }
}
