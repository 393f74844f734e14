//! Walkthrough settings and their defaults.
//!
//! The binary fills a [`Config`] from flags and environment; everything else
//! takes it as plain data.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://reqres.in/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_OUTPUT: &str = "users.json";
pub const DEFAULT_USER_ID: u64 = 1;

/// Runtime settings for the reqres walkthrough.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub timeout: Duration,
    pub output: PathBuf,
    pub user_id: u64,
}

impl Config {
    /// Parses `raw` as an API base URL. It must be absolute and able to carry
    /// path segments.
    pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason,
        };
        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("cannot be a base".to_string()));
        }
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
        }
        Ok(url)
    }

    /// Default settings aimed at `base_url`.
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            output: PathBuf::from(DEFAULT_OUTPUT),
            user_id: DEFAULT_USER_ID,
        }
    }

    /// Default settings aimed at the public reqres API.
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(Self::with_base_url(Self::parse_base_url(DEFAULT_BASE_URL)?))
    }
}
