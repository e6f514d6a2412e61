//! Client configuration.
//!
//! Use the builder methods to customize, or read the environment:
//!
//! ```ignore
//! use brain_client::config::ClientConfig;
//!
//! let config = ClientConfig::from_env()?
//!     .with_request_timeout(Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::error::{BrainError, BrainResult};

/// Backend address when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Timeout for buffered (non-streaming) requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const BASE_URL_ENV: &str = "BRAIN_API_BASE";
pub const TIMEOUT_ENV: &str = "BRAIN_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash
    pub base_url: String,
    /// Applies to buffered requests only; streams run until done or cancelled
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL. A trailing `/` is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Read `BRAIN_API_BASE` and `BRAIN_TIMEOUT_SECS`; unset or empty
    /// variables keep their defaults.
    pub fn from_env() -> BrainResult<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> BrainResult<Self> {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            let base_url = base_url.trim();
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(BrainError::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    BASE_URL_ENV, base_url
                )));
            }
            config = config.with_base_url(base_url);
        }

        if let Some(raw) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                BrainError::Config(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    TIMEOUT_ENV, raw
                ))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Absolute URL for an API path such as `/v1/chat/stream`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
