//! Configuration structures for API clients.
//!
//! [`ClientConfig`] can be deserialized from any serde format and is
//! validated before a client is built from it.

use crate::client::{
    self, DEFAULT_BASE_URL, DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Configuration for an API client instance.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    /// API base URL
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `User-Agent` header sent with every request
    #[validate(length(min = 1))]
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Personal access token, sent as a bearer token
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection pool idle timeout in seconds
    #[serde(default = "default_pool_idle_timeout_secs")]
    pub pool_idle_timeout_secs: u64,

    /// Maximum idle connections per host
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT
}

const fn default_pool_idle_timeout_secs() -> u64 {
    DEFAULT_POOL_IDLE_TIMEOUT
}

const fn default_pool_max_idle_per_host() -> usize {
    DEFAULT_POOL_MAX_IDLE_PER_HOST
}

impl ClientConfig {
    /// Create a configuration for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let config = Self {
            base_url: base_url.into(),
            ..Self::default()
        };
        config.check()?;
        Ok(config)
    }

    /// Set the personal access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse the base URL the way the client builder does, with a trailing
    /// `/` so relative paths keep the last segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_base_url(&self) -> Result<Url> {
        client::parse_base_url(&self.base_url)
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid fields.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            token: None,
            timeout_secs: default_timeout_secs(),
            pool_idle_timeout_secs: default_pool_idle_timeout_secs(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("pool_idle_timeout_secs", &self.pool_idle_timeout_secs)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .finish()
    }
}
