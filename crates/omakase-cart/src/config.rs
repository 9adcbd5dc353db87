//! Cart client configuration.

use std::time::Duration;

use omakase_http::TimeoutConfig;
use omakase_store::DEFAULT_SESSION_KEY;
use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::mirror::DEFAULT_MIRROR_KEY;

/// Environment variable overriding [`CartConfig::api_url`].
pub const API_URL_ENV: &str = "OMAKASE_API_URL";

/// Settings for talking to the cart backend and persisting locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Backend base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Path of the cart resource; item routes are `{cart_path}/{id}`.
    #[serde(default = "default_cart_path")]
    pub cart_path: String,

    /// Header carrying the session token.
    #[serde(default = "default_session_header")]
    pub session_header: String,

    /// Storage key holding the session token.
    #[serde(default = "default_session_key")]
    pub session_key: String,

    /// Storage key holding the cart mirror.
    #[serde(default = "default_mirror_key")]
    pub mirror_key: String,

    /// How long a successful read stays fresh, in milliseconds.
    #[serde(default = "default_stale_time_ms")]
    pub stale_time_ms: u64,

    /// Transport timeouts.
    #[serde(default)]
    pub timeout: TimeoutConfig,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_cart_path() -> String {
    "/cart".to_string()
}

fn default_session_header() -> String {
    "session-id".to_string()
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

fn default_mirror_key() -> String {
    DEFAULT_MIRROR_KEY.to_string()
}

fn default_stale_time_ms() -> u64 {
    10_000
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            cart_path: default_cart_path(),
            session_header: default_session_header(),
            session_key: default_session_key(),
            mirror_key: default_mirror_key(),
            stale_time_ms: default_stale_time_ms(),
            timeout: TimeoutConfig::default(),
        }
    }
}

impl CartConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this config.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
        self
    }

    /// Freshness window for cart reads.
    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    /// Reject configurations that cannot produce valid requests.
    pub fn validate(&self) -> Result<(), CartError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(CartError::Config(format!(
                "api_url must be an http(s) URL, got {:?}",
                self.api_url
            )));
        }
        if !self.cart_path.starts_with('/') {
            return Err(CartError::Config(format!(
                "cart_path must start with '/', got {:?}",
                self.cart_path
            )));
        }
        if self.session_header.trim().is_empty() {
            return Err(CartError::Config("session_header is empty".to_string()));
        }
        if self.session_key == self.mirror_key {
            return Err(CartError::Config(
                "session_key and mirror_key must differ".to_string(),
            ));
        }
        Ok(())
    }
}
