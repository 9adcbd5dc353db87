//! Timeout configuration for outbound requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeouts applied by the transport to every request.
///
/// Callers above the transport carry no deadline logic of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,
    /// Total request timeout in milliseconds.
    #[serde(default = "default_total_ms")]
    pub total_ms: u64,
}

fn default_connect_ms() -> u64 {
    2_000
}

fn default_total_ms() -> u64 {
    10_000
}

impl TimeoutConfig {
    /// Create a new timeout configuration.
    pub fn new(connect: Duration, total: Duration) -> Self {
        Self {
            connect_ms: connect.as_millis() as u64,
            total_ms: total.as_millis() as u64,
        }
    }

    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        Self::new(total / 4, total)
    }

    /// Connection timeout.
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    /// Total request timeout.
    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            total_ms: default_total_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_total_splits_connect() {
        let config = TimeoutConfig::from_total(Duration::from_secs(8));
        assert_eq!(config.connect(), Duration::from_secs(2));
        assert_eq!(config.total(), Duration::from_secs(8));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: TimeoutConfig = serde_json::from_str(r#"{"total_ms": 500}"#).unwrap();
        assert_eq!(config.total_ms, 500);
        assert_eq!(config.connect_ms, default_connect_ms());
    }
}
