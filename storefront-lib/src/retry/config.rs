//! Retry configuration for automatic request retry.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// Configuration for automatic retry behavior.
///
/// The delay before retry `n` (0-based) is `initial_delay × 2^n`, with no jitter
/// and no cap.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use storefront_lib::retry::RetryConfig;
///
/// // Default configuration: 3 retries, starting at 1 second
/// let config = RetryConfig::default();
///
/// // Custom configuration
/// let custom = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(500));
///
/// // Disable all retries
/// let no_retry = RetryConfig::no_retry();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (total attempts is one more).
    pub max_retries: u32,
    /// Delay before the first retry (doubles each attempt).
    #[serde(rename = "initial_delay_ms", with = "crate::config::duration_ms")]
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Creates a config with all retries disabled.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Sets the maximum number of retries.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Sets the initial delay between retries.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let config: RetryConfig = serde_json::from_str(r#"{ "initial_delay_ms": 250 }"#).unwrap();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(250));
    }
}
