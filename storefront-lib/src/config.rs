//! Client configuration

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::auth::CredentialStore;
use crate::dispatch::DispatchMessages;
use crate::dispatch::ErrorDispatcher;
use crate::dispatch::Navigator;
use crate::dispatch::Notifier;
use crate::error::ConfigError;
use crate::retry::RetryConfig;

/// Configuration for a [`StorefrontClient`](crate::StorefrontClient) and its dispatcher.
///
/// # Example
///
/// ```
/// use storefront_lib::config::ClientConfig;
///
/// let config = ClientConfig::from_json_str(r#"{
///     "base_url": "https://shop.example.com/api",
///     "timeout_ms": 10000,
///     "retry": { "max_retries": 2, "initial_delay_ms": 500 }
/// }"#).unwrap();
///
/// assert_eq!(config.retry.max_retries, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL.
    pub base_url: String,
    /// Per-request timeout in milliseconds; no timeout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Retry behavior for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Notice texts shown by the dispatcher.
    #[serde(default)]
    pub messages: DispatchMessages,
}

impl ClientConfig {
    /// Creates a config with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: None,
            retry: RetryConfig::default(),
            messages: DispatchMessages::default(),
        }
    }

    /// Parses a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("[config] loaded {}", path.display());
        Self::from_json_str(&json)
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Builds a dispatcher that shows this config's notice texts.
    pub fn dispatcher(
        &self,
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> ErrorDispatcher {
        ErrorDispatcher::new(credentials, notifier, navigator).with_messages(self.messages.clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url)
            .map(|_| ())
            .map_err(|source| ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                source,
            })
    }
}

/// Serializes a [`Duration`] as whole milliseconds.
pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
