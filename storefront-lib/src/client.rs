//! Main StorefrontClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::auth::CredentialStore;
use crate::config::ClientConfig;
use crate::dispatch::ErrorDispatcher;
use crate::dispatch::Navigator;
use crate::dispatch::Notifier;
use crate::error::ApiError;
use crate::error::ConfigError;
use crate::error::ErrorClassification;
use crate::error::FailureOutcome;
use crate::retry::RetryConfig;
use crate::retry::RetryHandler;
use crate::transport::HttpTransport;
use crate::transport::Interceptors;
use crate::transport::PreparedRequest;
use crate::transport::Transport;

/// The client for calling the storefront API.
///
/// Every call runs the interceptors, retries transient failures (network and
/// 5xx) with exponential backoff, and on terminal failure classifies the
/// outcome and hands it to the dispatcher, if one is configured.
///
/// This client is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use storefront_lib::{StorefrontClient, auth::MemoryCredentialStore};
///
/// let client = StorefrontClient::builder()
///     .url("https://shop.example.com/api")
///     .credentials(Arc::new(MemoryCredentialStore::default()))
///     .dispatcher(dispatcher)
///     .build()?;
///
/// let cart = client.get("/cart").await?;
/// ```
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    transport: Arc<dyn Transport>,
    interceptors: Interceptors,
    credentials: Arc<dyn CredentialStore>,
    retry: RetryConfig,
    dispatcher: Option<Arc<ErrorDispatcher>>,
}

impl StorefrontClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> StorefrontClientBuilder<Missing, Missing> {
        StorefrontClientBuilder::new()
    }

    /// Creates a client from loaded configuration.
    ///
    /// Terminal failures go to a dispatcher showing the configured notice
    /// texts through `notifier` and redirecting through `navigator`.
    pub fn from_config(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ConfigError> {
        let dispatcher = config.dispatcher(credentials.clone(), notifier, navigator);
        let mut builder = Self::builder()
            .url(&config.base_url)
            .credentials(credentials)
            .retry(config.retry.clone())
            .dispatcher(Arc::new(dispatcher));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// Sends a request and returns the envelope's `data`.
    pub async fn execute(&self, request: PreparedRequest) -> Result<Value, ApiError> {
        let result = RetryHandler::new(self.inner.retry.clone())
            .retry_if(
                || self.attempt(&request),
                |outcome| ErrorClassification::classify(outcome).is_retryable(),
            )
            .await;

        result.map_err(|outcome| {
            let error = ApiError::new(outcome);
            log::warn!("[client] {} {} failed: {}", request.method, request.path, error);
            if let Some(dispatcher) = &self.inner.dispatcher {
                dispatcher.dispatch(error.classification, &error.outcome);
            }
            error
        })
    }

    /// Sends a GET request.
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(PreparedRequest::get(path)).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.execute(PreparedRequest::post(path, body)).await
    }

    /// Sends a PUT request with a JSON body.
    pub async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.execute(PreparedRequest::put(path, body)).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(PreparedRequest::delete(path)).await
    }

    /// Returns the credential store the client reads tokens from.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry
    }

    async fn attempt(&self, request: &PreparedRequest) -> Result<Value, FailureOutcome> {
        let mut prepared = request.clone();
        self.inner.interceptors.before_send(&mut prepared);
        let response = self.inner.transport.send(&prepared).await?;
        self.inner.interceptors.after_receive(response)
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`StorefrontClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The storefront API base URL
/// - `credentials` - A [`CredentialStore`] implementation
pub struct StorefrontClientBuilder<Url, Credentials> {
    url: Url,
    credentials: Credentials,
    retry: RetryConfig,
    dispatcher: Option<Arc<ErrorDispatcher>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    transport: Option<Arc<dyn Transport>>,
}

impl StorefrontClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            credentials: Missing,
            retry: RetryConfig::default(),
            dispatcher: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            transport: None,
        }
    }
}

impl Default for StorefrontClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> StorefrontClientBuilder<Missing, C> {
    /// Sets the API base URL.
    pub fn url(self, url: impl Into<String>) -> StorefrontClientBuilder<Set<String>, C> {
        StorefrontClientBuilder {
            url: Set(url.into()),
            credentials: self.credentials,
            retry: self.retry,
            dispatcher: self.dispatcher,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            transport: self.transport,
        }
    }
}

impl<U> StorefrontClientBuilder<U, Missing> {
    /// Sets the credential store the interceptors read the token from.
    pub fn credentials(
        self,
        credentials: Arc<dyn CredentialStore>,
    ) -> StorefrontClientBuilder<U, Set<Arc<dyn CredentialStore>>> {
        StorefrontClientBuilder {
            url: self.url,
            credentials: Set(credentials),
            retry: self.retry,
            dispatcher: self.dispatcher,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            transport: self.transport,
        }
    }
}

impl<U, C> StorefrontClientBuilder<U, C> {
    /// Sets the retry configuration.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the dispatcher that handles terminal failures.
    pub fn dispatcher(mut self, dispatcher: Arc<ErrorDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replaces the HTTP transport entirely.
    ///
    /// The URL and HTTP client settings are ignored when a transport is set.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl StorefrontClientBuilder<Set<String>, Set<Arc<dyn CredentialStore>>> {
    /// Builds the [`StorefrontClient`].
    ///
    /// This method is only available when both `url` and `credentials` have been set.
    pub fn build(self) -> Result<StorefrontClient, ConfigError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let http_client = match self.http_client {
                    Some(client) => client,
                    None => {
                        let mut builder = Client::builder();
                        if let Some(timeout) = self.connect_timeout {
                            builder = builder.connect_timeout(timeout);
                        }
                        builder.build()?
                    }
                };
                Arc::new(HttpTransport::new(&self.url.0, http_client)?.with_timeout(self.timeout))
            }
        };

        let credentials = self.credentials.0;
        Ok(StorefrontClient {
            inner: Arc::new(StorefrontClientInner {
                transport,
                interceptors: Interceptors::new(credentials.clone()),
                credentials,
                retry: self.retry,
                dispatcher: self.dispatcher,
            }),
        })
    }
}
