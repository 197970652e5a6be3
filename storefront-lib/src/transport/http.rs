//! reqwest-backed transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::PreparedRequest;
use super::RawResponse;
use super::Transport;
use crate::error::ConfigError;
use crate::error::FailureOutcome;

/// Sends requests over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport for `base_url`.
    pub fn new(base_url: &str, http_client: Client) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base_url,
            http_client,
            timeout: None,
        })
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the full URL of a request, including its query.
    pub fn url_for(&self, request: &PreparedRequest) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = request.path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, path))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, FailureOutcome> {
        let url = self.url_for(request).map_err(|e| {
            log::error!("[transport] invalid request path {}: {}", request.path, e);
            FailureOutcome::default()
        })?;

        let mut builder = self.http_client.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            log::warn!("[transport] {} {} failed: {}", request.method, request.path, e);
            FailureOutcome::transport()
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            log::warn!("[transport] failed to read {} response body: {}", status, e);
            FailureOutcome::http(status)
        })?;

        log::debug!("[transport] {} {} -> {}", request.method, request.path, status);
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_path_and_query() {
        let transport = HttpTransport::new("https://shop.example.com/api/", Client::new()).unwrap();
        let request = PreparedRequest::get("/products").query("page", "2").query("q", "red shoes");
        assert_eq!(
            transport.url_for(&request).unwrap().as_str(),
            "https://shop.example.com/api/products?page=2&q=red+shoes"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpTransport::new("not a url", Client::new()),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
