//! Pre-send and post-receive hooks

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use super::PreparedRequest;
use super::RawResponse;
use super::ResponseEnvelope;
use crate::auth::CredentialStore;
use crate::error::FailureOutcome;

/// Query parameter carrying the send timestamp (unix millis).
pub const TIMESTAMP_PARAM: &str = "_t";

/// Hooks the client runs around every request.
#[derive(Clone)]
pub struct Interceptors {
    credentials: Arc<dyn CredentialStore>,
}

impl Interceptors {
    /// Creates interceptors reading the token from `credentials`.
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Attaches the bearer token, when one is stored, and stamps the request.
    ///
    /// The token is read once here; the request keeps it even if the store is
    /// cleared while it is in flight.
    pub fn before_send(&self, request: &mut PreparedRequest) {
        if let Some(token) = self.credentials.token() {
            request.set_header("Authorization", format!("Bearer {}", token));
        }
        request.query.retain(|(key, _)| key != TIMESTAMP_PARAM);
        request
            .query
            .push((TIMESTAMP_PARAM.to_string(), Utc::now().timestamp_millis().to_string()));
    }

    /// Decodes a response into the envelope's `data` or a failure.
    ///
    /// Non-2xx responses fail with their status and whatever envelope the body
    /// carried. 2xx responses fail when the envelope's code is not success.
    pub fn after_receive(&self, response: RawResponse) -> Result<Value, FailureOutcome> {
        let envelope = ResponseEnvelope::parse(&response.body);

        if !response.is_success() {
            let outcome = FailureOutcome::http(response.status);
            return Err(match envelope {
                Some(envelope) => outcome.with_payload(envelope.into_payload()),
                None => outcome,
            });
        }

        match envelope {
            Some(envelope) => envelope.into_result(response.status).inspect_err(|outcome| {
                log::debug!(
                    "[transport] business failure: {}",
                    outcome.message().unwrap_or("<no message>")
                )
            }),
            None => {
                log::warn!("[transport] {} response without envelope", response.status);
                Err(FailureOutcome::http(response.status))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::MemoryCredentialStore;
    use crate::auth::StoredSession;

    fn interceptors(token: Option<&str>) -> Interceptors {
        let store = MemoryCredentialStore::default();
        if let Some(token) = token {
            store.set(StoredSession::new(token));
        }
        Interceptors::new(Arc::new(store))
    }

    #[test]
    fn test_before_send_attaches_token_and_timestamp() {
        let mut request = PreparedRequest::get("/cart").query(TIMESTAMP_PARAM, "stale");
        interceptors(Some("abc")).before_send(&mut request);

        assert_eq!(request.header_value("authorization"), Some("Bearer abc"));
        let stamps: Vec<_> = request.query.iter().filter(|(k, _)| k == TIMESTAMP_PARAM).collect();
        assert_eq!(stamps.len(), 1);
        assert!(stamps[0].1.parse::<i64>().is_ok());
    }

    #[test]
    fn test_before_send_without_token() {
        let mut request = PreparedRequest::get("/products");
        interceptors(None).before_send(&mut request);
        assert!(request.header_value("Authorization").is_none());
    }

    #[test]
    fn test_after_receive_http_error_keeps_envelope() {
        let response = RawResponse::new(422, r#"{"code":422,"data":{"name":"too short"}}"#);
        let outcome = interceptors(None).after_receive(response).unwrap_err();
        assert_eq!(outcome.http_status, Some(422));
        assert_eq!(outcome.data(), Some(&json!({ "name": "too short" })));
    }

    #[test]
    fn test_after_receive_plain_error_body() {
        let outcome = interceptors(None)
            .after_receive(RawResponse::new(502, "Bad Gateway"))
            .unwrap_err();
        assert_eq!(outcome, FailureOutcome::http(502));
    }

    #[test]
    fn test_after_receive_success() {
        let data = interceptors(None)
            .after_receive(RawResponse::new(200, r#"{"code":200,"data":[1,2]}"#))
            .unwrap();
        assert_eq!(data, json!([1, 2]));
    }
}
