//! Normalized shape of a failed request

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::validation::ValidationErrors;

/// Business payload attached to a failed response.
///
/// Mirrors the storefront's response envelope minus the success path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailurePayload {
    /// Business code from the envelope, if one was returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Human-readable message from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Additional data, e.g. a field → message mapping on validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl FailurePayload {
    /// Creates a payload with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Creates a payload with only data.
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }
}

/// A failed request, as seen by the transport boundary.
///
/// `transport_failed` with no `http_status` means the request never reached the
/// server (connection refused, DNS, timeout).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureOutcome {
    /// Whether the request failed below HTTP.
    pub transport_failed: bool,
    /// HTTP status of the response, if one arrived.
    pub http_status: Option<u16>,
    /// Decoded business payload, if the body carried one.
    pub payload: Option<FailurePayload>,
}

impl FailureOutcome {
    /// Creates an outcome for a request that never reached the server.
    pub fn transport() -> Self {
        Self {
            transport_failed: true,
            ..Default::default()
        }
    }

    /// Creates an outcome for an HTTP response with the given status.
    pub fn http(status: u16) -> Self {
        Self {
            http_status: Some(status),
            ..Default::default()
        }
    }

    /// Attaches a business payload.
    pub fn with_payload(mut self, payload: FailurePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Returns the server-supplied message, if any.
    pub fn message(&self) -> Option<&str> {
        self.payload.as_ref().and_then(|p| p.message.as_deref())
    }

    /// Returns the payload data, if any.
    pub fn data(&self) -> Option<&Value> {
        self.payload.as_ref().and_then(|p| p.data.as_ref())
    }

    /// Reads `payload.data` as a field → message mapping.
    ///
    /// Each entry may be a string or a list of strings; other entries are
    /// ignored. Returns `None` when the data is not an object or no entry
    /// carried a message.
    pub fn field_errors(&self) -> Option<ValidationErrors> {
        let Value::Object(map) = self.data()? else {
            return None;
        };

        let errors: ValidationErrors = map
            .iter()
            .map(|(field, value)| {
                let messages = match value {
                    Value::String(msg) => vec![msg.clone()],
                    Value::Array(items) => items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                    _ => Vec::new(),
                };
                (field.clone(), messages)
            })
            .collect();

        if errors.is_valid() { None } else { Some(errors) }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_field_errors_from_mapping() {
        let outcome = FailureOutcome::http(422).with_payload(FailurePayload::data(json!({
            "name": "too short",
            "email": ["taken", "blocked"],
            "age": 12,
        })));

        let errors = outcome.field_errors().expect("field errors");
        assert_eq!(errors.get("name"), Some(&["too short".to_string()][..]));
        assert_eq!(errors.get("email").map(<[String]>::len), Some(2));
        assert!(errors.get("age").is_none());
    }

    #[test]
    fn test_field_errors_keep_server_order() {
        let outcome = FailureOutcome::http(422).with_payload(FailurePayload::data(
            serde_json::from_str(r#"{"zip":"bad zip","name":"too short","city":"required"}"#)
                .unwrap(),
        ));
        let errors = outcome.field_errors().expect("field errors");
        let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, ["zip", "name", "city"]);
        assert_eq!(errors.first_invalid_field(), Some("zip"));
    }

    #[test]
    fn test_field_errors_requires_object() {
        let outcome = FailureOutcome::http(400).with_payload(FailurePayload::data(json!("bad")));
        assert!(outcome.field_errors().is_none());
        assert!(FailureOutcome::http(400).field_errors().is_none());
    }
}
