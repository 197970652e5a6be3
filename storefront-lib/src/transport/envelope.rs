//! Storefront response envelope

use serde::Deserialize;
use serde_json::Value;

use crate::error::FailureOutcome;
use crate::error::FailurePayload;

/// Business code of a successful call.
pub const SUCCESS_CODE: i64 = 200;

/// Body shape of every storefront API response: `{code, message?, data?}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseEnvelope {
    /// Business code; [`SUCCESS_CODE`] means success.
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    /// Parses an envelope from a response body.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Returns `true` if the business code signals success.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Returns the payload carried by a failed envelope.
    pub fn into_payload(self) -> FailurePayload {
        FailurePayload {
            code: Some(self.code),
            message: self.message,
            data: self.data,
        }
    }

    /// Returns `data` on success, or a business failure for `http_status`.
    pub fn into_result(self, http_status: u16) -> Result<Value, FailureOutcome> {
        if self.is_success() {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(FailureOutcome::http(http_status).with_payload(self.into_payload()))
        }
    }
}
