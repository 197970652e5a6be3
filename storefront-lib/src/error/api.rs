//! API error types

use super::ErrorClassification;
use super::FailureOutcome;
use super::RecoverySuggestion;
use crate::validation::ValidationErrors;

/// Terminal failure of an API call, after retries were exhausted.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{classification} error{}", describe(.outcome))]
pub struct ApiError {
    /// Category the failure was classified as.
    pub classification: ErrorClassification,
    /// The failure itself.
    pub outcome: FailureOutcome,
}

fn describe(outcome: &FailureOutcome) -> String {
    match (outcome.http_status, outcome.message()) {
        (Some(status), Some(message)) => format!(" (HTTP {status}): {message}"),
        (Some(status), None) => format!(" (HTTP {status})"),
        (None, Some(message)) => format!(": {message}"),
        (None, None) => String::new(),
    }
}

impl ApiError {
    /// Classifies an outcome into an API error.
    pub fn new(outcome: FailureOutcome) -> Self {
        Self {
            classification: ErrorClassification::classify(&outcome),
            outcome,
        }
    }

    /// Returns the HTTP status code, if a response arrived.
    pub fn status_code(&self) -> Option<u16> {
        self.outcome.http_status
    }

    /// Returns the server-supplied message, if any.
    pub fn message(&self) -> Option<&str> {
        self.outcome.message()
    }

    /// Returns the per-field errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<ValidationErrors> {
        match self.classification {
            ErrorClassification::Validation => self.outcome.field_errors(),
            _ => None,
        }
    }

    /// Returns the suggested next step for the user.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        self.classification.recovery_suggestion()
    }

    /// Returns `true` if this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        self.classification.is_retryable()
    }
}

impl From<FailureOutcome> for ApiError {
    fn from(outcome: FailureOutcome) -> Self {
        Self::new(outcome)
    }
}
