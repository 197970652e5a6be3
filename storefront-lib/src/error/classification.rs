//! Failure classification

use std::fmt;

use serde::Serialize;

use super::FailureOutcome;

/// Fixed set of failure categories driving dispatch behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClassification {
    /// The request never reached the server.
    Network,
    /// HTTP 401: the session is no longer valid.
    Auth,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// HTTP 400 or 422.
    Validation,
    /// HTTP 5xx.
    Server,
    /// Anything else, including business failures on a 2xx response.
    Unknown,
}

impl ErrorClassification {
    /// Classifies a failed outcome.
    ///
    /// Precedence: transport failure without status, then 401, 403, 404,
    /// 400/422, 5xx, and finally `Unknown`.
    pub fn classify(outcome: &FailureOutcome) -> Self {
        match outcome.http_status {
            None if outcome.transport_failed => Self::Network,
            Some(401) => Self::Auth,
            Some(403) => Self::Forbidden,
            Some(404) => Self::NotFound,
            Some(400 | 422) => Self::Validation,
            Some(status) if status >= 500 => Self::Server,
            _ => Self::Unknown,
        }
    }

    /// Returns `true` for failures worth retrying with backoff.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }

    /// Returns the suggested next step for this category.
    pub fn recovery_suggestion(self) -> RecoverySuggestion {
        match self {
            Self::Auth => RecoverySuggestion::Relogin,
            Self::Network => RecoverySuggestion::CheckNetwork,
            Self::Server => RecoverySuggestion::RetryLater,
            Self::Forbidden | Self::NotFound | Self::Validation | Self::Unknown => {
                RecoverySuggestion::None
            }
        }
    }

    /// Returns the snake_case name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Server => "server",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short hint for UI surfaces that suggest a next action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoverySuggestion {
    /// Sign in again.
    Relogin,
    /// Check the network connection.
    CheckNetwork,
    /// Try again later.
    RetryLater,
    /// Nothing to suggest.
    None,
}

impl RecoverySuggestion {
    /// Returns the human-readable hint, or `None` when there is nothing to suggest.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::Relogin => Some("请重新登录"),
            Self::CheckNetwork => Some("请检查网络连接"),
            Self::RetryLater => Some("请稍后重试"),
            Self::None => None,
        }
    }
}

/// Classifies a failed outcome. See [`ErrorClassification::classify`].
pub fn classify(outcome: &FailureOutcome) -> ErrorClassification {
    ErrorClassification::classify(outcome)
}

/// Returns the recovery suggestion for a failed outcome without dispatching it.
pub fn recovery_suggestion(outcome: &FailureOutcome) -> RecoverySuggestion {
    classify(outcome).recovery_suggestion()
}
