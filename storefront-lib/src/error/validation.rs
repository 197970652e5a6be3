//! Custom validator error types

/// Boxed error produced by a broken custom validator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Input rejected by a custom rule.
///
/// This is the ordinary "the value is invalid" signal. It never leaves the
/// validator; it is turned into a message in the field's error list.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", message.as_deref().unwrap_or("validation failed"))]
pub struct ValidationFailure {
    message: Option<String>,
}

impl ValidationFailure {
    /// Creates a failure that reports the rule's own message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a failure with a message that replaces the rule's message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Returns the failure's own message, if it carries one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the failure's message, or `fallback` when it has none.
    pub fn into_message_or(self, fallback: &str) -> String {
        self.message.unwrap_or_else(|| fallback.to_string())
    }
}

/// Result of a custom validator that did not pass.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// The value is invalid.
    #[error(transparent)]
    Failed(#[from] ValidationFailure),

    /// The validator itself is broken.
    #[error("validator defect: {0}")]
    Defect(#[source] BoxError),
}

impl ValidatorError {
    /// Creates a failure that reports the rule's own message.
    pub fn failed() -> Self {
        Self::Failed(ValidationFailure::new())
    }

    /// Creates a failure carrying its own message.
    pub fn failed_with(message: impl Into<String>) -> Self {
        Self::Failed(ValidationFailure::with_message(message))
    }

    /// Wraps a programming error raised inside a validator.
    pub fn defect(error: impl Into<BoxError>) -> Self {
        Self::Defect(error.into())
    }
}

/// A custom validator raised something other than a [`ValidationFailure`].
///
/// Returned by [`FieldValidator`](crate::validation::FieldValidator) and
/// [`FormValidator`](crate::validation::FormValidator) instead of an error map;
/// the wrapped source is the validator's error, untouched.
#[derive(Debug, thiserror::Error)]
#[error("custom validator defect: {0}")]
pub struct ValidatorDefect(#[source] BoxError);

impl ValidatorDefect {
    pub(crate) fn new(source: BoxError) -> Self {
        Self(source)
    }

    /// Returns a reference to the validator's error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }

    /// Consumes the defect and returns the validator's error.
    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_fallback() {
        assert_eq!(ValidationFailure::new().into_message_or("rule"), "rule");
        assert_eq!(
            ValidationFailure::with_message("own").into_message_or("rule"),
            "own"
        );
    }

    #[test]
    fn test_defect_keeps_source() {
        let io = std::io::Error::other("broken lookup");
        let ValidatorError::Defect(source) = ValidatorError::defect(io) else {
            panic!("expected defect");
        };
        let defect = ValidatorDefect::new(source);
        assert_eq!(defect.inner().to_string(), "broken lookup");
        assert!(defect.into_inner().downcast::<std::io::Error>().is_ok());
    }
}
