//! FormState trait for view-layer forms that support validation.

use super::ValidationErrors;
use super::snapshot::FormValues;

/// Trait for forms that can be validated.
///
/// Implemented by the view layer. The validation core only reads values and
/// hands back a fresh error map; it never renders anything.
pub trait FormState: Send + Sync {
    /// Extract the current values for validation.
    fn values(&self) -> FormValues;

    /// Replace the form's errors with the result of the latest pass.
    fn set_errors(&self, errors: ValidationErrors);
}
