//! Form validation for the storefront client.
//!
//! Rules are declared per field, in order, and evaluated against a snapshot of the
//! form's values. Every failing rule contributes its message, so a UI can show all
//! unmet constraints at once.
//!
//! # Example
//!
//! ```ignore
//! use storefront_lib::validation::{CommonRules, FormRules, FormValidator, RuleSet};
//!
//! let rules = FormRules::new()
//!     .field("username", CommonRules::username())
//!     .field("password", CommonRules::password())
//!     .field("confirm", CommonRules::confirm_password("password"))
//!     .field("nickname", RuleSet::new().max_length(20, "昵称最多20个字符"));
//!
//! let errors = FormValidator::evaluate(&values, &rules).await?;
//! if errors.is_valid() {
//!     // Submit form
//! }
//! ```

pub mod catalog;
mod field;
mod form;
mod form_state;
mod result;
mod rule;
mod snapshot;

pub use catalog::CommonRules;
pub use field::FieldValidator;
pub use form::FormRules;
pub use form::FormValidator;
pub use form_state::FormState;
pub use result::ValidationErrors;
pub use rule::CustomValidator;
pub use rule::Rule;
pub use rule::RuleKind;
pub use rule::RuleSet;
pub use snapshot::FormSnapshot;
pub use snapshot::FormValues;
pub use snapshot::is_empty_value;
