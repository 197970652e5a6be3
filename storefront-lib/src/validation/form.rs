//! Whole-form evaluation.

use indexmap::IndexMap;

use super::field::FieldValidator;
use super::form_state::FormState;
use super::result::ValidationErrors;
use super::rule::RuleSet;
use super::snapshot::FormSnapshot;
use super::snapshot::FormValues;
use crate::error::ValidatorDefect;

/// Ordered field → rule set mapping.
///
/// Fields are validated in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct FormRules {
    fields: IndexMap<String, RuleSet>,
}

impl FormRules {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the rules of a field.
    pub fn field(mut self, name: impl Into<String>, rules: impl Into<RuleSet>) -> Self {
        self.insert(name, rules);
        self
    }

    /// Adds (or replaces) the rules of a field in place.
    pub fn insert(&mut self, name: impl Into<String>, rules: impl Into<RuleSet>) {
        self.fields.insert(name.into(), rules.into());
    }

    /// Returns the rules of a field.
    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.fields.get(name)
    }

    /// Iterates over fields in validation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSet)> {
        self.fields.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field has rules.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Evaluates a whole form against its rules.
pub struct FormValidator;

impl FormValidator {
    /// Validates `values` against `rules`.
    ///
    /// Takes a snapshot of `values` first; custom rules read sibling fields from
    /// it. Fields without values are treated as empty. Ordinary failures end up
    /// in the returned map; only a validator defect returns `Err`.
    pub async fn evaluate(
        values: &FormValues,
        rules: &FormRules,
    ) -> Result<ValidationErrors, ValidatorDefect> {
        Self::evaluate_snapshot(&FormSnapshot::new(values.clone()), rules).await
    }

    /// Validates an existing snapshot against `rules`.
    pub async fn evaluate_snapshot(
        snapshot: &FormSnapshot,
        rules: &FormRules,
    ) -> Result<ValidationErrors, ValidatorDefect> {
        let mut errors = ValidationErrors::new();

        for (field, field_rules) in rules.iter() {
            let messages = FieldValidator::evaluate(snapshot.value(field), field_rules, snapshot)
                .await
                .inspect_err(|e| log::error!("[validation] field '{}': {}", field, e))?;
            errors.insert(field, messages);
        }

        log::debug!(
            "[validation] {} field(s) checked, {} invalid",
            rules.len(),
            errors.len()
        );
        Ok(errors)
    }

    /// Validates a view-layer form and replaces its errors.
    ///
    /// Returns whether the form is valid. On a validator defect the form's
    /// errors are left untouched.
    pub async fn validate_form<F: FormState + ?Sized>(
        form: &F,
        rules: &FormRules,
    ) -> Result<bool, ValidatorDefect> {
        let errors = Self::evaluate(&form.values(), rules).await?;
        let valid = errors.is_valid();
        form.set_errors(errors);
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::validation::CommonRules;
    use crate::validation::catalog;

    fn values(value: serde_json::Value) -> FormValues {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_missing_field_fires_required() {
        let rules = FormRules::new().field("email", CommonRules::email());
        let errors = FormValidator::evaluate(&FormValues::new(), &rules).await.unwrap();
        assert_eq!(errors.get("email"), Some(&["邮箱不能为空".to_string()][..]));
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_fields_follow_rule_order() {
        let rules = FormRules::new()
            .field("zeta", vec![catalog::required("z")])
            .field("alpha", vec![catalog::required("a")]);
        let errors = FormValidator::evaluate(&FormValues::new(), &rules).await.unwrap();
        let fields: Vec<_> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, ["zeta", "alpha"]);
    }

    #[tokio::test]
    async fn test_values_without_rules_are_ignored() {
        let rules = FormRules::new().field("name", vec![catalog::required("name")]);
        let form = values(json!({ "name": "Ann", "extra": "" }));
        assert!(FormValidator::evaluate(&form, &rules).await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_confirm_password_reads_sibling() {
        let rules = FormRules::new()
            .field("password", CommonRules::password())
            .field("confirm", CommonRules::confirm_password("password"));

        let mismatch = values(json!({ "password": "secret12", "confirm": "secret13" }));
        let errors = FormValidator::evaluate(&mismatch, &rules).await.unwrap();
        assert_eq!(errors.first_error("confirm"), Some("两次输入的密码不一致"));
        assert!(errors.get("password").is_none());

        let matching = values(json!({ "password": "secret12", "confirm": "secret12" }));
        assert!(FormValidator::evaluate(&matching, &rules).await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_evaluate_is_idempotent() {
        let rules = FormRules::new()
            .field("email", CommonRules::email())
            .field("phone", CommonRules::phone())
            .field("captcha", CommonRules::captcha());
        let form = values(json!({ "email": "nope", "phone": "123", "captcha": "12" }));

        let first = FormValidator::evaluate(&form, &rules).await.unwrap();
        let second = FormValidator::evaluate(&form, &rules).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    struct TestForm {
        values: FormValues,
        errors: Mutex<Option<ValidationErrors>>,
    }

    impl FormState for TestForm {
        fn values(&self) -> FormValues {
            self.values.clone()
        }

        fn set_errors(&self, errors: ValidationErrors) {
            *self.errors.lock().unwrap() = Some(errors);
        }
    }

    #[tokio::test]
    async fn test_validate_form_replaces_errors() {
        let rules = FormRules::new().field("username", CommonRules::username());
        let form = TestForm {
            values: values(json!({ "username": "ab" })),
            errors: Mutex::new(None),
        };

        assert!(!FormValidator::validate_form(&form, &rules).await.unwrap());
        let stored = form.errors.lock().unwrap().clone().unwrap();
        assert_eq!(
            stored.first_error("username"),
            Some("用户名为4-16位字母、数字或下划线")
        );
    }
}
