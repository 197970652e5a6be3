//! Canonical rules and the storefront's common rule sets.
//!
//! Every function here is a pure factory: it builds a [`Rule`] and does nothing
//! else.

use std::future::Future;
use std::sync::Arc;
use std::sync::LazyLock;

use futures::future::BoxFuture;
use regex::Regex;
use serde_json::Value;

use super::rule::CustomValidator;
use super::rule::Rule;
use super::rule::RuleKind;
use super::rule::RuleSet;
use super::snapshot::FormSnapshot;
use crate::error::ValidatorError;

/// Single `@`, no whitespace, and a dot somewhere after the `@`.
pub(crate) static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Mainland mobile numbers.
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("valid phone regex"));

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{4,16}$").expect("valid username regex"));

static PASSWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9!@#$%^&*._-]{6,20}$").expect("valid password regex")
});

/// Fails if the value is absent, `null`, `""` or `[]`.
pub fn required(msg: impl Into<String>) -> Rule {
    Rule::new(RuleKind::Required, msg)
}

/// Fails if the value is not an email address.
pub fn email(msg: impl Into<String>) -> Rule {
    Rule::new(RuleKind::Email, msg)
}

/// Fails if the value is not a mainland mobile number.
pub fn phone(msg: impl Into<String>) -> Rule {
    pattern(PHONE.clone(), msg)
}

/// Fails unless the value is 4-16 letters, digits or underscores.
pub fn username(msg: impl Into<String>) -> Rule {
    pattern(USERNAME.clone(), msg)
}

/// Fails unless the value is 6-20 letters, digits or common symbols.
pub fn password(msg: impl Into<String>) -> Rule {
    pattern(PASSWORD.clone(), msg)
}

/// Fails if the value does not match `re`.
pub fn pattern(re: Regex, msg: impl Into<String>) -> Rule {
    Rule::new(RuleKind::Pattern(re), msg)
}

/// Compiles `pattern` and builds a pattern rule from it.
pub fn pattern_str(pattern: &str, msg: impl Into<String>) -> Result<Rule, regex::Error> {
    Ok(self::pattern(Regex::new(pattern)?, msg))
}

/// Fails if the length is outside `min..=max`.
pub fn length(min: usize, max: usize, msg: impl Into<String>) -> Rule {
    Rule::new(
        RuleKind::Length {
            min: Some(min),
            max: Some(max),
        },
        msg,
    )
}

/// Fails if the length is below `min`.
pub fn min_length(min: usize, msg: impl Into<String>) -> Rule {
    Rule::new(
        RuleKind::Length {
            min: Some(min),
            max: None,
        },
        msg,
    )
}

/// Fails if the length is above `max`.
pub fn max_length(max: usize, msg: impl Into<String>) -> Rule {
    Rule::new(
        RuleKind::Length {
            min: None,
            max: Some(max),
        },
        msg,
    )
}

/// Fails if the value is not a number within `min..=max`.
pub fn range(min: f64, max: f64, msg: impl Into<String>) -> Rule {
    Rule::new(
        RuleKind::Range {
            min: Some(min),
            max: Some(max),
        },
        msg,
    )
}

/// Fails if the value is not a number of at least `min`.
pub fn min(min: f64, msg: impl Into<String>) -> Rule {
    Rule::new(
        RuleKind::Range {
            min: Some(min),
            max: None,
        },
        msg,
    )
}

/// Fails if the value is not a number of at most `max`.
pub fn max(max: f64, msg: impl Into<String>) -> Rule {
    Rule::new(
        RuleKind::Range {
            min: None,
            max: Some(max),
        },
        msg,
    )
}

/// Wraps an async predicate as a rule.
///
/// The predicate gets the field's value and a snapshot of the whole form.
/// Returning [`ValidatorError::Failed`] records a message (the failure's own,
/// or `msg`); returning [`ValidatorError::Defect`] aborts the validation pass.
pub fn custom<F, Fut>(f: F, msg: impl Into<String>) -> Rule
where
    F: Fn(Value, FormSnapshot) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ValidatorError>> + Send + 'static,
{
    let validator: CustomValidator = Arc::new(
        move |value: Value, snapshot: FormSnapshot| -> BoxFuture<'static, Result<(), ValidatorError>> {
            Box::pin(f(value, snapshot))
        },
    );
    Rule::new(RuleKind::Custom(validator), msg)
}

/// Fails if the value differs from the `other` field in the same form.
pub fn equals_field(other: impl Into<String>, msg: impl Into<String>) -> Rule {
    let other = other.into();
    custom(
        move |value, snapshot| {
            let matches = snapshot.value(&other) == &value;
            async move {
                if matches {
                    Ok(())
                } else {
                    Err(ValidatorError::failed())
                }
            }
        },
        msg,
    )
}

/// Predefined rule sets for the storefront's common fields.
///
/// # Example
///
/// ```
/// use storefront_lib::validation::CommonRules;
///
/// let rules = CommonRules::email();
/// assert!(rules[0].is_required());
/// ```
pub struct CommonRules;

impl CommonRules {
    /// Required email address.
    pub fn email() -> RuleSet {
        RuleSet::new()
            .required("邮箱不能为空")
            .email("邮箱格式不正确")
    }

    /// Required mobile number.
    pub fn phone() -> RuleSet {
        RuleSet::new()
            .required("手机号不能为空")
            .rule(phone("手机号格式不正确"))
    }

    /// Required username.
    pub fn username() -> RuleSet {
        RuleSet::new()
            .required("用户名不能为空")
            .rule(username("用户名为4-16位字母、数字或下划线"))
    }

    /// Required password.
    pub fn password() -> RuleSet {
        RuleSet::new()
            .required("密码不能为空")
            .rule(password("密码为6-20位字母、数字或符号"))
    }

    /// Required confirmation that must equal the `password_field` field.
    pub fn confirm_password(password_field: impl Into<String>) -> RuleSet {
        RuleSet::new()
            .required("请再次输入密码")
            .equals_field(password_field, "两次输入的密码不一致")
    }

    /// Required verification code.
    pub fn captcha() -> RuleSet {
        RuleSet::new()
            .required("验证码不能为空")
            .length(4, 6, "验证码长度为4-6位")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_patterns() {
        assert!(EMAIL.is_match("user@example.com"));
        assert!(!EMAIL.is_match("user@@example.com"));
        assert!(!EMAIL.is_match("user@example"));
        assert!(!EMAIL.is_match("us er@example.com"));

        assert!(PHONE.is_match("13812345678"));
        assert!(!PHONE.is_match("12812345678"));
        assert!(!PHONE.is_match("1381234567"));

        assert!(USERNAME.is_match("shop_user1"));
        assert!(!USERNAME.is_match("abc"));

        assert!(PASSWORD.is_match("secret1!"));
        assert!(!PASSWORD.is_match("short"));
    }

    #[test]
    fn test_pattern_str_rejects_invalid_regex() {
        assert!(pattern_str("(unclosed", "bad").is_err());
        assert!(pattern_str(r"^\d+$", "digits").is_ok());
    }

    #[test]
    fn test_common_rules_keep_order() {
        let kinds: Vec<_> = CommonRules::captcha().iter().map(|r| r.kind().name()).collect();
        assert_eq!(kinds, ["required", "length"]);

        let kinds: Vec<_> = CommonRules::confirm_password("password")
            .iter()
            .map(|r| r.kind().name())
            .collect();
        assert_eq!(kinds, ["required", "custom"]);
    }
}
