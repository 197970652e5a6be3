//! Single-field evaluation.

use std::borrow::Cow;

use serde_json::Value;

use super::catalog::EMAIL;
use super::rule::Rule;
use super::rule::RuleKind;
use super::snapshot::FormSnapshot;
use super::snapshot::is_empty_value;
use crate::error::ValidatorDefect;
use crate::error::ValidatorError;

/// Evaluates one value against an ordered list of rules.
pub struct FieldValidator;

impl FieldValidator {
    /// Returns the message of every failing rule, in rule order.
    ///
    /// An empty value only fails `required` rules; every other rule is skipped
    /// for it. A failing rule never stops the rules after it.
    ///
    /// Returns `Err` only when a custom validator reports a defect.
    pub async fn evaluate(
        value: &Value,
        rules: &[Rule],
        snapshot: &FormSnapshot,
    ) -> Result<Vec<String>, ValidatorDefect> {
        let empty = is_empty_value(value);
        let mut errors = Vec::new();

        for rule in rules {
            let passed = match rule.kind() {
                RuleKind::Required => !empty,
                _ if empty => continue,
                RuleKind::Email => text(value).is_some_and(|v| EMAIL.is_match(&v)),
                RuleKind::Pattern(re) => text(value).is_some_and(|v| re.is_match(&v)),
                RuleKind::Length { min, max } => measure(value).is_some_and(|len| {
                    min.is_none_or(|min| len >= min) && max.is_none_or(|max| len <= max)
                }),
                RuleKind::Range { min, max } => number(value).is_some_and(|n| {
                    min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
                }),
                RuleKind::Custom(validator) => {
                    match validator(value.clone(), snapshot.clone()).await {
                        Ok(()) => true,
                        Err(ValidatorError::Failed(failure)) => {
                            errors.push(failure.into_message_or(rule.message()));
                            continue;
                        }
                        Err(ValidatorError::Defect(source)) => {
                            return Err(ValidatorDefect::new(source));
                        }
                    }
                }
            };

            if !passed {
                log::trace!("[validation] {} rule failed", rule.kind().name());
                errors.push(rule.message().to_string());
            }
        }

        Ok(errors)
    }

    /// Evaluates a value with no surrounding form.
    ///
    /// Custom rules see an empty snapshot.
    pub async fn evaluate_value(value: &Value, rules: &[Rule]) -> Result<Vec<String>, ValidatorDefect> {
        Self::evaluate(value, rules, &FormSnapshot::default()).await
    }
}

/// Textual form used by pattern checks. Lists and objects have none.
fn text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Characters for scalars, elements for lists.
fn measure(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        other => text(other).map(|s| s.chars().count()),
    }
}

/// Numeric coercion: numbers as is, strings parsed after trimming.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
