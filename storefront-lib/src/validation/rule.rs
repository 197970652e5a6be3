//! Rule value objects.

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

use futures::future::BoxFuture;
use regex::Regex;
use serde_json::Value;

use super::catalog;
use super::snapshot::FormSnapshot;
use crate::error::ValidatorError;

/// Async predicate behind a custom rule.
///
/// Receives the field's value and a read-only snapshot of the whole form.
pub type CustomValidator =
    Arc<dyn Fn(Value, FormSnapshot) -> BoxFuture<'static, Result<(), ValidatorError>> + Send + Sync>;

/// The check a [`Rule`] performs.
#[derive(Clone)]
pub enum RuleKind {
    /// Value must not be absent, `null`, `""` or `[]`.
    Required,
    /// Value must look like an email address.
    Email,
    /// Value must match the regular expression.
    Pattern(Regex),
    /// Length in characters (or elements) must be within bounds.
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Numeric value must be within bounds.
    Range { min: Option<f64>, max: Option<f64> },
    /// Async predicate that may read sibling fields.
    Custom(CustomValidator),
}

impl RuleKind {
    /// Returns a short name for the kind, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Email => "email",
            Self::Pattern(_) => "pattern",
            Self::Length { .. } => "length",
            Self::Range { .. } => "range",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::Email => f.write_str("Email"),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::Length { min, max } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One declarative check and the message reported when it fails.
///
/// Rules are immutable and cheap to clone; build them with the functions in
/// [`catalog`](super::catalog) or the [`RuleSet`] builder.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    message: String,
}

impl Rule {
    /// Creates a rule from a kind and its failure message.
    pub fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the check this rule performs.
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` for `required` rules.
    pub fn is_required(&self) -> bool {
        matches!(self.kind, RuleKind::Required)
    }
}

/// Ordered rules for one field.
///
/// Order is significant: rules are evaluated and reported in declaration order.
///
/// # Example
///
/// ```
/// use storefront_lib::validation::RuleSet;
///
/// let rules = RuleSet::new()
///     .required("昵称不能为空")
///     .length(2, 20, "昵称为2-20个字符");
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends all rules of another set, keeping their order.
    pub fn extend(mut self, other: RuleSet) -> Self {
        self.rules.extend(other.rules);
        self
    }

    /// Require the field to be non-empty.
    pub fn required(self, msg: impl Into<String>) -> Self {
        self.rule(catalog::required(msg))
    }

    /// Require a valid email address.
    pub fn email(self, msg: impl Into<String>) -> Self {
        self.rule(catalog::email(msg))
    }

    /// Require the value to match a compiled regex.
    pub fn pattern(self, re: Regex, msg: impl Into<String>) -> Self {
        self.rule(catalog::pattern(re, msg))
    }

    /// Require a length between `min` and `max` (inclusive).
    pub fn length(self, min: usize, max: usize, msg: impl Into<String>) -> Self {
        self.rule(catalog::length(min, max, msg))
    }

    /// Require minimum length (in characters).
    pub fn min_length(self, min: usize, msg: impl Into<String>) -> Self {
        self.rule(catalog::min_length(min, msg))
    }

    /// Require maximum length (in characters).
    pub fn max_length(self, max: usize, msg: impl Into<String>) -> Self {
        self.rule(catalog::max_length(max, msg))
    }

    /// Require a number between `min` and `max` (inclusive).
    pub fn range(self, min: f64, max: f64, msg: impl Into<String>) -> Self {
        self.rule(catalog::range(min, max, msg))
    }

    /// Add a custom asynchronous validation rule.
    pub fn custom<F, Fut>(self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(Value, FormSnapshot) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ValidatorError>> + Send + 'static,
    {
        self.rule(catalog::custom(f, msg))
    }

    /// Require the value to equal another field of the form.
    pub fn equals_field(self, other: impl Into<String>, msg: impl Into<String>) -> Self {
        self.rule(catalog::equals_field(other, msg))
    }

    /// Returns the rules as a slice.
    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }
}

impl Deref for RuleSet {
    type Target = [Rule];

    fn deref(&self) -> &[Rule] {
        &self.rules
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RuleSet {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
