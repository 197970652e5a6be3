//! Read-only view of a form's values

use std::sync::Arc;

use serde_json::Value;

/// Field → value mapping as handed over by the view layer.
pub type FormValues = serde_json::Map<String, Value>;

static NULL: Value = Value::Null;

/// Immutable snapshot of a form's values, taken when a validation pass starts.
///
/// Custom rules receive a clone of the snapshot to read sibling fields. It is
/// cheap to clone and cannot be mutated, so one field's validation never
/// influences another's within the same pass.
#[derive(Debug, Clone, Default)]
pub struct FormSnapshot {
    values: Arc<FormValues>,
}

impl FormSnapshot {
    /// Takes a snapshot of the given values.
    pub fn new(values: FormValues) -> Self {
        Self {
            values: Arc::new(values),
        }
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Returns the value of a field, treating a missing field as `null`.
    pub fn value(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&NULL)
    }

    /// Returns all values.
    pub fn values(&self) -> &FormValues {
        &self.values
    }
}

impl From<FormValues> for FormSnapshot {
    fn from(values: FormValues) -> Self {
        Self::new(values)
    }
}

/// Returns `true` for values a `required` rule rejects.
///
/// Absent fields are passed in as `null`. Empty strings and empty lists are
/// empty too; whitespace is content.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!("")));
        assert!(is_empty_value(&json!([])));
        assert!(!is_empty_value(&json!(" ")));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(false)));
        assert!(!is_empty_value(&json!({})));
    }

    #[test]
    fn test_missing_field_reads_as_null() {
        let mut values = FormValues::new();
        values.insert("name".into(), json!("Ann"));
        let snapshot = FormSnapshot::new(values);

        assert_eq!(snapshot.value("name"), &json!("Ann"));
        assert_eq!(snapshot.value("email"), &Value::Null);
        assert!(snapshot.get("email").is_none());
    }
}
