use indexmap::IndexMap;
use serde::Serialize;

/// Aggregated result of a validation pass: field → messages.
///
/// A field is present iff at least one of its rules failed. Fields keep the
/// order their rules were declared in, messages keep rule order. An empty map
/// means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: IndexMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty (valid) result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the messages for a field. Empty message lists are ignored.
    pub fn insert(&mut self, field: impl Into<String>, messages: Vec<String>) {
        if !messages.is_empty() {
            self.fields.insert(field.into(), messages);
        }
    }

    /// Check if all fields passed validation.
    pub fn is_valid(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check if any field failed validation.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Returns the number of invalid fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field failed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get the messages of one field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Get the first message of one field.
    pub fn first_error(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(<[String]>::first).map(String::as_str)
    }

    /// Get the first invalid field (for focusing).
    pub fn first_invalid_field(&self) -> Option<&str> {
        self.fields.keys().next().map(String::as_str)
    }

    /// Truncates every field to its first message, for UIs that show one error per field.
    pub fn first_errors(&self) -> IndexMap<String, String> {
        self.fields
            .iter()
            .filter_map(|(field, messages)| Some((field.clone(), messages.first()?.clone())))
            .collect()
    }

    /// Iterates over invalid fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(f, m)| (f.as_str(), m.as_slice()))
    }

    /// Consumes the result and returns the underlying map.
    pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
        self.fields
    }
}

impl FromIterator<(String, Vec<String>)> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, messages) in iter {
            errors.insert(field, messages);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lists_are_dropped() {
        let mut errors = ValidationErrors::new();
        errors.insert("email", Vec::new());
        assert!(errors.is_valid());

        errors.insert("email", vec!["required".into()]);
        assert!(errors.is_invalid());
        assert_eq!(errors.first_invalid_field(), Some("email"));
    }

    #[test]
    fn test_first_errors_and_json_shape() {
        let errors: ValidationErrors = [
            ("name".to_string(), vec!["a".to_string(), "b".to_string()]),
            ("age".to_string(), vec!["c".to_string()]),
        ]
        .into_iter()
        .collect();

        let heads = errors.first_errors();
        assert_eq!(heads.get("name").map(String::as_str), Some("a"));
        assert_eq!(errors.first_error("age"), Some("c"));
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"name":["a","b"],"age":["c"]}"#
        );
    }
}
