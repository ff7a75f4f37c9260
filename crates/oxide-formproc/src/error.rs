//! Error types for fields and processors.

use indexmap::IndexMap;
use thiserror::Error;

/// Configuration errors raised by fields and processors.
///
/// These signal a programming or configuration mistake at the call site.
/// Invalid user input is never reported through this type; see
/// [`ValidationErrors`] instead.
#[derive(Debug, Error)]
pub enum FormError {
    /// The field type name is not one of the supported types.
    #[error("unknown field type [{kind}] on field [{field}]")]
    InvalidFieldType { kind: String, field: String },

    /// A strict hidden field was given a value different from its initial one.
    #[error("unable to redefine hidden field [{0}]")]
    ImmutableFieldViolation(String),

    /// A processor lookup named a field that was never added.
    #[error("field [{0}] does not exist")]
    UnknownField(String),

    /// A rule shortcut name is not registered.
    #[error("method [{0}] does not exist")]
    UnknownRuleShortcut(String),

    /// A field definition did not carry a name.
    #[error("field name not defined")]
    MissingFieldName,

    /// Configuration could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Validation messages keyed by field name, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Messages keyed by field name.
    pub errors: IndexMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the messages for a specific field.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Returns the first message for a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Moves all messages from `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// Returns all messages as a flat list.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |msg| (field.as_str(), msg.as_str()))
            })
            .collect()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = (String, Vec<String>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_keep_field_order() {
        let mut errors = ValidationErrors::new();
        errors.add("zeta", "first");
        errors.add("alpha", "second");
        errors.add("zeta", "third");

        let fields: Vec<&str> = errors.errors.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["zeta", "alpha"]);
        assert_eq!(errors.first("zeta"), Some("first"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.all_errors().len(), 3);
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationErrors::new();
        a.add("name", "too short");
        let mut b = ValidationErrors::new();
        b.add("name", "not alpha");
        b.add("photo", "not an image");

        a.merge(b);
        assert_eq!(a.get("name").map(Vec::len), Some(2));
        assert_eq!(a.first("photo"), Some("not an image"));
    }

    #[test]
    fn test_error_display() {
        let err = FormError::InvalidFieldType {
            kind: "range".to_string(),
            field: "age".to_string(),
        };
        assert_eq!(err.to_string(), "unknown field type [range] on field [age]");
        assert_eq!(
            FormError::ImmutableFieldViolation("token".to_string()).to_string(),
            "unable to redefine hidden field [token]"
        );
    }
}
