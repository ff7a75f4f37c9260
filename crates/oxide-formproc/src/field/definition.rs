//! Declarative field definitions.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Field;
use crate::config::FieldDefaults;
use crate::error::{FormError, Result};

/// A rule entry of a [`FieldDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Registry name of the rule.
    pub rule: String,
    /// Literal parameters following the field's value.
    #[serde(default)]
    pub params: Vec<Value>,
}

/// A field described as data, e.g. loaded from JSON.
///
/// ```rust
/// use oxide_formproc::FieldDefinition;
///
/// let definition = FieldDefinition::from_json(
///     r#"{ "name": "age", "type": "input", "rules": [{ "rule": "digit" }] }"#,
/// )
/// .unwrap();
/// assert_eq!(definition.name.as_deref(), Some("age"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefinition {
    /// Field name; required.
    pub name: Option<String>,
    /// Element id.
    pub id: Option<String>,
    /// Type name; hidden when absent.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Label text.
    pub label_text: Option<String>,
    /// Label CSS class.
    pub label_class: Option<String>,
    /// Whether a value is required.
    pub required: bool,
    /// Initial value.
    pub default_value: Option<Value>,
    /// Extra HTML attributes.
    pub attr: IndexMap<String, String>,
    /// CSS class of the input.
    pub class: Option<String>,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Rules in evaluation order.
    pub rules: Vec<RuleDefinition>,
    /// Value of a checked checkbox.
    pub checked_value: Option<String>,
    /// Value of an unchecked checkbox.
    pub unchecked_value: Option<String>,
    /// Select or radio options, value to text.
    pub select_options: IndexMap<String, String>,
}

impl FieldDefinition {
    /// Parses a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Field {
    /// Builds a field from a definition.
    pub fn from_definition(definition: FieldDefinition, defaults: Arc<FieldDefaults>) -> Result<Self> {
        let name = definition
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or(FormError::MissingFieldName)?;

        let mut field = Self::with_defaults(name, defaults);
        if let Some(kind) = definition.kind.as_deref() {
            field.set_type_name(kind)?;
        }
        if let Some(id) = definition.id {
            field = field.id(id);
        }
        if let Some(text) = definition.label_text {
            field = field.label(text);
        }
        if let Some(class) = definition.label_class {
            field = field.label_class(class);
        }
        field = field.required(definition.required);
        if let Some(value) = definition.default_value {
            field.set_initial_value(value, true);
        }
        for (key, value) in definition.attr {
            field = field.attr(key, value);
        }
        if let Some(class) = definition.class {
            field = field.css_class(class);
        }
        if let Some(placeholder) = definition.placeholder {
            field = field.placeholder(placeholder);
        }
        for rule in definition.rules {
            field = field.add_rule(rule.rule, rule.params);
        }
        field = field
            .checked_value(
                definition.checked_value.as_deref(),
                definition.unchecked_value.as_deref(),
            )
            .select_options(definition.select_options);

        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn build(json: &str) -> Result<Field> {
        Field::from_definition(
            FieldDefinition::from_json(json)?,
            Arc::new(FieldDefaults::default()),
        )
    }

    #[test]
    fn test_full_definition() {
        let field = build(
            r#"{
                "name": "country",
                "type": "select",
                "label_text": "Country",
                "required": true,
                "default_value": "fr",
                "attr": { "data-role": "picker" },
                "class": "wide",
                "select_options": { "fr": "France", "de": "Germany" },
                "rules": [{ "rule": "alpha" }, { "rule": "exact_length", "params": [2] }]
            }"#,
        )
        .unwrap();

        assert_eq!(field.name(), "country");
        assert_eq!(field.field_type(), FieldType::Select);
        assert_eq!(field.value(), Some("fr"));
        assert_eq!(field.options().len(), 2);
        assert_eq!(field.html_attrs().get("data-role").map(String::as_str), Some("picker"));
        let names: Vec<_> = field.rules().into_iter().map(|rule| rule.name).collect();
        assert_eq!(names, ["not_empty", "alpha", "exact_length"]);
    }

    #[test]
    fn test_defaults_to_hidden() {
        let field = build(r#"{ "name": "token", "default_value": 5 }"#).unwrap();
        assert!(field.is_strict_hidden());
        assert_eq!(field.value(), Some("5"));
    }

    #[test]
    fn test_checkbox_values() {
        let field = build(
            r#"{ "name": "tos", "type": "checkbox", "checked_value": "y", "unchecked_value": "n" }"#,
        )
        .unwrap();
        assert_eq!(field.checked(), "y");
        assert_eq!(field.unchecked(), Some("n"));
    }

    #[test]
    fn test_missing_name() {
        assert!(matches!(build(r#"{ "type": "input" }"#), Err(FormError::MissingFieldName)));
        assert!(matches!(build(r#"{ "name": "  " }"#), Err(FormError::MissingFieldName)));
    }

    #[test]
    fn test_bad_type() {
        let err = build(r#"{ "name": "x", "type": "range" }"#).unwrap_err();
        assert!(matches!(err, FormError::InvalidFieldType { ref kind, .. } if kind == "range"));
    }
}
