//! Field types and their per-type value handling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{NOT_EMPTY, UPLOAD_NOT_EMPTY};

/// The kind of input a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// `<input type="hidden">`
    #[default]
    Hidden,
    /// `<input type="text">`
    Input,
    /// `<input type="password">`; never rendered with a value.
    Password,
    /// `<select>`
    Select,
    /// `<textarea>`
    Textarea,
    /// `<input type="file">`; the value is the client filename.
    File,
    /// `<input type="checkbox">`
    Checkbox,
    /// A group of `<input type="radio">` over the select options.
    Radio,
}

impl FieldType {
    /// All types, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Hidden,
        Self::Input,
        Self::Password,
        Self::Select,
        Self::Textarea,
        Self::File,
        Self::Checkbox,
        Self::Radio,
    ];

    /// Returns the type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Input => "input",
            Self::Password => "password",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::File => "file",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
        }
    }

    /// Rule prepended to the rules of a required field of this type.
    pub fn required_rule(self) -> &'static str {
        match self {
            Self::File => UPLOAD_NOT_EMPTY,
            _ => NOT_EMPTY,
        }
    }

    /// Whether a placeholder is rendered for this type.
    pub fn accepts_placeholder(self) -> bool {
        matches!(self, Self::Password | Self::Input | Self::Textarea)
    }

    /// Converts an initial value to its stored form.
    ///
    /// A null checkbox value falls back to `unchecked`; structured values
    /// never name a file.
    pub(crate) fn normalize_initial(self, value: Value, unchecked: Option<&str>) -> Option<String> {
        match (self, value) {
            (Self::Checkbox, Value::Null) => unchecked.map(str::to_string),
            (Self::File, Value::Array(_) | Value::Object(_)) => None,
            (_, value) => to_text(value),
        }
    }

    /// Converts an assigned value to its stored form, before any
    /// checkbox fallback.
    pub(crate) fn normalize_value(self, value: Value) -> Option<String> {
        let value = match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        };

        match (self, value) {
            (Self::File, Value::String(s)) if !s.is_empty() => Some(s),
            (Self::File, _) => None,
            (_, value) => to_text(value),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// Scalar text of a loose value; `null` stays absent.
pub(crate) fn to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        structured => Some(structured.to_string()),
    }
}
