//! A single form input: configuration, value state and rules.
//!
//! A [`Field`] is assembled with consuming builder methods, then handed to a
//! [`Processor`](crate::Processor) which binds it to the request through the
//! `&mut self` setters.
//!
//! ```rust
//! use oxide_formproc::{Field, FieldType};
//!
//! let field = Field::new("email")
//!     .kind(FieldType::Input)
//!     .label("E-mail")
//!     .required(true)
//!     .add_rule_email(254);
//!
//! assert_eq!(field.rules()[0].name, "not_empty");
//! assert!(field.label_html().unwrap().contains("E-mail"));
//! ```

mod definition;
mod image;
mod kind;
mod render;
mod rules;

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::config::{FieldDefaults, RequiredPosition};
use crate::error::{FormError, Result};
use crate::markup::Attrs;
use crate::request::{FormRequest, Method};
use crate::validation::RuleDescriptor;

pub use definition::{FieldDefinition, RuleDefinition};
pub use kind::FieldType;
pub use render::LabelData;

/// The current value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// Never assigned; the initial value shows through.
    #[default]
    Unset,
    /// Explicitly assigned nothing.
    Null,
    /// Assigned text.
    Text(String),
}

impl FieldValue {
    fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Unset | Self::Null => None,
        }
    }
}

/// One form input.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    id: Option<String>,
    kind: FieldType,
    label_text: Option<String>,
    label_class: Option<String>,
    required: bool,
    required_position: Option<RequiredPosition>,
    required_html: Option<String>,
    required_delim: Option<String>,
    placeholder: Option<String>,
    class: Option<String>,
    attrs: Attrs,
    select_options: IndexMap<String, String>,
    checked_value: Option<String>,
    unchecked_value: Option<String>,
    prepend: Option<String>,
    append: Option<String>,
    initial_value: Option<String>,
    initial_value_set: bool,
    value: FieldValue,
    dirty: Option<bool>,
    strict_hidden: bool,
    rules: Vec<RuleDescriptor>,
    errors: Vec<String>,
    defaults: Arc<FieldDefaults>,
}

impl Field {
    /// Creates a strict hidden field with default styling.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_defaults(name, Arc::new(FieldDefaults::default()))
    }

    /// Creates a strict hidden field sharing `defaults`.
    pub fn with_defaults(name: impl Into<String>, defaults: Arc<FieldDefaults>) -> Self {
        Self {
            name: name.into(),
            id: None,
            kind: FieldType::Hidden,
            label_text: None,
            label_class: None,
            required: false,
            required_position: None,
            required_html: None,
            required_delim: None,
            placeholder: None,
            class: None,
            attrs: Attrs::new(),
            select_options: IndexMap::new(),
            checked_value: None,
            unchecked_value: None,
            prepend: None,
            append: None,
            initial_value: None,
            initial_value_set: false,
            value: FieldValue::Unset,
            dirty: None,
            strict_hidden: true,
            rules: Vec::new(),
            errors: Vec::new(),
            defaults,
        }
    }

    // ---- builders ----

    /// Sets the field type.
    #[must_use]
    pub fn kind(mut self, kind: FieldType) -> Self {
        self.set_type(kind);
        self
    }

    /// Sets the element id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the label text.
    #[must_use]
    pub fn label(mut self, text: impl Into<String>) -> Self {
        self.label_text = Some(text.into());
        self
    }

    /// Sets the label's CSS class.
    #[must_use]
    pub fn label_class(mut self, class: impl Into<String>) -> Self {
        self.label_class = Some(class.into());
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Overrides where the required marker goes.
    #[must_use]
    pub fn required_position(mut self, position: RequiredPosition) -> Self {
        self.required_position = Some(position);
        self
    }

    /// Overrides the required marker markup.
    #[must_use]
    pub fn required_html(mut self, html: impl Into<String>) -> Self {
        self.required_html = Some(html.into());
        self
    }

    /// Overrides the separator between marker and label text.
    #[must_use]
    pub fn required_delim(mut self, delim: impl Into<String>) -> Self {
        self.required_delim = Some(delim.into());
        self
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Sets the CSS class of the input.
    #[must_use]
    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Sets an extra HTML attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    /// Replaces the extra HTML attributes.
    #[must_use]
    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Sets the options of a select or radio field as (value, text) pairs.
    #[must_use]
    pub fn select_options<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.select_options = options
            .into_iter()
            .map(|(value, text)| (value.into(), text.into()))
            .collect();
        self
    }

    /// Sets the submitted values of a checkbox. Ignored for other types.
    ///
    /// `checked` falls back to the configured default.
    #[must_use]
    pub fn checked_value(mut self, checked: Option<&str>, unchecked: Option<&str>) -> Self {
        if self.kind == FieldType::Checkbox {
            self.checked_value = checked.map(str::to_string);
            self.unchecked_value = unchecked.map(str::to_string);
        }
        self
    }

    /// Allows or forbids changing a hidden field's value.
    #[must_use]
    pub fn strict_hidden(mut self, strict: bool) -> Self {
        self.strict_hidden = strict;
        self
    }

    /// Sets markup shown before the input by templates.
    #[must_use]
    pub fn prepend(mut self, html: impl Into<String>) -> Self {
        self.prepend = Some(html.into());
        self
    }

    /// Sets markup shown after the input by templates.
    #[must_use]
    pub fn append(mut self, html: impl Into<String>) -> Self {
        self.append = Some(html.into());
        self
    }

    /// Sets the initial value, replacing any previous one.
    #[must_use]
    pub fn initial_value(mut self, value: impl Into<Value>) -> Self {
        self.set_initial_value(value, true);
        self
    }

    // ---- presets ----

    /// Configures a text input.
    #[must_use]
    pub fn as_input(self, required: bool, class: Option<&str>) -> Self {
        let field = self.kind(FieldType::Input).required(required);
        match class {
            Some(class) => field.css_class(class),
            None => field,
        }
    }

    /// Configures a checkbox.
    #[must_use]
    pub fn as_checkbox(self, checked: Option<&str>, unchecked: Option<&str>) -> Self {
        self.kind(FieldType::Checkbox)
            .checked_value(checked, unchecked)
    }

    /// Configures an e-mail input.
    #[must_use]
    pub fn as_email(self, required: bool, max_length: usize) -> Self {
        self.kind(FieldType::Input)
            .required(required)
            .add_rule_email(max_length)
    }

    /// Configures a password input.
    #[must_use]
    pub fn as_password(self, required: bool, min_length: usize, max_length: usize) -> Self {
        self.kind(FieldType::Password)
            .required(required)
            .add_rule_password(min_length, max_length)
    }

    // ---- state ----

    /// Changes the field type.
    ///
    /// A password field never starts with a value, so its initial value is
    /// reset.
    pub fn set_type(&mut self, kind: FieldType) -> &mut Self {
        self.kind = kind;
        if kind == FieldType::Password {
            self.set_initial_value(Value::Null, true);
        }
        self
    }

    /// Changes the field type by name.
    pub fn set_type_name(&mut self, name: &str) -> Result<&mut Self> {
        let kind = name
            .parse::<FieldType>()
            .map_err(|()| FormError::InvalidFieldType {
                kind: name.to_string(),
                field: self.name.clone(),
            })?;
        Ok(self.set_type(kind))
    }

    /// Sets the initial value.
    ///
    /// Without `overwrite` an already set initial value is kept.
    pub fn set_initial_value(&mut self, value: impl Into<Value>, overwrite: bool) -> &mut Self {
        if self.initial_value_set && !overwrite {
            return self;
        }

        self.initial_value = self
            .kind
            .normalize_initial(value.into(), self.unchecked_value.as_deref());
        self.initial_value_set = true;
        self
    }

    /// Assigns a value.
    ///
    /// Fails if the field is strict hidden and the value differs from the
    /// initial one.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        let text = self.kind.normalize_value(value.into());

        if self.is_strict_hidden() && !loosely_equal(text.as_deref(), self.initial()) {
            warn!(field = %self.name, "rejected change to strict hidden field");
            return Err(FormError::ImmutableFieldViolation(self.name.clone()));
        }

        let text = match text {
            None if self.kind == FieldType::Checkbox => self.unchecked_value.clone(),
            other => other,
        };
        self.value = text.map_or(FieldValue::Null, FieldValue::Text);
        self.dirty = Some(!loosely_equal(self.value(), self.initial()));
        Ok(self)
    }

    /// Assigns a value taken from `request`.
    ///
    /// File fields of a POST request take the client filename from the
    /// uploaded-file table instead. Without an upload entry they keep their
    /// current value, so the initial one shows through.
    pub fn set_submitted_value<R>(&mut self, value: impl Into<Value>, request: &R) -> Result<&mut Self>
    where
        R: FormRequest + ?Sized,
    {
        if self.kind == FieldType::File && request.method() == Method::Post {
            return match request.file(&self.name) {
                Some(file) => self.set_value(file.name.clone()),
                None => Ok(self),
            };
        }
        self.set_value(value)
    }

    /// Replaces the styling defaults.
    pub fn set_defaults(&mut self, defaults: Arc<FieldDefaults>) -> &mut Self {
        self.defaults = defaults;
        self
    }

    /// Sets a single error message.
    pub fn set_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors = vec![message.into()];
        self
    }

    /// Replaces the error messages.
    pub fn set_errors(&mut self, messages: Vec<String>) -> &mut Self {
        self.errors = messages;
        self
    }

    /// Clears the error state.
    pub fn clear_error(&mut self) -> &mut Self {
        self.errors.clear();
        self
    }

    /// Overrides the dirty flag.
    pub fn set_dirty(&mut self, dirty: bool) -> &mut Self {
        self.dirty = Some(dirty);
        self
    }

    // ---- accessors ----

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the element id, `field_<name>` unless set.
    pub fn element_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("field_{}", self.name))
    }

    /// Returns the field type.
    pub fn field_type(&self) -> FieldType {
        self.kind
    }

    /// Returns the resolved value.
    ///
    /// An unset value resolves to the initial value.
    pub fn value(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Unset if self.initial_value_set => self.initial_value.as_deref(),
            other => other.as_deref(),
        }
    }

    /// Returns the resolved value, or `default` when it is null.
    pub fn value_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.value().unwrap_or(default)
    }

    /// Returns the raw current value.
    pub fn raw_value(&self) -> &FieldValue {
        &self.value
    }

    /// Returns the initial value.
    pub fn initial(&self) -> Option<&str> {
        self.initial_value.as_deref()
    }

    /// Returns whether an initial value was set.
    pub fn is_initial_value_set(&self) -> bool {
        self.initial_value_set
    }

    /// Returns whether the value differs from the initial value.
    ///
    /// An explicit flag wins. Otherwise file fields are never dirty.
    pub fn is_dirty(&self) -> bool {
        self.dirty.unwrap_or_else(|| {
            self.kind != FieldType::File && !loosely_equal(self.value(), self.initial())
        })
    }

    /// Returns whether the field has an error.
    pub fn is_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the first error message.
    pub fn error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    /// Returns all error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns whether the field is required.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns whether the field is hidden.
    pub fn is_hidden(&self) -> bool {
        self.kind == FieldType::Hidden
    }

    /// Returns whether the field is hidden and rejects value changes.
    pub fn is_strict_hidden(&self) -> bool {
        self.is_hidden() && self.strict_hidden
    }

    /// Returns the trimmed label text.
    pub fn label_text(&self) -> Option<&str> {
        self.label_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Returns the label's CSS class.
    pub fn label_css_class(&self) -> &str {
        self.label_class
            .as_deref()
            .map(str::trim)
            .unwrap_or(self.defaults.label_class.as_str())
    }

    /// Returns the value a checked checkbox submits.
    pub fn checked(&self) -> &str {
        self.checked_value
            .as_deref()
            .unwrap_or(self.defaults.checked_value.as_str())
    }

    /// Returns the value an unchecked checkbox stands for.
    pub fn unchecked(&self) -> Option<&str> {
        self.unchecked_value.as_deref()
    }

    /// Returns the select or radio options.
    pub fn options(&self) -> &IndexMap<String, String> {
        &self.select_options
    }

    /// Returns the extra HTML attributes.
    pub fn html_attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Returns the markup shown before the input.
    pub fn prepend_html(&self) -> Option<&str> {
        self.prepend.as_deref()
    }

    /// Returns the markup shown after the input.
    pub fn append_html(&self) -> Option<&str> {
        self.append.as_deref()
    }

    /// Returns the styling defaults.
    pub fn defaults(&self) -> &Arc<FieldDefaults> {
        &self.defaults
    }
}

/// Compares two optional values treating null and `""` alike.
fn loosely_equal(a: Option<&str>, b: Option<&str>) -> bool {
    a.unwrap_or_default() == b.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::upload::UploadedFile;
    use serde_json::json;

    #[test]
    fn test_new_field_is_strict_hidden() {
        let field = Field::new("token");
        assert_eq!(field.field_type(), FieldType::Hidden);
        assert!(field.is_strict_hidden());
        assert_eq!(field.element_id(), "field_token");
        assert_eq!(field.value(), None);
    }

    #[test]
    fn test_value_falls_back_to_initial_until_set() {
        let mut field = Field::new("city").kind(FieldType::Input);
        field.set_initial_value("Paris", false);
        assert_eq!(field.value(), Some("Paris"));
        assert!(!field.is_dirty());

        field.set_value("Paris").unwrap();
        assert!(!field.is_dirty());

        field.set_value("  Lyon ").unwrap();
        assert_eq!(field.value(), Some("Lyon"));
        assert!(field.is_dirty());
    }

    #[test]
    fn test_explicit_null_does_not_fall_back() {
        let mut field = Field::new("city").kind(FieldType::Input);
        field.set_initial_value("Paris", false);
        field.set_value(Value::Null).unwrap();
        assert_eq!(field.value(), None);
        assert_eq!(field.value_or("-"), "-");
        assert_eq!(field.raw_value(), &FieldValue::Null);
    }

    #[test]
    fn test_initial_value_overwrite() {
        let mut field = Field::new("n").kind(FieldType::Input);
        field.set_initial_value(1, false);
        field.set_initial_value(2, false);
        assert_eq!(field.initial(), Some("1"));
        field.set_initial_value(json!(3), true);
        assert_eq!(field.initial(), Some("3"));
    }

    #[test]
    fn test_strict_hidden_rejects_changes() {
        let mut field = Field::new("user_id").initial_value(7);
        assert!(field.set_value("7").is_ok());
        let err = field.set_value("8").unwrap_err();
        assert!(matches!(err, FormError::ImmutableFieldViolation(name) if name == "user_id"));
        assert_eq!(field.value(), Some("7"));

        let mut relaxed = Field::new("user_id").initial_value(7).strict_hidden(false);
        assert!(relaxed.set_value("8").is_ok());
        assert!(relaxed.is_dirty());
    }

    #[test]
    fn test_password_resets_initial_value() {
        let field = Field::new("secret")
            .kind(FieldType::Input)
            .initial_value("hunter2")
            .kind(FieldType::Password);
        assert!(field.is_initial_value_set());
        assert_eq!(field.value(), None);
    }

    #[test]
    fn test_set_type_name() {
        let mut field = Field::new("bio");
        field.set_type_name("textarea").unwrap();
        assert_eq!(field.field_type(), FieldType::Textarea);

        let err = field.set_type_name("slider").unwrap_err();
        assert_eq!(err.to_string(), "unknown field type [slider] on field [bio]");
    }

    #[test]
    fn test_checkbox_unchecked_fallback() {
        let mut field = Field::new("newsletter").as_checkbox(None, Some("0"));
        assert_eq!(field.checked(), "1");
        field.set_value(Value::Null).unwrap();
        assert_eq!(field.value(), Some("0"));

        field.set_initial_value(Value::Null, true);
        assert_eq!(field.initial(), Some("0"));
    }

    #[test]
    fn test_checked_value_ignored_for_other_types() {
        let field = Field::new("x")
            .kind(FieldType::Input)
            .checked_value(Some("yes"), Some("no"));
        assert_eq!(field.checked(), "1");
        assert_eq!(field.unchecked(), None);
    }

    #[test]
    fn test_file_value_comes_from_upload_table() {
        let request = Request::post("/")
            .form_param("avatar", "ignored")
            .file("avatar", UploadedFile::new("me.png", "image/png", 10));
        let mut field = Field::new("avatar").kind(FieldType::File);
        field.set_submitted_value("ignored", &request).unwrap();
        assert_eq!(field.value(), Some("me.png"));

        let get = Request::get("/");
        field.set_submitted_value(json!({"name": "x"}), &get).unwrap();
        assert_eq!(field.value(), None);
    }

    #[test]
    fn test_file_without_upload_keeps_initial() {
        let request = Request::post("/");
        let mut field = Field::new("avatar")
            .kind(FieldType::File)
            .initial_value("old.png");
        field.set_submitted_value(Value::Null, &request).unwrap();
        assert_eq!(field.value(), Some("old.png"));
        assert!(!field.is_dirty());
    }

    #[test]
    fn test_file_fields_are_not_dirty_by_default() {
        let field = Field::new("avatar")
            .kind(FieldType::File)
            .initial_value("old.png");
        assert!(!field.is_dirty());

        let mut text = Field::new("name").kind(FieldType::Input);
        text.set_dirty(true);
        assert!(text.is_dirty());
    }

    #[test]
    fn test_error_state() {
        let mut field = Field::new("name");
        assert!(!field.is_error());
        field.set_errors(vec!["first".to_string(), "second".to_string()]);
        assert!(field.is_error());
        assert_eq!(field.error(), Some("first"));
        assert_eq!(field.errors().len(), 2);
        field.clear_error();
        assert_eq!(field.error(), None);
        field.set_error("only");
        assert_eq!(field.errors(), ["only".to_string()]);
    }

    #[test]
    fn test_label_text_and_class() {
        let field = Field::new("name").label("  Name ");
        assert_eq!(field.label_text(), Some("Name"));
        assert_eq!(field.label_css_class(), "control-label");
        assert_eq!(Field::new("x").label("   ").label_text(), None);
        assert_eq!(Field::new("x").label_class(" big ").label_css_class(), "big");
    }

    #[test]
    fn test_presets() {
        let email = Field::new("email").as_email(true, 100);
        assert_eq!(email.field_type(), FieldType::Input);
        assert!(email.is_required());
        let names: Vec<_> = email.rules().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["not_empty", "email", "max_length"]);

        let password = Field::new("pw").as_password(false, 8, 64);
        assert_eq!(password.field_type(), FieldType::Password);
        let names: Vec<_> = password.rules().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["min_length", "max_length"]);

        let input = Field::new("q").as_input(false, Some("wide"));
        assert_eq!(input.class.as_deref(), Some("wide"));
    }
}
