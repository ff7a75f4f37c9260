//! Binding fields to a request and validating them.
//!
//! A [`Processor`] is created per request. Fields are attached with
//! [`Processor::add_field`], which resolves their initial and submitted
//! values; [`Processor::process`] then validates a submitted form and fires
//! the matching callback.
//!
//! ```rust
//! use oxide_formproc::{Field, FieldType, Processor, Request};
//!
//! let request = Request::post("/signup").form_param("email", "not-an-email");
//! let mut processor = Processor::new(&request);
//! processor
//!     .add_field(Field::new("email").kind(FieldType::Input).required(true).rule("email"))
//!     .unwrap();
//! processor.process(false);
//!
//! assert_eq!(processor.is_valid(), Some(false));
//! assert_eq!(
//!     processor.field("email").unwrap().error(),
//!     Some("email must be an email address")
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::FieldDefaults;
use crate::error::{FormError, Result, ValidationErrors};
use crate::field::{Field, FieldType};
use crate::initial::InitialValues;
use crate::request::{FormRequest, Method, Request};
use crate::validation::{CheckContext, Input, Messages, RuleDescriptor, Validation};

/// Encoding type set once a file field is attached.
pub const MULTIPART: &str = "multipart/form-data";

type Callback<'r, R> = Box<dyn FnMut(&Processor<'r, R>) + 'r>;

/// Fields bound to one request.
pub struct Processor<'r, R: FormRequest + ?Sized = Request> {
    request: &'r R,
    fields: IndexMap<String, Field>,
    initial_values: Option<Box<dyn InitialValues + 'r>>,
    method: Method,
    action: Option<String>,
    enctype: Option<String>,
    field_defaults: Option<Arc<FieldDefaults>>,
    messages: Messages,
    validation: Validation,
    on_success: Option<Callback<'r, R>>,
    on_error: Option<Callback<'r, R>>,
}

impl<R: FormRequest + ?Sized> fmt::Debug for Processor<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("method", &self.method)
            .field("action", &self.action)
            .field("enctype", &self.enctype)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<'r, R: FormRequest + ?Sized> Processor<'r, R> {
    /// Creates a processor validating POST submissions of `request`.
    pub fn new(request: &'r R) -> Self {
        Self {
            request,
            fields: IndexMap::new(),
            initial_values: None,
            method: Method::Post,
            action: None,
            enctype: None,
            field_defaults: None,
            messages: Messages::default(),
            validation: Validation::new(),
            on_success: None,
            on_error: None,
        }
    }

    /// Sets where initial values come from.
    #[must_use]
    pub fn with_initial_values(mut self, values: impl InitialValues + 'r) -> Self {
        self.initial_values = Some(Box::new(values));
        self
    }

    /// Sets the method a submission arrives with.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the form action URL.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the styling defaults given to every attached field.
    #[must_use]
    pub fn with_field_defaults(mut self, defaults: Arc<FieldDefaults>) -> Self {
        self.field_defaults = Some(defaults);
        self
    }

    /// Sets how validation failures are worded.
    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Replaces the validation engine.
    #[must_use]
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    /// Attaches a field and binds it to the request.
    ///
    /// On an initial request a missing submission falls back to the field's
    /// own initial value, then to the initial values source. On a submitted
    /// request a missing value leaves the field unset, except for checkboxes
    /// (unchecked), file fields (bound from the upload table) and strict
    /// hidden fields. Fails if a strict hidden field was submitted with a
    /// different value.
    pub fn add_field(&mut self, mut field: Field) -> Result<&mut Self> {
        let name = field.name().to_string();
        let source_value = self
            .initial_values
            .as_ref()
            .and_then(|values| values.initial_value(&name));

        let submitted = match self.method {
            Method::Get => self.request.query(&name),
            _ => self.request.post(&name),
        };
        let value = match submitted {
            Some(text) => Some(Value::String(text.to_string())),
            None if self.is_initial() => Some(if field.is_initial_value_set() {
                field.initial().map_or(Value::Null, Value::from)
            } else {
                source_value.clone().unwrap_or(Value::Null)
            }),
            None if field.is_strict_hidden()
                || matches!(field.field_type(), FieldType::Checkbox | FieldType::File) =>
            {
                Some(Value::Null)
            }
            None => None,
        };

        if let Some(defaults) = &self.field_defaults {
            field.set_defaults(Arc::clone(defaults));
        }
        field.set_initial_value(source_value.unwrap_or(Value::Null), false);
        if let Some(value) = value {
            field.set_submitted_value(value, self.request)?;
        }

        if field.field_type() == FieldType::File {
            self.enctype = Some(MULTIPART.to_string());
        }

        debug!(field = %name, kind = %field.field_type(), "field attached");
        self.fields.insert(name, field);
        Ok(self)
    }

    /// Attaches several fields in order.
    pub fn add_fields(&mut self, fields: impl IntoIterator<Item = Field>) -> Result<&mut Self> {
        for field in fields {
            self.add_field(field)?;
        }
        Ok(self)
    }

    /// Sets the callback fired when a submission is valid.
    pub fn on_success(&mut self, callback: impl FnMut(&Processor<'r, R>) + 'r) -> &mut Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Sets the callback fired when a submission is invalid.
    pub fn on_error(&mut self, callback: impl FnMut(&Processor<'r, R>) + 'r) -> &mut Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Sets a success callback receiving `args` on every call.
    pub fn on_success_with<A: 'r>(
        &mut self,
        args: A,
        mut callback: impl FnMut(&Processor<'r, R>, &A) + 'r,
    ) -> &mut Self {
        self.on_success(move |processor| callback(processor, &args))
    }

    /// Sets an error callback receiving `args` on every call.
    pub fn on_error_with<A: 'r>(
        &mut self,
        args: A,
        mut callback: impl FnMut(&Processor<'r, R>, &A) + 'r,
    ) -> &mut Self {
        self.on_error(move |processor| callback(processor, &args))
    }

    /// Validates the submission.
    ///
    /// Initial requests are only validated when `force_validation` is set.
    /// Afterwards exactly one of the callbacks fires, unless the request is
    /// initial.
    pub fn process(&mut self, force_validation: bool) -> &mut Self {
        if self.is_initial() && !force_validation {
            debug!(method = %self.request.method(), "initial request, skipping validation");
            return self;
        }

        let mut text_rules: IndexMap<String, Vec<RuleDescriptor>> = IndexMap::new();
        let mut file_rules: IndexMap<String, Vec<RuleDescriptor>> = IndexMap::new();
        for (name, field) in &mut self.fields {
            field.clear_error();
            let group = if field.field_type() == FieldType::File {
                &mut file_rules
            } else {
                &mut text_rules
            };
            group.insert(name.clone(), field.rules());
        }

        let errors = self.validate(&text_rules, &file_rules);
        for (field, message) in errors.all_errors() {
            debug!(field, error = message, "validation failed");
        }
        for (name, messages) in errors {
            if let Some(field) = self.fields.get_mut(&name) {
                field.set_errors(messages);
            }
        }

        let valid = self.is_valid();
        info!(
            fields = self.fields.len(),
            errors = self.error_messages().len(),
            valid = ?valid,
            "form processed"
        );

        if let Some(valid) = valid {
            self.fire(valid);
        }
        self
    }

    fn validate(
        &self,
        text_rules: &IndexMap<String, Vec<RuleDescriptor>>,
        file_rules: &IndexMap<String, Vec<RuleDescriptor>>,
    ) -> ValidationErrors {
        let values = self.values(None);
        let text_context = CheckContext {
            inputs: values
                .iter()
                .map(|(name, value)| (name.clone(), Input::Text(value.as_deref())))
                .collect(),
            ..CheckContext::default()
        };

        let request = self.request;
        let file_context = CheckContext {
            inputs: file_rules
                .keys()
                .map(|name| (name.clone(), Input::Upload(request.file(name))))
                .collect(),
            ..CheckContext::default()
        };

        let mut errors = ValidationErrors::new();
        if !text_rules.is_empty() {
            errors.merge(self.validation.check(&text_context, text_rules, &self.messages));
        }
        if !file_rules.is_empty() {
            errors.merge(self.validation.check(&file_context, file_rules, &self.messages));
        }
        errors
    }

    // the callback is taken out while it runs so it can borrow the processor
    fn fire(&mut self, success: bool) {
        let slot = if success {
            &mut self.on_success
        } else {
            &mut self.on_error
        };
        let Some(mut callback) = slot.take() else {
            return;
        };

        callback(&*self);
        if success {
            self.on_success = Some(callback);
        } else {
            self.on_error = Some(callback);
        }
    }

    /// Returns whether the request is not a submission of this form.
    pub fn is_initial(&self) -> bool {
        self.request.method() != self.method
    }

    /// Returns `None` for an initial request, otherwise whether no field
    /// has an error.
    pub fn is_valid(&self) -> Option<bool> {
        (!self.is_initial()).then(|| self.errors().is_empty())
    }

    /// Returns the value of every field in error.
    pub fn errors(&self) -> IndexMap<String, Option<String>> {
        self.collect(Field::is_error)
    }

    /// Returns the first error message of every field in error.
    pub fn error_messages(&self) -> IndexMap<String, String> {
        self.fields
            .iter()
            .filter_map(|(name, field)| field.error().map(|error| (name.clone(), error.to_string())))
            .collect()
    }

    /// Returns the value of every dirty field.
    pub fn dirty_fields(&self) -> IndexMap<String, Option<String>> {
        self.collect(Field::is_dirty)
    }

    /// Returns the names of the dirty fields.
    pub fn dirty_field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, field)| field.is_dirty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Returns whether any field is dirty.
    pub fn is_dirty(&self) -> bool {
        self.fields.values().any(Field::is_dirty)
    }

    fn collect(&self, include: impl Fn(&Field) -> bool) -> IndexMap<String, Option<String>> {
        self.fields
            .iter()
            .filter(|(_, field)| include(field))
            .map(|(name, field)| (name.clone(), field.value().map(str::to_string)))
            .collect()
    }

    /// Returns field values, optionally limited to `keys`.
    pub fn values(&self, keys: Option<&[&str]>) -> IndexMap<String, Option<String>> {
        self.collect(|field| keys.map_or(true, |keys| keys.iter().any(|key| *key == field.name())))
    }

    /// Returns a field's value, or `default` when it is null.
    pub fn value<'a>(&'a self, name: &str, default: Option<&'a str>) -> Result<Option<&'a str>> {
        Ok(self.field(name)?.value().or(default))
    }

    /// Overrides a field's dirty flag. Unknown names are ignored.
    pub fn set_field_dirty(&mut self, name: &str, dirty: bool) -> &mut Self {
        if let Some(field) = self.fields.get_mut(name) {
            field.set_dirty(dirty);
        }
        self
    }

    /// Puts a field in error. Unknown names are ignored.
    pub fn set_field_error(&mut self, name: &str, message: impl Into<String>) -> &mut Self {
        if let Some(field) = self.fields.get_mut(name) {
            field.set_error(message);
        }
        self
    }

    /// Returns a field by name.
    pub fn field(&self, name: &str) -> Result<&Field> {
        self.fields
            .get(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Returns a field by name for modification.
    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Returns whether a field is attached.
    pub fn field_exists(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the attached fields in order.
    pub fn fields(&self) -> &IndexMap<String, Field> {
        &self.fields
    }

    /// Returns the method a submission arrives with.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the form action URL.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Returns the form encoding type.
    pub fn enctype(&self) -> Option<&str> {
        self.enctype.as_deref()
    }
}
