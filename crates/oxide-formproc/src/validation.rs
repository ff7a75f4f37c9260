//! Rule descriptors, validators and the validation engine.
//!
//! A field carries an ordered list of [`RuleDescriptor`]s. The processor hands
//! them to a [`Validation`] engine together with the value of every field;
//! the engine looks each rule name up in its registry of [`Validator`]s and
//! collects a message for every key whose rules fail.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ValidationErrors;
use crate::field::Field;
use crate::upload::{self, UploadedFile};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

/// Name of the rule prepended to required non-file fields.
pub const NOT_EMPTY: &str = "not_empty";
/// Name of the rule prepended to required file fields.
pub const UPLOAD_NOT_EMPTY: &str = "upload_not_empty";

/// One parameter of a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// The value of the field the rule is attached to.
    Value,
    /// The value of another field.
    Field(String),
    /// A fixed argument.
    Literal(Value),
}

/// A rule name plus its ordered parameters.
///
/// Rules built by [`Field::add_rule`] start with [`Param::Value`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDescriptor {
    /// Registry name of the rule.
    pub name: String,
    /// Ordered parameters.
    pub params: Vec<Param>,
}

impl RuleDescriptor {
    /// Creates a rule applied to the field's own value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: vec![Param::Value],
        }
    }

    /// Creates a rule with explicit parameters.
    pub fn with_params(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Appends a literal parameter.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.params.push(Param::Literal(value.into()));
        self
    }
}

/// The value a rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    /// A text value.
    Text(Option<&'a str>),
    /// An uploaded-file table entry.
    Upload(Option<&'a UploadedFile>),
}

impl<'a> Input<'a> {
    /// Returns the text of the input; for uploads the client filename.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Self::Text(text) => *text,
            Self::Upload(file) => file.map(|f| f.name.as_str()),
        }
    }

    /// Returns the upload descriptor, if any.
    pub fn upload(&self) -> Option<&'a UploadedFile> {
        match self {
            Self::Text(_) => None,
            Self::Upload(file) => *file,
        }
    }

    /// Returns whether the input counts as not filled in.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.map_or(true, str::is_empty),
            Self::Upload(file) => file.map_or(true, |f| !upload::not_empty(f)),
        }
    }
}

/// Trait for rule validators.
pub trait Validator: Send + Sync {
    /// Evaluates the rule. `params` excludes the input itself.
    fn validate(&self, input: Input<'_>, params: &[Value]) -> bool;

    /// Returns the message template used when no catalog entry exists.
    fn message(&self) -> &str;

    /// Whether the rule is evaluated for empty input. Other rules are
    /// skipped so that optional fields may stay blank.
    fn runs_on_empty(&self) -> bool {
        false
    }
}

/// Validator wrapping a closure.
pub struct Predicate<F> {
    check: F,
    message: String,
}

impl<F> Predicate<F>
where
    F: Fn(Input<'_>, &[Value]) -> bool + Send + Sync,
{
    /// Creates a new predicate validator.
    pub fn new(message: impl Into<String>, check: F) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }
}

impl<F> Validator for Predicate<F>
where
    F: Fn(Input<'_>, &[Value]) -> bool + Send + Sync,
{
    fn validate(&self, input: Input<'_>, params: &[Value]) -> bool {
        (self.check)(input, params)
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Rejects empty text values.
#[derive(Debug, Clone)]
pub struct NotEmptyValidator {
    message: String,
}

impl NotEmptyValidator {
    /// Creates a new NotEmptyValidator with default message.
    pub fn new() -> Self {
        Self::with_message(":field must not be empty")
    }

    /// Creates a new NotEmptyValidator with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for NotEmptyValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for NotEmptyValidator {
    fn validate(&self, input: Input<'_>, _params: &[Value]) -> bool {
        !input.is_empty()
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn runs_on_empty(&self) -> bool {
        true
    }
}

/// Rejects a missing or failed upload.
#[derive(Debug, Clone)]
pub struct UploadNotEmptyValidator {
    message: String,
}

impl Default for UploadNotEmptyValidator {
    fn default() -> Self {
        Self {
            message: ":field must not be empty".to_string(),
        }
    }
}

impl Validator for UploadNotEmptyValidator {
    fn validate(&self, input: Input<'_>, _params: &[Value]) -> bool {
        input.upload().is_some_and(upload::not_empty)
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn runs_on_empty(&self) -> bool {
        true
    }
}

/// Bound checked by a [`LengthValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBound {
    /// At least the given number of characters.
    Min,
    /// At most the given number of characters.
    Max,
    /// Exactly the given number of characters.
    Exact,
}

/// Checks the character count against the first parameter.
#[derive(Debug, Clone)]
pub struct LengthValidator {
    bound: LengthBound,
    message: String,
}

impl LengthValidator {
    /// Creates a new LengthValidator with default message.
    pub fn new(bound: LengthBound) -> Self {
        let message = match bound {
            LengthBound::Min => ":field must be at least :param2 characters long",
            LengthBound::Max => ":field must not exceed :param2 characters long",
            LengthBound::Exact => ":field must be exactly :param2 characters long",
        };
        Self::with_message(bound, message)
    }

    /// Creates a new LengthValidator with custom message.
    pub fn with_message(bound: LengthBound, message: impl Into<String>) -> Self {
        Self {
            bound,
            message: message.into(),
        }
    }
}

impl Validator for LengthValidator {
    fn validate(&self, input: Input<'_>, params: &[Value]) -> bool {
        let Some(limit) = param_usize(params, 0) else {
            return false;
        };
        let length = input.text().unwrap_or_default().chars().count();

        match self.bound {
            LengthBound::Min => length >= limit,
            LengthBound::Max => length <= limit,
            LengthBound::Exact => length == limit,
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator for email addresses.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    message: String,
}

impl EmailValidator {
    /// Creates a new EmailValidator with default message.
    pub fn new() -> Self {
        Self::with_message(":field must be an email address")
    }

    /// Creates a new EmailValidator with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for EmailValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for EmailValidator {
    fn validate(&self, input: Input<'_>, _params: &[Value]) -> bool {
        input.text().is_some_and(|text| EMAIL_PATTERN.is_match(text))
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator for http(s) URLs.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    message: String,
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self {
            message: ":field must be a url".to_string(),
        }
    }
}

impl Validator for UrlValidator {
    fn validate(&self, input: Input<'_>, _params: &[Value]) -> bool {
        input.text().is_some_and(|text| {
            let rest = text
                .strip_prefix("http://")
                .or_else(|| text.strip_prefix("https://"));
            rest.is_some_and(|host| !host.is_empty() && !host.contains(char::is_whitespace))
        })
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Matches the value against the pattern given as first parameter.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    message: String,
}

impl Default for RegexValidator {
    fn default() -> Self {
        Self {
            message: ":field does not match the required format".to_string(),
        }
    }
}

impl Validator for RegexValidator {
    fn validate(&self, input: Input<'_>, params: &[Value]) -> bool {
        let Some(pattern) = params.first().and_then(Value::as_str) else {
            return false;
        };
        match Regex::new(pattern) {
            Ok(re) => re.is_match(input.text().unwrap_or_default()),
            Err(err) => {
                warn!(%pattern, error = %err, "invalid regex rule pattern");
                false
            }
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Character classes checked by a [`CharClassValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// ASCII digits only.
    Digit,
    /// Letters only.
    Alpha,
    /// Letters and digits.
    AlphaNumeric,
    /// Letters, digits, dashes and underscores.
    AlphaDash,
}

impl CharClass {
    fn accepts(self, c: char) -> bool {
        match self {
            Self::Digit => c.is_ascii_digit(),
            Self::Alpha => c.is_alphabetic(),
            Self::AlphaNumeric => c.is_alphanumeric(),
            Self::AlphaDash => c.is_alphanumeric() || c == '-' || c == '_',
        }
    }
}

/// Requires every character to belong to a class.
#[derive(Debug, Clone)]
pub struct CharClassValidator {
    class: CharClass,
    message: String,
}

impl CharClassValidator {
    /// Creates a new CharClassValidator with default message.
    pub fn new(class: CharClass) -> Self {
        let message = match class {
            CharClass::Digit => ":field must be a digit",
            CharClass::Alpha => ":field must contain only letters",
            CharClass::AlphaNumeric => ":field must contain only letters and numbers",
            CharClass::AlphaDash => ":field must contain only numbers, letters and dashes",
        };
        Self {
            class,
            message: message.to_string(),
        }
    }
}

impl Validator for CharClassValidator {
    fn validate(&self, input: Input<'_>, _params: &[Value]) -> bool {
        input
            .text()
            .is_some_and(|text| !text.is_empty() && text.chars().all(|c| self.class.accepts(c)))
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Requires a number.
#[derive(Debug, Clone)]
pub struct NumericValidator {
    message: String,
}

impl Default for NumericValidator {
    fn default() -> Self {
        Self {
            message: ":field must be numeric".to_string(),
        }
    }
}

impl Validator for NumericValidator {
    fn validate(&self, input: Input<'_>, _params: &[Value]) -> bool {
        parse_number(input.text()).is_some()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Requires a number within the two parameters, inclusive.
#[derive(Debug, Clone)]
pub struct RangeValidator {
    message: String,
}

impl Default for RangeValidator {
    fn default() -> Self {
        Self {
            message: ":field must be within the range of :param2 to :param3".to_string(),
        }
    }
}

impl Validator for RangeValidator {
    fn validate(&self, input: Input<'_>, params: &[Value]) -> bool {
        let (Some(num), Some(min), Some(max)) = (
            parse_number(input.text()),
            param_f64(params, 0),
            param_f64(params, 1),
        ) else {
            return false;
        };
        num >= min && num <= max
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Requires the value to equal the first parameter.
#[derive(Debug, Clone)]
pub struct EqualsValidator {
    message: String,
}

impl Default for EqualsValidator {
    fn default() -> Self {
        Self {
            message: ":field must equal :param2".to_string(),
        }
    }
}

impl Validator for EqualsValidator {
    fn validate(&self, input: Input<'_>, params: &[Value]) -> bool {
        params
            .first()
            .is_some_and(|expected| input.text() == Some(value_text(expected).as_str()))
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Requires the value to equal another field's value.
#[derive(Debug, Clone)]
pub struct MatchesValidator {
    message: String,
}

impl Default for MatchesValidator {
    fn default() -> Self {
        Self {
            message: ":field must be the same as :param2".to_string(),
        }
    }
}

impl Validator for MatchesValidator {
    fn validate(&self, input: Input<'_>, params: &[Value]) -> bool {
        let other = params.first().and_then(Value::as_str);
        input.text().filter(|text| !text.is_empty()) == other.filter(|text| !text.is_empty())
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn runs_on_empty(&self) -> bool {
        true
    }
}

/// Checks an upload with one of the `Field::valid_*` helpers.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    check: UploadCheck,
    message: String,
}

/// Upload property checked by an [`UploadValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCheck {
    /// The upload is an image.
    Image,
    /// The extension is in the parameter list.
    FileType,
    /// The size is within the parameter.
    FileSize,
}

impl UploadValidator {
    /// Creates a new UploadValidator with default message.
    pub fn new(check: UploadCheck) -> Self {
        let message = match check {
            UploadCheck::Image => ":field must be an image",
            UploadCheck::FileType => ":field must be one of these file types: :param2",
            UploadCheck::FileSize => ":field must not be larger than :param2",
        };
        Self {
            check,
            message: message.to_string(),
        }
    }
}

impl Validator for UploadValidator {
    fn validate(&self, input: Input<'_>, params: &[Value]) -> bool {
        let file = input.upload();
        match self.check {
            UploadCheck::Image => Field::valid_image(file),
            UploadCheck::FileType => {
                let allowed: Option<Vec<String>> = params.first().map(|p| match p {
                    Value::Array(items) => items.iter().map(value_text).collect(),
                    Value::Null => Vec::new(),
                    other => vec![value_text(other)],
                });
                Field::valid_file_type(file, allowed.as_deref())
            }
            UploadCheck::FileSize => {
                let max = params.first().filter(|p| !p.is_null()).map(value_text);
                Field::valid_file_size(file, max.as_deref())
            }
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// A named set of message templates.
///
/// Templates may use `:field`, `:value` and `:paramN` placeholders, where
/// `:param1` is the value and `:param2` onwards are the rule parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCatalog {
    /// Catalog name.
    pub name: String,
    /// Templates keyed by rule name. The `default` key applies to unknown rules.
    #[serde(default)]
    pub messages: IndexMap<String, String>,
}

impl MessageCatalog {
    /// Creates an empty catalog. Validators' own messages apply.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: IndexMap::new(),
        }
    }

    /// Overrides the template of a rule.
    #[must_use]
    pub fn message(mut self, rule: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(rule.into(), template.into());
        self
    }

    /// Returns the template of a rule.
    pub fn get(&self, rule: &str) -> Option<&str> {
        self.messages.get(rule).map(String::as_str)
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new("validation")
    }
}

/// How failures are reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Messages {
    /// Formatted from a catalog.
    Catalog(MessageCatalog),
    /// Reported as the bare rule name.
    Suppressed,
}

impl Default for Messages {
    fn default() -> Self {
        Self::Catalog(MessageCatalog::default())
    }
}

/// Inputs and display labels handed to [`Validation::check`].
#[derive(Debug, Clone, Default)]
pub struct CheckContext<'a> {
    /// Value of every key, including keys without rules.
    pub inputs: IndexMap<String, Input<'a>>,
    /// Display name per key; keys without one use the key itself.
    pub labels: IndexMap<String, String>,
}

impl<'a> CheckContext<'a> {
    fn input(&self, key: &str) -> Input<'a> {
        self.inputs.get(key).copied().unwrap_or(Input::Text(None))
    }

    fn label<'s>(&'s self, key: &'s str) -> &'s str {
        self.labels.get(key).map_or(key, String::as_str)
    }
}

/// The validation engine: a registry of named validators.
pub struct Validation {
    validators: IndexMap<String, Box<dyn Validator>>,
}

impl std::fmt::Debug for Validation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validation")
            .field("rules", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}

impl Validation {
    /// Creates an engine with the built-in rules registered.
    pub fn new() -> Self {
        Self::empty()
            .register(NOT_EMPTY, NotEmptyValidator::new())
            .register(UPLOAD_NOT_EMPTY, UploadNotEmptyValidator::default())
            .register("min_length", LengthValidator::new(LengthBound::Min))
            .register("max_length", LengthValidator::new(LengthBound::Max))
            .register("exact_length", LengthValidator::new(LengthBound::Exact))
            .register("email", EmailValidator::new())
            .register("url", UrlValidator::default())
            .register("regex", RegexValidator::default())
            .register("numeric", NumericValidator::default())
            .register("digit", CharClassValidator::new(CharClass::Digit))
            .register("alpha", CharClassValidator::new(CharClass::Alpha))
            .register("alpha_numeric", CharClassValidator::new(CharClass::AlphaNumeric))
            .register("alpha_dash", CharClassValidator::new(CharClass::AlphaDash))
            .register("range", RangeValidator::default())
            .register("equals", EqualsValidator::default())
            .register("matches", MatchesValidator::default())
            .register("valid_image", UploadValidator::new(UploadCheck::Image))
            .register("valid_file_type", UploadValidator::new(UploadCheck::FileType))
            .register("valid_file_size", UploadValidator::new(UploadCheck::FileSize))
    }

    /// Creates an engine without any rules.
    pub fn empty() -> Self {
        Self {
            validators: IndexMap::new(),
        }
    }

    /// Registers a validator under `name`, replacing an existing one.
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.validators.insert(name.into(), Box::new(validator));
        self
    }

    /// Registers a closure under `name`.
    #[must_use]
    pub fn register_fn<F>(self, name: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(Input<'_>, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.register(name, Predicate::new(message, check))
    }

    /// Returns whether a rule name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Evaluates `rules` key by key.
    ///
    /// Evaluation of a key stops at its first failing rule.
    pub fn check(
        &self,
        context: &CheckContext<'_>,
        rules: &IndexMap<String, Vec<RuleDescriptor>>,
        messages: &Messages,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        for (key, descriptors) in rules {
            let input = context.input(key);

            for rule in descriptors {
                let Some(validator) = self.validators.get(&rule.name) else {
                    warn!(field = %key, rule = %rule.name, "unknown validation rule");
                    errors.add(key, format_message(messages, rule, None, context, key, input));
                    break;
                };

                if input.is_empty() && !validator.runs_on_empty() {
                    continue;
                }

                let params = resolve_params(rule, context);
                if !validator.validate(input, &params) {
                    debug!(field = %key, rule = %rule.name, "rule failed");
                    let template = Some(validator.message());
                    errors.add(key, format_message(messages, rule, template, context, key, input));
                    break;
                }
            }
        }

        errors
    }
}

fn resolve_params(rule: &RuleDescriptor, context: &CheckContext<'_>) -> Vec<Value> {
    rule.params
        .iter()
        .filter_map(|param| match param {
            Param::Value => None,
            Param::Field(name) => Some(
                context
                    .input(name)
                    .text()
                    .map_or(Value::Null, |text| Value::String(text.to_string())),
            ),
            Param::Literal(value) => Some(value.clone()),
        })
        .collect()
}

fn format_message(
    messages: &Messages,
    rule: &RuleDescriptor,
    template: Option<&str>,
    context: &CheckContext<'_>,
    key: &str,
    input: Input<'_>,
) -> String {
    let catalog = match messages {
        Messages::Suppressed => return rule.name.clone(),
        Messages::Catalog(catalog) => catalog,
    };

    // unregistered rules have no template of their own
    let template = catalog
        .get(&rule.name)
        .or(template)
        .or_else(|| catalog.get("default"))
        .unwrap_or(":field is not valid");

    let value = input.text().unwrap_or_default().to_string();
    let mut replacements = vec![value.clone()];
    replacements.extend(
        rule.params
            .iter()
            .filter(|param| !matches!(param, Param::Value))
            .map(|param| match param {
                Param::Field(name) => context.label(name).to_string(),
                Param::Literal(value) => value_text(value),
                Param::Value => String::new(),
            }),
    );

    // highest index first so :param1 does not clobber :param10
    let mut message = template.to_string();
    for (index, text) in replacements.iter().enumerate().rev() {
        message = message.replace(&format!(":param{}", index + 1), text);
    }
    message
        .replace(":field", context.label(key))
        .replace(":value", &value)
}

/// Display form of a parameter; arrays are comma separated.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

fn param_usize(params: &[Value], index: usize) -> Option<usize> {
    match params.get(index)? {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn param_f64(params: &[Value], index: usize) -> Option<f64> {
    match params.get(index)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_number(text: Option<&str>) -> Option<f64> {
    text.and_then(|t| t.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check_one(rule: RuleDescriptor, value: Option<&str>) -> ValidationErrors {
        let mut context = CheckContext::default();
        context.inputs.insert("field".to_string(), Input::Text(value));
        let mut rules = IndexMap::new();
        rules.insert("field".to_string(), vec![rule]);
        Validation::new().check(&context, &rules, &Messages::default())
    }

    fn passes(rule: RuleDescriptor, value: &str) -> bool {
        check_one(rule, Some(value)).is_empty()
    }

    #[test]
    fn test_not_empty() {
        assert!(passes(RuleDescriptor::new("not_empty"), "hello"));
        assert!(!passes(RuleDescriptor::new("not_empty"), ""));
        assert!(!check_one(RuleDescriptor::new("not_empty"), None).is_empty());
    }

    #[test]
    fn test_length_rules() {
        assert!(passes(RuleDescriptor::new("max_length").arg(5), "hello"));
        assert!(!passes(RuleDescriptor::new("max_length").arg(5), "hello world"));
        assert!(passes(RuleDescriptor::new("min_length").arg("3"), "héé"));
        assert!(!passes(RuleDescriptor::new("min_length").arg(5), "hi"));
        assert!(passes(RuleDescriptor::new("exact_length").arg(2), "hi"));
    }

    #[test]
    fn test_email() {
        assert!(passes(RuleDescriptor::new("email"), "user@example.com"));
        assert!(passes(RuleDescriptor::new("email"), "user.name@domain.co.uk"));
        assert!(!passes(RuleDescriptor::new("email"), "invalid"));
        assert!(!passes(RuleDescriptor::new("email"), "@example.com"));
    }

    #[test]
    fn test_url() {
        assert!(passes(RuleDescriptor::new("url"), "https://example.com"));
        assert!(passes(RuleDescriptor::new("url"), "http://example.com/path"));
        assert!(!passes(RuleDescriptor::new("url"), "example.com"));
    }

    #[test]
    fn test_regex() {
        let rule = || RuleDescriptor::new("regex").arg(r"^\d{4}-\d{2}-\d{2}$");
        assert!(passes(rule(), "2024-01-15"));
        assert!(!passes(rule(), "not a date"));
        assert!(!passes(RuleDescriptor::new("regex").arg("("), "anything"));
    }

    #[test]
    fn test_range_and_numeric() {
        let rule = || RuleDescriptor::new("range").arg(0).arg(100);
        assert!(passes(rule(), "50"));
        assert!(passes(rule(), "0"));
        assert!(passes(rule(), "100"));
        assert!(!passes(rule(), "-1"));
        assert!(!passes(rule(), "101"));
        assert!(passes(RuleDescriptor::new("numeric"), "-1.5"));
        assert!(!passes(RuleDescriptor::new("numeric"), "12abc"));
    }

    #[test]
    fn test_char_classes() {
        assert!(passes(RuleDescriptor::new("digit"), "0123"));
        assert!(!passes(RuleDescriptor::new("digit"), "12.3"));
        assert!(passes(RuleDescriptor::new("alpha"), "Zoë"));
        assert!(passes(RuleDescriptor::new("alpha_dash"), "snake_case-name"));
        assert!(!passes(RuleDescriptor::new("alpha_numeric"), "a b"));
    }

    #[test]
    fn test_empty_input_skips_optional_rules() {
        assert!(check_one(RuleDescriptor::new("email"), None).is_empty());
        assert!(check_one(RuleDescriptor::new("min_length").arg(3), Some("")).is_empty());
    }

    #[test]
    fn test_stops_at_first_failure() {
        let mut context = CheckContext::default();
        context.inputs.insert("code".to_string(), Input::Text(Some("ab")));
        let mut rules = IndexMap::new();
        rules.insert(
            "code".to_string(),
            vec![
                RuleDescriptor::new("min_length").arg(3),
                RuleDescriptor::new("digit"),
            ],
        );

        let errors = Validation::new().check(&context, &rules, &Messages::default());
        assert_eq!(
            errors.get("code"),
            Some(&vec!["code must be at least 3 characters long".to_string()])
        );
    }

    #[test]
    fn test_matches_other_field() {
        let mut context = CheckContext::default();
        context.inputs.insert("password".to_string(), Input::Text(Some("secret")));
        context.inputs.insert("confirm".to_string(), Input::Text(Some("secrit")));
        context
            .labels
            .insert("password".to_string(), "Password".to_string());
        let mut rules = IndexMap::new();
        rules.insert(
            "confirm".to_string(),
            vec![RuleDescriptor::with_params(
                "matches",
                vec![Param::Value, Param::Field("password".to_string())],
            )],
        );

        let errors = Validation::new().check(&context, &rules, &Messages::default());
        assert_eq!(errors.first("confirm"), Some("confirm must be the same as Password"));
    }

    #[test]
    fn test_message_catalog_and_labels() {
        let mut context = CheckContext::default();
        context.inputs.insert("age".to_string(), Input::Text(Some("200")));
        context.labels.insert("age".to_string(), "Age".to_string());
        let mut rules = IndexMap::new();
        rules.insert(
            "age".to_string(),
            vec![RuleDescriptor::new("range").arg(1).arg(120)],
        );

        let engine = Validation::new();
        let default = engine.check(&context, &rules, &Messages::default());
        assert_eq!(
            default.first("age"),
            Some("Age must be within the range of 1 to 120")
        );

        let catalog = MessageCatalog::new("custom").message("range", ":value is not in [:param2, :param3]");
        let custom = engine.check(&context, &rules, &Messages::Catalog(catalog));
        assert_eq!(custom.first("age"), Some("200 is not in [1, 120]"));

        let suppressed = engine.check(&context, &rules, &Messages::Suppressed);
        assert_eq!(suppressed.first("age"), Some("range"));
    }

    #[test]
    fn test_unknown_rule_fails_the_key() {
        let errors = check_one(RuleDescriptor::new("no_such_rule"), Some("x"));
        assert_eq!(errors.first("field"), Some("field is not valid"));
    }

    #[test]
    fn test_register_fn() {
        let engine = Validation::new().register_fn("even", ":field must be even", |input, _| {
            input
                .text()
                .and_then(|t| t.parse::<i64>().ok())
                .is_some_and(|n| n % 2 == 0)
        });
        let mut context = CheckContext::default();
        context.inputs.insert("n".to_string(), Input::Text(Some("3")));
        let mut rules = IndexMap::new();
        rules.insert("n".to_string(), vec![RuleDescriptor::new("even")]);

        let errors = engine.check(&context, &rules, &Messages::default());
        assert_eq!(errors.first("n"), Some("n must be even"));
    }

    #[test]
    fn test_upload_rules() {
        let photo = UploadedFile::new("cat.txt", "text/plain", 4096);
        let mut context = CheckContext::default();
        context.inputs.insert("photo".to_string(), Input::Upload(Some(&photo)));
        context.inputs.insert("missing".to_string(), Input::Upload(None));
        let mut rules = IndexMap::new();
        rules.insert(
            "photo".to_string(),
            vec![
                RuleDescriptor::new("upload_not_empty"),
                RuleDescriptor::new("valid_file_type").arg(json!(["png", "jpg"])),
            ],
        );
        rules.insert(
            "missing".to_string(),
            vec![RuleDescriptor::new("upload_not_empty")],
        );

        let errors = Validation::new().check(&context, &rules, &Messages::default());
        assert_eq!(
            errors.first("photo"),
            Some("photo must be one of these file types: png, jpg")
        );
        assert_eq!(errors.first("missing"), Some("missing must not be empty"));
    }
}
