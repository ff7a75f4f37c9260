//! Rule management and the `addRule_*` shortcut table.

use serde_json::Value;

use super::Field;
use crate::error::{FormError, Result};
use crate::validation::{Param, RuleDescriptor};

/// Prefix of dynamic rule shortcut names.
const SHORTCUT_PREFIX: &str = "addRule_";

/// How a shortcut turns its arguments into rules.
#[derive(Debug, Clone, Copy)]
enum Shortcut {
    /// One rule taking up to `arity` literal arguments.
    Rule { rule: &'static str, arity: usize },
    /// `email` plus `max_length`.
    Email,
    /// `min_length` plus `max_length`.
    Password,
    /// `matches` against the named field.
    Matches,
}

const RULE_SHORTCUTS: &[(&str, Shortcut)] = &[
    ("NotEmpty", Shortcut::Rule { rule: "not_empty", arity: 0 }),
    ("MinLength", Shortcut::Rule { rule: "min_length", arity: 1 }),
    ("MaxLength", Shortcut::Rule { rule: "max_length", arity: 1 }),
    ("ExactLength", Shortcut::Rule { rule: "exact_length", arity: 1 }),
    ("Url", Shortcut::Rule { rule: "url", arity: 0 }),
    ("Numeric", Shortcut::Rule { rule: "numeric", arity: 0 }),
    ("Digit", Shortcut::Rule { rule: "digit", arity: 0 }),
    ("Alpha", Shortcut::Rule { rule: "alpha", arity: 0 }),
    ("AlphaNumeric", Shortcut::Rule { rule: "alpha_numeric", arity: 0 }),
    ("AlphaDash", Shortcut::Rule { rule: "alpha_dash", arity: 0 }),
    ("Regex", Shortcut::Rule { rule: "regex", arity: 1 }),
    ("Range", Shortcut::Rule { rule: "range", arity: 2 }),
    ("Equals", Shortcut::Rule { rule: "equals", arity: 1 }),
    ("Email", Shortcut::Email),
    ("Password", Shortcut::Password),
    ("Matches", Shortcut::Matches),
];

const DEFAULT_EMAIL_MAX: usize = 254;
const DEFAULT_PASSWORD_MIN: usize = 6;
const DEFAULT_PASSWORD_MAX: usize = 32;

impl Field {
    /// Appends a rule checking this field's value with literal `params`.
    #[must_use]
    pub fn add_rule(mut self, name: impl Into<String>, params: impl IntoIterator<Item = Value>) -> Self {
        let mut rule = RuleDescriptor::new(name);
        rule.params.extend(params.into_iter().map(Param::Literal));
        self.rules.push(rule);
        self
    }

    /// Appends a rule without parameters.
    #[must_use]
    pub fn rule(mut self, name: impl Into<String>) -> Self {
        self.rules.push(RuleDescriptor::new(name));
        self
    }

    /// Appends a rule with explicit parameters.
    #[must_use]
    pub fn add_rule_with(mut self, name: impl Into<String>, params: Vec<Param>) -> Self {
        self.rules.push(RuleDescriptor::with_params(name, params));
        self
    }

    /// Replaces the user rules.
    #[must_use]
    pub fn set_rules(mut self, rules: Vec<RuleDescriptor>) -> Self {
        self.rules = rules;
        self
    }

    /// Returns the rules to evaluate; a required field's emptiness check
    /// comes first.
    pub fn rules(&self) -> Vec<RuleDescriptor> {
        let required = self
            .required
            .then(|| RuleDescriptor::new(self.kind.required_rule()));
        required.into_iter().chain(self.rules.iter().cloned()).collect()
    }

    /// Returns the user rules only.
    pub fn user_rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// Adds a minimum length rule.
    #[must_use]
    pub fn add_rule_min_length(self, length: usize) -> Self {
        self.add_rule("min_length", [Value::from(length)])
    }

    /// Adds a maximum length rule.
    #[must_use]
    pub fn add_rule_max_length(self, length: usize) -> Self {
        self.add_rule("max_length", [Value::from(length)])
    }

    /// Adds password length rules.
    #[must_use]
    pub fn add_rule_password(self, min_length: usize, max_length: usize) -> Self {
        self.add_rule_min_length(min_length)
            .add_rule_max_length(max_length)
    }

    /// Adds e-mail format and length rules.
    #[must_use]
    pub fn add_rule_email(self, max_length: usize) -> Self {
        self.rule("email")
            .add_rule_max_length(max_length)
    }

    /// Applies a rule shortcut by name, e.g. `addRule_MinLength`.
    ///
    /// Arguments beyond a shortcut's arity are ignored.
    pub fn call_rule_shortcut(self, method: &str, args: &[Value]) -> Result<Self> {
        let shortcut = method
            .strip_prefix(SHORTCUT_PREFIX)
            .and_then(|name| RULE_SHORTCUTS.iter().find(|(known, _)| *known == name))
            .map(|(_, shortcut)| *shortcut)
            .ok_or_else(|| FormError::UnknownRuleShortcut(method.to_string()))?;

        Ok(match shortcut {
            Shortcut::Rule { rule, arity } => {
                self.add_rule(rule, args.iter().take(arity).cloned())
            }
            Shortcut::Email => self.add_rule_email(arg_usize(args, 0, DEFAULT_EMAIL_MAX)),
            Shortcut::Password => self.add_rule_password(
                arg_usize(args, 0, DEFAULT_PASSWORD_MIN),
                arg_usize(args, 1, DEFAULT_PASSWORD_MAX),
            ),
            Shortcut::Matches => {
                let other = args.first().and_then(Value::as_str).unwrap_or_default();
                self.add_rule_with(
                    "matches",
                    vec![Param::Value, Param::Field(other.to_string())],
                )
            }
        })
    }
}

fn arg_usize(args: &[Value], index: usize, default: usize) -> usize {
    args.get(index)
        .and_then(|arg| match arg {
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(default)
}
