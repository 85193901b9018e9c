//!
//! This module defines the Rule trait and related types for implementing validation rules in codevalidator.
//! A rule is a named content predicate with an optional matching text transform.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::path::Path;
use thiserror::Error;

/// Errors a rule may raise while validating or fixing.
///
/// None of these ever escape a single rule invocation: the engine converts them into
/// a reported failure for that (file, rule) pair.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Missing or incorrect codevalidator configuration
    #[error("ConfigurationError: {0}")]
    Configuration(String),
    /// Error while executing some command
    #[error("ExecutionError: {0}")]
    Execution(String),
    #[error("{0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rule {0} has no fixer")]
    NoFixer(&'static str),
}

/// What a validator concluded about a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Fails with the rule's templated message
    Fail,
    /// Fails with a message produced by the rule itself
    FailWith(String),
}

impl Verdict {
    pub fn from_bool(valid: bool) -> Self {
        if valid { Verdict::Pass } else { Verdict::Fail }
    }
}

pub type ValidationResult = Result<Verdict, RuleError>;

/// Whether a rule can rewrite the files it rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixCapability {
    Fixable,
    /// Diagnostic-only rule
    #[default]
    Unfixable,
}

/// A granular diagnostic attached to one rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

/// Detail records emitted by a rule during one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Details {
    records: Vec<Detail>,
}

impl Details {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.add(message, None, None);
    }

    pub fn at_line(&mut self, message: impl Into<String>, line: usize) {
        self.add(message, Some(line), None);
    }

    pub fn add(&mut self, message: impl Into<String>, line: Option<usize>, column: Option<usize>) {
        self.records.push(Detail {
            message: message.into(),
            line,
            column,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detail> {
        self.records.iter()
    }

    pub fn into_vec(self) -> Vec<Detail> {
        self.records
    }
}

/// The file a rule is asked to judge: its path and its full content.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub path: &'a Path,
    pub content: &'a [u8],
}

impl<'a> RuleInput<'a> {
    pub fn new(path: &'a Path, content: &'a [u8]) -> Self {
        Self { path, content }
    }

    /// Content as text, replacing invalid UTF-8 sequences
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.content)
    }

    /// Lines including their terminators
    pub fn lines(&self) -> impl Iterator<Item = &'a [u8]> {
        self.content.split_inclusive(|&b| b == b'\n')
    }

    pub fn path_str(&self) -> Cow<'a, str> {
        self.path.to_string_lossy()
    }
}

/// Rule-specific option bag, as found under `options.<rule>` in the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleOptions {
    values: serde_json::Map<String, Value>,
}

impl RuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look a key up, accepting both snake_case and kebab-case spellings
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values
            .get(key)
            .or_else(|| self.values.get(&key.replace('-', "_")))
            .or_else(|| self.values.get(&key.replace('_', "-")))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.raw(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.raw(key).and_then(Value::as_str)
    }

    /// Render a value the way it is interpolated into messages and command lines
    pub fn display(&self, key: &str) -> Option<String> {
        self.raw(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn require(&self, rule: &str, key: &str) -> Result<String, RuleError> {
        self.display(key)
            .ok_or_else(|| RuleError::Configuration(format!("option '{key}' for rule {rule} is not set")))
    }

    /// Replace `{key}` placeholders in `template` with option values.
    /// Unknown placeholders are left as they are.
    pub fn interpolate(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match self.display(key) {
                        Some(value) if !key.is_empty() => out.push_str(&value),
                        _ => {
                            out.push('{');
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// A named, independently testable file-content predicate plus optional text transform.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Message template reported when `validate` returns [`Verdict::Fail`].
    /// `{key}` placeholders are filled from the rule's option bag.
    fn message(&self) -> &'static str;

    /// Rules that cannot run without an option bag
    fn requires_options(&self) -> bool {
        false
    }

    fn fix_capability(&self) -> FixCapability {
        FixCapability::Unfixable
    }

    fn validate(&self, input: &RuleInput<'_>, options: Option<&RuleOptions>, details: &mut Details) -> ValidationResult;

    /// Drain `source` and write the fixed content into `destination`.
    /// Only called for rules whose capability is [`FixCapability::Fixable`].
    fn fix(&self, _source: &[u8], _destination: &mut Vec<u8>, _options: Option<&RuleOptions>) -> Result<(), RuleError> {
        Err(RuleError::NoFixer(self.name()))
    }
}
