//! Rule trait definition and the types rules report with

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lint::config::Config;
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{Definition, Dependency, ManagerType, Manifest};

/// Configuration value attached to a rule override
pub type RuleValue = serde_yaml::Value;

/// Severity of a rule. Ordered from least to most strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Disabled,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Disabled => "disabled",
            Level::Warning => "warning",
            Level::Error => "error",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The configured value does not have the shape the rule expects
    #[error("Invalid value for rule {rule}: expected {expected}")]
    InvalidValue { rule: String, expected: &'static str },
}

/// One reported violation.
///
/// Name, level and message are taken from the rule at the moment the
/// violation was found, so they reflect the configuration applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mistake {
    pub rule: &'static str,
    pub level: Level,
    pub message: String,
    pub definitions: Vec<Definition>,
}

impl Mistake {
    pub fn new<R: Rule + ?Sized>(rule: &R, definitions: Vec<Definition>) -> Self {
        Self {
            rule: rule.name(),
            level: rule.level(),
            message: rule.message(),
            definitions,
        }
    }
}

/// A configurable setting that can be restored to its compiled-in default
#[derive(Debug, Clone, PartialEq)]
pub struct Setting<T> {
    default: T,
    current: T,
}

impl<T: Clone> Setting<T> {
    pub fn new(default: T) -> Self {
        Self {
            current: default.clone(),
            default,
        }
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn set(&mut self, value: T) {
        self.current = value;
    }

    pub fn reset(&mut self) {
        self.current = self.default.clone();
    }
}

impl<T: Copy> Setting<T> {
    pub fn value(&self) -> T {
        self.current
    }
}

/// A named, configurable policy check
pub trait Rule: Send + Sync {
    /// Stable identifier, matched against configuration overrides
    fn name(&self) -> &'static str;

    /// Human-readable description of a violation
    fn message(&self) -> String;

    fn level(&self) -> Level;

    fn set_level(&mut self, level: Level);

    /// Sets the rule-specific value. Rules without a value accept and ignore it.
    fn set_value(&mut self, value: &RuleValue) -> Result<(), RuleError>;

    /// Restores level and value to their compiled-in defaults
    fn reset(&mut self);

    /// Ecosystems this rule applies to
    fn supported(&self) -> &'static [ManagerType];

    fn is_supported(&self, manager: ManagerType) -> bool {
        self.supported().contains(&manager)
    }

    /// Evaluates the rule. Configuration is applied per dependency before
    /// it is inspected; only configuration errors are returned.
    fn check(
        &mut self,
        manifests: &[Manifest],
        info: &PackagesInfo,
        config: &Config,
    ) -> Result<Vec<Mistake>, RuleError>;
}

/// Applies configuration for one dependency.
/// Returns false when the rule is disabled for it.
pub(crate) fn configure<R: Rule + ?Sized>(
    rule: &mut R,
    config: &Config,
    manifest: &Manifest,
    dependency: &Dependency,
) -> Result<bool, RuleError> {
    config.apply(&manifest.path, &dependency.name, rule)?;
    Ok(rule.level() != Level::Disabled)
}

/// Reads an integer value (floats are truncated)
pub(crate) fn value_as_u64(rule: &str, value: &RuleValue) -> Result<u64, RuleError> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
        .ok_or_else(|| RuleError::InvalidValue {
            rule: rule.to_string(),
            expected: "a non-negative number",
        })
}

/// Reads a numeric value
pub(crate) fn value_as_f64(rule: &str, value: &RuleValue) -> Result<f64, RuleError> {
    value.as_f64().ok_or_else(|| RuleError::InvalidValue {
        rule: rule.to_string(),
        expected: "a number",
    })
}

/// Reads a list of strings; a single string is a one-element list
pub(crate) fn value_as_string_list(rule: &str, value: &RuleValue) -> Result<Vec<String>, RuleError> {
    let invalid = || RuleError::InvalidValue {
        rule: rule.to_string(),
        expected: "a list of strings",
    };

    match value {
        RuleValue::String(s) => Ok(vec![s.clone()]),
        RuleValue::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}
