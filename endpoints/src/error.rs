use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by an override source while looking up a single key.
///
/// The resolver never propagates these: a faulting source degrades to the
/// setting's default value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Override for {key} is not valid unicode")]
    NotUnicode { key: String },

    #[error("Invalid override key: {key:?}")]
    InvalidKey { key: String },

    #[error("Override source unavailable for {key}: {reason}")]
    Unavailable { key: String, reason: String },
}

/// Errors in the shape of a settings table or in names parsed from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Duplicate setting name: {0}")]
    DuplicateName(String),

    #[error("Duplicate override key: {0}")]
    DuplicateOverrideKey(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),
}

/// Why a resolved value does not look like a base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeProblem {
    Empty,
    Relative,
    ProtocolRelative,
    UnsupportedScheme,
    Unparseable,
}

impl fmt::Display for ShapeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ShapeProblem::Empty => "value is empty",
            ShapeProblem::Relative => "relative path must start with '/'",
            ShapeProblem::ProtocolRelative => "protocol-relative URL points at another host",
            ShapeProblem::UnsupportedScheme => "only http and https URLs are supported",
            ShapeProblem::Unparseable => "value is not a valid URL",
        };
        f.write_str(text)
    }
}

/// One setting that failed the shape check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeFailure {
    pub name: String,
    pub value: String,
    pub problem: ShapeProblem,
}

impl fmt::Display for ShapeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?} ({})", self.name, self.value, self.problem)
    }
}

/// Raised by the optional startup check when one or more resolved values
/// are not shaped like a base URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid endpoint configuration: {}", describe(.failures))]
pub struct ConfigValidationError {
    pub failures: Vec<ShapeFailure>,
}

impl ConfigValidationError {
    /// Names of every offending setting, in the order they were checked.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|failure| failure.name.as_str())
    }
}

fn describe(failures: &[ShapeFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
