//! Error types and error report formatting
//!
//! [`ValidationError`] is both the leaf failure produced by a single test and
//! the aggregate returned by a validation run. Aggregating flattens nested
//! aggregates so `inner` always lists leaves, each with its absolute path.

use crate::locale::{ErrorMessage, Params};
use crate::value::Value;
use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// A failed validation, either a single leaf or an aggregate of leaves
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The (cast) value that failed
    pub value: Value,
    /// Path of the failure; empty for the root
    pub path: String,
    /// Name of the failing test
    pub kind: Option<String>,
    pub params: Params,
    /// Flat list of every message
    pub errors: Vec<ErrorMessage>,
    /// Leaf failures, empty for a leaf
    pub inner: Vec<ValidationError>,
}

impl ValidationError {
    /// Constant identifying this error kind
    pub const NAME: &'static str = "ValidationError";

    /// Create a leaf error
    pub fn new(
        message: impl Into<ErrorMessage>,
        value: Value,
        path: impl Into<String>,
        kind: Option<String>,
    ) -> Self {
        Self {
            value,
            path: path.into(),
            kind,
            params: Params::new(),
            errors: vec![message.into()],
            inner: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Combine errors into one aggregate rooted at `path`.
    ///
    /// Aggregates contribute their leaves, leaves contribute themselves.
    pub fn aggregate(errors: Vec<ValidationError>, value: Value, path: impl Into<String>) -> Self {
        let mut out = Self {
            value,
            path: path.into(),
            kind: None,
            params: Params::new(),
            errors: Vec::new(),
            inner: Vec::new(),
        };
        for err in errors {
            out.errors.extend(err.errors.iter().cloned());
            if err.inner.is_empty() {
                out.inner.push(err);
            } else {
                out.inner.extend(err.inner);
            }
        }
        out
    }

    pub fn is_leaf(&self) -> bool {
        self.inner.is_empty()
    }

    /// Leaf failures (the error itself for a leaf)
    pub fn leaves(&self) -> Vec<&ValidationError> {
        if self.inner.is_empty() {
            vec![self]
        } else {
            self.inner.iter().collect()
        }
    }

    /// First leaf failure
    pub fn first(&self) -> &ValidationError {
        self.inner.first().unwrap_or(self)
    }

    /// Paths of every leaf failure
    pub fn paths(&self) -> Vec<&str> {
        self.leaves().into_iter().map(|e| e.path.as_str()).collect()
    }

    /// The headline message
    pub fn message(&self) -> String {
        match self.errors.len() {
            0 => String::new(),
            1 => self.errors[0].to_string(),
            n => format!("{} errors occurred", n),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Asserting cast could not produce a value of the schema's type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CastError {
    pub path: String,
    pub type_name: String,
    pub value: Value,
    pub message: String,
}

impl CastError {
    pub fn new(path: &str, type_name: &str, value: Value, nullable: bool) -> Self {
        let display = if path.is_empty() { "this" } else { path };
        let message = if value.is_null() && !nullable {
            format!(
                "The value of {} could not be cast to a value that satisfies the schema type: \"{}\". \
                 Null is not allowed; use nullable() to accept it.",
                display, type_name
            )
        } else {
            format!(
                "The value of {} could not be cast to a value that satisfies the schema type: \"{}\". \
                 attempted value: {}",
                display,
                type_name,
                value.print()
            )
        };
        Self {
            path: path.to_string(),
            type_name: type_name.to_string(),
            value,
            message,
        }
    }
}

/// Static configuration errors, raised while a schema is being built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("cannot concat schema of type `{right}` onto schema of type `{left}`")]
    IncompatibleConcat { left: String, right: String },

    #[error("cyclic dependency between object fields involving `{field}`")]
    CyclicDependency { field: String },

    #[error("no method `{name}` registered for schema type `{type_name}`")]
    UnknownMethod { type_name: String, name: String },

    #[error("cannot resolve path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid schema document: {0}")]
    InvalidDocument(String),
}

/// Any failure surfaced by the public API
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A synchronous validation reached a test that can only run asynchronously
    #[error(
        "validation test `{test}` at `{path}` is asynchronous and cannot run during a synchronous validate; use `validate` instead"
    )]
    AsyncInSync { path: String, test: String },
}

impl Error {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_validation(self) -> Option<ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Format a validation error as a colored report, one line per leaf
pub fn format_validation_error(error: &ValidationError) -> String {
    let mut output = String::new();
    let leaves = error.leaves();

    output.push_str(&format!(
        "{} {}\n",
        "Validation failed:".red().bold(),
        if leaves.len() == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", leaves.len())
        }
    ));

    for leaf in leaves {
        let path = if leaf.path.is_empty() { "(root)" } else { leaf.path.as_str() };
        output.push_str(&format!("  {} {}\n", "•".red(), path.yellow()));
        for message in &leaf.errors {
            output.push_str(&format!("      {}\n", message));
        }
        if let Some(kind) = &leaf.kind {
            output.push_str(&format!("      {} {}\n", "rule:".dimmed(), kind.cyan()));
        }
    }

    output
}
