//! Message templates and locale lookup
//!
//! Validation messages are either `${param}` templates or generator
//! functions. Built-in rules look their message up by type name and rule
//! name through the process-wide [`Locale`]; any miss falls back to the
//! default English table below.

use crate::value::{Map, Value};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Parameters available to message templates
pub type Params = Map;

/// A rendered message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    /// Structured message handed to an external localization layer
    Keyed { key: String, values: Params },
}

impl ErrorMessage {
    pub fn text(&self) -> Option<&str> {
        match self {
            ErrorMessage::Text(s) => Some(s),
            ErrorMessage::Keyed { .. } => None,
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMessage::Text(s) => write!(f, "{}", s),
            ErrorMessage::Keyed { key, .. } => write!(f, "{}", key),
        }
    }
}

impl From<&str> for ErrorMessage {
    fn from(s: &str) -> Self {
        ErrorMessage::Text(s.to_string())
    }
}

impl From<String> for ErrorMessage {
    fn from(s: String) -> Self {
        ErrorMessage::Text(s)
    }
}

pub type MessageFn = Arc<dyn Fn(&Params) -> ErrorMessage + Send + Sync>;

/// An unrendered message
#[derive(Clone)]
pub enum Message {
    Template(String),
    Generator(MessageFn),
}

impl Message {
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&Params) -> ErrorMessage + Send + Sync + 'static,
    {
        Message::Generator(Arc::new(f))
    }

    /// Render with `params`; `path` is expected to already hold the display path
    pub fn render(&self, params: &Params) -> ErrorMessage {
        match self {
            Message::Template(template) => ErrorMessage::Text(interpolate(template, params)),
            Message::Generator(f) => f(params),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Template(t) => write!(f, "Template({:?})", t),
            Message::Generator(_) => write!(f, "Generator(..)"),
        }
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Template(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::Template(s)
    }
}

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\$\{\s*(\w+)\s*\}").expect("placeholder pattern");
    static ref ACTIVE_LOCALE: RwLock<Option<Arc<dyn Locale>>> = RwLock::new(None);
}

/// Substitute `${name}` placeholders verbatim from `params`
pub fn interpolate(template: &str, params: &Params) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            params
                .get(&caps[1])
                .map(Value::print)
                .unwrap_or_else(|| Value::Undefined.print())
        })
        .into_owned()
}

/// Message dictionary keyed by type name and rule name
pub trait Locale: Send + Sync {
    fn lookup(&self, type_name: &str, rule: &str) -> Option<Message>;
}

/// Install a process-wide locale
pub fn set_locale<L: Locale + 'static>(locale: L) {
    let mut active = ACTIVE_LOCALE.write().unwrap_or_else(PoisonError::into_inner);
    *active = Some(Arc::new(locale));
}

/// Go back to the built-in messages
pub fn reset_locale() {
    let mut active = ACTIVE_LOCALE.write().unwrap_or_else(PoisonError::into_inner);
    *active = None;
}

/// Message for a rule of a type: the active locale first, then the defaults
pub fn message_for(type_name: &str, rule: &str) -> Message {
    let custom = {
        let active = ACTIVE_LOCALE.read().unwrap_or_else(PoisonError::into_inner);
        active.as_ref().and_then(|l| {
            l.lookup(type_name, rule)
                .or_else(|| l.lookup("mixed", rule))
        })
    };
    custom
        .or_else(|| DefaultLocale.lookup(type_name, rule))
        .or_else(|| DefaultLocale.lookup("mixed", rule))
        .unwrap_or_else(|| Message::from("${path} is invalid"))
}

/// Built-in English messages
pub struct DefaultLocale;

impl Locale for DefaultLocale {
    fn lookup(&self, type_name: &str, rule: &str) -> Option<Message> {
        let template = match (type_name, rule) {
            (_, "typeError") => return Some(Message::generator(not_type_message)),
            ("mixed", "default") => "${path} is invalid",
            ("mixed", "required") => "${path} is a required field",
            ("mixed", "defined") => "${path} must be defined",
            ("mixed", "nullable") => "${path} cannot be null",
            ("mixed", "oneOf") => "${path} must be one of the following values: ${values}",
            ("mixed", "notOneOf") => "${path} must not be one of the following values: ${values}",

            ("string", "length") => "${path} must be exactly ${length} characters",
            ("string", "min") => "${path} must be at least ${min} characters",
            ("string", "max") => "${path} must be at most ${max} characters",
            ("string", "matches") => "${path} must match the following: \"${regex}\"",
            ("string", "email") => "${path} must be a valid email",
            ("string", "url") => "${path} must be a valid URL",
            ("string", "uuid") => "${path} must be a valid UUID",
            ("string", "trim") => "${path} must be a trimmed string",
            ("string", "lowercase") => "${path} must be a lowercase string",
            ("string", "uppercase") => "${path} must be an uppercase string",

            ("number", "min") => "${path} must be greater than or equal to ${min}",
            ("number", "max") => "${path} must be less than or equal to ${max}",
            ("number", "lessThan") => "${path} must be less than ${less}",
            ("number", "moreThan") => "${path} must be greater than ${more}",
            ("number", "positive") => "${path} must be a positive number",
            ("number", "negative") => "${path} must be a negative number",
            ("number", "integer") => "${path} must be an integer",

            ("boolean", "isValue") => "${path} field must be ${value}",

            ("date", "min") => "${path} field must be later than ${min}",
            ("date", "max") => "${path} field must be earlier than ${max}",

            ("object", "noUnknown") => "${path} field has unspecified keys: ${unknown}",

            ("array", "min") => "${path} field must have at least ${min} items",
            ("array", "max") => "${path} field must have less than or equal to ${max} items",
            ("array", "length") => "${path} must have ${length} items",

            ("tuple", "length") => "${path} tuple must have exactly ${length} items",
            _ => return None,
        };
        Some(Message::from(template))
    }
}

fn not_type_message(params: &Params) -> ErrorMessage {
    let path = params.get("path").map(Value::print).unwrap_or_else(|| "this".to_string());
    let type_name = params.get("type").map(Value::print).unwrap_or_default();
    let value = params.get("value").cloned().unwrap_or_default();
    let original = params.get("originalValue").cloned().unwrap_or_default();

    let cast_note = if original.print() != value.print() {
        format!(" (cast from the value `{}`).", original.print())
    } else {
        ".".to_string()
    };
    ErrorMessage::Text(format!(
        "{} must be a `{}` type, but the final value was: `{}`{}",
        path,
        type_name,
        value.print(),
        cast_note
    ))
}
