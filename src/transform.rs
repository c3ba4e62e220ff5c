//! Value-rewriting steps of the cast pipeline
//!
//! Transforms run in declaration order and must accept any input, since
//! earlier steps give no guarantee about the value's type. The built-in
//! coercions below leave values they cannot handle untouched so the type
//! check after the pipeline decides whether the cast succeeded.

use crate::schema::Schema;
use crate::value::{Map, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::sync::Arc;

pub type TransformFn = Arc<dyn Fn(Value, &Value, &Schema) -> Value + Send + Sync>;

/// One step of the pipeline: `(current, original, schema) -> next`
#[derive(Clone)]
pub struct Transform {
    name: &'static str,
    f: TransformFn,
}

impl Transform {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value, &Value, &Schema) -> Value + Send + Sync + 'static,
    {
        Self::named("custom", f)
    }

    pub(crate) fn named<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(Value, &Value, &Schema) -> Value + Send + Sync + 'static,
    {
        Self { name, f: Arc::new(f) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, value: Value, original: &Value, schema: &Schema) -> Value {
        (self.f)(value, original, schema)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform({})", self.name)
    }
}

/// Thread `value` through every transform in order
pub fn run_pipeline(transforms: &[Transform], value: Value, original: &Value, schema: &Schema) -> Value {
    transforms
        .iter()
        .fold(value, |current, t| t.apply(current, original, schema))
}

// =============================================================================
// TYPE COERCIONS
// =============================================================================

pub(crate) fn coerce_string(value: Value) -> Value {
    match value {
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(_) | Value::Date(Some(_)) => Value::String(value.print()),
        other => other,
    }
}

pub(crate) fn coerce_number(value: Value) -> Value {
    match value {
        Value::Number(_) | Value::Undefined | Value::Null => value,
        Value::String(s) => {
            let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            if compact.is_empty() {
                Value::Number(f64::NAN)
            } else {
                Value::Number(parse_number(&compact))
            }
        }
        Value::Date(Some(d)) => Value::Number(d.timestamp_millis() as f64),
        _ => Value::Number(f64::NAN),
    }
}

fn parse_number(s: &str) -> f64 {
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).map(|n| n as f64).unwrap_or(f64::NAN);
    }
    // reject the spellings f64::from_str accepts but plain numerals do not
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

pub(crate) fn coerce_boolean(value: Value) -> Value {
    let text = match &value {
        Value::String(s) => s.trim().to_ascii_lowercase(),
        Value::Number(n) if *n == 1.0 || *n == 0.0 => value.print(),
        _ => return value,
    };
    match text.as_str() {
        "true" | "1" => Value::Bool(true),
        "false" | "0" => Value::Bool(false),
        _ => value,
    }
}

pub(crate) fn coerce_date(value: Value) -> Value {
    match value {
        Value::Date(_) | Value::Undefined | Value::Null => value,
        Value::String(s) => Value::Date(parse_date(s.trim())),
        Value::Number(n) if n.is_finite() => {
            Value::Date(Utc.timestamp_millis_opt(n as i64).single())
        }
        _ => Value::Date(None),
    }
}

/// Parse RFC 3339 timestamps, naive ISO date-times (taken as UTC) and dates
pub(crate) fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a JSON string into a container value, leaving other input alone
pub(crate) fn parse_json(value: Value) -> Value {
    match &value {
        Value::String(s) => match serde_json::from_str::<serde_json::Value>(s) {
            Ok(json @ (serde_json::Value::Array(_) | serde_json::Value::Object(_))) => Value::from(json),
            _ => value,
        },
        _ => value,
    }
}

// =============================================================================
// KEY TRANSFORMS
// =============================================================================

/// Rewrite every key of an object value
pub(crate) fn map_keys(value: Value, f: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (f(&k), v)).collect::<Map>()),
        other => other,
    }
}

fn split_words(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = key.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        let boundary = c.is_uppercase()
            && !current.is_empty()
            && (chars[i - 1].is_lowercase()
                || chars[i - 1].is_ascii_digit()
                || chars.get(i + 1).is_some_and(|n| n.is_lowercase()));
        if boundary {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

pub(crate) fn camel_case(key: &str) -> String {
    split_words(key)
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let lower = w.to_lowercase();
            if i == 0 {
                lower
            } else {
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect()
}

pub(crate) fn snake_case(key: &str) -> String {
    split_words(key)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

pub(crate) fn constant_case(key: &str) -> String {
    snake_case(key).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number_from_strings() {
        assert_eq!(coerce_number(Value::from(" 42 ")), Value::Number(42.0));
        assert_eq!(coerce_number(Value::from("1e3")), Value::Number(1000.0));
        assert!(coerce_number(Value::from("abc")).as_f64().unwrap().is_nan());
        assert!(coerce_number(Value::from("")).as_f64().unwrap().is_nan());
        assert!(coerce_number(Value::from("inf")).as_f64().unwrap().is_nan());
        assert_eq!(coerce_number(Value::Null), Value::Null);
        assert_eq!(coerce_number(Value::Undefined), Value::Undefined);
    }

    #[test]
    fn test_coerce_boolean() {
        assert_eq!(coerce_boolean(Value::from("TRUE")), Value::Bool(true));
        assert_eq!(coerce_boolean(Value::from("0")), Value::Bool(false));
        assert_eq!(coerce_boolean(Value::Number(1.0)), Value::Bool(true));
        assert_eq!(coerce_boolean(Value::from("yes")), Value::from("yes"));
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(coerce_string(Value::Number(5.0)), Value::from("5"));
        assert_eq!(coerce_string(Value::Bool(false)), Value::from("false"));
        assert_eq!(coerce_string(Value::Null), Value::Null);
    }

    #[test]
    fn test_parse_dates() {
        let d = parse_date("2024-02-29").unwrap();
        assert_eq!(d.to_rfc3339(), "2024-02-29T00:00:00+00:00");
        assert!(parse_date("2024-02-29T10:00:00+02:00").is_some());
        assert!(parse_date("not a date").is_none());
        assert_eq!(coerce_date(Value::from("nope")), Value::Date(None));
    }

    #[test]
    fn test_key_cases() {
        assert_eq!(camel_case("first_name"), "firstName");
        assert_eq!(camel_case("HTTPServer"), "httpServer");
        assert_eq!(snake_case("firstName"), "first_name");
        assert_eq!(constant_case("first-name"), "FIRST_NAME");
    }
}
