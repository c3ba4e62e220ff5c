//! Date schemas

use super::{limit_test, SchemaType};
use crate::locale::Message;
use crate::schema::{Kind, Schema};
use crate::test_registry::Param;
use crate::transform::parse_date;
use crate::value::Value;
use chrono::{DateTime, Utc};

typed_schema!(
    /// Instants in UTC; strings and epoch milliseconds are coerced
    DateSchema
);

pub fn date() -> DateSchema {
    DateSchema(Schema::new(Kind::Date))
}

/// Interpret a limit parameter as an instant
fn limit_instant(limit: &Value) -> Option<DateTime<Utc>> {
    match limit {
        Value::Date(d) => *d,
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) if n.is_finite() => DateTime::from_timestamp_millis(*n as i64),
        _ => None,
    }
}

fn compare_dates(value: &Value, limit: &Value, cmp: fn(&DateTime<Utc>, &DateTime<Utc>) -> bool) -> bool {
    match (value.as_date(), limit_instant(limit)) {
        (Some(v), Some(l)) => cmp(&v, &l),
        _ => true,
    }
}

impl DateSchema {
    /// On or after `min`; accepts dates, date strings or references
    pub fn min(self, min: impl Into<Param>) -> Self {
        self.min_rule(min.into(), None)
    }

    pub fn min_with(self, min: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.min_rule(min.into(), Some(message.into()))
    }

    fn min_rule(self, min: Param, message: Option<Message>) -> Self {
        self.test(limit_test("min", "min", min, message, |v, l| {
            compare_dates(v, l, |v, l| v >= l)
        }))
    }

    /// On or before `max`
    pub fn max(self, max: impl Into<Param>) -> Self {
        self.max_rule(max.into(), None)
    }

    pub fn max_with(self, max: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.max_rule(max.into(), Some(message.into()))
    }

    fn max_rule(self, max: Param, message: Option<Message>) -> Self {
        self.test(limit_test("max", "max", max, message, |v, l| {
            compare_dates(v, l, |v, l| v <= l)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_parses_iso_strings() {
        let out = date().cast(Value::from("2024-01-15")).unwrap();
        assert_eq!(out.print(), "2024-01-15T00:00:00.000Z");
        assert!(date().cast(Value::from("yesterday")).is_err());
    }

    #[test]
    fn test_non_asserting_cast_yields_invalid_date() {
        let options = crate::schema::CastOptions {
            assert: false,
            ..Default::default()
        };
        assert_eq!(date().cast_with(Value::from("nope"), &options).unwrap(), Value::Date(None));
    }

    #[test]
    fn test_min_and_max() {
        let schema = date().min("2024-01-01").max("2024-12-31");
        assert!(schema.is_valid_sync(Value::from("2024-06-01")).unwrap());
        assert!(!schema.is_valid_sync(Value::from("2023-06-01")).unwrap());
        assert!(!schema.is_valid_sync(Value::from("2025-06-01")).unwrap());
    }
}
