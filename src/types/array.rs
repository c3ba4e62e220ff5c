//! Array schemas

use super::{compare_numbers, limit_test, SchemaType};
use crate::locale::Message;
use crate::node::Node;
use crate::schema::{Kind, Schema};
use crate::test_registry::Param;
use crate::transform::{parse_json, Transform};
use crate::value::Value;
use std::sync::Arc;

typed_schema!(
    /// Arrays, optionally with an element schema
    ArraySchema
);

pub fn array() -> ArraySchema {
    ArraySchema(Schema::new(Kind::Array { inner: None }))
}

fn item_count(value: &Value) -> Option<f64> {
    value.as_array().map(|a| a.len() as f64)
}

impl ArraySchema {
    /// Cast and validate every element with `inner`
    pub fn of(self, inner: impl Into<Node>) -> Self {
        let inner = Box::new(inner.into());
        self.map_schema(|s| s.update(|r| r.kind = Kind::Array { inner: Some(inner) }))
    }

    fn count_rule(
        self,
        name: &'static str,
        limit: Param,
        message: Option<Message>,
        cmp: fn(f64, f64) -> bool,
    ) -> Self {
        self.test(limit_test(name, name, limit, message, move |v, l| {
            compare_numbers(item_count(v), l, cmp)
        }))
    }

    pub fn min(self, min: impl Into<Param>) -> Self {
        self.count_rule("min", min.into(), None, |n, l| n >= l)
    }

    pub fn min_with(self, min: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.count_rule("min", min.into(), Some(message.into()), |n, l| n >= l)
    }

    pub fn max(self, max: impl Into<Param>) -> Self {
        self.count_rule("max", max.into(), None, |n, l| n <= l)
    }

    pub fn max_with(self, max: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.count_rule("max", max.into(), Some(message.into()), |n, l| n <= l)
    }

    pub fn length(self, length: impl Into<Param>) -> Self {
        self.count_rule("length", length.into(), None, |n, l| n == l)
    }

    pub fn length_with(self, length: impl Into<Param>, message: impl Into<Message>) -> Self {
        self.count_rule("length", length.into(), Some(message.into()), |n, l| n == l)
    }

    /// Always produce an array: absent input becomes `[]`, a single
    /// non-array value becomes a one-element array
    pub fn ensure(self) -> Self {
        self.default_with(|| Value::Array(Vec::new())).map_schema(|s| {
            s.add_transform(Transform::named("ensure", |v, original, _| match v {
                Value::Array(_) => v,
                _ if original.is_absent() => Value::Array(Vec::new()),
                _ => Value::Array(vec![original.clone()]),
            }))
        })
    }

    /// Remove falsy elements
    pub fn compact(self) -> Self {
        self.compact_by(|v| !v.is_truthy())
    }

    /// Remove elements for which `reject` returns true
    pub fn compact_by<F>(self, reject: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let reject = Arc::new(reject);
        self.map_schema(|s| {
            s.add_transform(Transform::named("compact", move |v, _, _| match v {
                Value::Array(items) => Value::Array(items.into_iter().filter(|item| !reject(item)).collect()),
                other => other,
            }))
        })
    }

    /// Parse JSON strings into arrays before casting
    pub fn json(self) -> Self {
        self.map_schema(|s| s.add_transform(Transform::named("json", |v, _, _| parse_json(v))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ValidateOptions;
    use crate::types::number;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_of_casts_elements() {
        let schema = array().of(number().min(2));
        assert_eq!(
            schema.cast(Value::from(json!(["2", "3"]))).unwrap(),
            Value::from(json!([2, 3]))
        );
    }

    #[test]
    fn test_element_errors_carry_index_paths() {
        let schema = array().of(number().min(2));
        let options = ValidateOptions {
            abort_early: Some(false),
            ..Default::default()
        };
        let err = schema
            .validate_sync_with(Value::from(json!([1, -24])), options)
            .unwrap_err()
            .into_validation()
            .unwrap();
        assert_eq!(err.paths(), vec!["[0]", "[1]"]);
    }

    #[test]
    fn test_ensure() {
        let schema = array().ensure();
        assert_eq!(schema.cast(Value::Null).unwrap(), Value::Array(vec![]));
        assert_eq!(schema.cast(Value::Number(1.0)).unwrap(), Value::from(json!([1])));
        assert_eq!(schema.cast(Value::Undefined).unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn test_count_rules() {
        let schema = array().min(1).max(2);
        assert!(!schema.is_valid_sync(Value::from(json!([]))).unwrap());
        assert!(schema.is_valid_sync(Value::from(json!([1, 2]))).unwrap());
        assert!(!schema.is_valid_sync(Value::from(json!([1, 2, 3]))).unwrap());
    }

    #[test]
    fn test_compact_and_json() {
        let schema = array().json().compact();
        assert_eq!(
            schema.cast(Value::from("[0, 1, \"\", \"a\", null]")).unwrap(),
            Value::from(json!([1, "a"]))
        );
    }
}
