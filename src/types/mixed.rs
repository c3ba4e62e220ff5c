//! Schemas that accept any value, and custom types

use crate::schema::{Kind, Schema};
use crate::value::Value;
use std::sync::Arc;

typed_schema!(
    /// Accepts any value; custom types are mixed schemas with their own check
    MixedSchema
);

pub fn mixed() -> MixedSchema {
    MixedSchema(Schema::new(Kind::Mixed))
}

/// A custom type named `name` whose values satisfy `check`
pub fn mixed_of<F>(name: impl Into<String>, check: F) -> MixedSchema
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    MixedSchema(Schema::new(Kind::Custom {
        name: name.into(),
        check: Arc::new(check),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SchemaType;

    #[test]
    fn test_mixed_accepts_anything() {
        let schema = mixed();
        assert!(schema.is_valid_sync(Value::from("x")).unwrap());
        assert!(schema.is_valid_sync(Value::Number(1.0)).unwrap());
        assert!(schema.is_valid_sync(Value::Undefined).unwrap());
        assert!(!schema.is_valid_sync(Value::Null).unwrap());
    }

    #[test]
    fn test_custom_type_check() {
        let even = mixed_of("even", |v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0));
        assert_eq!(even.as_schema().type_name(), "even");
        assert!(even.is_valid_sync(Value::Number(4.0)).unwrap());
        assert!(!even.is_valid_sync(Value::Number(3.0)).unwrap());
        assert!(even.cast(Value::Number(3.0)).is_err());
    }
}
