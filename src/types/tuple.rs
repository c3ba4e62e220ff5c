//! Fixed-arity tuple schemas

use crate::node::Node;
use crate::schema::{Kind, Schema};

typed_schema!(
    /// Arrays whose element `i` has its own schema
    TupleSchema
);

/// A tuple of `types`; only arrays of exactly `types.len()` items match
pub fn tuple<I, N>(types: I) -> TupleSchema
where
    I: IntoIterator<Item = N>,
    N: Into<Node>,
{
    let types: Vec<Node> = types.into_iter().map(Into::into).collect();
    TupleSchema(Schema::new(Kind::Tuple { types }))
}

impl TupleSchema {
    pub fn arity(&self) -> usize {
        match self.0.kind() {
            Kind::Tuple { types } => types.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CastOptions;
    use crate::types::{number, string, SchemaType};
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pair() -> TupleSchema {
        tuple([Node::from(string()), number().into()])
    }

    #[test]
    fn test_cast_uses_positional_types() {
        assert_eq!(pair().arity(), 2);
        assert_eq!(
            pair().cast(Value::from(json!([1, "2"]))).unwrap(),
            Value::from(json!(["1", 2]))
        );
    }

    #[test]
    fn test_cast_rejects_wrong_arity() {
        assert!(pair().cast(Value::from(json!(["a", 1, true]))).is_err());
        assert!(pair().cast(Value::from(json!(["a"]))).is_err());

        let lenient = CastOptions {
            assert: false,
            ..Default::default()
        };
        assert_eq!(
            pair().cast_with(Value::from(json!(["a", 1, true])), &lenient).unwrap(),
            Value::from(json!(["a", 1, true]))
        );
    }

    #[test]
    fn test_validation_checks_arity() {
        let schema = pair();
        assert!(schema.is_valid_sync(Value::from(json!(["a", "1"]))).unwrap());
        assert!(!schema.is_valid_sync(Value::from(json!(["a"]))).unwrap());
        assert!(!schema.is_valid_sync(Value::from(json!(["a", 1, true]))).unwrap());

        let err = schema
            .validate_sync(Value::from(json!(["a", 1, true])))
            .unwrap_err()
            .into_validation()
            .unwrap();
        assert_eq!(err.kind.as_deref(), Some("typeError"));
        assert_eq!(err.message(), "this tuple must have exactly 2 items");
    }

    #[test]
    fn test_strict_validation_checks_arity() {
        let schema = pair().strict(true);
        assert!(schema.is_valid_sync(Value::from(json!(["a", 1]))).unwrap());
        assert!(!schema.is_valid_sync(Value::from(json!(["a", 1, true]))).unwrap());
    }
}
