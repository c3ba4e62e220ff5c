//! Process-wide registry of custom builder methods
//!
//! Methods are registered per schema type name and invoked by name through
//! [`SchemaType::call`](crate::SchemaType::call). A method registered on
//! `mixed` is available to every type.

use crate::schema::Schema;
use crate::value::Value;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// A registered method: takes the schema and the call arguments
pub type Method = Arc<dyn Fn(Schema, &[Value]) -> Schema + Send + Sync>;

lazy_static! {
    static ref METHODS: RwLock<HashMap<String, HashMap<String, Method>>> = RwLock::new(HashMap::new());
}

/// Register `f` as method `name` on schemas of `type_name`
///
/// ```
/// use contour::prelude::*;
///
/// contour::registry::add_method("string", "slug", |schema, _args| {
///     schema.test(Test::new("slug", |v: &Value, _| {
///         v.as_str().map_or(true, |s| s.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
///     }))
/// });
/// let slug = string().call("slug", &[]).unwrap();
/// assert!(!slug.is_valid_sync("Not A Slug").unwrap());
/// ```
pub fn add_method<F>(type_name: &str, name: &str, f: F)
where
    F: Fn(Schema, &[Value]) -> Schema + Send + Sync + 'static,
{
    let mut methods = METHODS.write().unwrap_or_else(PoisonError::into_inner);
    tracing::debug!(type_name, name, "registering schema method");
    methods
        .entry(type_name.to_string())
        .or_default()
        .insert(name.to_string(), Arc::new(f));
}

/// Find a method for `type_name`, falling back to methods on `mixed`
pub(crate) fn lookup(type_name: &str, name: &str) -> Option<Method> {
    let methods = METHODS.read().unwrap_or_else(PoisonError::into_inner);
    methods
        .get(type_name)
        .and_then(|m| m.get(name))
        .or_else(|| methods.get("mixed").and_then(|m| m.get(name)))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::types::{number, string, SchemaType};

    #[test]
    fn test_type_specific_and_mixed_methods() {
        add_method("number", "registry_test_percent", |schema, _| {
            schema.test(crate::test_registry::Test::new(
                "percent",
                |v: &Value, _| v.as_f64().map_or(true, |n| (0.0..=100.0).contains(&n)),
            ))
        });
        add_method("mixed", "registry_test_labelled", |schema, args| {
            let label = args.first().map(Value::print).unwrap_or_default();
            schema.label(label)
        });

        let percent = number().call("registry_test_percent", &[]).unwrap();
        assert!(!percent.is_valid_sync(Value::Number(120.0)).unwrap());

        let labelled = string()
            .call("registry_test_labelled", &[Value::from("Title")])
            .unwrap();
        assert_eq!(labelled.as_schema().label_text(), Some("Title"));
    }

    #[test]
    fn test_unknown_method() {
        let err = string().call("registry_test_missing", &[]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownMethod { .. }));
    }
}
