//! Integration tests for schema casting and validation

use contour::prelude::*;
use contour::{shape, NumberSchema, SchemaError, StringSchema};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn collect_all() -> ValidateOptions {
    ValidateOptions {
        abort_early: Some(false),
        ..Default::default()
    }
}

#[test]
fn test_configuration_does_not_touch_the_original() {
    let a = string();
    let b = a.clone().required();
    assert!(a.is_valid_sync(Value::Undefined).unwrap());
    assert!(!b.is_valid_sync(Value::Undefined).unwrap());

    let c = b.clone().min(3);
    assert!(b.is_valid_sync("ab").unwrap());
    assert!(!c.is_valid_sync("ab").unwrap());
}

#[test]
fn test_exclusive_tests_keep_only_the_latest() {
    let schema = string()
        .test(Test::new("max", |v: &Value, _| v.as_str().map_or(true, |s| s.len() <= 10)).exclusive())
        .test(Test::new("max", |v: &Value, _| v.as_str().map_or(true, |s| s.len() <= 2)).exclusive());
    assert_eq!(schema.as_schema().tests().len(), 1);
    assert!(!schema.is_valid_sync("abc").unwrap());
}

#[test]
fn test_nested_error_paths() {
    let schema = object()
        .shape(shape! {
            "a" => object().shape(shape! { "b" => number().required() }).unwrap(),
        })
        .unwrap();
    let err = schema
        .validate_sync_with(v(json!({"a": {}})), collect_all())
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert!(err.paths().contains(&"a.b"));
}

#[test]
fn test_default_values_are_independent() {
    let schema = object()
        .shape(shape! { "x" => array().default(Value::Array(vec![])) })
        .unwrap();
    let mut first = schema.get_default();
    let second = schema.get_default();
    assert_eq!(first, second);

    if let Some(Value::Array(items)) = first.as_object_mut().and_then(|m| m.get_mut("x")) {
        items.push(Value::Number(1.0));
    }
    assert_eq!(second, v(json!({"x": []})));
    assert_eq!(schema.get_default(), v(json!({"x": []})));
}

#[test]
fn test_references_resolve_regardless_of_declaration_order() {
    let schema = object()
        .shape(shape! {
            "baz" => reference("foo.bar"),
            "foo" => object().shape(shape! { "bar" => string() }).unwrap(),
        })
        .unwrap();
    assert_eq!(
        schema.cast(v(json!({"foo": {"bar": "boom"}}))).unwrap(),
        v(json!({"baz": "boom", "foo": {"bar": "boom"}}))
    );
}

#[test]
fn test_chained_conditions_both_apply() {
    let schema = object()
        .shape(shape! {
            "bounded_below" => boolean(),
            "bounded_above" => boolean(),
            "n" => number()
                .when(["bounded_below"], When::is(true).then(|s: NumberSchema| s.min(5)))
                .when(["bounded_above"], When::is(true).then(|s: NumberSchema| s.max(10))),
        })
        .unwrap();
    let flags = |n: i32| v(json!({"bounded_below": true, "bounded_above": true, "n": n}));

    assert!(schema.is_valid_sync(flags(7)).unwrap());
    assert!(!schema.is_valid_sync(flags(3)).unwrap());
    assert!(!schema.is_valid_sync(flags(12)).unwrap());
    assert!(schema
        .is_valid_sync(v(json!({"bounded_below": false, "bounded_above": false, "n": 12})))
        .unwrap());
}

#[test]
fn test_condition_otherwise_branch() {
    let schema = object()
        .shape(shape! {
            "is_big" => boolean(),
            "count" => number().when(
                ["is_big"],
                When::is(true)
                    .then(|s: NumberSchema| s.min(5))
                    .otherwise(|s: NumberSchema| s.min(0)),
            ),
        })
        .unwrap();
    assert!(!schema.is_valid_sync(v(json!({"is_big": true, "count": 2}))).unwrap());
    assert!(schema.is_valid_sync(v(json!({"is_big": false, "count": 2}))).unwrap());
    assert!(!schema.is_valid_sync(v(json!({"is_big": false, "count": -1}))).unwrap());
}

#[test]
fn test_number_min_message() {
    let schema = number().min(18);
    let err = schema
        .validate_sync(Value::Number(11.0))
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert_eq!(err.message(), "this must be greater than or equal to 18");
    assert_eq!(err.params.get("min"), Some(&Value::Number(18.0)));
    assert_eq!(schema.validate_sync(Value::Number(25.0)).unwrap(), Value::Number(25.0));
}

#[test]
fn test_array_of_numbers() {
    let schema = array().of(number().min(2));
    assert_eq!(schema.cast(v(json!(["2", "3"]))).unwrap(), v(json!([2, 3])));
    let err = schema
        .validate_sync_with(v(json!([1, -24])), collect_all())
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert_eq!(err.inner.len(), 2);
    assert_eq!(err.paths(), vec!["[0]", "[1]"]);
}

#[test]
fn test_array_ensure() {
    let schema = array().ensure();
    assert_eq!(schema.cast(Value::Null).unwrap(), v(json!([])));
    assert_eq!(schema.cast(Value::Number(1.0)).unwrap(), v(json!([1])));
}

#[test]
fn test_labels_replace_paths_in_messages() {
    let schema = object()
        .shape(shape! { "email" => string().email().label("Email address") })
        .unwrap();
    let err = schema.validate_sync(v(json!({"email": "nope"}))).unwrap_err();
    assert_eq!(err.to_string(), "Email address must be a valid email");
}

#[test]
fn test_context_references() {
    let schema = number().max(reference("$limit"));
    let options = |limit: i32| ValidateOptions {
        context: v(json!({ "limit": limit })),
        ..Default::default()
    };
    assert!(schema.is_valid_sync_with(Value::Number(5.0), options(10)).unwrap());
    assert!(!schema.is_valid_sync_with(Value::Number(15.0), options(10)).unwrap());
}

#[test]
fn test_strip_unknown_during_validation() {
    let schema = object().shape(shape! { "a" => string() }).unwrap();
    let options = ValidateOptions {
        strip_unknown: true,
        ..Default::default()
    };
    assert_eq!(
        schema.validate_sync_with(v(json!({"a": "x", "b": 1})), options).unwrap(),
        v(json!({"a": "x"}))
    );
}

#[test]
fn test_lazy_recursive_tree() {
    fn node() -> Schema {
        object()
            .shape(shape! {
                "name" => string().required(),
                "children" => array().of(lazy(|_: &Value, _: &contour::schema::ResolveContext<'_>| node())),
            })
            .unwrap()
            .into()
    }
    let tree = node();
    let good = v(json!({"name": "root", "children": [{"name": "leaf", "children": []}]}));
    let bad = v(json!({"name": "root", "children": [{"children": []}]}));
    assert!(tree.is_valid_sync(good).unwrap());
    let err = tree
        .validate_sync_with(bad, collect_all())
        .unwrap_err()
        .into_validation()
        .unwrap();
    assert_eq!(err.paths(), vec!["children[0].name"]);
}

#[test]
fn test_with_mutation_batches_builders() {
    let base = string();
    let configured = base.clone().with_mutation(|s| s.min(2).max(4).trim());
    assert!(base.is_valid_sync("x").unwrap());
    assert!(!configured.is_valid_sync("x").unwrap());
    assert_eq!(configured.validate_sync(" abc ").unwrap(), Value::from("abc"));
}

#[test]
fn test_concat() {
    let merged = string().min(2).concat(string().max(4).label("code")).unwrap();
    assert!(!merged.is_valid_sync("a").unwrap());
    assert!(!merged.is_valid_sync("abcde").unwrap());
    assert_eq!(merged.as_schema().label_text(), Some("code"));

    let err = string().concat(number()).unwrap_err();
    assert!(matches!(err, SchemaError::IncompatibleConcat { .. }));
}

#[test]
fn test_reach_returns_nested_schema() {
    let schema = object()
        .shape(shape! {
            "tags" => array().of(string().max(3)),
        })
        .unwrap();
    let inner = schema.as_schema().reach("tags[0]").unwrap();
    assert_eq!(inner.type_name(), "string");
    assert!(!StringSchema::from_schema(inner).is_valid_sync("long").unwrap());
}

#[test]
fn test_nullable_and_not_required() {
    assert!(!string().is_valid_sync(Value::Null).unwrap());
    assert!(string().nullable().is_valid_sync(Value::Null).unwrap());
    assert!(!string().required().is_valid_sync("").unwrap());
    assert!(string().required().not_required().is_valid_sync("").unwrap());
    assert!(string().required().not_required().is_valid_sync(Value::Null).unwrap());
}

#[test]
fn test_cast_error_in_asserting_mode() {
    let err = number().cast("abc").unwrap_err();
    assert!(err.message.contains("\"number\""));
    let lenient = CastOptions {
        assert: false,
        ..Default::default()
    };
    assert!(number().cast_with("abc", &lenient).unwrap().as_f64().unwrap().is_nan());
}

fn scalar() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        any::<i32>().prop_map(serde_json::Value::from),
        "[0-9]{1,4}".prop_map(serde_json::Value::from),
        "[a-z ]{0,6}".prop_map(serde_json::Value::from),
        any::<bool>().prop_map(serde_json::Value::from),
        Just(serde_json::Value::Null),
    ]
}

proptest! {
    #[test]
    fn prop_cast_is_idempotent(a in scalar(), b in scalar(), c in scalar()) {
        let schema = object()
            .shape(shape! {
                "a" => string().nullable().trim(),
                "b" => number().nullable(),
                "c" => boolean().nullable(),
            })
            .unwrap();
        let input = v(json!({"a": a, "b": b, "c": c}));
        if let Ok(once) = schema.cast(input) {
            let twice = schema.cast(once.clone()).unwrap();
            prop_assert_eq!(twice, once);
        }
    }
}
