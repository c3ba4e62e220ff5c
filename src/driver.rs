//! Validation driver
//!
//! One run walks the tree once per node: resolve conditions, cast (unless
//! strict), check the built-in presence and allowed-value rules, fan out to
//! child nodes and this node's own tests, then fold the failures back up.
//!
//! Failures below the root are values, not errors, until they reach the
//! root. Only abort-early turns the first failure into an immediate halt.

use crate::error::{Error, ValidationError};
use crate::locale::{self, Message, Params};
use crate::node::Node;
use crate::path::{child_index, child_key};
use crate::schema::{CastScope, Kind, ResolveContext, Schema};
use crate::test_registry::{Test, TestContext, TestFn, TestResult};
use crate::value::Value;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{trace, warn};

/// Per-call validation options
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Skip casting at the root; `None` uses the schema's own flag
    pub strict: Option<bool>,
    /// Stop at the first failure; `None` uses the schema's flag, then `true`
    pub abort_early: Option<bool>,
    /// Drop object keys that have no field while casting
    pub strip_unknown: bool,
    /// Validate children; `None` uses the schema's flag, then `true`
    pub recursive: Option<bool>,
    /// External values visible to `$` references
    pub context: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Sync,
    Async,
}

/// Why a subtree stopped early
enum Halt {
    /// First failure under abort-early
    Abort(ValidationError),
    /// Not a validation failure at all
    Fatal(Error),
}

struct Run {
    options: ValidateOptions,
    mode: Mode,
    context: Arc<Value>,
}

/// Where a node sits in the tree
struct Frame {
    path: String,
    parent: Arc<Value>,
    original: Value,
    strict: Option<bool>,
}

struct NodeOutcome {
    value: Value,
    errors: Vec<ValidationError>,
}

type Job = BoxFuture<'static, Result<Vec<ValidationError>, Halt>>;

pub(crate) fn validate(schema: &Schema, value: Value, options: ValidateOptions) -> BoxFuture<'static, Result<Value, Error>> {
    let frame = root_frame(&value, &options);
    run_root(schema.clone(), value, frame, options, Mode::Async)
}

pub(crate) fn validate_sync(schema: &Schema, value: Value, options: ValidateOptions) -> Result<Value, Error> {
    let frame = root_frame(&value, &options);
    block_sync(run_root(schema.clone(), value, frame, options, Mode::Sync))
}

pub(crate) fn validate_at(
    schema: &Schema,
    path: &str,
    value: Value,
    options: ValidateOptions,
) -> BoxFuture<'static, Result<Value, Error>> {
    match schema.locate(path, &value, &options.context) {
        Ok(located) => {
            let frame = Frame {
                path: located.path,
                parent: Arc::new(located.parent),
                original: located.value.clone(),
                strict: options.strict,
            };
            run_root(located.schema, located.value, frame, options, Mode::Async)
        }
        Err(e) => futures::future::ready(Err(Error::Schema(e))).boxed(),
    }
}

pub(crate) fn validate_sync_at(schema: &Schema, path: &str, value: Value, options: ValidateOptions) -> Result<Value, Error> {
    let located = schema.locate(path, &value, &options.context)?;
    let frame = Frame {
        path: located.path,
        parent: Arc::new(located.parent),
        original: located.value.clone(),
        strict: options.strict,
    };
    block_sync(run_root(located.schema, located.value, frame, options, Mode::Sync))
}

pub(crate) fn is_valid(schema: &Schema, value: Value, options: ValidateOptions) -> BoxFuture<'static, Result<bool, Error>> {
    validate(schema, value, options).map(validity).boxed()
}

pub(crate) fn is_valid_sync(schema: &Schema, value: Value, options: ValidateOptions) -> Result<bool, Error> {
    validity(validate_sync(schema, value, options))
}

fn validity(result: Result<Value, Error>) -> Result<bool, Error> {
    match result {
        Ok(_) => Ok(true),
        Err(Error::Validation(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

fn root_frame(value: &Value, options: &ValidateOptions) -> Frame {
    Frame {
        path: String::new(),
        parent: Arc::new(Value::Undefined),
        original: value.clone(),
        strict: options.strict,
    }
}

/// Drive a sync-mode run to completion; it never suspends
fn block_sync(fut: BoxFuture<'static, Result<Value, Error>>) -> Result<Value, Error> {
    fut.now_or_never().unwrap_or_else(|| {
        Err(Error::AsyncInSync {
            path: String::new(),
            test: "<unknown>".to_string(),
        })
    })
}

fn run_root(
    schema: Schema,
    value: Value,
    frame: Frame,
    options: ValidateOptions,
    mode: Mode,
) -> BoxFuture<'static, Result<Value, Error>> {
    let run = Arc::new(Run {
        context: Arc::new(options.context.clone()),
        options,
        mode,
    });
    async move {
        let path = frame.path.clone();
        match validate_node(run, schema, value, frame).await {
            Ok(outcome) if outcome.errors.is_empty() => Ok(outcome.value),
            Ok(outcome) => Err(Error::Validation(ValidationError::aggregate(
                outcome.errors,
                outcome.value,
                path,
            ))),
            Err(Halt::Abort(e)) => Err(Error::Validation(e)),
            Err(Halt::Fatal(e)) => Err(e),
        }
    }
    .boxed()
}

fn validate_node(run: Arc<Run>, schema: Schema, value: Value, frame: Frame) -> BoxFuture<'static, Result<NodeOutcome, Halt>> {
    async move {
        let resolved = schema.resolve(&ResolveContext {
            value: &value,
            parent: &frame.parent,
            context: &run.context,
            path: &frame.path,
        });

        let strict = frame.strict.unwrap_or_else(|| resolved.is_strict());
        let value = if strict {
            value
        } else {
            let scope = CastScope {
                context: &run.context,
                path: frame.path.clone(),
                strip_unknown: run.options.strip_unknown,
                assert: false,
                validating: true,
            };
            resolved
                .cast_resolved(value, &scope)
                .map_err(|e| Halt::Fatal(Error::Cast(e)))?
        };

        trace!(path = %frame.path, schema = resolved.type_name(), strict, "validating node");

        let flags = resolved.flags();
        let abort_early = run.options.abort_early.or(flags.abort_early).unwrap_or(true);
        let recursive = run.options.recursive.or(flags.recursive).unwrap_or(true);

        if let Some(err) = internal_failure(&run, &resolved, &value, &frame) {
            if abort_early {
                return Err(Halt::Abort(err));
            }
            return Ok(NodeOutcome {
                value,
                errors: vec![err],
            });
        }

        let mut jobs: Vec<Job> = Vec::new();
        if recursive {
            child_jobs(&run, &resolved, &value, &frame, abort_early, &mut jobs);
        }
        for test in resolved.tests().iter() {
            jobs.push(test_job(&run, &resolved, test.clone(), &value, &frame, abort_early));
        }

        let errors = run_jobs(run.mode, jobs).await?;
        Ok(NodeOutcome { value, errors })
    }
    .boxed()
}

async fn run_jobs(mode: Mode, jobs: Vec<Job>) -> Result<Vec<ValidationError>, Halt> {
    match mode {
        Mode::Sync => {
            let mut errors = Vec::new();
            for job in jobs {
                errors.extend(job.await?);
            }
            Ok(errors)
        }
        Mode::Async => Ok(try_join_all(jobs).await?.into_iter().flatten().collect()),
    }
}

/// Under abort-early the first failure halts the parent too
fn settle(mut errors: Vec<ValidationError>, abort_early: bool) -> Result<Vec<ValidationError>, Halt> {
    if abort_early && !errors.is_empty() {
        return Err(Halt::Abort(errors.swap_remove(0)));
    }
    Ok(errors)
}

fn child_jobs(run: &Arc<Run>, schema: &Schema, value: &Value, frame: &Frame, abort_early: bool, jobs: &mut Vec<Job>) {
    let parent = Arc::new(value.clone());
    let mut push = |node: &Node, child: Value, original: Value, path: String| {
        let resolve = |value: &Value| {
            node.resolve(&ResolveContext {
                value,
                parent: &parent,
                context: &run.context,
                path: &path,
            })
        };
        let Some(mut child_schema) = resolve(&child) else {
            return;
        };
        let mut child = child;
        let mut strict = Some(true);
        if child_schema.is_stripped() {
            // stripped keys are gone from the cast value; check the input instead
            child = original.clone();
            strict = run.options.strict;
            match resolve(&child) {
                Some(schema) => child_schema = schema,
                None => return,
            }
        }
        let child_frame = Frame {
            path,
            parent: Arc::clone(&parent),
            original,
            strict,
        };
        let run = Arc::clone(run);
        jobs.push(
            async move {
                let errors = match validate_node(run, child_schema, child, child_frame).await {
                    Ok(outcome) => outcome.errors,
                    Err(Halt::Abort(e)) => vec![e],
                    Err(fatal) => return Err(fatal),
                };
                settle(errors, abort_early)
            }
            .boxed(),
        );
    };

    match (schema.kind(), value) {
        (Kind::Object(shape), Value::Object(map)) => {
            for (key, node) in shape.fields() {
                let child = map.get(key).cloned().unwrap_or_default();
                let original = frame.original.get(key).cloned().unwrap_or_default();
                push(node, child, original, child_key(&frame.path, key));
            }
        }
        (Kind::Array { inner: Some(node) }, Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                let original = original_item(&frame.original, i);
                push(node, item.clone(), original, child_index(&frame.path, i));
            }
        }
        (Kind::Tuple { types }, Value::Array(items)) => {
            for (i, node) in types.iter().enumerate() {
                let item = items.get(i).cloned().unwrap_or_default();
                let original = original_item(&frame.original, i);
                push(node, item, original, child_index(&frame.path, i));
            }
        }
        _ => {}
    }
}

fn original_item(original: &Value, index: usize) -> Value {
    original
        .as_array()
        .and_then(|a| a.get(index))
        .cloned()
        .unwrap_or_default()
}

fn test_context(run: &Run, schema: &Schema, value: &Value, frame: &Frame, name: Option<&str>, message: Option<Message>, params: Params) -> TestContext {
    TestContext {
        path: frame.path.clone(),
        value: value.clone(),
        original_value: frame.original.clone(),
        schema: schema.clone(),
        params,
        parent: Arc::clone(&frame.parent),
        context: Arc::clone(&run.context),
        test_name: name.map(str::to_string),
        message,
    }
}

fn test_job(run: &Arc<Run>, schema: &Schema, test: Test, value: &Value, frame: &Frame, abort_early: bool) -> Job {
    if test.skips_absent() && value.is_absent() {
        return futures::future::ready(Ok(Vec::new())).boxed();
    }
    let params: Params = test
        .params()
        .iter()
        .map(|(k, p)| (k.clone(), p.resolve(value, &frame.parent, &run.context)))
        .collect();
    let ctx = test_context(run, schema, value, frame, test.name(), test.custom_message().cloned(), params);
    let mode = run.mode;
    let value = value.clone();

    async move {
        let result = match test.run_fn() {
            TestFn::Sync(f) => f(&value, &ctx),
            TestFn::Async(_) if mode == Mode::Sync => {
                let name = test.name().unwrap_or("<anonymous>").to_string();
                warn!(path = %ctx.path, test = %name, "asynchronous test reached during validate_sync");
                return Err(Halt::Fatal(Error::AsyncInSync {
                    path: ctx.path.clone(),
                    test: name,
                }));
            }
            TestFn::Async(f) => f(value, ctx.clone()).await,
        };
        let errors = match result {
            TestResult::Pass => Vec::new(),
            TestResult::Fail => vec![ctx.create_error()],
            TestResult::Invalid(e) => vec![e],
        };
        settle(errors, abort_early)
    }
    .boxed()
}

/// The first failing built-in rule: type, null, undefined, allowed values
fn internal_failure(run: &Run, schema: &Schema, value: &Value, frame: &Frame) -> Option<ValidationError> {
    let record = schema.record();
    let fail = |name: &str, message: Option<Message>, params: Params| {
        test_context(run, schema, value, frame, Some(name), message, params).create_error()
    };

    if !value.is_absent() && !schema.is_type(value) {
        let mut params = Params::new();
        params.insert("type".to_string(), Value::from(schema.type_name()));
        let rule = match (schema.kind(), value) {
            (Kind::Tuple { types }, Value::Array(_)) => {
                params.insert("length".to_string(), Value::from(types.len()));
                "length"
            }
            _ => "typeError",
        };
        let message = record
            .type_error
            .clone()
            .unwrap_or_else(|| locale::message_for(schema.type_name(), rule));
        return Some(fail("typeError", Some(message), params));
    }
    if value.is_null() && !schema.is_nullable() {
        let rule = &record.null_rule;
        return Some(fail(rule.name, rule.message.clone(), Params::new()));
    }
    if value.is_undefined() && !schema.is_optional() {
        let rule = &record.undefined_rule;
        return Some(fail(rule.name, rule.message.clone(), Params::new()));
    }

    // absent values allowed above are never compared against value sets
    let skip_allowed = value.is_undefined() || (value.is_null() && schema.is_nullable());
    if !record.one_of.is_empty() && !skip_allowed {
        let allowed: Vec<Value> = record
            .one_of
            .iter()
            .map(|p| p.resolve(value, &frame.parent, &run.context))
            .collect();
        if !allowed.contains(value) {
            return Some(fail("oneOf", record.one_of_message.clone(), printed_values(&allowed)));
        }
    }
    if !record.not_one_of.is_empty() && !skip_allowed {
        let denied: Vec<Value> = record
            .not_one_of
            .iter()
            .map(|p| p.resolve(value, &frame.parent, &run.context))
            .collect();
        if denied.contains(value) {
            return Some(fail("notOneOf", record.not_one_of_message.clone(), printed_values(&denied)));
        }
    }
    None
}

fn printed_values(values: &[Value]) -> Params {
    let printed: Vec<String> = values.iter().map(Value::print).collect();
    let mut params = Params::new();
    params.insert("values".to_string(), Value::from(printed.join(", ")));
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::reference;
    use crate::types::{mixed, number, object, string, SchemaType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn collect_all() -> ValidateOptions {
        ValidateOptions {
            abort_early: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn test_nested_required_path() {
        let schema = object()
            .shape(crate::shape! {
                "a" => object().shape(crate::shape! { "b" => number().required() }).unwrap(),
            })
            .unwrap();
        let err = schema
            .validate_sync_with(Value::from(json!({"a": {}})), collect_all())
            .unwrap_err()
            .into_validation()
            .unwrap();
        assert_eq!(err.paths(), vec!["a.b"]);
        assert_eq!(err.message(), "a.b is a required field");
    }

    #[test]
    fn test_abort_early_returns_first_failure() {
        let schema = object()
            .shape(crate::shape! {
                "a" => string().required(),
                "b" => string().required(),
            })
            .unwrap();
        let err = schema
            .validate_sync(Value::from(json!({})))
            .unwrap_err()
            .into_validation()
            .unwrap();
        assert!(err.is_leaf());
        assert_eq!(err.path, "a");

        let all = schema
            .validate_sync_with(Value::from(json!({})), collect_all())
            .unwrap_err()
            .into_validation()
            .unwrap();
        assert_eq!(all.paths(), vec!["a", "b"]);
    }

    #[test]
    fn test_validate_returns_cast_value() {
        let schema = object().shape(crate::shape! { "n" => number() }).unwrap();
        assert_eq!(
            schema.validate_sync(Value::from(json!({"n": "5"}))).unwrap(),
            Value::from(json!({"n": 5}))
        );
    }

    #[test]
    fn test_strict_reports_type_error() {
        let err = number()
            .strict(true)
            .validate_sync(Value::from("5"))
            .unwrap_err();
        assert_eq!(err.as_validation().and_then(|e| e.kind.as_deref()), Some("typeError"));
    }

    #[test]
    fn test_one_of_and_not_one_of() {
        let schema = mixed().one_of(["a", "b"]);
        assert!(schema.is_valid_sync(Value::from("a")).unwrap());
        assert!(schema.is_valid_sync(Value::Undefined).unwrap());
        let err = schema.validate_sync(Value::from("c")).unwrap_err();
        assert_eq!(err.to_string(), "this must be one of the following values: a, b");

        let denied = mixed().not_one_of([1]);
        assert!(!denied.is_valid_sync(Value::Number(1.0)).unwrap());
    }

    #[test]
    fn test_one_of_with_sibling_reference() {
        let schema = object()
            .shape(crate::shape! {
                "password" => string(),
                "confirm" => string().one_of([reference("password")]),
            })
            .unwrap();
        assert!(schema
            .is_valid_sync(Value::from(json!({"password": "x", "confirm": "x"})))
            .unwrap());
        assert!(!schema
            .is_valid_sync(Value::from(json!({"password": "x", "confirm": "y"})))
            .unwrap());
    }

    #[test]
    fn test_recursive_false_skips_children() {
        let schema = object()
            .shape(crate::shape! { "n" => number().min(10) })
            .unwrap();
        let options = ValidateOptions {
            recursive: Some(false),
            ..Default::default()
        };
        assert!(schema.is_valid_sync_with(Value::from(json!({"n": 1})), options).unwrap());
    }

    #[test]
    fn test_validate_at_uses_sibling_context() {
        let schema = object()
            .shape(crate::shape! {
                "low" => number(),
                "high" => number().min(reference("low")),
            })
            .unwrap();
        let value = Value::from(json!({"low": 5, "high": 3}));
        let err = schema
            .validate_sync_at("high", value, ValidateOptions::default())
            .unwrap_err()
            .into_validation()
            .unwrap();
        assert_eq!(err.path, "high");
        assert!(matches!(
            schema.validate_sync_at("nope", Value::from(json!({})), ValidateOptions::default()),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_async_test_in_sync_mode_is_not_a_validation_error() {
        let schema = string().test(Test::new_async("remote", |_, _| async { true }));
        let err = schema.validate_sync(Value::from("x")).unwrap_err();
        assert!(matches!(err, Error::AsyncInSync { ref test, .. } if test == "remote"));
        assert!(schema.is_valid_sync(Value::from("x")).is_err());
    }

    #[test]
    fn test_not_one_of_skips_allowed_null() {
        let schema = string().nullable().not_one_of([Value::Null, Value::from("root")]);
        assert!(schema.is_valid_sync(Value::Null).unwrap());
        assert!(!schema.is_valid_sync("root").unwrap());
        assert!(!string().not_one_of([Value::Null]).is_valid_sync(Value::Null).unwrap());
    }

    #[test]
    fn test_stripped_fields_are_still_validated() {
        let schema = object()
            .shape(crate::shape! {
                "name" => string(),
                "token" => string().required().min(3).strip(),
            })
            .unwrap();

        let err = schema
            .validate_sync(Value::from(json!({"name": "a"})))
            .unwrap_err()
            .into_validation()
            .unwrap();
        assert_eq!(err.path, "token");
        assert_eq!(err.message(), "token is a required field");

        let err = schema
            .validate_sync(Value::from(json!({"name": "a", "token": "ab"})))
            .unwrap_err()
            .into_validation()
            .unwrap();
        assert_eq!(err.kind.as_deref(), Some("min"));

        assert_eq!(
            schema.validate_sync(Value::from(json!({"name": "a", "token": "abc"}))).unwrap(),
            Value::from(json!({"name": "a"}))
        );
    }
}
