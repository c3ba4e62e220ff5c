//! Named assertions attached to a schema
//!
//! Tests are keyed by name. An exclusive test replaces every test of the
//! same name; a non-exclusive test evicts exclusive tests of its name and
//! then stacks with the others. Unnamed tests always stack.

use crate::error::ValidationError;
use crate::locale::{self, Message, Params};
use crate::reference::Reference;
use crate::schema::Schema;
use crate::value::Value;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Outcome of running one test
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Pass,
    /// Fail with the test's own message
    Fail,
    /// Fail with a specific error (possibly an aggregate of several)
    Invalid(ValidationError),
}

impl From<bool> for TestResult {
    fn from(ok: bool) -> Self {
        if ok {
            TestResult::Pass
        } else {
            TestResult::Fail
        }
    }
}

impl From<ValidationError> for TestResult {
    fn from(err: ValidationError) -> Self {
        TestResult::Invalid(err)
    }
}

impl From<Result<(), ValidationError>> for TestResult {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => TestResult::Pass,
            Err(e) => TestResult::Invalid(e),
        }
    }
}

impl From<Vec<ValidationError>> for TestResult {
    fn from(errors: Vec<ValidationError>) -> Self {
        match errors.len() {
            0 => TestResult::Pass,
            1 => errors.into_iter().next().map_or(TestResult::Fail, TestResult::Invalid),
            _ => {
                let value = errors[0].value.clone();
                let path = errors[0].path.clone();
                TestResult::Invalid(ValidationError::aggregate(errors, value, path))
            }
        }
    }
}

pub type SyncTestFn = Arc<dyn Fn(&Value, &TestContext) -> TestResult + Send + Sync>;
pub type AsyncTestFn = Arc<dyn Fn(Value, TestContext) -> BoxFuture<'static, TestResult> + Send + Sync>;

/// The body of a test
#[derive(Clone)]
pub enum TestFn {
    Sync(SyncTestFn),
    Async(AsyncTestFn),
}

/// A test parameter: a literal or a reference resolved per run
#[derive(Debug, Clone)]
pub enum Param {
    Value(Value),
    Ref(Reference),
}

impl Param {
    pub fn resolve(&self, value: &Value, parent: &Value, context: &Value) -> Value {
        match self {
            Param::Value(v) => v.clone(),
            Param::Ref(r) => r.get_value(value, parent, context),
        }
    }

    pub fn reference(&self) -> Option<&Reference> {
        match self {
            Param::Ref(r) => Some(r),
            Param::Value(_) => None,
        }
    }
}

macro_rules! param_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Param {
            fn from(v: $t) -> Self {
                Param::Value(Value::from(v))
            }
        })*
    };
}

param_from!(Value, &str, String, bool, f64, f32, i64, i32, u32, usize, DateTime<Utc>);

impl From<Reference> for Param {
    fn from(r: Reference) -> Self {
        Param::Ref(r)
    }
}

/// A named, possibly asynchronous assertion
#[derive(Clone)]
pub struct Test {
    name: Option<String>,
    message: Option<Message>,
    params: IndexMap<String, Param>,
    exclusive: bool,
    skip_absent: bool,
    run: TestFn,
}

impl Test {
    /// A synchronous test
    pub fn new<F, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &TestContext) -> R + Send + Sync + 'static,
        R: Into<TestResult>,
    {
        Self::build(Some(name.into()), TestFn::Sync(Arc::new(move |v, ctx| f(v, ctx).into())))
    }

    /// An asynchronous test; only runs under `validate`, never `validate_sync`
    pub fn new_async<F, Fut, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, TestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<TestResult>,
    {
        let run: AsyncTestFn = Arc::new(move |v, ctx| {
            let fut = f(v, ctx);
            Box::pin(async move { fut.await.into() })
        });
        Self::build(Some(name.into()), TestFn::Async(run))
    }

    /// A synchronous test without a name; it never replaces other tests
    pub fn anonymous<F, R>(f: F) -> Self
    where
        F: Fn(&Value, &TestContext) -> R + Send + Sync + 'static,
        R: Into<TestResult>,
    {
        Self::build(None, TestFn::Sync(Arc::new(move |v, ctx| f(v, ctx).into())))
    }

    fn build(name: Option<String>, run: TestFn) -> Self {
        Self {
            name,
            message: None,
            params: IndexMap::new(),
            exclusive: false,
            skip_absent: false,
            run,
        }
    }

    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub(crate) fn message_opt(mut self, message: Option<Message>) -> Self {
        if message.is_some() {
            self.message = message;
        }
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Param>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Skip the test for `Undefined` and `Null` values
    pub fn skip_absent(mut self) -> Self {
        self.skip_absent = true;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn params(&self) -> &IndexMap<String, Param> {
        &self.params
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn skips_absent(&self) -> bool {
        self.skip_absent
    }

    pub fn is_async(&self) -> bool {
        matches!(self.run, TestFn::Async(_))
    }

    pub(crate) fn run_fn(&self) -> &TestFn {
        &self.run
    }

    pub(crate) fn custom_message(&self) -> Option<&Message> {
        self.message.as_ref()
    }
}

impl fmt::Debug for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test")
            .field("name", &self.name)
            .field("exclusive", &self.exclusive)
            .field("async", &self.is_async())
            .finish()
    }
}

/// Ordered, deduplicating collection of tests
#[derive(Clone, Default, Debug)]
pub struct TestRegistry {
    tests: Vec<Test>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a test following the exclusivity rules
    pub fn add(&mut self, test: Test) {
        match test.name.as_deref() {
            None => {
                if test.exclusive {
                    tracing::warn!("exclusive test without a name is treated as non-exclusive");
                }
            }
            Some(name) if test.exclusive => {
                self.tests.retain(|t| t.name.as_deref() != Some(name));
            }
            Some(name) => {
                self.tests
                    .retain(|t| !(t.name.as_deref() == Some(name) && t.exclusive));
            }
        }
        self.tests.push(test);
    }

    /// Remove every test with `name`
    pub fn remove(&mut self, name: &str) {
        self.tests.retain(|t| t.name.as_deref() != Some(name));
    }

    pub fn has(&self, name: &str) -> bool {
        self.tests.iter().any(|t| t.name.as_deref() == Some(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Test> {
        self.tests.iter()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// References used as test parameters
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.tests
            .iter()
            .flat_map(|t| t.params.values().filter_map(Param::reference))
    }

    pub fn has_async(&self) -> bool {
        self.tests.iter().any(Test::is_async)
    }
}

/// Everything a test can see while it runs
#[derive(Clone)]
pub struct TestContext {
    pub path: String,
    pub value: Value,
    pub original_value: Value,
    pub schema: Schema,
    /// Test parameters with references resolved
    pub params: Params,
    pub(crate) parent: Arc<Value>,
    pub(crate) context: Arc<Value>,
    pub(crate) test_name: Option<String>,
    pub(crate) message: Option<Message>,
}

/// Overrides for [`TestContext::create_error_with`]
#[derive(Debug, Clone, Default)]
pub struct ErrorOverrides {
    pub path: Option<String>,
    pub message: Option<Message>,
    pub kind: Option<String>,
    pub params: Params,
}

impl TestContext {
    pub fn parent(&self) -> &Value {
        &self.parent
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Resolve a reference relative to the value under test
    pub fn resolve(&self, reference: &Reference) -> Value {
        reference.get_value(&self.value, &self.parent, &self.context)
    }

    /// Error with the test's message at the test's path
    pub fn create_error(&self) -> ValidationError {
        self.create_error_with(ErrorOverrides::default())
    }

    pub fn create_error_with(&self, overrides: ErrorOverrides) -> ValidationError {
        let path = overrides.path.unwrap_or_else(|| self.path.clone());
        let label = self.schema.label_text().map(str::to_string);

        let mut params = Params::new();
        params.insert("value".to_string(), self.value.clone());
        params.insert("originalValue".to_string(), self.original_value.clone());
        if let Some(label) = &label {
            params.insert("label".to_string(), Value::from(label.as_str()));
        }
        for (k, v) in self.params.iter().chain(overrides.params.iter()) {
            params.insert(k.clone(), v.clone());
        }
        let display = match &label {
            Some(label) => label.clone(),
            None if path.is_empty() => "this".to_string(),
            None => path.clone(),
        };
        params.insert("path".to_string(), Value::from(display));
        params.insert("originalPath".to_string(), Value::from(path.as_str()));

        let kind = overrides.kind.or_else(|| self.test_name.clone());
        let message = overrides
            .message
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| {
                locale::message_for(
                    self.schema.type_name(),
                    kind.as_deref().unwrap_or("default"),
                )
            });

        ValidationError::new(message.render(&params), self.value.clone(), path, kind)
            .with_params(params)
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("path", &self.path)
            .field("value", &self.value)
            .field("test", &self.test_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(registry: &TestRegistry) -> Vec<(Option<&str>, bool)> {
        registry.iter().map(|t| (t.name(), t.is_exclusive())).collect()
    }

    #[test]
    fn test_exclusive_replaces_same_name() {
        let mut registry = TestRegistry::new();
        registry.add(Test::new("max", |_, _| true).exclusive());
        registry.add(Test::new("max", |_, _| false).exclusive());
        assert_eq!(names(&registry), vec![(Some("max"), true)]);
    }

    #[test]
    fn test_non_exclusive_evicts_exclusive_and_stacks() {
        let mut registry = TestRegistry::new();
        registry.add(Test::new("check", |_, _| true).exclusive());
        registry.add(Test::new("check", |_, _| true));
        registry.add(Test::new("check", |_, _| true));
        assert_eq!(
            names(&registry),
            vec![(Some("check"), false), (Some("check"), false)]
        );
    }

    #[test]
    fn test_exclusive_replaces_stacked_tests() {
        let mut registry = TestRegistry::new();
        registry.add(Test::new("a", |_, _| true));
        registry.add(Test::new("b", |_, _| true));
        registry.add(Test::new("a", |_, _| true));
        registry.add(Test::new("a", |_, _| true).exclusive());
        assert_eq!(names(&registry), vec![(Some("b"), false), (Some("a"), true)]);
    }

    #[test]
    fn test_anonymous_tests_always_stack() {
        let mut registry = TestRegistry::new();
        registry.add(Test::anonymous(|_, _| true));
        registry.add(Test::anonymous(|_, _| true).exclusive());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_vec_of_errors_into_result() {
        let empty: Vec<ValidationError> = Vec::new();
        assert_eq!(TestResult::from(empty), TestResult::Pass);
        let errors = vec![
            ValidationError::new("a", Value::Null, "x", None),
            ValidationError::new("b", Value::Null, "y", None),
        ];
        match TestResult::from(errors) {
            TestResult::Invalid(e) => assert_eq!(e.paths(), vec!["x", "y"]),
            other => panic!("unexpected {:?}", other),
        }
    }
}
