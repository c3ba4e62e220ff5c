//! Deferred schemas
//!
//! A lazy node is a builder invoked fresh each time the engine needs a
//! concrete schema at its position.

use crate::describe::{DescribeOptions, SchemaDescription};
use crate::driver::ValidateOptions;
use crate::error::{CastError, Error};
use crate::schema::{CastOptions, ResolveContext, Schema};
use crate::types::SchemaType;
use crate::value::Value;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

type LazyFn = Arc<dyn Fn(&Value, &ResolveContext<'_>) -> Schema + Send + Sync>;

/// A deferred schema, built fresh every time one is needed.
///
/// Lets self-referential schemas describe tree-shaped data without
/// expanding eagerly.
#[derive(Clone)]
pub struct Lazy {
    builder: LazyFn,
}

impl Lazy {
    pub fn new<F, S>(f: F) -> Self
    where
        F: Fn(&Value, &ResolveContext<'_>) -> S + Send + Sync + 'static,
        S: Into<Schema>,
    {
        Self {
            builder: Arc::new(move |value, ctx| f(value, ctx).into()),
        }
    }

    /// Build the concrete schema for `ctx.value`
    pub fn build(&self, ctx: &ResolveContext<'_>) -> Schema {
        (self.builder)(ctx.value, ctx)
    }

    // Root entry points: build against the whole value, then delegate

    /// The schema a root `value` resolves to
    pub fn resolve(&self, value: &Value, context: &Value) -> Schema {
        self.build(&ResolveContext::root(value, context))
    }

    pub fn cast(&self, value: impl Into<Value>) -> Result<Value, CastError> {
        self.cast_with(value, &CastOptions::default())
    }

    pub fn cast_with(&self, value: impl Into<Value>, options: &CastOptions) -> Result<Value, CastError> {
        let value = value.into();
        self.resolve(&value, &options.context).cast_with(value, options)
    }

    pub fn validate(&self, value: impl Into<Value>) -> BoxFuture<'static, Result<Value, Error>> {
        self.validate_with(value, ValidateOptions::default())
    }

    pub fn validate_with(
        &self,
        value: impl Into<Value>,
        options: ValidateOptions,
    ) -> BoxFuture<'static, Result<Value, Error>> {
        let value = value.into();
        self.resolve(&value, &options.context).validate_with(value, options)
    }

    pub fn validate_sync(&self, value: impl Into<Value>) -> Result<Value, Error> {
        self.validate_sync_with(value, ValidateOptions::default())
    }

    pub fn validate_sync_with(&self, value: impl Into<Value>, options: ValidateOptions) -> Result<Value, Error> {
        let value = value.into();
        self.resolve(&value, &options.context).validate_sync_with(value, options)
    }

    pub fn is_valid(&self, value: impl Into<Value>) -> BoxFuture<'static, Result<bool, Error>> {
        let value = value.into();
        self.resolve(&value, &Value::Undefined).is_valid(value)
    }

    pub fn is_valid_sync(&self, value: impl Into<Value>) -> Result<bool, Error> {
        let value = value.into();
        self.resolve(&value, &Value::Undefined).is_valid_sync(value)
    }

    pub fn is_valid_sync_with(&self, value: impl Into<Value>, options: ValidateOptions) -> Result<bool, Error> {
        let value = value.into();
        self.resolve(&value, &options.context).is_valid_sync_with(value, options)
    }

    /// Describe the schema `options.value` resolves to
    pub fn describe_with(&self, options: &DescribeOptions) -> SchemaDescription {
        let value = options.value.clone().unwrap_or_default();
        let ctx = ResolveContext {
            value: &value,
            parent: &options.parent,
            context: &options.context,
            path: "",
        };
        self.build(&ctx).describe_with(options)
    }
}

impl fmt::Debug for Lazy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lazy(..)")
    }
}

/// Create a lazy schema
pub fn lazy<F, S>(f: F) -> Lazy
where
    F: Fn(&Value, &ResolveContext<'_>) -> S + Send + Sync + 'static,
    S: Into<Schema>,
{
    Lazy::new(f)
}
