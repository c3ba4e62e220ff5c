//! Typed schema builders
//!
//! Every wrapper is a thin newtype over [`Schema`]. The builders shared by
//! all types live on the [`SchemaType`] trait; each wrapper adds the rules
//! that only make sense for its type.

use crate::condition::{Condition, When};
use crate::describe::{DescribeOptions, SchemaDescription};
use crate::driver::{self, ValidateOptions};
use crate::error::{CastError, Error, SchemaError};
use crate::locale::Message;
use crate::registry;
use crate::schema::{extend_unique, same_param, CastOptions, DefaultValue, Schema};
use crate::test_registry::{Param, Test, TestContext};
use crate::transform::Transform;
use crate::value::Value;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Declare a typed wrapper around [`Schema`]
macro_rules! typed_schema {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name(pub(crate) $crate::schema::Schema);

        impl $crate::types::SchemaType for $name {
            fn from_schema(schema: $crate::schema::Schema) -> Self {
                Self(schema)
            }

            fn as_schema(&self) -> &$crate::schema::Schema {
                &self.0
            }
        }

        impl From<$name> for $crate::schema::Schema {
            fn from(s: $name) -> Self {
                s.0
            }
        }

        impl From<$name> for $crate::node::Node {
            fn from(s: $name) -> Self {
                $crate::node::Node::Schema(s.0)
            }
        }
    };
}

pub mod array;
pub mod boolean;
pub mod date;
pub mod mixed;
pub mod number;
pub mod object;
pub mod string;
pub mod tuple;

pub use array::{array, ArraySchema};
pub use boolean::{boolean, BooleanSchema};
pub use date::{date, DateSchema};
pub use mixed::{mixed, mixed_of, MixedSchema};
pub use number::{number, NumberSchema};
pub use object::{object, ObjectSchema};
pub use string::{string, StringSchema};
pub use tuple::{tuple, TupleSchema};

/// Builders and entry points shared by every schema type.
///
/// Builders consume the schema and return a configured copy; the record is
/// copied only if another handle still shares it.
pub trait SchemaType: Clone + Into<Schema> + Send + Sync + 'static {
    fn from_schema(schema: Schema) -> Self;

    fn as_schema(&self) -> &Schema;

    fn into_schema(self) -> Schema {
        self.into()
    }

    #[doc(hidden)]
    fn map_schema(self, f: impl FnOnce(Schema) -> Schema) -> Self {
        Self::from_schema(f(self.into()))
    }

    // =========================================================================
    // PRESENCE
    // =========================================================================

    /// Reject `Undefined` and `Null` (and the empty string for strings)
    fn required(self) -> Self {
        self.map_schema(|s| s.set_required(None))
    }

    fn required_with(self, message: impl Into<Message>) -> Self {
        let message = message.into();
        self.map_schema(|s| s.set_required(Some(message)))
    }

    /// Undo `required`: accept `Undefined` and `Null` again
    fn not_required(self) -> Self {
        self.map_schema(Schema::set_not_required)
    }

    /// Reject `Undefined`
    fn defined(self) -> Self {
        self.map_schema(|s| {
            s.update(|r| {
                r.flags.optional = false;
                r.undefined_rule.name = "defined";
                r.undefined_rule.message = None;
            })
        })
    }

    fn defined_with(self, message: impl Into<Message>) -> Self {
        let message = message.into();
        self.map_schema(|s| {
            s.update(|r| {
                r.flags.optional = false;
                r.undefined_rule.name = "defined";
                r.undefined_rule.message = Some(message);
            })
        })
    }

    fn optional(self) -> Self {
        self.map_schema(|s| s.update(|r| r.flags.optional = true))
    }

    fn nullable(self) -> Self {
        self.map_schema(|s| s.update(|r| r.flags.nullable = true))
    }

    fn non_nullable(self) -> Self {
        self.map_schema(|s| {
            s.update(|r| {
                r.flags.nullable = false;
                r.null_rule.name = "nullable";
                r.null_rule.message = None;
            })
        })
    }

    fn non_nullable_with(self, message: impl Into<Message>) -> Self {
        let message = message.into();
        self.map_schema(|s| {
            s.update(|r| {
                r.flags.nullable = false;
                r.null_rule.name = "nullable";
                r.null_rule.message = Some(message);
            })
        })
    }

    // =========================================================================
    // METADATA AND DEFAULTS
    // =========================================================================

    /// Value substituted when the input is `Undefined`
    fn default(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.map_schema(|s| s.update(|r| r.default = Some(DefaultValue::Value(value))))
    }

    /// Producer invoked for every default
    fn default_with<F, V>(self, f: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        let producer = DefaultValue::Producer(Arc::new(move || f().into()));
        self.map_schema(|s| s.update(|r| r.default = Some(producer)))
    }

    /// Drop this field from the parent object's output
    fn strip(self) -> Self {
        self.map_schema(|s| s.update(|r| r.flags.strip = true))
    }

    /// Name shown in messages instead of the path
    fn label(self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.map_schema(|s| s.update(|r| r.label = Some(label)))
    }

    /// Attach an introspection entry, unused by validation
    fn meta(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.map_schema(|s| {
            s.update(|r| {
                r.meta.get_or_insert_with(Default::default).insert(key, value);
            })
        })
    }

    fn type_error(self, message: impl Into<Message>) -> Self {
        let message = message.into();
        self.map_schema(|s| s.update(|r| r.type_error = Some(message)))
    }

    /// Skip casting during validation and check the input as given
    fn strict(self, strict: bool) -> Self {
        self.map_schema(|s| s.update(|r| r.flags.strict = strict))
    }

    /// Turn the type's built-in coercion (e.g. `"5"` to `5`) on or off;
    /// user transforms still run
    fn coerce(self, coerce: bool) -> Self {
        self.map_schema(|s| s.update(|r| r.flags.coerce = coerce))
    }

    /// Stop at the first failure unless the call options say otherwise
    fn abort_early(self, abort_early: bool) -> Self {
        self.map_schema(|s| s.update(|r| r.flags.abort_early = Some(abort_early)))
    }

    /// Validate children unless the call options say otherwise
    fn recursive(self, recursive: bool) -> Self {
        self.map_schema(|s| s.update(|r| r.flags.recursive = Some(recursive)))
    }

    // =========================================================================
    // ALLOWED VALUES
    // =========================================================================

    /// Only allow these values (references resolve per call)
    fn one_of<I, P>(self, values: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        self.map_schema(|s| set_allowed(s, values.into_iter().map(Into::into).collect(), None))
    }

    fn one_of_with<I, P>(self, values: I, message: impl Into<Message>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        let message = message.into();
        self.map_schema(|s| set_allowed(s, values.into_iter().map(Into::into).collect(), Some(message)))
    }

    /// Reject these values
    fn not_one_of<I, P>(self, values: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        self.map_schema(|s| set_denied(s, values.into_iter().map(Into::into).collect(), None))
    }

    fn not_one_of_with<I, P>(self, values: I, message: impl Into<Message>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        let message = message.into();
        self.map_schema(|s| set_denied(s, values.into_iter().map(Into::into).collect(), Some(message)))
    }

    // =========================================================================
    // PIPELINES
    // =========================================================================

    fn test(self, test: Test) -> Self {
        self.map_schema(|s| s.add_test(test))
    }

    /// Append a transform; it runs after the type's own coercion
    fn transform<F>(self, f: F) -> Self
    where
        F: Fn(Value, &Value, &Schema) -> Value + Send + Sync + 'static,
    {
        self.map_schema(|s| s.add_transform(Transform::new(f)))
    }

    /// Derive the schema from other values with `{ is, then, otherwise }`
    fn when<I, K>(self, keys: I, when: When<Self>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let condition = Condition::declarative(keys, when);
        self.map_schema(|s| s.update(|r| r.conditions.push(condition)))
    }

    /// Derive the schema from other values with a builder function
    fn when_with<I, K, F>(self, keys: I, f: F) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(&[Value], Self) -> Self + Send + Sync + 'static,
    {
        let condition = Condition::new(
            keys,
            Arc::new(move |values: &[Value], base: Schema| f(values, Self::from_schema(base)).into()),
        );
        self.map_schema(|s| s.update(|r| r.conditions.push(condition)))
    }

    /// Apply a batch of builders.
    ///
    /// The first builder detaches the record from any other handle; the rest
    /// mutate the detached copy in place. Nothing is observable until `f`
    /// returns.
    fn with_mutation(self, f: impl FnOnce(Self) -> Self) -> Self {
        let staged = self.map_schema(|s| s.update(|_| {}));
        f(staged)
    }

    /// Merge `other` into this schema; `other`'s settings win
    fn concat(self, other: impl Into<Schema>) -> Result<Self, SchemaError> {
        let base: Schema = self.into();
        let merged = base.merge(other.into())?;
        Ok(Self::from_schema(merged))
    }

    /// Invoke a method added with [`registry::add_method`]
    fn call(self, name: &str, args: &[Value]) -> Result<Self, SchemaError> {
        let schema: Schema = self.into();
        let method = registry::lookup(schema.type_name(), name).ok_or_else(|| {
            SchemaError::UnknownMethod {
                type_name: schema.type_name().to_string(),
                name: name.to_string(),
            }
        })?;
        Ok(Self::from_schema(method(schema, args)))
    }

    // =========================================================================
    // ENTRY POINTS
    // =========================================================================

    fn cast(&self, value: impl Into<Value>) -> Result<Value, CastError> {
        self.as_schema().run_cast(value.into(), &CastOptions::default())
    }

    fn cast_with(&self, value: impl Into<Value>, options: &CastOptions) -> Result<Value, CastError> {
        self.as_schema().run_cast(value.into(), options)
    }

    fn validate(&self, value: impl Into<Value>) -> BoxFuture<'static, Result<Value, Error>> {
        driver::validate(self.as_schema(), value.into(), ValidateOptions::default())
    }

    fn validate_with(
        &self,
        value: impl Into<Value>,
        options: ValidateOptions,
    ) -> BoxFuture<'static, Result<Value, Error>> {
        driver::validate(self.as_schema(), value.into(), options)
    }

    /// Validate without suspending; asynchronous tests are an error
    fn validate_sync(&self, value: impl Into<Value>) -> Result<Value, Error> {
        driver::validate_sync(self.as_schema(), value.into(), ValidateOptions::default())
    }

    fn validate_sync_with(&self, value: impl Into<Value>, options: ValidateOptions) -> Result<Value, Error> {
        driver::validate_sync(self.as_schema(), value.into(), options)
    }

    /// Validate only the part of `value` at `path`
    fn validate_at(
        &self,
        path: &str,
        value: impl Into<Value>,
        options: ValidateOptions,
    ) -> BoxFuture<'static, Result<Value, Error>> {
        driver::validate_at(self.as_schema(), path, value.into(), options)
    }

    fn validate_sync_at(&self, path: &str, value: impl Into<Value>, options: ValidateOptions) -> Result<Value, Error> {
        driver::validate_sync_at(self.as_schema(), path, value.into(), options)
    }

    /// `false` on validation failure; other errors still propagate
    fn is_valid(&self, value: impl Into<Value>) -> BoxFuture<'static, Result<bool, Error>> {
        driver::is_valid(self.as_schema(), value.into(), ValidateOptions::default())
    }

    fn is_valid_with(
        &self,
        value: impl Into<Value>,
        options: ValidateOptions,
    ) -> BoxFuture<'static, Result<bool, Error>> {
        driver::is_valid(self.as_schema(), value.into(), options)
    }

    fn is_valid_sync(&self, value: impl Into<Value>) -> Result<bool, Error> {
        driver::is_valid_sync(self.as_schema(), value.into(), ValidateOptions::default())
    }

    fn is_valid_sync_with(&self, value: impl Into<Value>, options: ValidateOptions) -> Result<bool, Error> {
        driver::is_valid_sync(self.as_schema(), value.into(), options)
    }

    fn describe(&self) -> SchemaDescription {
        self.as_schema().describe_node(None)
    }

    /// Describe after resolving conditions and lazy nodes against a value
    fn describe_with(&self, options: &DescribeOptions) -> SchemaDescription {
        self.as_schema().describe_node(Some(options))
    }

    fn get_default(&self) -> Value {
        self.as_schema().get_default_value()
    }
}

impl SchemaType for Schema {
    fn from_schema(schema: Schema) -> Self {
        schema
    }

    fn as_schema(&self) -> &Schema {
        self
    }
}

/// An exclusive rule comparing the value against a resolved limit parameter.
///
/// Absent values and limits that resolve to `Undefined` or `Null` pass.
pub(crate) fn limit_test<F>(
    name: &'static str,
    param: &'static str,
    limit: Param,
    message: Option<Message>,
    check: F,
) -> Test
where
    F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
{
    Test::new(name, move |value: &Value, ctx: &TestContext| match ctx.param(param) {
        Some(limit) if !limit.is_absent() => check(value, limit),
        _ => true,
    })
    .param(param, limit)
    .message_opt(message)
    .skip_absent()
    .exclusive()
}

/// `value >= limit` style comparison on numbers; other shapes pass
pub(crate) fn compare_numbers(value: Option<f64>, limit: &Value, cmp: fn(f64, f64) -> bool) -> bool {
    match (value, limit.as_f64()) {
        (Some(v), Some(l)) => cmp(v, l),
        _ => true,
    }
}

fn set_allowed(schema: Schema, values: Vec<Param>, message: Option<Message>) -> Schema {
    schema.update(|r| {
        extend_unique(&mut r.one_of, values.iter().cloned());
        r.not_one_of.retain(|p| !values.iter().any(|v| same_param(p, v)));
        if message.is_some() {
            r.one_of_message = message;
        }
    })
}

fn set_denied(schema: Schema, values: Vec<Param>, message: Option<Message>) -> Schema {
    schema.update(|r| {
        extend_unique(&mut r.not_one_of, values.iter().cloned());
        r.one_of.retain(|p| !values.iter().any(|v| same_param(p, v)));
        if message.is_some() {
            r.not_one_of_message = message;
        }
    })
}
