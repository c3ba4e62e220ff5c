//! Conditional schemas (`when`)
//!
//! A condition names the keys it depends on and a builder that derives a
//! new schema from their resolved values. Conditions apply in the order
//! they were registered, each building on the previous result.

use crate::reference::Reference;
use crate::schema::{ResolveContext, Schema};
use crate::types::SchemaType;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

pub type ConditionFn = Arc<dyn Fn(&[Value], Schema) -> Schema + Send + Sync>;

type IsFn = Arc<dyn Fn(&[Value]) -> bool + Send + Sync>;

/// How a declarative condition decides which branch applies
#[derive(Clone)]
pub enum Is {
    /// Every dependency equals this value
    Equals(Value),
    Predicate(IsFn),
}

impl Is {
    fn matches(&self, values: &[Value]) -> bool {
        match self {
            Is::Equals(expected) => values.iter().all(|v| v == expected),
            Is::Predicate(f) => f(values),
        }
    }
}

type Branch<S> = Arc<dyn Fn(S) -> S + Send + Sync>;

/// Declarative `{ is, then, otherwise }` condition
pub struct When<S> {
    is: Is,
    then: Option<Branch<S>>,
    otherwise: Option<Branch<S>>,
}

impl<S: SchemaType> When<S> {
    /// Branch on strict equality with `value`
    pub fn is(value: impl Into<Value>) -> Self {
        Self {
            is: Is::Equals(value.into()),
            then: None,
            otherwise: None,
        }
    }

    /// Branch on a predicate over the resolved dependency values
    pub fn matching<F>(predicate: F) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        Self {
            is: Is::Predicate(Arc::new(predicate)),
            then: None,
            otherwise: None,
        }
    }

    pub fn then<F>(mut self, f: F) -> Self
    where
        F: Fn(S) -> S + Send + Sync + 'static,
    {
        self.then = Some(Arc::new(f));
        self
    }

    pub fn otherwise<F>(mut self, f: F) -> Self
    where
        F: Fn(S) -> S + Send + Sync + 'static,
    {
        self.otherwise = Some(Arc::new(f));
        self
    }

    fn into_builder(self) -> ConditionFn {
        let When { is, then, otherwise } = self;
        Arc::new(move |values: &[Value], base: Schema| {
            let branch = if is.matches(values) { &then } else { &otherwise };
            match branch {
                Some(f) => f(S::from_schema(base)).into(),
                None => base,
            }
        })
    }
}

/// A registered condition
#[derive(Clone)]
pub struct Condition {
    refs: Vec<Reference>,
    builder: ConditionFn,
}

impl Condition {
    pub fn new<I, K>(keys: I, builder: ConditionFn) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            refs: keys.into_iter().map(Reference::new).collect(),
            builder,
        }
    }

    pub fn declarative<I, K, S>(keys: I, when: When<S>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        S: SchemaType,
    {
        Self::new(keys, when.into_builder())
    }

    pub fn refs(&self) -> &[Reference] {
        &self.refs
    }

    /// Resolve the dependency values and derive the next schema from `base`
    pub fn resolve(&self, base: Schema, ctx: &ResolveContext<'_>) -> Schema {
        let values: Vec<Value> = self
            .refs
            .iter()
            .map(|r| r.get_value(ctx.value, ctx.parent, ctx.context))
            .collect();
        tracing::trace!(
            path = ctx.path,
            keys = ?self.refs.iter().map(Reference::key).collect::<Vec<_>>(),
            "resolving condition"
        );
        (self.builder)(&values, base)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").field("refs", &self.refs).finish()
    }
}
