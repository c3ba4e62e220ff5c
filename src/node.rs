//! Child positions of container schemas
//!
//! An object field or array element is either a concrete schema, a lazy
//! builder invoked per value, or a reference copied from elsewhere.

use crate::describe::{Description, DescribeOptions, LazyDescription, RefDescription};
use crate::lazy::Lazy;
use crate::reference::Reference;
use crate::schema::{ResolveContext, Schema};
use crate::value::Value;

/// A child schema position
#[derive(Clone, Debug)]
pub enum Node {
    Schema(Schema),
    Lazy(Lazy),
    Ref(Reference),
}

impl Node {
    /// Concrete schema for this position with conditions applied; `None` for references
    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> Option<Schema> {
        match self {
            Node::Schema(s) => Some(s.resolve(ctx)),
            Node::Lazy(l) => Some(l.build(ctx).resolve(ctx)),
            Node::Ref(_) => None,
        }
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            Node::Schema(s) => Some(s),
            _ => None,
        }
    }

    /// Sibling fields this position depends on
    pub(crate) fn dependencies(&self) -> Vec<String> {
        match self {
            Node::Schema(s) => s.dependencies(),
            Node::Ref(r) => r.sibling_field().into_iter().collect(),
            Node::Lazy(_) => Vec::new(),
        }
    }

    /// Default value for this position
    pub(crate) fn default_value(&self) -> Value {
        match self {
            Node::Schema(s) => s.get_default_value(),
            _ => Value::Undefined,
        }
    }

    pub fn describe(&self, options: Option<&DescribeOptions>) -> Description {
        match self {
            Node::Schema(s) => Description::Schema(s.describe_node(options)),
            Node::Lazy(l) => match options {
                Some(opts) => {
                    let value = opts.value.clone().unwrap_or_default();
                    let ctx = ResolveContext {
                        value: &value,
                        parent: &opts.parent,
                        context: &opts.context,
                        path: "",
                    };
                    Description::Schema(l.build(&ctx).describe_node(options))
                }
                None => Description::Lazy(LazyDescription::default()),
            },
            Node::Ref(r) => Description::Ref(RefDescription::from(r)),
        }
    }
}

impl From<Schema> for Node {
    fn from(s: Schema) -> Self {
        Node::Schema(s)
    }
}

impl From<Lazy> for Node {
    fn from(l: Lazy) -> Self {
        Node::Lazy(l)
    }
}

impl From<Reference> for Node {
    fn from(r: Reference) -> Self {
        Node::Ref(r)
    }
}
