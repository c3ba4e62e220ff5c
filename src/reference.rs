//! References to sibling fields, context values or the value itself
//!
//! A key prefixed with `$` resolves against the external context, a key
//! prefixed with `.` resolves against the value being checked, anything
//! else resolves against the parent object (a sibling field).

use crate::path::PathExpr;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

const CONTEXT_PREFIX: char = '$';
const VALUE_PREFIX: char = '.';

/// Which root a reference resolves against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefRoot {
    Sibling,
    Context,
    Value,
}

type RefMapper = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A resolvable path expression
#[derive(Clone)]
pub struct Reference {
    key: String,
    root: RefRoot,
    path: PathExpr,
    map: Option<RefMapper>,
}

impl Reference {
    /// Create a reference from a key such as `foo.bar`, `$tenant` or `.`
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into().trim().to_string();
        let (root, rest) = if let Some(rest) = key.strip_prefix(CONTEXT_PREFIX) {
            (RefRoot::Context, rest.to_string())
        } else if let Some(rest) = key.strip_prefix(VALUE_PREFIX) {
            (RefRoot::Value, rest.to_string())
        } else {
            (RefRoot::Sibling, key.clone())
        };

        Self {
            path: PathExpr::parse(&rest),
            key,
            root,
            map: None,
        }
    }

    /// Post-process the resolved value
    pub fn map<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.map = Some(Arc::new(f));
        self
    }

    /// The key as written, prefix included
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn root(&self) -> RefRoot {
        self.root
    }

    pub fn path(&self) -> &PathExpr {
        &self.path
    }

    pub fn is_sibling(&self) -> bool {
        self.root == RefRoot::Sibling
    }

    pub fn is_context(&self) -> bool {
        self.root == RefRoot::Context
    }

    /// Sibling field this reference depends on, if any
    pub fn sibling_field(&self) -> Option<String> {
        if self.is_sibling() {
            self.path.first_key()
        } else {
            None
        }
    }

    /// Resolve against the current value, its parent and the context
    pub fn get_value(&self, value: &Value, parent: &Value, context: &Value) -> Value {
        let root = match self.root {
            RefRoot::Context => context,
            RefRoot::Value => value,
            RefRoot::Sibling => parent,
        };
        let resolved = if self.path.is_empty() {
            root.clone()
        } else {
            self.path.resolve(root)
        };
        match &self.map {
            Some(f) => f(resolved),
            None => resolved,
        }
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.key)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.key)
    }
}

/// Create a reference (`ref` is a keyword)
pub fn reference(key: impl Into<String>) -> Reference {
    Reference::new(key)
}
