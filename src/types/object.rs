//! Object schemas and field ordering

use super::SchemaType;
use crate::error::SchemaError;
use crate::locale::{Message, Params};
use crate::node::Node;
use crate::schema::{Kind, ObjectShape, Schema};
use crate::test_registry::{ErrorOverrides, Test, TestContext, TestResult};
use crate::transform::{self, Transform};
use crate::value::Value;
use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

typed_schema!(
    /// Objects with a known set of fields
    ObjectSchema
);

pub fn object() -> ObjectSchema {
    ObjectSchema(Schema::new(Kind::Object(ObjectShape::default())))
}

/// Build a field list for [`ObjectSchema::shape`]
///
/// ```
/// use contour::prelude::*;
///
/// let user = object()
///     .shape(contour::shape! {
///         "name" => string().required(),
///         "age" => number().min(0),
///     })
///     .unwrap();
/// assert!(user.fields().contains_key("age"));
/// ```
#[macro_export]
macro_rules! shape {
    ($($key:expr => $node:expr),* $(,)?) => {
        vec![$(($key.to_string(), $crate::node::Node::from($node))),*]
    };
}

fn is_excluded(excludes: &[(String, String)], a: &str, b: &str) -> bool {
    excludes
        .iter()
        .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Order fields so every field comes after the siblings it references.
///
/// Fields without dependencies between them keep declaration order.
pub(crate) fn sort_fields(
    fields: &IndexMap<String, Node>,
    excludes: &[(String, String)],
) -> Result<Vec<String>, SchemaError> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..fields.len()).map(|i| graph.add_node(i)).collect();

    for (i, (key, node)) in fields.iter().enumerate() {
        for dep in node.dependencies() {
            let Some(j) = fields.get_index_of(&dep) else {
                continue;
            };
            if j == i || is_excluded(excludes, key, &dep) {
                continue;
            }
            graph.update_edge(nodes[j], nodes[i], ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        let field = fields
            .get_index(graph[cycle.node_id()])
            .map(|(k, _)| k.clone())
            .unwrap_or_default();
        return Err(SchemaError::CyclicDependency { field });
    }

    let mut in_degree: Vec<usize> = nodes
        .iter()
        .map(|&n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(fields.len());
    while let Some(Reverse(i)) = ready.pop() {
        if let Some((key, _)) = fields.get_index(i) {
            order.push(key.clone());
        }
        for next in graph.neighbors_directed(nodes[i], Direction::Outgoing) {
            let j = graph[next];
            in_degree[j] -= 1;
            if in_degree[j] == 0 {
                ready.push(Reverse(j));
            }
        }
    }

    tracing::debug!(order = ?order, "sorted object fields");
    Ok(order)
}

impl ObjectSchema {
    fn shape_ref(&self) -> &ObjectShape {
        match self.0.kind() {
            Kind::Object(shape) => shape,
            _ => unreachable!("object schema without an object shape"),
        }
    }

    pub fn fields(&self) -> &IndexMap<String, Node> {
        &self.shape_ref().fields
    }

    /// Field keys in the order they are cast
    pub fn field_order(&self) -> &[String] {
        &self.shape_ref().order
    }

    fn with_shape(self, shape: ObjectShape) -> Self {
        self.map_schema(|s| s.update(|r| r.kind = Kind::Object(shape)))
    }

    /// Add or replace fields
    pub fn shape<I, K, N>(self, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<Node>,
    {
        self.shape_with_excludes(fields, Vec::<(String, String)>::new())
    }

    /// Add fields, ignoring dependencies between each `excludes` pair when
    /// ordering (lets two fields reference each other)
    pub fn shape_with_excludes<I, K, N, E, A, B>(self, fields: I, excludes: E) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<Node>,
        E: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let current = self.shape_ref();
        let mut merged = current.fields.clone();
        for (key, node) in fields {
            merged.insert(key.into(), node.into());
        }
        let mut edges = current.excludes.clone();
        for (a, b) in excludes {
            let edge = (a.into(), b.into());
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
        let shape = ObjectShape::new(merged, edges)?;
        Ok(self.with_shape(shape))
    }

    /// Keep only `keys`
    pub fn pick<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        self.retain_fields(|k| keys.iter().any(|p| p == k))
    }

    /// Drop `keys`
    pub fn omit<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        self.retain_fields(|k| !keys.iter().any(|p| p == k))
    }

    fn retain_fields(self, keep: impl Fn(&str) -> bool) -> Self {
        let current = self.shape_ref();
        // a subset of an acyclic order is still a valid order
        let shape = ObjectShape {
            fields: current
                .fields
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, n)| (k.clone(), n.clone()))
                .collect(),
            order: current.order.iter().filter(|k| keep(k)).cloned().collect(),
            excludes: current
                .excludes
                .iter()
                .filter(|(a, b)| keep(a) && keep(b))
                .cloned()
                .collect(),
        };
        self.with_shape(shape)
    }

    /// Make every direct field optional
    pub fn partial(self) -> Self {
        let current = self.shape_ref();
        let shape = ObjectShape {
            fields: current
                .fields
                .iter()
                .map(|(k, node)| {
                    let node = match node {
                        Node::Schema(s) => Node::Schema(s.clone().optional()),
                        other => other.clone(),
                    };
                    (k.clone(), node)
                })
                .collect(),
            order: current.order.clone(),
            excludes: current.excludes.clone(),
        };
        self.with_shape(shape)
    }

    /// Report every key that has no field
    pub fn no_unknown(self) -> Self {
        self.no_unknown_rule(None)
    }

    pub fn no_unknown_with(self, message: impl Into<Message>) -> Self {
        self.no_unknown_rule(Some(message.into()))
    }

    fn no_unknown_rule(self, message: Option<Message>) -> Self {
        self.test(
            Test::new("noUnknown", |v: &Value, ctx: &TestContext| {
                let (Some(map), Some(fields)) = (v.as_object(), ctx.schema.fields()) else {
                    return TestResult::Pass;
                };
                let errors: Vec<_> = map
                    .keys()
                    .filter(|k| !fields.contains_key(*k))
                    .map(|k| {
                        let mut params = Params::new();
                        params.insert("unknown".to_string(), Value::from(k.as_str()));
                        ctx.create_error_with(ErrorOverrides {
                            params,
                            ..Default::default()
                        })
                    })
                    .collect();
                TestResult::from(errors)
            })
            .message_opt(message)
            .skip_absent()
            .exclusive(),
        )
    }

    /// Move the value under `from` to `to` before fields are cast
    pub fn rename(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let (from, to) = (from.into(), to.into());
        self.map_schema(|s| {
            s.add_transform(Transform::named("rename", move |v, _, _| match v {
                Value::Object(mut map) => {
                    if let Some(moved) = map.shift_remove(&from) {
                        map.insert(to.clone(), moved);
                    }
                    Value::Object(map)
                }
                other => other,
            }))
        })
    }

    /// Rewrite every input key with `f`
    pub fn transform_keys<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.map_schema(|s| {
            s.add_transform(Transform::named("transformKeys", move |v, _, _| {
                transform::map_keys(v, f.as_ref())
            }))
        })
    }

    pub fn camel_case(self) -> Self {
        self.transform_keys(transform::camel_case)
    }

    pub fn snake_case(self) -> Self {
        self.transform_keys(transform::snake_case)
    }

    pub fn constant_case(self) -> Self {
        self.transform_keys(transform::constant_case)
    }

    /// Parse JSON strings into objects before casting
    pub fn json(self) -> Self {
        self.map_schema(|s| {
            s.add_transform(Transform::named("json", |v, _, _| transform::parse_json(v)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ValidateOptions;
    use crate::reference::reference;
    use crate::types::{array, number, string};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_reference_fields_cast_after_their_target() {
        let schema = object()
            .shape(crate::shape! {
                "baz" => reference("foo.bar"),
                "foo" => object().shape(crate::shape! { "bar" => string() }).unwrap(),
            })
            .unwrap();
        assert_eq!(schema.field_order(), ["foo", "baz"]);
        assert_eq!(
            schema.cast(Value::from(json!({"foo": {"bar": "boom"}}))).unwrap(),
            Value::from(json!({"baz": "boom", "foo": {"bar": "boom"}}))
        );
    }

    #[test]
    fn test_cycles_are_rejected_unless_excluded() {
        let fields = || {
            crate::shape! {
                "a" => number().min(reference("b")),
                "b" => number().max(reference("a")),
            }
        };
        assert!(matches!(
            object().shape(fields()),
            Err(SchemaError::CyclicDependency { .. })
        ));
        assert!(object().shape_with_excludes(fields(), [("a", "b")]).is_ok());
    }

    #[test]
    fn test_default_built_from_fields() {
        let schema = object()
            .shape(crate::shape! {
                "x" => array().default(Value::Array(vec![])),
                "y" => string(),
            })
            .unwrap();
        let first = schema.get_default();
        let second = schema.get_default();
        assert_eq!(first, Value::from(json!({"x": []})));
        assert_eq!(first, second);
    }

    #[test]
    fn test_pick_omit_partial() {
        let schema = object()
            .shape(crate::shape! {
                "a" => string().required(),
                "b" => number().required(),
            })
            .unwrap();
        assert_eq!(schema.clone().pick(["a"]).field_order(), ["a"]);
        assert_eq!(schema.clone().omit(["a"]).field_order(), ["b"]);
        assert!(schema.partial().is_valid_sync(Value::from(json!({}))).unwrap());
    }

    #[test]
    fn test_no_unknown_reports_each_key() {
        let schema = object()
            .shape(crate::shape! { "a" => string() })
            .unwrap()
            .no_unknown();
        let options = ValidateOptions {
            abort_early: Some(false),
            ..Default::default()
        };
        let err = schema
            .validate_sync_with(Value::from(json!({"a": "x", "b": 1, "c": 2})), options)
            .unwrap_err()
            .into_validation()
            .unwrap();
        assert_eq!(err.inner.len(), 2);
        assert_eq!(err.inner[0].params.get("unknown"), Some(&Value::from("b")));
        assert_eq!(err.inner[1].message(), "this field has unspecified keys: c");
    }

    #[test]
    fn test_key_transforms() {
        let schema = object()
            .shape(crate::shape! { "firstName" => string() })
            .unwrap()
            .camel_case();
        assert_eq!(
            schema.cast(Value::from(json!({"first_name": "Ada"}))).unwrap(),
            Value::from(json!({"firstName": "Ada"}))
        );
        let renamed = object().rename("old", "new");
        assert_eq!(
            renamed.cast(Value::from(json!({"old": 1}))).unwrap(),
            Value::from(json!({"new": 1}))
        );
    }

    #[test]
    fn test_strip_field() {
        let schema = object()
            .shape(crate::shape! {
                "keep" => string(),
                "secret" => string().strip(),
            })
            .unwrap();
        assert_eq!(
            schema.cast(Value::from(json!({"keep": "a", "secret": "b"}))).unwrap(),
            Value::from(json!({"keep": "a"}))
        );
    }
}
