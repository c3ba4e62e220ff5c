//! The schema node
//!
//! [`Schema`] is an immutable, cheaply cloned handle onto a shared record.
//! Builder methods take the handle by value and copy the record only when
//! another handle still points at it, so configuring a schema never changes
//! a schema it was cloned from.
//!
//! Variants are a [`Kind`] tag on one common record rather than separate
//! types; the typed wrappers in [`crate::types`] only decide which builder
//! methods are available.

use crate::condition::Condition;
use crate::error::{CastError, SchemaError};
use crate::locale::Message;
use crate::node::Node;
use crate::path::{child_index, child_key, PathExpr, Segment};
use crate::test_registry::{Param, Test, TestRegistry};
use crate::transform::{self, Transform};
use crate::types::object::sort_fields;
use crate::value::{Map, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

pub type CheckFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

static UNDEFINED: Value = Value::Undefined;

/// A default: a fixed value or a producer invoked on every use
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Producer(DefaultFn),
}

impl DefaultValue {
    /// A fresh default; values are owned, so no two calls share structure
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Producer(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => write!(f, "{:?}", v),
            DefaultValue::Producer(_) => write!(f, "Producer(..)"),
        }
    }
}

/// Object fields together with their computed processing order
#[derive(Clone, Debug, Default)]
pub struct ObjectShape {
    pub(crate) fields: IndexMap<String, Node>,
    /// Field keys in dependency order
    pub(crate) order: Vec<String>,
    /// Dependency edges that must not constrain ordering
    pub(crate) excludes: Vec<(String, String)>,
}

impl ObjectShape {
    pub(crate) fn new(
        fields: IndexMap<String, Node>,
        excludes: Vec<(String, String)>,
    ) -> Result<Self, SchemaError> {
        let order = sort_fields(&fields, &excludes)?;
        Ok(Self {
            fields,
            order,
            excludes,
        })
    }

    pub fn fields(&self) -> &IndexMap<String, Node> {
        &self.fields
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }
}

/// Variant tag with the variant-specific part of the record
#[derive(Clone)]
pub enum Kind {
    Mixed,
    Custom { name: String, check: CheckFn },
    String,
    Number,
    Boolean,
    Date,
    Array { inner: Option<Box<Node>> },
    Tuple { types: Vec<Node> },
    Object(ObjectShape),
}

impl Kind {
    pub fn type_name(&self) -> &str {
        match self {
            Kind::Mixed => "mixed",
            Kind::Custom { name, .. } => name,
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Date => "date",
            Kind::Array { .. } => "array",
            Kind::Tuple { .. } => "tuple",
            Kind::Object(_) => "object",
        }
    }

    /// Does a present, non-null value already have this type?
    fn check(&self, value: &Value) -> bool {
        match (self, value) {
            (Kind::Mixed, _) => true,
            (Kind::Custom { check, .. }, v) => check(v),
            (Kind::String, Value::String(_)) => true,
            (Kind::Number, Value::Number(n)) => !n.is_nan(),
            (Kind::Boolean, Value::Bool(_)) => true,
            (Kind::Date, Value::Date(d)) => d.is_some(),
            (Kind::Array { .. }, Value::Array(_)) => true,
            (Kind::Tuple { types }, Value::Array(items)) => items.len() == types.len(),
            (Kind::Object(_), Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Built-in coercion toward the type
    fn coerce(&self, value: Value) -> Value {
        match self {
            Kind::String => transform::coerce_string(value),
            Kind::Number => transform::coerce_number(value),
            Kind::Boolean => transform::coerce_boolean(value),
            Kind::Date => transform::coerce_date(value),
            _ => value,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Array { inner } => f.debug_struct("Array").field("inner", inner).finish(),
            Kind::Tuple { types } => f.debug_struct("Tuple").field("types", types).finish(),
            Kind::Object(shape) => f.debug_tuple("Object").field(&shape.order).finish(),
            other => write!(f, "{}", other.type_name()),
        }
    }
}

/// Presence and behavior flags
#[derive(Clone, Debug)]
pub(crate) struct Flags {
    pub(crate) strict: bool,
    pub(crate) strip: bool,
    pub(crate) nullable: bool,
    pub(crate) optional: bool,
    /// Run the type's built-in coercion before user transforms
    pub(crate) coerce: bool,
    pub(crate) abort_early: Option<bool>,
    pub(crate) recursive: Option<bool>,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            strict: false,
            strip: false,
            nullable: false,
            optional: true,
            coerce: true,
            abort_early: None,
            recursive: None,
        }
    }
}

/// Name and message of a built-in presence rule
#[derive(Clone, Debug)]
pub(crate) struct InternalRule {
    pub(crate) name: &'static str,
    pub(crate) message: Option<Message>,
}

impl InternalRule {
    fn named(name: &'static str) -> Self {
        Self {
            name,
            message: None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SchemaInner {
    pub(crate) kind: Kind,
    pub(crate) transforms: Vec<Transform>,
    pub(crate) tests: TestRegistry,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) flags: Flags,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) label: Option<String>,
    pub(crate) meta: Option<Map>,
    pub(crate) one_of: Vec<Param>,
    pub(crate) not_one_of: Vec<Param>,
    pub(crate) one_of_message: Option<Message>,
    pub(crate) not_one_of_message: Option<Message>,
    pub(crate) type_error: Option<Message>,
    /// Rule reported for `Undefined` when the schema is not optional
    pub(crate) undefined_rule: InternalRule,
    /// Rule reported for `Null` when the schema is not nullable
    pub(crate) null_rule: InternalRule,
}

/// An immutable schema node
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

/// Where a schema is being resolved: the value at its position, the
/// enclosing container and the external context
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub value: &'a Value,
    pub parent: &'a Value,
    pub context: &'a Value,
    pub path: &'a str,
}

impl<'a> ResolveContext<'a> {
    pub fn root(value: &'a Value, context: &'a Value) -> Self {
        Self {
            value,
            parent: &UNDEFINED,
            context,
            path: "",
        }
    }
}

/// Options for [`crate::SchemaType::cast_with`]
#[derive(Debug, Clone)]
pub struct CastOptions {
    /// Skip transforms and only check the type
    pub strict: bool,
    /// Drop object keys that have no field
    pub strip_unknown: bool,
    /// Fail with a [`CastError`] when the result does not have the schema's type
    pub assert: bool,
    pub context: Value,
}

impl Default for CastOptions {
    fn default() -> Self {
        Self {
            strict: false,
            strip_unknown: false,
            assert: true,
            context: Value::Undefined,
        }
    }
}

/// Per-call state threaded through a recursive cast
pub(crate) struct CastScope<'a> {
    pub(crate) context: &'a Value,
    pub(crate) path: String,
    pub(crate) strip_unknown: bool,
    pub(crate) assert: bool,
    /// Casting on behalf of validate: strict children keep their input
    pub(crate) validating: bool,
}

impl CastScope<'_> {
    fn child(&self, path: String) -> Self {
        CastScope {
            context: self.context,
            path,
            strip_unknown: self.strip_unknown,
            assert: self.assert,
            validating: self.validating,
        }
    }
}

/// A schema located below a root by [`Schema::locate`]
pub(crate) struct Located {
    pub(crate) schema: Schema,
    pub(crate) value: Value,
    pub(crate) parent: Value,
    pub(crate) path: String,
}

impl Schema {
    pub(crate) fn new(kind: Kind) -> Self {
        Self {
            inner: Arc::new(SchemaInner {
                kind,
                transforms: Vec::new(),
                tests: TestRegistry::new(),
                conditions: Vec::new(),
                flags: Flags::default(),
                default: None,
                label: None,
                meta: None,
                one_of: Vec::new(),
                not_one_of: Vec::new(),
                one_of_message: None,
                not_one_of_message: None,
                type_error: None,
                undefined_rule: InternalRule::named("defined"),
                null_rule: InternalRule::named("nullable"),
            }),
        }
    }

    /// Apply `f` to this schema's record, copying it first if it is shared
    pub(crate) fn update(mut self, f: impl FnOnce(&mut SchemaInner)) -> Self {
        f(Arc::make_mut(&mut self.inner));
        self
    }

    pub(crate) fn record(&self) -> &SchemaInner {
        &self.inner
    }

    pub(crate) fn flags(&self) -> &Flags {
        &self.inner.flags
    }

    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    pub fn type_name(&self) -> &str {
        self.inner.kind.type_name()
    }

    pub fn label_text(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    pub fn meta_map(&self) -> Option<&Map> {
        self.inner.meta.as_ref()
    }

    pub fn is_nullable(&self) -> bool {
        self.inner.flags.nullable
    }

    pub fn is_optional(&self) -> bool {
        self.inner.flags.optional
    }

    pub fn is_strict(&self) -> bool {
        self.inner.flags.strict
    }

    pub fn is_stripped(&self) -> bool {
        self.inner.flags.strip
    }

    pub fn tests(&self) -> &TestRegistry {
        &self.inner.tests
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.inner.transforms
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.inner.conditions
    }

    /// Object fields, for object schemas
    pub fn fields(&self) -> Option<&IndexMap<String, Node>> {
        match &self.inner.kind {
            Kind::Object(shape) => Some(&shape.fields),
            _ => None,
        }
    }

    /// Element schema, for array schemas
    pub fn inner_type(&self) -> Option<&Node> {
        match &self.inner.kind {
            Kind::Array { inner } => inner.as_deref(),
            _ => None,
        }
    }

    /// Type check including the presence flags: `Null` passes when
    /// nullable, `Undefined` when optional
    pub fn is_type(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.inner.flags.nullable,
            Value::Undefined => self.inner.flags.optional,
            other => self.inner.kind.check(other),
        }
    }

    /// Apply every condition in registration order.
    ///
    /// Each condition receives the result of the previous one. Conditions
    /// added by a builder are resolved in turn.
    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> Schema {
        if self.inner.conditions.is_empty() {
            return self.clone();
        }
        let conditions = self.inner.conditions.clone();
        let base = self.clone().update(|s| s.conditions.clear());
        let resolved = conditions
            .iter()
            .fold(base, |schema, condition| condition.resolve(schema, ctx));
        resolved.resolve(ctx)
    }

    /// A fresh default value; object schemas without an explicit default
    /// build one from their fields
    pub fn get_default_value(&self) -> Value {
        if let Some(default) = &self.inner.default {
            return default.produce();
        }
        match &self.inner.kind {
            Kind::Object(shape) if !shape.fields.is_empty() => Value::Object(
                shape
                    .fields
                    .iter()
                    .map(|(k, node)| (k.clone(), node.default_value()))
                    .filter(|(_, v)| !v.is_undefined())
                    .collect(),
            ),
            _ => Value::Undefined,
        }
    }

    /// Sibling fields this schema reads through conditions, test parameters
    /// or allowed-value references
    pub(crate) fn dependencies(&self) -> Vec<String> {
        let condition_refs = self.inner.conditions.iter().flat_map(|c| c.refs().iter());
        let value_refs = self
            .inner
            .one_of
            .iter()
            .chain(self.inner.not_one_of.iter())
            .filter_map(Param::reference);

        let mut deps: Vec<String> = Vec::new();
        for r in condition_refs.chain(self.inner.tests.references()).chain(value_refs) {
            if let Some(field) = r.sibling_field() {
                if !deps.contains(&field) {
                    deps.push(field);
                }
            }
        }
        deps
    }

    pub(crate) fn add_test(self, test: Test) -> Self {
        self.update(|s| s.tests.add(test))
    }

    pub(crate) fn remove_test(self, name: &str) -> Self {
        self.update(|s| s.tests.remove(name))
    }

    pub(crate) fn add_transform(self, transform: Transform) -> Self {
        self.update(|s| s.transforms.push(transform))
    }

    pub(crate) fn set_required(self, message: Option<Message>) -> Self {
        let is_string = matches!(self.inner.kind, Kind::String);
        let schema = self.update(|s| {
            s.flags.optional = false;
            s.flags.nullable = false;
            s.undefined_rule = InternalRule {
                name: "required",
                message: message.clone(),
            };
            s.null_rule = InternalRule {
                name: "required",
                message: message.clone(),
            };
        });
        if is_string {
            schema.add_test(
                Test::new("required", |v: &Value, _| v.as_str().is_some_and(|s| !s.is_empty()))
                    .message_opt(message)
                    .skip_absent()
                    .exclusive(),
            )
        } else {
            schema
        }
    }

    pub(crate) fn set_not_required(self) -> Self {
        self.update(|s| {
            s.flags.optional = true;
            s.flags.nullable = true;
            s.undefined_rule = InternalRule::named("defined");
            s.null_rule = InternalRule::named("nullable");
            s.tests.remove("required");
        })
    }

    // =========================================================================
    // CAST
    // =========================================================================

    /// Cast from the root
    pub(crate) fn run_cast(&self, value: Value, options: &CastOptions) -> Result<Value, CastError> {
        let resolved = self.resolve(&ResolveContext::root(&value, &options.context));
        if options.strict {
            if resolved.is_type(&value) {
                return Ok(value);
            }
            return Err(CastError::new(
                "",
                resolved.type_name(),
                value,
                resolved.is_nullable(),
            ));
        }
        let scope = CastScope {
            context: &options.context,
            path: String::new(),
            strip_unknown: options.strip_unknown,
            assert: options.assert,
            validating: false,
        };
        resolved.cast_resolved(value, &scope)
    }

    /// Cast with conditions already applied to `self`
    pub(crate) fn cast_resolved(&self, value: Value, scope: &CastScope<'_>) -> Result<Value, CastError> {
        let original = value.clone();
        let coerced = if self.inner.flags.coerce {
            self.inner.kind.coerce(value)
        } else {
            value
        };
        let transformed = transform::run_pipeline(&self.inner.transforms, coerced, &original, self);
        let defaulted = if transformed.is_undefined() {
            self.get_default_value()
        } else {
            transformed
        };
        let cast = self.cast_children(defaulted, scope)?;

        if self.is_type(&cast) {
            return Ok(cast);
        }
        if scope.assert {
            return Err(CastError::new(
                &scope.path,
                self.type_name(),
                cast,
                self.inner.flags.nullable,
            ));
        }
        if cast.is_absent() {
            return Ok(cast);
        }
        Ok(match self.inner.kind {
            Kind::Number => Value::Number(f64::NAN),
            Kind::Date => Value::Date(None),
            _ => original,
        })
    }

    fn cast_children(&self, value: Value, scope: &CastScope<'_>) -> Result<Value, CastError> {
        match &self.inner.kind {
            Kind::Object(shape) => match value {
                Value::Object(input) => cast_object(shape, input, scope),
                other => Ok(other),
            },
            Kind::Array { inner: Some(node) } => {
                let Some(items) = value.as_array() else {
                    return Ok(value);
                };
                let cast = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let child = scope.child(child_index(&scope.path, i));
                        cast_node(node, item.clone(), &value, &child).map(Option::unwrap_or_default)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(cast))
            }
            Kind::Tuple { types } => {
                // wrong arity is left as is for the type check to reject
                let Some(items) = value.as_array().filter(|a| a.len() == types.len()) else {
                    return Ok(value);
                };
                let cast = types
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (node, item))| {
                        let item = item.clone();
                        let child = scope.child(child_index(&scope.path, i));
                        cast_node(node, item, &value, &child).map(Option::unwrap_or_default)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(cast))
            }
            _ => Ok(value),
        }
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Find the schema at `path` along with the value, parent and absolute
    /// path it applies to
    pub(crate) fn locate(&self, path: &str, value: &Value, context: &Value) -> Result<Located, SchemaError> {
        let expr = PathExpr::parse(path);
        let invalid = |reason: String| SchemaError::InvalidPath {
            path: path.to_string(),
            reason,
        };

        let mut schema = self.resolve(&ResolveContext::root(value, context));
        let mut current = value.clone();
        let mut parent = Value::Undefined;
        let mut at = String::new();

        for segment in expr.segments() {
            let (node, next_value, next_path) = match (segment, &schema.inner.kind) {
                (Segment::Key(key), Kind::Object(shape)) => {
                    let node = shape
                        .fields
                        .get(key)
                        .ok_or_else(|| invalid(format!("object has no field `{}`", key)))?;
                    let next = current.get(key).cloned().unwrap_or_default();
                    (node.clone(), next, child_key(&at, key))
                }
                (Segment::Index(i), Kind::Array { inner: Some(node) }) => {
                    let next = current.as_array().and_then(|a| a.get(*i)).cloned().unwrap_or_default();
                    (node.as_ref().clone(), next, child_index(&at, *i))
                }
                (Segment::Index(i), Kind::Tuple { types }) => {
                    let node = types
                        .get(*i)
                        .ok_or_else(|| invalid(format!("tuple has no element {}", i)))?;
                    let next = current.as_array().and_then(|a| a.get(*i)).cloned().unwrap_or_default();
                    (node.clone(), next, child_index(&at, *i))
                }
                (segment, kind) => {
                    return Err(invalid(format!(
                        "`{}` schema has no child at {:?}",
                        kind.type_name(),
                        segment
                    )))
                }
            };

            let ctx = ResolveContext {
                value: &next_value,
                parent: &current,
                context,
                path: &next_path,
            };
            schema = node
                .resolve(&ctx)
                .ok_or_else(|| invalid(format!("`{}` is a reference, not a schema", next_path)))?;
            parent = std::mem::replace(&mut current, next_value);
            at = next_path;
        }

        Ok(Located {
            schema,
            value: current,
            parent,
            path: at,
        })
    }

    /// The schema at `path`, e.g. `address.lines[0]`
    pub fn reach(&self, path: &str) -> Result<Schema, SchemaError> {
        self.locate(path, &Value::Undefined, &Value::Undefined)
            .map(|located| located.schema)
    }

    // =========================================================================
    // CONCAT
    // =========================================================================

    /// Combine with `other`, whose settings win where both set one
    pub(crate) fn merge(self, other: Schema) -> Result<Schema, SchemaError> {
        let left = self.type_name().to_string();
        let right = other.type_name().to_string();
        if left != right && left != "mixed" && right != "mixed" {
            return Err(SchemaError::IncompatibleConcat { left, right });
        }

        let other = Arc::try_unwrap(other.inner).unwrap_or_else(|shared| (*shared).clone());
        let kind = merge_kinds(self.inner.kind.clone(), other.kind)?;

        Ok(self.update(|base| {
            base.kind = kind;
            base.transforms.extend(other.transforms);
            for test in other.tests.iter() {
                base.tests.add(test.clone());
            }
            base.conditions.extend(other.conditions);
            base.flags = other.flags;
            if other.default.is_some() {
                base.default = other.default;
            }
            if other.label.is_some() {
                base.label = other.label;
            }
            base.meta = match (base.meta.take(), other.meta) {
                (Some(mut a), Some(b)) => {
                    a.extend(b);
                    Some(a)
                }
                (a, b) => b.or(a),
            };
            base.one_of.retain(|p| !other.not_one_of.iter().any(|q| same_param(p, q)));
            base.not_one_of.retain(|p| !other.one_of.iter().any(|q| same_param(p, q)));
            extend_unique(&mut base.one_of, other.one_of);
            extend_unique(&mut base.not_one_of, other.not_one_of);
            base.one_of_message = other.one_of_message.or(base.one_of_message.take());
            base.not_one_of_message = other.not_one_of_message.or(base.not_one_of_message.take());
            base.type_error = other.type_error.or(base.type_error.take());
            base.undefined_rule = other.undefined_rule;
            base.null_rule = other.null_rule;
        }))
    }
}

/// Cast one child position; `None` means the field is stripped from output
fn cast_node(node: &Node, value: Value, parent: &Value, scope: &CastScope<'_>) -> Result<Option<Value>, CastError> {
    if let Node::Ref(r) = node {
        return Ok(Some(r.get_value(&value, parent, scope.context)));
    }
    let ctx = ResolveContext {
        value: &value,
        parent,
        context: scope.context,
        path: &scope.path,
    };
    let Some(schema) = node.resolve(&ctx) else {
        return Ok(Some(value));
    };
    if schema.inner.flags.strip {
        return Ok(None);
    }
    if scope.validating && schema.inner.flags.strict {
        return Ok(Some(value));
    }
    schema.cast_resolved(value, scope).map(Some)
}

fn cast_object(shape: &ObjectShape, input: Map, scope: &CastScope<'_>) -> Result<Value, CastError> {
    // fields see the siblings cast before them through `parent`
    let mut intermediate = Value::Object(Map::new());
    for key in &shape.order {
        let Some(node) = shape.fields.get(key) else {
            continue;
        };
        let field_value = input.get(key).cloned().unwrap_or_default();
        let child = scope.child(child_key(&scope.path, key));
        let cast = cast_node(node, field_value, &intermediate, &child)?;
        if let (Some(v), Some(map)) = (cast, intermediate.as_object_mut()) {
            if !v.is_undefined() {
                map.insert(key.clone(), v);
            }
        }
    }

    let Value::Object(mut cast) = intermediate else {
        return Ok(Value::Object(input));
    };
    let mut out = Map::with_capacity(cast.len());
    for key in shape.fields.keys() {
        if let Some(v) = cast.shift_remove(key) {
            out.insert(key.clone(), v);
        }
    }
    if !scope.strip_unknown {
        for (k, v) in input {
            if !shape.fields.contains_key(&k) {
                out.insert(k, v);
            }
        }
    }
    Ok(Value::Object(out))
}

fn merge_kinds(base: Kind, next: Kind) -> Result<Kind, SchemaError> {
    Ok(match (base, next) {
        (base, Kind::Mixed) => base,
        (Kind::Mixed, next) => next,
        (Kind::Object(a), Kind::Object(b)) => {
            let mut fields = a.fields;
            for (key, node) in b.fields {
                let merged = match fields.shift_remove(&key) {
                    Some(existing) => merge_nodes(existing, node)?,
                    None => node,
                };
                fields.insert(key, merged);
            }
            let mut excludes = a.excludes;
            for edge in b.excludes {
                if !excludes.contains(&edge) {
                    excludes.push(edge);
                }
            }
            Kind::Object(ObjectShape::new(fields, excludes)?)
        }
        (Kind::Array { inner: a }, Kind::Array { inner: b }) => Kind::Array {
            inner: match (a, b) {
                (Some(a), Some(b)) => Some(Box::new(merge_nodes(*a, *b)?)),
                (a, b) => b.or(a),
            },
        },
        (_, next) => next,
    })
}

fn merge_nodes(base: Node, next: Node) -> Result<Node, SchemaError> {
    match (base, next) {
        (Node::Schema(a), Node::Schema(b)) => Ok(Node::Schema(a.merge(b)?)),
        (_, next) => Ok(next),
    }
}

pub(crate) fn same_param(a: &Param, b: &Param) -> bool {
    match (a, b) {
        (Param::Value(x), Param::Value(y)) => x == y,
        (Param::Ref(x), Param::Ref(y)) => x.key() == y.key(),
        _ => false,
    }
}

pub(crate) fn extend_unique(set: &mut Vec<Param>, items: impl IntoIterator<Item = Param>) {
    for item in items {
        if !set.iter().any(|p| same_param(p, &item)) {
            set.push(item);
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.inner.kind)
            .field("label", &self.inner.label)
            .field("tests", &self.inner.tests.len())
            .finish()
    }
}
