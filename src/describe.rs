//! Serializable schema descriptions
//!
//! `describe` turns a schema tree into plain data suitable for tooling
//! (form generators, documentation). Lazy nodes and conditions can only be
//! described against a concrete value, supplied through [`DescribeOptions`].

use crate::reference::Reference;
use crate::schema::{Kind, ResolveContext, Schema};
use crate::test_registry::Param;
use crate::value::{Map, Value};
use indexmap::IndexMap;
use serde::Serialize;

/// Value, parent and context used to resolve conditions and lazy nodes
#[derive(Debug, Clone, Default)]
pub struct DescribeOptions {
    pub value: Option<Value>,
    pub parent: Value,
    pub context: Value,
}

/// Any described child position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Description {
    Schema(SchemaDescription),
    Ref(RefDescription),
    Lazy(LazyDescription),
}

impl Description {
    pub fn type_name(&self) -> &str {
        match self {
            Description::Schema(s) => &s.type_name,
            Description::Ref(r) => r.type_name,
            Description::Lazy(l) => l.type_name,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaDescription> {
        match self {
            Description::Schema(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescription {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map>,
    pub one_of: Vec<DescribedValue>,
    pub not_one_of: Vec<DescribedValue>,
    pub nullable: bool,
    pub optional: bool,
    #[serde(skip_serializing_if = "Value::is_undefined")]
    pub default: Value,
    pub tests: Vec<TestDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, Description>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_type: Option<InnerType>,
}

/// Element schema of an array, or the positional schemas of a tuple
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InnerType {
    Single(Box<Description>),
    Sequence(Vec<Description>),
}

impl InnerType {
    pub fn as_single(&self) -> Option<&Description> {
        match self {
            InnerType::Single(d) => Some(d),
            InnerType::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Description]> {
        match self {
            InnerType::Single(_) => None,
            InnerType::Sequence(items) => Some(items),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestDescription {
    pub name: Option<String>,
    pub params: IndexMap<String, DescribedValue>,
}

/// A literal or a reference, as written on the schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DescribedValue {
    Value(Value),
    Ref(RefDescription),
}

impl From<&Param> for DescribedValue {
    fn from(param: &Param) -> Self {
        match param {
            Param::Value(v) => DescribedValue::Value(v.clone()),
            Param::Ref(r) => DescribedValue::Ref(RefDescription::from(r)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefDescription {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub key: String,
}

impl From<&Reference> for RefDescription {
    fn from(r: &Reference) -> Self {
        Self {
            type_name: "ref",
            key: r.key().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LazyDescription {
    #[serde(rename = "type")]
    pub type_name: &'static str,
}

impl Default for LazyDescription {
    fn default() -> Self {
        Self { type_name: "lazy" }
    }
}

impl Schema {
    /// Describe this schema; with options, conditions are resolved first and
    /// children see the matching part of the value
    pub fn describe_node(&self, options: Option<&DescribeOptions>) -> SchemaDescription {
        let value = options.and_then(|o| o.value.clone()).unwrap_or_default();
        let schema = match options {
            Some(opts) => self.resolve(&ResolveContext {
                value: &value,
                parent: &opts.parent,
                context: &opts.context,
                path: "",
            }),
            None => self.clone(),
        };
        let record = schema.record();

        let child = |child_value: Option<&Value>| {
            options.map(|opts| DescribeOptions {
                value: child_value.cloned(),
                parent: value.clone(),
                context: opts.context.clone(),
            })
        };

        let (fields, inner_type) = match schema.kind() {
            Kind::Object(shape) => {
                let fields = shape
                    .fields()
                    .iter()
                    .map(|(key, node)| {
                        let opts = child(value.get(key));
                        (key.clone(), node.describe(opts.as_ref()))
                    })
                    .collect();
                (Some(fields), None)
            }
            Kind::Array { inner } => {
                let first = value.as_array().and_then(|a| a.first());
                let inner = inner.as_ref().map(|node| {
                    let opts = child(first);
                    InnerType::Single(Box::new(node.describe(opts.as_ref())))
                });
                (None, inner)
            }
            Kind::Tuple { types } => {
                let items = types
                    .iter()
                    .enumerate()
                    .map(|(i, node)| {
                        let opts = child(value.as_array().and_then(|a| a.get(i)));
                        node.describe(opts.as_ref())
                    })
                    .collect();
                (None, Some(InnerType::Sequence(items)))
            }
            _ => (None, None),
        };

        SchemaDescription {
            type_name: schema.type_name().to_string(),
            label: record.label.clone(),
            meta: record.meta.clone(),
            one_of: record.one_of.iter().map(DescribedValue::from).collect(),
            not_one_of: record.not_one_of.iter().map(DescribedValue::from).collect(),
            nullable: schema.is_nullable(),
            optional: schema.is_optional(),
            default: record.default.as_ref().map(|d| d.produce()).unwrap_or_default(),
            tests: schema
                .tests()
                .iter()
                .map(|t| TestDescription {
                    name: t.name().map(str::to_string),
                    params: t
                        .params()
                        .iter()
                        .map(|(k, p)| (k.clone(), DescribedValue::from(p)))
                        .collect(),
                })
                .collect(),
            fields,
            inner_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::When;
    use crate::lazy::lazy;
    use crate::reference::reference;
    use crate::types::{array, number, object, string, tuple, SchemaType, StringSchema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_describe_serializes_camel_case() {
        let schema = string().required().min(2).label("Name").meta("widget", "text");
        let json = serde_json::to_value(schema.describe()).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "string",
                "label": "Name",
                "meta": {"widget": "text"},
                "oneOf": [],
                "notOneOf": [],
                "nullable": false,
                "optional": false,
                "tests": [
                    {"name": "required", "params": {}},
                    {"name": "min", "params": {"min": 2}}
                ]
            })
        );
    }

    #[test]
    fn test_describe_object_fields_and_refs() {
        let schema = object()
            .shape(crate::shape! {
                "low" => number(),
                "high" => number().min(reference("low")),
                "copy" => reference("low"),
                "tags" => array().of(string()),
            })
            .unwrap();
        let description = schema.describe();
        let fields = description.fields.as_ref().unwrap();
        assert_eq!(fields["copy"].type_name(), "ref");
        let high = fields["high"].as_schema().unwrap();
        assert_eq!(
            high.tests[0].params["min"],
            DescribedValue::Ref(RefDescription {
                type_name: "ref",
                key: "low".into()
            })
        );
        let tags = fields["tags"].as_schema().unwrap();
        let inner = tags.inner_type.as_ref().and_then(InnerType::as_single).unwrap();
        assert_eq!(inner.type_name(), "string");
    }

    #[test]
    fn test_lazy_needs_a_value() {
        let schema = array().of(lazy(|v: &Value, _: &ResolveContext<'_>| -> crate::schema::Schema {
            if v.as_str().is_some() {
                string().into()
            } else {
                number().into()
            }
        }));
        let plain = schema.describe();
        assert_eq!(plain.inner_type.as_ref().and_then(InnerType::as_single).unwrap().type_name(), "lazy");

        let options = DescribeOptions {
            value: Some(Value::from(json!(["a"]))),
            ..Default::default()
        };
        let resolved = schema.describe_with(&options);
        assert_eq!(resolved.inner_type.as_ref().and_then(InnerType::as_single).unwrap().type_name(), "string");
    }

    #[test]
    fn test_describe_with_resolves_conditions() {
        let schema = object()
            .shape(crate::shape! {
                "kind" => string(),
                "code" => string().when(["kind"], When::is("pin").then(|s: StringSchema| s.length(4))),
            })
            .unwrap();
        let options = DescribeOptions {
            value: Some(Value::from(json!({"kind": "pin"}))),
            ..Default::default()
        };
        let described = schema.describe_with(&options);
        let code = described.fields.as_ref().unwrap()["code"].as_schema().unwrap().clone();
        assert_eq!(code.tests[0].name.as_deref(), Some("length"));
        assert!(schema.describe().fields.unwrap()["code"].as_schema().unwrap().tests.is_empty());
    }

    #[test]
    fn test_describe_tuple_lists_positional_types() {
        let schema = tuple([crate::node::Node::from(string()), number().into()]);
        let json = serde_json::to_value(schema.describe()).unwrap();
        assert_eq!(json["type"], "tuple");
        assert_eq!(json["innerType"][0]["type"], "string");
        assert_eq!(json["innerType"][1]["type"], "number");
        assert!(json.get("innerTypes").is_none());

        let described = schema.describe();
        let items = described.inner_type.as_ref().and_then(InnerType::as_sequence).unwrap();
        assert_eq!(items.len(), 2);
    }
}
