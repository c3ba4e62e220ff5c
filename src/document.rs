//! Declarative schema documents
//!
//! A schema document describes a schema as data (JSON, YAML or TOML) so it
//! can be stored next to the values it checks. Documents cover the built-in
//! rules only; custom tests and transforms need the builder API.

use crate::error::SchemaError;
use crate::node::Node;
use crate::reference::reference;
use crate::schema::Schema;
use crate::types::{array, boolean, date, mixed, number, object, string, tuple, SchemaType};
use crate::value::Value;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default = "default_version")]
    pub version: String,

    pub title: Option<String>,

    pub description: Option<String>,

    /// Root type definition
    #[serde(rename = "type")]
    pub type_def: TypeDef,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Settings shared by every kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Common {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub strip: bool,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub one_of: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub not_one_of: Option<Vec<serde_json::Value>>,
}

/// Type definition, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDef {
    /// Any value
    Mixed {
        #[serde(flatten)]
        common: Common,
    },

    String {
        #[serde(flatten)]
        common: Common,
        #[serde(default)]
        length: Option<usize>,
        #[serde(default)]
        min_length: Option<usize>,
        #[serde(default)]
        max_length: Option<usize>,
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        email: bool,
        #[serde(default)]
        url: bool,
        #[serde(default)]
        uuid: bool,
        #[serde(default)]
        trim: bool,
        #[serde(default)]
        lowercase: bool,
        #[serde(default)]
        uppercase: bool,
    },

    Number {
        #[serde(flatten)]
        common: Common,
        #[serde(default)]
        minimum: Option<f64>,
        #[serde(default)]
        maximum: Option<f64>,
        #[serde(default)]
        more_than: Option<f64>,
        #[serde(default)]
        less_than: Option<f64>,
        #[serde(default)]
        integer: bool,
        #[serde(default)]
        positive: bool,
        #[serde(default)]
        negative: bool,
    },

    Boolean {
        #[serde(flatten)]
        common: Common,
    },

    /// Dates; limits are date strings
    Date {
        #[serde(flatten)]
        common: Common,
        #[serde(default)]
        min: Option<String>,
        #[serde(default)]
        max: Option<String>,
    },

    Array {
        #[serde(flatten)]
        common: Common,
        #[serde(default)]
        items: Option<Box<TypeDef>>,
        #[serde(default)]
        min_items: Option<usize>,
        #[serde(default)]
        max_items: Option<usize>,
    },

    Tuple {
        #[serde(flatten)]
        common: Common,
        items: Vec<TypeDef>,
    },

    Object {
        #[serde(flatten)]
        common: Common,
        #[serde(default)]
        properties: IndexMap<String, TypeDef>,
        #[serde(default)]
        no_unknown: bool,
    },

    /// Copy of another field, e.g. `{ kind = "ref", key = "email" }`
    Ref { key: String },
}

impl SchemaDocument {
    /// Load schema from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse schema JSON")
    }

    /// Load schema from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse schema YAML")
    }

    /// Load schema from TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse schema TOML")
    }

    /// Load a schema file, picking the format from its extension (JSON by default)
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loading schema document");
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&source),
            Some("toml") => Self::from_toml(&source),
            _ => Self::from_json(&source),
        }
    }

    /// Build the schema described by this document
    pub fn build(&self) -> Result<Schema, SchemaError> {
        match build_node(&self.type_def)? {
            Node::Schema(schema) => Ok(schema),
            _ => Err(SchemaError::InvalidDocument(
                "the root type cannot be a reference".to_string(),
            )),
        }
    }
}

fn build_node(def: &TypeDef) -> Result<Node, SchemaError> {
    let schema: Schema = match def {
        TypeDef::Ref { key } => return Ok(reference(key.as_str()).into()),
        TypeDef::Mixed { common } => apply_common(mixed(), common).into(),
        TypeDef::String {
            common,
            length,
            min_length,
            max_length,
            pattern,
            email,
            url,
            uuid,
            trim,
            lowercase,
            uppercase,
        } => {
            let mut s = string();
            if let Some(n) = length {
                s = s.length(*n);
            }
            if let Some(n) = min_length {
                s = s.min(*n);
            }
            if let Some(n) = max_length {
                s = s.max(*n);
            }
            if let Some(p) = pattern {
                let regex = Regex::new(p)
                    .map_err(|e| SchemaError::InvalidDocument(format!("invalid pattern `{}`: {}", p, e)))?;
                s = s.matches(regex);
            }
            if *email {
                s = s.email();
            }
            if *url {
                s = s.url();
            }
            if *uuid {
                s = s.uuid();
            }
            if *trim {
                s = s.trim();
            }
            if *lowercase {
                s = s.lowercase();
            }
            if *uppercase {
                s = s.uppercase();
            }
            apply_common(s, common).into()
        }
        TypeDef::Number {
            common,
            minimum,
            maximum,
            more_than,
            less_than,
            integer,
            positive,
            negative,
        } => {
            let mut n = number();
            if let Some(v) = minimum {
                n = n.min(*v);
            }
            if let Some(v) = maximum {
                n = n.max(*v);
            }
            if let Some(v) = more_than {
                n = n.more_than(*v);
            }
            if let Some(v) = less_than {
                n = n.less_than(*v);
            }
            if *integer {
                n = n.integer();
            }
            if *positive {
                n = n.positive();
            }
            if *negative {
                n = n.negative();
            }
            apply_common(n, common).into()
        }
        TypeDef::Boolean { common } => apply_common(boolean(), common).into(),
        TypeDef::Date { common, min, max } => {
            let mut d = date();
            if let Some(v) = min {
                d = d.min(v.as_str());
            }
            if let Some(v) = max {
                d = d.max(v.as_str());
            }
            apply_common(d, common).into()
        }
        TypeDef::Array {
            common,
            items,
            min_items,
            max_items,
        } => {
            let mut a = array();
            if let Some(items) = items {
                a = a.of(build_node(items)?);
            }
            if let Some(n) = min_items {
                a = a.min(*n);
            }
            if let Some(n) = max_items {
                a = a.max(*n);
            }
            apply_common(a, common).into()
        }
        TypeDef::Tuple { common, items } => {
            let types = items.iter().map(build_node).collect::<Result<Vec<_>, _>>()?;
            apply_common(tuple(types), common).into()
        }
        TypeDef::Object {
            common,
            properties,
            no_unknown,
        } => {
            let fields = properties
                .iter()
                .map(|(k, def)| build_node(def).map(|n| (k.clone(), n)))
                .collect::<Result<Vec<_>, _>>()?;
            let mut o = object().shape(fields)?;
            if *no_unknown {
                o = o.no_unknown();
            }
            apply_common(o, common).into()
        }
    };
    Ok(Node::Schema(schema))
}

fn apply_common<S: SchemaType>(mut schema: S, common: &Common) -> S {
    if let Some(values) = &common.one_of {
        schema = schema.one_of(values.iter().map(Value::from));
    }
    if let Some(values) = &common.not_one_of {
        schema = schema.not_one_of(values.iter().map(Value::from));
    }
    if let Some(default) = &common.default {
        schema = schema.default(Value::from(default));
    }
    if let Some(label) = &common.label {
        schema = schema.label(label.clone());
    }
    if common.nullable {
        schema = schema.nullable();
    }
    if common.required {
        schema = schema.required();
    }
    if common.strict {
        schema = schema.strict(true);
    }
    if common.strip {
        schema = schema.strip();
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const USER_YAML: &str = r#"
title: User
type:
  kind: object
  no_unknown: true
  properties:
    name:
      kind: string
      required: true
      min_length: 2
    age:
      kind: number
      integer: true
      minimum: 0
    tags:
      kind: array
      items:
        kind: string
      default: []
"#;

    #[test]
    fn test_yaml_document_builds_object_schema() {
        let doc = SchemaDocument::from_yaml(USER_YAML).unwrap();
        assert_eq!(doc.title.as_deref(), Some("User"));
        assert_eq!(doc.version, "1.0");

        let schema = doc.build().unwrap();
        assert_eq!(
            schema.validate_sync(Value::from(json!({"name": "Ada", "age": "36"}))).unwrap(),
            Value::from(json!({"name": "Ada", "age": 36, "tags": []}))
        );
        assert!(!schema.is_valid_sync(Value::from(json!({"name": "A"}))).unwrap());
        assert!(!schema
            .is_valid_sync(Value::from(json!({"name": "Ada", "extra": 1})))
            .unwrap());
    }

    #[test]
    fn test_json_and_toml_documents() {
        let json_doc = SchemaDocument::from_json(
            r#"{"type": {"kind": "string", "one_of": ["red", "green"]}}"#,
        )
        .unwrap();
        let colors = json_doc.build().unwrap();
        assert!(colors.is_valid_sync(Value::from("red")).unwrap());
        assert!(!colors.is_valid_sync(Value::from("blue")).unwrap());

        let toml_doc = SchemaDocument::from_toml(
            r#"
[type]
kind = "number"
positive = true
"#,
        )
        .unwrap();
        assert!(!toml_doc.build().unwrap().is_valid_sync(Value::Number(-1.0)).unwrap());
    }

    #[test]
    fn test_invalid_documents() {
        assert!(SchemaDocument::from_json(r#"{"type": {"kind": "bogus"}}"#).is_err());
        let root_ref = SchemaDocument::from_json(r#"{"type": {"kind": "ref", "key": "x"}}"#).unwrap();
        assert!(matches!(root_ref.build(), Err(SchemaError::InvalidDocument(_))));
        let bad_pattern =
            SchemaDocument::from_json(r#"{"type": {"kind": "string", "pattern": "("}}"#).unwrap();
        assert!(matches!(bad_pattern.build(), Err(SchemaError::InvalidDocument(_))));
    }
}
