//! Path expressions for references and nested lookups
//!
//! Supports dotted keys (`a.b`), bracket indices (`a[0]`) and quoted
//! bracket keys (`a["b.c"]`). Parsing is lenient: anything that does not
//! form a valid bracket segment is kept as a literal key.

use crate::value::Value;
use std::fmt;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A parsed path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathExpr {
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parse a path string
    pub fn parse(input: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = input.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if !current.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    }
                }
                '[' => {
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        current.push('[');
                        current.push_str(&inner);
                        continue;
                    }
                    if !current.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    }
                    segments.push(bracket_segment(inner.trim()));
                }
                _ => current.push(ch),
            }
        }
        if !current.is_empty() {
            segments.push(Segment::Key(current));
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First key of the path, used to order sibling fields
    pub fn first_key(&self) -> Option<String> {
        match self.segments.first()? {
            Segment::Key(k) => Some(k.clone()),
            Segment::Index(i) => Some(i.to_string()),
        }
    }

    /// Walk the path through `root`
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match (segment, current) {
                (Segment::Key(k), Value::Object(map)) => map.get(k)?,
                (Segment::Key(k), Value::Array(items)) => items.get(k.parse::<usize>().ok()?)?,
                (Segment::Index(i), Value::Array(items)) => items.get(*i)?,
                (Segment::Index(i), Value::Object(map)) => map.get(&i.to_string())?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Like [`PathExpr::get`] but yields `Undefined` for missing values
    pub fn resolve(&self, root: &Value) -> Value {
        self.get(root).cloned().unwrap_or(Value::Undefined)
    }
}

fn bracket_segment(inner: &str) -> Segment {
    let quoted = inner.len() >= 2
        && ((inner.starts_with('"') && inner.ends_with('"'))
            || (inner.starts_with('\'') && inner.ends_with('\'')));
    if quoted {
        return Segment::Key(inner[1..inner.len() - 1].to_string());
    }
    match inner.parse::<usize>() {
        Ok(i) => Segment::Index(i),
        Err(_) => Segment::Key(inner.to_string()),
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Key(k) => out = child_key(&out, k),
                Segment::Index(i) => out = child_index(&out, *i),
            }
        }
        write!(f, "{}", out)
    }
}

/// Path of an object field below `parent`
pub fn child_key(parent: &str, key: &str) -> String {
    if key.contains('.') {
        format!("{}[\"{}\"]", parent, key)
    } else if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Path of an array element below `parent`
pub fn child_index(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mixed_segments() {
        let path = PathExpr::parse("a.b[0][\"c.d\"].e");
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("a".into()),
                Segment::Key("b".into()),
                Segment::Index(0),
                Segment::Key("c.d".into()),
                Segment::Key("e".into()),
            ]
        );
    }

    #[test]
    fn test_get_nested() {
        let value = Value::from(json!({"foo": {"bar": ["x", "y"]}}));
        let path = PathExpr::parse("foo.bar[1]");
        assert_eq!(path.get(&value), Some(&Value::from("y")));
        assert_eq!(PathExpr::parse("foo.baz").resolve(&value), Value::Undefined);
    }

    #[test]
    fn test_unclosed_bracket_is_literal() {
        let path = PathExpr::parse("a[0");
        assert_eq!(path.segments(), &[Segment::Key("a[0".into())]);
    }

    #[test]
    fn test_child_paths() {
        assert_eq!(child_key("", "a"), "a");
        assert_eq!(child_key("a", "b"), "a.b");
        assert_eq!(child_key("a", "b.c"), "a[\"b.c\"]");
        assert_eq!(child_index("a", 2), "a[2]");
        assert_eq!(PathExpr::parse("a[2].b").to_string(), "a[2].b");
    }
}
