//! CLI utilities and helpers

use anyhow::{bail, Context, Result};
use colored::*;
use contour::Value;
use std::path::Path;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Output formats for cast results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}

/// Read a data file; the extension picks JSON, YAML or TOML (JSON by default)
pub fn load_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    parse_value(&content, path.extension().and_then(|e| e.to_str()))
        .with_context(|| format!("Failed to parse data file: {}", path.display()))
}

pub fn parse_value(content: &str, extension: Option<&str>) -> Result<Value> {
    let json: serde_json::Value = match extension {
        Some("yaml") | Some("yml") => serde_yaml::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        Some("json") | None => serde_json::from_str(content)?,
        Some(other) => bail!("unsupported data format: .{}", other),
    };
    Ok(Value::from(json))
}

/// Render a value for output
pub fn render(value: &Value, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_value_formats() {
        let expected = Value::from(json!({"name": "Ada", "age": 36}));
        assert_eq!(parse_value(r#"{"name": "Ada", "age": 36}"#, Some("json")).unwrap(), expected);
        assert_eq!(parse_value("name: Ada\nage: 36\n", Some("yaml")).unwrap(), expected);
        assert_eq!(parse_value("name = \"Ada\"\nage = 36\n", Some("toml")).unwrap(), expected);
        assert!(parse_value("", Some("ini")).is_err());
    }

    #[test]
    fn test_render_json() {
        let value = Value::from(json!({"a": [1, 2]}));
        let rendered = render(&value, Format::Json).unwrap();
        assert_eq!(rendered, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }
}
