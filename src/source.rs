//! Reading configuration documents into a raw JSON value.
//!
//! Both configuration kinds are stored in one of three physical formats:
//! JSON, YAML, or an ES module whose default export is a plain object
//! literal. All three are normalized into [`serde_json::Value`] before any
//! validation happens, so the typed loaders only deal with one shape.

use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{kind_of, ConfigError, Result};

/// Physical format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Strict JSON.
    Json,
    /// YAML (which also covers JSON-shaped rc files).
    Yaml,
    /// `export default { ... }` or `module.exports = { ... }`.
    Module,
}

impl DocumentFormat {
    /// Picks the format from a file name.
    ///
    /// Extensionless rc files (`.commitlintrc`, `.releaserc`) may hold either
    /// JSON or YAML, so they are read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("js" | "mjs" | "cjs") => Self::Module,
            _ => Self::Yaml,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// Reads and parses a configuration file.
pub fn read_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = DocumentFormat::from_path(path);
    debug!(path = %path.display(), %format, "reading configuration document");
    parse_document(&content, format)
}

/// Parses configuration text in the given format.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(text).map_err(|e| ConfigError::syntax(e.to_string()))
        }
        DocumentFormat::Yaml => {
            let value: Option<Value> =
                serde_yaml::from_str(text).map_err(|e| ConfigError::syntax(e.to_string()))?;
            Ok(value.unwrap_or(Value::Null))
        }
        DocumentFormat::Module => parse_module(text),
    }
}

/// Reads a string or a list of strings at `field`.
pub(crate) fn string_list(value: &Value, field: &str) -> Result<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ConfigError::parse(
                        format!("{field}[{i}]"),
                        format!("expected a string, found {}", kind_of(item)),
                    )
                })
            })
            .collect(),
        _ => Err(ConfigError::parse(
            field,
            format!("expected a string or a list of strings, found {}", kind_of(value)),
        )),
    }
}

/// Reads the document root as an object; an empty document is an empty object.
pub(crate) fn root_object(value: &Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Map::new()),
        _ => Err(ConfigError::parse(
            "<root>",
            format!("expected an object, found {}", kind_of(value)),
        )),
    }
}

/// Keywords that introduce the exported object literal.
const EXPORT_MARKERS: [&str; 2] = ["export default", "module.exports"];

/// Parses the object literal a data-only ES module exports.
fn parse_module(text: &str) -> Result<Value> {
    let literal = exported_literal(text)?;
    let options = jsonc_parser::ParseOptions {
        allow_comments: true,
        allow_loose_object_property_names: true,
        allow_trailing_commas: true,
        allow_single_quoted_strings: true,
        ..jsonc_parser::ParseOptions::default()
    };
    let value = jsonc_parser::parse_to_value(literal, &options)
        .map_err(|e| ConfigError::syntax(format!("configuration module is not plain data: {e}")))?
        .ok_or_else(|| ConfigError::syntax("configuration module exports nothing"))?;
    Ok(convert_jsonc_value(value))
}

/// Slices the `{ ... }` that follows `export default` or `module.exports =`.
fn exported_literal(text: &str) -> Result<&str> {
    let (marker, at) = EXPORT_MARKERS
        .iter()
        .filter_map(|marker| text.find(marker).map(|at| (*marker, at)))
        .min_by_key(|(_, at)| *at)
        .ok_or_else(|| {
            ConfigError::syntax(
                "configuration module must contain `export default` or `module.exports =`",
            )
        })?;

    let mut rest = text[at + marker.len()..].trim_start();
    if marker == "module.exports" {
        rest = rest
            .strip_prefix('=')
            .ok_or_else(|| ConfigError::syntax("expected `=` after `module.exports`"))?
            .trim_start();
    }
    if !rest.starts_with('{') {
        return Err(ConfigError::syntax(
            "configuration module must export an object literal",
        ));
    }
    let end = rest.rfind('}').map_or(rest.len(), |i| i + 1);
    Ok(&rest[..end])
}

fn convert_jsonc_value(value: jsonc_parser::JsonValue) -> Value {
    match value {
        jsonc_parser::JsonValue::Null => Value::Null,
        jsonc_parser::JsonValue::Boolean(b) => Value::Bool(b),
        jsonc_parser::JsonValue::Number(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::Number(i.into())
            } else if let Ok(f) = n.parse::<f64>() {
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            } else {
                Value::Null
            }
        }
        jsonc_parser::JsonValue::String(s) => Value::String(s.to_string()),
        jsonc_parser::JsonValue::Array(items) => {
            Value::Array(items.into_iter().map(convert_jsonc_value).collect())
        }
        jsonc_parser::JsonValue::Object(object) => {
            let mut map = Map::new();
            for (key, value) in object {
                map.insert(key, convert_jsonc_value(value));
            }
            Value::Object(map)
        }
    }
}
