//! Response extraction
//!
//! Pulls the item array and the next cursor out of a JSON response.
//! Plain dot paths (`Result.Items`, `$.Items`) are walked directly; anything
//! else is treated as a JSONPath expression.

use crate::error::{Error, Result};
use serde_json::Value;

/// Extract the item array
///
/// A missing or null field is an empty page. A field that is present but
/// not an array is a decode error. A JSONPath that can select several
/// nodes (wildcard, filter, slice, recursive descent) yields its matches
/// as the items, however many there are.
pub fn extract_items(value: &Value, path: &str) -> Result<Vec<Value>> {
    let selected = match simple_path(path) {
        Some(simple) => extract_simple_path(value, simple),
        None => {
            let mut matches = jsonpath_matches(value, path)?;
            if selects_many(path) || matches.len() != 1 {
                return Ok(matches);
            }
            matches.pop()
        }
    };

    match selected {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(Error::decode(format!(
            "expected an array at '{path}', found {}",
            kind(&other)
        ))),
    }
}

/// Extract the next cursor
///
/// Missing, null and empty values all mean "no more pages".
pub fn extract_cursor(value: &Value, path: &str) -> Result<Option<String>> {
    let selected = match simple_path(path) {
        Some(simple) => extract_simple_path(value, simple),
        None => {
            let mut matches = jsonpath_matches(value, path)?;
            if matches.len() > 1 {
                return Err(Error::decode(format!(
                    "expected one cursor at '{path}', found {} matches",
                    matches.len()
                )));
            }
            matches.pop()
        }
    };

    match selected {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s).filter(|s| !s.is_empty())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(Error::decode(format!(
            "expected a string cursor at '{path}', found {}",
            kind(&other)
        ))),
    }
}

/// The dot path to walk, if `path` is a plain one
fn simple_path(path: &str) -> Option<&str> {
    let simple = path.strip_prefix("$.").unwrap_or(path);
    let is_key_char = |c: char| c.is_alphanumeric() || c == '_' || c == '-';
    simple
        .split('.')
        .all(|part| !part.is_empty() && part.chars().all(is_key_char))
        .then_some(simple)
}

/// Whether a JSONPath can match more than one node
fn selects_many(path: &str) -> bool {
    path.contains('*') || path.contains("?(") || path.contains(':') || path.contains("..")
}

/// Walk a dot-notation path
fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let mut current = value;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current.clone())
}

/// Evaluate a JSONPath expression, returning every match
fn jsonpath_matches(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path).map_err(|e| Error::JsonPath {
        message: format!("Invalid JSONPath '{path}': {e}"),
    })?;

    match jp.find(value) {
        Value::Array(matches) => Ok(matches),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
