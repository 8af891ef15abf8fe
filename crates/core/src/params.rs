//! Script parameter resolution.
//!
//! The parameter buffer is free-form JSON text until the loader is run.
//! Reading it is best effort: a buffer that does not parse yields empty
//! field values rather than an error. Only [`parse_params`], used right
//! before execution, is strict.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Buffer used when a script is first selected.
pub const EMPTY_PARAMS: &str = "{}";

/// One editable text field derived from a parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamField {
    pub name: String,
    pub label: String,
    pub value: String,
}

/// Fields for a script's schema plus the currently parsed parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParams {
    pub fields: Vec<ParamField>,
    pub params: Map<String, Value>,
}

/// The parameter buffer could not be turned into a parameter object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("Invalid JSON parameters: {0}")]
    InvalidJson(String),

    #[error("Parameters must be a JSON object")]
    NotAnObject,
}

/// Build form fields for `schema` and read their values from `current_params`.
///
/// A missing or unparseable schema produces no fields, which tells the
/// caller to fall back to raw JSON editing.
pub fn resolve(schema: Option<&str>, current_params: &str) -> ResolvedParams {
    let params = read_object(current_params).unwrap_or_default();

    let fields = schema_properties(schema)
        .map(|keys| {
            keys.into_iter()
                .map(|name| {
                    let value = params.get(&name).map(display_value).unwrap_or_default();
                    ParamField {
                        label: humanize(&name),
                        name,
                        value,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    ResolvedParams { fields, params }
}

/// Set one field and re-serialize the whole parameter object.
///
/// When the existing buffer is not a JSON object the result holds only the
/// edited key.
pub fn set_field(current_params: &str, name: &str, value: &str) -> String {
    let mut params = read_object(current_params).unwrap_or_default();
    params.insert(name.to_string(), Value::String(value.to_string()));
    serde_json::to_string_pretty(&Value::Object(params)).unwrap_or_else(|_| EMPTY_PARAMS.into())
}

/// Strictly parse the buffer for submission. Blank text means no parameters.
pub fn parse_params(text: &str) -> Result<Map<String, Value>, ParameterError> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ParameterError::NotAnObject),
        Err(e) => Err(ParameterError::InvalidJson(e.to_string())),
    }
}

/// Title-case a parameter key: `max_items` becomes `Max Items`.
pub fn humanize(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn read_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn schema_properties(schema: Option<&str>) -> Option<Vec<String>> {
    let parsed = read_object(schema?)?;
    let keys = match parsed.get("properties") {
        Some(Value::Object(properties)) => properties.keys().cloned().collect(),
        _ => parsed.keys().cloned().collect(),
    };
    Some(keys)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
