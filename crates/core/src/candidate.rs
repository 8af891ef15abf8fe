//! Batch candidates from loader scripts and their coercion into records.
//!
//! Loader output is untrusted. A [`CandidateRecord`] keeps the raw JSON of
//! every field the importer understands and [`CandidateRecord::to_content_record`]
//! turns it into a [`ContentRecord`] without ever failing. Whether the result
//! is persistable is decided later by the bulk pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{ContentRecord, ContentType, DEFAULT_NODE_ACCESSIBILITY};

/// Title given to candidates that do not carry one.
pub const UNTITLED: &str = "Untitled";

/// A loosely-typed element of a loader batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Value>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_path: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
}

impl CandidateRecord {
    /// Pick the known fields out of any JSON value. Non-objects yield an
    /// empty candidate.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        let field = |name: &str| map.get(name).filter(|v| !v.is_null()).cloned();
        Self {
            title: field("title"),
            description: field("description"),
            content_type: field("content_type"),
            kind: field("type"),
            content_path: field("content_path"),
            url: field("url"),
            path: field("path"),
            duration_minutes: field("duration_minutes"),
            duration: field("duration"),
            tags: field("tags"),
        }
    }

    /// The candidate's own title, if it has a usable one.
    pub fn raw_title(&self) -> Option<String> {
        self.title.as_ref().and_then(text)
    }

    /// Title shown in review lists and reports.
    pub fn display_title(&self) -> String {
        self.raw_title().unwrap_or_else(|| UNTITLED.to_string())
    }

    /// First usable location: `path`, then `url`, then `content_path`.
    ///
    /// Values are trimmed and a blank string counts as absent, so
    /// `{"path": "", "url": "http://x"}` resolves to the url.
    pub fn source(&self) -> Option<String> {
        [&self.path, &self.url, &self.content_path]
            .into_iter()
            .find_map(|v| v.as_ref().and_then(text))
    }

    /// Coerce into a record for bulk persistence.
    ///
    /// Manual-entry-only fields get fixed values: public accessibility, not
    /// DJ-accessible, no transformers.
    pub fn to_content_record(&self) -> ContentRecord {
        let content_path = self.source().unwrap_or_default();
        let explicit_type = [&self.content_type, &self.kind]
            .into_iter()
            .find_map(|v| v.as_ref().and_then(text));
        let duration = [&self.duration_minutes, &self.duration]
            .into_iter()
            .find_map(|v| v.as_ref().and_then(minutes))
            .unwrap_or(0);

        ContentRecord {
            title: self.display_title(),
            description: self.description.as_ref().and_then(text),
            content_type: ContentType::derive(explicit_type.as_deref(), !content_path.is_empty()),
            content_path,
            duration_minutes: Some(duration),
            tags: self.tags.as_ref().and_then(tag_list),
            node_accessibility: Some(DEFAULT_NODE_ACCESSIBILITY.to_string()),
            is_dj_accessible: false,
            transformer_scripts: None,
        }
    }
}

impl From<&Value> for CandidateRecord {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Non-blank text. Numbers and booleans are rendered; containers are ignored.
pub(crate) fn text(value: &Value) -> Option<String> {
    let rendered = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!rendered.is_empty()).then_some(rendered)
}

/// Whole minutes from a number or numeric string, rounded half away from zero.
pub(crate) fn minutes(value: &Value) -> Option<i32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    let rounded = raw.round();
    (rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64).then_some(rounded as i32)
}

fn tag_list(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let joined = items.iter().filter_map(text).collect::<Vec<_>>().join(",");
            (!joined.is_empty()).then_some(joined)
        }
        other => text(other),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
