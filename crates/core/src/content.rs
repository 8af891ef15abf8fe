//! Content records: the form-level model, its wire shapes, and validation.
//!
//! [`ContentRecord`] is what the manual form edits and what the bulk
//! pipeline produces. [`NewContentItem`] and [`ContentPatch`] are the
//! request bodies the content store accepts, and [`ContentItem`] is what it
//! returns. On the wire the transformer list is a JSON-encoded string column.

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::error::{CoreError, CoreResult};
use crate::types::{DbId, ScriptId};

/// Node visibility applied to items that do not specify one.
pub const DEFAULT_NODE_ACCESSIBILITY: &str = "public";

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// Where the playable media lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    LocalFile,
    RemoteUrl,
}

impl ContentType {
    /// Stable string representation matching serde's `rename_all = "snake_case"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalFile => "local_file",
            Self::RemoteUrl => "remote_url",
        }
    }

    /// Parse a wire value. Unknown names return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "local_file" => Some(Self::LocalFile),
            "remote_url" => Some(Self::RemoteUrl),
            _ => None,
        }
    }

    /// Resolve the content type for loader output.
    ///
    /// An explicit, recognised type wins. Otherwise anything that carried a
    /// path or URL is treated as remote and everything else as a local file.
    pub fn derive(explicit: Option<&str>, has_path: bool) -> Self {
        match explicit.and_then(Self::parse) {
            Some(kind) => kind,
            None if has_path => Self::RemoteUrl,
            None => Self::LocalFile,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transformer attachments
// ---------------------------------------------------------------------------

/// A transformer script attached to a content item, with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerScriptRef {
    #[serde(rename = "scriptId")]
    pub script_id: ScriptId,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl TransformerScriptRef {
    pub fn new(script_id: ScriptId) -> Self {
        Self {
            script_id,
            args: Map::new(),
        }
    }
}

/// Encode a transformer list into the string column the store expects.
///
/// Empty and absent lists both encode as `None`.
pub fn encode_transformers(scripts: Option<&[TransformerScriptRef]>) -> Option<String> {
    match scripts {
        Some(list) if !list.is_empty() => serde_json::to_string(list).ok(),
        _ => None,
    }
}

/// Decode the stored string column. Unparseable text decodes to `None`.
pub fn decode_transformers(raw: Option<&str>) -> Option<Vec<TransformerScriptRef>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    serde_json::from_str::<Vec<TransformerScriptRef>>(raw)
        .ok()
        .filter(|list| !list.is_empty())
}

// ---------------------------------------------------------------------------
// ContentRecord
// ---------------------------------------------------------------------------

/// The editable content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_unique_transformers"))]
pub struct ContentRecord {
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    #[validate(length(min = 1, message = "content path must not be empty"))]
    pub content_path: String,
    pub duration_minutes: Option<i32>,
    pub tags: Option<String>,
    pub node_accessibility: Option<String>,
    pub is_dj_accessible: bool,
    pub transformer_scripts: Option<Vec<TransformerScriptRef>>,
}

impl Default for ContentRecord {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            content_type: ContentType::default(),
            content_path: String::new(),
            duration_minutes: None,
            tags: None,
            node_accessibility: Some(DEFAULT_NODE_ACCESSIBILITY.to_string()),
            is_dj_accessible: false,
            transformer_scripts: None,
        }
    }
}

fn validate_unique_transformers(record: &ContentRecord) -> Result<(), ValidationError> {
    let Some(scripts) = &record.transformer_scripts else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    for script in scripts {
        if !seen.insert(script.script_id) {
            return Err(ValidationError::new("duplicate_transformer").with_message(Cow::Owned(
                format!("transformer script {} is attached twice", script.script_id),
            )));
        }
    }
    Ok(())
}

impl ContentRecord {
    /// Check the persistence invariants (non-empty path, unique transformers).
    pub fn check(&self) -> CoreResult<()> {
        self.validate().map_err(CoreError::from)
    }

    /// Attach a transformer script. Each script may be attached once.
    pub fn attach_transformer(&mut self, script: TransformerScriptRef) -> CoreResult<()> {
        let scripts = self.transformer_scripts.get_or_insert_with(Vec::new);
        if scripts.iter().any(|s| s.script_id == script.script_id) {
            return Err(CoreError::Conflict(format!(
                "transformer script {} is already attached",
                script.script_id
            )));
        }
        scripts.push(script);
        Ok(())
    }

    /// Remove a transformer script; an emptied list collapses to `None`.
    pub fn detach_transformer(&mut self, script_id: ScriptId) -> CoreResult<TransformerScriptRef> {
        let not_found = || CoreError::NotFound {
            entity: "transformer script",
            id: script_id,
        };
        let scripts = self.transformer_scripts.as_mut().ok_or_else(not_found)?;
        let position = scripts
            .iter()
            .position(|s| s.script_id == script_id)
            .ok_or_else(not_found)?;
        let removed = scripts.remove(position);
        if scripts.is_empty() {
            self.transformer_scripts = None;
        }
        Ok(removed)
    }

    /// Replace the arguments of an attached transformer script.
    pub fn set_transformer_args(
        &mut self,
        script_id: ScriptId,
        args: Map<String, Value>,
    ) -> CoreResult<()> {
        let script = self
            .transformer_scripts
            .as_mut()
            .and_then(|list| list.iter_mut().find(|s| s.script_id == script_id))
            .ok_or(CoreError::NotFound {
                entity: "transformer script",
                id: script_id,
            })?;
        script.args = args;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Request body for creating a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContentItem {
    pub title: String,
    pub description: Option<String>,
    pub content_type: String,
    pub content_path: String,
    pub duration_minutes: Option<i32>,
    pub tags: Option<String>,
    pub node_accessibility: Option<String>,
    pub transformer_scripts: Option<String>,
    pub is_dj_accessible: bool,
}

impl From<&ContentRecord> for NewContentItem {
    fn from(record: &ContentRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            content_type: record.content_type.as_str().to_string(),
            content_path: record.content_path.clone(),
            duration_minutes: record.duration_minutes,
            tags: record.tags.clone(),
            node_accessibility: record.node_accessibility.clone(),
            transformer_scripts: encode_transformers(record.transformer_scripts.as_deref()),
            is_dj_accessible: record.is_dj_accessible,
        }
    }
}

/// Partial update for an existing content item.
///
/// An outer `None` leaves the stored value alone and is omitted from the
/// body. Nullable columns use `Option<Option<T>>`: `Some(None)` is sent as
/// `null` and clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_path: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub node_accessibility: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub transformer_scripts: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dj_accessible: Option<bool>,
}

/// Keep an explicit `null` as `Some(None)`; an absent key stays `None` via `default`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<&ContentRecord> for ContentPatch {
    /// A full replacement: every field is present, cleared ones as `null`.
    fn from(record: &ContentRecord) -> Self {
        let full = NewContentItem::from(record);
        Self {
            title: Some(full.title),
            description: Some(full.description),
            content_type: Some(full.content_type),
            content_path: Some(full.content_path),
            duration_minutes: Some(full.duration_minutes),
            tags: Some(full.tags),
            node_accessibility: Some(full.node_accessibility),
            transformer_scripts: Some(full.transformer_scripts),
            is_dj_accessible: Some(full.is_dj_accessible),
        }
    }
}

/// A persisted content item as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content_type: String,
    pub content_path: String,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub node_accessibility: Option<String>,
    #[serde(default)]
    pub transformer_scripts: Option<String>,
    #[serde(default)]
    pub is_dj_accessible: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl ContentItem {
    /// Rebuild the editable form record for this item.
    pub fn to_record(&self) -> ContentRecord {
        ContentRecord {
            title: self.title.clone(),
            description: self.description.clone(),
            content_type: ContentType::derive(
                Some(&self.content_type),
                !self.content_path.trim().is_empty(),
            ),
            content_path: self.content_path.clone(),
            duration_minutes: self.duration_minutes,
            tags: self.tags.clone(),
            node_accessibility: self.node_accessibility.clone(),
            is_dj_accessible: self.is_dj_accessible,
            transformer_scripts: decode_transformers(self.transformer_scripts.as_deref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
