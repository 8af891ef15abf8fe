//! Loader output classification.
//!
//! A loader script returns JSON text. An object describes one item that is
//! merged into the manual form; an array is a batch that goes to bulk
//! review. Anything else is rejected with a message suitable for display.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::candidate::{minutes, text, CandidateRecord};
use crate::content::{ContentRecord, ContentType};

/// Why loader output could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("Failed to parse script output: {0}")]
    Unparseable(String),

    #[error("Script returned an empty list.")]
    EmptyBatch,

    #[error("Script returned neither an object nor a list.")]
    UnsupportedShape,
}

/// Classified loader output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum LoaderOutput {
    SingleItem(ContentDraft),
    ItemBatch(Vec<CandidateRecord>),
}

/// Fields a single-item loader run contributes to the manual form.
///
/// `None` means the script did not mention the field and the form keeps
/// what it had. The content type is always derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content_path: Option<String>,
    pub duration_minutes: Option<i32>,
    pub content_type: ContentType,
}

impl ContentDraft {
    fn from_object(data: &Map<String, Value>) -> Self {
        let get = |name: &str| data.get(name).and_then(text);
        let content_path = get("path").or_else(|| get("url"));
        let duration_minutes = ["duration_minutes", "duration"]
            .into_iter()
            .find_map(|name| data.get(name).and_then(minutes));
        let content_type = ContentType::derive(get("type").as_deref(), content_path.is_some());

        Self {
            title: get("title"),
            description: get("description"),
            content_path,
            duration_minutes,
            content_type,
        }
    }

    /// Overlay this draft onto the form without clearing untouched fields.
    pub fn merge_into(&self, form: &mut ContentRecord) {
        if let Some(title) = &self.title {
            form.title = title.clone();
        }
        if let Some(description) = &self.description {
            form.description = Some(description.clone());
        }
        if let Some(path) = &self.content_path {
            form.content_path = path.clone();
        }
        if let Some(duration) = self.duration_minutes {
            form.duration_minutes = Some(duration);
        }
        form.content_type = self.content_type;
    }
}

/// Parse and classify a loader payload.
pub fn classify(payload: &str) -> Result<LoaderOutput, ClassificationError> {
    let parsed: Value = serde_json::from_str(payload)
        .map_err(|e| ClassificationError::Unparseable(e.to_string()))?;

    match parsed {
        Value::Array(items) if items.is_empty() => Err(ClassificationError::EmptyBatch),
        Value::Array(items) => Ok(LoaderOutput::ItemBatch(
            items.iter().map(CandidateRecord::from).collect(),
        )),
        Value::Object(data) => Ok(LoaderOutput::SingleItem(ContentDraft::from_object(&data))),
        _ => Err(ClassificationError::UnsupportedShape),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn non_empty_array_is_a_batch() {
        let output = classify(r#"[{"title": "A"}, {"title": "B"}, 3]"#).unwrap();
        assert_matches!(output, LoaderOutput::ItemBatch(items) if items.len() == 3);
    }

    #[test]
    fn single_element_array_is_still_a_batch() {
        assert_matches!(classify(r#"[{}]"#), Ok(LoaderOutput::ItemBatch(items)) if items.len() == 1);
    }

    #[test]
    fn empty_array_is_rejected() {
        let err = classify("[]").unwrap_err();
        assert_eq!(err, ClassificationError::EmptyBatch);
        assert_eq!(err.to_string(), "Script returned an empty list.");
    }

    #[test]
    fn garbage_is_unparseable() {
        let err = classify("Script executed successfully").unwrap_err();
        assert_matches!(err, ClassificationError::Unparseable(_));
        assert!(err.to_string().starts_with("Failed to parse script output"));
    }

    #[test]
    fn scalars_are_rejected() {
        assert_eq!(classify("42"), Err(ClassificationError::UnsupportedShape));
        assert_eq!(classify("null"), Err(ClassificationError::UnsupportedShape));
    }

    #[test]
    fn object_fields_are_derived() {
        let output = classify(
            r#"{"title": "Podcast", "url": "http://x/p.mp3", "duration": 41.6, "description": "ep 1"}"#,
        )
        .unwrap();
        let LoaderOutput::SingleItem(draft) = output else {
            panic!("expected a single item");
        };
        assert_eq!(draft.title.as_deref(), Some("Podcast"));
        assert_eq!(draft.description.as_deref(), Some("ep 1"));
        assert_eq!(draft.content_path.as_deref(), Some("http://x/p.mp3"));
        assert_eq!(draft.duration_minutes, Some(42));
        assert_eq!(draft.content_type, ContentType::RemoteUrl);
    }

    #[test]
    fn path_preferred_over_url() {
        let Ok(LoaderOutput::SingleItem(draft)) = classify(r#"{"path": "/a", "url": "http://b"}"#)
        else {
            panic!("expected a single item");
        };
        assert_eq!(draft.content_path.as_deref(), Some("/a"));
    }

    #[test]
    fn explicit_type_is_kept() {
        let Ok(LoaderOutput::SingleItem(draft)) =
            classify(r#"{"type": "local_file", "path": "/media/a.mkv"}"#)
        else {
            panic!("expected a single item");
        };
        assert_eq!(draft.content_type, ContentType::LocalFile);
    }

    #[test]
    fn merge_is_non_destructive() {
        let mut form = ContentRecord {
            title: "A".into(),
            content_path: "old".into(),
            ..Default::default()
        };
        let Ok(LoaderOutput::SingleItem(draft)) = classify(r#"{"description": "hi"}"#) else {
            panic!("expected a single item");
        };
        draft.merge_into(&mut form);
        assert_eq!(form.title, "A");
        assert_eq!(form.content_path, "old");
        assert_eq!(form.description.as_deref(), Some("hi"));
    }

    #[test]
    fn merge_overwrites_mentioned_fields() {
        let mut form = ContentRecord {
            title: "Old".into(),
            duration_minutes: Some(5),
            ..Default::default()
        };
        let draft = ContentDraft {
            title: Some("New".into()),
            duration_minutes: Some(9),
            ..Default::default()
        };
        draft.merge_into(&mut form);
        assert_eq!(form.title, "New");
        assert_eq!(form.duration_minutes, Some(9));
    }
}
