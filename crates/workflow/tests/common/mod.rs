#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use ingest_core::content::{ContentItem, ContentPatch, ContentRecord};
use ingest_core::script::{ExecutionResult, LoaderScript, ScriptType};
use ingest_core::types::{DbId, ScriptId};
use ingest_workflow::{ContentStore, ImportWorkflow, ScriptService, ServiceError, WorkflowConfig};

/// Script service that replays queued replies and records every call.
#[derive(Default)]
pub struct FakeScripts {
    pub scripts: Vec<LoaderScript>,
    replies: Mutex<VecDeque<Result<ExecutionResult, ServiceError>>>,
    pub calls: Mutex<Vec<(ScriptId, Map<String, Value>)>>,
}

impl FakeScripts {
    pub fn with_scripts(scripts: Vec<LoaderScript>) -> Self {
        Self {
            scripts,
            ..Default::default()
        }
    }

    /// Queue a successful execution that prints `output`.
    pub fn push_output(&self, output: &str) {
        self.push(Ok(ExecutionResult {
            success: true,
            result: Some(output.to_string()),
            error: None,
        }));
    }

    pub fn push(&self, reply: Result<ExecutionResult, ServiceError>) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl ScriptService for FakeScripts {
    async fn execute_script(
        &self,
        script_id: ScriptId,
        params: &Map<String, Value>,
    ) -> Result<ExecutionResult, ServiceError> {
        self.calls.lock().unwrap().push((script_id, params.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Transport("no reply queued".into())))
    }

    async fn list_scripts(&self) -> Result<Vec<LoaderScript>, ServiceError> {
        Ok(self.scripts.clone())
    }
}

/// Content store that keeps created records and rejects listed titles.
#[derive(Default)]
pub struct FakeStore {
    pub reject_titles: Vec<String>,
    /// Every manual or bulk submission fails with this status when set.
    pub fail_status: Option<u16>,
    pub created: Mutex<Vec<ContentRecord>>,
    pub updated: Mutex<Vec<(DbId, ContentPatch)>>,
}

impl FakeStore {
    pub fn rejecting(titles: &[&str]) -> Self {
        Self {
            reject_titles: titles.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn created_titles(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.title.clone())
            .collect()
    }

    fn check(&self, title: &str) -> Result<(), ServiceError> {
        if let Some(status) = self.fail_status {
            return Err(ServiceError::Rejected { status, body: None });
        }
        if self.reject_titles.iter().any(|t| t == title) {
            return Err(ServiceError::Rejected {
                status: 409,
                body: Some(format!("{title} already exists")),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for FakeStore {
    async fn create_content(&self, record: &ContentRecord) -> Result<ContentItem, ServiceError> {
        self.check(&record.title)?;
        let mut created = self.created.lock().unwrap();
        created.push(record.clone());
        Ok(item(created.len() as DbId, record))
    }

    async fn update_content(
        &self,
        id: DbId,
        patch: &ContentPatch,
    ) -> Result<ContentItem, ServiceError> {
        let title = patch.title.clone().unwrap_or_default();
        self.check(&title)?;
        self.updated.lock().unwrap().push((id, patch.clone()));
        Ok(ContentItem {
            id,
            title,
            description: patch.description.clone().flatten(),
            content_type: patch.content_type.clone().unwrap_or_default(),
            content_path: patch.content_path.clone().unwrap_or_default(),
            duration_minutes: patch.duration_minutes.flatten(),
            tags: patch.tags.clone().flatten(),
            node_accessibility: patch.node_accessibility.clone().flatten(),
            transformer_scripts: patch.transformer_scripts.clone().flatten(),
            is_dj_accessible: patch.is_dj_accessible.unwrap_or(false),
            created_at: None,
            updated_at: None,
        })
    }
}

pub fn item(id: DbId, record: &ContentRecord) -> ContentItem {
    ContentItem {
        id,
        title: record.title.clone(),
        description: record.description.clone(),
        content_type: record.content_type.as_str().to_string(),
        content_path: record.content_path.clone(),
        duration_minutes: record.duration_minutes,
        tags: record.tags.clone(),
        node_accessibility: record.node_accessibility.clone(),
        transformer_scripts: None,
        is_dj_accessible: record.is_dj_accessible,
        created_at: None,
        updated_at: None,
    }
}

pub fn script(id: ScriptId, name: &str, script_type: ScriptType, schema: Option<&str>) -> LoaderScript {
    LoaderScript {
        id,
        name: name.to_string(),
        script_type,
        parameters_schema: schema.map(str::to_string),
    }
}

/// The standard registry: one loader with a schema, one transformer.
pub fn registry() -> Vec<LoaderScript> {
    vec![
        script(
            7,
            "RSS Loader",
            ScriptType::ContentLoader,
            Some(r#"{"properties": {"feed_url": {"type": "string"}, "limit": {"type": "integer"}}}"#),
        ),
        script(9, "Loudness", ScriptType::Transformer, None),
    ]
}

/// Build a controller over the given fakes with scripts already loaded.
pub fn workflow(scripts: Arc<FakeScripts>, store: Arc<FakeStore>) -> ImportWorkflow {
    let mut workflow = ImportWorkflow::new(scripts.clone(), store, WorkflowConfig::default());
    workflow.set_scripts(scripts.scripts.clone());
    workflow
}
