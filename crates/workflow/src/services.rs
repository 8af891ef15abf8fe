//! Collaborator contracts consumed by the workflow.
//!
//! The controller only knows these traits. Transport (HTTP, IPC, in-process)
//! is the implementor's concern; see `ingest-client` for the HTTP version.

use async_trait::async_trait;
use serde_json::{Map, Value};

use ingest_core::content::{ContentItem, ContentPatch, ContentRecord};
use ingest_core::outcome::UNKNOWN_ERROR;
use ingest_core::script::{ExecutionResult, LoaderScript};
use ingest_core::types::{DbId, ScriptId};

/// A collaborator call that did not produce a usable reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service answered with an error status.
    #[error("Request failed with status {status}")]
    Rejected {
        status: u16,
        /// Error text from the response body, if any.
        body: Option<String>,
    },

    /// The call never reached the service or its reply was unreadable.
    #[error("{0}")]
    Transport(String),
}

impl ServiceError {
    /// Best available message for reports: the response error text, else
    /// the generic message, else `"Unknown error"`.
    pub fn detail(&self) -> String {
        match self {
            Self::Rejected {
                body: Some(text), ..
            } if !text.trim().is_empty() => text.trim().to_string(),
            Self::Transport(message) if message.trim().is_empty() => UNKNOWN_ERROR.to_string(),
            other => other.to_string(),
        }
    }
}

/// Script registry and execution.
#[async_trait]
pub trait ScriptService: Send + Sync {
    /// Run a script with the given parameter object.
    async fn execute_script(
        &self,
        script_id: ScriptId,
        params: &Map<String, Value>,
    ) -> Result<ExecutionResult, ServiceError>;

    /// List every registered script.
    async fn list_scripts(&self) -> Result<Vec<LoaderScript>, ServiceError>;
}

/// Content persistence.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_content(&self, record: &ContentRecord) -> Result<ContentItem, ServiceError>;

    async fn update_content(
        &self,
        id: DbId,
        patch: &ContentPatch,
    ) -> Result<ContentItem, ServiceError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
