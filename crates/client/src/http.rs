//! HTTP implementations of the workflow collaborators.
//!
//! [`ApiClient`] owns one `reqwest::Client` and the service base URL. The
//! two service types are thin wrappers that map their trait methods onto
//! REST endpoints:
//!
//! | Operation | Request                                   |
//! |-----------|-------------------------------------------|
//! | execute   | `POST /api/scripts/{id}/execute`          |
//! | list      | `GET  /api/scripts`                       |
//! | create    | `POST /api/content`                       |
//! | update    | `PUT  /api/content/{id}`                  |

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use ingest_core::content::{ContentItem, ContentPatch, ContentRecord, NewContentItem};
use ingest_core::script::{ExecutionResult, LoaderScript};
use ingest_core::types::{DbId, ScriptId};
use ingest_workflow::{ContentStore, ScriptService, ServiceError};

use crate::config::ClientConfig;
use crate::error::ClientResult;

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Shared HTTP plumbing for the content service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "Sending API request");
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode a 2xx JSON reply.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ServiceError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                body: error_body(&text),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Transport(format!("Invalid response body: {e}")))
    }
}

/// Error text of a failed reply: the JSON `"error"` field, else the raw text.
fn error_body(text: &str) -> Option<String> {
    if let Ok(Value::Object(body)) = serde_json::from_str::<Value>(text) {
        if let Some(Value::String(message)) = body.get("error") {
            return Some(message.clone());
        }
    }
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Script service
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    params: &'a Map<String, Value>,
}

/// Script registry and execution over HTTP.
#[derive(Debug, Clone)]
pub struct HttpScriptService {
    api: ApiClient,
}

impl HttpScriptService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ScriptService for HttpScriptService {
    async fn execute_script(
        &self,
        script_id: ScriptId,
        params: &Map<String, Value>,
    ) -> Result<ExecutionResult, ServiceError> {
        let request = self
            .api
            .request(Method::POST, &format!("/api/scripts/{script_id}/execute"))
            .json(&ExecuteRequest { params });
        self.api.send(request).await
    }

    async fn list_scripts(&self) -> Result<Vec<LoaderScript>, ServiceError> {
        self.api
            .send(self.api.request(Method::GET, "/api/scripts"))
            .await
    }
}

// ---------------------------------------------------------------------------
// Content store
// ---------------------------------------------------------------------------

/// Content persistence over HTTP.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    api: ApiClient,
}

impl HttpContentStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn create_content(&self, record: &ContentRecord) -> Result<ContentItem, ServiceError> {
        let request = self
            .api
            .request(Method::POST, "/api/content")
            .json(&NewContentItem::from(record));
        self.api.send(request).await
    }

    async fn update_content(
        &self,
        id: DbId,
        patch: &ContentPatch,
    ) -> Result<ContentItem, ServiceError> {
        let request = self
            .api
            .request(Method::PUT, &format!("/api/content/{id}"))
            .json(patch);
        self.api.send(request).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
