//! Script runner adapter.
//!
//! Normalizes a loader execution into either the raw output text or a
//! displayable error. The runner holds no state between calls and is safe
//! to retry.

use std::sync::Arc;
use std::time::Duration;

use ingest_core::params::{parse_params, ParameterError};
use ingest_core::types::ScriptId;

use crate::services::ScriptService;

/// Message used when the service reports failure without one.
pub const EXECUTION_FAILED: &str = "Execution failed";

/// Message used when a successful execution carries no output.
pub const NO_OUTPUT: &str = "Script returned no output";

/// Why a loader run produced no payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    /// The parameter buffer was rejected before invoking the script.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// The service ran the script and reported failure.
    #[error("{0}")]
    Execution(String),

    /// The service could not be reached or answered with an error status.
    #[error("{0}")]
    Transport(String),

    #[error("Script execution timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Runs loader scripts through a [`ScriptService`].
#[derive(Clone)]
pub struct ScriptRunner {
    service: Arc<dyn ScriptService>,
    timeout: Option<Duration>,
}

impl ScriptRunner {
    pub fn new(service: Arc<dyn ScriptService>, timeout: Option<Duration>) -> Self {
        Self { service, timeout }
    }

    /// Execute `script_id` with the JSON parameter buffer `params_text`.
    ///
    /// Returns the script's JSON output text on success.
    pub async fn run(&self, script_id: ScriptId, params_text: &str) -> Result<String, RunnerError> {
        let params = parse_params(params_text)?;

        tracing::debug!(script_id, param_count = params.len(), "Executing loader script");

        let call = self.service.execute_script(script_id, &params);
        let reply = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| RunnerError::TimedOut(limit))?,
            None => call.await,
        };

        let result = reply.map_err(|e| {
            tracing::warn!(script_id, error = %e, "Script service call failed");
            RunnerError::Transport(e.detail())
        })?;

        if !result.success {
            let message = result
                .error
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| EXECUTION_FAILED.to_string());
            tracing::warn!(script_id, error = %message, "Loader script reported failure");
            return Err(RunnerError::Execution(message));
        }

        result
            .result
            .ok_or_else(|| RunnerError::Execution(NO_OUTPUT.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use ingest_core::script::{ExecutionResult, LoaderScript};
    use serde_json::{Map, Value};

    use super::*;
    use crate::services::ServiceError;

    /// Replies with a fixed result and counts calls.
    struct Canned {
        reply: Result<ExecutionResult, ServiceError>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl Canned {
        fn new(reply: Result<ExecutionResult, ServiceError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                delay: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ScriptService for Canned {
        async fn execute_script(
            &self,
            _script_id: ScriptId,
            _params: &Map<String, Value>,
        ) -> Result<ExecutionResult, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone()
        }

        async fn list_scripts(&self) -> Result<Vec<LoaderScript>, ServiceError> {
            Ok(vec![])
        }
    }

    fn ok(result: &str) -> Result<ExecutionResult, ServiceError> {
        Ok(ExecutionResult {
            success: true,
            result: Some(result.to_string()),
            error: None,
        })
    }

    #[tokio::test]
    async fn returns_payload_on_success() {
        let service = Canned::new(ok(r#"[{"title": "A"}]"#));
        let runner = ScriptRunner::new(service.clone(), None);
        let payload = runner.run(1, r#"{"limit": "5"}"#).await.unwrap();
        assert_eq!(payload, r#"[{"title": "A"}]"#);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_params_skip_the_service() {
        let service = Canned::new(ok("{}"));
        let runner = ScriptRunner::new(service.clone(), None);
        let err = runner.run(1, "{broken").await.unwrap_err();
        assert_matches!(err, RunnerError::Parameter(ParameterError::InvalidJson(_)));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_without_message_uses_default() {
        let service = Canned::new(Ok(ExecutionResult::default()));
        let runner = ScriptRunner::new(service, None);
        let err = runner.run(1, "{}").await.unwrap_err();
        assert_eq!(err, RunnerError::Execution("Execution failed".into()));
    }

    #[tokio::test]
    async fn failure_message_is_passed_through() {
        let service = Canned::new(Ok(ExecutionResult {
            success: false,
            result: None,
            error: Some("Runtime Error: feed unreachable".into()),
        }));
        let runner = ScriptRunner::new(service, None);
        let err = runner.run(1, "{}").await.unwrap_err();
        assert_eq!(err.to_string(), "Runtime Error: feed unreachable");
    }

    #[tokio::test]
    async fn transport_errors_are_stringified() {
        let service = Canned::new(Err(ServiceError::Transport("connection refused".into())));
        let runner = ScriptRunner::new(service, None);
        let err = runner.run(1, "{}").await.unwrap_err();
        assert_eq!(err, RunnerError::Transport("connection refused".into()));
    }

    #[tokio::test]
    async fn success_without_output_is_an_error() {
        let service = Canned::new(Ok(ExecutionResult {
            success: true,
            result: None,
            error: None,
        }));
        let runner = ScriptRunner::new(service, None);
        assert_eq!(
            runner.run(1, "{}").await.unwrap_err(),
            RunnerError::Execution(NO_OUTPUT.into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_service_times_out() {
        let service = Arc::new(Canned {
            reply: ok("{}"),
            delay: Some(Duration::from_secs(60)),
            calls: AtomicUsize::new(0),
        });
        let runner = ScriptRunner::new(service, Some(Duration::from_secs(5)));
        let err = runner.run(1, "{}").await.unwrap_err();
        assert_eq!(err, RunnerError::TimedOut(Duration::from_secs(5)));
        assert_eq!(err.to_string(), "Script execution timed out after 5s");
    }
}
