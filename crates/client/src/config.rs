use std::time::Duration;

use ingest_core::params::EMPTY_PARAMS;
use ingest_core::types::ScriptId;
use ingest_workflow::{ConfigError, WorkflowConfig};

use crate::error::ClientResult;

/// Default request timeout for a single HTTP call.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the content service, without a trailing slash.
    pub api_url: String,
    /// Bearer token sent with every request when set.
    pub api_token: Option<String>,
    /// Per-request HTTP timeout; `None` disables it.
    pub request_timeout: Option<Duration>,
    pub workflow: WorkflowConfig,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `INGEST_API_URL`              | `http://localhost:8080` |
    /// | `INGEST_API_TOKEN`            | unset                   |
    /// | `INGEST_REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `INGEST_SCRIPT_TIMEOUT_SECS`  | unset                   |
    /// | `INGEST_PERSIST_TIMEOUT_SECS` | unset                   |
    pub fn from_env() -> ClientResult<Self> {
        let mut config = Self::from_lookup(|var| std::env::var(var).ok())?;
        config.workflow = WorkflowConfig::from_env()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("INGEST_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "INGEST_API_URL",
                message: format!("expected an http(s) URL, got {api_url:?}"),
            });
        }

        let api_token = lookup("INGEST_API_TOKEN")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let request_timeout = match lookup("INGEST_REQUEST_TIMEOUT_SECS") {
            None => Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidSeconds {
                    var: "INGEST_REQUEST_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token,
            request_timeout,
            workflow: WorkflowConfig::default(),
        })
    }
}

/// What the `ingest` binary should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub script_id: ScriptId,
    /// Raw JSON parameter buffer handed to the workflow.
    pub script_params: String,
}

impl RunConfig {
    /// | Env Var                | Default  |
    /// |------------------------|----------|
    /// | `INGEST_SCRIPT_ID`     | required |
    /// | `INGEST_SCRIPT_PARAMS` | `{}`     |
    pub fn from_env() -> ClientResult<Self> {
        Ok(Self::from_lookup(|var| std::env::var(var).ok())?)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = lookup("INGEST_SCRIPT_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing {
                var: "INGEST_SCRIPT_ID",
            })?;
        let script_id = raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: "INGEST_SCRIPT_ID",
            message: format!("expected a numeric script id, got {raw:?}"),
        })?;

        Ok(Self {
            script_id,
            script_params: lookup("INGEST_SCRIPT_PARAMS").unwrap_or_else(|| EMPTY_PARAMS.into()),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(vars(&[])).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.api_token, None);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig::from_lookup(vars(&[
            ("INGEST_API_URL", "https://radio.example/ "),
            ("INGEST_API_TOKEN", "secret"),
            ("INGEST_REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://radio.example");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = ClientConfig::from_lookup(vars(&[("INGEST_API_URL", "localhost:8080")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "INGEST_API_URL", .. });
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(vars(&[("INGEST_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert_matches!(err, ConfigError::InvalidSeconds { .. });
    }

    #[test]
    fn run_config_requires_script_id() {
        assert_matches!(
            RunConfig::from_lookup(vars(&[])),
            Err(ConfigError::Missing { var: "INGEST_SCRIPT_ID" })
        );
        assert_matches!(
            RunConfig::from_lookup(vars(&[("INGEST_SCRIPT_ID", "rss")])),
            Err(ConfigError::Invalid { .. })
        );
    }

    #[test]
    fn run_config_defaults_params() {
        let run = RunConfig::from_lookup(vars(&[("INGEST_SCRIPT_ID", " 7 ")])).unwrap();
        assert_eq!(run.script_id, 7);
        assert_eq!(run.script_params, "{}");
    }
}
