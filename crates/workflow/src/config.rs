use std::time::Duration;

/// Workflow configuration loaded from environment variables.
///
/// Both timeouts are off by default: a stuck collaborator call then blocks
/// the workflow until it returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Upper bound for one loader script execution.
    pub script_timeout: Option<Duration>,
    /// Upper bound for one persistence call during a bulk import.
    pub persist_timeout: Option<Duration>,
}

/// A configuration variable held a value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{var} must be set")]
    Missing { var: &'static str },

    #[error("{var} is invalid: {message}")]
    Invalid { var: &'static str, message: String },
}

impl WorkflowConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                       | Default      |
    /// |-------------------------------|--------------|
    /// | `INGEST_SCRIPT_TIMEOUT_SECS`  | unset (none) |
    /// | `INGEST_PERSIST_TIMEOUT_SECS` | unset (none) |
    ///
    /// `0` also disables a timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            script_timeout: optional_secs("INGEST_SCRIPT_TIMEOUT_SECS")?,
            persist_timeout: optional_secs("INGEST_PERSIST_TIMEOUT_SECS")?,
        })
    }
}

/// Read an optional whole-seconds duration; unset, blank and `0` mean none.
pub fn optional_secs(var: &'static str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => parse_secs(var, &raw),
        Err(_) => Ok(None),
    }
}

fn parse_secs(var: &'static str, raw: &str) -> Result<Option<Duration>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let secs: u64 = trimmed.parse().map_err(|_| ConfigError::InvalidSeconds {
        var,
        value: raw.to_string(),
    })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
