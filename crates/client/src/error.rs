use ingest_workflow::ConfigError;

/// Errors raised while setting up the HTTP collaborators.
///
/// Per-call failures are reported as `ingest_workflow::ServiceError` so the
/// workflow can record them.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience type alias for client setup.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_keep_their_message() {
        let err = ClientError::from(ConfigError::Missing { var: "INGEST_SCRIPT_ID" });
        assert!(matches!(err, ClientError::Config(_)));
        assert_eq!(err.to_string(), "INGEST_SCRIPT_ID must be set");
    }
}
