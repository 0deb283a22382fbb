use thiserror::Error;

use crate::graph::{GraphError, GraphErrorBody};

/// Failures inside the token lifecycle. None of them escape the manager: they
/// are logged and downgraded to a failed probe or an empty strategy result.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Probe or mint call rejected: invalid or expired credential.
    #[error("remote auth error: {0}")]
    RemoteAuth(GraphErrorBody),

    /// Network failure, timeout or unusable response.
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// A strategy needs an identity input that is not configured.
    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),

    /// The env file could not be rewritten.
    #[error("failed to persist credential to '{path}': {source}")]
    PersistFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<GraphError> for TokenError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Rejected { body, .. } => TokenError::RemoteAuth(body),
            GraphError::Unavailable(msg) => TokenError::RemoteUnavailable(msg),
            GraphError::Malformed(msg) => TokenError::RemoteUnavailable(msg),
        }
    }
}

impl TokenError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::RemoteAuth(_) => "remote_auth",
            TokenError::RemoteUnavailable(_) => "remote_unavailable",
            TokenError::ConfigMissing(_) => "config_missing",
            TokenError::PersistFailure { .. } => "persist_failure",
        }
    }
}
