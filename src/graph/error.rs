use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error object returned by the Graph API under the top-level `error` key.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GraphErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error_subcode: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

impl std::fmt::Display for GraphErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.error_type, self.code) {
            (Some(t), Some(code)) => write!(f, "{} ({} #{})", self.message, t, code),
            (None, Some(code)) => write!(f, "{} (#{})", self.message, code),
            (Some(t), None) => write!(f, "{} ({})", self.message, t),
            (None, None) => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorEnvelope {
    pub error: GraphErrorBody,
}

#[derive(Debug, Error)]
pub enum GraphError {
    /// The API answered and refused the call, usually an invalid or expired credential.
    #[error("graph api rejected the call with status {status}: {body}")]
    Rejected { status: u16, body: GraphErrorBody },

    /// Network failure, timeout or a server-side outage.
    #[error("graph api unavailable: {0}")]
    Unavailable(String),

    /// A 2xx answer that does not carry what the call is for.
    #[error("unexpected graph api response: {0}")]
    Malformed(String),
}

impl GraphError {
    pub fn body(&self) -> Option<&GraphErrorBody> {
        match self {
            GraphError::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GraphError::Unavailable(format!("timeout: {}", err))
        } else if err.is_decode() {
            GraphError::Malformed(err.to_string())
        } else {
            GraphError::Unavailable(err.to_string())
        }
    }
}
