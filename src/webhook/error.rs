use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::graph::GraphError;

/// Failures while handling a single lead. The processor logs them and moves
/// on to the next lead of the batch.
#[derive(Debug, Error)]
pub enum LeadError {
    #[error("no page access token available")]
    NoCredential,

    /// Graph object ids are numeric; anything else would address another endpoint.
    #[error("lead id '{0}' is not a graph object id")]
    InvalidLeadId(String),

    #[error("failed to fetch lead {lead_id}: {source}")]
    Fetch {
        lead_id: String,
        #[source]
        source: GraphError,
    },

    #[error("crm answered with status {status}: {body}")]
    CrmRejected { status: u16, body: String },

    #[error("crm unreachable: {0}")]
    CrmUnavailable(#[from] reqwest::Error),
}

impl LeadError {
    pub fn kind(&self) -> &'static str {
        match self {
            LeadError::NoCredential => "no_credential",
            LeadError::InvalidLeadId(_) => "invalid_id",
            LeadError::Fetch { .. } => "fetch_failed",
            LeadError::CrmRejected { .. } => "crm_rejected",
            LeadError::CrmUnavailable(_) => "crm_unavailable",
        }
    }
}

/// Request-level failures of the webhook routes.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("verification failed")]
    VerificationFailed,

    #[error("unsupported object '{0}'")]
    UnsupportedObject(String),

    #[error("invalid event body: {0}")]
    InvalidBody(String),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::VerificationFailed => StatusCode::FORBIDDEN,
            WebhookError::UnsupportedObject(_) => StatusCode::NOT_FOUND,
            WebhookError::InvalidBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}
