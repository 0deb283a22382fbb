use tracing::{info, warn};

use crate::graph::{GraphClient, GraphErrorBody, GraphIdentity};
use crate::observability::metrics::get_metrics;
use crate::token::error::TokenError;

/// Result of a liveness probe. The probe itself never fails.
#[derive(Debug, Clone, Default)]
pub struct ProbeOutcome {
    pub live: bool,
    pub identity: Option<GraphIdentity>,
    /// remote error payload, kept for logging
    pub error: Option<GraphErrorBody>,
}

impl ProbeOutcome {
    fn live(identity: GraphIdentity) -> Self {
        Self {
            live: true,
            identity: Some(identity),
            error: None,
        }
    }

    fn dead(error: Option<GraphErrorBody>) -> Self {
        Self {
            live: false,
            identity: None,
            error,
        }
    }
}

/// Ask the identity endpoint whether `token` is accepted right now.
///
/// `role` only labels logs and metrics (`cached`, `system_user`, `minted`, ...).
pub async fn probe(graph: &GraphClient, token: &str, role: &str) -> ProbeOutcome {
    let metrics = get_metrics().await;
    match graph.me(token).await {
        Ok(identity) => {
            info!(
                "{} token is valid for: {} ({})",
                role,
                identity.name.as_deref().unwrap_or("<unnamed>"),
                identity.id
            );
            metrics.token_probes.with_label_values(&[role, "live"]).inc();
            ProbeOutcome::live(identity)
        }
        Err(err) => {
            let err = TokenError::from(err);
            warn!("{} token is not usable: {}", role, err);
            metrics.token_probes.with_label_values(&[role, err.kind()]).inc();
            match err {
                TokenError::RemoteAuth(body) => ProbeOutcome::dead(Some(body)),
                _ => ProbeOutcome::dead(None),
            }
        }
    }
}
