use std::future::Future;

use anyhow::{Context, Result};
use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::helpers::time::now_rfc3339;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::webhook::WebhookState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub webhook_state: WebhookState,
}

impl AppState {
    pub fn new(metrics: &Metrics, webhook_state: WebhookState) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            webhook_state,
        }
    }
}

/// All routes of the relay: webhook, debug routes, health and metrics.
pub fn build_router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(state.webhook_state.router())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "timestamp": now_rfc3339(),
        "message": "Webhook server is running",
    }))
}

/// Bind the configured address and serve until `shutdown` resolves.
pub async fn start(
    settings_config: &SettingsConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let metrics = get_metrics().await;
    let app = build_router(settings_config, state);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("webhook server listening on {}", bind_addr);

    metrics.up.set(1);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server failed");
    metrics.up.set(0);
    served
}
