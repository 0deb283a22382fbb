use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::webhook::WebhookConfig;
use crate::helpers::time::now_rfc3339;
use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;
use crate::webhook::error::WebhookError;
use crate::webhook::payload::{sample_leadgen_event, VerifyQuery, WebhookEvent, PAGE_OBJECT};
use crate::webhook::processor::LeadProcessor;

const SUBSCRIBE_MODE: &str = "subscribe";
const EVENT_RECEIVED: &str = "EVENT_RECEIVED";
const SIGNATURE_HEADER: &str = "x-hub-signature";

#[derive(Clone)]
pub struct WebhookState {
    path: String,
    verify_token: String,
    processor: LeadProcessor,
}

impl WebhookState {
    pub fn new(cfg: &WebhookConfig, processor: LeadProcessor) -> Self {
        Self {
            path: cfg.path.clone(),
            verify_token: cfg.verify_token.clone(),
            processor,
        }
    }

    pub fn processor(&self) -> &LeadProcessor {
        &self.processor
    }

    pub fn router(&self) -> Router<AppState> {
        info!("served path: {}", self.path);
        Router::new()
            .route(self.path.as_str(), get(verify).post(receive))
            .route("/check-subscriptions", get(check_subscriptions))
            .route("/test-webhook", post(test_webhook))
            .route("/debug-webhook", get(debug_webhook))
    }

    fn verify(&self, query: &VerifyQuery) -> Result<String, WebhookError> {
        match (query.mode.as_deref(), query.verify_token.as_deref()) {
            (Some(SUBSCRIBE_MODE), Some(token)) if token == self.verify_token => {
                Ok(query.challenge.clone().unwrap_or_default())
            }
            _ => Err(WebhookError::VerificationFailed),
        }
    }
}

/// Subscription handshake: echo `hub.challenge` when the verify token matches.
async fn verify(State(state): State<AppState>, Query(query): Query<VerifyQuery>) -> Response {
    let response = match state.webhook_state.verify(&query) {
        Ok(challenge) => {
            info!("webhook verified");
            (StatusCode::OK, challenge).into_response()
        }
        Err(e) => {
            warn!("webhook {} (mode {:?})", e, query.mode);
            e.into_response()
        }
    };
    count(response.status(), "GET").await;
    response
}

/// Event delivery. The body is parsed by hand so an unreadable payload maps to 500.
async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) {
        info!("webhook signature: {}", signature);
    }

    let response = match handle_event(&state.webhook_state, &body).await {
        Ok(()) => (StatusCode::OK, EVENT_RECEIVED).into_response(),
        Err(e) => {
            error!("webhook delivery rejected: {}", e);
            e.into_response()
        }
    };
    count(response.status(), "POST").await;
    response
}

async fn handle_event(state: &WebhookState, body: &[u8]) -> Result<(), WebhookError> {
    let event: WebhookEvent =
        serde_json::from_slice(body).map_err(|e| WebhookError::InvalidBody(e.to_string()))?;

    if event.object != PAGE_OBJECT {
        return Err(WebhookError::UnsupportedObject(event.object));
    }

    let summary = state.processor.process_event(&event).await;
    info!(
        "batch done: {} forwarded, {} skipped, {} failed",
        summary.forwarded, summary.skipped, summary.failed
    );
    Ok(())
}

/// Relays `GET /me/subscribed_apps` for the current page token.
async fn check_subscriptions(State(state): State<AppState>) -> Response {
    let processor = state.webhook_state.processor();
    let Some(credential) = processor.tokens().get_valid_token().await else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "no page access token available" })),
        )
            .into_response();
    };

    match processor.graph().subscribed_apps(credential.secret()).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            error!("subscription check failed: {}", e);
            let detail = match e.body() {
                Some(body) => json!(body),
                None => json!(e.to_string()),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": detail }))).into_response()
        }
    }
}

/// Server summary plus the page the current token acts as.
async fn debug_webhook(State(state): State<AppState>) -> Response {
    let webhook = &state.webhook_state;
    let tokens = webhook.processor().tokens();
    let credential = tokens.get_valid_token().await;

    let mut facebook = json!({ "page_id": null, "page_name": null });
    if let Some(credential) = &credential {
        match webhook.processor().graph().me(credential.secret()).await {
            Ok(identity) => {
                facebook["page_id"] = json!(identity.id);
                facebook["page_name"] = json!(identity.name);
            }
            Err(e) => {
                warn!("debug identity lookup failed: {}", e);
                facebook["error"] = match e.body() {
                    Some(body) => json!(body),
                    None => json!(e.to_string()),
                };
            }
        }
    }

    Json(json!({
        "server": {
            "webhook_path": webhook.path,
            "has_page_token": credential.is_some(),
            "token": credential.as_ref().map(|c| c.preview()),
            "refresh_interval_seconds": tokens.refresh_interval().as_secs(),
            "timestamp": now_rfc3339(),
        },
        "facebook": facebook,
    }))
    .into_response()
}

/// Sample leadgen delivery for manual debugging. Nothing is processed.
async fn test_webhook(body: Bytes) -> Response {
    info!("test webhook payload: {}", String::from_utf8_lossy(&body));
    Json(json!({
        "status": "success",
        "message": "Test webhook endpoint working",
        "testPayload": sample_leadgen_event(),
    }))
    .into_response()
}

/// Takes the status only: a `Response` must not be held across the metrics await.
async fn count(status: StatusCode, method: &str) {
    get_metrics()
        .await
        .webhook_requests
        .with_label_values(&[method, status.as_str()])
        .inc();
}
