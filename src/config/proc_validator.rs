//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates:
//!   * server / logging / metrics / http client / retry invariants
//!   * Graph API and CRM urls
//!   * that at least one page-token acquisition path is configured
//!   * webhook route and verify token

use tracing::{error, info, warn};

use crate::config::service::ServiceConfig;
use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::config::token::{GraphConfig, TokenConfig};
use crate::config::webhook::{CrmConfig, WebhookConfig};
use crate::observability::metrics::get_metrics;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_graph(&cfg.graph, &mut errors);
    validate_token(&cfg.token, &mut errors);
    validate_webhook(&cfg.webhook, &mut errors);
    validate_crm(&cfg.crm, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(retry) = &settings.retry {
        validate_retry("settings.retry", retry, errors);
    }

    if settings.server.host.is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    if !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }

    if settings.http.timeout_ms == 0 {
        errors.push("settings.http.timeout_ms must be > 0".to_string());
    }

    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_retry(path: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if let Some(attempts) = retry.attempts {
        if attempts == 0 {
            errors.push(format!("{}.attempts must be > 0", path));
        }
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "{}.max_delay_ms ({}) must be >= base_delay_ms ({})",
                path, max, base
            ));
        }
    }
}

fn validate_graph(graph: &GraphConfig, errors: &mut Vec<String>) {
    validate_url("graph.base_url", &graph.base_url, errors);
    if graph.version.is_empty() {
        errors.push("graph.version must not be empty".to_string());
    }
}

/// TOKEN INPUTS
fn validate_token(token: &TokenConfig, errors: &mut Vec<String>) {
    if token.refresh_interval_seconds == 0 {
        errors.push("token.refresh_interval_seconds must be > 0".to_string());
    }
    if token.env_key.is_empty() || token.env_key.contains('=') || token.env_key.contains(char::is_whitespace) {
        errors.push(format!(
            "token.env_key '{}' must be a non-empty key without '=' or whitespace",
            token.env_key
        ));
    }
    if token.env_file.is_empty() {
        errors.push("token.env_file must not be empty".to_string());
    }
    if token.app_id.is_some() != token.app_secret.is_some() {
        errors.push("token.app_id and token.app_secret must be provided together".to_string());
    }

    let has_page = token.page_id.is_some();
    let can_mint_system_user = has_page && token.system_user_token.is_some();
    let can_mint_app = has_page && token.app_id.is_some() && token.app_secret.is_some();
    let has_page_token = token.page_token.is_some();
    if !(can_mint_system_user || can_mint_app || has_page_token) {
        errors.push(
            "token: no way to obtain a page token; configure page_id with system_user_token or app_id/app_secret, or a page_token"
                .to_string(),
        );
    }
    if !has_page && (token.system_user_token.is_some() || token.app_id.is_some()) {
        warn!("token.page_id is missing; minting strategies will be skipped");
    }
}

fn validate_webhook(webhook: &WebhookConfig, errors: &mut Vec<String>) {
    if !webhook.path.starts_with('/') {
        errors.push(format!("webhook.path '{}' must start with '/'", webhook.path));
    }
    if webhook.verify_token.is_empty() {
        errors.push("webhook.verify_token must not be empty".to_string());
    }
}

fn validate_crm(crm: &CrmConfig, errors: &mut Vec<String>) {
    validate_url("crm.url", &crm.url, errors);
}

fn validate_url(path: &str, url: &str, errors: &mut Vec<String>) {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!("{} '{}' must be an http(s) url", path, url));
    }
}
