use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::config::token::{GraphConfig, TokenConfig};
use crate::config::webhook::{CrmConfig, WebhookConfig};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub token: TokenConfig,
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub crm: CrmConfig,
}
