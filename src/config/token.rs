use serde::Deserialize;

/// ================================
/// Graph API endpoint
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct GraphConfig {
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
    /// path prefix of every versioned call, e.g. `v17.0`
    #[serde(default = "default_graph_version")]
    pub version: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: default_graph_base_url(),
            version: default_graph_version(),
        }
    }
}

/// ================================
/// Token lifecycle inputs
/// ================================
///
/// Every credential is injected (usually through `${VAR}` expansion against the
/// env file); empty values are normalized to `None` when the config is loaded.
#[derive(Clone, Deserialize, Default)]
pub struct TokenConfig {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub page_id: Option<String>,
    /// never-expiring system user credential, root of trust for page tokens
    pub system_user_token: Option<String>,
    /// page credential known at startup, last resort fallback
    pub page_token: Option<String>,
    #[serde(default = "default_env_file")]
    pub env_file: String,
    /// key of the line rewritten on every successful refresh
    #[serde(default = "default_env_key")]
    pub env_key: String,
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("TokenConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &redact(&self.app_secret))
            .field("page_id", &self.page_id)
            .field("system_user_token", &redact(&self.system_user_token))
            .field("page_token", &redact(&self.page_token))
            .field("env_file", &self.env_file)
            .field("env_key", &self.env_key)
            .field("refresh_interval_seconds", &self.refresh_interval_seconds)
            .finish()
    }
}

pub const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 6 * 60 * 60;
pub const DEFAULT_ENV_KEY: &str = "PAGE_ACCESS_TOKEN";
pub const DEFAULT_ENV_FILE: &str = ".env";

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_graph_version() -> String {
    "v17.0".to_string()
}

fn default_env_file() -> String {
    DEFAULT_ENV_FILE.to_string()
}

fn default_env_key() -> String {
    DEFAULT_ENV_KEY.to_string()
}

fn default_refresh_interval_seconds() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECONDS
}
