use serde::Deserialize;

/// Inbound Lead-Ads webhook route.
#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_path")]
    pub path: String,
    /// shared secret echoed back by Facebook in `hub.verify_token`
    pub verify_token: String,
}

/// CRM endpoint and the fixed values every forwarded lead carries.
#[derive(Debug, Deserialize, Clone)]
pub struct CrmConfig {
    #[serde(default = "default_crm_url")]
    pub url: String,
    #[serde(default = "default_dob")]
    pub default_dob: String,
    #[serde(default = "default_program_code")]
    pub program_code: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_utm_medium")]
    pub utm_medium: String,
    #[serde(default = "default_utm_campaign")]
    pub utm_campaign: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            url: default_crm_url(),
            default_dob: default_dob(),
            program_code: default_program_code(),
            source: default_source(),
            utm_medium: default_utm_medium(),
            utm_campaign: default_utm_campaign(),
        }
    }
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

fn default_crm_url() -> String {
    "https://glawebapi.glaonline.com/api/ChannelPartner/CPRegistrationOnline_API".to_string()
}

fn default_dob() -> String {
    "12/7/2000".to_string()
}

fn default_program_code() -> String {
    "OGLAMBA201".to_string()
}

fn default_source() -> String {
    "Stealth".to_string()
}

fn default_utm_medium() -> String {
    "social".to_string()
}

fn default_utm_campaign() -> String {
    "Social_MBA_Form_Test".to_string()
}
