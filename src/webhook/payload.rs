use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::helpers::time::now_i64;

pub const PAGE_OBJECT: &str = "page";
pub const LEADGEN_FIELD: &str = "leadgen";

/// Query of the subscription handshake (`GET` on the webhook path).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Event delivery body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    /// shape depends on `field`; only leadgen values are interpreted
    #[serde(default)]
    pub value: Value,
}

impl WebhookChange {
    pub fn is_leadgen(&self) -> bool {
        self.field == LEADGEN_FIELD
    }

    pub fn leadgen(&self) -> Option<LeadgenValue> {
        serde_json::from_value(self.value.clone()).ok()
    }
}

/// `value` of a leadgen change. Ids may arrive as strings or numbers.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct LeadgenValue {
    #[serde(default, deserialize_with = "string_or_number")]
    pub leadgen_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub form_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub ad_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<i64>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Leadgen delivery used by the `/test-webhook` debug route.
pub fn sample_leadgen_event() -> WebhookEvent {
    let now = now_i64();
    WebhookEvent {
        object: PAGE_OBJECT.to_string(),
        entry: vec![WebhookEntry {
            id: Some("test_page_id".to_string()),
            time: Some(now),
            changes: vec![WebhookChange {
                field: LEADGEN_FIELD.to_string(),
                value: serde_json::json!({
                    "ad_id": "test_ad_id",
                    "form_id": "test_form_id",
                    "leadgen_id": "test_lead_id",
                    "created_time": now,
                    "page_id": "test_page_id",
                }),
            }],
        }],
    }
}
