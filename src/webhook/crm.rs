use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::webhook::CrmConfig;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::webhook::error::LeadError;
use crate::webhook::lead::LeadContact;

/// Registration record the CRM expects, sent as query parameters.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CrmPayload {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DOB")]
    pub dob: String,
    #[serde(rename = "EmailId")]
    pub email_id: String,
    #[serde(rename = "Mobile")]
    pub mobile: String,
    #[serde(rename = "ProgramCode")]
    pub program_code: String,
    pub source: String,
    #[serde(rename = "City")]
    pub city: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_term: String,
    pub utm_content: String,
}

impl CrmPayload {
    pub fn from_contact(contact: LeadContact, cfg: &CrmConfig) -> Self {
        Self {
            name: contact.full_name,
            dob: cfg.default_dob.clone(),
            email_id: contact.email,
            mobile: contact.phone_number,
            program_code: cfg.program_code.clone(),
            source: cfg.source.clone(),
            city: contact.city,
            utm_medium: cfg.utm_medium.clone(),
            utm_campaign: cfg.utm_campaign.clone(),
            utm_term: String::new(),
            utm_content: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrmForwarder {
    client: Client,
    cfg: CrmConfig,
}

impl CrmForwarder {
    pub fn new(client: Client, cfg: CrmConfig) -> Self {
        Self { client, cfg }
    }

    pub fn config(&self) -> &CrmConfig {
        &self.cfg
    }

    /// `GET crm.url?Name=..&DOB=..`. Returns the CRM response body.
    pub async fn forward(&self, payload: &CrmPayload) -> Result<String, LeadError> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = self.send(payload).await;

        let label = if result.is_ok() { "success" } else { "failure" };
        metrics
            .crm_duration
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());
        result
    }

    async fn send(&self, payload: &CrmPayload) -> Result<String, LeadError> {
        debug!("sending lead for '{}' to crm", payload.name);
        let response = self.client.get(&self.cfg.url).query(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LeadError::CrmRejected {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        info!("crm accepted lead: {}", body.chars().take(200).collect::<String>());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_contact_and_fixed_values() {
        let contact = LeadContact {
            full_name: "Asha Verma".into(),
            email: "asha@example.com".into(),
            phone_number: "+911234567890".into(),
            city: "Mathura".into(),
        };

        let payload = CrmPayload::from_contact(contact, &CrmConfig::default());
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["Name"], "Asha Verma");
        assert_eq!(value["EmailId"], "asha@example.com");
        assert_eq!(value["Mobile"], "+911234567890");
        assert_eq!(value["City"], "Mathura");
        assert_eq!(value["DOB"], "12/7/2000");
        assert_eq!(value["ProgramCode"], "OGLAMBA201");
        assert_eq!(value["source"], "Stealth");
        assert_eq!(value["utm_medium"], "social");
        assert_eq!(value["utm_campaign"], "Social_MBA_Form_Test");
        assert_eq!(value["utm_term"], "");
        assert_eq!(value["utm_content"], "");
    }
}
