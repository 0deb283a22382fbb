use std::sync::Arc;

use tracing::{error, info, warn};

use crate::graph::{GraphClient, GraphError};
use crate::observability::metrics::get_metrics;
use crate::resilience::retry::RetrySettings;
use crate::token::TokenManager;
use crate::webhook::crm::{CrmForwarder, CrmPayload};
use crate::webhook::error::LeadError;
use crate::webhook::lead::LeadData;
use crate::webhook::payload::{LeadgenValue, WebhookEvent};

/// Counts for one delivered batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub forwarded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Turns leadgen changes into CRM registrations.
#[derive(Clone)]
pub struct LeadProcessor {
    tokens: Arc<TokenManager>,
    graph: GraphClient,
    crm: CrmForwarder,
    retry: RetrySettings,
}

impl LeadProcessor {
    pub fn new(
        tokens: Arc<TokenManager>,
        graph: GraphClient,
        crm: CrmForwarder,
        retry: RetrySettings,
    ) -> Self {
        Self {
            tokens,
            graph,
            crm,
            retry,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn graph(&self) -> &GraphClient {
        &self.graph
    }

    /// Handle every change of the batch in order. A failing lead is logged
    /// and counted, the rest of the batch still runs.
    pub async fn process_event(&self, event: &WebhookEvent) -> BatchSummary {
        let metrics = get_metrics().await;
        let mut summary = BatchSummary::default();

        for entry in &event.entry {
            for change in &entry.changes {
                let value = match change.is_leadgen().then(|| change.leadgen()).flatten() {
                    Some(v) if v.leadgen_id.is_some() && v.form_id.is_some() => v,
                    _ => {
                        info!("skipping change '{}' of entry {:?}", change.field, entry.id);
                        metrics.leads_processed.with_label_values(&["skipped"]).inc();
                        summary.skipped += 1;
                        continue;
                    }
                };

                match self.process_lead(&value).await {
                    Ok(_) => {
                        metrics.leads_processed.with_label_values(&["forwarded"]).inc();
                        summary.forwarded += 1;
                    }
                    Err(e @ LeadError::InvalidLeadId(_)) => {
                        warn!("skipping change of entry {:?}: {}", entry.id, e);
                        metrics.leads_processed.with_label_values(&[e.kind()]).inc();
                        summary.skipped += 1;
                    }
                    Err(e) => {
                        error!("lead {:?} not forwarded: {}", value.leadgen_id, e);
                        metrics.leads_processed.with_label_values(&[e.kind()]).inc();
                        summary.failed += 1;
                    }
                }
            }
        }

        summary
    }

    /// Fetch one lead with the current page token and forward it.
    pub async fn process_lead(&self, value: &LeadgenValue) -> Result<CrmPayload, LeadError> {
        let lead_id = value.leadgen_id.as_deref().unwrap_or_default();
        if !is_graph_id(lead_id) {
            return Err(LeadError::InvalidLeadId(lead_id.to_string()));
        }
        info!(
            "new lead {} (form {:?}, ad {:?}, page {:?})",
            lead_id, value.form_id, value.ad_id, value.page_id
        );

        let credential = self
            .tokens
            .get_valid_token()
            .await
            .ok_or(LeadError::NoCredential)?;

        let lead: LeadData = self
            .retry
            .run_with_retry(
                || self.graph.lead::<LeadData>(lead_id, credential.secret()),
                |e| matches!(e, GraphError::Unavailable(_)),
            )
            .await
            .map_err(|source| LeadError::Fetch {
                lead_id: lead_id.to_string(),
                source,
            })?;

        if lead.field_data.is_empty() {
            warn!("lead {} has no field data", lead_id);
        }

        let payload = CrmPayload::from_contact(lead.contact(), self.crm.config());
        self.crm.forward(&payload).await?;
        info!("lead {} forwarded to crm", lead_id);
        Ok(payload)
    }
}

/// Graph object ids are decimal digits only.
pub fn is_graph_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}
