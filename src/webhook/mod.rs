//! Lead-Ads webhook: subscription handshake, event delivery, lead fetch and
//! CRM forwarding.

pub mod crm;
pub mod error;
pub mod handler;
pub mod lead;
pub mod payload;
pub mod processor;

pub use crm::{CrmForwarder, CrmPayload};
pub use error::{LeadError, WebhookError};
pub use handler::WebhookState;
pub use lead::{LeadContact, LeadData};
pub use payload::WebhookEvent;
pub use processor::{BatchSummary, LeadProcessor};
