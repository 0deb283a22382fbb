//! # Lead-Ads Relay Library
//!
//! Receives Facebook Lead-Ads webhook deliveries, fetches each lead from the
//! Graph API with a self-refreshing page access token and forwards it to a CRM.
//!
//! Modules:
//! - `config`: YAML service configuration, env expansion, defaults, validation
//! - `graph`: Graph API client and error classification
//! - `token`: page token lifecycle: probe, acquisition strategies, persistence, background refresh
//! - `webhook`: subscription handshake, event delivery, lead processing, CRM forwarding
//! - `server`: axum app with health, webhook and metrics routes

pub mod config;
pub mod graph;
pub mod helpers;
pub mod observability;
pub mod resilience;
pub mod server;
pub mod token;
pub mod utils;
pub mod webhook;

#[cfg(test)]
mod tests;

pub use crate::config::service::ServiceConfig;
pub use crate::token::{Credential, TokenManager};
