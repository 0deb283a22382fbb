//! Graph API plumbing: the handful of parameterized GET calls the relay needs.

pub mod client;
pub mod error;

pub use client::{GraphClient, GraphIdentity, PageAccount};
pub use error::{GraphError, GraphErrorBody};
