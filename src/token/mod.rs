//! Page token lifecycle: liveness probe, ordered acquisition strategies,
//! env file persistence and the orchestrating `TokenManager`.

pub mod credential;
pub mod error;
pub mod inspect;
pub mod manager;
pub mod probe;
pub mod scheduler;
pub mod store;
pub mod strategy;

pub use credential::{Credential, CredentialClass, Identity};
pub use error::TokenError;
pub use inspect::{inspect_identity, list_pages, EdgeCheck, PageSummary, TokenReport};
pub use manager::{RefreshPhase, TokenManager, TokenOutcome};
pub use probe::{probe, ProbeOutcome};
pub use scheduler::RefreshTask;
pub use store::EnvFileStore;
pub use strategy::Strategy;
