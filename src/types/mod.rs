//! Core types shared across the crate.
//!
//! - **IDs**: prefixed, opaque identifiers (`SubmissionId`, `EventId`, `ResumeToken`)
//! - **Errors**: the crate's internal `Error` type
//! - **Config**: observability and orchestrator defaults

mod config;
mod errors;
mod ids;

pub use config::{Config, IntakeDefaults, ObservabilityConfig};
pub use errors::{Error, Result};
pub use ids::{EventId, ResumeToken, SubmissionId};
