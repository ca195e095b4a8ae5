//! Trait seams for the systems this crate deliberately does not implement:
//! persistence, delivery, upload byte transfer, and TTL scheduling. An
//! embedder wires real I/O behind these traits; the core never calls into
//! them directly, only around a transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::Result;

use super::SubmissionRecord;

/// Persists and reloads submission records. Must preserve append-only
/// event ordering across a save/load round-trip.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load(&self, submission_id: &str) -> Result<Option<SubmissionRecord>>;
    async fn save(&self, record: &SubmissionRecord) -> Result<()>;
}

/// Outcome of a delivery attempt to a downstream system.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Ok,
    RetryableFailure { reason: String },
    FatalFailure { reason: String },
}

/// Hands finalized submission data off to whatever consumes it next.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, submission_id: &str, fields: &Value) -> DeliveryOutcome;
}

/// Issues upload URLs and reports completion; the core never transfers
/// upload bytes itself.
#[async_trait]
pub trait UploadBroker: Send + Sync {
    async fn request_upload(&self, field: &str, accept: &[String], max_bytes: u64) -> Result<String>;
    async fn notify_completed(&self, field: &str) -> Result<()>;
}

/// Drives TTL enforcement by calling `expire()` on submissions whose
/// `ttl_ms` budget has elapsed. The core owns no timers of its own.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Returns the ids of submissions this tick decided should expire.
    async fn on_tick(&self, now: DateTime<Utc>) -> Vec<String>;
}
