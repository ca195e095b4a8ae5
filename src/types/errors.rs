//! Crate-internal error type.
//!
//! `Error` covers construction-time and internal failures — it is distinct
//! from [`crate::envelope::IntakeError`], which is the wire-facing error
//! envelope returned by orchestrator operations. `Error::SchemaInvalid` is
//! thrown to the embedder at validation-engine construction time.
//! `Error::NotFound` is the one orchestrator failure that cannot be
//! expressed as an `IntakeError` (there is no submission context to embed a
//! resume token for).

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application error type.
#[derive(Error, Debug)]
pub enum Error {
    /// The schema supplied to a validation engine is not a valid JSON Schema.
    #[error("schema invalid: {0}")]
    SchemaInvalid(String),

    /// Resource not found (unknown submission id or resume token).
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn schema_invalid(msg: impl Into<String>) -> Self {
        Self::SchemaInvalid(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
