//! Configuration structures.
//!
//! No transport/server configuration is carried here — bindings are out of
//! scope for this crate (see `DESIGN.md`). What remains is the ambient
//! configuration every embedder still needs: logging shape and the
//! orchestrator's own defaults (TTL, resume-token sizing).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Orchestrator defaults.
    #[serde(default)]
    pub defaults: IntakeDefaults,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Orchestrator-wide defaults, applied when a caller doesn't override them
/// per-submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeDefaults {
    /// Default submission time-to-live, consulted by an external scheduler
    /// (the core itself never starts a timer — see `runtime::collaborators::Scheduler`).
    #[serde(with = "humantime_serde")]
    pub submission_ttl: Duration,
}

impl Default for IntakeDefaults {
    fn default() -> Self {
        Self {
            submission_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}
