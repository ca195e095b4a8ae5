//! # intake-kernel
//!
//! An embeddable runtime for agent-oriented data intake: a schema-driven
//! submission lifecycle with idempotent creation, JSON-Schema validation,
//! resumable collection, human review, and an in-process event feed.
//!
//! - State machine over a fixed submission lifecycle (draft through the
//!   terminal states), with every legal transition minting an append-only
//!   event.
//! - JSON-Schema (Draft 7) validation, translated into a fielded error
//!   taxonomy an agent can act on without parsing free-text messages.
//! - Resume tokens for handing an in-progress submission off between
//!   sessions or actors.
//! - A synchronous publish/subscribe event feed for observing a submission's
//!   progress without polling.
//! - Trait seams ([`runtime::Storage`], [`runtime::Delivery`],
//!   [`runtime::UploadBroker`], [`runtime::Scheduler`]) for the I/O concerns
//!   an embedder supplies; the core never performs persistence, delivery, or
//!   byte transfer itself.
//!
//! ## Architecture
//!
//! One [`runtime::IntakeRuntime`] is bound to one intake (one schema, one
//! `intake_id`) and owns every submission created against it:
//! ```text
//!                    ┌───────────────────────────────────┐
//!   create/update →  │          IntakeRuntime             │
//!                    │  ┌───────────┐  ┌───────────────┐  │
//!                    │  │ Validation │  │ State Machine │  │
//!                    │  │  Engine    │  │ (per submission)│
//!                    │  └───────────┘  └───────────────┘  │
//!                    │  ┌───────────────────────────────┐  │
//!                    │  │        Event Emitter          │  │
//!                    │  └───────────────────────────────┘  │
//!                    └───────────────────────────────────┘
//! ```

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod envelope;
pub mod events;
pub mod model;
pub mod runtime;
pub mod state_machine;
pub mod types;
pub mod validation;

pub mod observability;

pub use envelope::{ErrorDetail, FieldError, IntakeError, NextAction};
pub use events::{Event, EventEmitter, Listener, ListenerId};
pub use model::{Actor, ActorKind, ErrorType, EventType, FieldErrorCode, NextActionType, SubmissionState};
pub use runtime::{IntakeRuntime, SubmissionDetail, SubmissionRecord, SubmissionResponse, SubmissionSummary};
pub use state_machine::{InvalidTransitionError, SubmissionStateMachine};
pub use types::{Config, Error, Result};
pub use validation::{ValidationEngine, ValidationResult};
