//! Closed enumerations and identity types shared across the crate.

mod actor;
mod enums;

pub use actor::Actor;
pub use enums::{
    ActorKind, ErrorType, EventType, FieldErrorCode, NextActionType, SubmissionState,
};
