//! Closed enumerations shared by the state machine, validation engine, and
//! runtime orchestrator.

use serde::{Deserialize, Serialize};

/// Submission lifecycle state.
///
/// `Rejected`, `Finalized`, `Cancelled`, and `Expired` are terminal: no
/// outgoing transition exists for them. Terminality is derived from the
/// transition table in [`crate::state_machine`], never stored redundantly
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Draft,
    InProgress,
    AwaitingInput,
    AwaitingUpload,
    Submitted,
    NeedsReview,
    Approved,
    Rejected,
    Finalized,
    Cancelled,
    Expired,
}

/// Kind of identity that initiated an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Agent,
    Human,
    System,
}

/// Closed set of audit event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[serde(rename = "submission.created")]
    SubmissionCreated,
    #[serde(rename = "submission.submitted")]
    SubmissionSubmitted,
    #[serde(rename = "submission.finalized")]
    SubmissionFinalized,
    #[serde(rename = "submission.cancelled")]
    SubmissionCancelled,
    #[serde(rename = "submission.expired")]
    SubmissionExpired,
    #[serde(rename = "field.updated")]
    FieldUpdated,
    #[serde(rename = "validation.passed")]
    ValidationPassed,
    #[serde(rename = "validation.failed")]
    ValidationFailed,
    #[serde(rename = "review.requested")]
    ReviewRequested,
    #[serde(rename = "review.approved")]
    ReviewApproved,
    #[serde(rename = "review.rejected")]
    ReviewRejected,
    #[serde(rename = "upload.requested")]
    UploadRequested,
    #[serde(rename = "upload.completed")]
    UploadCompleted,
    #[serde(rename = "upload.failed")]
    UploadFailed,
    #[serde(rename = "delivery.attempted")]
    DeliveryAttempted,
    #[serde(rename = "delivery.succeeded")]
    DeliverySucceeded,
    #[serde(rename = "delivery.failed")]
    DeliveryFailed,
    #[serde(rename = "handoff.link_issued")]
    HandoffLinkIssued,
    #[serde(rename = "handoff.resumed")]
    HandoffResumed,
}

/// Field-level validation failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    Required,
    InvalidType,
    InvalidFormat,
    InvalidValue,
    TooShort,
    TooLong,
    Custom,
}

/// Suggested corrective action attached to an error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextActionType {
    CollectField,
    RequestUpload,
    WaitForReview,
    RetryDelivery,
    Cancel,
}

/// Orchestrator-level error taxonomy returned in an `IntakeError` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Missing,
    Invalid,
    Conflict,
    NeedsApproval,
    UploadPending,
    DeliveryFailed,
    Expired,
    Cancelled,
}

impl ErrorType {
    /// Whether a caller can reasonably retry after fixing inputs or waiting.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorType::Missing
                | ErrorType::Invalid
                | ErrorType::UploadPending
                | ErrorType::NeedsApproval
                | ErrorType::DeliveryFailed
        )
    }
}

impl SubmissionState {
    /// Whether this state admits no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::Rejected
                | SubmissionState::Finalized
                | SubmissionState::Cancelled
                | SubmissionState::Expired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_match_spec() {
        assert!(SubmissionState::Rejected.is_terminal());
        assert!(SubmissionState::Finalized.is_terminal());
        assert!(SubmissionState::Cancelled.is_terminal());
        assert!(SubmissionState::Expired.is_terminal());
        assert!(!SubmissionState::Draft.is_terminal());
        assert!(!SubmissionState::NeedsReview.is_terminal());
    }

    #[test]
    fn error_type_retryability_matches_spec() {
        assert!(ErrorType::Missing.is_retryable());
        assert!(ErrorType::Invalid.is_retryable());
        assert!(ErrorType::UploadPending.is_retryable());
        assert!(ErrorType::NeedsApproval.is_retryable());
        assert!(ErrorType::DeliveryFailed.is_retryable());
        assert!(!ErrorType::Conflict.is_retryable());
        assert!(!ErrorType::Expired.is_retryable());
        assert!(!ErrorType::Cancelled.is_retryable());
    }

    #[test]
    fn event_type_wire_names_use_dotted_form() {
        let v = serde_json::to_value(EventType::FieldUpdated).unwrap();
        assert_eq!(v, serde_json::json!("field.updated"));
        let v = serde_json::to_value(EventType::SubmissionSubmitted).unwrap();
        assert_eq!(v, serde_json::json!("submission.submitted"));
    }
}
