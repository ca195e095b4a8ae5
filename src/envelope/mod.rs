//! The fielded error envelope returned by every failing orchestrator
//! operation.
//!
//! `IntakeError` always carries the submission's context (id, current
//! state, resume token) alongside the error detail, so a caller never loses
//! track of how to resume after a failure — see [`crate::model::ErrorType`]
//! for the taxonomy and [`crate::runtime`] for where these are constructed.

use serde::{Deserialize, Serialize};

use crate::model::{ErrorType, FieldErrorCode, NextActionType, SubmissionState};

/// Per-field validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub path: String,
    pub code: FieldErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
}

impl FieldError {
    pub fn new(path: impl Into<String>, code: FieldErrorCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
            expected: None,
            received: None,
        }
    }

    pub fn with_expected(mut self, expected: impl Into<serde_json::Value>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_received(mut self, received: impl Into<serde_json::Value>) -> Self {
        self.received = Some(received.into());
        self
    }
}

/// Suggested corrective step attached to an error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAction {
    pub action: NextActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
}

impl NextAction {
    pub fn new(action: NextActionType) -> Self {
        Self {
            action,
            field: None,
            hint: None,
            accept: None,
            max_bytes: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_accept(mut self, accept: Vec<String>) -> Self {
        self.accept = Some(accept);
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }
}

/// Detailed error information carried inside an [`IntakeError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_actions: Option<Vec<NextAction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl ErrorDetail {
    pub fn new(error_type: ErrorType) -> Self {
        Self {
            retryable: error_type.is_retryable(),
            error_type,
            message: None,
            fields: None,
            next_actions: None,
            retry_after_ms: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldError>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_next_actions(mut self, actions: Vec<NextAction>) -> Self {
        self.next_actions = Some(actions);
        self
    }

    pub fn with_retry_after_ms(mut self, ms: u64) -> Self {
        self.retry_after_ms = Some(ms);
        self
    }
}

/// Complete error envelope returned by a failing orchestrator operation.
///
/// Every instance answers "which submission, in what state, reachable how"
/// even when the failure itself is unrelated to the submission's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeError {
    pub ok: bool,
    pub submission_id: String,
    pub state: SubmissionState,
    pub resume_token: String,
    pub error: ErrorDetail,
}

impl IntakeError {
    pub fn new(
        submission_id: impl Into<String>,
        state: SubmissionState,
        resume_token: impl Into<String>,
        error: ErrorDetail,
    ) -> Self {
        Self {
            ok: false,
            submission_id: submission_id.into(),
            state,
            resume_token: resume_token.into(),
            error,
        }
    }
}
