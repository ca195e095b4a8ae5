//! The runtime orchestrator: composes the state machine, validation engine,
//! and event emitter into the intake submission API.
//!
//! One [`IntakeRuntime`] is bound to a single intake (one `intake_id`, one
//! schema, one compiled [`ValidationEngine`]). It owns every submission
//! created against that intake. Per-submission operations lock only that
//! submission's entry — see §5 of the design notes: cross-submission
//! operations never contend with each other.

mod collaborators;

pub use collaborators::{Delivery, DeliveryOutcome, Scheduler, Storage, UploadBroker};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::{ErrorDetail, IntakeError, NextAction};
use crate::events::{Event, EventEmitter, Listener, ListenerId};
use crate::model::{Actor, ErrorType, EventType, NextActionType, SubmissionState};
use crate::state_machine::SubmissionStateMachine;
use crate::types::{Error, ResumeToken, Result, SubmissionId};
use crate::validation::{ValidationEngine, ValidationResult};

/// A submission's full internal record, as an embedder's [`Storage`]
/// collaborator would persist and reload it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub submission_id: String,
    pub intake_id: String,
    pub state: SubmissionState,
    pub fields: Value,
    pub resume_token: String,
    pub created_by: Actor,
    pub events: Vec<Event>,
    pub ttl_ms: Option<u64>,
}

#[derive(Debug)]
struct SubmissionEntry {
    intake_id: String,
    state_machine: SubmissionStateMachine,
    fields: Map<String, Value>,
    created_by: Actor,
    resume_token: String,
    ttl_ms: Option<u64>,
}

impl SubmissionEntry {
    fn to_record(&self, submission_id: &str) -> SubmissionRecord {
        SubmissionRecord {
            submission_id: submission_id.to_string(),
            intake_id: self.intake_id.clone(),
            state: self.state_machine.state(),
            fields: Value::Object(self.fields.clone()),
            resume_token: self.resume_token.clone(),
            created_by: self.created_by.clone(),
            events: self.state_machine.events(),
            ttl_ms: self.ttl_ms,
        }
    }
}

/// The `{ok: true, ...}` success reply shared by every orchestrator
/// operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub ok: bool,
    pub submission_id: String,
    pub state: SubmissionState,
    pub resume_token: String,
    pub schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
}

/// The detailed reply for `get_submission`/`resume`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    pub ok: bool,
    pub submission_id: String,
    pub intake_id: String,
    pub state: SubmissionState,
    pub resume_token: String,
    pub fields: Value,
    pub events: Vec<Event>,
    pub created_by: Actor,
}

/// Either half of the wire contract's `{ok: true|false, ...}` split.
///
/// Operations that can fail for reasons *within* the submission's own
/// context (validation, illegal transition, terminal state) return this;
/// only `NotFound` — for which no submission context exists to embed —
/// escapes as a plain [`crate::types::Error`] instead.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SubmissionResponse {
    Success(SubmissionSummary),
    Failure(IntakeError),
}

/// Orchestrates one intake's submissions: creation, idempotency, field
/// updates, lifecycle transitions, and resume-token resolution.
pub struct IntakeRuntime {
    intake_id: String,
    schema: Value,
    validation_engine: ValidationEngine,
    emitter: Mutex<EventEmitter>,
    submissions: Mutex<HashMap<String, Arc<Mutex<SubmissionEntry>>>>,
    resume_tokens: Mutex<HashMap<String, String>>,
    idempotency_keys: Mutex<HashMap<String, String>>,
}

impl std::fmt::Debug for IntakeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakeRuntime")
            .field("intake_id", &self.intake_id)
            .field("submission_count", &self.submissions.lock().unwrap().len())
            .finish()
    }
}

impl IntakeRuntime {
    /// Binds a fresh runtime to `intake_id` and compiles `schema`. Fails
    /// with [`Error::SchemaInvalid`] if the schema itself is malformed.
    pub fn new(intake_id: impl Into<String>, schema: Value) -> Result<Self> {
        let validation_engine = ValidationEngine::new(&schema)?;
        Ok(Self {
            intake_id: intake_id.into(),
            schema,
            validation_engine,
            emitter: Mutex::new(EventEmitter::new()),
            submissions: Mutex::new(HashMap::new()),
            resume_tokens: Mutex::new(HashMap::new()),
            idempotency_keys: Mutex::new(HashMap::new()),
        })
    }

    pub fn intake_id(&self) -> &str {
        &self.intake_id
    }

    /// Subscribe to one event type's dispatch. See [`EventEmitter::on`].
    pub fn subscribe(&self, event_type: EventType, listener: Listener) -> ListenerId {
        self.emitter.lock().unwrap().on(event_type, listener)
    }

    /// Subscribe to every event type. See [`EventEmitter::on_any`].
    pub fn subscribe_any(&self, listener: Listener) -> ListenerId {
        self.emitter.lock().unwrap().on_any(listener)
    }

    pub fn unsubscribe(&self, event_type: EventType, id: ListenerId) {
        self.emitter.lock().unwrap().off(event_type, id);
    }

    pub fn unsubscribe_any(&self, id: ListenerId) {
        self.emitter.lock().unwrap().off_any(id);
    }

    /// Create a new submission. If `idempotency_key` was already seen for
    /// this intake, replays the prior submission's current summary instead
    /// of creating a new one.
    pub fn create_submission(
        &self,
        actor: Actor,
        idempotency_key: Option<String>,
        initial_fields: Option<Map<String, Value>>,
        ttl_ms: Option<u64>,
    ) -> Result<SubmissionResponse> {
        if let Some(key) = idempotency_key.as_deref() {
            let existing = self.idempotency_keys.lock().unwrap().get(key).cloned();
            if let Some(existing_id) = existing {
                return self.summarize_existing(&existing_id);
            }
        }

        let submission_id = SubmissionId::new().to_string();
        let resume_token = ResumeToken::new().to_string();
        let mut state_machine = SubmissionStateMachine::new(&submission_id);

        let fields = initial_fields.unwrap_or_default();
        let has_initial = !fields.is_empty();

        let minted_event = if has_initial {
            Some(
                state_machine
                    .transition_to(SubmissionState::InProgress, actor.clone())
                    .expect("draft always permits in_progress"),
            )
        } else {
            None
        };

        let missing_fields = if has_initial {
            let validation = self.validation_engine.validate(Value::Object(fields.clone()));
            Some(validation.missing_fields)
        } else {
            None
        };

        let state = state_machine.state();
        let entry = Arc::new(Mutex::new(SubmissionEntry {
            intake_id: self.intake_id.clone(),
            state_machine,
            fields,
            created_by: actor,
            resume_token: resume_token.clone(),
            ttl_ms,
        }));

        self.submissions
            .lock()
            .unwrap()
            .insert(submission_id.clone(), entry);
        self.resume_tokens
            .lock()
            .unwrap()
            .insert(resume_token.clone(), submission_id.clone());
        if let Some(key) = idempotency_key {
            self.idempotency_keys
                .lock()
                .unwrap()
                .insert(key, submission_id.clone());
        }

        if let Some(event) = minted_event {
            self.emitter.lock().unwrap().emit(&event);
        }

        tracing::debug!(submission_id = %submission_id, %state, "submission created");
        Ok(SubmissionResponse::Success(self.build_summary(
            &submission_id,
            state,
            &resume_token,
            missing_fields,
        )))
    }

    /// Full submission state, including the event log. Fails with
    /// [`Error::NotFound`] for an unknown id.
    pub fn get_submission(&self, submission_id: &str) -> Result<SubmissionDetail> {
        let entry_arc = self.lookup(submission_id)?;
        let entry = entry_arc.lock().unwrap();
        Ok(SubmissionDetail {
            ok: true,
            submission_id: submission_id.to_string(),
            intake_id: entry.intake_id.clone(),
            state: entry.state_machine.state(),
            resume_token: entry.resume_token.clone(),
            fields: Value::Object(entry.fields.clone()),
            events: entry.state_machine.events(),
            created_by: entry.created_by.clone(),
        })
    }

    /// Resolve a resume token to its submission's full state.
    pub fn resume(&self, resume_token: &str) -> Result<SubmissionDetail> {
        let submission_id = self
            .resume_tokens
            .lock()
            .unwrap()
            .get(resume_token)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("resume token {resume_token} not found")))?;
        self.get_submission(&submission_id)
    }

    /// Shallow-merges `fields` into the submission's stored data at the
    /// top-level path key. Bootstraps `draft -> in_progress` on first call;
    /// re-validates after merging and echoes the updated `missing_fields`.
    pub fn update_fields(
        &self,
        submission_id: &str,
        actor: Actor,
        fields: Map<String, Value>,
    ) -> Result<SubmissionResponse> {
        let entry_arc = self.lookup(submission_id)?;
        let mut entry = entry_arc.lock().unwrap();
        let current_state = entry.state_machine.state();

        if current_state.is_terminal() {
            let resume_token = entry.resume_token.clone();
            drop(entry);
            return Ok(SubmissionResponse::Failure(self.blocked_error(
                submission_id,
                current_state,
                &resume_token,
                format!("submission is in terminal state '{current_state:?}' and cannot be updated"),
            )));
        }

        entry.fields.extend(fields);

        let bootstrap_event = if current_state == SubmissionState::Draft {
            Some(
                entry
                    .state_machine
                    .transition_to(SubmissionState::InProgress, actor)
                    .expect("draft always permits in_progress"),
            )
        } else {
            None
        };

        let state = entry.state_machine.state();
        let resume_token = entry.resume_token.clone();
        let validation = self
            .validation_engine
            .validate(Value::Object(entry.fields.clone()));
        drop(entry);

        if let Some(event) = bootstrap_event {
            self.emitter.lock().unwrap().emit(&event);
        }

        Ok(SubmissionResponse::Success(self.build_summary(
            submission_id,
            state,
            &resume_token,
            Some(validation.missing_fields),
        )))
    }

    /// Request human collection of a missing field: `in_progress ->
    /// awaiting_input`.
    pub fn request_input(&self, submission_id: &str, actor: Actor) -> Result<SubmissionResponse> {
        self.apply_transition(submission_id, actor, SubmissionState::AwaitingInput)
    }

    /// Request an upload: `in_progress -> awaiting_upload`.
    pub fn request_upload(&self, submission_id: &str, actor: Actor) -> Result<SubmissionResponse> {
        self.apply_transition(submission_id, actor, SubmissionState::AwaitingUpload)
    }

    /// Return to active collection after an input/upload request resolves:
    /// `awaiting_input | awaiting_upload -> in_progress`.
    pub fn resume_collection(&self, submission_id: &str, actor: Actor) -> Result<SubmissionResponse> {
        self.apply_transition(submission_id, actor, SubmissionState::InProgress)
    }

    /// Validate the submission's current data and, if valid, transition to
    /// `submitted`. If the current state cannot reach `submitted` at all,
    /// fails as a conflict without running validation; otherwise validates
    /// first and only transitions when the data is complete.
    pub fn submit(&self, submission_id: &str, actor: Actor) -> Result<SubmissionResponse> {
        let entry_arc = self.lookup(submission_id)?;
        let mut entry = entry_arc.lock().unwrap();
        let current_state = entry.state_machine.state();

        if !entry.state_machine.can_transition_to(SubmissionState::Submitted) {
            let resume_token = entry.resume_token.clone();
            drop(entry);
            return Ok(SubmissionResponse::Failure(self.blocked_error(
                submission_id,
                current_state,
                &resume_token,
                format!("cannot submit from state '{current_state:?}'"),
            )));
        }

        let validation = self
            .validation_engine
            .validate(Value::Object(entry.fields.clone()));
        if !validation.is_valid {
            let resume_token = entry.resume_token.clone();
            drop(entry);
            return Ok(SubmissionResponse::Failure(self.validation_error(
                submission_id,
                current_state,
                &resume_token,
                &validation,
            )));
        }

        let event = entry
            .state_machine
            .transition_to(SubmissionState::Submitted, actor)
            .expect("legality checked above");
        let state = entry.state_machine.state();
        let resume_token = entry.resume_token.clone();
        drop(entry);

        self.emitter.lock().unwrap().emit(&event);
        Ok(SubmissionResponse::Success(self.build_summary(
            submission_id,
            state,
            &resume_token,
            None,
        )))
    }

    /// `submitted -> needs_review`.
    pub fn request_review(&self, submission_id: &str, actor: Actor) -> Result<SubmissionResponse> {
        self.apply_transition(submission_id, actor, SubmissionState::NeedsReview)
    }

    /// `needs_review -> approved`.
    pub fn approve(&self, submission_id: &str, actor: Actor) -> Result<SubmissionResponse> {
        self.apply_transition(submission_id, actor, SubmissionState::Approved)
    }

    /// `submitted | needs_review -> rejected`. `reason` is informational
    /// only — it has no dedicated slot in the event payload and is not
    /// currently recorded.
    pub fn reject(
        &self,
        submission_id: &str,
        actor: Actor,
        _reason: Option<String>,
    ) -> Result<SubmissionResponse> {
        self.apply_transition(submission_id, actor, SubmissionState::Rejected)
    }

    /// `submitted | approved -> finalized`.
    pub fn finalize(&self, submission_id: &str, actor: Actor) -> Result<SubmissionResponse> {
        self.apply_transition(submission_id, actor, SubmissionState::Finalized)
    }

    /// `* -> cancelled`, legal from every non-terminal state.
    pub fn cancel(&self, submission_id: &str, actor: Actor) -> Result<SubmissionResponse> {
        self.apply_transition(submission_id, actor, SubmissionState::Cancelled)
    }

    /// `* -> expired`, driven by an external [`Scheduler`] consulting
    /// `ttl_ms`.
    pub fn expire(&self, submission_id: &str, actor: Actor) -> Result<SubmissionResponse> {
        self.apply_transition(submission_id, actor, SubmissionState::Expired)
    }

    fn lookup(&self, submission_id: &str) -> Result<Arc<Mutex<SubmissionEntry>>> {
        self.submissions
            .lock()
            .unwrap()
            .get(submission_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("submission {submission_id} not found")))
    }

    fn summarize_existing(&self, submission_id: &str) -> Result<SubmissionResponse> {
        let entry_arc = self.lookup(submission_id)?;
        let entry = entry_arc.lock().unwrap();
        Ok(SubmissionResponse::Success(self.build_summary(
            submission_id,
            entry.state_machine.state(),
            &entry.resume_token,
            None,
        )))
    }

    fn apply_transition(
        &self,
        submission_id: &str,
        actor: Actor,
        target: SubmissionState,
    ) -> Result<SubmissionResponse> {
        let entry_arc = self.lookup(submission_id)?;
        let mut entry = entry_arc.lock().unwrap();
        match entry.state_machine.transition_to(target, actor) {
            Ok(event) => {
                let state = entry.state_machine.state();
                let resume_token = entry.resume_token.clone();
                drop(entry);
                self.emitter.lock().unwrap().emit(&event);
                Ok(SubmissionResponse::Success(self.build_summary(
                    submission_id,
                    state,
                    &resume_token,
                    None,
                )))
            }
            Err(invalid) => {
                let state = entry.state_machine.state();
                let resume_token = entry.resume_token.clone();
                let message = invalid.message.clone();
                drop(entry);
                Ok(SubmissionResponse::Failure(
                    self.blocked_error(submission_id, state, &resume_token, message),
                ))
            }
        }
    }

    fn build_summary(
        &self,
        submission_id: &str,
        state: SubmissionState,
        resume_token: &str,
        missing_fields: Option<Vec<String>>,
    ) -> SubmissionSummary {
        SubmissionSummary {
            ok: true,
            submission_id: submission_id.to_string(),
            state,
            resume_token: resume_token.to_string(),
            schema: self.schema.clone(),
            missing_fields,
        }
    }

    /// Chooses the error taxonomy member for an operation blocked by the
    /// submission's current state (illegal transition, awaiting upload,
    /// needing review, or a terminal state).
    fn error_type_for_blocked_state(state: SubmissionState) -> ErrorType {
        match state {
            SubmissionState::AwaitingUpload => ErrorType::UploadPending,
            SubmissionState::NeedsReview => ErrorType::NeedsApproval,
            SubmissionState::Expired => ErrorType::Expired,
            SubmissionState::Cancelled => ErrorType::Cancelled,
            _ => ErrorType::Conflict,
        }
    }

    fn blocked_error(
        &self,
        submission_id: &str,
        state: SubmissionState,
        resume_token: &str,
        message: impl Into<String>,
    ) -> IntakeError {
        let error_type = Self::error_type_for_blocked_state(state);
        IntakeError::new(
            submission_id,
            state,
            resume_token,
            ErrorDetail::new(error_type).with_message(message.into()),
        )
    }

    fn validation_error(
        &self,
        submission_id: &str,
        state: SubmissionState,
        resume_token: &str,
        validation: &ValidationResult,
    ) -> IntakeError {
        let error_type = if validation.invalid_fields.is_empty() {
            ErrorType::Missing
        } else {
            ErrorType::Invalid
        };
        let next_actions = validation
            .errors
            .iter()
            .map(|field_error| {
                NextAction::new(NextActionType::CollectField)
                    .with_field(field_error.path.clone())
                    .with_hint(field_error.message.clone())
            })
            .collect();
        IntakeError::new(
            submission_id,
            state,
            resume_token,
            ErrorDetail::new(error_type)
                .with_message("submission data failed validation")
                .with_fields(validation.errors.clone())
                .with_next_actions(next_actions),
        )
    }
}
