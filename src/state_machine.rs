//! The submission lifecycle state machine.
//!
//! Holds one submission's current state and enforces the fixed transition
//! table below. Every legal transition mints an [`Event`] into the
//! submission's local, append-only event log; an illegal one leaves state
//! untouched and fails with [`InvalidTransitionError`], which the runtime
//! orchestrator is responsible for converting into a `conflict`
//! [`crate::envelope::IntakeError`] — this module never constructs one
//! itself.

use thiserror::Error;

use crate::events::Event;
use crate::model::{Actor, EventType, SubmissionState};

/// Raised by [`SubmissionStateMachine::transition_to`] when the target
/// state is not reachable from the current one. Internal to the crate;
/// never returned to a caller directly.
#[derive(Error, Debug)]
#[error("invalid state transition: cannot transition from '{current:?}' to '{target:?}'")]
pub struct InvalidTransitionError {
    pub current: SubmissionState,
    pub target: SubmissionState,
    pub message: String,
}

/// The set of states reachable in one step from `state`, in the order the
/// spec lists them (used to build the "valid transitions are: ..." message
/// and by [`SubmissionStateMachine::can_transition_to`]).
fn valid_targets(state: SubmissionState) -> &'static [SubmissionState] {
    use SubmissionState::*;
    match state {
        Draft => &[InProgress, Cancelled, Expired],
        InProgress => &[AwaitingInput, AwaitingUpload, Submitted, Cancelled, Expired],
        AwaitingInput => &[InProgress, Cancelled, Expired],
        AwaitingUpload => &[InProgress, Cancelled, Expired],
        Submitted => &[NeedsReview, Finalized, Rejected, Cancelled, Expired],
        NeedsReview => &[Approved, Rejected, Cancelled, Expired],
        Approved => &[Finalized, Cancelled, Expired],
        Rejected | Finalized | Cancelled | Expired => &[],
    }
}

/// Maps a transition's target state to the event type it mints. States with
/// no distinguished "arrived here" semantic (the three intermediate states)
/// collapse to the generic `field.updated` kind.
fn event_type_for_target(target: SubmissionState) -> EventType {
    use SubmissionState::*;
    match target {
        Submitted => EventType::SubmissionSubmitted,
        NeedsReview => EventType::ReviewRequested,
        Approved => EventType::ReviewApproved,
        Rejected => EventType::ReviewRejected,
        Finalized => EventType::SubmissionFinalized,
        Cancelled => EventType::SubmissionCancelled,
        Expired => EventType::SubmissionExpired,
        InProgress | AwaitingInput | AwaitingUpload | Draft => EventType::FieldUpdated,
    }
}

/// Per-submission lifecycle state machine.
#[derive(Debug, Clone)]
pub struct SubmissionStateMachine {
    submission_id: String,
    state: SubmissionState,
    events: Vec<Event>,
}

impl SubmissionStateMachine {
    /// A fresh machine in `draft` for `submission_id`, with an empty event
    /// log. The runtime mints the `submission.created` event separately —
    /// see [`crate::state_machine`] module docs.
    pub fn new(submission_id: impl Into<String>) -> Self {
        Self {
            submission_id: submission_id.into(),
            state: SubmissionState::Draft,
            events: Vec::new(),
        }
    }

    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn can_transition_to(&self, target: SubmissionState) -> bool {
        valid_targets(self.state).contains(&target)
    }

    /// Attempt the transition. On success, mints and appends the
    /// corresponding event and returns it; on failure, state is unchanged
    /// and no event is appended.
    pub fn transition_to(
        &mut self,
        target: SubmissionState,
        actor: Actor,
    ) -> Result<Event, InvalidTransitionError> {
        if !self.can_transition_to(target) {
            let targets = valid_targets(self.state);
            let message = if targets.is_empty() {
                format!("'{:?}' is a terminal state, no transitions are allowed", self.state)
            } else {
                let mut names: Vec<String> = targets.iter().map(|s| format!("{s:?}")).collect();
                names.sort();
                format!(
                    "invalid state transition: cannot transition from '{:?}' to '{:?}'. valid transitions are: {}",
                    self.state,
                    target,
                    names.join(", ")
                )
            };
            return Err(InvalidTransitionError {
                current: self.state,
                target,
                message,
            });
        }

        let from_state = self.state;
        self.state = target;

        let event = Event::new(event_type_for_target(target), &self.submission_id, actor, target)
            .with_payload(serde_json::json!({
                "from_state": from_state,
                "to_state": target,
            }));
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// A defensive copy of the submission's event log in append order.
    pub fn events(&self) -> Vec<Event> {
        self.events.clone()
    }

    /// `{submissionId, state}` — the event log is externalized elsewhere
    /// and is not part of this round-trip.
    pub fn serialize(&self) -> serde_json::Value {
        serde_json::json!({
            "submissionId": self.submission_id,
            "state": self.state,
        })
    }

    pub fn deserialize(value: &serde_json::Value) -> crate::types::Result<Self> {
        let submission_id = value
            .get("submissionId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| crate::types::Error::internal("missing submissionId"))?
            .to_string();
        let state: SubmissionState = serde_json::from_value(
            value
                .get("state")
                .cloned()
                .ok_or_else(|| crate::types::Error::internal("missing state"))?,
        )?;
        Ok(Self {
            submission_id,
            state,
            events: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActorKind;

    fn actor() -> Actor {
        Actor::new(ActorKind::Agent, "bot-1")
    }

    #[test]
    fn legal_transition_changes_state_and_mints_event() {
        let mut sm = SubmissionStateMachine::new("sub_1");
        let event = sm.transition_to(SubmissionState::InProgress, actor()).unwrap();
        assert_eq!(sm.state(), SubmissionState::InProgress);
        assert_eq!(event.event_type, EventType::FieldUpdated);
        assert_eq!(sm.events().len(), 1);
    }

    #[test]
    fn illegal_transition_leaves_state_and_log_untouched() {
        let mut sm = SubmissionStateMachine::new("sub_1");
        let err = sm
            .transition_to(SubmissionState::Submitted, actor())
            .unwrap_err();
        assert_eq!(err.current, SubmissionState::Draft);
        assert_eq!(err.target, SubmissionState::Submitted);
        assert_eq!(sm.state(), SubmissionState::Draft);
        assert!(sm.events().is_empty());
    }

    #[test]
    fn terminal_state_rejects_every_further_transition() {
        let mut sm = SubmissionStateMachine::new("sub_1");
        sm.transition_to(SubmissionState::Cancelled, actor()).unwrap();
        assert!(sm.is_terminal());
        for target in [
            SubmissionState::InProgress,
            SubmissionState::Submitted,
            SubmissionState::Finalized,
        ] {
            assert!(sm.transition_to(target, actor()).is_err());
        }
        assert_eq!(sm.state(), SubmissionState::Cancelled);
    }

    #[test]
    fn full_approval_workflow_produces_expected_event_sequence() {
        let mut sm = SubmissionStateMachine::new("sub_1");
        sm.transition_to(SubmissionState::InProgress, actor()).unwrap();
        sm.transition_to(SubmissionState::Submitted, actor()).unwrap();
        sm.transition_to(SubmissionState::NeedsReview, actor()).unwrap();
        sm.transition_to(SubmissionState::Approved, Actor::new(ActorKind::Human, "reviewer-1"))
            .unwrap();
        sm.transition_to(SubmissionState::Finalized, actor()).unwrap();

        let types: Vec<EventType> = sm.events().iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                EventType::FieldUpdated,
                EventType::SubmissionSubmitted,
                EventType::ReviewRequested,
                EventType::ReviewApproved,
                EventType::SubmissionFinalized,
            ]
        );
        assert!(sm.is_terminal());
    }

    #[test]
    fn serialize_round_trips_submission_id_and_state() {
        let mut sm = SubmissionStateMachine::new("sub_1");
        sm.transition_to(SubmissionState::InProgress, actor()).unwrap();
        let value = sm.serialize();
        let restored = SubmissionStateMachine::deserialize(&value).unwrap();
        assert_eq!(restored.submission_id(), "sub_1");
        assert_eq!(restored.state(), SubmissionState::InProgress);
        assert!(restored.events().is_empty());
    }

    const ALL_STATES: [SubmissionState; 11] = [
        SubmissionState::Draft,
        SubmissionState::InProgress,
        SubmissionState::AwaitingInput,
        SubmissionState::AwaitingUpload,
        SubmissionState::Submitted,
        SubmissionState::NeedsReview,
        SubmissionState::Approved,
        SubmissionState::Rejected,
        SubmissionState::Finalized,
        SubmissionState::Cancelled,
        SubmissionState::Expired,
    ];

    fn state_strategy() -> impl proptest::strategy::Strategy<Value = SubmissionState> {
        proptest::sample::select(&ALL_STATES[..])
    }

    proptest::proptest! {
        #[test]
        fn property_transition_never_escapes_the_adjacency_table(from in state_strategy(), to in state_strategy()) {
            let mut sm = SubmissionStateMachine::new("sub_prop");
            // force the machine into `from` by going through draft when possible,
            // otherwise directly seed the private state via a draft->in_progress
            // detour followed by the remaining hops the table actually allows.
            sm.state = from;

            let allowed = valid_targets(from).contains(&to);
            let result = sm.transition_to(to, actor());

            if allowed {
                proptest::prop_assert!(result.is_ok());
                proptest::prop_assert_eq!(sm.state(), to);
            } else {
                proptest::prop_assert!(result.is_err());
                proptest::prop_assert_eq!(sm.state(), from);
            }
        }

        #[test]
        fn property_terminal_states_reject_every_target(from in proptest::sample::select(&[
            SubmissionState::Rejected,
            SubmissionState::Finalized,
            SubmissionState::Cancelled,
            SubmissionState::Expired,
        ][..]), to in state_strategy()) {
            let mut sm = SubmissionStateMachine::new("sub_prop");
            sm.state = from;
            let events_before = sm.events().len();
            let result = sm.transition_to(to, actor());
            proptest::prop_assert!(result.is_err());
            proptest::prop_assert_eq!(sm.state(), from);
            proptest::prop_assert_eq!(sm.events().len(), events_before);
        }
    }
}
