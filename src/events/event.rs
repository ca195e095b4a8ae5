//! The immutable audit record minted on every submission transition.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Actor, EventType, SubmissionState};
use crate::types::EventId;

/// A single event in a submission's lifecycle.
///
/// Events are append-only and never mutated after construction; the event
/// log for a submission is a `Vec<Event>` owned by its state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: EventId,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub submission_id: String,
    #[serde(serialize_with = "serialize_ts_with_offset")]
    pub ts: DateTime<Utc>,
    pub actor: Actor,
    pub state: SubmissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// Renders `ts` with an explicit `+00:00` offset rather than chrono's default
/// `Z` suffix, matching the canonical wire form (spec §6) and the original's
/// `datetime.isoformat()`. Parsing (via chrono's own `Deserialize`) accepts
/// either form.
fn serialize_ts_with_offset<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false))
}

impl Event {
    pub fn new(
        event_type: EventType,
        submission_id: impl Into<String>,
        actor: Actor,
        state: SubmissionState,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            event_type,
            submission_id: submission_id.into(),
            ts: Utc::now(),
            actor,
            state,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Render as a single compact JSON line, suitable for a JSON-Lines event
    /// stream (one event per line, no intra-object whitespace).
    pub fn to_jsonl(&self) -> crate::types::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_jsonl(line: &str) -> crate::types::Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActorKind;

    fn sample() -> Event {
        Event::new(
            EventType::FieldUpdated,
            "sub_0123456789abcdef",
            Actor::new(ActorKind::Agent, "agent-1"),
            SubmissionState::InProgress,
        )
        .with_payload(serde_json::json!({"from_state": "draft", "to_state": "in_progress"}))
    }

    #[test]
    fn jsonl_round_trip_preserves_all_fields() {
        let event = sample();
        let line = event.to_jsonl().unwrap();
        assert!(!line.contains('\n'));
        let back = Event::from_jsonl(&line).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn jsonl_has_no_intra_object_whitespace() {
        let event = sample();
        let line = event.to_jsonl().unwrap();
        assert!(!line.contains(": "));
        assert!(!line.contains(", "));
    }

    #[test]
    fn payload_omitted_when_absent() {
        let event = Event::new(
            EventType::SubmissionCancelled,
            "sub_0123456789abcdef",
            Actor::system(),
            SubmissionState::Cancelled,
        );
        let v = serde_json::to_value(&event).unwrap();
        assert!(v.get("payload").is_none());
    }

    #[test]
    fn ts_serializes_with_explicit_utc_offset_not_z_suffix() {
        let event = sample();
        let v = serde_json::to_value(&event).unwrap();
        let ts = v["ts"].as_str().unwrap();
        assert!(ts.ends_with("+00:00"));
        assert!(!ts.ends_with('Z'));
    }
}
