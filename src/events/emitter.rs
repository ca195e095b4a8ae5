//! Synchronous in-process publish/subscribe dispatch for [`Event`]s.
//!
//! A listener that panics must never prevent other listeners from running,
//! nor escape `emit` — audit/tracing subscribers are best-effort sinks and
//! must never be able to destabilize an otherwise-legal transition.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::EventType;

use super::event::Event;

/// A boxed listener callback.
pub type Listener = Box<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by [`EventEmitter::on`]/[`EventEmitter::on_any`], needed
/// to unsubscribe later.
///
/// Rust closures aren't comparable by identity the way Python callables
/// are, so `off`/`off_any` key on this handle rather than the listener
/// value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// In-process event publish/subscribe dispatcher.
#[derive(Default)]
pub struct EventEmitter {
    listeners: HashMap<EventType, Vec<(ListenerId, Listener)>>,
    any_listeners: Vec<(ListenerId, Listener)>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listener_count", &self.listener_count(None))
            .finish()
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a specific event type. Returns a handle for `off`.
    pub fn on(&mut self, event_type: EventType, listener: Listener) -> ListenerId {
        let id = ListenerId::next();
        self.listeners.entry(event_type).or_default().push((id, listener));
        id
    }

    /// Subscribe to every event type. Returns a handle for `off_any`.
    pub fn on_any(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId::next();
        self.any_listeners.push((id, listener));
        id
    }

    /// Unsubscribe a type-specific listener. Silent no-op if absent.
    pub fn off(&mut self, event_type: EventType, id: ListenerId) {
        if let Some(list) = self.listeners.get_mut(&event_type) {
            list.retain(|(existing, _)| *existing != id);
        }
    }

    /// Unsubscribe a wildcard listener. Silent no-op if absent.
    pub fn off_any(&mut self, id: ListenerId) {
        self.any_listeners.retain(|(existing, _)| *existing != id);
    }

    /// Dispatch `event` to type-specific listeners (registration order),
    /// then wildcard listeners (registration order). Listener panics are
    /// caught and discarded; every remaining listener still runs.
    pub fn emit(&self, event: &Event) {
        if let Some(list) = self.listeners.get(&event.event_type) {
            for (_, listener) in list {
                Self::dispatch_one(listener, event);
            }
        }
        for (_, listener) in &self.any_listeners {
            Self::dispatch_one(listener, event);
        }
    }

    fn dispatch_one(listener: &Listener, event: &Event) {
        if let Err(panic_payload) = catch_unwind(AssertUnwindSafe(|| listener(event))) {
            let msg = panic_payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(event_id = %event.event_id, listener_panic = %msg, "event listener panicked");
        }
    }

    /// Remove all listeners (type-specific and wildcard).
    pub fn clear(&mut self) {
        self.listeners.clear();
        self.any_listeners.clear();
    }

    /// Count registered listeners. `None` counts every listener (including
    /// wildcard); `Some(t)` counts only listeners for `t`.
    pub fn listener_count(&self, event_type: Option<EventType>) -> usize {
        match event_type {
            Some(t) => self.listeners.get(&t).map(Vec::len).unwrap_or(0),
            None => {
                self.any_listeners.len()
                    + self.listeners.values().map(Vec::len).sum::<usize>()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Actor, ActorKind, SubmissionState};
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    fn sample_event(event_type: EventType) -> Event {
        Event::new(
            event_type,
            "sub_0123456789abcdef",
            Actor::new(ActorKind::System, "system"),
            SubmissionState::InProgress,
        )
    }

    #[test]
    fn type_specific_listener_fires_once_then_stops_after_off() {
        let mut emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let id = emitter.on(
            EventType::FieldUpdated,
            Box::new(move |_| {
                c.fetch_add(1, AtomicOrdering::SeqCst);
            }),
        );
        emitter.emit(&sample_event(EventType::FieldUpdated));
        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);

        emitter.off(EventType::FieldUpdated, id);
        emitter.emit(&sample_event(EventType::FieldUpdated));
        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn type_specific_fires_before_wildcard_in_registration_order() {
        let mut emitter = EventEmitter::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let o1 = order.clone();
        emitter.on_any(Box::new(move |_| o1.lock().unwrap().push("wild")));
        let o2 = order.clone();
        emitter.on(
            EventType::FieldUpdated,
            Box::new(move |_| o2.lock().unwrap().push("specific")),
        );
        emitter.emit(&sample_event(EventType::FieldUpdated));
        assert_eq!(*order.lock().unwrap(), vec!["specific", "wild"]);
    }

    #[test]
    fn panicking_listener_does_not_block_others() {
        let mut emitter = EventEmitter::new();
        emitter.on(
            EventType::FieldUpdated,
            Box::new(|_| panic!("boom")),
        );
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        emitter.on(
            EventType::FieldUpdated,
            Box::new(move |_| {
                c.fetch_add(1, AtomicOrdering::SeqCst);
            }),
        );
        emitter.emit(&sample_event(EventType::FieldUpdated));
        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn off_is_silent_noop_when_listener_absent() {
        let mut emitter = EventEmitter::new();
        emitter.off(EventType::FieldUpdated, ListenerId::next());
        emitter.off_any(ListenerId::next());
    }

    #[test]
    fn listener_count_distinguishes_type_specific_and_total() {
        let mut emitter = EventEmitter::new();
        emitter.on(EventType::FieldUpdated, Box::new(|_| {}));
        emitter.on(EventType::FieldUpdated, Box::new(|_| {}));
        emitter.on_any(Box::new(|_| {}));
        assert_eq!(emitter.listener_count(Some(EventType::FieldUpdated)), 2);
        assert_eq!(emitter.listener_count(None), 3);
    }

    #[test]
    fn clear_removes_every_listener() {
        let mut emitter = EventEmitter::new();
        emitter.on(EventType::FieldUpdated, Box::new(|_| {}));
        emitter.on_any(Box::new(|_| {}));
        emitter.clear();
        assert_eq!(emitter.listener_count(None), 0);
    }
}
