//! Immutable event records and the in-process dispatcher that publishes
//! them as submissions transition.

mod emitter;
mod event;

pub use emitter::{EventEmitter, Listener, ListenerId};
pub use event::Event;
