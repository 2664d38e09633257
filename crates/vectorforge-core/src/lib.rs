//! Shared building blocks used by every vectorforge crate: the generic
//! resilience event system and the async counter.

pub mod counter;
pub mod events;

pub use counter::AsyncCounter;
pub use events::{BoxedEventListener, EventListener, EventListeners, FnListener, ResilienceEvent};
