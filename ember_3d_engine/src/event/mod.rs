//! Event bus
//!
//! Window-layer code dispatches events; engine subsystems only subscribe.

mod event;
mod event_bus;

pub use event::{Event, EventType};
pub use event_bus::{EventBus, ListenerId};
