/// Publish/subscribe registry keyed by event type

use rustc_hash::FxHashMap;

use super::{Event, EventType};

/// Handle returned by `EventBus::listen`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&Event) -> bool + Send>;

/// Event bus
///
/// Listeners run in subscription order. A listener returning `true`
/// consumes the event and later listeners are skipped.
#[derive(Default)]
pub struct EventBus {
    listeners: FxHashMap<EventType, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every event of `event_type`
    pub fn listen<F>(&mut self, event_type: EventType, listener: F) -> ListenerId
    where
        F: FnMut(&Event) -> bool + Send + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.entry(event_type).or_default().push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(position) = listeners.iter().position(|(listener_id, _)| *listener_id == id) {
                listeners.remove(position);
                return true;
            }
        }
        false
    }

    /// Deliver an event; returns true if a listener consumed it
    pub fn dispatch(&mut self, event: &Event) -> bool {
        let Some(listeners) = self.listeners.get_mut(&event.event_type()) else {
            return false;
        };
        for (_, listener) in listeners.iter_mut() {
            if listener(event) {
                return true;
            }
        }
        false
    }

    /// Number of listeners for one event type
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners.get(&event_type).map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
