//! Named-event observer capability.
//!
//! Change notification in the form model is consumed exclusively by the
//! editor UI layer, so the capability is an explicit field on the objects
//! that actually need it (the form container) rather than a mixin on every
//! model value.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

type Handler = Box<dyn Fn()>;

/// Subscribe/fire registry for named events.
///
/// Handlers run synchronously, in subscription order, on the thread that
/// fires the event. The registry is single-threaded by design; handlers
/// must not subscribe new handlers while an event is being fired.
#[derive(Default)]
pub struct EventEmitter {
    handlers: RefCell<HashMap<String, Vec<Handler>>>,
}

impl EventEmitter {
    /// Creates an empty event registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a handler to a named event.
    pub fn on(&self, event: impl Into<String>, handler: impl Fn() + 'static) {
        self.handlers
            .borrow_mut()
            .entry(event.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// Fires a named event and returns the number of handlers invoked.
    ///
    /// Firing an event nobody subscribed to is a no-op.
    pub fn fire(&self, event: &str) -> usize {
        let handlers = self.handlers.borrow();
        match handlers.get(event) {
            Some(subscribed) => {
                for handler in subscribed {
                    handler();
                }
                subscribed.len()
            }
            None => 0,
        }
    }

    /// Returns the number of handlers subscribed to a named event.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers
            .borrow()
            .get(event)
            .map_or(0, |subscribed| subscribed.len())
    }
}

impl Debug for EventEmitter {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.borrow();
        let mut events: Vec<(&str, usize)> = handlers
            .iter()
            .map(|(event, subscribed)| (event.as_str(), subscribed.len()))
            .collect();
        events.sort_unstable();
        formatter
            .debug_struct("EventEmitter")
            .field("events", &events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::EventEmitter;

    #[test]
    fn fire_invokes_subscribed_handlers_in_order() {
        let events = EventEmitter::new();
        let seen = Rc::new(Cell::new(0));

        let first = Rc::clone(&seen);
        events.on("question-added", move || first.set(first.get() + 1));
        let second = Rc::clone(&seen);
        events.on("question-added", move || second.set(second.get() + 10));

        assert_eq!(events.fire("question-added"), 2);
        assert_eq!(seen.get(), 11);
    }

    #[test]
    fn fire_without_subscribers_is_a_no_op() {
        let events = EventEmitter::new();
        assert_eq!(events.fire("question-removed"), 0);
    }

    #[test]
    fn handler_count_tracks_subscriptions_per_event() {
        let events = EventEmitter::new();
        events.on("question-added", || {});
        assert_eq!(events.handler_count("question-added"), 1);
        assert_eq!(events.handler_count("question-removed"), 0);
    }
}
