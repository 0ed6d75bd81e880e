//! Synchronous event bus connecting simulation producers to consumers.
//!
//! The bus is owned by whoever drives the simulation and passed by reference
//! wherever events are emitted or observed; there is no process-wide
//! singleton. Delivery is immediate and on the calling thread: `emit`
//! invokes every handler bound to the event's kind in registration order
//! and only returns once the event, and every follow-up event queued by the
//! handlers, has been fully dispatched.
//!
//! Failure policy is fail-fast: the first handler error aborts dispatch,
//! pending follow-up events are dropped, and the error propagates to the
//! `emit` caller, which treats the tick as fatal.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use thiserror::Error;

use crate::{Event, EventKind};

/// Error raised by an event handler, aborting dispatch of the current event.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("handler for {kind:?} failed: {message}")]
pub struct HandlerError {
    kind: EventKind,
    message: String,
}

impl HandlerError {
    /// Creates a new handler error for the given event kind.
    #[must_use]
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Event kind whose dispatch failed.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }
}

/// Queue handle through which a handler may emit follow-up events.
///
/// Follow-ups are fully dispatched before the outer `emit` call returns.
#[derive(Debug)]
pub struct FollowUps<'a> {
    queue: &'a mut VecDeque<Event>,
}

impl FollowUps<'_> {
    /// Queues an event for dispatch after the current event's handlers ran.
    pub fn emit(&mut self, event: Event) {
        self.queue.push_back(event);
    }
}

/// Callback invoked for every event of the kind it was bound to.
pub type Handler = Box<dyn FnMut(&Event, &mut FollowUps<'_>) -> Result<(), HandlerError>>;

/// Token identifying a bound handler so it can later be unbound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Slot {
    id: HandlerId,
    handler: Handler,
}

/// Registers handlers per event kind and delivers events synchronously.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Slot>>,
    queue: VecDeque<Event>,
    next_handler: u64,
}

impl EventBus {
    /// Creates an empty bus with no handlers bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a handler to an event kind.
    ///
    /// Multiple handlers may be bound to the same kind; they are invoked in
    /// registration order.
    pub fn bind(&mut self, kind: EventKind, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_handler);
        self.next_handler += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push(Slot { id, handler });
        id
    }

    /// Removes a previously bound handler.
    ///
    /// Returns `true` when a handler was actually removed.
    pub fn unbind(&mut self, kind: EventKind, id: HandlerId) -> bool {
        let Some(slots) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        slots.len() != before
    }

    /// Number of handlers currently bound to the given kind.
    #[must_use]
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Delivers an event to every handler bound to its kind.
    ///
    /// Handlers run synchronously in registration order. Follow-up events
    /// queued by handlers are dispatched in turn before `emit` returns. The
    /// first handler error aborts dispatch, drops any pending follow-ups and
    /// propagates to the caller.
    pub fn emit(&mut self, event: Event) -> Result<(), HandlerError> {
        self.queue.push_back(event);
        while let Some(event) = self.queue.pop_front() {
            let kind = event.kind();
            // Handlers are detached while they run so a handler can queue
            // follow-ups without aliasing the registration table.
            let Some(mut slots) = self.handlers.remove(&kind) else {
                continue;
            };
            let mut outcome = Ok(());
            for slot in slots.iter_mut() {
                let mut follow_ups = FollowUps {
                    queue: &mut self.queue,
                };
                outcome = (slot.handler)(&event, &mut follow_ups);
                if outcome.is_err() {
                    break;
                }
            }
            let _ = self.handlers.insert(kind, slots);
            if let Err(error) = outcome {
                self.queue.clear();
                return Err(error);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound: usize = self.handlers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("bound_handlers", &bound)
            .field("queued_events", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::{CellCoord, FoodId, PlayerId, SnakeId};

    fn born(value: u32) -> Event {
        Event::SnakeBorn {
            snake: SnakeId::new(value),
            player: PlayerId::new(value),
        }
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            let _ = bus.bind(
                EventKind::SnakeBorn,
                Box::new(move |_, _| {
                    seen.borrow_mut().push(label);
                    Ok(())
                }),
            );
        }

        bus.emit(born(0)).expect("dispatch succeeds");
        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn follow_ups_are_dispatched_before_emit_returns() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let chain = Rc::clone(&seen);
        let _ = bus.bind(
            EventKind::SnakeBorn,
            Box::new(move |_, follow_ups| {
                chain.borrow_mut().push("born");
                follow_ups.emit(Event::FoodRemoved {
                    food: FoodId::new(0),
                    cell: CellCoord::new(0, 0),
                });
                Ok(())
            }),
        );
        let tail = Rc::clone(&seen);
        let _ = bus.bind(
            EventKind::FoodRemoved,
            Box::new(move |_, _| {
                tail.borrow_mut().push("removed");
                Ok(())
            }),
        );

        bus.emit(born(1)).expect("dispatch succeeds");
        assert_eq!(*seen.borrow(), vec!["born", "removed"]);
    }

    #[test]
    fn failing_handler_aborts_dispatch_and_propagates() {
        let mut bus = EventBus::new();
        let reached = Rc::new(RefCell::new(false));

        let _ = bus.bind(
            EventKind::SnakeBorn,
            Box::new(|event, _| Err(HandlerError::new(event.kind(), "boom"))),
        );
        let flag = Rc::clone(&reached);
        let _ = bus.bind(
            EventKind::SnakeBorn,
            Box::new(move |_, _| {
                *flag.borrow_mut() = true;
                Ok(())
            }),
        );

        let error = bus.emit(born(2)).expect_err("dispatch fails");
        assert_eq!(error.kind(), EventKind::SnakeBorn);
        assert!(!*reached.borrow(), "later handlers must be skipped");

        // The bus stays usable after a failure.
        let _ = bus.unbind(EventKind::SnakeBorn, HandlerId(0));
    }

    #[test]
    fn unbind_removes_only_the_named_handler() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0u32));

        let first = {
            let count = Rc::clone(&count);
            bus.bind(
                EventKind::SnakeAte,
                Box::new(move |_, _| {
                    *count.borrow_mut() += 10;
                    Ok(())
                }),
            )
        };
        let _second = {
            let count = Rc::clone(&count);
            bus.bind(
                EventKind::SnakeAte,
                Box::new(move |_, _| {
                    *count.borrow_mut() += 1;
                    Ok(())
                }),
            )
        };

        assert!(bus.unbind(EventKind::SnakeAte, first));
        assert!(!bus.unbind(EventKind::SnakeAte, first));
        assert_eq!(bus.handler_count(EventKind::SnakeAte), 1);

        bus.emit(Event::SnakeAte {
            snake: SnakeId::new(0),
            player: PlayerId::new(0),
            food: FoodId::new(0),
            cell: CellCoord::new(0, 0),
            score: 5,
        })
        .expect("dispatch succeeds");
        assert_eq!(*count.borrow(), 1);
    }
}
