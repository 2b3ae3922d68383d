//! `Scheduler`: a deadline-ordered queue of one-shot callbacks driven by
//! a single [`crate::reactor::Reactor`] timer.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::reactor::Reactor;

/// A cancel handle for a scheduled event. Opaque and cheap to copy;
/// cancelling an event whose deadline has already fired (or that was
/// already cancelled) is a harmless no-op, matching ndn-cxx's
/// `EventId`/`CancelHandle` semantics, where a stale handle is simply
/// inert rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventId {
    expire_at: Instant,
    sequence: u64,
}

struct EventInfo {
    callback: Box<dyn FnOnce()>,
}

/// Schedules callbacks to run after a delay, coalesced onto one
/// [`Reactor`] timer armed to the queue's earliest deadline.
///
/// All state lives behind interior mutability, so every method takes
/// `&self`: a [`Scheduler`] shared via a plain `Rc`/`Arc` lets a running
/// callback call `schedule`/`cancel` on the very scheduler that is
/// invoking it. Each method only holds its internal borrows across its
/// own body and drops them before calling into any callback, so
/// [`Scheduler::poll`] never holds a borrow while a callback runs.
pub struct Scheduler<R: Reactor> {
    queue: RefCell<BTreeMap<EventId, EventInfo>>,
    next_sequence: Cell<u64>,
    is_event_executing: Cell<bool>,
    reactor: RefCell<R>,
}

impl<R: Reactor> Scheduler<R> {
    pub fn new(reactor: R) -> Self {
        Self {
            queue: RefCell::new(BTreeMap::new()),
            next_sequence: Cell::new(0),
            is_event_executing: Cell::new(false),
            reactor: RefCell::new(reactor),
        }
    }

    pub fn reactor(&self) -> Ref<'_, R> {
        self.reactor.borrow()
    }

    pub fn reactor_mut(&self) -> RefMut<'_, R> {
        self.reactor.borrow_mut()
    }

    pub fn is_pending(&self, id: EventId) -> bool {
        self.queue.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Schedules `callback` to run `after` from now.
    pub fn schedule(&self, after: Duration, callback: impl FnOnce() + 'static) -> EventId {
        let expire_at = self.reactor.borrow().now() + after;
        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);
        let id = EventId { expire_at, sequence };

        let (was_earliest, len_after) = {
            let mut queue = self.queue.borrow_mut();
            let was_earliest = queue.keys().next().is_some_and(|earliest| id < *earliest);
            queue.insert(id, EventInfo { callback: Box::new(callback) });
            (was_earliest, queue.len())
        };

        if !self.is_event_executing.get() && (was_earliest || len_after == 1) {
            self.schedule_next();
        }
        id
    }

    /// Cancels a previously scheduled event. A no-op if it already fired
    /// or was already cancelled.
    pub fn cancel(&self, id: EventId) {
        let (removed, was_earliest) = {
            let mut queue = self.queue.borrow_mut();
            let was_earliest = queue.keys().next() == Some(&id);
            (queue.remove(&id).is_some(), was_earliest)
        };
        if !removed {
            return;
        }
        if was_earliest {
            self.reactor.borrow_mut().cancel_timer();
        }
        if !self.is_event_executing.get() {
            self.schedule_next();
        }
    }

    /// Cancels every pending event.
    pub fn cancel_all(&self) {
        self.queue.borrow_mut().clear();
        self.reactor.borrow_mut().cancel_timer();
    }

    fn schedule_next(&self) {
        let earliest = self.queue.borrow().keys().next().copied();
        match earliest {
            Some(id) => self.reactor.borrow_mut().arm_timer(id.expire_at),
            None => self.reactor.borrow_mut().cancel_timer(),
        }
    }

    /// Runs every event whose deadline has passed, in deadline order
    /// (ties broken by schedule order), then re-arms the timer for
    /// whatever is left. Returns the number of events that ran.
    ///
    /// A callback that itself schedules or cancels events sees those
    /// changes folded into the same drain: a newly-scheduled event whose
    /// deadline has already passed by the reactor's current `now()` runs
    /// in this same `poll` call, not the next one. Each due event is
    /// popped out of `queue` before its callback runs, so the callback is
    /// free to call `schedule`/`cancel` on this same scheduler without
    /// tripping a borrow conflict.
    pub fn poll(&self) -> usize {
        self.is_event_executing.set(true);
        let mut fired = 0;
        loop {
            let now = self.reactor.borrow().now();
            let due = {
                let mut queue = self.queue.borrow_mut();
                match queue.keys().next().copied() {
                    Some(id) if id.expire_at <= now => queue.remove(&id),
                    _ => None,
                }
            };
            let Some(info) = due else { break };
            fired += 1;
            (info.callback)();
        }
        self.is_event_executing.set(false);
        self.schedule_next();
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactor::ManualReactor;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fires_in_deadline_order_not_schedule_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let scheduler = Scheduler::new(ManualReactor::new());

        let o = order.clone();
        scheduler.schedule(Duration::from_millis(30), move || o.borrow_mut().push("A"));
        let o = order.clone();
        scheduler.schedule(Duration::from_millis(10), move || o.borrow_mut().push("B"));
        let o = order.clone();
        scheduler.schedule(Duration::from_millis(20), move || o.borrow_mut().push("C"));

        scheduler.reactor_mut().advance(Duration::from_millis(35));
        scheduler.poll();

        assert_eq!(*order.borrow(), vec!["B", "C", "A"]);
    }

    #[test]
    fn cancel_prevents_execution() {
        let fired = Rc::new(RefCell::new(false));
        let scheduler = Scheduler::new(ManualReactor::new());
        let f = fired.clone();
        let id = scheduler.schedule(Duration::from_millis(10), move || *f.borrow_mut() = true);
        scheduler.cancel(id);
        scheduler.reactor_mut().advance(Duration::from_millis(20));
        scheduler.poll();
        assert!(!*fired.borrow());
    }

    #[test]
    fn cancelling_an_already_fired_event_is_a_no_op() {
        let scheduler = Scheduler::new(ManualReactor::new());
        let id = scheduler.schedule(Duration::from_millis(5), || {});
        scheduler.reactor_mut().advance(Duration::from_millis(10));
        scheduler.poll();
        scheduler.cancel(id); // should not panic
        assert!(!scheduler.is_pending(id));
    }

    #[test]
    fn reentrant_schedule_from_callback_is_folded_into_the_same_poll() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let scheduler = Rc::new(Scheduler::new(ManualReactor::new()));

        let sched_for_cb = Rc::clone(&scheduler);
        let o = order.clone();
        scheduler.schedule(Duration::from_millis(10), move || {
            o.borrow_mut().push("first");
            let o2 = o.clone();
            sched_for_cb.schedule(Duration::from_millis(0), move || o2.borrow_mut().push("second"));
        });

        scheduler.reactor_mut().advance(Duration::from_millis(10));
        scheduler.poll();

        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn timer_is_armed_for_earliest_pending_deadline() {
        let scheduler = Scheduler::new(ManualReactor::new());
        scheduler.schedule(Duration::from_millis(50), || {});
        scheduler.schedule(Duration::from_millis(10), || {});
        let deadline = scheduler.reactor().next_deadline().unwrap();
        let now = scheduler.reactor().now();
        assert_eq!(deadline.duration_since(now), Duration::from_millis(10));
    }
}
