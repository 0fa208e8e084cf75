/* Copyright © 2018 Gianmarco Garrisi

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>. */

//! Events and the time-ordered calendar that holds them.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// The two transitions that bracket one execution of an activity by one
/// flow entity. A closed variant, not a string, so extensions (e.g. a
/// future `Cancel`) add a variant rather than a new tag value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A flow entity begins service at an activity.
    BeginService,
    /// A flow entity ends service at an activity.
    EndService,
}

impl EventKind {
    /// `EndService` sorts before `BeginService` at equal timestamps, so
    /// that resources freed by an end are available to a start at the same
    /// instant.
    fn tie_break_rank(self) -> u8 {
        match self {
            EventKind::EndService => 0,
            EventKind::BeginService => 1,
        }
    }
}

/// A scheduled state transition.
#[derive(Debug, Clone)]
pub struct Event {
    /// Simulated time at which the event fires.
    pub time: f64,
    /// What kind of transition this is.
    pub kind: EventKind,
    /// The flow entity this event concerns.
    pub entity_id: String,
    /// The activity this event concerns.
    pub activity_id: String,
    /// The priority of `activity_id` at scheduling time, used to break ties
    /// with other same-time, same-kind events. Higher goes first.
    pub priority: i32,
    /// Monotonically increasing insertion sequence, the final tie-breaker.
    pub(crate) seq: u64,
}

impl Event {
    fn sort_key(&self) -> (f64, u8, i32, u64) {
        (self.time, self.kind.tie_break_rank(), -self.priority, self.seq)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Event) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Event) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Event) -> Ordering {
        let (lt, lk, lp, ls) = self.sort_key();
        let (rt, rk, rp, rs) = other.sort_key();
        match lt.partial_cmp(&rt) {
            Some(Ordering::Equal) => (lk, lp, ls).cmp(&(rk, rp, rs)),
            Some(o) => o,
            None => panic!("Event time was uncomparable. Maybe a NaN"),
        }
    }
}

/// A time-ordered set of future events.
///
/// Internally a binary heap of `Reverse<Event>`, so that the event with the
/// smallest `(time, kind rank, -priority, insertion order)` key is always
/// the next one popped.
#[derive(Debug, Default)]
pub struct EventCalendar {
    events: BinaryHeap<Reverse<Event>>,
    next_seq: u64,
}

impl EventCalendar {
    /// Create an empty calendar.
    pub fn new() -> Self {
        EventCalendar {
            events: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule an event. `event.seq` is overwritten with the next
    /// insertion sequence number regardless of what the caller set.
    pub fn schedule(&mut self, mut event: Event) {
        event.seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Reverse(event));
    }

    /// Returns the next event to fire without removing it.
    pub fn peek(&self) -> Option<&Event> {
        self.events.peek().map(|Reverse(e)| e)
    }

    /// Removes and returns the next event to fire.
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop().map(|Reverse(e)| e)
    }

    /// Returns `true` if no events are scheduled.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the number of scheduled events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Removes every currently scheduled event concerning `entity_id` at
    /// `activity_id`, returning them. The core loop never cancels an event
    /// it has scheduled (there is no per-event cancellation per the
    /// engine's termination model), but the calendar exposes it as a
    /// building block for hosts that extend the engine with explicit
    /// deferred starts or cancellation.
    pub fn remove(&mut self, entity_id: &str, activity_id: &str) -> Vec<Event> {
        let (removed, keep): (Vec<Event>, Vec<Event>) = self
            .events
            .drain()
            .map(|Reverse(e)| e)
            .partition(|e| e.entity_id == entity_id && e.activity_id == activity_id);
        self.events = keep.into_iter().map(Reverse).collect();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(time: f64, kind: EventKind, priority: i32) -> Event {
        Event {
            time,
            kind,
            entity_id: "e".into(),
            activity_id: "a".into(),
            priority,
            seq: 0,
        }
    }

    #[test]
    fn pops_in_time_order() {
        let mut cal = EventCalendar::new();
        cal.schedule(ev(3.0, EventKind::EndService, 0));
        cal.schedule(ev(1.0, EventKind::EndService, 0));
        cal.schedule(ev(2.0, EventKind::EndService, 0));
        assert_eq!(cal.pop().unwrap().time, 1.0);
        assert_eq!(cal.pop().unwrap().time, 2.0);
        assert_eq!(cal.pop().unwrap().time, 3.0);
        assert!(cal.pop().is_none());
    }

    #[test]
    fn end_service_before_begin_service_at_same_time() {
        let mut cal = EventCalendar::new();
        cal.schedule(ev(1.0, EventKind::BeginService, 0));
        cal.schedule(ev(1.0, EventKind::EndService, 0));
        assert_eq!(cal.pop().unwrap().kind, EventKind::EndService);
        assert_eq!(cal.pop().unwrap().kind, EventKind::BeginService);
    }

    #[test]
    fn higher_priority_first_at_same_time_and_kind() {
        let mut cal = EventCalendar::new();
        cal.schedule(ev(1.0, EventKind::BeginService, 0));
        cal.schedule(ev(1.0, EventKind::BeginService, 10));
        let first = cal.pop().unwrap();
        assert_eq!(first.priority, 10);
    }

    #[test]
    fn fifo_on_full_tie() {
        let mut cal = EventCalendar::new();
        cal.schedule(ev(1.0, EventKind::BeginService, 0));
        cal.schedule(ev(1.0, EventKind::BeginService, 0));
        // seq is assigned by the calendar; first scheduled pops first.
        let first = cal.pop().unwrap();
        let second = cal.pop().unwrap();
        assert!(first.seq < second.seq);
    }

    #[test]
    fn remove_takes_out_only_matching_events() {
        let mut cal = EventCalendar::new();
        let mut keep = ev(2.0, EventKind::EndService, 0);
        keep.entity_id = "other".into();
        cal.schedule(keep);
        cal.schedule(ev(1.0, EventKind::BeginService, 0));
        cal.schedule(ev(3.0, EventKind::EndService, 0));

        let removed = cal.remove("e", "a");
        assert_eq!(removed.len(), 2);
        assert_eq!(cal.len(), 1);
        assert_eq!(cal.pop().unwrap().entity_id, "other");
    }
}
