//! Time-windowed event index.
//!
//! Answers "how many qualifying events occurred in the last N seconds",
//! independently for each payload value. Rate limiting and duplicate
//! suppression are both built on this: record an event per message,
//! then count recent events for the message's sender or text.
//!
//! Expiry is lazy: nothing is dropped until a windowed count is asked
//! for, and a purge removes each expired event from the primary
//! sequence and the payload index in the same step, so the two views
//! never disagree.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Opaque handle to a recorded event, usable with [`EventIndex::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventId(u64);

#[derive(Debug, Clone)]
struct Event<T> {
    timestamp: Instant,
    seq: u64,
    payload: T,
}

/// Multi-index of timestamped, payload-tagged events with a bounded age.
///
/// Events are kept in one timestamp-ordered sequence plus a
/// payload-keyed map of timestamp-ordered sequences. Ties are broken by
/// insertion order via a monotonically increasing sequence number.
#[derive(Debug)]
pub struct EventIndex<T> {
    max_age: Duration,
    next_seq: u64,
    /// Primary view, ordered by `(timestamp, seq)`.
    events: Vec<Event<T>>,
    /// Secondary view: payload -> `(timestamp, seq)` in the same order.
    by_payload: HashMap<T, Vec<(Instant, u64)>>,
}

impl<T: Eq + Hash + Clone> EventIndex<T> {
    /// Create an index that retains events for `max_age`.
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            next_seq: 0,
            events: Vec::new(),
            by_payload: HashMap::new(),
        }
    }

    /// Record an event with the current time.
    pub fn record(&mut self, payload: T) -> EventId {
        self.record_at(Instant::now(), payload)
    }

    /// Count recent events carrying `payload`, purging expired events
    /// from both views first.
    pub fn count_by_payload(&mut self, payload: &T) -> usize {
        self.purge_expired(Instant::now());
        self.by_payload.get(payload).map_or(0, Vec::len)
    }

    /// Total number of stored events. Does not purge; callers that need
    /// a fresh window use [`EventIndex::count_by_payload`].
    pub fn count_all(&self) -> usize {
        self.events.len()
    }

    /// Remove a single event from both views. Returns whether it was
    /// still present.
    ///
    /// Linear, which is fine: expiry removes from the head, and
    /// explicit removal is rare and usually targets old events.
    pub fn remove(&mut self, id: EventId) -> bool {
        let Some(idx) = self.events.iter().position(|e| e.seq == id.0) else {
            return false;
        };
        let event = self.events.remove(idx);
        if let Some(entries) = self.by_payload.get_mut(&event.payload) {
            if let Some(pos) = entries.iter().position(|&(_, seq)| seq == id.0) {
                entries.remove(pos);
            }
            if entries.is_empty() {
                self.by_payload.remove(&event.payload);
            }
        }
        true
    }

    /// Record with an explicit timestamp. Insertion keeps both views
    /// sorted (binary search), since expiry assumes it can pop expired
    /// events from the front.
    fn record_at(&mut self, now: Instant, payload: T) -> EventId {
        let seq = self.next_seq;
        self.next_seq += 1;

        let key = (now, seq);
        let idx = self
            .events
            .partition_point(|e| (e.timestamp, e.seq) <= key);
        self.events.insert(
            idx,
            Event {
                timestamp: now,
                seq,
                payload: payload.clone(),
            },
        );

        let entries = self.by_payload.entry(payload).or_default();
        let idx = entries.partition_point(|&entry| entry <= key);
        entries.insert(idx, key);

        EventId(seq)
    }

    /// Drop everything older than `max_age`, oldest first.
    fn purge_expired(&mut self, now: Instant) {
        while let Some(first) = self.events.first() {
            if first.timestamp + self.max_age >= now {
                break;
            }
            let id = EventId(first.seq);
            self.remove(id);
        }
    }
}
