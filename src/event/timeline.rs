//! Time-ordered queue of pending layer wake-ups and dispatches.
//!
//! A min-heap keyed on fire time and an insertion sequence number. Entries with
//! equal times come out in insertion order, so layers armed together wake in
//! the order they were armed.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::cancel::CancellationToken;
use super::time::Moment;
use super::types::{LayerId, SynthesisRequest};

/// What happens when an entry fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Run the layer's next tick.
    Wake(LayerId),
    /// Hand a request to the synthesis sink.
    Dispatch {
        layer: LayerId,
        request: SynthesisRequest,
    },
}

/// An entry on the timeline.
#[derive(Debug, Clone)]
pub struct Scheduled {
    pub at: Moment,
    pub token: CancellationToken,
    pub action: Action,
}

impl Scheduled {
    pub fn new(at: Moment, token: CancellationToken, action: Action) -> Self {
        Self { at, token, action }
    }
}

/// Heap slot ordered by `(at, seq)` only.
struct Slot {
    seq: u64,
    entry: Scheduled,
}

impl Slot {
    fn key(&self) -> (Moment, u64) {
        (self.entry.at, self.seq)
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Slot {}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A time-ordered queue of scheduled entries.
pub struct Timeline {
    heap: BinaryHeap<Reverse<Slot>>,
    next_seq: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Insert an entry after every entry with an equal or earlier time.
    pub fn insert(&mut self, entry: Scheduled) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Slot { seq, entry }));
    }

    /// Insert a batch of entries, in order.
    pub fn insert_batch(&mut self, entries: impl IntoIterator<Item = Scheduled>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    /// Remove and return the earliest entry if it fires strictly before `until`.
    pub fn pop_before(&mut self, until: Moment) -> Option<Scheduled> {
        if self.heap.peek().is_some_and(|Reverse(slot)| slot.entry.at < until) {
            self.heap.pop().map(|Reverse(slot)| slot.entry)
        } else {
            None
        }
    }

    /// Peek at the earliest entry without removing it.
    pub fn peek_next(&self) -> Option<&Scheduled> {
        self.heap.peek().map(|Reverse(slot)| &slot.entry)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every entry whose token has been cancelled.
    pub fn purge_cancelled(&mut self) -> usize {
        let before = self.heap.len();
        self.heap.retain(|Reverse(slot)| !slot.entry.token.is_cancelled());
        before - self.heap.len()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
