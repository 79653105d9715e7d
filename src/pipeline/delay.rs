//! Fixed-depth delay line.
//!
//! A ring of `depth` slots. Every advancing edge overwrites the oldest slot
//! with the newest value, so a value pushed at edge t is the oldest entry
//! during the cycle after edge t + depth - 1, exactly when a pipeline of the
//! same depth presents the results computed from it.

use super::memory::BankId;
use alloc::vec;
use alloc::vec::Vec;
use core::num::NonZero;

/// Destination of one in-flight butterfly.
///
/// Results go to the bank opposite `source`, A' at `addr_a`, B' at `addr_b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InFlight {
    pub addr_a: usize,
    pub addr_b: usize,
    pub source: BankId,
}

impl InFlight {
    #[inline]
    pub fn destination(&self) -> BankId {
        self.source.other()
    }
}

/// Write-back alignment queue: `None` marks a cycle without a butterfly.
pub type WriteBackQueue = DelayLine<Option<InFlight>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelayLine<T> {
    slots: Vec<T>,
    /// Index of the oldest slot.
    head: usize,
}

impl<T: Copy + Default> DelayLine<T> {
    pub fn new(depth: NonZero<usize>) -> Self {
        Self {
            slots: vec![T::default(); depth.get()],
            head: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Entry that leaves the line at the next advancing edge.
    #[inline]
    pub fn oldest(&self) -> T {
        self.slots[self.head]
    }

    /// One clock edge; holds when `advance` is low.
    pub fn clock(&mut self, advance: bool, newest: T) {
        if !advance {
            return;
        }
        self.slots[self.head] = newest;
        self.head = (self.head + 1) % self.slots.len();
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    pub fn reset(&mut self) {
        self.slots.fill(T::default());
        self.head = 0;
    }
}

impl DelayLine<Option<InFlight>> {
    /// Butterflies still waiting for their write-back.
    pub fn in_flight(&self) -> usize {
        self.iter().filter(|e| e.is_some()).count()
    }
}
