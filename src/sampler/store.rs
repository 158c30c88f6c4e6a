//! Fixed-capacity raw sample buffer.
//!
//! The store is written by the capture writer, usually from a signal handler
//! on the sampled thread, so `push_capture` must never allocate, lock or
//! panic. Every slot is an atomic word and the length is published with
//! release ordering after the slot is written.
//!
//! Readers must stop the writer before calling [`SampleStore::snapshot`] or
//! [`SampleStore::clear`]; the store does not enforce this itself.

use crate::utils::config::MAX_SKIP;
use crate::utils::error::ResourceError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Raised once when the store runs out of room.
///
/// Advisory only: everything stored before the overflow stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowWarning {
    pub capacity: usize,
}

impl fmt::Display for OverflowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sample buffer full ({} entries); further samples were dropped. \
             Increase the capacity or the sampling interval",
            self.capacity
        )
    }
}

#[derive(Debug)]
pub struct SampleStore {
    slots: Box<[AtomicUsize]>,
    len: AtomicUsize,
    overflowed: AtomicBool,
    interval: Duration,
    skip: usize,
}

impl SampleStore {
    /// Allocate a store for `capacity` raw entries.
    ///
    /// # Errors
    /// * `ResourceError::InvalidInterval` - zero interval
    /// * `ResourceError::InvalidSkip` - more than `MAX_SKIP` bookkeeping words
    /// * `ResourceError::AllocationFailed` - buffer could not be reserved
    pub fn new(capacity: usize, interval: Duration, skip: usize) -> Result<Self, ResourceError> {
        if interval.is_zero() {
            return Err(ResourceError::InvalidInterval);
        }
        if skip > MAX_SKIP {
            return Err(ResourceError::InvalidSkip {
                skip,
                max: MAX_SKIP,
            });
        }

        let mut slots: Vec<AtomicUsize> = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| ResourceError::AllocationFailed { capacity })?;
        slots.extend((0..capacity).map(|_| AtomicUsize::new(0)));

        debug!(
            "Allocated sample store: {} entries, interval {:?}, skip {}",
            capacity, interval, skip
        );

        Ok(Self {
            slots: slots.into_boxed_slice(),
            len: AtomicUsize::new(0),
            overflowed: AtomicBool::new(false),
            interval,
            skip,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Valid entries written so far
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Whether an overflow happened since the last clear
    pub fn overflowed(&self) -> bool {
        self.overflowed.load(Ordering::Acquire)
    }

    /// Append one sample: frames (innermost first), the sentinel, then the
    /// bookkeeping words.
    ///
    /// Async-signal-safe. Entries that do not fit are dropped; the frames
    /// already written form a trailing run the decoder discards. Returns the
    /// overflow warning on the single push that first fills the store.
    pub fn push_capture(&self, frames: &[usize], bookkeeping: &[usize]) -> Option<OverflowWarning> {
        let mut refused = false;
        let words = frames
            .iter()
            .copied()
            .chain(std::iter::once(0))
            .chain(bookkeeping.iter().copied());

        for word in words {
            if !self.push_word(word) {
                refused = true;
                break;
            }
        }

        if refused || self.is_full() {
            self.raise_overflow()
        } else {
            None
        }
    }

    fn push_word(&self, word: usize) -> bool {
        let index = self.len.load(Ordering::Relaxed);
        match self.slots.get(index) {
            Some(slot) => {
                slot.store(word, Ordering::Relaxed);
                self.len.store(index + 1, Ordering::Release);
                true
            }
            None => false,
        }
    }

    fn raise_overflow(&self) -> Option<OverflowWarning> {
        if self.overflowed.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(OverflowWarning {
                capacity: self.capacity(),
            })
        }
    }

    /// Reset length to zero without releasing the buffer.
    pub fn clear(&self) {
        self.len.store(0, Ordering::Release);
        self.overflowed.store(false, Ordering::Release);
        debug!("Sample store cleared");
    }

    /// Copy out the valid prefix `[0, len)`.
    pub fn snapshot(&self) -> Snapshot {
        let len = self.len();
        let entries = self.slots[..len]
            .iter()
            .map(|slot| slot.load(Ordering::Relaxed))
            .collect();

        Snapshot {
            entries,
            skip: self.skip,
            capacity: self.capacity(),
            interval_nanos: u64::try_from(self.interval.as_nanos()).unwrap_or(u64::MAX),
            overflowed: self.overflowed(),
        }
    }
}

/// Immutable copy of the store's valid entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub entries: Vec<usize>,
    pub skip: usize,
    pub capacity: usize,
    pub interval_nanos: u64,
    #[serde(default)]
    pub overflowed: bool,
}

impl Snapshot {
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(self.interval_nanos)
    }
}
