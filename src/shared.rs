//! A sequence behind its graph's lock.
//!
//! Every access to the values goes through `lock`, so a sort worker and the
//! renderer can never touch the sequence at the same time.
use crate::error::{Result, SortError};
use crate::sequence::Sequence;
use crate::stats::SortStats;
use rand::Rng;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Guarded sequence shared between one sort worker and any number of readers.
#[derive(Debug)]
pub struct SharedSequence<T> {
    sequence: Mutex<Sequence<T>>,
    stats: SortStats,
    locks: AtomicU64,
    len: AtomicUsize,
}

/// Access to a locked sequence.
/// Releasing it publishes the sequence length for lock free readers.
pub struct SequenceGuard<'a, T> {
    guard: MutexGuard<'a, Sequence<T>>,
    len: &'a AtomicUsize,
}

impl<'a, T> Deref for SequenceGuard<'a, T> {
    type Target = Sequence<T>;
    fn deref(&self) -> &Sequence<T> {
        &self.guard
    }
}

impl<'a, T> DerefMut for SequenceGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut Sequence<T> {
        &mut self.guard
    }
}

impl<'a, T> Drop for SequenceGuard<'a, T> {
    fn drop(&mut self) {
        // still under the lock here, fields drop after us
        self.len.store(self.guard.len(), Ordering::Release);
    }
}

impl<T> SharedSequence<T> {
    /// Wrap given sequence.
    pub fn new(sequence: Sequence<T>) -> Self {
        SharedSequence {
            len: AtomicUsize::new(sequence.len()),
            sequence: Mutex::new(sequence),
            stats: SortStats::default(),
            locks: AtomicU64::new(0),
        }
    }

    /// Take the lock.
    /// A panicking holder cannot leave the links half updated so poisoning is ignored.
    pub fn lock(&self) -> SequenceGuard<'_, T> {
        self.locks.fetch_add(1, Ordering::Relaxed);
        SequenceGuard {
            guard: self.sequence.lock().unwrap_or_else(PoisonError::into_inner),
            len: &self.len,
        }
    }

    /// How many times the lock was taken so far.
    pub fn lock_count(&self) -> u64 {
        self.locks.load(Ordering::Relaxed)
    }

    /// Counters of the sorts running on us.
    pub fn stats(&self) -> &SortStats {
        &self.stats
    }

    /// Number of values, as of the last released lock.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Are we empty ?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a value.
    pub fn push(&self, value: T) {
        self.lock().push(value)
    }

    /// Exchange two values under the lock.
    /// Swapping an index with itself is a no-op which does not even take the lock,
    /// the index is still checked against the published length.
    pub fn swap(&self, i: usize, j: usize) -> Result<()> {
        if i == j {
            let len = self.len();
            return if i < len {
                Ok(())
            } else {
                Err(SortError::OutOfRange { index: i, len })
            };
        }
        self.lock().swap(i, j)
    }

    /// Shuffle all values under one lock.
    pub fn shuffle<R: Rng + ?Sized>(&self, rng: &mut R) {
        self.lock().shuffle(rng)
    }

    /// Replace all values under one lock.
    pub fn replace_with<I: IntoIterator<Item = T>>(&self, values: I) {
        let mut sequence = self.lock();
        sequence.clear();
        sequence.extend(values);
    }

    /// Copy all values under one short lock, for painting a frame.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock().iter().cloned().collect()
    }

    /// Take the sequence out, leaving an empty one.
    pub fn take(&self) -> Sequence<T> {
        std::mem::take(&mut *self.lock())
    }
}

impl<T> Default for SharedSequence<T> {
    fn default() -> Self {
        SharedSequence::new(Sequence::new())
    }
}

impl<T> From<Sequence<T>> for SharedSequence<T> {
    fn from(sequence: Sequence<T>) -> Self {
        SharedSequence::new(sequence)
    }
}

impl<T> From<Vec<T>> for SharedSequence<T> {
    fn from(values: Vec<T>) -> Self {
        SharedSequence::new(values.into_iter().collect())
    }
}
