//! Quick sort with Lomuto partitioning, done on the nodes themselves.
//!
//! The chain is opened (first and last nodes lose their sentinel links) for
//! the duration of the sort so that walking off either end yields `None`.
//! It is closed again when the sort ends, whether it succeeded or not.
use super::Tracker;
use crate::error::{Result, SortError};
use crate::sequence::NodeId;
use crate::shared::SharedSequence;
use std::cmp::Ordering;

/// Closes the chain back on drop.
struct Reattach<'a, T>(&'a SharedSequence<T>);

impl<'a, T> Drop for Reattach<'a, T> {
    fn drop(&mut self) {
        self.0.lock().reattach_ends();
    }
}

pub(super) fn sort<T: Clone>(tracker: &mut Tracker<'_, T>) -> Result<()> {
    let (first, last, len) = {
        let mut sequence = tracker.lock();
        let ends = (sequence.front_node(), sequence.back_node(), sequence.len());
        sequence.detach_ends();
        ends
    };
    let _reattach = Reattach(tracker.sequence());
    match (first, last) {
        (Some(first), Some(last)) => sort_range(tracker, first, last, len),
        _ => Ok(()),
    }
}

/// Sort the `len` nodes from `low` to `high`.
/// Only the smaller side of each partition is recursed into, the larger one
/// is handled by the loop, so depth stays logarithmic.
fn sort_range<T: Clone>(
    tracker: &mut Tracker<'_, T>,
    mut low: NodeId,
    mut high: NodeId,
    mut len: usize,
) -> Result<()> {
    while len > 1 {
        let split = partition(tracker, low, high)?;
        let (before, after) = {
            let sequence = tracker.lock();
            (
                sequence.prev_link(split.pivot)?,
                sequence.next_link(split.pivot)?,
            )
        };
        if split.left <= split.right {
            if split.left > 1 {
                let before = before.ok_or(SortError::InvalidNode)?;
                sort_range(tracker, low, before, split.left)?;
            }
            low = after.ok_or(SortError::InvalidNode)?;
            len = split.right;
        } else {
            if split.right > 1 {
                let after = after.ok_or(SortError::InvalidNode)?;
                sort_range(tracker, after, high, split.right)?;
            }
            high = before.ok_or(SortError::InvalidNode)?;
            len = split.left;
        }
    }
    Ok(())
}

/// Outcome of one partition: where the pivot landed and how many nodes
/// ended up on each side of it.
struct Split {
    pivot: NodeId,
    left: usize,
    right: usize,
}

/// Move everything not greater than the value of `high` in front of it.
///
/// The walk keeps the lock between two swaps, it is released before each
/// step so the observer can pace us.
fn partition<T: Clone>(tracker: &mut Tracker<'_, T>, low: NodeId, high: NodeId) -> Result<Split> {
    let pivot = tracker.read_node(high)?;
    let mut store = low;
    let mut current = low;
    let mut left = 0;
    let mut right = 0;
    loop {
        let moved = {
            let mut sequence = tracker.lock();
            let mut moved = None;
            while moved.is_none() && current != high {
                let value = sequence.node_value(current)?;
                tracker.stats().add_accesses(1);
                let next = sequence.next_link(current)?.ok_or(SortError::InvalidNode)?;
                if tracker.compare(value, &pivot) != Ordering::Greater {
                    if store != current {
                        moved = Some(value.clone());
                        sequence.swap_nodes(current, store)?;
                        tracker.stats().add_swap();
                        tracker.stats().add_accesses(4);
                    }
                    store = sequence.next_link(store)?.ok_or(SortError::InvalidNode)?;
                    left += 1;
                } else {
                    right += 1;
                }
                current = next;
            }
            moved
        };
        match moved {
            Some(value) => tracker.step(Some(&value)),
            None => break,
        }
    }
    if store != high {
        tracker.swap_nodes(high, store)?;
        tracker.step(Some(&pivot));
    }
    Ok(Split {
        pivot: store,
        left,
        right,
    })
}
