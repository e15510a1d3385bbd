//! Bubble sort, walking the links of the sequence.
use super::Tracker;
use crate::error::Result;
use std::cmp::Ordering;

/// Scan adjacent pairs, swapping inverted ones, until a pass swaps nothing.
pub(super) fn sort<T: Clone>(tracker: &mut Tracker<'_, T>) -> Result<()> {
    loop {
        let mut swapped = false;
        let mut current = tracker.lock().front_node();
        while let Some(node) = current {
            let (next, moved) = {
                let mut sequence = tracker.lock();
                let next = match sequence.next_link(node)? {
                    Some(next) => next,
                    None => break,
                };
                let first = sequence.node_value(node)?;
                let second = sequence.node_value(next)?;
                tracker.stats().add_accesses(2);
                if tracker.compare(first, second) == Ordering::Greater {
                    let moved = first.clone();
                    sequence.swap_nodes(node, next)?;
                    tracker.stats().add_swap();
                    tracker.stats().add_accesses(2);
                    (next, Some(moved))
                } else {
                    (next, None)
                }
            };
            if let Some(moved) = moved {
                tracker.step(Some(&moved));
                swapped = true;
            }
            current = Some(next);
        }
        if !swapped {
            return Ok(());
        }
    }
}
