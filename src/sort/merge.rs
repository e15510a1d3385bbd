//! Top-down merge sort.
//! Each merged range is copied into one scratch buffer allocated once for the
//! whole sort, then written back value by value.
use super::Tracker;
use crate::error::{Result, SortError};
use std::cmp::Ordering;

pub(super) fn sort<T: Clone>(tracker: &mut Tracker<'_, T>) -> Result<()> {
    let len = tracker.len();
    let mut scratch: Vec<T> = Vec::new();
    scratch
        .try_reserve_exact(len)
        .map_err(|_| SortError::AllocationFailure(len))?;
    split(tracker, &mut scratch, 0, len - 1)
}

fn split<T: Clone>(
    tracker: &mut Tracker<'_, T>,
    scratch: &mut Vec<T>,
    left: usize,
    right: usize,
) -> Result<()> {
    if left < right {
        let middle = left + (right - left) / 2;
        split(tracker, scratch, left, middle)?;
        split(tracker, scratch, middle + 1, right)?;
        merge(tracker, scratch, left, middle, right)?;
    }
    Ok(())
}

fn merge<T: Clone>(
    tracker: &mut Tracker<'_, T>,
    scratch: &mut Vec<T>,
    left: usize,
    middle: usize,
    right: usize,
) -> Result<()> {
    scratch.clear();
    tracker.read_range_into(left, right - left + 1, scratch)?;
    let left_end = middle - left + 1;
    let right_end = scratch.len();
    let (mut i, mut j) = (0, left_end);
    let mut target = left;
    while i < left_end || j < right_end {
        let take_left = j == right_end
            || (i < left_end && tracker.compare(&scratch[i], &scratch[j]) != Ordering::Greater);
        let source = if take_left {
            i += 1;
            i - 1
        } else {
            j += 1;
            j - 1
        };
        tracker.write(target, scratch[source].clone())?;
        tracker.step(Some(&scratch[source]));
        target += 1;
    }
    Ok(())
}
