//! Selection sort: one placement (and one step) per position.
use super::Tracker;
use crate::error::Result;
use std::cmp::Ordering;

pub(super) fn sort<T: Clone>(tracker: &mut Tracker<'_, T>) -> Result<()> {
    let len = tracker.len();
    let mut suffix = Vec::with_capacity(len);
    for i in 0..len - 1 {
        suffix.clear();
        tracker.read_range_into(i, len - i, &mut suffix)?;
        let mut smallest = 0;
        for j in 1..suffix.len() {
            if tracker.compare(&suffix[j], &suffix[smallest]) == Ordering::Less {
                smallest = j;
            }
        }
        if smallest != 0 {
            tracker.swap(i, i + smallest)?;
        }
        // step even without swap, to keep a steady pace
        tracker.step(Some(&suffix[smallest]));
    }
    Ok(())
}
