//! Insertion sort. Every single shift is a step, so inserted values visibly
//! walk backwards.
use super::Tracker;
use crate::error::Result;
use std::cmp::Ordering;

pub(super) fn sort<T: Clone>(tracker: &mut Tracker<'_, T>) -> Result<()> {
    let len = tracker.len();
    for i in 1..len {
        let key = tracker.read(i)?;
        let mut hole = i;
        while hole > 0 {
            let candidate = tracker.read(hole - 1)?;
            if tracker.compare(&candidate, &key) != Ordering::Greater {
                break;
            }
            tracker.write(hole, candidate.clone())?;
            tracker.step(Some(&candidate));
            hole -= 1;
        }
        tracker.write(hole, key.clone())?;
        tracker.step(Some(&key));
    }
    Ok(())
}
