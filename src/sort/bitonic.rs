//! Bitonic sorting network.
//! Only defined for lengths which are a power of two; anything else is
//! rejected before a single value moves.
use super::Tracker;
use crate::error::{Result, SortError};
use std::cmp::Ordering;

pub(super) fn sort<T: Clone>(tracker: &mut Tracker<'_, T>) -> Result<()> {
    let len = tracker.len();
    if !len.is_power_of_two() {
        return Err(SortError::UnsupportedSize(len));
    }
    sort_range(tracker, 0, len, true)
}

fn sort_range<T: Clone>(
    tracker: &mut Tracker<'_, T>,
    low: usize,
    count: usize,
    ascending: bool,
) -> Result<()> {
    if count > 1 {
        let half = count / 2;
        sort_range(tracker, low, half, true)?;
        sort_range(tracker, low + half, half, false)?;
        merge(tracker, low, count, ascending)?;
    }
    Ok(())
}

fn merge<T: Clone>(
    tracker: &mut Tracker<'_, T>,
    low: usize,
    count: usize,
    ascending: bool,
) -> Result<()> {
    if count > 1 {
        let half = count / 2;
        for i in low..low + half {
            compare_exchange(tracker, i, i + half, ascending)?;
        }
        merge(tracker, low, half, ascending)?;
        merge(tracker, low + half, half, ascending)?;
    }
    Ok(())
}

fn compare_exchange<T: Clone>(
    tracker: &mut Tracker<'_, T>,
    i: usize,
    j: usize,
    ascending: bool,
) -> Result<()> {
    let (a, b) = tracker.read_pair(i, j)?;
    let wrong = match tracker.compare(&a, &b) {
        Ordering::Greater => ascending,
        Ordering::Less => !ascending,
        Ordering::Equal => false,
    };
    if wrong {
        tracker.swap(i, j)?;
        tracker.step(Some(&a));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::SortError;
    use crate::sort::tests::{ascending, run};
    use crate::{sort, Algorithm, SharedSequence};

    #[test]
    fn rejects_other_lengths_untouched() {
        let input = vec![6i64, 5, 4, 3, 2, 1];
        let shared = SharedSequence::from(input.clone());
        let mut steps = 0;
        let result = sort(
            Algorithm::Bitonic,
            &shared,
            &ascending,
            &mut |_: Option<&i64>| steps += 1,
        );
        assert!(matches!(result, Err(SortError::UnsupportedSize(6))));
        assert_eq!(shared.snapshot(), input);
        assert_eq!(steps, 0);
        assert_eq!(shared.stats().snapshot().swaps, 0);
    }

    #[test]
    fn sorts_eight_values() {
        let (output, steps) = run(Algorithm::Bitonic, vec![3, 7, 4, 8, 6, 2, 1, 5]);
        assert_eq!(output, (1..=8).collect::<Vec<_>>());
        assert!(steps > 0);
    }
}
