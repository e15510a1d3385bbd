//! All sorting algorithms, instrumented for visualization.
//!
//! Every algorithm mutates a `SharedSequence` one step at a time: each value
//! exchange or slot write happens under the sequence's lock, then the lock is
//! released and the `StepObserver` is called. The observer is the only place
//! where a sort may block (animation pacing, pause).
mod algorithm;
mod bitonic;
mod bogo;
mod bubble;
mod insertion;
mod merge;
mod quick;
mod radix;
mod selection;

pub use self::algorithm::{Algorithm, ParseAlgorithmError};

use crate::error::{Result, SortError};
use crate::sequence::{NodeId, Sequence};
use crate::shared::{SequenceGuard, SharedSequence};
use crate::stats::SortStats;
use crate::value::RadixKey;
use itertools::Itertools;
use rand::RngCore;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Total order used by a sort.
/// It must stay consistent for the whole duration of a sort.
pub trait Comparator<T> {
    /// Compare two values.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Called after each visible mutation, outside of the lock.
///
/// `touched` is the value which just moved, or `None` when a whole pass
/// changed everything (bogo sort). Observers may block and may read the
/// sequence but must not mutate it.
pub trait StepObserver<T> {
    /// One step happened.
    fn on_step(&mut self, touched: Option<&T>);
}

impl<T, F> StepObserver<T> for F
where
    F: FnMut(Option<&T>),
{
    fn on_step(&mut self, touched: Option<&T>) {
        self(touched)
    }
}

/// Observer ignoring all steps.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoObserver;

impl<T> StepObserver<T> for NoObserver {
    fn on_step(&mut self, _touched: Option<&T>) {}
}

/// Sort given sequence with given algorithm.
///
/// Sequences of less than two values are left untouched and the observer is
/// never called. On error the sequence is left partially sorted but always
/// structurally valid.
///
/// ```
/// use sortviz::{sort, Algorithm, SharedSequence};
///
/// let values = SharedSequence::from(vec![5, 3, 4, 1, 2]);
/// let mut steps = 0;
/// sort(
///     Algorithm::Bubble,
///     &values,
///     &|a: &i32, b: &i32| a.cmp(b),
///     &mut |_: Option<&i32>| steps += 1,
/// )
/// .unwrap();
/// assert_eq!(values.snapshot(), vec![1, 2, 3, 4, 5]);
/// assert_eq!(steps, 8);
/// ```
pub fn sort<T: Clone + RadixKey>(
    algorithm: Algorithm,
    sequence: &SharedSequence<T>,
    comparator: &dyn Comparator<T>,
    observer: &mut dyn StepObserver<T>,
) -> Result<()> {
    sort_with_rng(
        algorithm,
        sequence,
        comparator,
        observer,
        &mut rand::thread_rng(),
    )
}

/// Same as `sort` but with an explicit random source (for bogo sort).
pub fn sort_with_rng<T: Clone + RadixKey>(
    algorithm: Algorithm,
    sequence: &SharedSequence<T>,
    comparator: &dyn Comparator<T>,
    observer: &mut dyn StepObserver<T>,
    rng: &mut dyn RngCore,
) -> Result<()> {
    let mut tracker = Tracker {
        sequence,
        comparator,
        observer,
    };
    let len = tracker.len();
    if len < 2 {
        return Ok(());
    }
    debug!(%algorithm, len, "sort started");
    let result = match algorithm {
        Algorithm::Bubble => bubble::sort(&mut tracker),
        Algorithm::Insertion => insertion::sort(&mut tracker),
        Algorithm::Selection => selection::sort(&mut tracker),
        Algorithm::Quick => quick::sort(&mut tracker),
        Algorithm::Merge => merge::sort(&mut tracker),
        Algorithm::Bitonic => bitonic::sort(&mut tracker),
        Algorithm::Bogo => bogo::sort(&mut tracker, rng),
        Algorithm::Radix => radix::sort(&mut tracker),
    };
    let stats = sequence.stats().snapshot();
    match &result {
        Ok(()) => debug!(
            %algorithm,
            comparisons = stats.comparisons,
            swaps = stats.swaps,
            steps = stats.steps,
            "sort finished"
        ),
        Err(error) => warn!(%algorithm, %error, "sort aborted"),
    }
    result
}

/// Are adjacent values all in order ?
pub fn is_sorted<T>(sequence: &Sequence<T>, comparator: &dyn Comparator<T>) -> bool {
    sequence
        .iter()
        .tuple_windows()
        .all(|(a, b)| comparator.compare(a, b) != Ordering::Greater)
}

/// Everything an algorithm needs: the guarded sequence, the comparator and
/// the observer. All accesses are counted in the sequence's stats.
pub(crate) struct Tracker<'a, T> {
    sequence: &'a SharedSequence<T>,
    comparator: &'a dyn Comparator<T>,
    observer: &'a mut dyn StepObserver<T>,
}

impl<'a, T: Clone> Tracker<'a, T> {
    pub(crate) fn sequence(&self) -> &'a SharedSequence<T> {
        self.sequence
    }

    pub(crate) fn lock(&self) -> SequenceGuard<'a, T> {
        self.sequence.lock()
    }

    pub(crate) fn stats(&self) -> &'a SortStats {
        self.sequence.stats()
    }

    pub(crate) fn len(&self) -> usize {
        self.sequence.len()
    }

    pub(crate) fn compare(&self, a: &T, b: &T) -> Ordering {
        self.stats().add_comparison();
        self.comparator.compare(a, b)
    }

    pub(crate) fn read(&self, index: usize) -> Result<T> {
        let value = self.lock().get(index)?.clone();
        self.stats().add_accesses(1);
        Ok(value)
    }

    pub(crate) fn read_pair(&self, i: usize, j: usize) -> Result<(T, T)> {
        let sequence = self.lock();
        let pair = (sequence.get(i)?.clone(), sequence.get(j)?.clone());
        self.stats().add_accesses(2);
        Ok(pair)
    }

    /// Clone `count` values starting at `start` into `out`, under one lock.
    pub(crate) fn read_range_into(&self, start: usize, count: usize, out: &mut Vec<T>) -> Result<()> {
        let sequence = self.lock();
        let len = sequence.len();
        if start + count > len {
            return Err(SortError::OutOfRange {
                index: start + count - 1,
                len,
            });
        }
        out.extend(sequence.iter().skip(start).take(count).cloned());
        self.stats().add_accesses(count as u64);
        Ok(())
    }

    pub(crate) fn read_node(&self, node: NodeId) -> Result<T> {
        let value = self.lock().node_value(node)?.clone();
        self.stats().add_accesses(1);
        Ok(value)
    }

    pub(crate) fn write(&self, index: usize, value: T) -> Result<()> {
        self.lock().set(index, value)?;
        self.stats().add_swap();
        self.stats().add_accesses(1);
        Ok(())
    }

    pub(crate) fn swap(&self, i: usize, j: usize) -> Result<()> {
        self.lock().swap(i, j)?;
        self.stats().add_swap();
        self.stats().add_accesses(4);
        Ok(())
    }

    /// Exchange the values of two nodes, returning the value now held by `b`.
    pub(crate) fn swap_nodes(&self, a: NodeId, b: NodeId) -> Result<T> {
        let mut sequence = self.lock();
        sequence.swap_nodes(a, b)?;
        self.stats().add_swap();
        self.stats().add_accesses(4);
        Ok(sequence.node_value(b)?.clone())
    }

    pub(crate) fn is_sorted(&self) -> bool {
        let sequence = self.lock();
        self.stats().add_accesses(sequence.len() as u64);
        sequence
            .iter()
            .tuple_windows()
            .all(|(a, b)| self.compare(a, b) != Ordering::Greater)
    }

    /// Report a step to the observer. Never call it while holding the lock.
    pub(crate) fn step(&mut self, touched: Option<&T>) {
        self.stats().add_step();
        self.observer.on_step(touched)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::value::{natural_order, Value};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn ascending(a: &i64, b: &i64) -> Ordering {
        a.cmp(b)
    }

    /// Sort given values, returning the result and the number of steps.
    pub(crate) fn run(algorithm: Algorithm, values: Vec<i64>) -> (Vec<i64>, usize) {
        let shared = SharedSequence::from(values);
        let mut steps = 0;
        sort_with_rng(
            algorithm,
            &shared,
            &ascending,
            &mut |_: Option<&i64>| steps += 1,
            &mut StdRng::seed_from_u64(0),
        )
        .expect("sort failed");
        assert!(shared.lock().is_well_linked());
        (shared.snapshot(), steps)
    }

    fn sorted(mut values: Vec<i64>) -> Vec<i64> {
        values.sort();
        values
    }

    #[test]
    fn every_algorithm_sorts() {
        let input = vec![12, 3, 7, 7, 0, 15, 2, 9, 1, 4, 4, 11, 8, 6, 5, 10];
        for algorithm in Algorithm::ALL.iter().copied() {
            if algorithm == Algorithm::Bogo {
                continue;
            }
            let (output, steps) = run(algorithm, input.clone());
            assert_eq!(output, sorted(input.clone()), "{} failed", algorithm);
            assert!(steps > 0, "{} never reported a step", algorithm);
        }
    }

    #[test]
    fn tiny_sequences_are_left_alone() {
        for algorithm in Algorithm::ALL.iter().copied() {
            for values in vec![vec![], vec![42]] {
                let shared = SharedSequence::from(values.clone());
                let mut steps = 0;
                sort(
                    algorithm,
                    &shared,
                    &ascending,
                    &mut |_: Option<&i64>| steps += 1,
                )
                .unwrap();
                assert_eq!(steps, 0);
                assert_eq!(shared.snapshot(), values);
                assert_eq!(shared.stats().snapshot().comparisons, 0);
            }
        }
    }

    #[test]
    fn bubble_counters_on_example() {
        let shared = SharedSequence::from(vec![5i64, 3, 4, 1, 2]);
        sort(Algorithm::Bubble, &shared, &ascending, &mut NoObserver).unwrap();
        assert_eq!(shared.snapshot(), vec![1, 2, 3, 4, 5]);
        let stats = shared.stats().snapshot();
        assert!(stats.comparisons >= 10);
        // one adjacent swap per inversion
        assert_eq!(stats.swaps, 8);
        assert_eq!(stats.steps, 8);
    }

    #[test]
    fn is_sorted_checks_adjacent_pairs() {
        let cmp: &dyn Comparator<i64> = &ascending;
        assert!(is_sorted(&Sequence::new(), cmp));
        assert!(is_sorted(&vec![3].into_iter().collect(), cmp));
        assert!(is_sorted(&vec![1, 1, 2].into_iter().collect(), cmp));
        assert!(!is_sorted(&vec![1, 3, 2].into_iter().collect(), cmp));
    }

    #[test]
    fn descending_comparator() {
        let shared = SharedSequence::from(vec![2i64, 9, 4, 7]);
        sort(
            Algorithm::Merge,
            &shared,
            &|a: &i64, b: &i64| b.cmp(a),
            &mut NoObserver,
        )
        .unwrap();
        assert_eq!(shared.snapshot(), vec![9, 7, 4, 2]);
    }

    #[test]
    fn stable_algorithms_keep_equal_keys_in_order() {
        let input: Vec<Value> = vec![
            Value::record(2, "a"),
            Value::record(1, "b"),
            Value::record(2, "c"),
            Value::record(0, "d"),
            Value::record(1, "e"),
            Value::record(2, "f"),
        ];
        for algorithm in Algorithm::ALL.iter().copied().filter(|a| a.is_stable()) {
            let shared = SharedSequence::from(input.clone());
            sort(algorithm, &shared, &natural_order, &mut NoObserver).unwrap();
            let labels: Vec<String> = shared
                .snapshot()
                .into_iter()
                .map(|v| match v {
                    Value::Record { label, .. } => label,
                    other => panic!("unexpected {}", other),
                })
                .collect();
            assert_eq!(labels, vec!["d", "b", "e", "a", "c", "f"], "{}", algorithm);
        }
    }

    #[test]
    fn observer_sees_touched_values_in_order() {
        let shared = SharedSequence::from(vec![2i64, 1]);
        let mut touched = Vec::new();
        sort(
            Algorithm::Bubble,
            &shared,
            &ascending,
            &mut |v: Option<&i64>| touched.push(v.copied()),
        )
        .unwrap();
        assert_eq!(touched, vec![Some(2)]);
    }

    proptest! {
        #[test]
        fn sorting_is_a_sorted_permutation(values in proptest::collection::vec(-50i64..50, 0..40)) {
            for algorithm in Algorithm::ALL.iter().copied() {
                if algorithm == Algorithm::Bogo || algorithm == Algorithm::Bitonic {
                    continue;
                }
                if algorithm == Algorithm::Radix && values.iter().any(|v| *v < 0) {
                    continue;
                }
                let (output, _) = run(algorithm, values.clone());
                prop_assert_eq!(output, sorted(values.clone()));
            }
        }

        #[test]
        fn bitonic_sorts_powers_of_two(exponent in 0u32..6, seed in any::<u64>()) {
            let len = 1usize << exponent;
            let mut values: Vec<i64> = (0..len as i64).collect();
            rand::seq::SliceRandom::shuffle(&mut values[..], &mut StdRng::seed_from_u64(seed));
            let (output, _) = run(Algorithm::Bitonic, values);
            prop_assert_eq!(output, (0..len as i64).collect::<Vec<_>>());
        }

        #[test]
        fn radix_sorts_non_negative(values in proptest::collection::vec(0i64..100_000, 0..60)) {
            let (output, _) = run(Algorithm::Radix, values.clone());
            prop_assert_eq!(output, sorted(values));
        }
    }
}
