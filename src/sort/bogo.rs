//! Shuffle until sorted. Every shuffle is a single step with no touched value.
use super::Tracker;
use crate::error::Result;
use rand::RngCore;

pub(super) fn sort<T: Clone>(tracker: &mut Tracker<'_, T>, rng: &mut dyn RngCore) -> Result<()> {
    while !tracker.is_sorted() {
        {
            let mut sequence = tracker.lock();
            sequence.shuffle(rng);
            let len = sequence.len() as u64;
            for _ in 1..len {
                tracker.stats().add_swap();
            }
            tracker.stats().add_accesses(len.saturating_sub(1) * 4);
        }
        tracker.step(None);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::sort::tests::ascending;
    use crate::{sort_with_rng, Algorithm, SharedSequence};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn small_inputs_terminate() {
        let shared = SharedSequence::from(vec![3i64, 1, 4, 0, 2]);
        let mut touched = Vec::new();
        sort_with_rng(
            Algorithm::Bogo,
            &shared,
            &ascending,
            &mut |v: Option<&i64>| touched.push(v.copied()),
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();
        assert_eq!(shared.snapshot(), vec![0, 1, 2, 3, 4]);
        assert!(!touched.is_empty());
        assert!(touched.iter().all(Option::is_none));
    }

    #[test]
    fn sorted_input_is_not_shuffled() {
        let shared = SharedSequence::from(vec![1i64, 2, 3]);
        let mut steps = 0;
        sort_with_rng(
            Algorithm::Bogo,
            &shared,
            &ascending,
            &mut |_: Option<&i64>| steps += 1,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();
        assert_eq!(steps, 0);
        assert_eq!(shared.stats().snapshot().comparisons, 2);
    }
}
