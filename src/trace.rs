//! Recording every step of a sort, for replay or export.
use crate::error::Result;
use crate::shared::SharedSequence;
use crate::sort::{sort_with_rng, Algorithm, Comparator, StepObserver};
use crate::stats::StatsSnapshot;
use crate::value::RadixKey;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Values right after one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame<T> {
    /// all values, in order
    pub values: Vec<T>,
    /// value moved by the step, if any
    pub touched: Option<T>,
}

/// A whole sort, step by step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortTrace<T> {
    /// what ran
    pub algorithm: Algorithm,
    /// values before the first step
    pub initial: Vec<T>,
    /// one frame per step
    pub frames: Vec<Frame<T>>,
    /// counters at the end
    pub stats: StatsSnapshot,
}

impl<T> SortTrace<T> {
    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Did the sort take no step at all ?
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Values after the last step.
    pub fn final_values(&self) -> &[T] {
        self.frames
            .last()
            .map(|frame| frame.values.as_slice())
            .unwrap_or(&self.initial)
    }

    /// Save as json.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>
    where
        T: serde::Serialize,
    {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a trace saved with `save`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self>
    where
        T: DeserializeOwned,
    {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Observer snapshotting the sequence after each step.
#[derive(Debug)]
pub struct Recorder<'a, T> {
    sequence: &'a SharedSequence<T>,
    frames: Vec<Frame<T>>,
}

impl<'a, T: Clone> Recorder<'a, T> {
    /// Record steps of sorts running on given sequence.
    pub fn new(sequence: &'a SharedSequence<T>) -> Self {
        Recorder {
            sequence,
            frames: Vec::new(),
        }
    }

    /// All frames recorded so far.
    pub fn into_frames(self) -> Vec<Frame<T>> {
        self.frames
    }
}

impl<'a, T: Clone> StepObserver<T> for Recorder<'a, T> {
    fn on_step(&mut self, touched: Option<&T>) {
        self.frames.push(Frame {
            values: self.sequence.snapshot(),
            touched: touched.cloned(),
        })
    }
}

/// Sort a copy of `values`, recording every step.
///
/// ```
/// use rand::SeedableRng;
/// use sortviz::{record, Algorithm};
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let trace = record(Algorithm::Selection, vec![2, 1, 3], &|a: &u8, b: &u8| a.cmp(b), &mut rng).unwrap();
/// assert_eq!(trace.len(), 2);
/// assert_eq!(trace.final_values(), &[1, 2, 3]);
/// ```
pub fn record<T: Clone + RadixKey>(
    algorithm: Algorithm,
    values: Vec<T>,
    comparator: &dyn Comparator<T>,
    rng: &mut dyn RngCore,
) -> Result<SortTrace<T>> {
    let sequence = SharedSequence::from(values.clone());
    let mut recorder = Recorder::new(&sequence);
    sort_with_rng(algorithm, &sequence, comparator, &mut recorder, rng)?;
    Ok(SortTrace {
        algorithm,
        initial: values,
        frames: recorder.into_frames(),
        stats: sequence.stats().snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ascending(a: &i64, b: &i64) -> std::cmp::Ordering {
        a.cmp(b)
    }

    #[test]
    fn frames_follow_the_steps() {
        let mut rng = StdRng::seed_from_u64(0);
        let trace = record(Algorithm::Bubble, vec![3, 1, 2], &ascending, &mut rng).unwrap();
        assert_eq!(trace.len() as u64, trace.stats.steps);
        assert_eq!(trace.frames[0].values, vec![1, 3, 2]);
        assert_eq!(trace.frames[0].touched, Some(3));
        assert_eq!(trace.final_values(), &[1, 2, 3]);
        assert_eq!(trace.initial, vec![3, 1, 2]);
    }

    #[test]
    fn failures_propagate() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(record(Algorithm::Bitonic, vec![3, 1, 2], &ascending, &mut rng).is_err());
    }

    #[test]
    fn json_round_trip() {
        let mut rng = StdRng::seed_from_u64(0);
        let trace = record(Algorithm::Merge, vec![4, 2, 3, 1], &ascending, &mut rng).unwrap();
        let path = std::env::temp_dir().join(format!("sortviz-trace-{}.json", std::process::id()));
        trace.save(&path).unwrap();
        let loaded: SortTrace<i64> = SortTrace::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, trace);
    }
}
