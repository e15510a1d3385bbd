//! One graph: its values, its lock and the sort currently running on it.
//!
//! A session is either idle or sorting. While sorting it may additionally be
//! paused. Pausing is cooperative: the sort blocks inside its step observer,
//! after the pacing delay and outside of the lock, until resumed.
use crate::error::{Result, SortError};
use crate::sequence::Sequence;
use crate::shared::SharedSequence;
use crate::sort::{is_sorted, sort_with_rng, Algorithm, Comparator};
use crate::stats::StatsSnapshot;
use crate::value::RadixKey;
use crate::WorkerPool;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Called on every step of a running sort, from the sort worker.
pub type StepHook<T> = Arc<dyn Fn(Option<&T>) + Send + Sync>;

/// Blocks sort workers while paused.
#[derive(Debug, Default)]
struct PauseGate {
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl PauseGate {
    fn set(&self, paused: bool) {
        *self.paused.lock().unwrap_or_else(PoisonError::into_inner) = paused;
        if !paused {
            self.resumed.notify_all();
        }
    }

    fn toggle(&self) -> bool {
        let mut paused = self.paused.lock().unwrap_or_else(PoisonError::into_inner);
        *paused = !*paused;
        if !*paused {
            self.resumed.notify_all();
        }
        *paused
    }

    fn is_paused(&self) -> bool {
        *self.paused.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait(&self) {
        let paused = self.paused.lock().unwrap_or_else(PoisonError::into_inner);
        let _resumed = self
            .resumed
            .wait_while(paused, |paused| *paused)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

/// Everything shared between the session and its sort worker.
struct State<T> {
    sequence: SharedSequence<T>,
    sorting: AtomicBool,
    gate: PauseGate,
    highlighted: Mutex<Option<T>>,
}

impl<T: Clone> State<T> {
    /// The step observer of every sort started by a session.
    fn on_step(
        &self,
        touched: Option<&T>,
        delay: Duration,
        hook: Option<&(dyn Fn(Option<&T>) + Send + Sync)>,
    ) {
        self.set_highlighted(touched.cloned());
        if let Some(hook) = hook {
            hook(touched);
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.set_highlighted(None);
        self.gate.wait();
    }

    fn set_highlighted(&self, value: Option<T>) {
        *self.highlighted.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}

/// Clears the sorting flag, even if the worker panics.
struct Idle<'a>(&'a AtomicBool);

impl<'a> Drop for Idle<'a> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// How a sort ended.
#[derive(Debug)]
pub struct SortReport {
    /// what ran
    pub algorithm: Algorithm,
    /// `Ok` if the graph ended up sorted
    pub outcome: Result<()>,
    /// counters at the end of the sort
    pub stats: StatsSnapshot,
}

/// Handle on a started sort.
#[derive(Debug)]
pub struct SortHandle {
    algorithm: Algorithm,
    receiver: Receiver<SortReport>,
}

impl SortHandle {
    /// The running algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Block until the sort ends.
    pub fn join(self) -> Result<SortReport> {
        self.receiver.recv().map_err(|_| SortError::WorkerLost)
    }

    /// The report if the sort already ended.
    /// A report is only handed out once.
    pub fn try_join(&self) -> Result<Option<SortReport>> {
        match self.receiver.try_recv() {
            Ok(report) => Ok(Some(report)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SortError::WorkerLost),
        }
    }
}

/// One graph and its sort controls.
///
/// ```
/// use std::sync::Arc;
/// use sortviz::{Algorithm, SortSession, WorkerPoolBuilder};
///
/// let pool = Arc::new(WorkerPoolBuilder::new().num_threads(1).build().unwrap());
/// let session = SortSession::<u32>::new(vec![3, 1, 2].into_iter().collect(), pool);
/// let handle = session.start(Algorithm::Insertion, |a: &u32, b: &u32| a.cmp(b)).unwrap();
/// let report = handle.join().unwrap();
/// assert!(report.outcome.is_ok());
/// assert!(!session.is_sorting());
/// assert_eq!(session.snapshot(), vec![1, 2, 3]);
/// ```
pub struct SortSession<T> {
    state: Arc<State<T>>,
    pool: Arc<WorkerPool>,
    algorithm: Algorithm,
    step_delay: Duration,
    seed: Option<u64>,
    hook: Option<StepHook<T>>,
}

impl<T> SortSession<T>
where
    T: Clone + RadixKey + Send + 'static,
{
    /// New idle session running its sorts on given pool.
    /// No pacing delay, bubble sort selected.
    pub fn new(sequence: Sequence<T>, pool: Arc<WorkerPool>) -> Self {
        SortSession {
            state: Arc::new(State {
                sequence: SharedSequence::new(sequence),
                sorting: AtomicBool::new(false),
                gate: PauseGate::default(),
                highlighted: Mutex::new(None),
            }),
            pool,
            algorithm: Algorithm::Bubble,
            step_delay: Duration::from_millis(0),
            seed: None,
            hook: None,
        }
    }

    /// Sleep that long after each step.
    pub fn set_step_delay(&mut self, delay: Duration) {
        self.step_delay = delay;
    }

    /// Seed the random source of bogo sorts (entropy by default).
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Call `hook` on every step of the next sorts (typically to request a redraw).
    pub fn set_step_hook<F>(&mut self, hook: F)
    where
        F: Fn(Option<&T>) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
    }

    /// Algorithm used by `start_selected`.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Change the algorithm used by `start_selected`.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    pub(crate) fn set_pool(&mut self, pool: Arc<WorkerPool>) {
        self.pool = pool;
    }

    /// The guarded values, for renderers.
    pub fn sequence(&self) -> &SharedSequence<T> {
        &self.state.sequence
    }

    /// Copy of the values, taken under the lock.
    pub fn snapshot(&self) -> Vec<T> {
        self.state.sequence.snapshot()
    }

    /// Counters of the current (or last) sort.
    pub fn stats(&self) -> StatsSnapshot {
        self.state.sequence.stats().snapshot()
    }

    /// Is a sort running ?
    pub fn is_sorting(&self) -> bool {
        self.state.sorting.load(Ordering::Acquire)
    }

    /// Is the running sort paused ?
    pub fn is_paused(&self) -> bool {
        self.state.gate.is_paused()
    }

    /// Value touched by the last step, while the sort waits on its pacing delay.
    pub fn highlighted(&self) -> Option<T> {
        self.state
            .highlighted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Are the values in order ?
    pub fn is_sorted(&self, comparator: &dyn Comparator<T>) -> bool {
        is_sorted(&self.state.sequence.lock(), comparator)
    }

    /// Start sorting in the background.
    ///
    /// Fails with `AlreadySorting` if a sort is running, leaving it undisturbed.
    pub fn start<C>(&self, algorithm: Algorithm, comparator: C) -> Result<SortHandle>
    where
        C: Comparator<T> + Send + 'static,
    {
        if self
            .state
            .sorting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!(%algorithm, "start ignored, already sorting");
            return Err(SortError::AlreadySorting);
        }
        self.state.sequence.stats().reset();
        self.state.sequence.stats().mark_started();
        self.state.gate.set(false);

        let state = Arc::clone(&self.state);
        let delay = self.step_delay;
        let seed = self.seed;
        let hook = self.hook.clone();
        let (sender, receiver) = mpsc::channel();
        self.pool.spawn(move || {
            let idle = Idle(&state.sorting);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut observer = |touched: Option<&T>| state.on_step(touched, delay, hook.as_deref());
            let outcome = sort_with_rng(
                algorithm,
                &state.sequence,
                &comparator,
                &mut observer,
                &mut rng,
            );
            let stats = state.sequence.stats();
            stats.finish();
            let report = SortReport {
                algorithm,
                outcome,
                stats: stats.snapshot(),
            };
            drop(idle);
            // nobody listening is fine
            let _ = sender.send(report);
        });
        debug!(%algorithm, "sort spawned");
        Ok(SortHandle {
            algorithm,
            receiver,
        })
    }

    /// Start sorting with the selected algorithm.
    pub fn start_selected<C>(&self, comparator: C) -> Result<SortHandle>
    where
        C: Comparator<T> + Send + 'static,
    {
        self.start(self.algorithm, comparator)
    }

    /// Suspend the running sort at its next step. Ignored while idle.
    pub fn pause(&self) {
        if self.is_sorting() {
            self.state.gate.set(true);
        } else {
            trace!("pause ignored, not sorting");
        }
    }

    /// Let a paused sort continue. Ignored while idle.
    pub fn resume(&self) {
        if self.is_sorting() {
            self.state.gate.set(false);
        } else {
            trace!("resume ignored, not sorting");
        }
    }

    /// Pause if running, resume if paused. Returns whether we are now paused.
    pub fn toggle_pause(&self) -> bool {
        if self.is_sorting() {
            self.state.gate.toggle()
        } else {
            trace!("pause toggle ignored, not sorting");
            false
        }
    }

    /// Replace all values. Rejected while sorting.
    pub fn replace_values<I: IntoIterator<Item = T>>(&self, values: I) -> Result<()> {
        let mut sequence = self.state.sequence.lock();
        if self.is_sorting() {
            trace!("replace ignored, sorting");
            return Err(SortError::AlreadySorting);
        }
        sequence.clear();
        sequence.extend(values);
        Ok(())
    }

    /// Shuffle all values. Rejected while sorting.
    pub fn shuffle<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<()> {
        let mut sequence = self.state.sequence.lock();
        if self.is_sorting() {
            trace!("shuffle ignored, sorting");
            return Err(SortError::AlreadySorting);
        }
        sequence.shuffle(rng);
        Ok(())
    }
}

impl<T> fmt::Debug for SortSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortSession")
            .field("algorithm", &self.algorithm)
            .field("sorting", &self.state.sorting.load(Ordering::Relaxed))
            .field("step_delay", &self.step_delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkerPoolBuilder;

    fn ascending(a: &i64, b: &i64) -> std::cmp::Ordering {
        a.cmp(b)
    }

    fn session(values: Vec<i64>, delay_ms: u64) -> SortSession<i64> {
        let pool = Arc::new(WorkerPoolBuilder::new().num_threads(2).build().unwrap());
        let mut session = SortSession::new(values.into_iter().collect(), pool);
        session.set_step_delay(Duration::from_millis(delay_ms));
        session
    }

    fn reversed(len: i64) -> Vec<i64> {
        (0..len).rev().collect()
    }

    #[test]
    fn second_start_is_rejected() {
        let session = session(reversed(40), 1);
        let handle = session.start(Algorithm::Bubble, ascending).unwrap();
        assert!(session.is_sorting());
        assert!(matches!(
            session.start(Algorithm::Quick, ascending),
            Err(SortError::AlreadySorting)
        ));
        let report = handle.join().unwrap();
        assert_eq!(report.algorithm, Algorithm::Bubble);
        assert!(report.outcome.is_ok());
        assert!(report.stats.elapsed_ns > 0);
        assert!(!session.is_sorting());
        assert_eq!(session.snapshot(), (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn quick_sort_survives_long_reversed_input() {
        let pool = Arc::new(WorkerPoolBuilder::new().num_threads(1).build().unwrap());
        let session = SortSession::new(reversed(20_000).into_iter().collect(), pool);
        let report = session
            .start(Algorithm::Quick, ascending)
            .unwrap()
            .join()
            .unwrap();
        assert!(report.outcome.is_ok());
        assert!(session.state.sequence.lock().is_well_linked());
        assert_eq!(session.snapshot(), (0..20_000).collect::<Vec<_>>());
    }

    #[test]
    fn elapsed_time_grows_while_sorting() {
        let session = session(reversed(40), 1);
        let handle = session.start(Algorithm::Bubble, ascending).unwrap();
        session.pause();
        thread::sleep(Duration::from_millis(20));
        let first = session.stats().elapsed();
        assert!(first >= Duration::from_millis(20));
        thread::sleep(Duration::from_millis(10));
        assert!(session.stats().elapsed() > first);
        session.resume();
        let report = handle.join().unwrap();
        assert!(report.stats.elapsed() > first);
        assert_eq!(session.stats().elapsed_ns, report.stats.elapsed_ns);
    }

    #[test]
    fn paused_sort_makes_no_progress() {
        let session = session(reversed(40), 1);
        let handle = session.start(Algorithm::Bubble, ascending).unwrap();
        session.pause();
        assert!(session.is_paused());
        thread::sleep(Duration::from_millis(50));
        let frozen = session.stats().steps;
        thread::sleep(Duration::from_millis(50));
        assert_eq!(session.stats().steps, frozen);
        assert!(session.is_sorting());
        assert!(!session.toggle_pause());
        let report = handle.join().unwrap();
        assert!(report.outcome.is_ok());

        let unpaused = self::session(reversed(40), 0);
        unpaused.start(Algorithm::Bubble, ascending).unwrap().join().unwrap();
        assert_eq!(session.snapshot(), unpaused.snapshot());
        assert_eq!(report.stats.steps, unpaused.stats().steps);
    }

    #[test]
    fn pause_is_ignored_while_idle() {
        let session = session(vec![2, 1], 0);
        session.pause();
        assert!(!session.is_paused());
        assert!(!session.toggle_pause());
        // a later sort must not start paused
        let report = session.start(Algorithm::Bubble, ascending).unwrap().join().unwrap();
        assert!(report.outcome.is_ok());
    }

    #[test]
    fn values_are_frozen_while_sorting() {
        let session = session(reversed(30), 1);
        let handle = session.start(Algorithm::Insertion, ascending).unwrap();
        assert!(matches!(
            session.replace_values(vec![1, 2, 3]),
            Err(SortError::AlreadySorting)
        ));
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            session.shuffle(&mut rng),
            Err(SortError::AlreadySorting)
        ));
        handle.join().unwrap();
        session.replace_values(vec![5, 4]).unwrap();
        assert_eq!(session.snapshot(), vec![5, 4]);
        session.shuffle(&mut rng).unwrap();
        assert_eq!(session.snapshot().len(), 2);
    }

    #[test]
    fn renderer_snapshots_are_permutations() {
        let session = session(reversed(64), 0);
        let handle = session.start(Algorithm::Merge, ascending).unwrap();
        while session.is_sorting() {
            let mut frame = session.snapshot();
            frame.sort_unstable();
            // merge writes back one slot at a time, so a frame may hold a
            // duplicate, but never a value outside the input
            assert!(frame.iter().all(|v| (0..64).contains(v)));
            assert_eq!(frame.len(), 64);
        }
        handle.join().unwrap();
        assert_eq!(session.snapshot(), (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn hook_and_highlight_follow_steps() {
        use std::sync::atomic::AtomicUsize;
        let mut session = session(vec![2, 1], 0);
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        session.set_step_hook(move |touched: Option<&i64>| {
            assert_eq!(touched, Some(&2));
            counted.fetch_add(1, Ordering::SeqCst);
        });
        session.start_selected(ascending).unwrap().join().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.highlighted(), None);
        assert!(session.is_sorted(&ascending));
    }

    #[test]
    fn failed_sorts_report_their_error() {
        let session = session(vec![3, 2, 1], 0);
        let report = session.start(Algorithm::Bitonic, ascending).unwrap().join().unwrap();
        assert!(matches!(report.outcome, Err(SortError::UnsupportedSize(3))));
        assert!(!session.is_sorting());
        assert_eq!(session.snapshot(), vec![3, 2, 1]);
    }

    #[test]
    fn panicking_comparator_loses_the_worker() {
        let session = session(vec![3, 2, 1], 0);
        let handle = session
            .start(Algorithm::Insertion, |_: &i64, _: &i64| -> std::cmp::Ordering {
                panic!("bad comparator")
            })
            .unwrap();
        assert!(matches!(handle.join(), Err(SortError::WorkerLost)));
        assert!(!session.is_sorting());
        // the session stays usable
        session.start(Algorithm::Insertion, ascending).unwrap().join().unwrap();
        assert_eq!(session.snapshot(), vec![1, 2, 3]);
    }
}
