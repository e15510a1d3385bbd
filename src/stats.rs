//! Counters updated by running sorts and read by the renderer.
//! Writers are the sort worker only; readers never lock the sequence, they
//! may see slightly stale numbers.
use serde_derive::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Live counters of one graph.
#[derive(Debug, Default)]
pub struct SortStats {
    comparisons: AtomicU64,
    swaps: AtomicU64,
    memory_accesses: AtomicU64,
    steps: AtomicU64,
    elapsed_ns: AtomicU64,
    /// start of the running sort
    started: Mutex<Option<Instant>>,
}

fn nanos(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}

impl SortStats {
    /// Zero all counters.
    pub fn reset(&self) {
        self.comparisons.store(0, Ordering::Relaxed);
        self.swaps.store(0, Ordering::Relaxed);
        self.memory_accesses.store(0, Ordering::Relaxed);
        self.steps.store(0, Ordering::Relaxed);
        self.elapsed_ns.store(0, Ordering::Relaxed);
        *self.running_since() = None;
    }

    fn running_since(&self) -> MutexGuard<'_, Option<Instant>> {
        self.started.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn add_comparison(&self) {
        self.comparisons.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_swap(&self) {
        self.swaps.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_accesses(&self, amount: u64) {
        self.memory_accesses.fetch_add(amount, Ordering::Relaxed);
    }

    pub(crate) fn add_step(&self) {
        self.steps.fetch_add(1, Ordering::Relaxed);
    }

    /// A sort starts now, elapsed time runs until `finish`.
    pub(crate) fn mark_started(&self) {
        *self.running_since() = Some(Instant::now());
    }

    /// The running sort ended, freeze its elapsed time.
    pub(crate) fn finish(&self) {
        if let Some(start) = self.running_since().take() {
            self.elapsed_ns.store(nanos(start.elapsed()), Ordering::Relaxed);
        }
    }

    /// Copy all counters.
    /// While a sort runs the elapsed time is the time since it started.
    pub fn snapshot(&self) -> StatsSnapshot {
        let elapsed_ns = match *self.running_since() {
            Some(start) => nanos(start.elapsed()),
            None => self.elapsed_ns.load(Ordering::Relaxed),
        };
        StatsSnapshot {
            comparisons: self.comparisons.load(Ordering::Relaxed),
            swaps: self.swaps.load(Ordering::Relaxed),
            memory_accesses: self.memory_accesses.load(Ordering::Relaxed),
            steps: self.steps.load(Ordering::Relaxed),
            elapsed_ns,
        }
    }
}

/// Counters at a given point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// comparator calls
    pub comparisons: u64,
    /// value exchanges and slot writes
    pub swaps: u64,
    /// slot reads and writes
    pub memory_accesses: u64,
    /// observer invocations
    pub steps: u64,
    /// time spent by the running or last finished sort (in ns)
    pub elapsed_ns: u64,
}

impl StatsSnapshot {
    /// Time spent sorting.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns)
    }
}

/// Convert nano seconds to human readable string.
pub fn time_string(nano: u64) -> String {
    match nano {
        n if n < 1_000 => format!("{}ns", n),
        n if n < 1_000_000 => format!("{:.2}us", (n as f64 / 1_000.0)),
        n if n < 1_000_000_000 => format!("{:.2}ms", (n as f64 / 1_000_000.0)),
        n if n < 60_000_000_000 => format!("{:.2}s", (n as f64 / 1_000_000_000.0)),
        n => format!(
            "{}m{}s",
            n / 60_000_000_000,
            (n % 60_000_000_000) / 1_000_000_000
        ),
    }
}
