//! Engine settings, loadable from a json file.
use crate::error::Result;
use crate::pool::{WorkerPool, WorkerPoolBuilder};
use rayon::ThreadPoolBuildError;
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

/// Everything the control layer needs to set up its graphs.
/// Missing fields take their default value when loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// number of graphs side by side
    pub graph_count: usize,
    /// number of bars per graph
    pub bar_count: usize,
    /// pause after each step of a sort, in milliseconds
    pub step_delay_ms: u64,
    /// sort worker threads, one per graph if not set.
    /// It can only add threads: each graph always gets its own.
    pub worker_threads: Option<usize>,
    /// seed for shuffles and bogo sorts, entropy if not set
    pub seed: Option<u64>,
    /// delay between two frames of the renderer, in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            graph_count: 1,
            bar_count: 100,
            step_delay_ms: 7,
            worker_threads: None,
            seed: None,
            frame_interval_ms: 16,
        }
    }
}

impl EngineConfig {
    /// Load settings from given json file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Save settings as json.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Pause after each step.
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Delay between frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Threads needed to run `graphs` sorts at once.
    /// Never less than one per graph, a paused sort holds its thread.
    pub fn threads_for(&self, graphs: usize) -> usize {
        self.worker_threads.unwrap_or(graphs).max(graphs).max(1)
    }

    /// Build a pool able to run `graphs` sorts at once.
    pub fn worker_pool(&self, graphs: usize) -> std::result::Result<WorkerPool, ThreadPoolBuildError> {
        WorkerPoolBuilder::new()
            .num_threads(self.threads_for(graphs))
            .thread_name("sort-worker")
            .build()
    }
}
