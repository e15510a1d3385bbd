//! This crate provides a sorting engine meant to be watched.
//! Values live in a linked sequence guarded by a lock, sorts run on worker
//! threads one observable step at a time while a renderer paints snapshots.
//! Sorts can be paused and resumed between two steps.
#![deny(missing_docs)]
#![warn(clippy::all)]

mod error;
pub use crate::error::{Result, SortError};
mod sequence;
pub use crate::sequence::{Iter, Sequence};
mod shared;
pub use crate::shared::{SequenceGuard, SharedSequence};
mod stats;
pub use crate::stats::{time_string, SortStats, StatsSnapshot};
mod value;
pub use crate::value::{natural_order, RadixKey, Value};
mod sort;
pub use crate::sort::{
    is_sorted, sort, sort_with_rng, Algorithm, Comparator, NoObserver, ParseAlgorithmError,
    StepObserver,
};
mod pool;
pub use crate::pool::{WorkerPool, WorkerPoolBuilder};
mod session;
pub use crate::session::{SortHandle, SortReport, SortSession, StepHook};
mod board;
pub use crate::board::{Board, MAX_GRAPHS};
mod config;
pub use crate::config::EngineConfig;
mod trace;
pub use crate::trace::{record, Frame, Recorder, SortTrace};
pub(crate) mod svg;
pub use crate::svg::{layout, write_svg, write_svg_file, Bar};
