//! Errors raised by sequences, sort algorithms and sessions.
use std::io;
use thiserror::Error;

/// Everything that can go wrong while mutating or sorting a sequence.
#[derive(Debug, Error)]
pub enum SortError {
    /// Index past the end of the sequence.
    #[error("index {index} out of range for sequence of length {len}")]
    OutOfRange {
        /// requested index
        index: usize,
        /// sequence length at the time of the request
        len: usize,
    },
    /// Operation needs at least one element.
    #[error("sequence is empty")]
    Empty,
    /// A node handle outlived the node it was pointing to.
    #[error("stale node handle")]
    InvalidNode,
    /// Bitonic sort only runs on power of two lengths.
    #[error("bitonic sort requires a power of two length, got {0}")]
    UnsupportedSize(usize),
    /// Radix sort only runs on non-negative integers.
    #[error("radix sort requires non-negative integer values, found {0}")]
    UnsupportedType(&'static str),
    /// A sort is already running on this graph.
    #[error("graph is already sorting")]
    AlreadySorting,
    /// Scratch memory could not be reserved.
    #[error("failed to allocate scratch space for {0} values")]
    AllocationFailure(usize),
    /// The worker running the sort vanished without reporting.
    #[error("sort worker terminated without reporting")]
    WorkerLost,
    /// Sort worker threads could not be started.
    #[error("failed to start sort workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// (De)serializing json failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SortError {
    /// Is this a control flow signal rather than a failure ?
    /// The UI silently ignores those.
    pub fn is_control_flow(&self) -> bool {
        matches!(self, SortError::AlreadySorting)
    }
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, SortError>;
