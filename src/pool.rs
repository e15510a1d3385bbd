//! Threads running the sorts.
//!
//! A thin layer over a rayon thread pool. Sort jobs are long lived and block
//! while paused, so the pool is sized to the number of graphs unless told
//! otherwise.
use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};
use std::any::Any;
use std::fmt;
use tracing::error;

/// Pool of sort workers.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Run given job on one of our threads, in the background.
    pub fn spawn<OP>(&self, op: OP)
    where
        OP: FnOnce() + Send + 'static,
    {
        self.pool.spawn(op)
    }

    /// Number of threads in the pool.
    pub fn current_num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.current_num_threads())
            .finish()
    }
}

/// Builder for `WorkerPool`.
#[derive(Default)]
pub struct WorkerPoolBuilder {
    real_builder: ThreadPoolBuilder,
    thread_name: Option<String>,
}

impl WorkerPoolBuilder {
    /// Creates a new WorkerPoolBuilder.
    pub fn new() -> Self {
        WorkerPoolBuilder {
            real_builder: ThreadPoolBuilder::new(),
            thread_name: None,
        }
    }
    /// Sets the number of threads to use.
    pub fn num_threads(self, num_threads: usize) -> Self {
        WorkerPoolBuilder {
            real_builder: self.real_builder.num_threads(num_threads),
            thread_name: self.thread_name,
        }
    }
    /// Threads are named after this prefix followed by their index.
    pub fn thread_name<S: Into<String>>(self, prefix: S) -> Self {
        WorkerPoolBuilder {
            real_builder: self.real_builder,
            thread_name: Some(prefix.into()),
        }
    }
    /// Sets the stack size of each thread (in bytes).
    pub fn stack_size(self, stack_size: usize) -> Self {
        WorkerPoolBuilder {
            real_builder: self.real_builder.stack_size(stack_size),
            thread_name: self.thread_name,
        }
    }
    /// Build the `WorkerPool`.
    pub fn build(self) -> Result<WorkerPool, ThreadPoolBuildError> {
        let mut builder = self.real_builder.panic_handler(log_panic);
        if let Some(prefix) = self.thread_name {
            builder = builder.thread_name(move |index| format!("{}-{}", prefix, index));
        }
        builder.build().map(|pool| WorkerPool { pool })
    }
}

/// A panicking job must not take the whole process down: its session
/// notices the vanished worker on its own.
fn log_panic(payload: Box<dyn Any + Send>) {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    error!(panic = message, "sort worker panicked");
}
