//! Shared pieces of the scheduler fairness experiments.
//!
//! The experiments start a few I/O-bound tasks that should keep making
//! progress, then a pool of CPU-bound tasks that never suspend unless told
//! to, and watch whether the former starve.
pub mod duration;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod net;
pub mod shutdown;
pub mod worker;

pub use error::ProbeError;

/// Number of CPUs the process may run on, falling back to one.
pub fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Multi-threaded runtime with a fixed number of worker threads.
pub fn runtime(threads: usize) -> Result<tokio::runtime::Runtime, ProbeError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads.max(1))
        .enable_all()
        .build()
        .map_err(ProbeError::Runtime)
}
