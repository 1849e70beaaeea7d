//! Runtime utilities that abstract over the underlying async executor.
//!
//! Downstream crates build and drive runtimes through this module so they
//! never name Tokio directly.

use std::io;

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Intended for tests and short-lived entry points. Panics if the runtime
/// cannot be created, which only happens when the OS refuses to hand out
/// the I/O driver resources.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Builds a multi-threaded runtime with a fixed number of worker threads.
///
/// Used by hosts that call into the core synchronously and need a shared
/// worker pool for background work (token fetches, mirror writes, uploads).
pub fn build_worker_pool(worker_threads: usize, thread_name: &str) -> io::Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(worker_threads.max(1))
        .thread_name(thread_name)
        .enable_all()
        .build()
}
