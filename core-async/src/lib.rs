//! Async runtime facade for the media upload core.
//!
//! Every `core-*`, `bridge-*` and `provider-*` crate depends on this crate
//! instead of reaching for `tokio` directly, so the executor can be swapped
//! in one place.
//!
//! # Modules
//!
//! - `task`: spawning and join handles
//! - `time`: sleep, timeout, instants
//! - `sync`: async locks, channels and the cooperative `CancellationToken`
//! - `runtime`: building runtimes and blocking on futures from sync code
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{timeout, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     let value = timeout(Duration::from_secs(1), handle).await;
//!     assert!(value.is_ok());
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
