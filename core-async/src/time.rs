//! Time-related abstractions.
//!
//! Re-exports `tokio::time` for sleeping and bounding futures, and the
//! standard library's monotonic and wall-clock types.
//!
//! ```rust
//! use core_async::time::{timeout, sleep, Duration};
//!
//! async fn example() {
//!     let slow = sleep(Duration::from_secs(5));
//!     assert!(timeout(Duration::from_millis(10), slow).await.is_err());
//! }
//! ```

pub use tokio::time::{error::Elapsed, interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
