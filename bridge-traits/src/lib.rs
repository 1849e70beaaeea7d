//! # Host Bridge Traits
//!
//! Contracts between the upload core and the host platform.
//!
//! ## Overview
//!
//! Each trait is a capability the core needs but that every platform provides
//! differently (desktop, iOS, Android). The core never touches platform APIs
//! directly; hosts inject implementations of these traits.
//!
//! ## Traits
//!
//! ### Media & Jobs
//! - [`MediaLibrary`](media::MediaLibrary) - Enumerate photos/videos and their binary resources
//! - [`UploadJobQueue`](upload::UploadJobQueue) - Host-managed background upload queue
//!
//! ### Networking & Storage
//! - [`HttpClient`](http::HttpClient) - Async HTTP
//! - [`FileSystemAccess`](storage::FileSystemAccess) - App-private file I/O
//! - [`InventoryMirror`](remote::InventoryMirror) - Server-side upload inventory
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits return [`BridgeError`](error::BridgeError). The
//! `CapacityExceeded` variant is the host's "queue is full" signal and is
//! treated as back-pressure rather than failure.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across tasks on the worker pool.

pub mod error;
pub mod http;
pub mod log;
pub mod media;
pub mod remote;
pub mod storage;
pub mod upload;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media::{AssetOrder, AssetQuery, AssetResource, MediaAsset, MediaKind, MediaLibrary, ResourceKind};
pub use remote::{InventoryMirror, InventoryRecord};
pub use storage::FileSystemAccess;
pub use upload::{JobAction, UploadJob, UploadJobQueue};
