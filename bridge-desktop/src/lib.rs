//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for desktop platforms
//! (macOS, Windows, Linux), used for development runs and integration tests.
//!
//! ## Overview
//!
//! - `FileSystemAccess` using `tokio::fs` under the user data directory
//! - `HttpClient` using `reqwest`
//! - `MediaLibrary` over a folder tree of photos and videos
//! - `UploadJobQueue` as a bounded in-process queue that performs uploads
//!   in background tasks
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{BoundedUploadQueue, DirectoryMediaLibrary, ReqwestHttpClient, TokioFileSystem};
//! use std::sync::Arc;
//!
//! let http = Arc::new(ReqwestHttpClient::new()?);
//! let library = DirectoryMediaLibrary::new("/home/me/Pictures");
//! let queue = BoundedUploadQueue::new(http.clone(), 32);
//! let fs = TokioFileSystem::new();
//! ```

mod filesystem;
mod http;
mod library;
mod queue;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
pub use library::DirectoryMediaLibrary;
pub use queue::BoundedUploadQueue;
