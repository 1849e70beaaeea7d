//! # Upload Job Lifecycle
//!
//! Drives a host-managed background upload queue, one bounded invocation
//! at a time.
//!
//! ## Overview
//!
//! Each call to [`UploadJobController::process`] runs three phases in order:
//!
//! 1. **Retry**: hand up to 5 failed jobs back to the host
//! 2. **Acknowledge**: consume up to 10 finished jobs
//! 3. **Discovery**: scan the media library newest-first and enqueue new
//!    uploads until the host queue reports it is full
//!
//! A cancellation token is checked before every phase and every item. A
//! full queue is the expected steady state and ends the invocation with
//! [`ProcessStatus::Processing`], never with a failure.
//!
//! ## Components
//!
//! - **Dedup key** (`key`): filesystem-safe asset key
//! - **Dedup manifest** (`manifest`): durable add-only set of uploaded keys
//! - **Destination** (`destination`): storage upload request builder
//! - **Job source** (`source`): adapter over the host library and queue
//! - **Controller** (`controller`): the phase state machine

pub mod controller;
pub mod destination;
pub mod error;
pub mod key;
pub mod manifest;
pub mod source;

pub use controller::{InvocationReport, ProcessStatus, UploadJobController};
pub use destination::DestinationBuilder;
pub use error::{Result, UploadError};
pub use key::DedupKey;
pub use manifest::DedupManifest;
pub use source::JobSource;
