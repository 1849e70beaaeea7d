//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the media upload core:
//! - Logging and tracing setup
//! - Upload configuration with fail-fast validation
//! - Event bus for upload and auth notifications
//!
//! Every other core crate depends on this one for its configuration types,
//! logging conventions and event broadcasting.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{UploadConfig, UploadConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus};
