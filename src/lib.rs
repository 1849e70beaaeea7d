//! Workspace facade crate.
//!
//! Exposes feature flags that map onto the individual workspace crates
//! (`core-service` and the desktop shims it wires). Host applications can
//! depend on `media-upload-workspace` and enable the documented features
//! instead of wiring each crate by hand.
//!
//! - `desktop-shims` (default): desktop bridge implementations and
//!   `bootstrap_desktop`
//! - `inventory-mirror`: Firestore inventory mirror for uploaded assets

#[cfg(any(feature = "desktop-shims", feature = "inventory-mirror"))]
pub use core_service::{
    CoreError, InvocationReport, ProcessStatus, UploadConfig, UploadDependencies, UploadService,
};

#[cfg(feature = "desktop-shims")]
pub use core_service::{bootstrap_desktop, bootstrap_desktop_in};
