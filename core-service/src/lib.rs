//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media library,
//! upload job queue, filesystem, identity, optional inventory mirror) into the
//! upload core and exposes a synchronous surface for host schedulers:
//!
//! ```ignore
//! use core_service::{UploadDependencies, UploadService, ProcessStatus};
//!
//! let service = UploadService::new(config, deps)?;
//! // Called repeatedly by the host's background scheduler
//! match service.process() {
//!     ProcessStatus::Processing => { /* reschedule soon */ }
//!     ProcessStatus::Completed => { /* nothing left for now */ }
//!     ProcessStatus::Failed => { /* back off */ }
//! }
//! // From the host's expiration handler, on any thread
//! service.notify_termination();
//! ```
//!
//! Desktop apps typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`) and call [`bootstrap_desktop`]. The `inventory-mirror`
//! feature adds the Firestore-backed inventory mirror from `provider-firebase`.

pub mod error;

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
mod desktop;

pub use error::{CoreError, Result};

pub use core_auth::{AuthToken, IdentityProvider, UserId};
pub use core_runtime::config::UploadConfig;
pub use core_runtime::events::{CoreEvent, Receiver};
pub use core_upload::{InvocationReport, ProcessStatus};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use desktop::{bootstrap_desktop, bootstrap_desktop_in};

#[cfg(feature = "inventory-mirror")]
pub use provider_firebase::FirestoreInventoryMirror;

use std::sync::Arc;

use bridge_traits::{
    media::MediaLibrary, remote::InventoryMirror, storage::FileSystemAccess,
    upload::UploadJobQueue,
};
use core_async::runtime::{build_worker_pool, Runtime};
use core_async::sync::CancellationToken;
use core_auth::AuthTokenProvider;
use core_runtime::events::EventBus;
use core_upload::{DedupManifest, JobSource, UploadJobController};
use tracing::info;

const WORKER_THREAD_NAME: &str = "upload-worker";

/// Aggregated handle to all bridge dependencies the upload core requires.
pub struct UploadDependencies {
    pub library: Arc<dyn MediaLibrary>,
    pub queue: Arc<dyn UploadJobQueue>,
    pub filesystem: Arc<dyn FileSystemAccess>,
    pub identity: Arc<dyn IdentityProvider>,
    pub inventory: Option<Arc<dyn InventoryMirror>>,
}

impl UploadDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        library: Arc<dyn MediaLibrary>,
        queue: Arc<dyn UploadJobQueue>,
        filesystem: Arc<dyn FileSystemAccess>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            library,
            queue,
            filesystem,
            identity,
            inventory: None,
        }
    }

    /// Mirror manifest writes to a remote inventory.
    pub fn with_inventory_mirror(mut self, mirror: Arc<dyn InventoryMirror>) -> Self {
        self.inventory = Some(mirror);
        self
    }
}

/// Primary façade exposed to host applications.
///
/// Owns the worker pool every async piece of the core runs on. All methods
/// are synchronous and must be called from host threads, never from inside a
/// task running on the service's own runtime.
pub struct UploadService {
    runtime: Runtime,
    controller: UploadJobController,
    auth: AuthTokenProvider,
    termination: CancellationToken,
    event_bus: EventBus,
    config: UploadConfig,
}

impl UploadService {
    /// Validate `config`, start the worker pool and load the dedup manifest.
    pub fn new(config: UploadConfig, deps: UploadDependencies) -> Result<Self> {
        config.validate()?;

        let runtime = build_worker_pool(config.worker_threads, WORKER_THREAD_NAME)
            .map_err(|e| CoreError::InitializationFailed(format!("worker pool: {}", e)))?;

        let manifest = runtime.block_on(DedupManifest::open(
            Arc::clone(&deps.filesystem),
            &config.manifest_relative_path(),
        ))?;
        let manifest = match deps.inventory {
            Some(mirror) => manifest.with_mirror(mirror, config.inventory_source.clone()),
            None => manifest,
        };

        let event_bus = EventBus::default();
        let auth = AuthTokenProvider::new(deps.identity).with_event_bus(event_bus.clone());
        let controller = UploadJobController::new(
            &config,
            JobSource::new(deps.library, deps.queue),
            Arc::new(manifest),
            auth.clone(),
        )
        .with_event_bus(event_bus.clone());

        info!(
            worker_threads = config.worker_threads,
            bucket = %config.bucket,
            "Upload service started"
        );

        Ok(Self {
            runtime,
            controller,
            auth,
            termination: CancellationToken::new(),
            event_bus,
            config,
        })
    }

    /// Run one bounded invocation on the calling thread.
    pub fn process(&self) -> ProcessStatus {
        self.process_with_report().status
    }

    pub fn process_with_report(&self) -> InvocationReport {
        self.runtime
            .block_on(self.controller.process_with_report(&self.termination))
    }

    /// Ask any running and every future invocation to stop at its next
    /// checkpoint. Returns immediately; the request is never withdrawn.
    pub fn notify_termination(&self) {
        if !self.termination.is_cancelled() {
            info!("Termination requested");
        }
        self.termination.cancel();
    }

    pub fn is_terminating(&self) -> bool {
        self.termination.is_cancelled()
    }

    /// A fresh upload token, waiting at most the configured token timeout.
    pub fn current_token(&self) -> Option<AuthToken> {
        self.auth
            .get_token_blocking(self.runtime.handle(), self.config.token_timeout)
    }

    pub fn subscribe_events(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// Number of assets recorded as uploaded
    pub fn uploaded_count(&self) -> usize {
        self.runtime.block_on(self.controller.manifest().len())
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }
}
