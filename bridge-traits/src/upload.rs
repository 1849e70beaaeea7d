//! Host-managed upload job queue
//!
//! Abstracts the platform's background transfer service:
//! - iOS: background `URLSession` / background asset upload extension
//! - Android: WorkManager upload workers
//! - Desktop: `BoundedUploadQueue` in `bridge-desktop`
//!
//! The host owns the jobs. The core only reads the action queues and
//! requests transitions (retry, acknowledge, create). Every transition can
//! answer [`BridgeError::CapacityExceeded`](crate::error::BridgeError::CapacityExceeded)
//! when the queue is full.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::http::HttpRequest;
use crate::media::AssetResource;

/// Lifecycle action a host job is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    /// The upload failed and can be re-attempted at its original destination
    Retry,
    /// The upload reached a terminal state that must be consumed
    Acknowledge,
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobAction::Retry => write!(f, "retry"),
            JobAction::Acknowledge => write!(f, "acknowledge"),
        }
    }
}

/// Opaque handle to one host upload job
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadJob {
    /// Host-assigned job identifier
    pub id: String,
    /// Destination the job uploads to
    pub destination: String,
}

impl UploadJob {
    pub fn new(id: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            destination: destination.into(),
        }
    }
}

/// Host upload job queue
#[async_trait]
pub trait UploadJobQueue: Send + Sync {
    /// Jobs currently waiting on `action`, in host order
    async fn fetch_jobs(&self, action: JobAction) -> Result<Vec<UploadJob>>;

    /// Re-attempt a failed job at its original destination
    async fn retry(&self, job: &UploadJob) -> Result<()>;

    /// Mark a finished job's terminal state as consumed
    async fn acknowledge(&self, job: &UploadJob) -> Result<()>;

    /// Enqueue a new upload of `resource` to `destination`
    ///
    /// Returns `CapacityExceeded` when the host cannot accept more jobs.
    async fn create_job(
        &self,
        destination: HttpRequest,
        resource: &AssetResource,
    ) -> Result<UploadJob>;
}
