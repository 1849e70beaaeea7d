//! Bounded in-process upload queue
//!
//! Desktop stand-in for a platform background transfer service. Each created
//! job reads its resource from disk and sends it as the body of the
//! destination request on a background task. Jobs stay in the queue until
//! they are acknowledged:
//!
//! ```text
//! create ──> in flight ──ok──> awaiting acknowledge ──acknowledge──> gone
//!               ^   └─fail──> awaiting retry
//!               └─── retry ───────┘
//! ```
//!
//! The queue holds at most `capacity` jobs in any state; `create_job` answers
//! `CapacityExceeded` once it is full.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpRequest},
    media::AssetResource,
    upload::{JobAction, UploadJob, UploadJobQueue},
};
use bytes::Bytes;
use core_async::sync::{Notify, RwLock};
use core_async::task;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    InFlight,
    AwaitingRetry,
    AwaitingAcknowledge,
}

struct JobEntry {
    job: UploadJob,
    request: HttpRequest,
    resource: AssetResource,
    state: JobState,
    /// Creation order, used to keep host order stable
    sequence: u64,
}

#[derive(Default)]
struct QueueState {
    jobs: HashMap<String, JobEntry>,
}

/// Upload queue with a fixed capacity and background uploads
pub struct BoundedUploadQueue {
    http_client: Arc<dyn HttpClient>,
    capacity: usize,
    state: Arc<RwLock<QueueState>>,
    settled: Arc<Notify>,
    next_id: AtomicU64,
}

impl BoundedUploadQueue {
    pub fn new(http_client: Arc<dyn HttpClient>, capacity: usize) -> Self {
        Self {
            http_client,
            capacity,
            state: Arc::new(RwLock::new(QueueState::default())),
            settled: Arc::new(Notify::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of jobs held in any state
    pub async fn len(&self) -> usize {
        self.state.read().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn in_flight(&self) -> usize {
        self.state
            .read()
            .await
            .jobs
            .values()
            .filter(|entry| entry.state == JobState::InFlight)
            .count()
    }

    /// Wait until no upload is running
    pub async fn wait_idle(&self) {
        loop {
            let settled = self.settled.notified();
            if self.in_flight().await == 0 {
                return;
            }
            settled.await;
        }
    }

    fn start_upload(&self, job_id: String, request: HttpRequest, resource: AssetResource) {
        let http_client = Arc::clone(&self.http_client);
        let state = Arc::clone(&self.state);
        let settled = Arc::clone(&self.settled);

        task::spawn(async move {
            let outcome = upload(http_client.as_ref(), request, &resource).await;

            let next = match &outcome {
                Ok(()) => {
                    info!(job_id = %job_id, "Upload finished");
                    JobState::AwaitingAcknowledge
                }
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "Upload failed");
                    JobState::AwaitingRetry
                }
            };

            if let Some(entry) = state.write().await.jobs.get_mut(&job_id) {
                entry.state = next;
            }
            settled.notify_waiters();
        });
    }
}

fn claim<'a>(state: &'a mut QueueState, job: &UploadJob, expected: JobState) -> Result<&'a mut JobEntry> {
    let entry = state
        .jobs
        .get_mut(&job.id)
        .ok_or_else(|| BridgeError::OperationFailed(format!("Unknown upload job: {}", job.id)))?;

    if entry.state != expected {
        return Err(BridgeError::OperationFailed(format!(
            "Upload job {} is not awaiting this action",
            job.id
        )));
    }

    Ok(entry)
}

async fn upload(http_client: &dyn HttpClient, request: HttpRequest, resource: &AssetResource) -> Result<()> {
    let data = fs::read(&resource.location).await.map_err(BridgeError::Io)?;
    let response = http_client.execute(request.body(Bytes::from(data))).await?;

    if response.is_success() {
        Ok(())
    } else {
        Err(BridgeError::OperationFailed(format!(
            "Upload rejected with status {}",
            response.status
        )))
    }
}

#[async_trait]
impl UploadJobQueue for BoundedUploadQueue {
    async fn fetch_jobs(&self, action: JobAction) -> Result<Vec<UploadJob>> {
        let wanted = match action {
            JobAction::Retry => JobState::AwaitingRetry,
            JobAction::Acknowledge => JobState::AwaitingAcknowledge,
        };

        let state = self.state.read().await;
        let mut entries: Vec<&JobEntry> = state
            .jobs
            .values()
            .filter(|entry| entry.state == wanted)
            .collect();
        entries.sort_by_key(|entry| entry.sequence);

        Ok(entries.into_iter().map(|entry| entry.job.clone()).collect())
    }

    async fn retry(&self, job: &UploadJob) -> Result<()> {
        let (request, resource) = {
            let mut state = self.state.write().await;
            let entry = claim(&mut state, job, JobState::AwaitingRetry)?;
            entry.state = JobState::InFlight;
            (entry.request.clone(), entry.resource.clone())
        };

        debug!(job_id = %job.id, "Retrying upload");
        self.start_upload(job.id.clone(), request, resource);
        Ok(())
    }

    async fn acknowledge(&self, job: &UploadJob) -> Result<()> {
        let mut state = self.state.write().await;
        claim(&mut state, job, JobState::AwaitingAcknowledge)?;
        state.jobs.remove(&job.id);
        debug!(job_id = %job.id, "Acknowledged upload");
        Ok(())
    }

    async fn create_job(&self, destination: HttpRequest, resource: &AssetResource) -> Result<UploadJob> {
        let sequence = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = UploadJob::new(format!("job-{}", sequence), destination.url.clone());

        {
            let mut state = self.state.write().await;
            if state.jobs.len() >= self.capacity {
                return Err(BridgeError::CapacityExceeded(format!(
                    "{} upload jobs pending",
                    state.jobs.len()
                )));
            }

            state.jobs.insert(
                job.id.clone(),
                JobEntry {
                    job: job.clone(),
                    request: destination.clone(),
                    resource: resource.clone(),
                    state: JobState::InFlight,
                    sequence,
                },
            );
        }

        debug!(job_id = %job.id, file = %resource.file_name, "Created upload job");
        self.start_upload(job.id.clone(), destination, resource.clone());
        Ok(job)
    }
}
