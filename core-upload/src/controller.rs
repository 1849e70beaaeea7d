//! # Upload Job Lifecycle Controller
//!
//! The state machine behind every scheduler invocation:
//!
//! ```text
//! Retry ──> Acknowledge ──> Discovery ──> { Processing | Completed | Failed }
//!   │            │              │
//!   └────────────┴──────────────┴──> cancelled / queue full ──> Processing
//! ```
//!
//! ## Result rules
//!
//! - Cancellation observed at any checkpoint: `Processing`
//! - Any host error other than capacity: `Failed`
//! - Queue full, or scan ceiling reached: `Processing`
//! - Otherwise: `Completed`
//!
//! Discovery needs a signed-in user and a bearer token. Without either it is
//! skipped for this invocation and contributes nothing to the result.
//!
//! ## Scan cursor
//!
//! The scan ceiling counts known candidates too, so a large library that is
//! already uploaded still costs a bounded amount per invocation. To keep
//! older assets reachable, each scan resumes at the candidate where the
//! previous one stopped and wraps around the newest-first list. Once a whole
//! rotation has passed without creating a job, discovery reports no more
//! work and the cursor starts over. The cursor lives in memory only.
//!
//! ## Usage
//!
//! ```ignore
//! let controller = UploadJobController::new(&config, source, manifest, auth)
//!     .with_event_bus(event_bus.clone());
//!
//! let cancel = CancellationToken::new();
//! match controller.process(&cancel).await {
//!     ProcessStatus::Completed => scheduler.finish(),
//!     ProcessStatus::Processing => scheduler.reschedule(),
//!     ProcessStatus::Failed => scheduler.fail(),
//! }
//! ```

use crate::destination::DestinationBuilder;
use crate::error::{Result, UploadError};
use crate::key::DedupKey;
use crate::manifest::DedupManifest;
use crate::source::JobSource;
use bridge_traits::media::MediaAsset;
use bridge_traits::upload::JobAction;
use core_async::sync::{CancellationToken, Mutex};
use core_async::time::Duration;
use core_auth::{AuthToken, AuthTokenProvider, UserId};
use core_runtime::config::UploadConfig;
use core_runtime::events::{CoreEvent, EventBus, UploadEvent, UploadPhase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Coarse invocation result reported to the host scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    /// Work remains; invoke again later
    Processing,
    /// Nothing left to do right now
    Completed,
    /// A host error aborted the invocation
    Failed,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Processing => write!(f, "processing"),
            ProcessStatus::Completed => write!(f, "completed"),
            ProcessStatus::Failed => write!(f, "failed"),
        }
    }
}

/// What one invocation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationReport {
    pub invocation_id: String,
    pub status: ProcessStatus,
    pub retried: usize,
    pub acknowledged: usize,
    pub created: usize,
    /// Candidates examined during discovery, known or new
    pub scanned: usize,
    pub cancelled: bool,
    /// The host queue reported it was full
    pub backpressure: bool,
    /// Discovery did not run for lack of a user or token
    pub discovery_skipped: bool,
    pub error: Option<String>,
}

impl InvocationReport {
    fn new() -> Self {
        Self {
            invocation_id: Uuid::new_v4().to_string(),
            status: ProcessStatus::Processing,
            retried: 0,
            acknowledged: 0,
            created: 0,
            scanned: 0,
            cancelled: false,
            backpressure: false,
            discovery_skipped: false,
            error: None,
        }
    }
}

/// Per-invocation caps
#[derive(Debug, Clone, Copy)]
struct Limits {
    retry_batch: usize,
    acknowledge_batch: usize,
    scan_ceiling: usize,
    token_timeout: Duration,
}

/// Where the next scan resumes
#[derive(Debug, Default)]
struct ScanCursor {
    /// Asset id the previous scan stopped at, not yet examined
    resume_at: Option<String>,
    /// Candidates visited since the last created job or rotation start
    idle_visits: usize,
}

pub struct UploadJobController {
    source: JobSource,
    cursor: Mutex<ScanCursor>,
    manifest: Arc<DedupManifest>,
    auth: AuthTokenProvider,
    destinations: DestinationBuilder,
    limits: Limits,
    event_bus: Option<EventBus>,
}

impl UploadJobController {
    pub fn new(
        config: &UploadConfig,
        source: JobSource,
        manifest: Arc<DedupManifest>,
        auth: AuthTokenProvider,
    ) -> Self {
        Self {
            source,
            cursor: Mutex::new(ScanCursor::default()),
            manifest,
            auth,
            destinations: DestinationBuilder::from_config(config),
            limits: Limits {
                retry_batch: config.retry_batch_size,
                acknowledge_batch: config.acknowledge_batch_size,
                scan_ceiling: config.scan_ceiling,
                token_timeout: config.token_timeout,
            },
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn manifest(&self) -> &Arc<DedupManifest> {
        &self.manifest
    }

    /// Run one invocation and report its coarse status
    pub async fn process(&self, cancel: &CancellationToken) -> ProcessStatus {
        self.process_with_report(cancel).await.status
    }

    /// Run one invocation and report everything it did
    pub async fn process_with_report(&self, cancel: &CancellationToken) -> InvocationReport {
        let mut report = InvocationReport::new();
        let span = info_span!("upload_invocation", invocation_id = %report.invocation_id);

        async {
            self.emit(UploadEvent::InvocationStarted {
                invocation_id: report.invocation_id.clone(),
            });

            report.status = match self.run(cancel, &mut report).await {
                Ok(status) => status,
                Err(e) => {
                    error!(error = %e, "Upload invocation failed");
                    report.error = Some(e.to_string());
                    ProcessStatus::Failed
                }
            };

            info!(
                status = %report.status,
                retried = report.retried,
                acknowledged = report.acknowledged,
                created = report.created,
                scanned = report.scanned,
                "Upload invocation finished"
            );
            self.emit(UploadEvent::InvocationFinished {
                invocation_id: report.invocation_id.clone(),
                status: report.status.to_string(),
                created: report.created,
                scanned: report.scanned,
            });
        }
        .instrument(span)
        .await;

        report
    }

    async fn run(&self, cancel: &CancellationToken, report: &mut InvocationReport) -> Result<ProcessStatus> {
        let batches = [
            (JobAction::Retry, self.limits.retry_batch),
            (JobAction::Acknowledge, self.limits.acknowledge_batch),
        ];

        for (action, limit) in batches {
            let mut handled = 0;
            let outcome = self
                .transition_batch(action, limit, cancel, report, &mut handled)
                .await;
            self.record_batch(action, handled, report);

            if let Some(status) = outcome? {
                return Ok(status);
            }
        }

        if self.observe_cancel(cancel, UploadPhase::Discovery, report) {
            return Ok(ProcessStatus::Processing);
        }

        let has_more = self.discover(cancel, report).await?;

        if report.cancelled || has_more {
            Ok(ProcessStatus::Processing)
        } else {
            Ok(ProcessStatus::Completed)
        }
    }

    /// Retry or acknowledge up to `limit` jobs.
    ///
    /// `Some(status)` ends the invocation early.
    async fn transition_batch(
        &self,
        action: JobAction,
        limit: usize,
        cancel: &CancellationToken,
        report: &mut InvocationReport,
        handled: &mut usize,
    ) -> Result<Option<ProcessStatus>> {
        let phase = phase_for(action);

        if self.observe_cancel(cancel, phase, report) {
            return Ok(Some(ProcessStatus::Processing));
        }

        let jobs = match self.source.fetch_jobs(action).await {
            Ok(jobs) => jobs,
            Err(e) => return self.backpressure_or(e, phase, report),
        };

        for job in jobs.iter().take(limit) {
            if self.observe_cancel(cancel, phase, report) {
                return Ok(Some(ProcessStatus::Processing));
            }

            let result = match action {
                JobAction::Retry => self.source.retry(job).await,
                JobAction::Acknowledge => self.source.acknowledge(job).await,
            };

            match result {
                Ok(()) => {
                    *handled += 1;
                    debug!(%action, job_id = %job.id, "Job transitioned");
                }
                Err(e) => return self.backpressure_or(e, phase, report),
            }
        }

        Ok(None)
    }

    fn backpressure_or(
        &self,
        err: UploadError,
        phase: UploadPhase,
        report: &mut InvocationReport,
    ) -> Result<Option<ProcessStatus>> {
        if err.is_capacity_exceeded() {
            self.observe_backpressure(phase, report);
            Ok(Some(ProcessStatus::Processing))
        } else {
            Err(err)
        }
    }

    fn record_batch(&self, action: JobAction, handled: usize, report: &mut InvocationReport) {
        match action {
            JobAction::Retry => {
                report.retried = handled;
                if handled > 0 {
                    self.emit(UploadEvent::JobsRetried { count: handled });
                }
            }
            JobAction::Acknowledge => {
                report.acknowledged = handled;
                if handled > 0 {
                    self.emit(UploadEvent::JobsAcknowledged { count: handled });
                }
            }
        }
    }

    /// Returns whether more candidates remain for a later invocation
    async fn discover(&self, cancel: &CancellationToken, report: &mut InvocationReport) -> Result<bool> {
        let Some(user) = self.auth.current_user() else {
            info!("No signed-in user, skipping discovery");
            report.discovery_skipped = true;
            return Ok(false);
        };

        let Some(token) = self.auth.get_token(self.limits.token_timeout).await else {
            info!("No auth token, skipping discovery");
            report.discovery_skipped = true;
            return Ok(false);
        };

        let candidates = self.source.enumerate_candidates().await?;
        debug!(count = candidates.len(), "Enumerated candidates");

        let mut created = Vec::new();
        let outcome = self
            .scan(&candidates, &user, &token, cancel, report, &mut created)
            .await;

        // Flush whatever was enqueued, however the scan ended
        self.manifest.mark_uploaded(&created, &user).await;

        outcome
    }

    async fn scan(
        &self,
        candidates: &[MediaAsset],
        user: &UserId,
        token: &AuthToken,
        cancel: &CancellationToken,
        report: &mut InvocationReport,
        created: &mut Vec<DedupKey>,
    ) -> Result<bool> {
        let mut cursor = self.cursor.lock().await;
        let start = cursor
            .resume_at
            .take()
            .and_then(|id| candidates.iter().position(|asset| asset.id == id))
            .unwrap_or(0);
        if start == 0 {
            cursor.idle_visits = 0;
        }

        let rotation = candidates[start..].iter().chain(&candidates[..start]);
        for asset in rotation {
            if cursor.idle_visits >= candidates.len() {
                debug!(count = candidates.len(), "Full rotation without new candidates");
                break;
            }

            if self.observe_cancel(cancel, UploadPhase::Discovery, report) {
                cursor.resume_at = Some(asset.id.clone());
                return Ok(true);
            }

            let Some(key) = DedupKey::from_identifier(&asset.id) else {
                warn!(asset_id = %asset.id, "Asset identifier has no usable key, skipping");
                cursor.idle_visits += 1;
                continue;
            };

            if report.scanned >= self.limits.scan_ceiling {
                info!(ceiling = self.limits.scan_ceiling, "Scan ceiling reached");
                cursor.resume_at = Some(asset.id.clone());
                return Ok(true);
            }
            report.scanned += 1;

            if self.manifest.contains(&key).await {
                cursor.idle_visits += 1;
                continue;
            }

            let Some(resource) = self.source.primary_resource(asset).await else {
                debug!(%key, "Asset has no usable resource, skipping");
                cursor.idle_visits += 1;
                continue;
            };

            let destination = self.destinations.build(user, &key, asset.kind, token);
            match self.source.create_job(destination, &resource).await {
                Ok(job) => {
                    self.manifest.record(&key).await;
                    report.created += 1;
                    cursor.idle_visits = 0;
                    debug!(%key, job_id = %job.id, "Upload job created");
                    self.emit(UploadEvent::JobCreated {
                        key: key.as_str().to_string(),
                    });
                    created.push(key);
                }
                Err(e) if e.is_capacity_exceeded() => {
                    cursor.resume_at = Some(asset.id.clone());
                    self.observe_backpressure(UploadPhase::Discovery, report);
                    return Ok(true);
                }
                Err(e) => return Err(e),
            }
        }

        *cursor = ScanCursor::default();
        Ok(false)
    }

    fn observe_cancel(&self, cancel: &CancellationToken, phase: UploadPhase, report: &mut InvocationReport) -> bool {
        if !cancel.is_cancelled() {
            return false;
        }
        if !report.cancelled {
            report.cancelled = true;
            info!(%phase, "Termination requested, stopping");
            self.emit(UploadEvent::Cancelled { phase });
        }
        true
    }

    fn observe_backpressure(&self, phase: UploadPhase, report: &mut InvocationReport) {
        report.backpressure = true;
        info!(%phase, "Host upload queue is full");
        self.emit(UploadEvent::Backpressure { phase });
    }

    fn emit(&self, event: UploadEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Upload(event)).ok();
        }
    }
}

fn phase_for(action: JobAction) -> UploadPhase {
    match action {
        JobAction::Retry => UploadPhase::Retry,
        JobAction::Acknowledge => UploadPhase::Acknowledge,
    }
}
