//! # Job Source Adapter
//!
//! One seam over the two host services the controller talks to: the media
//! library (candidates and their resources) and the upload job queue
//! (retry, acknowledge, create).
//!
//! Host ordering and filtering are re-applied here so the controller can
//! rely on "visual assets, newest first" regardless of how faithfully a host
//! honours the query.

use crate::error::Result;
use bridge_traits::http::HttpRequest;
use bridge_traits::media::{AssetQuery, AssetResource, MediaAsset, MediaKind, MediaLibrary, ResourceKind};
use bridge_traits::upload::{JobAction, UploadJob, UploadJobQueue};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct JobSource {
    library: Arc<dyn MediaLibrary>,
    queue: Arc<dyn UploadJobQueue>,
}

impl JobSource {
    pub fn new(library: Arc<dyn MediaLibrary>, queue: Arc<dyn UploadJobQueue>) -> Self {
        Self { library, queue }
    }

    /// Jobs waiting on `action`, in whatever order the host returns them
    pub async fn fetch_jobs(&self, action: JobAction) -> Result<Vec<UploadJob>> {
        let jobs = self.queue.fetch_jobs(action).await?;
        debug!(%action, count = jobs.len(), "Fetched host jobs");
        Ok(jobs)
    }

    pub async fn retry(&self, job: &UploadJob) -> Result<()> {
        Ok(self.queue.retry(job).await?)
    }

    pub async fn acknowledge(&self, job: &UploadJob) -> Result<()> {
        Ok(self.queue.acknowledge(job).await?)
    }

    /// Images and videos, most recently created first
    pub async fn enumerate_candidates(&self) -> Result<Vec<MediaAsset>> {
        let mut assets = self
            .library
            .enumerate_assets(&AssetQuery::visual_newest_first())
            .await?;

        assets.retain(|asset| asset.kind.is_visual());
        // Stable: assets without a creation time keep host order, after dated ones
        assets.sort_by_key(|asset| Reverse(asset.created_at));

        Ok(assets)
    }

    /// The resource to upload for `asset`, or `None` when it has no usable data.
    ///
    /// A listing failure is treated like an asset without resources.
    pub async fn primary_resource(&self, asset: &MediaAsset) -> Option<AssetResource> {
        match self.library.list_resources(asset).await {
            Ok(resources) => select_primary(asset.kind, resources),
            Err(e) => {
                warn!(asset_id = %asset.id, error = %e, "Failed to list asset resources");
                None
            }
        }
    }

    /// Enqueue a new upload; `CapacityExceeded` passes through untouched
    pub async fn create_job(&self, destination: HttpRequest, resource: &AssetResource) -> Result<UploadJob> {
        Ok(self.queue.create_job(destination, resource).await?)
    }
}

/// Exact kind match first, then whatever the host listed first
pub fn select_primary(kind: MediaKind, resources: Vec<AssetResource>) -> Option<AssetResource> {
    let wanted = match kind {
        MediaKind::Video => ResourceKind::Video,
        _ => ResourceKind::Photo,
    };

    let exact = resources.iter().position(|r| r.kind == wanted);
    let mut resources = resources;
    match exact {
        Some(index) => Some(resources.swap_remove(index)),
        None => resources.into_iter().next(),
    }
}
