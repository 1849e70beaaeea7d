//! Synchronous façade tests: the service owns its runtime, so every test
//! here is a plain `#[test]` driving it from the test thread.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::HttpRequest;
use bridge_traits::media::{AssetQuery, AssetResource, MediaAsset, MediaKind, MediaLibrary, ResourceKind};
use bridge_traits::storage::FileSystemAccess;
use bridge_traits::upload::{JobAction, UploadJob, UploadJobQueue};
use bytes::Bytes;
use core_runtime::events::UploadEvent;
use core_service::{
    AuthToken, CoreError, CoreEvent, IdentityProvider, ProcessStatus, UploadConfig,
    UploadDependencies, UploadService, UserId,
};
use mockall::mock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mock! {
    Identity {}

    #[async_trait]
    impl IdentityProvider for Identity {
        fn current_user(&self) -> Option<UserId>;
        async fn fetch_token(&self, user: &UserId) -> BridgeResult<AuthToken>;
    }
}

fn signed_in() -> Arc<MockIdentity> {
    let mut identity = MockIdentity::new();
    identity
        .expect_current_user()
        .returning(|| Some(UserId::new("uid_1")));
    identity
        .expect_fetch_token()
        .returning(|_| Ok(AuthToken::new("tok")));
    Arc::new(identity)
}

fn signed_out() -> Arc<MockIdentity> {
    let mut identity = MockIdentity::new();
    identity.expect_current_user().returning(|| None);
    Arc::new(identity)
}

struct StaticLibrary {
    count: usize,
}

#[async_trait]
impl MediaLibrary for StaticLibrary {
    async fn enumerate_assets(&self, _query: &AssetQuery) -> BridgeResult<Vec<MediaAsset>> {
        Ok((0..self.count)
            .map(|i| MediaAsset::new(format!("ASSET-{}/L0/001", i), MediaKind::Image, Some(i as i64)))
            .collect())
    }

    async fn list_resources(&self, asset: &MediaAsset) -> BridgeResult<Vec<AssetResource>> {
        Ok(vec![AssetResource {
            asset_id: asset.id.clone(),
            kind: ResourceKind::Photo,
            file_name: "IMG.HEIC".to_string(),
            location: format!("library://{}", asset.id),
        }])
    }
}

/// Accepts up to `capacity` creations and never finishes anything
struct CountingQueue {
    capacity: usize,
    created: Mutex<Vec<String>>,
}

impl CountingQueue {
    fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            capacity,
            created: Mutex::new(Vec::new()),
        })
    }

    fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl UploadJobQueue for CountingQueue {
    async fn fetch_jobs(&self, _action: JobAction) -> BridgeResult<Vec<UploadJob>> {
        Ok(Vec::new())
    }

    async fn retry(&self, _job: &UploadJob) -> BridgeResult<()> {
        Ok(())
    }

    async fn acknowledge(&self, _job: &UploadJob) -> BridgeResult<()> {
        Ok(())
    }

    async fn create_job(&self, destination: HttpRequest, _resource: &AssetResource) -> BridgeResult<UploadJob> {
        let mut created = self.created.lock().unwrap();
        if created.len() >= self.capacity {
            return Err(BridgeError::CapacityExceeded("full".to_string()));
        }
        created.push(destination.url.clone());
        Ok(UploadJob::new(format!("job-{}", created.len()), destination.url))
    }
}

#[derive(Default)]
struct MemoryFs {
    files: Mutex<HashMap<PathBuf, Bytes>>,
}

#[async_trait]
impl FileSystemAccess for MemoryFs {
    async fn get_data_directory(&self) -> BridgeResult<PathBuf> {
        Ok(PathBuf::from("/data"))
    }

    async fn exists(&self, path: &Path) -> BridgeResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    async fn create_dir_all(&self, _path: &Path) -> BridgeResult<()> {
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> BridgeResult<Bytes> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| BridgeError::NotAvailable(path.display().to_string()))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()> {
        self.files.lock().unwrap().insert(path.to_path_buf(), data);
        Ok(())
    }
}

fn config() -> UploadConfig {
    UploadConfig::builder()
        .bucket("demo.appspot.com")
        .token_timeout(Duration::from_secs(2))
        .worker_threads(2)
        .build()
        .unwrap()
}

fn service(
    assets: usize,
    queue: Arc<CountingQueue>,
    fs: Arc<MemoryFs>,
    identity: Arc<MockIdentity>,
) -> UploadService {
    let deps = UploadDependencies::new(Arc::new(StaticLibrary { count: assets }), queue, fs, identity);
    UploadService::new(config(), deps).unwrap()
}

#[test]
fn test_process_until_queue_full_then_complete() {
    let queue = CountingQueue::new(3);
    let fs = Arc::new(MemoryFs::default());
    let service = service(3, queue.clone(), fs, signed_in());

    // Three assets fit exactly; the fourth creation never happens
    assert_eq!(service.process(), ProcessStatus::Completed);
    assert_eq!(queue.created(), 3);
    assert_eq!(service.uploaded_count(), 3);

    // Everything known: nothing new to create
    assert_eq!(service.process(), ProcessStatus::Completed);
    assert_eq!(queue.created(), 3);
}

#[test]
fn test_backpressure_reports_processing() {
    let queue = CountingQueue::new(2);
    let service = service(5, queue.clone(), Arc::new(MemoryFs::default()), signed_in());

    let report = service.process_with_report();

    assert_eq!(report.status, ProcessStatus::Processing);
    assert!(report.backpressure);
    assert_eq!(report.created, 2);
}

#[test]
fn test_manifest_survives_service_restart() {
    let fs = Arc::new(MemoryFs::default());

    let first = service(4, CountingQueue::new(10), fs.clone(), signed_in());
    assert_eq!(first.process(), ProcessStatus::Completed);
    drop(first);

    let queue = CountingQueue::new(10);
    let second = service(4, queue.clone(), fs, signed_in());
    assert_eq!(second.uploaded_count(), 4);
    assert_eq!(second.process(), ProcessStatus::Completed);
    assert_eq!(queue.created(), 0);
}

#[test]
fn test_termination_is_sticky() {
    let queue = CountingQueue::new(10);
    let service = service(3, queue.clone(), Arc::new(MemoryFs::default()), signed_in());

    assert!(!service.is_terminating());
    service.notify_termination();
    service.notify_termination();
    assert!(service.is_terminating());

    assert_eq!(service.process(), ProcessStatus::Processing);
    assert_eq!(service.process(), ProcessStatus::Processing);
    assert_eq!(queue.created(), 0);
}

#[test]
fn test_current_token() {
    let service = service(0, CountingQueue::new(1), Arc::new(MemoryFs::default()), signed_in());
    assert_eq!(service.current_token().map(|t| t.secret().to_string()), Some("tok".to_string()));

    let service = service_signed_out();
    assert!(service.current_token().is_none());
}

fn service_signed_out() -> UploadService {
    service(0, CountingQueue::new(1), Arc::new(MemoryFs::default()), signed_out())
}

#[test]
fn test_signed_out_skips_discovery() {
    let queue = CountingQueue::new(10);
    let service = service(3, queue.clone(), Arc::new(MemoryFs::default()), signed_out());

    let report = service.process_with_report();

    assert_eq!(report.status, ProcessStatus::Completed);
    assert!(report.discovery_skipped);
    assert_eq!(queue.created(), 0);
}

#[test]
fn test_events_are_published() {
    let service = service(1, CountingQueue::new(10), Arc::new(MemoryFs::default()), signed_in());
    let mut events = service.subscribe_events();

    service.process();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }

    assert!(matches!(
        seen.first(),
        Some(CoreEvent::Upload(UploadEvent::InvocationStarted { .. }))
    ));
    assert!(seen
        .iter()
        .any(|e| matches!(e, CoreEvent::Upload(UploadEvent::JobCreated { .. }))));
    assert!(matches!(
        seen.last(),
        Some(CoreEvent::Upload(UploadEvent::InvocationFinished { .. }))
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = config();
    config.retry_batch_size = 0;

    let deps = UploadDependencies::new(
        Arc::new(StaticLibrary { count: 0 }),
        CountingQueue::new(1),
        Arc::new(MemoryFs::default()),
        signed_in(),
    );

    let err = UploadService::new(config, deps).err().unwrap();
    assert!(matches!(err, CoreError::Runtime(_)));
}

#[cfg(feature = "desktop-shims")]
#[test]
fn test_desktop_bootstrap_over_empty_folder() {
    let media = tempfile::TempDir::new().unwrap();
    let data = tempfile::TempDir::new().unwrap();

    let service =
        core_service::bootstrap_desktop_in(config(), signed_in(), media.path(), data.path(), 8).unwrap();

    assert_eq!(service.process(), ProcessStatus::Completed);
    assert_eq!(service.uploaded_count(), 0);

    let err = core_service::bootstrap_desktop_in(config(), signed_in(), media.path(), data.path(), 0)
        .err()
        .unwrap();
    assert!(matches!(err, CoreError::InitializationFailed(_)));
}
