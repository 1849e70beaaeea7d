//! Desktop bootstrap
//!
//! Wires the `bridge-desktop` shims into an [`UploadService`]: a folder tree
//! stands in for the photo library and a bounded in-process queue performs
//! the uploads.

use std::path::PathBuf;
use std::sync::Arc;

use bridge_desktop::{BoundedUploadQueue, DirectoryMediaLibrary, ReqwestHttpClient, TokioFileSystem};
use bridge_traits::http::HttpClient;
use bridge_traits::storage::FileSystemAccess;
use core_auth::IdentityProvider;
use core_runtime::config::UploadConfig;
use tracing::info;

use crate::{Result, UploadDependencies, UploadService};

/// Build a desktop upload service storing its manifest under the platform
/// data directory.
pub fn bootstrap_desktop(
    config: UploadConfig,
    identity: Arc<dyn IdentityProvider>,
    media_root: impl Into<PathBuf>,
    queue_capacity: usize,
) -> Result<UploadService> {
    bootstrap(config, identity, media_root.into(), TokioFileSystem::new(), queue_capacity)
}

/// Like [`bootstrap_desktop`] with an explicit data directory.
pub fn bootstrap_desktop_in(
    config: UploadConfig,
    identity: Arc<dyn IdentityProvider>,
    media_root: impl Into<PathBuf>,
    data_dir: impl Into<PathBuf>,
    queue_capacity: usize,
) -> Result<UploadService> {
    let filesystem = TokioFileSystem::with_data_directory(data_dir.into());
    bootstrap(config, identity, media_root.into(), filesystem, queue_capacity)
}

fn bootstrap(
    config: UploadConfig,
    identity: Arc<dyn IdentityProvider>,
    media_root: PathBuf,
    filesystem: TokioFileSystem,
    queue_capacity: usize,
) -> Result<UploadService> {
    if queue_capacity == 0 {
        return Err(crate::CoreError::InitializationFailed(
            "queue capacity must be greater than 0".to_string(),
        ));
    }

    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
    let filesystem: Arc<dyn FileSystemAccess> = Arc::new(filesystem);
    let library = Arc::new(DirectoryMediaLibrary::new(media_root));
    let queue = Arc::new(BoundedUploadQueue::new(Arc::clone(&http_client), queue_capacity));

    let deps = UploadDependencies::new(library, queue, filesystem, Arc::clone(&identity));
    let deps = attach_inventory_mirror(deps, &config, http_client, identity);

    info!(queue_capacity, "Bootstrapping desktop upload service");
    UploadService::new(config, deps)
}

/// Adds the Firestore mirror when a project id is configured.
#[cfg(feature = "inventory-mirror")]
fn attach_inventory_mirror(
    deps: UploadDependencies,
    config: &UploadConfig,
    http_client: Arc<dyn HttpClient>,
    identity: Arc<dyn IdentityProvider>,
) -> UploadDependencies {
    let Some(project_id) = &config.inventory_project_id else {
        return deps;
    };

    let mirror = provider_firebase::FirestoreInventoryMirror::new(
        http_client,
        identity,
        project_id.clone(),
        config.collection_root.clone(),
    );
    info!(project_id = %project_id, "Inventory mirror enabled");
    deps.with_inventory_mirror(Arc::new(mirror))
}

#[cfg(not(feature = "inventory-mirror"))]
fn attach_inventory_mirror(
    deps: UploadDependencies,
    _config: &UploadConfig,
    _http_client: Arc<dyn HttpClient>,
    _identity: Arc<dyn IdentityProvider>,
) -> UploadDependencies {
    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use core_auth::{AuthToken, UserId};
    use tempfile::TempDir;

    struct NoIdentity;

    #[async_trait::async_trait]
    impl IdentityProvider for NoIdentity {
        fn current_user(&self) -> Option<UserId> {
            None
        }

        async fn fetch_token(&self, _user: &UserId) -> BridgeResult<AuthToken> {
            Ok(AuthToken::new("unused"))
        }
    }

    fn deps(dir: &TempDir) -> UploadDependencies {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new().unwrap());
        UploadDependencies::new(
            Arc::new(DirectoryMediaLibrary::new(dir.path().to_path_buf())),
            Arc::new(BoundedUploadQueue::new(http, 1)),
            Arc::new(TokioFileSystem::with_data_directory(dir.path().to_path_buf())),
            Arc::new(NoIdentity),
        )
    }

    fn config(project_id: Option<&str>) -> UploadConfig {
        let mut builder = UploadConfig::builder().bucket("demo.appspot.com");
        if let Some(id) = project_id {
            builder = builder.inventory_project_id(id);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_no_project_id_leaves_mirror_unset() {
        let dir = TempDir::new().unwrap();
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new().unwrap());

        let deps = attach_inventory_mirror(deps(&dir), &config(None), http, Arc::new(NoIdentity));

        assert!(deps.inventory.is_none());
    }

    #[test]
    fn test_project_id_attaches_mirror_only_with_feature() {
        let dir = TempDir::new().unwrap();
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new().unwrap());

        let deps = attach_inventory_mirror(
            deps(&dir),
            &config(Some("demo-project")),
            http,
            Arc::new(NoIdentity),
        );

        assert_eq!(deps.inventory.is_some(), cfg!(feature = "inventory-mirror"));
    }
}
