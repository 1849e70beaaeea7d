//! # Upload Configuration
//!
//! The settings an upload controller needs, built with a fail-fast builder:
//!
//! ```ignore
//! use core_runtime::config::UploadConfig;
//! use std::time::Duration;
//!
//! let config = UploadConfig::builder()
//!     .bucket("my-app.appspot.com")
//!     .token_timeout(Duration::from_secs(5))
//!     .build()?;
//! # Ok::<(), core_runtime::Error>(())
//! ```
//!
//! Only the storage bucket is required. Everything else defaults to the
//! values the background uploader has always used (5 retries, 10
//! acknowledgements and a 5000-item scan ceiling per invocation).

use crate::error::{Error, Result};
use std::time::Duration;

pub const DEFAULT_STORAGE_HOST: &str = "firebasestorage.googleapis.com";
pub const DEFAULT_COLLECTION_ROOT: &str = "users";
pub const DEFAULT_RETRY_BATCH_SIZE: usize = 5;
pub const DEFAULT_ACKNOWLEDGE_BATCH_SIZE: usize = 10;
pub const DEFAULT_SCAN_CEILING: usize = 5000;
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MANIFEST_DIR: &str = "UploadManifest";
pub const DEFAULT_MANIFEST_FILE: &str = "uploaded-assets.json";
pub const DEFAULT_INVENTORY_SOURCE: &str = "background-upload";
pub const DEFAULT_WORKER_THREADS: usize = 2;

const MAX_TOKEN_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_WORKER_THREADS: usize = 16;

/// Settings for one upload controller instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Storage bucket used in the upload URL
    pub bucket: String,
    pub storage_host: String,
    /// First segment of object paths and inventory records
    pub collection_root: String,
    pub retry_batch_size: usize,
    pub acknowledge_batch_size: usize,
    /// Candidates examined per invocation before reporting more work
    pub scan_ceiling: usize,
    /// Bounded wait for an auth token
    pub token_timeout: Duration,
    /// Subfolder of the app data directory holding the manifest
    pub manifest_dir: String,
    pub manifest_file: String,
    /// `source` tag written to inventory records
    pub inventory_source: String,
    /// Firestore project; the inventory mirror is disabled when unset
    pub inventory_project_id: Option<String>,
    pub worker_threads: usize,
}

impl UploadConfig {
    pub fn builder() -> UploadConfigBuilder {
        UploadConfigBuilder::default()
    }

    /// Manifest location relative to the app data directory
    pub fn manifest_relative_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.manifest_dir).join(&self.manifest_file)
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("Bucket", &self.bucket),
            ("Storage host", &self.storage_host),
            ("Collection root", &self.collection_root),
            ("Manifest directory", &self.manifest_dir),
            ("Manifest file", &self.manifest_file),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} cannot be empty", name)));
            }
        }

        if self.collection_root.contains('/') {
            return Err(Error::Config(
                "Collection root must be a single path segment".to_string(),
            ));
        }

        if self.retry_batch_size == 0 || self.acknowledge_batch_size == 0 {
            return Err(Error::Config(
                "Retry and acknowledge batch sizes must be greater than 0".to_string(),
            ));
        }

        if self.scan_ceiling == 0 {
            return Err(Error::Config(
                "Scan ceiling must be greater than 0".to_string(),
            ));
        }

        if self.token_timeout.is_zero() || self.token_timeout > MAX_TOKEN_TIMEOUT {
            return Err(Error::Config(format!(
                "Token timeout must be between 1ms and {}s",
                MAX_TOKEN_TIMEOUT.as_secs()
            )));
        }

        if self.worker_threads == 0 || self.worker_threads > MAX_WORKER_THREADS {
            return Err(Error::Config(format!(
                "Worker threads must be between 1 and {}",
                MAX_WORKER_THREADS
            )));
        }

        if let Some(project) = &self.inventory_project_id {
            if project.trim().is_empty() {
                return Err(Error::Config(
                    "Inventory project id cannot be empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Builder for [`UploadConfig`]
#[derive(Debug, Default, Clone)]
pub struct UploadConfigBuilder {
    bucket: Option<String>,
    storage_host: Option<String>,
    collection_root: Option<String>,
    retry_batch_size: Option<usize>,
    acknowledge_batch_size: Option<usize>,
    scan_ceiling: Option<usize>,
    token_timeout: Option<Duration>,
    manifest_dir: Option<String>,
    manifest_file: Option<String>,
    inventory_source: Option<String>,
    inventory_project_id: Option<String>,
    worker_threads: Option<usize>,
}

impl UploadConfigBuilder {
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn storage_host(mut self, host: impl Into<String>) -> Self {
        self.storage_host = Some(host.into());
        self
    }

    pub fn collection_root(mut self, root: impl Into<String>) -> Self {
        self.collection_root = Some(root.into());
        self
    }

    pub fn retry_batch_size(mut self, size: usize) -> Self {
        self.retry_batch_size = Some(size);
        self
    }

    pub fn acknowledge_batch_size(mut self, size: usize) -> Self {
        self.acknowledge_batch_size = Some(size);
        self
    }

    pub fn scan_ceiling(mut self, ceiling: usize) -> Self {
        self.scan_ceiling = Some(ceiling);
        self
    }

    pub fn token_timeout(mut self, timeout: Duration) -> Self {
        self.token_timeout = Some(timeout);
        self
    }

    pub fn manifest_dir(mut self, dir: impl Into<String>) -> Self {
        self.manifest_dir = Some(dir.into());
        self
    }

    pub fn manifest_file(mut self, file: impl Into<String>) -> Self {
        self.manifest_file = Some(file.into());
        self
    }

    pub fn inventory_source(mut self, source: impl Into<String>) -> Self {
        self.inventory_source = Some(source.into());
        self
    }

    /// Enable the Firestore inventory mirror for `project_id`
    pub fn inventory_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.inventory_project_id = Some(project_id.into());
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the bucket is missing or any value is
    /// out of range.
    pub fn build(self) -> Result<UploadConfig> {
        let bucket = self.bucket.ok_or_else(|| {
            Error::Config("Storage bucket is required. Use .bucket() to set it.".to_string())
        })?;

        let config = UploadConfig {
            bucket,
            storage_host: self
                .storage_host
                .unwrap_or_else(|| DEFAULT_STORAGE_HOST.to_string()),
            collection_root: self
                .collection_root
                .unwrap_or_else(|| DEFAULT_COLLECTION_ROOT.to_string()),
            retry_batch_size: self.retry_batch_size.unwrap_or(DEFAULT_RETRY_BATCH_SIZE),
            acknowledge_batch_size: self
                .acknowledge_batch_size
                .unwrap_or(DEFAULT_ACKNOWLEDGE_BATCH_SIZE),
            scan_ceiling: self.scan_ceiling.unwrap_or(DEFAULT_SCAN_CEILING),
            token_timeout: self.token_timeout.unwrap_or(DEFAULT_TOKEN_TIMEOUT),
            manifest_dir: self
                .manifest_dir
                .unwrap_or_else(|| DEFAULT_MANIFEST_DIR.to_string()),
            manifest_file: self
                .manifest_file
                .unwrap_or_else(|| DEFAULT_MANIFEST_FILE.to_string()),
            inventory_source: self
                .inventory_source
                .unwrap_or_else(|| DEFAULT_INVENTORY_SOURCE.to_string()),
            inventory_project_id: self.inventory_project_id,
            worker_threads: self.worker_threads.unwrap_or(DEFAULT_WORKER_THREADS),
        };

        config.validate()?;

        Ok(config)
    }
}
