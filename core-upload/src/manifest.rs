//! # Dedup Manifest
//!
//! Durable, add-only set of dedup keys that have already been turned into
//! upload jobs.
//!
//! The set lives in memory behind an async mutex and is persisted as a JSON
//! array of strings. Every save rewrites the whole file while the lock is
//! held, so two writers can never interleave. Persistence is best-effort in
//! both directions:
//!
//! - a missing or unreadable file loads as an empty set
//! - a failed save is logged and the in-memory set stays authoritative
//!
//! When an [`InventoryMirror`] is attached, each flushed batch is also
//! written to the remote inventory from a detached task whose outcome is
//! only logged.

use crate::error::Result;
use crate::key::DedupKey;
use bridge_traits::remote::{InventoryMirror, InventoryRecord};
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_async::sync::Mutex;
use core_async::task;
use core_auth::UserId;
use core_runtime::logging::strip_path;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct DedupManifest {
    keys: Mutex<HashSet<String>>,
    fs: Arc<dyn FileSystemAccess>,
    path: PathBuf,
    mirror: Option<Arc<dyn InventoryMirror>>,
    source: String,
}

impl DedupManifest {
    /// Open the manifest at `relative_path` under the host data directory.
    ///
    /// Fails only when the data directory itself cannot be resolved.
    pub async fn open(fs: Arc<dyn FileSystemAccess>, relative_path: &Path) -> Result<Self> {
        let path = fs.get_data_directory().await?.join(relative_path);
        Ok(Self::load(fs, path).await)
    }

    /// Load the manifest stored at `path`, starting empty on any failure.
    #[instrument(skip(fs, path), fields(file = %strip_path(&path.to_string_lossy())))]
    pub async fn load(fs: Arc<dyn FileSystemAccess>, path: PathBuf) -> Self {
        let keys = match read_keys(fs.as_ref(), &path).await {
            Ok(Some(keys)) => {
                info!(count = keys.len(), "Loaded upload manifest");
                keys
            }
            Ok(None) => {
                debug!("No upload manifest yet, starting empty");
                HashSet::new()
            }
            Err(e) => {
                warn!(error = %e, "Upload manifest unreadable, starting empty");
                HashSet::new()
            }
        };

        Self {
            keys: Mutex::new(keys),
            fs,
            path,
            mirror: None,
            source: String::new(),
        }
    }

    /// Mirror flushed batches to `mirror`, tagging records with `source`
    pub fn with_mirror(mut self, mirror: Arc<dyn InventoryMirror>, source: impl Into<String>) -> Self {
        self.mirror = Some(mirror);
        self.source = source.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True iff `key` has ever been recorded
    pub async fn contains(&self, key: &DedupKey) -> bool {
        self.keys.lock().await.contains(key.as_str())
    }

    pub async fn len(&self) -> usize {
        self.keys.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keys.lock().await.is_empty()
    }

    /// Insert `key` in memory only; persisted by the next [`mark_uploaded`](Self::mark_uploaded)
    pub async fn record(&self, key: &DedupKey) {
        self.keys.lock().await.insert(key.as_str().to_string());
    }

    /// Insert `keys`, persist the full set and mirror the batch remotely.
    ///
    /// Never fails: save errors are logged and the remote write is detached.
    #[instrument(skip(self, keys, user), fields(count = keys.len(), user_id = %user))]
    pub async fn mark_uploaded(&self, keys: &[DedupKey], user: &UserId) {
        if keys.is_empty() {
            return;
        }

        {
            let mut set = self.keys.lock().await;
            for key in keys {
                set.insert(key.as_str().to_string());
            }

            if let Err(e) = self.save_locked(&set).await {
                warn!(error = %e, "Failed to persist upload manifest");
            }
        }

        self.spawn_mirror_write(keys, user);
    }

    async fn save_locked(&self, set: &HashSet<String>) -> Result<()> {
        let sorted: BTreeSet<&String> = set.iter().collect();
        let data = serde_json::to_vec(&sorted)?;

        if let Some(parent) = self.path.parent() {
            if !self.fs.exists(parent).await? {
                self.fs.create_dir_all(parent).await?;
            }
        }
        self.fs.write_file(&self.path, Bytes::from(data)).await?;

        debug!(count = set.len(), "Persisted upload manifest");
        Ok(())
    }

    fn spawn_mirror_write(&self, keys: &[DedupKey], user: &UserId) {
        let Some(mirror) = self.mirror.clone() else {
            return;
        };

        let records: Vec<InventoryRecord> = keys
            .iter()
            .map(|key| InventoryRecord {
                key: key.as_str().to_string(),
                source: self.source.clone(),
            })
            .collect();
        let user = user.clone();

        task::spawn(async move {
            match mirror.record_uploaded(user.as_str(), &records).await {
                Ok(()) => debug!(count = records.len(), "Mirrored upload inventory"),
                Err(e) => warn!(error = %e, "Inventory mirror write failed"),
            }
        });
    }
}

async fn read_keys(fs: &dyn FileSystemAccess, path: &Path) -> Result<Option<HashSet<String>>> {
    if !fs.exists(path).await? {
        return Ok(None);
    }
    let data = fs.read_file(path).await?;
    let keys: HashSet<String> = serde_json::from_slice(&data)?;
    Ok(Some(keys))
}
