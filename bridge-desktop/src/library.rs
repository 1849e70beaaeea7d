//! Folder-backed media library
//!
//! Treats every photo and video below a root directory as a library asset.
//! Asset ids are the SHA-256 of the path relative to the root, so they stay
//! stable across runs and machines as long as files are not moved.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    media::{AssetOrder, AssetQuery, AssetResource, MediaAsset, MediaKind, MediaLibrary, ResourceKind},
};
use core_async::sync::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs;
use tracing::{debug, instrument, warn};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "heif", "gif", "webp", "tif", "tiff"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "avi", "mkv", "webm", "3gp"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "wav", "flac", "ogg"];

/// Media kind by file extension, case-insensitive
pub fn kind_for_path(path: &Path) -> MediaKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return MediaKind::Unknown;
    };
    let ext = ext.to_ascii_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Video
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Audio
    } else {
        MediaKind::Unknown
    }
}

/// Stable asset id for a path relative to the library root
pub fn asset_id_for(relative: &Path) -> String {
    let normalized = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

struct Entry {
    asset: MediaAsset,
    path: PathBuf,
}

/// Media library over a directory tree
pub struct DirectoryMediaLibrary {
    root: PathBuf,
    index: RwLock<HashMap<String, PathBuf>>,
}

impl DirectoryMediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn scan(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut read_dir = fs::read_dir(&dir).await.map_err(BridgeError::Io)?;

            while let Some(item) = read_dir.next_entry().await.map_err(BridgeError::Io)? {
                let path = item.path();
                let metadata = match item.metadata().await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable library entry");
                        continue;
                    }
                };

                if metadata.is_dir() {
                    pending.push(path);
                    continue;
                }

                let kind = kind_for_path(&path);
                if kind == MediaKind::Unknown {
                    continue;
                }

                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };

                let created_at = metadata
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs() as i64);

                entries.push(Entry {
                    asset: MediaAsset::new(asset_id_for(relative), kind, created_at),
                    path,
                });
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl MediaLibrary for DirectoryMediaLibrary {
    #[instrument(skip(self, query))]
    async fn enumerate_assets(&self, query: &AssetQuery) -> Result<Vec<MediaAsset>> {
        let entries = self.scan().await?;

        let mut index = self.index.write().await;
        index.clear();

        let mut assets = Vec::with_capacity(entries.len());
        for entry in entries {
            index.insert(entry.asset.id.clone(), entry.path);
            if query.kinds.is_empty() || query.kinds.contains(&entry.asset.kind) {
                assets.push(entry.asset);
            }
        }

        match query.order {
            AssetOrder::NewestFirst => assets.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            AssetOrder::OldestFirst => assets.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        debug!(count = assets.len(), "Enumerated library assets");
        Ok(assets)
    }

    async fn list_resources(&self, asset: &MediaAsset) -> Result<Vec<AssetResource>> {
        let path = match self.index.read().await.get(&asset.id) {
            Some(path) => path.clone(),
            None => return Ok(Vec::new()),
        };

        if !fs::try_exists(&path).await.map_err(BridgeError::Io)? {
            return Ok(Vec::new());
        }

        let kind = match asset.kind {
            MediaKind::Image => ResourceKind::Photo,
            MediaKind::Video => ResourceKind::Video,
            MediaKind::Audio => ResourceKind::Audio,
            MediaKind::Unknown => ResourceKind::Other,
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(vec![AssetResource {
            asset_id: asset.id.clone(),
            kind,
            file_name,
            location: path.to_string_lossy().into_owned(),
        }])
    }
}
