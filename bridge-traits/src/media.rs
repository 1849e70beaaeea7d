//! Media library abstraction
//!
//! Read-only view over the host's photo/video library:
//! - iOS: PhotoKit (`PHAsset` / `PHAssetResource`)
//! - Android: MediaStore
//! - Desktop: a folder tree (see `bridge-desktop`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Media type of a library entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Unknown,
}

impl MediaKind {
    /// Whether this kind is eligible for upload
    pub fn is_visual(&self) -> bool {
        matches!(self, MediaKind::Image | MediaKind::Video)
    }
}

/// One photo or video in the host library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Stable host identifier (e.g. a PhotoKit local identifier)
    pub id: String,
    pub kind: MediaKind,
    /// Creation time as a Unix timestamp in seconds, used only for ordering
    pub created_at: Option<i64>,
}

impl MediaAsset {
    pub fn new(id: impl Into<String>, kind: MediaKind, created_at: Option<i64>) -> Self {
        Self {
            id: id.into(),
            kind,
            created_at,
        }
    }
}

/// Kind of binary resource backing an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Photo,
    Video,
    FullSizePhoto,
    FullSizeVideo,
    PairedVideo,
    AlternatePhoto,
    Audio,
    Other,
}

/// A binary resource of an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetResource {
    pub asset_id: String,
    pub kind: ResourceKind,
    /// Original file name as reported by the host
    pub file_name: String,
    /// Host-specific location the upload queue reads the bytes from
    pub location: String,
}

/// Sort order for asset enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Enumeration options passed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuery {
    pub kinds: Vec<MediaKind>,
    pub order: AssetOrder,
}

impl AssetQuery {
    /// Images and videos, most recently created first
    pub fn visual_newest_first() -> Self {
        Self {
            kinds: vec![MediaKind::Image, MediaKind::Video],
            order: AssetOrder::NewestFirst,
        }
    }
}

/// Host media library
///
/// Implementations should honour the query's kind filter and order; callers
/// may re-apply both defensively.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Enumerate assets matching the query
    async fn enumerate_assets(&self, query: &AssetQuery) -> Result<Vec<MediaAsset>>;

    /// List the binary resources backing an asset
    ///
    /// An empty list means the asset has no usable data on this device.
    async fn list_resources(&self, asset: &MediaAsset) -> Result<Vec<AssetResource>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_kinds() {
        assert!(MediaKind::Image.is_visual());
        assert!(MediaKind::Video.is_visual());
        assert!(!MediaKind::Audio.is_visual());
        assert!(!MediaKind::Unknown.is_visual());
    }

    #[test]
    fn test_default_query() {
        let query = AssetQuery::visual_newest_first();
        assert_eq!(query.order, AssetOrder::NewestFirst);
        assert_eq!(query.kinds, vec![MediaKind::Image, MediaKind::Video]);
    }
}
