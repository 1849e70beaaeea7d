//! Local storage abstraction
//!
//! File I/O over the host's app-private directories. The upload core only
//! needs whole-file reads and writes: the dedup manifest is small and is
//! rewritten wholesale.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// App-private file storage.
///
/// Paths handed to the other methods are rooted at
/// [`get_data_directory`](Self::get_data_directory); the manifest lives in a
/// subdirectory of it.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn save(fs: &dyn FileSystemAccess, data: &[u8]) -> Result<()> {
///     let dir = fs.get_data_directory().await?.join("UploadManifest");
///     fs.write_file(&dir.join("uploaded-assets.json"), data.to_vec().into()).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Persistent directory that survives app updates, created on first use
    async fn get_data_directory(&self) -> Result<PathBuf>;

    /// Whether `path` exists; a missing manifest is not an error
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// `mkdir -p` semantics
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Whole-file read
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Replace a file's contents, creating it and its parents if needed
    ///
    /// Implementations should make the replacement atomic where the platform
    /// allows it, so readers never observe a half-written file.
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;
}
