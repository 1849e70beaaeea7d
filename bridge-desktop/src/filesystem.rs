//! App data storage on the local disk

use async_trait::async_trait;
use bridge_traits::{error::Result, storage::FileSystemAccess};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const APP_DIR_NAME: &str = "media-upload-core";

/// [`FileSystemAccess`] over `tokio::fs`.
///
/// Writes land in a hidden sibling first and are renamed into place, so a
/// crash mid-write leaves the previous manifest intact.
pub struct TokioFileSystem {
    data_dir: PathBuf,
}

impl TokioFileSystem {
    /// Rooted at `<platform data dir>/media-upload-core`, falling back to
    /// `~/.local/share` and then the working directory.
    pub fn new() -> Self {
        let base = dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self::with_data_directory(base.join(APP_DIR_NAME))
    }

    pub fn with_data_directory(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn staging_path(path: &Path) -> PathBuf {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        path.with_file_name(format!(".{}.tmp", name))
    }
}

impl Default for TokioFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn get_data_directory(&self) -> Result<PathBuf> {
        if !fs::try_exists(&self.data_dir).await? {
            fs::create_dir_all(&self.data_dir).await?;
            debug!(path = %self.data_dir.display(), "Created data directory");
        }
        Ok(self.data_dir.clone())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await?)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path).await?)
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await?;
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let staging = Self::staging_path(path);
        fs::write(&staging, &data).await?;
        fs::rename(&staging, path).await?;

        debug!(path = %path.display(), bytes = data.len(), "Replaced file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[core_async::test]
    async fn test_data_directory_is_created() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("nested").join("data");
        let fs = TokioFileSystem::with_data_directory(data.clone());

        assert_eq!(fs.get_data_directory().await.unwrap(), data);
        assert!(data.is_dir());
    }

    #[core_async::test]
    async fn test_write_replaces_and_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let fs = TokioFileSystem::with_data_directory(temp.path().to_path_buf());
        let path = temp.path().join("UploadManifest").join("uploaded-assets.json");

        fs.write_file(&path, Bytes::from("[\"a\"]")).await.unwrap();
        fs.write_file(&path, Bytes::from("[\"a\",\"b\"]")).await.unwrap();

        assert_eq!(fs.read_file(&path).await.unwrap(), Bytes::from("[\"a\",\"b\"]"));
        assert!(!TokioFileSystem::staging_path(&path).exists());
    }

    #[core_async::test]
    async fn test_exists_and_missing_read() {
        let temp = TempDir::new().unwrap();
        let fs = TokioFileSystem::with_data_directory(temp.path().to_path_buf());
        let path = temp.path().join("file.txt");

        assert!(!fs.exists(&path).await.unwrap());
        fs.write_file(&path, Bytes::from("x")).await.unwrap();
        assert!(fs.exists(&path).await.unwrap());
        assert!(fs.read_file(&temp.path().join("missing.txt")).await.is_err());
    }
}
