use std::io::SeekFrom;
use std::path::Path;
use async_trait::async_trait;
use tokio::fs;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use crate::error::{DownloadError, Result};

/// Destination of the downloaded bytes.
///
/// `write_at` calls for disjoint ranges of the same file may run
/// concurrently and must not disturb each other.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Creates or truncates `path` and sizes it to `length` bytes.
    async fn create(&self, path: &Path, length: u64) -> Result<()>;

    /// Writes all of `buffer` starting at `offset`.
    async fn write_at(&self, path: &Path, offset: u64, buffer: &[u8]) -> Result<()>;

    async fn size(&self, path: &Path) -> Result<u64>;
}

/// Local filesystem store. Each write opens its own handle, so writers
/// never share a file cursor.
#[derive(Debug, Default, Clone)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn create(&self, path: &Path, length: u64) -> Result<()> {
        let create_error = |source| DownloadError::FileCreate { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(create_error)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .await
            .map_err(create_error)?;
        file.set_len(length).await.map_err(create_error)?;
        Ok(())
    }

    async fn write_at(&self, path: &Path, offset: u64, buffer: &[u8]) -> Result<()> {
        let write_error = |source| DownloadError::FileWrite { path: path.to_path_buf(), offset, source };
        let mut file = OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(write_error)?;
        file.seek(SeekFrom::Start(offset)).await.map_err(write_error)?;
        file.write_all(buffer).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;
        Ok(())
    }

    async fn size(&self, path: &Path) -> Result<u64> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.len()),
            Err(source) => Err(DownloadError::FileMetadata { path: path.to_path_buf(), source }),
        }
    }
}
