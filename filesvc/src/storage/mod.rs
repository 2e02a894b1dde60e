//! File storage backends.
//!
//! The service keeps no state of its own: every operation goes straight to the
//! [`FileStorage`] backend, which owns the Configured Directory. The only backend
//! is [`LocalFileStorage`], which reads and writes a directory on the local
//! filesystem.

pub mod errors;
pub mod local;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub use errors::{Result, StorageError};
pub use local::LocalFileStorage;

use crate::config::Config;

/// Request to store an uploaded file
#[derive(Debug, Clone)]
pub struct FileStorageRequest {
    /// Filename exactly as supplied by the client
    pub filename: String,
    pub content: Vec<u8>,
}

/// Trait for file storage backends
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// List the names of the immediate entries of the storage root, in the order the
    /// backend yields them
    async fn list(&self) -> Result<Vec<String>>;

    /// Store file content under the requested name, replacing any existing file
    async fn store(&self, request: FileStorageRequest) -> Result<()>;

    /// Retrieve the content of a file by name
    async fn retrieve(&self, name: &str) -> Result<Vec<u8>>;

    /// Remove a file. Fails with [`StorageError::NotFound`] if `name` is not a regular file.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Duplicate `source` under `destination`, replacing any existing file there
    async fn copy(&self, source: &str, destination: &str) -> Result<()> {
        let content = self.retrieve(source).await?;
        self.store(FileStorageRequest {
            filename: destination.to_string(),
            content,
        })
        .await
    }
}

/// Create the storage backend for the configured upload directory.
///
/// The directory must already exist and be enumerable; it is never created here so that
/// a typo in the configuration fails at startup instead of silently serving an empty
/// directory.
pub async fn create_file_storage(config: &Config) -> anyhow::Result<Arc<dyn FileStorage>> {
    let Some(upload_dir) = config.upload_dir.as_deref() else {
        anyhow::bail!("upload_dir is not configured");
    };

    check_directory(upload_dir).await?;

    tracing::info!(
        upload_dir = %upload_dir.display(),
        atomic_writes = config.uploads.atomic_writes,
        "Creating local file storage backend"
    );
    Ok(Arc::new(LocalFileStorage::new(upload_dir.to_path_buf(), config.uploads.atomic_writes)))
}

async fn check_directory(path: &Path) -> anyhow::Result<()> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| anyhow::anyhow!("Upload directory {} is not accessible: {}", path.display(), e))?;

    if !metadata.is_dir() {
        anyhow::bail!("Upload directory {} is not a directory", path.display());
    }

    let mut entries = tokio::fs::read_dir(path)
        .await
        .map_err(|e| anyhow::anyhow!("Upload directory {} cannot be read: {}", path.display(), e))?;
    entries
        .next_entry()
        .await
        .map_err(|e| anyhow::anyhow!("Upload directory {} cannot be listed: {}", path.display(), e))?;

    if metadata.permissions().readonly() {
        tracing::warn!(upload_dir = %path.display(), "Upload directory is read-only, uploads will fail");
    }

    Ok(())
}
