use super::{FileStorage, FileStorageRequest, Result, StorageError};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage backend - serves a single directory
///
/// Filenames are joined onto the base path verbatim. Names containing `..` or an
/// absolute path resolve outside the directory; nothing here guards against that.
pub struct LocalFileStorage {
    base_path: PathBuf,
    /// Write uploads to a staging file and rename into place, so readers never see a
    /// partially written file
    atomic_writes: bool,
}

impl LocalFileStorage {
    pub fn new(base_path: PathBuf, atomic_writes: bool) -> Self {
        Self { base_path, atomic_writes }
    }

    /// Resolve `name` under the base path, treating anything but a regular file as absent
    async fn regular_file(&self, name: &str) -> Result<PathBuf> {
        let full_path = self.base_path.join(name);

        match fs::metadata(&full_path).await {
            Ok(metadata) if metadata.is_file() => Ok(full_path),
            Ok(_) => Err(StorageError::NotFound),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

/// Hidden sibling of `target` used while an atomic upload is in flight.
///
/// The name does not embed the target's name, so a target near the filesystem's name
/// length limit still gets a valid staging file.
fn staging_path(target: &Path) -> io::Result<PathBuf> {
    let parent = target
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("{} has no parent directory", target.display())))?;

    Ok(parent.join(format!(".{}.part", uuid::Uuid::new_v4())))
}

async fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    Ok(())
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.base_path).await?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(names)
    }

    async fn store(&self, request: FileStorageRequest) -> Result<()> {
        let target = self.base_path.join(&request.filename);

        if !self.atomic_writes {
            write_file(&target, &request.content).await?;
            return Ok(());
        }

        let staging = staging_path(&target)?;
        tracing::trace!(staging = %staging.display(), target = %target.display(), "Writing staging file");

        if let Err(e) = write_file(&staging, &request.content).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&staging, &target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>> {
        let full_path = self.regular_file(name).await?;

        match fs::read(&full_path).await {
            Ok(content) => Ok(content),
            // Removed between the metadata check and the read
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let full_path = self.regular_file(name).await?;

        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}
