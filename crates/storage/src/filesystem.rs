//! Filesystem-based result storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Result, StorageError};
use crate::store::{Storage, StorageUri};

/// Filesystem implementation of the Storage trait.
///
/// Copies each file into a directory under a unique name.
pub struct FilesystemStorage {
    dir: PathBuf,
}

impl FilesystemStorage {
    /// Create a new FilesystemStorage with the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the directory path.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Resolve a URI returned by this storage back to its file.
    pub fn resolve(&self, uri: &StorageUri) -> Result<PathBuf> {
        let path = uri.to_path()?;
        let dir = std::fs::canonicalize(&self.dir)?;
        if !path.starts_with(&dir) {
            return Err(StorageError::InvalidUri(uri.to_string()));
        }
        Ok(path)
    }
}

#[async_trait]
impl Storage for FilesystemStorage {
    async fn put_file(&self, local: &Path) -> Result<StorageUri> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = match local.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{}.{ext}", uuid::Uuid::new_v4()),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let target = self.dir.join(filename);

        let bytes = tokio::fs::copy(local, &target).await?;
        let target = tokio::fs::canonicalize(&target).await?;

        tracing::info!("Stored {} bytes to {}", bytes, target.display());
        Ok(StorageUri::from_path(&target))
    }
}
