//! Storage trait and shared types
//!
//! The host engine owns the real file storage; this trait is the seam the
//! query task uses to hand over a finished result file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// Reference to a file persisted by a [`Storage`] backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageUri(String);

impl StorageUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// URI for a local file.
    pub fn from_path(path: &Path) -> Self {
        Self(format!("file://{}", path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn scheme(&self) -> Option<&str> {
        self.0.split_once("://").map(|(scheme, _)| scheme)
    }

    /// Local path behind a `file://` URI.
    pub fn to_path(&self) -> Result<PathBuf> {
        self.0
            .strip_prefix("file://")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| StorageError::InvalidUri(self.0.clone()))
    }
}

impl std::fmt::Display for StorageUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for result file persistence.
///
/// Implementations take ownership of the file's content; the caller may
/// delete `local` once `put_file` returns.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a local file and return a URI the host can resolve later.
    async fn put_file(&self, local: &Path) -> Result<StorageUri>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_uri_round_trip() {
        let uri = StorageUri::from_path(Path::new("/tmp/results/abc.jsonl"));
        assert_eq!(uri.as_str(), "file:///tmp/results/abc.jsonl");
        assert_eq!(uri.scheme(), Some("file"));
        assert_eq!(
            uri.to_path().unwrap(),
            PathBuf::from("/tmp/results/abc.jsonl")
        );
    }

    #[test]
    fn test_non_file_uri_has_no_path() {
        let uri = StorageUri::new("s3://bucket/key.jsonl");
        assert_eq!(uri.scheme(), Some("s3"));
        assert!(matches!(uri.to_path(), Err(StorageError::InvalidUri(_))));

        assert!(StorageUri::new("file://").to_path().is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let uri = StorageUri::new("file:///data/out.jsonl");
        assert_eq!(
            serde_json::to_string(&uri).unwrap(),
            "\"file:///data/out.jsonl\""
        );
    }
}
