//! Error types for storage operations.

use thiserror::Error;

/// Errors raised while serializing rows or persisting result files.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("Invalid storage URI '{0}'")]
    InvalidUri(String),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
