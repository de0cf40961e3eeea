//! Error types for the query task.

use surreal_query_connection::ConnectionError;
use surreal_query_storage::StorageError;
use thiserror::Error;

use crate::render::RenderError;

/// Every way a query task invocation can fail.
///
/// Nothing is retried; the host engine decides what to do with the error.
#[derive(Error, Debug)]
pub enum QueryTaskError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("SurrealDB query failed: {0}")]
    Query(String),

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Invalid task configuration: {0}")]
    InvalidTask(String),

    #[error("Failed to serialize query results: {0}")]
    Serialization(#[source] StorageError),

    #[error("Failed to store query results: {0}")]
    Storage(#[source] StorageError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type alias for query task operations.
pub type Result<T> = std::result::Result<T, QueryTaskError>;
