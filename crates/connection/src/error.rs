//! Error types for the connection lifecycle.

use std::time::Duration;

use thiserror::Error;

/// Failures while opening, authenticating or using a SurrealDB connection.
///
/// Driver messages are kept verbatim in `message`.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Invalid connection configuration: {0}")]
    InvalidConfig(String),

    #[error("SurrealDB connection to '{endpoint}' failed: {message}")]
    Connect { endpoint: String, message: String },

    #[error("SurrealDB connection to '{endpoint}' timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("SurrealDB authentication failed (user: '{username}'): {message}")]
    Auth { username: String, message: String },

    #[error(
        "SurrealDB failed to select namespace '{namespace}' / database '{database}': {message}"
    )]
    Selection {
        namespace: String,
        database: String,
        message: String,
    },

    #[error("SurrealDB connection to '{0}' is already closed")]
    Closed(String),
}

/// Result type alias for connection operations.
pub type Result<T> = std::result::Result<T, ConnectionError>;
