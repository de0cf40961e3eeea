//! SurrealDB connection handling for surreal-query.
//!
//! A connection is opened per invocation and closed at the end of it:
//!
//! 1. open the WebSocket transport (bounded by `connectionTimeout`)
//! 2. sign in, unless credentials are absent (guest mode)
//! 3. select namespace and database
//!
//! There is no pooling and no retry; failures surface as [`ConnectionError`].
//!
//! # Example
//!
//! ```ignore
//! use surreal_query_connection::{connect, ConnectionConfig};
//!
//! let config = ConnectionConfig::new("localhost", "test", "test").credentials("root", "root");
//! let mut handle = connect(&config).await?;
//! handle.client()?.query("INFO FOR DB").await?;
//! handle.disconnect().await;
//! ```

mod config;
mod connector;
pub mod duration;
mod error;

pub use config::{AuthLevel, ConnectionConfig, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_PORT};
pub use connector::{connect, disconnect, ConnectionHandle};
pub use error::{ConnectionError, Result};

/// Re-exported client crate so dependents use the same SDK version.
pub use surrealdb;
