//! One-shot SurrealQL query task.
//!
//! A [`QueryTask`] connects to SurrealDB, runs a query with named
//! parameters, closes the connection and hands the rows back shaped by its
//! [`FetchType`]:
//!
//! - `FETCH` returns every row
//! - `FETCH_ONE` returns the first row
//! - `STORE` writes the rows to a JSON Lines file and returns its URI
//! - `NONE` returns only the row count

pub mod error;
pub mod executor;
pub mod fetch;
pub mod render;
pub mod shape;
mod task;

/// Named query parameters, bound as `$name` in the query text.
pub type Parameters = std::collections::BTreeMap<String, serde_json::Value>;

pub use error::{QueryTaskError, Result};
pub use executor::{execute, QueryRequest};
pub use fetch::{FetchType, ParseFetchTypeError};
pub use render::{Passthrough, Render, RenderError, Variables};
pub use shape::{shape, QueryOutput};
pub use task::{QueryTask, RunContext};
