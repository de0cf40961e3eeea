//! surreal-query
//!
//! Run SurrealQL queries from the command line or on a schedule.
//!
//! # CLI Usage
//!
//! ```bash
//! # Run a query once and print the rows
//! surreal-query query --host localhost --namespace shop --database main \
//!   --query 'SELECT * FROM person WHERE age > $age' --param age=18 --fetch-type FETCH
//!
//! # Load the task from a file, store the rows as JSON Lines
//! surreal-query query --config task.yaml --fetch-type STORE --storage-dir ./results
//!
//! # Poll every 5 minutes, print one JSON line per event
//! surreal-query watch --config trigger.toml --interval 5m
//! ```

use std::path::PathBuf;

use clap::Args;
use surreal_query_connection::AuthLevel;
use surreal_query_task::FetchType;

pub mod config;
pub mod watch;

/// Default directory for `STORE` results.
pub const DEFAULT_STORAGE_DIR: &str = ".surreal-query-storage";

/// SurrealDB connection flags. Every flag overrides the config file.
#[derive(Args, Clone, Debug, Default)]
pub struct ConnectionOpts {
    /// SurrealDB host name
    #[arg(long, env = "SURREAL_HOST")]
    pub host: Option<String>,

    /// SurrealDB port
    #[arg(long, env = "SURREAL_PORT")]
    pub port: Option<u16>,

    /// Connect with wss:// instead of ws://
    #[arg(long, env = "SURREAL_USE_TLS")]
    pub use_tls: bool,

    /// Full endpoint URL, used instead of host and port (e.g. ws://localhost:8000, mem://)
    #[arg(long, env = "SURREAL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// SurrealDB username
    #[arg(long, env = "SURREAL_USERNAME")]
    pub username: Option<String>,

    /// SurrealDB password
    #[arg(long, env = "SURREAL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Level the credentials are defined at (root, namespace, database)
    #[arg(long, env = "SURREAL_AUTH_LEVEL")]
    pub auth_level: Option<AuthLevel>,

    /// Namespace to select
    #[arg(long, env = "SURREAL_NAMESPACE")]
    pub namespace: Option<String>,

    /// Database to select
    #[arg(long, env = "SURREAL_DATABASE")]
    pub database: Option<String>,

    /// Time allowed for opening the connection (e.g. 30s, 1m)
    #[arg(long, env = "SURREAL_CONNECTION_TIMEOUT")]
    pub connection_timeout: Option<String>,
}

/// Flags shared by `query` and `watch`.
#[derive(Args, Clone, Debug, Default)]
pub struct QueryOpts {
    /// YAML or TOML file with the task definition
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionOpts,

    /// SurrealQL query text
    #[arg(long)]
    pub query: Option<String>,

    /// Query parameter bound as $NAME (format: NAME=VALUE, VALUE parsed as JSON when possible)
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// How rows are returned: FETCH, FETCH_ONE, STORE or NONE
    #[arg(long)]
    pub fetch_type: Option<FetchType>,

    /// Template variable available as {{ NAME }} (format: NAME=VALUE)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    /// Directory where STORE results are written
    #[arg(long, default_value = DEFAULT_STORAGE_DIR)]
    pub storage_dir: PathBuf,
}

/// Flags for the polling scheduler.
#[derive(Args, Clone, Debug, Default)]
pub struct WatchOpts {
    #[command(flatten)]
    pub query: QueryOpts,

    /// Trigger id reported in events
    #[arg(long)]
    pub id: Option<String>,

    /// Time between ticks (e.g. 30s, 5m, 1h)
    #[arg(long)]
    pub interval: Option<String>,

    /// Stop after emitting this many events
    #[arg(long)]
    pub max_events: Option<u64>,

    /// Stop on the first failed tick instead of logging it
    #[arg(long)]
    pub fail_fast: bool,
}
