//! The one-shot query task.

use std::sync::Arc;

use serde::Deserialize;
use surreal_query_connection::{connect, ConnectionConfig};
use surreal_query_storage::Storage;
use tracing::{debug, info};

use crate::error::Result;
use crate::executor::{execute, QueryRequest};
use crate::fetch::FetchType;
use crate::render::{Passthrough, Render};
use crate::shape::{shape, QueryOutput};
use crate::Parameters;

/// Services the host engine provides to a running task.
#[derive(Clone)]
pub struct RunContext {
    pub renderer: Arc<dyn Render>,
    pub storage: Arc<dyn Storage>,
}

impl RunContext {
    pub fn new(renderer: Arc<dyn Render>, storage: Arc<dyn Storage>) -> Self {
        Self { renderer, storage }
    }

    /// Context that renders nothing and stores through `storage`.
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self::new(Arc::new(Passthrough), storage)
    }
}

/// A configured SurrealQL query: where to connect, what to run and how to
/// hand the rows back.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTask {
    #[serde(flatten)]
    pub connection: ConnectionConfig,

    pub query: String,

    #[serde(default)]
    pub parameters: Parameters,

    #[serde(default, alias = "fetch_type")]
    pub fetch_type: FetchType,
}

impl QueryTask {
    pub fn new(connection: ConnectionConfig, query: impl Into<String>) -> Self {
        Self {
            connection,
            query: query.into(),
            parameters: Parameters::new(),
            fetch_type: FetchType::default(),
        }
    }

    pub fn fetch_type(mut self, fetch_type: FetchType) -> Self {
        self.fetch_type = fetch_type;
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Connect, run the query, disconnect and shape the rows.
    ///
    /// The connection is closed whether or not the query succeeded.
    pub async fn run(&self, ctx: &RunContext) -> Result<QueryOutput> {
        let renderer = ctx.renderer.as_ref();
        let connection = render_connection(renderer, &self.connection)?;
        let request = QueryRequest {
            query: renderer.render(&self.query)?,
            parameters: renderer.render_map(&self.parameters)?,
        };
        request.validate()?;

        let mut handle = connect(&connection).await?;
        info!(
            "Running query on {} ({}/{})",
            handle.endpoint(),
            connection.namespace,
            connection.database
        );

        let result = execute(&handle, &request).await;
        handle.disconnect().await;
        let batches = result?;

        let output = shape(batches, self.fetch_type, ctx.storage.as_ref()).await?;
        debug!(
            "Found '{}' rows from '{}'",
            output.size,
            request.query.trim()
        );
        Ok(output)
    }
}

fn render_connection(renderer: &dyn Render, config: &ConnectionConfig) -> Result<ConnectionConfig> {
    let mut rendered = config.clone();
    rendered.host = renderer.render(&config.host)?;
    rendered.namespace = renderer.render(&config.namespace)?;
    rendered.database = renderer.render(&config.database)?;
    rendered.username = config
        .username
        .as_deref()
        .map(|value| renderer.render(value))
        .transpose()?;
    rendered.password = config
        .password
        .as_deref()
        .map(|value| renderer.render(value))
        .transpose()?;
    rendered.endpoint = config
        .endpoint
        .as_deref()
        .map(|value| renderer.render(value))
        .transpose()?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Variables;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_deserialize_task_from_yaml() {
        let task: QueryTask = serde_yaml::from_str(
            r#"
host: localhost
port: 8001
namespace: shop
database: main
username: root
password: root
connectionTimeout: 10s
query: SELECT * FROM person WHERE age > $age
parameters:
  age: 18
fetchType: FETCH_ONE
"#,
        )
        .unwrap();

        assert_eq!(task.connection.port, 8001);
        assert_eq!(task.connection.connection_timeout, Duration::from_secs(10));
        assert_eq!(task.connection.credentials_pair(), Some(("root", "root")));
        assert_eq!(task.parameters["age"], json!(18));
        assert_eq!(task.fetch_type, FetchType::FetchOne);
    }

    #[test]
    fn test_fetch_type_defaults_to_store() {
        let task: QueryTask = serde_yaml::from_str(
            r#"
host: localhost
namespace: ns
database: db
query: RETURN 1
"#,
        )
        .unwrap();
        assert_eq!(task.fetch_type, FetchType::Store);
        assert!(task.parameters.is_empty());
    }

    #[test]
    fn test_render_connection() {
        let vars = Variables::new()
            .with("env", "prod")
            .with("secret", "hunter2");
        let config = ConnectionConfig::new("db-{{ env }}.internal", "{{ env }}", "main")
            .credentials("root", "{{ secret }}");

        let rendered = render_connection(&vars, &config).unwrap();
        assert_eq!(rendered.host, "db-prod.internal");
        assert_eq!(rendered.namespace, "prod");
        assert_eq!(rendered.database, "main");
        assert_eq!(rendered.credentials_pair(), Some(("root", "hunter2")));
        assert!(rendered.endpoint.is_none());
    }
}
