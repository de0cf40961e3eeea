//! Connection lifecycle: connect → authenticate → select namespace/database → disconnect.

use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Namespace, Root};
use surrealdb::Surreal;

use crate::config::{AuthLevel, ConnectionConfig};
use crate::error::{ConnectionError, Result};

/// A ready-to-query connection owned by a single invocation.
///
/// The transport is closed by [`ConnectionHandle::disconnect`] or when the
/// handle is dropped, whichever comes first.
pub struct ConnectionHandle {
    client: Option<Surreal<Any>>,
    endpoint: String,
    authenticated: bool,
}

impl ConnectionHandle {
    /// The underlying SurrealDB client, as long as the handle is open.
    pub fn client(&self) -> Result<&Surreal<Any>> {
        self.client
            .as_ref()
            .ok_or_else(|| ConnectionError::Closed(self.endpoint.clone()))
    }

    /// Endpoint URL this handle was opened against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether a signin was performed when connecting.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    /// Close the transport. Calling this more than once is a no-op.
    pub async fn disconnect(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };

        if self.authenticated {
            if let Err(e) = client.invalidate().await {
                tracing::debug!(
                    "Ignoring session invalidation failure on {}: {}",
                    self.endpoint,
                    e
                );
            }
        }

        drop(client);
        tracing::debug!("Disconnected from SurrealDB at {}", self.endpoint);
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("endpoint", &self.endpoint)
            .field("open", &self.is_open())
            .field("authenticated", &self.authenticated)
            .finish()
    }
}

/// Open a connection, authenticate when credentials are present and select
/// the namespace and database.
pub async fn connect(config: &ConnectionConfig) -> Result<ConnectionHandle> {
    config.validate()?;

    let endpoint = config.endpoint_url();

    tracing::debug!(
        "Connecting to SurrealDB at {} (namespace: {}, database: {})",
        endpoint,
        config.namespace,
        config.database
    );

    let client = tokio::time::timeout(
        config.connection_timeout,
        surrealdb::engine::any::connect(endpoint.as_str()),
    )
    .await
    .map_err(|_| ConnectionError::Timeout {
        endpoint: endpoint.clone(),
        timeout: config.connection_timeout,
    })?
    .map_err(|e| ConnectionError::Connect {
        endpoint: endpoint.clone(),
        message: e.to_string(),
    })?;

    // From here on dropping `client` on an early return closes the transport.
    let authenticated = match config.credentials_pair() {
        Some((username, password)) => {
            signin(&client, config, username, password).await?;
            true
        }
        None => {
            if config.username.is_some() || config.password.is_some() {
                tracing::warn!(
                    "Only one of username/password is set for {}, connecting without authentication",
                    endpoint
                );
            } else {
                tracing::debug!("No credentials configured, connecting without authentication");
            }
            false
        }
    };

    client
        .use_ns(config.namespace.as_str())
        .use_db(config.database.as_str())
        .await
        .map_err(|e| ConnectionError::Selection {
            namespace: config.namespace.clone(),
            database: config.database.clone(),
            message: e.to_string(),
        })?;

    Ok(ConnectionHandle {
        client: Some(client),
        endpoint,
        authenticated,
    })
}

/// Close a handle. Equivalent to [`ConnectionHandle::disconnect`].
pub async fn disconnect(handle: &mut ConnectionHandle) {
    handle.disconnect().await;
}

async fn signin(
    client: &Surreal<Any>,
    config: &ConnectionConfig,
    username: &str,
    password: &str,
) -> Result<()> {
    tracing::debug!(
        "Signing in to SurrealDB as {:?} user '{}'",
        config.auth_level,
        username
    );

    let outcome = match config.auth_level {
        AuthLevel::Root => client.signin(Root { username, password }).await,
        AuthLevel::Namespace => {
            client
                .signin(Namespace {
                    namespace: &config.namespace,
                    username,
                    password,
                })
                .await
        }
        AuthLevel::Database => {
            client
                .signin(Database {
                    namespace: &config.namespace,
                    database: &config.database,
                    username,
                    password,
                })
                .await
        }
    };

    outcome.map(|_| ()).map_err(|e| ConnectionError::Auth {
        username: username.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINE_USERS: &str = "
        DEFINE USER root_user ON ROOT PASSWORD 'root_pass' ROLES OWNER;
        DEFINE USER ns_user ON NAMESPACE PASSWORD 'ns_pass' ROLES OWNER;
        DEFINE USER db_user ON DATABASE PASSWORD 'db_pass' ROLES OWNER;
    ";

    #[tokio::test]
    async fn test_signin_at_every_auth_level() -> anyhow::Result<()> {
        let config = ConnectionConfig::with_endpoint("mem://", "test_ns", "test_db");
        let handle = connect(&config).await?;
        let client = handle.client()?;
        client.query(DEFINE_USERS).await?.check()?;

        for (level, username, password) in [
            (AuthLevel::Root, "root_user", "root_pass"),
            (AuthLevel::Namespace, "ns_user", "ns_pass"),
            (AuthLevel::Database, "db_user", "db_pass"),
        ] {
            let scoped = config.clone().auth_level(level);
            signin(client, &scoped, username, password).await?;

            client
                .use_ns(scoped.namespace.as_str())
                .use_db(scoped.database.as_str())
                .await?;
            let mut response = client.query("RETURN 1 + 1").await?;
            let value: Option<i64> = response.take(0)?;
            assert_eq!(value, Some(2), "query failed after {level:?} signin");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_signin_rejects_wrong_level() -> anyhow::Result<()> {
        let config = ConnectionConfig::with_endpoint("mem://", "test_ns", "test_db");
        let handle = connect(&config).await?;
        let client = handle.client()?;
        client.query(DEFINE_USERS).await?.check()?;

        // A database user is not a root user
        let err = signin(client, &config, "db_user", "db_pass")
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Auth { ref username, .. } if username == "db_user"));
        Ok(())
    }
}
