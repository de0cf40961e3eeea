//! Connection configuration shared by the one-shot query task and the polling trigger.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConnectionError;

/// Default SurrealDB port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default time allowed for opening the transport.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Which kind of SurrealDB user the credentials belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLevel {
    /// System (root) user
    #[default]
    Root,
    /// User defined on the configured namespace
    Namespace,
    /// User defined on the configured database
    Database,
}

impl std::str::FromStr for AuthLevel {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "root" => Ok(Self::Root),
            "namespace" | "ns" => Ok(Self::Namespace),
            "database" | "db" => Ok(Self::Database),
            _ => Err(ConnectionError::InvalidConfig(format!(
                "Invalid auth level: '{s}'. Expected 'root', 'namespace' or 'database'"
            ))),
        }
    }
}

/// Everything needed to open a ready-to-query SurrealDB connection.
///
/// Credentials are optional. When either `username` or `password` is missing
/// the connector skips authentication and works as a guest.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default, alias = "use_tls")]
    pub use_tls: bool,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default, alias = "auth_level")]
    pub auth_level: AuthLevel,

    pub namespace: String,

    pub database: String,

    #[serde(
        default = "default_connection_timeout",
        alias = "connection_timeout",
        deserialize_with = "crate::duration::deserialize"
    )]
    pub connection_timeout: Duration,

    /// Full endpoint URL (`ws://`, `wss://`, `mem://`...) used instead of
    /// the one derived from `host`, `port` and `use_tls`.
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_connection_timeout() -> Duration {
    DEFAULT_CONNECTION_TIMEOUT
}

impl ConnectionConfig {
    /// Create a config for `host` with defaults for everything optional.
    pub fn new(
        host: impl Into<String>,
        namespace: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            use_tls: false,
            username: None,
            password: None,
            auth_level: AuthLevel::Root,
            namespace: namespace.into(),
            database: database.into(),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            endpoint: None,
        }
    }

    /// Create a config that connects to an explicit endpoint URL.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        namespace: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::new("", namespace, database)
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn use_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn auth_level(mut self, auth_level: AuthLevel) -> Self {
        self.auth_level = auth_level;
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Credentials when both halves are configured.
    pub fn credentials_pair(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }

    /// The WebSocket endpoint this config points at.
    ///
    /// Hosts given with an `http(s)://` scheme are rewritten to `ws(s)://`.
    pub fn endpoint_url(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint
                .replace("http://", "ws://")
                .replace("https://", "wss://");
        }

        let host = self
            .host
            .trim()
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .trim_start_matches("ws://")
            .trim_start_matches("wss://")
            .trim_end_matches('/');
        let scheme = if self.use_tls { "wss" } else { "ws" };
        format!("{scheme}://{host}:{}", self.port)
    }

    /// Check the config before any network activity.
    pub fn validate(&self) -> Result<(), ConnectionError> {
        let endpoint_set = self
            .endpoint
            .as_deref()
            .is_some_and(|endpoint| !endpoint.trim().is_empty());

        if !endpoint_set && self.host.trim().is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "host must not be blank".to_string(),
            ));
        }
        if !endpoint_set && self.port == 0 {
            return Err(ConnectionError::InvalidConfig(
                "port must be positive".to_string(),
            ));
        }
        if self.namespace.trim().is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "namespace must not be blank".to_string(),
            ));
        }
        if self.database.trim().is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "database must not be blank".to_string(),
            ));
        }
        if self.connection_timeout.is_zero() {
            return Err(ConnectionError::InvalidConfig(
                "connectionTimeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// Hand-written so the password never ends up in logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("auth_level", &self.auth_level)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("connection_timeout", &self.connection_timeout)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_yaml() {
        let config: ConnectionConfig = serde_yaml::from_str(
            r#"
host: localhost
namespace: ns
database: db
"#,
        )
        .unwrap();

        assert_eq!(config.port, 8000);
        assert!(!config.use_tls);
        assert_eq!(config.connection_timeout, Duration::from_secs(60));
        assert_eq!(config.auth_level, AuthLevel::Root);
        assert!(config.credentials_pair().is_none());
        assert_eq!(config.endpoint_url(), "ws://localhost:8000");
    }

    #[test]
    fn test_camel_case_and_snake_case_keys() {
        let camel: ConnectionConfig = serde_yaml::from_str(
            r#"
host: db.example.com
port: 443
useTls: true
connectionTimeout: 5s
authLevel: database
namespace: ns
database: db
"#,
        )
        .unwrap();
        let snake: ConnectionConfig = serde_yaml::from_str(
            r#"
host: db.example.com
port: 443
use_tls: true
connection_timeout: 5
auth_level: database
namespace: ns
database: db
"#,
        )
        .unwrap();

        assert_eq!(camel, snake);
        assert_eq!(camel.endpoint_url(), "wss://db.example.com:443");
        assert_eq!(camel.connection_timeout, Duration::from_secs(5));
        assert_eq!(camel.auth_level, AuthLevel::Database);
    }

    #[test]
    fn test_endpoint_rewrites_http_scheme() {
        let config = ConnectionConfig::new("https://db.example.com/", "ns", "db").use_tls(true);
        assert_eq!(config.endpoint_url(), "wss://db.example.com:8000");

        let config = ConnectionConfig::with_endpoint("http://localhost:8000", "ns", "db");
        assert_eq!(config.endpoint_url(), "ws://localhost:8000");

        let config = ConnectionConfig::with_endpoint("mem://", "ns", "db");
        assert_eq!(config.endpoint_url(), "mem://");
    }

    #[test]
    fn test_half_configured_credentials_are_ignored() {
        let mut config = ConnectionConfig::new("localhost", "ns", "db");
        config.username = Some("root".to_string());
        assert!(config.credentials_pair().is_none());

        let config = config.credentials("root", "secret");
        assert_eq!(config.credentials_pair(), Some(("root", "secret")));
    }

    #[test]
    fn test_validate() {
        assert!(ConnectionConfig::new("localhost", "ns", "db")
            .validate()
            .is_ok());
        assert!(ConnectionConfig::with_endpoint("mem://", "ns", "db")
            .validate()
            .is_ok());

        let err = ConnectionConfig::new("  ", "ns", "db").validate().unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidConfig(_)));

        let err = ConnectionConfig::new("localhost", "", "db")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("namespace"));

        let err = ConnectionConfig::new("localhost", "ns", " ")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("database"));

        let err = ConnectionConfig::new("localhost", "ns", "db")
            .port(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("port"));

        let err = ConnectionConfig::new("localhost", "ns", "db")
            .connection_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("connectionTimeout"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ConnectionConfig::new("localhost", "ns", "db").credentials("root", "hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_auth_level_from_str() {
        assert_eq!("ROOT".parse::<AuthLevel>().unwrap(), AuthLevel::Root);
        assert_eq!("ns".parse::<AuthLevel>().unwrap(), AuthLevel::Namespace);
        assert_eq!("database".parse::<AuthLevel>().unwrap(), AuthLevel::Database);
        assert!("scope".parse::<AuthLevel>().is_err());
    }
}
