//! Query execution over an open connection.

use serde::{Deserialize, Serialize};
use surreal_query_connection::ConnectionHandle;
use surreal_query_types::ResultBatch;

use crate::error::{QueryTaskError, Result};
use crate::Parameters;

/// A SurrealQL query with its named parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub parameters: Parameters,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            parameters: Parameters::new(),
        }
    }

    /// Add a `$name` parameter.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Reject blank queries and nested parameter values.
    ///
    /// Parameters must be null, booleans, numbers or strings; casts such as
    /// `<int> $age` belong in the query text.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(QueryTaskError::InvalidTask(
                "query must not be blank".to_string(),
            ));
        }

        for (name, value) in &self.parameters {
            if name.trim().is_empty() {
                return Err(QueryTaskError::InvalidParameter {
                    name: name.clone(),
                    message: "parameter names must not be blank".to_string(),
                });
            }
            if value.is_array() || value.is_object() {
                return Err(QueryTaskError::InvalidParameter {
                    name: name.clone(),
                    message: "only scalar values (null, bool, number, string) are accepted"
                        .to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Send a query and collect one batch per statement.
///
/// The first failing statement turns the whole call into a
/// [`QueryTaskError::Query`] carrying the driver's message.
pub async fn execute(handle: &ConnectionHandle, request: &QueryRequest) -> Result<Vec<ResultBatch>> {
    request.validate()?;

    let client = handle.client()?;

    let mut query = client.query(request.query.as_str());
    for (name, value) in &request.parameters {
        query = match value {
            // JSON null would otherwise reach the database as NONE
            serde_json::Value::Null => query.bind((name.clone(), surrealdb::sql::Value::Null)),
            other => query.bind((name.clone(), other.clone())),
        };
    }

    let mut response = query
        .await
        .map_err(|e| QueryTaskError::Query(e.to_string()))?;

    let statements = response.num_statements();
    let mut batches = Vec::with_capacity(statements);
    for index in 0..statements {
        let value: surrealdb::Value = response
            .take(index)
            .map_err(|e| QueryTaskError::Query(e.to_string()))?;
        let batch = ResultBatch::from_surreal(index, &value.into_inner());
        tracing::debug!("Statement {} returned {} rows", index, batch.row_count());
        batches.push(batch);
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_scalars() {
        let request = QueryRequest::new("CREATE t SET a = $a, b = $b, c = $c, d = $d")
            .bind("a", "text")
            .bind("b", 3)
            .bind("c", true)
            .bind("d", serde_json::Value::Null);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nested_values() {
        let request = QueryRequest::new("RETURN $list").bind("list", json!([1, 2]));
        let err = request.validate().unwrap_err();
        assert!(matches!(err, QueryTaskError::InvalidParameter { ref name, .. } if name == "list"));

        let request = QueryRequest::new("RETURN $obj").bind("obj", json!({"a": 1}));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_query() {
        let err = QueryRequest::new("   ").validate().unwrap_err();
        assert!(matches!(err, QueryTaskError::InvalidTask(_)));
    }
}
