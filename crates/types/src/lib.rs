//! Query result rows for surreal-query.
//!
//! A [`Row`] is an insertion-ordered document (`serde_json::Map` built with
//! `preserve_order`) whose values are null, booleans, numbers, strings,
//! arrays or nested documents. [`ResultBatch`] groups the rows returned by
//! one statement of a possibly multi-statement query.

pub mod reverse;

use serde::{Deserialize, Serialize};

pub use reverse::{object_to_row, surreal_value_to_json, value_into_rows, SCALAR_ROW_KEY};

/// A single result row.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A field value inside a [`Row`].
pub type RowValue = serde_json::Value;

/// Rows produced by one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBatch {
    /// Zero-based position of the statement in the query text
    pub statement: usize,
    pub rows: Vec<Row>,
}

impl ResultBatch {
    pub fn new(statement: usize, rows: Vec<Row>) -> Self {
        Self { statement, rows }
    }

    /// Build a batch from a raw SurrealDB statement result.
    pub fn from_surreal(statement: usize, value: &surrealdb::sql::Value) -> Self {
        Self::new(statement, value_into_rows(value))
    }

    pub fn row_count(&self) -> u64 {
        self.rows.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Total number of rows across all batches.
pub fn total_rows(batches: &[ResultBatch]) -> u64 {
    batches.iter().map(ResultBatch::row_count).sum()
}

/// Flatten batches into one row sequence, keeping statement and row order.
pub fn flatten(batches: Vec<ResultBatch>) -> Vec<Row> {
    batches.into_iter().flat_map(|batch| batch.rows).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_total_rows_and_flatten_keep_order() {
        let batches = vec![
            ResultBatch::new(0, vec![row(json!({"n": 1})), row(json!({"n": 2}))]),
            ResultBatch::new(1, vec![]),
            ResultBatch::new(2, vec![row(json!({"n": 3}))]),
        ];

        assert_eq!(total_rows(&batches), 3);

        let rows = flatten(batches);
        let ns: Vec<i64> = rows.iter().filter_map(|r| r["n"].as_i64()).collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_surreal_none_is_empty() {
        let batch = ResultBatch::from_surreal(0, &surrealdb::sql::Value::None);
        assert!(batch.is_empty());
        assert_eq!(batch.row_count(), 0);
    }
}
