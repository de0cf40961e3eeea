//! Turning result batches into task output.

use serde::{Deserialize, Serialize};
use surreal_query_storage::{write_temp_records, Storage, StorageUri};
use surreal_query_types::{flatten, total_rows, ResultBatch, Row};

use crate::error::{QueryTaskError, Result};
use crate::fetch::FetchType;

/// Output of a query run.
///
/// At most one of `rows`, `row` and `uri` is set, depending on the fetch
/// type. `size` is always the number of rows across all statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<StorageUri>,
    pub size: u64,
}

impl QueryOutput {
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Shape result batches according to `fetch_type`.
pub async fn shape(
    batches: Vec<ResultBatch>,
    fetch_type: FetchType,
    storage: &dyn Storage,
) -> Result<QueryOutput> {
    let size = total_rows(&batches);
    let mut output = QueryOutput {
        size,
        ..Default::default()
    };

    match fetch_type {
        FetchType::Fetch => {
            output.rows = Some(flatten(batches));
        }
        FetchType::FetchOne => {
            output.row = flatten(batches).into_iter().next();
        }
        FetchType::Store => {
            let rows = flatten(batches);
            let file = write_temp_records(&rows).map_err(QueryTaskError::Serialization)?;
            let uri = storage
                .put_file(file.path())
                .await
                .map_err(QueryTaskError::Storage)?;
            output.uri = Some(uri);
        }
        FetchType::None => {}
    }

    Ok(output)
}
