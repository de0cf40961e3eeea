//! JSON Lines record format.
//!
//! One self-describing JSON document per line. Field types survive a
//! write/read cycle unchanged: integers stay integers and floats are
//! written with enough digits to read back bit-identical.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use surreal_query_types::Row;
use tempfile::NamedTempFile;

use crate::error::{Result, StorageError};

/// File extension used for stored result sets.
pub const RECORDS_EXTENSION: &str = "jsonl";

/// Write buffer size for record files (64KB)
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Write rows as JSON Lines. Returns the number of records written.
pub fn write_records<W: Write>(writer: W, rows: &[Row]) -> Result<u64> {
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, writer);
    let mut written = 0u64;
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Read JSON Lines records. Blank lines are skipped.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let value: serde_json::Value =
            serde_json::from_str(&line).map_err(|e| StorageError::InvalidRecord {
                line: index + 1,
                message: e.to_string(),
            })?;

        match value {
            serde_json::Value::Object(row) => rows.push(row),
            other => {
                return Err(StorageError::InvalidRecord {
                    line: index + 1,
                    message: format!("expected a JSON object, found {other}"),
                })
            }
        }
    }
    Ok(rows)
}

/// Read all records from a file.
pub fn read_records_file(path: &Path) -> Result<Vec<Row>> {
    let file = File::open(path)?;
    read_records(BufReader::new(file))
}

/// Serialize rows into a fresh temp file ending in `.jsonl`.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_temp_records(rows: &[Row]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("surreal-query-")
        .suffix(&format!(".{RECORDS_EXTENSION}"))
        .tempfile()?;

    let written = write_records(file.as_file_mut(), rows)?;
    tracing::debug!(
        "Serialized {} records to {}",
        written,
        file.path().display()
    );
    Ok(file)
}
