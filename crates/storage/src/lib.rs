//! Result file storage for surreal-query
//!
//! Used by the STORE fetch type: rows are serialized to a JSON Lines temp
//! file ([`records`]) and handed to a [`Storage`] backend, which returns the
//! [`StorageUri`] reported in the query output.
//!
//! ## Storage Backends
//!
//! - `FilesystemStorage` - Copies result files into a local directory

mod error;
mod filesystem;
pub mod records;
mod store;

pub use error::{Result, StorageError};
pub use filesystem::FilesystemStorage;
pub use records::{read_records, read_records_file, write_records, write_temp_records};
pub use store::{Storage, StorageUri};
