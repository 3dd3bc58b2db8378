//! Reader/writer for legacy fixed-layout table files.
//!
//! A table file carries a 32-byte descriptor, an array of 32-byte field
//! descriptors, and a record area of fixed-length records, each prefixed by a
//! one-byte deletion marker. [`DbfTable`] opens such a file, exposes the
//! schema, and navigates records through a clamping cursor; records decode
//! into typed [`Value`]s through the code page stored in the header.
//!
//! Mutations are in-place: append writes at the logical end and rewrites the
//! header record count, update overwrites one record slot, and removal flips
//! the deletion marker without reclaiming storage. All I/O is synchronous
//! and blocking over a single file descriptor per handle.
//!
//! ```no_run
//! use dbfio::{DbfTable, OpenMode};
//!
//! # fn main() -> Result<(), dbfio::DbfError> {
//! let mut table = DbfTable::open("inventory.dbf", OpenMode::ReadOnly)?;
//! while table.next() {
//!     let record = table.record()?;
//!     if !record.is_deleted() {
//!         println!("{:?}", record.value_by_name("NAME"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod codepage;
pub mod config;
pub mod error;
pub mod field;
pub mod file;
pub mod header;
pub mod record;
pub mod table;

pub use codepage::Codepage;
pub use config::TableVariant;
pub use error::{DbfError, DbfResult, TableError};
pub use field::{DbfField, FieldType};
pub use file::OpenMode;
pub use record::{DbfRecord, Value};
pub use table::DbfTable;
