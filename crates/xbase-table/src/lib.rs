//! Read-only decoder for xBase tables.
//!
//! Supports dBASE III/IV/5/7, FoxBASE, FoxPro, Visual FoxPro and SMT
//! tables together with their memo files.
//!
//! ```no_run
//! use xbase_table::TableSchema;
//!
//! # fn main() -> xbase_table::Result<()> {
//! let mut schema = TableSchema::open("people.dbf")?;
//! println!("{}", schema.header()?.version_name());
//! for record in schema.records()? {
//!     let record = record?;
//!     println!("{:?}", record.get("name"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod codepage;
mod column;
mod cursor;
pub mod decode;
mod header;
pub mod locate;
mod schema;
mod transcode;
pub mod version;

pub use column::{ColumnDescriptor, ColumnExtras, ColumnType, FoxProFlags};
pub use cursor::{RecordCursor, DELETED_MARKER};
pub use header::{TableHeader, HEADER_SIZE};
pub use schema::{TableSchema, COLUMN_TERMINATOR};
pub use transcode::{normalize_newlines, CodePageTranscoder, Transcoder};
pub use version::{MemoFormat, TableFamily};

pub use xbase_common::{ReaderConfig, Record, Result, Value, XbaseError};
pub use xbase_memo::{MemoHeader, MemoRecord, MemoSignature, MemoStore, MemoVariant};
