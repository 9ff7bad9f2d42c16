//! Memo file reader for xBase tables.
//!
//! Memo files hold the overflow text referenced by `M`, `P` and `G`
//! columns. Three layouts are supported:
//! - dBASE III `.dbt` with terminator-delimited text
//! - dBASE IV `.dbt` with a per-block signature and length
//! - FoxPro `.fpt` and SMT `.smt` with big-endian headers

pub mod constants;
mod header;
mod record;
mod store;

pub use header::{MemoHeader, MemoVariant};
pub use record::{clean_block_text, decode_block_length, MemoRecord, MemoSignature};
pub use store::MemoStore;
