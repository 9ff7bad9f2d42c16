//! Memo file layout constants.

// File header constants

/// Number of bytes read from the start of a memo file as its header.
pub const HEADER_BUFFER_SIZE: usize = 512;

/// Extension of dBASE III and dBASE IV memo files.
pub const CLASSIC_EXTENSION: &str = "dbt";

/// Block size of legacy dBASE III memo files.
pub const LEGACY_BLOCK_SIZE: u16 = 512;

// Header field offsets

/// Offset of the next-free-block pointer (all variants).
pub const OFF_FREEBLOCK: usize = 0;

/// Offset of the big-endian block size in FoxPro/SMT memo files.
pub const OFF_GENERIC_BLOCK_SIZE: usize = 6;

/// Offset of the embedded source table name in dBASE IV memo files.
pub const OFF_SOURCE_NAME: usize = 8;

/// Length of the embedded source table name.
pub const SOURCE_NAME_LEN: usize = 8;

/// Offset of the little-endian block size in dBASE IV memo files.
pub const OFF_BLOCK_BLOCK_SIZE: usize = 20;

// Block constants

/// Size of the per-block sub-header (signature + length).
pub const BLOCK_HEADER_SIZE: usize = 8;

/// Chunk size used when scanning legacy blocks for the terminator.
pub const LEGACY_CHUNK_SIZE: usize = 512;

/// Two-byte end-of-memo marker in legacy files.
pub const LEGACY_TERMINATOR: [u8; 2] = [0x1A, 0x1A];

/// Line break that ends the text of a dBASE IV block.
pub const BLOCK_TEXT_END: [u8; 2] = [0x0D, 0x0A];

/// Soft line break written by old editors, rewritten to a newline.
pub const SOFT_LINE_BREAK: [u8; 2] = [0x8D, 0x0A];

/// Signature value written by dBASE IV in front of memo blocks.
pub const DBASE_IV_SIGNATURE: u32 = 0xFFFF_0500;
