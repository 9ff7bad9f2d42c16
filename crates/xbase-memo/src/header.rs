//! Memo file header and variant detection.

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use xbase_common::{Result, XbaseError};

/// On-disk memo layout, chosen once when the file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoVariant {
    /// dBASE III `.dbt`: 512-byte blocks, text ends at `0x1A 0x1A`.
    Legacy,
    /// dBASE IV `.dbt`: little-endian header, 8-byte block sub-header.
    Block,
    /// FoxPro `.fpt` and SMT `.smt`: big-endian header and sub-header.
    Generic,
}

impl std::fmt::Display for MemoVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MemoVariant::Legacy => "dBASE III",
            MemoVariant::Block => "dBASE IV",
            MemoVariant::Generic => "FoxPro",
        };
        write!(f, "{}", name)
    }
}

/// Parsed memo file header.
///
/// Layout by variant:
/// - Legacy: freeblock u32 LE @0, block size fixed at 512
/// - Block: freeblock u32 LE @0, source name @8 (8 bytes), block size u16 LE @20
/// - Generic: freeblock u32 BE @0, block size u16 BE @6
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoHeader {
    /// Detected layout.
    pub variant: MemoVariant,
    /// Index of the next free block.
    pub freeblock_pointer: u32,
    /// Block size in bytes.
    pub block_size: u16,
    /// Table name embedded by dBASE IV, if any.
    pub source_name: Option<String>,
}

impl MemoHeader {
    /// Returns true if the path carries the classic `.dbt` extension.
    pub fn is_classic_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(CLASSIC_EXTENSION))
            .unwrap_or(false)
    }

    /// Parses the header buffer of a memo file.
    ///
    /// `classic` selects between the `.dbt` variants and the generic one.
    /// `data` may be shorter than 512 bytes for small files.
    pub fn parse(classic: bool, data: &[u8]) -> Result<Self> {
        if !classic {
            require(data, OFF_GENERIC_BLOCK_SIZE + 2)?;
            return Ok(Self {
                variant: MemoVariant::Generic,
                freeblock_pointer: read_u32_be(data, OFF_FREEBLOCK),
                block_size: read_u16_be(data, OFF_GENERIC_BLOCK_SIZE),
                source_name: None,
            });
        }

        require(data, OFF_FREEBLOCK + 4)?;
        let freeblock_pointer = read_u32_le(data, OFF_FREEBLOCK);
        let source_name = source_name(data);

        match source_name {
            None => Ok(Self {
                variant: MemoVariant::Legacy,
                freeblock_pointer,
                block_size: LEGACY_BLOCK_SIZE,
                source_name: None,
            }),
            Some(name) => {
                require(data, OFF_BLOCK_BLOCK_SIZE + 2)?;
                Ok(Self {
                    variant: MemoVariant::Block,
                    freeblock_pointer,
                    block_size: read_u16_le(data, OFF_BLOCK_BLOCK_SIZE),
                    source_name: Some(name),
                })
            }
        }
    }

    /// Byte offset of a block within the file.
    pub fn block_offset(&self, block: u32) -> u64 {
        block as u64 * self.block_size as u64
    }
}

/// Extracts the trimmed source table name, or None when blank.
fn source_name(data: &[u8]) -> Option<String> {
    let end = (OFF_SOURCE_NAME + SOURCE_NAME_LEN).min(data.len());
    if end <= OFF_SOURCE_NAME {
        return None;
    }
    let raw = &data[OFF_SOURCE_NAME..end];
    let trimmed = raw
        .iter()
        .position(|&b| b == 0)
        .map_or(raw, |nul| &raw[..nul]);
    let name = String::from_utf8_lossy(trimmed).trim().to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn require(data: &[u8], len: usize) -> Result<()> {
    if data.len() < len {
        return Err(XbaseError::TruncatedMemo {
            block: 0,
            reason: format!("header is {} bytes, need {}", data.len(), len),
        });
    }
    Ok(())
}

fn read_u32_le(data: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]])
}

fn read_u32_be(data: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]])
}

fn read_u16_le(data: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([data[off], data[off + 1]])
}

fn read_u16_be(data: &[u8], off: usize) -> u16 {
    u16::from_be_bytes([data[off], data[off + 1]])
}
