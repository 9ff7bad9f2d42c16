//! Memo file access.

use crate::constants::*;
use crate::header::{MemoHeader, MemoVariant};
use crate::record::{clean_block_text, decode_block_length, find, MemoRecord, MemoSignature};
use log::{debug, warn};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use xbase_common::{Result, XbaseError};

/// An open memo file.
///
/// The store owns its file handle exclusively. Blocks are read on demand
/// through [`MemoStore::resolve`].
pub struct MemoStore {
    /// Path to the memo file.
    path: PathBuf,
    /// Parsed file header.
    header: MemoHeader,
    /// File handle for reading.
    file: File,
}

impl MemoStore {
    /// Opens a memo file and detects its layout.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => XbaseError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => XbaseError::Io(e),
        })?;

        let mut buf = vec![0u8; HEADER_BUFFER_SIZE];
        let n = read_up_to(&mut file, &mut buf)?;
        buf.truncate(n);

        let header = MemoHeader::parse(MemoHeader::is_classic_extension(path), &buf)?;
        if header.block_size == 0 {
            warn!("memo file {} declares a zero block size", path.display());
        }
        debug!(
            "opened memo file {}: variant={}, block_size={}, freeblock={}",
            path.display(),
            header.variant,
            header.block_size,
            header.freeblock_pointer
        );

        Ok(Self {
            path: path.to_path_buf(),
            header,
            file,
        })
    }

    /// Returns the memo file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parsed header.
    pub fn header(&self) -> &MemoHeader {
        &self.header
    }

    /// Returns the detected layout.
    pub fn variant(&self) -> MemoVariant {
        self.header.variant
    }

    /// Reads the memo stored at `block`.
    pub fn resolve(&mut self, block: u32) -> Result<MemoRecord> {
        let offset = self.header.block_offset(block);
        self.file.seek(SeekFrom::Start(offset))?;

        match self.header.variant {
            MemoVariant::Legacy => self.read_legacy(block),
            MemoVariant::Block => self.read_block(block),
            MemoVariant::Generic => self.read_generic(block),
        }
    }

    /// Reads 512-byte chunks until the `0x1A 0x1A` terminator appears.
    fn read_legacy(&mut self, block: u32) -> Result<MemoRecord> {
        let mut text = Vec::with_capacity(LEGACY_CHUNK_SIZE);
        let mut chunk = [0u8; LEGACY_CHUNK_SIZE];

        loop {
            let n = read_up_to(&mut self.file, &mut chunk)?;
            if n == 0 {
                let reason = if text.is_empty() {
                    "block is past end of file"
                } else {
                    "end of file before terminator"
                };
                return Err(truncated(block, reason));
            }

            // The terminator may straddle the previous chunk boundary
            let scan_from = text.len().saturating_sub(LEGACY_TERMINATOR.len() - 1);
            text.extend_from_slice(&chunk[..n]);

            if let Some(pos) = find(&text[scan_from..], &LEGACY_TERMINATOR) {
                text.truncate(scan_from + pos);
                return Ok(MemoRecord::new(MemoSignature::Text, text));
            }
        }
    }

    /// Reads a dBASE IV block with its signature and encoded length.
    fn read_block(&mut self, block: u32) -> Result<MemoRecord> {
        let sub = self.read_sub_header(block)?;
        let code = u32::from_be_bytes([sub[0], sub[1], sub[2], sub[3]]);
        let signature = MemoSignature::from_block_code(code);
        let raw_len = [sub[4], sub[5], sub[6], sub[7]];
        let length = decode_block_length(raw_len).ok_or_else(|| {
            truncated(block, &format!("unparsable length field {:02x?}", raw_len))
        })?;

        let data = self.read_exact_len(block, length as usize)?;
        Ok(MemoRecord::new(signature, clean_block_text(&data)))
    }

    /// Reads a FoxPro/SMT block: big-endian signature and length.
    fn read_generic(&mut self, block: u32) -> Result<MemoRecord> {
        let sub = self.read_sub_header(block)?;
        let code = u32::from_be_bytes([sub[0], sub[1], sub[2], sub[3]]);
        let signature = MemoSignature::from_generic_code(code);
        let length = u32::from_be_bytes([sub[4], sub[5], sub[6], sub[7]]);

        let data = self.read_exact_len(block, length as usize)?;
        Ok(MemoRecord::new(signature, data))
    }

    fn read_sub_header(&mut self, block: u32) -> Result<[u8; BLOCK_HEADER_SIZE]> {
        let mut sub = [0u8; BLOCK_HEADER_SIZE];
        let n = read_up_to(&mut self.file, &mut sub)?;
        if n < BLOCK_HEADER_SIZE {
            let reason = format!("block header is {} of {} bytes", n, BLOCK_HEADER_SIZE);
            return Err(truncated(block, &reason));
        }
        Ok(sub)
    }

    fn read_exact_len(&mut self, block: u32, length: usize) -> Result<Vec<u8>> {
        let remaining = self
            .file
            .metadata()?
            .len()
            .saturating_sub(self.file.stream_position()?);
        if length as u64 > remaining {
            let reason = format!("length {} exceeds the {} bytes left", length, remaining);
            return Err(truncated(block, &reason));
        }

        let mut data = vec![0u8; length];
        let n = read_up_to(&mut self.file, &mut data)?;
        if n < length {
            return Err(truncated(block, &format!("read {} of {} bytes", n, length)));
        }
        Ok(data)
    }
}

impl std::fmt::Debug for MemoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoStore")
            .field("path", &self.path)
            .field("header", &self.header)
            .finish()
    }
}

fn truncated(block: u32, reason: &str) -> XbaseError {
    XbaseError::TruncatedMemo {
        block,
        reason: reason.to_string(),
    }
}

/// Fills `buf` from `reader` until it is full or the reader hits EOF.
/// Returns the number of bytes read.
pub(crate) fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
