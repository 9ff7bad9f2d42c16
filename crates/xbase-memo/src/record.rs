//! Memo block contents.

use crate::constants::{BLOCK_TEXT_END, DBASE_IV_SIGNATURE, SOFT_LINE_BREAK};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Kind of data stored in a memo block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoSignature {
    /// Template or picture data (code 0).
    TemplatePicture,
    /// Text (code 1).
    Text,
    /// OLE object (code 2).
    Object,
    /// dBASE IV block marker.
    DbaseIv,
    /// Any other code. Readers treat the payload as unusable.
    Unknown(u32),
}

impl MemoSignature {
    /// Maps a signature code from a dBASE IV block header.
    pub fn from_block_code(code: u32) -> Self {
        if code == DBASE_IV_SIGNATURE {
            MemoSignature::DbaseIv
        } else {
            Self::from_generic_code(code)
        }
    }

    /// Maps a signature code from a FoxPro/SMT block header.
    pub fn from_generic_code(code: u32) -> Self {
        match code {
            0 => MemoSignature::TemplatePicture,
            1 => MemoSignature::Text,
            2 => MemoSignature::Object,
            other => MemoSignature::Unknown(other),
        }
    }

    /// Returns true for recognized signature codes.
    pub fn is_known(&self) -> bool {
        !matches!(self, MemoSignature::Unknown(_))
    }
}

impl std::fmt::Display for MemoSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoSignature::TemplatePicture => write!(f, "template|picture"),
            MemoSignature::Text => write!(f, "text"),
            MemoSignature::Object => write!(f, "object"),
            MemoSignature::DbaseIv => write!(f, "dbaseIV"),
            MemoSignature::Unknown(code) => write!(f, "unknown({:#010x})", code),
        }
    }
}

/// A resolved memo block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoRecord {
    /// Kind of data in the block.
    pub signature: MemoSignature,
    /// Raw payload bytes, not transcoded.
    pub text: Bytes,
}

impl MemoRecord {
    /// Creates a new memo record.
    pub fn new(signature: MemoSignature, text: impl Into<Bytes>) -> Self {
        Self {
            signature,
            text: text.into(),
        }
    }
}

/// Decodes the length field of a dBASE IV block sub-header.
///
/// The four bytes lose their trailing zero bytes, are spelled out as a
/// hexadecimal digit string, and that string is read as an octal number.
/// Returns None if the string is empty or has a non-octal digit.
pub fn decode_block_length(raw: [u8; 4]) -> Option<u32> {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    if end == 0 {
        return None;
    }
    let hex: String = raw[..end].iter().map(|b| format!("{:02x}", b)).collect();
    u32::from_str_radix(&hex, 8).ok()
}

/// Cuts block text at the first CR LF and rewrites soft line breaks.
pub fn clean_block_text(data: &[u8]) -> Vec<u8> {
    let end = find(data, &BLOCK_TEXT_END).unwrap_or(data.len());
    let data = &data[..end];

    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i..].starts_with(&SOFT_LINE_BREAK) {
            out.push(b'\n');
            i += SOFT_LINE_BREAK.len();
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    out
}

/// Returns the position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
