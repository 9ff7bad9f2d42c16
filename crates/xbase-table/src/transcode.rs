//! Text transcoding from table code pages.

use encoding_rs::Encoding;
use log::warn;
use oem_cp::code_table::DECODING_TABLE_CP_MAP;
use std::sync::atomic::{AtomicBool, Ordering};
use xbase_common::Result;

/// Converts bytes in a table code page to text.
pub trait Transcoder: Send {
    /// Decodes `bytes` encoded in `code_page`.
    fn decode(&self, code_page: u32, bytes: &[u8]) -> Result<String>;
}

/// Default transcoder.
///
/// Windows, Mac and CJK code pages (and cp866) decode through
/// `encoding_rs`; the remaining DOS OEM pages decode through `oem_cp`.
/// Anything else decodes as windows-1252, which keeps ASCII intact.
#[derive(Debug, Default)]
pub struct CodePageTranscoder {
    warned: AtomicBool,
}

impl CodePageTranscoder {
    /// Creates a new transcoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the encoding for a code page, if `encoding_rs` has one.
    pub fn encoding_for(code_page: u32) -> Option<&'static Encoding> {
        let encoding = match code_page {
            866 => encoding_rs::IBM866,
            874 => encoding_rs::WINDOWS_874,
            932 => encoding_rs::SHIFT_JIS,
            936 => encoding_rs::GBK,
            949 => encoding_rs::EUC_KR,
            950 => encoding_rs::BIG5,
            1250 => encoding_rs::WINDOWS_1250,
            1251 => encoding_rs::WINDOWS_1251,
            1252 => encoding_rs::WINDOWS_1252,
            1253 => encoding_rs::WINDOWS_1253,
            1254 => encoding_rs::WINDOWS_1254,
            1255 => encoding_rs::WINDOWS_1255,
            1256 => encoding_rs::WINDOWS_1256,
            1257 => encoding_rs::WINDOWS_1257,
            1258 => encoding_rs::WINDOWS_1258,
            10000 => encoding_rs::MACINTOSH,
            10007 => encoding_rs::X_MAC_CYRILLIC,
            20866 => encoding_rs::KOI8_R,
            65001 => encoding_rs::UTF_8,
            _ => return None,
        };
        Some(encoding)
    }

    /// Returns true if `oem_cp` has a decoding table for the code page.
    pub fn has_oem_table(code_page: u32) -> bool {
        u16::try_from(code_page)
            .map(|cp| DECODING_TABLE_CP_MAP.get(&cp).is_some())
            .unwrap_or(false)
    }

    /// Decodes through an `oem_cp` table. Undefined bytes become U+FFFD.
    fn decode_oem(code_page: u32, bytes: &[u8]) -> Option<String> {
        let cp = u16::try_from(code_page).ok()?;
        DECODING_TABLE_CP_MAP
            .get(&cp)
            .map(|table| table.decode_string_lossy(bytes))
    }
}

impl Transcoder for CodePageTranscoder {
    fn decode(&self, code_page: u32, bytes: &[u8]) -> Result<String> {
        if let Some(encoding) = Self::encoding_for(code_page) {
            let (text, _) = encoding.decode_without_bom_handling(bytes);
            return Ok(text.into_owned());
        }
        if let Some(text) = Self::decode_oem(code_page, bytes) {
            return Ok(text);
        }

        if !self.warned.swap(true, Ordering::Relaxed) {
            warn!("code page {} is not supported, decoding as windows-1252", code_page);
        }
        let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
        Ok(text.into_owned())
    }
}

/// Replaces every `\r\n` with `\n`.
pub fn normalize_newlines(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
            out.push(b'\n');
            i += 2;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}
