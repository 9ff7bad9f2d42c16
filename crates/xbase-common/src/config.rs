//! Reader configuration.

use crate::error::{Result, XbaseError};
use serde::{Deserialize, Serialize};

/// Encoding labels accepted as a decode target. Decoded text is held in
/// Rust strings, which are always UTF-8.
const UTF8_LABELS: &[&str] = &["utf-8", "utf8", "unicode-1-1-utf-8"];

/// Options controlling how a table and its memo file are decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Fallback code page used when the table's language driver byte is
    /// zero or unknown. Digits only, e.g. `"1251"`.
    pub code_page: Option<String>,
    /// Encoding of decoded text.
    pub target_encoding: String,
    /// Decode an all-zero datetime slot as null instead of a date in 4713 BC.
    pub blank_datetime_as_null: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            code_page: None,
            target_encoding: "utf-8".to_string(),
            blank_datetime_as_null: true,
        }
    }
}

impl ReaderConfig {
    /// Creates a config with a fallback code page override.
    pub fn with_code_page(code_page: impl Into<String>) -> Self {
        Self {
            code_page: Some(code_page.into()),
            ..Default::default()
        }
    }

    /// Returns the parsed code page override, if any.
    pub fn code_page_override(&self) -> Result<Option<u32>> {
        match &self.code_page {
            None => Ok(None),
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(XbaseError::UnsupportedCodePage(raw.clone()));
                }
                trimmed
                    .parse::<u32>()
                    .map(Some)
                    .map_err(|_| XbaseError::UnsupportedCodePage(raw.clone()))
            }
        }
    }

    /// Checks every option before a table is opened.
    pub fn validate(&self) -> Result<()> {
        self.code_page_override()?;

        let target = self.target_encoding.trim().to_ascii_lowercase();
        if !UTF8_LABELS.contains(&target.as_str()) {
            return Err(XbaseError::UnsupportedEncoding(
                self.target_encoding.clone(),
            ));
        }
        Ok(())
    }
}
