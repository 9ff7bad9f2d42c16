//! Error types for the xBase reader.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using XbaseError.
pub type Result<T> = std::result::Result<T, XbaseError>;

/// Errors that can occur while reading xBase tables and memo files.
#[derive(Debug, Error)]
pub enum XbaseError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    // Table structure errors
    #[error("Malformed table header: reserved check word is {check_word:#06x}")]
    MalformedHeader { check_word: u16 },

    #[error("Malformed column descriptors: terminator byte is {terminator:#04x}")]
    MalformedColumns { terminator: u8 },

    // Memo errors
    #[error("Truncated memo at block {block}: {reason}")]
    TruncatedMemo { block: u32, reason: String },

    #[error("Memo file missing for table {}", path.display())]
    MemoStoreMissing { path: PathBuf },

    // Text errors
    #[error("Unsupported code page: {0}")]
    UnsupportedCodePage(String),

    #[error("Unsupported target encoding: {0}")]
    UnsupportedEncoding(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl XbaseError {
    /// Returns true for structural errors that are recorded on a schema
    /// rather than aborting construction.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            XbaseError::MalformedHeader { .. } | XbaseError::MalformedColumns { .. }
        )
    }

    /// Duplicates a recorded structural error so it can be handed out
    /// repeatedly. I/O errors are not cloneable and collapse to their
    /// message.
    pub fn duplicate(&self) -> Self {
        match self {
            XbaseError::Io(e) => XbaseError::Io(std::io::Error::new(e.kind(), e.to_string())),
            XbaseError::FileNotFound { path } => XbaseError::FileNotFound { path: path.clone() },
            XbaseError::MalformedHeader { check_word } => XbaseError::MalformedHeader {
                check_word: *check_word,
            },
            XbaseError::MalformedColumns { terminator } => XbaseError::MalformedColumns {
                terminator: *terminator,
            },
            XbaseError::TruncatedMemo { block, reason } => XbaseError::TruncatedMemo {
                block: *block,
                reason: reason.clone(),
            },
            XbaseError::MemoStoreMissing { path } => {
                XbaseError::MemoStoreMissing { path: path.clone() }
            }
            XbaseError::UnsupportedCodePage(s) => XbaseError::UnsupportedCodePage(s.clone()),
            XbaseError::UnsupportedEncoding(s) => XbaseError::UnsupportedEncoding(s.clone()),
            XbaseError::ConfigError(s) => XbaseError::ConfigError(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(ErrorKind::UnexpectedEof, "short read");
        let err: XbaseError = io_err.into();
        assert!(matches!(err, XbaseError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_file_not_found_display() {
        let err = XbaseError::FileNotFound {
            path: PathBuf::from("/data/people.dbf"),
        };
        assert_eq!(err.to_string(), "File not found: /data/people.dbf");
    }

    #[test]
    fn test_structural_errors_display() {
        let err = XbaseError::MalformedHeader { check_word: 0x1234 };
        assert_eq!(
            err.to_string(),
            "Malformed table header: reserved check word is 0x1234"
        );

        let err = XbaseError::MalformedColumns { terminator: 0x20 };
        assert_eq!(
            err.to_string(),
            "Malformed column descriptors: terminator byte is 0x20"
        );
    }

    #[test]
    fn test_memo_errors_display() {
        let err = XbaseError::TruncatedMemo {
            block: 7,
            reason: "end of file".to_string(),
        };
        assert_eq!(err.to_string(), "Truncated memo at block 7: end of file");

        let err = XbaseError::MemoStoreMissing {
            path: PathBuf::from("notes.dbf"),
        };
        assert_eq!(err.to_string(), "Memo file missing for table notes.dbf");
    }

    #[test]
    fn test_text_errors_display() {
        let err = XbaseError::UnsupportedCodePage("koi8".to_string());
        assert_eq!(err.to_string(), "Unsupported code page: koi8");

        let err = XbaseError::UnsupportedEncoding("latin1".to_string());
        assert_eq!(err.to_string(), "Unsupported target encoding: latin1");
    }

    #[test]
    fn test_is_structural() {
        assert!(XbaseError::MalformedHeader { check_word: 1 }.is_structural());
        assert!(XbaseError::MalformedColumns { terminator: 0 }.is_structural());
        assert!(!XbaseError::ConfigError("x".to_string()).is_structural());
    }

    #[test]
    fn test_duplicate_preserves_variant() {
        let err = XbaseError::MalformedColumns { terminator: 0x41 };
        let copy = err.duplicate();
        assert!(matches!(copy, XbaseError::MalformedColumns { terminator: 0x41 }));

        let err = XbaseError::Io(IoError::new(ErrorKind::NotFound, "gone"));
        let copy = err.duplicate();
        match copy {
            XbaseError::Io(e) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<u32> {
            Ok(3)
        }

        fn returns_err() -> Result<u32> {
            Err(XbaseError::ConfigError("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<XbaseError>();
    }
}
