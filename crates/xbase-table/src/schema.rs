//! Table schema: header and column descriptors.

use crate::column::ColumnDescriptor;
use crate::cursor::RecordCursor;
use crate::header::{TableHeader, HEADER_SIZE};
use crate::locate;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use xbase_common::{ReaderConfig, Result, XbaseError};
use xbase_memo::MemoStore;

/// Byte that ends the column descriptor array.
pub const COLUMN_TERMINATOR: u8 = 0x0D;

/// An open table file.
///
/// The header and columns are parsed on first access and cached.
/// Structural problems are recorded on the schema: after a
/// [`XbaseError::MalformedHeader`] the header stays readable but columns
/// and records are refused; after [`XbaseError::MalformedColumns`] the
/// parsed columns remain available through [`TableSchema::columns_unchecked`].
pub struct TableSchema {
    /// Path to the table file.
    path: PathBuf,
    /// Reader options.
    config: ReaderConfig,
    /// Parsed code page override.
    code_page_fallback: Option<u32>,
    /// Table file, positioned after whatever has been parsed so far.
    file: BufReader<File>,
    /// Cached header.
    header: Option<TableHeader>,
    /// Cached columns.
    columns: Option<Vec<ColumnDescriptor>>,
    /// Recorded structural error.
    error: Option<XbaseError>,
}

impl TableSchema {
    /// Opens a table with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, ReaderConfig::default())
    }

    /// Opens a table.
    pub fn open_with(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self> {
        let path = path.as_ref();
        config.validate()?;
        let code_page_fallback = config.code_page_override()?;

        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => XbaseError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => XbaseError::Io(e),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            config,
            code_page_fallback,
            file: BufReader::new(file),
            header: None,
            columns: None,
            error: None,
        })
    }

    /// Returns the table path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the reader options.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Returns the recorded structural error, if any.
    pub fn error(&self) -> Option<&XbaseError> {
        self.error.as_ref()
    }

    /// Returns true if no structural error has been recorded.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the table header.
    ///
    /// Succeeds even when the header is malformed; check [`Self::error`].
    pub fn header(&mut self) -> Result<&TableHeader> {
        self.ensure_header()?;
        self.header
            .as_ref()
            .ok_or_else(|| XbaseError::Io(ErrorKind::UnexpectedEof.into()))
    }

    /// Returns the column list, or the recorded structural error.
    pub fn columns(&mut self) -> Result<&[ColumnDescriptor]> {
        self.ensure_columns()?;
        if let Some(err) = &self.error {
            return Err(err.duplicate());
        }
        Ok(self.columns.as_deref().unwrap_or(&[]))
    }

    /// Returns whatever columns were parsed, even after a structural error.
    pub fn columns_unchecked(&mut self) -> Result<Option<&[ColumnDescriptor]>> {
        self.ensure_columns()?;
        Ok(self.columns.as_deref())
    }

    /// Consumes the schema and returns a cursor over its rows.
    ///
    /// The cursor takes over the table file handle and opens the memo
    /// file, if the table has one. A memo file that cannot be opened does
    /// not fail this call; the error is returned for each row that
    /// dereferences a memo.
    pub fn records(mut self) -> Result<RecordCursor> {
        self.ensure_columns()?;
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        let (Some(header), Some(columns)) = (self.header.take(), self.columns.take()) else {
            return Err(XbaseError::Io(ErrorKind::UnexpectedEof.into()));
        };

        self.file.seek(SeekFrom::Start(header.header_length as u64))?;

        // An unreadable memo file only fails rows that reference it
        let memo = header.memo_file.as_deref().map(|path| {
            MemoStore::open(path).inspect_err(|e| {
                warn!("memo file {} cannot be opened: {}", path.display(), e);
            })
        });

        Ok(RecordCursor::new(
            self.file,
            header,
            columns,
            memo,
            &self.config,
        ))
    }

    fn ensure_header(&mut self) -> Result<()> {
        if self.header.is_some() {
            return Ok(());
        }

        let mut data = [0u8; HEADER_SIZE];
        self.file.read_exact(&mut data)?;
        let mut header = TableHeader::parse(self.path.clone(), &data, self.code_page_fallback);

        if !header.is_valid() {
            warn!(
                "table {} has a non-zero reserved check word {:#06x}",
                self.path.display(),
                header.reserved_check.0
            );
            self.error = Some(XbaseError::MalformedHeader {
                check_word: header.reserved_check.0,
            });
            self.header = Some(header);
            return Ok(());
        }

        let prefix = header.family().descriptor_prefix();
        if prefix > 0 {
            let mut block = vec![0u8; prefix];
            self.file.read_exact(&mut block)?;
            let name = &block[..32.min(prefix)];
            let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
            let name = String::from_utf8_lossy(&name[..end]).trim().to_string();
            header.language_driver_name = (!name.is_empty()).then_some(name);
        }

        if let Some(format) = header.memo_format() {
            header.memo_file = locate::memo_sibling(&self.path, format.extension());
            if header.memo_file.is_none() {
                warn!(
                    "table {} declares memo fields but no .{} file was found",
                    self.path.display(),
                    format.extension()
                );
            }
        }

        debug!(
            "opened table {}: version={:#04x} ({}), records={}, columns={}, code page={}",
            self.path.display(),
            header.version,
            header.version_name(),
            header.record_count,
            header.column_count(),
            header.code_page_name()
        );

        self.header = Some(header);
        Ok(())
    }

    fn ensure_columns(&mut self) -> Result<()> {
        self.ensure_header()?;
        if self.columns.is_some() || self.error.is_some() {
            return Ok(());
        }
        let Some(header) = &self.header else {
            return Ok(());
        };

        let family = header.family();
        let count = header.column_count();
        let size = family.descriptor_size();

        let mut columns = Vec::with_capacity(count);
        let mut data = vec![0u8; size];
        for _ in 0..count {
            self.file.read_exact(&mut data)?;
            columns.push(ColumnDescriptor::parse(family, &data));
        }

        let mut terminator = [0u8; 1];
        self.file.read_exact(&mut terminator)?;
        if terminator[0] != COLUMN_TERMINATOR {
            warn!(
                "table {}: column terminator is {:#04x}, expected {:#04x}",
                self.path.display(),
                terminator[0],
                COLUMN_TERMINATOR
            );
            self.error = Some(XbaseError::MalformedColumns {
                terminator: terminator[0],
            });
        }

        let trailer = family.trailer_size();
        if trailer > 0 {
            std::io::copy(
                &mut (&mut self.file).take(trailer as u64),
                &mut std::io::sink(),
            )?;
        }

        self.columns = Some(columns);
        Ok(())
    }
}

impl std::fmt::Debug for TableSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSchema")
            .field("path", &self.path)
            .field("header", &self.header)
            .field("columns", &self.columns)
            .field("error", &self.error)
            .finish()
    }
}
