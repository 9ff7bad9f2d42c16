//! Forward-only record cursor.

use crate::column::{ColumnDescriptor, ColumnType};
use crate::decode;
use crate::header::TableHeader;
use crate::transcode::{normalize_newlines, CodePageTranscoder, Transcoder};
use bytes::Bytes;
use log::{debug, trace, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use xbase_common::{ReaderConfig, Record, Result, Value, XbaseError};
use xbase_memo::MemoStore;

/// Deletion marker in the first byte of a row.
pub const DELETED_MARKER: u8 = 0x2A;

/// Precomputed position of one column within a row.
#[derive(Debug, Clone, Copy)]
struct ColumnSlot {
    /// Byte offset within the row.
    offset: usize,
    /// Slot width.
    length: usize,
    column_type: ColumnType,
    decimal_places: u8,
    /// Index of the column's field in the produced record.
    field: Option<usize>,
}

/// Reads table rows in order and decodes them into records.
///
/// The cursor owns the table file handle and the memo store. The memo
/// store is released once the last row has been read.
pub struct RecordCursor {
    /// Table file positioned at the next row.
    file: BufReader<File>,
    header: TableHeader,
    columns: Vec<ColumnDescriptor>,
    /// Per-column offsets, parallel to `columns`.
    layout: Vec<ColumnSlot>,
    /// Nullable column indices; position in this list is the null-flag bit.
    nullable: Vec<usize>,
    /// Number of fields in each record.
    field_count: usize,
    /// Open memo file, if the table has one.
    memo: Option<MemoStore>,
    /// Why the memo file could not be opened, reported on dereference.
    memo_error: Option<XbaseError>,
    transcoder: Box<dyn Transcoder>,
    blank_datetime_as_null: bool,
    /// Rows read so far.
    records_read: u32,
    /// Set once the end of the table has been signalled.
    exhausted: bool,
    /// Reusable row buffer.
    row: Vec<u8>,
}

impl RecordCursor {
    pub(crate) fn new(
        file: BufReader<File>,
        header: TableHeader,
        columns: Vec<ColumnDescriptor>,
        memo: Option<Result<MemoStore>>,
        config: &ReaderConfig,
    ) -> Self {
        let mut layout = Vec::with_capacity(columns.len());
        let mut nullable = Vec::new();
        let mut offset = 1;
        let mut field_count = 0;

        for (i, column) in columns.iter().enumerate() {
            let field = if column.column_type == ColumnType::NullFlags {
                None
            } else {
                field_count += 1;
                Some(field_count - 1)
            };
            layout.push(ColumnSlot {
                offset,
                length: column.length as usize,
                column_type: column.column_type,
                decimal_places: column.decimal_places,
                field,
            });
            if column.has_null_flag() {
                nullable.push(i);
            }
            offset += column.length as usize;
        }

        if offset != header.record_length as usize {
            warn!(
                "table {}: columns span {} bytes but rows are {} bytes",
                header.path.display(),
                offset,
                header.record_length
            );
        }

        let (memo, memo_error) = match memo {
            Some(Ok(store)) => (Some(store), None),
            Some(Err(e)) => (None, Some(e)),
            None => (None, None),
        };

        Self {
            file,
            row: vec![0u8; header.record_length as usize],
            header,
            columns,
            layout,
            nullable,
            field_count,
            memo,
            memo_error,
            transcoder: Box::new(CodePageTranscoder::new()),
            blank_datetime_as_null: config.blank_datetime_as_null,
            records_read: 0,
            exhausted: false,
        }
    }

    /// Replaces the text transcoder.
    pub fn with_transcoder(mut self, transcoder: Box<dyn Transcoder>) -> Self {
        self.transcoder = transcoder;
        self
    }

    /// Returns the table header.
    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    /// Returns the columns.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Returns the number of rows read so far.
    pub fn records_read(&self) -> u32 {
        self.records_read
    }

    /// Returns true once the end of the table has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns true while the memo file is held open.
    pub fn memo_open(&self) -> bool {
        self.memo.is_some()
    }

    /// Reads and decodes the next row.
    ///
    /// Returns `Ok(None)` at the end of the table, releasing the memo file.
    pub fn advance(&mut self) -> Result<Option<Record>> {
        if self.exhausted || self.records_read >= self.header.record_count {
            if !self.exhausted {
                debug!(
                    "table {}: read all {} records",
                    self.header.path.display(),
                    self.records_read
                );
            }
            self.exhausted = true;
            self.memo = None;
            return Ok(None);
        }

        // A row that fails to decode still counts as read
        let mut row = std::mem::take(&mut self.row);
        let result = match self.file.read_exact(&mut row) {
            Ok(()) => {
                self.records_read += 1;
                self.decode_row(&row)
            }
            Err(e) => {
                // The table is shorter than its header claims
                self.exhausted = true;
                self.memo = None;
                Err(e.into())
            }
        };
        self.row = row;

        let record = result?;
        trace!(
            "table {}: record {} deleted={}",
            self.header.table_name,
            self.records_read,
            record.is_deleted()
        );
        Ok(Some(record))
    }

    fn decode_row(&mut self, row: &[u8]) -> Result<Record> {
        let deleted = row.first() == Some(&DELETED_MARKER);
        let mut record = Record::with_capacity(deleted, self.field_count);

        for i in 0..self.layout.len() {
            let slot = self.layout[i];
            let start = slot.offset.min(row.len());
            let end = (slot.offset + slot.length).min(row.len());
            let raw = &row[start..end];

            if slot.column_type == ColumnType::NullFlags {
                self.apply_null_flags(&mut record, raw, i);
                continue;
            }

            let data = if slot.column_type.is_raw_slot() {
                raw
            } else {
                decode::trim(raw)
            };
            let value = self.decode_field(slot, data)?;
            record.push(self.columns[i].name.clone(), value);
        }

        Ok(record)
    }

    fn decode_field(&mut self, slot: ColumnSlot, data: &[u8]) -> Result<Value> {
        let value = match slot.column_type {
            ColumnType::Numeric | ColumnType::Float => decode::numeric(data, slot.decimal_places),
            ColumnType::Currency => decode::currency(data, slot.decimal_places),
            ColumnType::Integer => decode::integer(data),
            ColumnType::DateTime | ColumnType::Timestamp => {
                decode::datetime(data, self.blank_datetime_as_null)
            }
            ColumnType::Date => decode::date(data),
            ColumnType::Logical => {
                if data.is_empty() {
                    Value::Null
                } else {
                    decode::logical(&self.transcode(data)?)
                }
            }
            ColumnType::Character => Value::Text(self.transcode(data)?),
            ColumnType::Memo | ColumnType::Picture | ColumnType::General => {
                self.decode_memo(slot.column_type, data)?
            }
            ColumnType::Other(_) => Value::Binary(Bytes::copy_from_slice(data)),
            ColumnType::NullFlags => Value::Null,
        };
        Ok(value)
    }

    fn decode_memo(&mut self, column_type: ColumnType, slot: &[u8]) -> Result<Value> {
        let Some(block) = decode::memo_reference(slot, self.header.is_visual_foxpro()) else {
            return Ok(Value::Text(String::new()));
        };

        let Some(memo) = self.memo.as_mut() else {
            return Err(match &self.memo_error {
                Some(err) => err.duplicate(),
                None => XbaseError::MemoStoreMissing {
                    path: self.header.path.clone(),
                },
            });
        };
        let record = memo.resolve(block)?;

        if !record.signature.is_known() {
            warn!(
                "table {}: memo block {} has {} signature",
                self.header.table_name, block, record.signature
            );
            return Ok(Value::Null);
        }

        if column_type == ColumnType::Memo {
            Ok(Value::Text(self.transcode(&record.text)?))
        } else {
            Ok(Value::Binary(record.text))
        }
    }

    /// Nulls already-decoded nullable columns whose bit is set in `mask`.
    fn apply_null_flags(&self, record: &mut Record, mask: &[u8], flag_column: usize) {
        for (bit, &column) in self.nullable.iter().enumerate() {
            if column >= flag_column || !decode::null_bit(mask, bit) {
                continue;
            }
            if let Some(field) = self.layout[column].field {
                if let Some(value) = record.value_at_mut(field) {
                    *value = Value::Null;
                }
            }
        }
    }

    fn transcode(&self, bytes: &[u8]) -> Result<String> {
        self.transcoder
            .decode(self.header.code_page, &normalize_newlines(bytes))
    }
}

impl Iterator for RecordCursor {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

impl std::fmt::Debug for RecordCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordCursor")
            .field("table", &self.header.path)
            .field("records_read", &self.records_read)
            .field("record_count", &self.header.record_count)
            .field("memo", &self.memo)
            .finish()
    }
}
