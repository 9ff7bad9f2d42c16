//! Table file header.

use crate::codepage;
use crate::version::{self, MemoFormat, TableFamily};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Size of the fixed table header in bytes.
pub const HEADER_SIZE: usize = 32;

// Header field offsets

const OFF_VERSION: usize = 0;
const OFF_DATE: usize = 1;
const OFF_RECORD_COUNT: usize = 4;
const OFF_HEADER_LENGTH: usize = 8;
const OFF_RECORD_LENGTH: usize = 10;
const OFF_CHECK_0: usize = 12;
const OFF_TRANSACTION: usize = 14;
const OFF_ENCRYPTION: usize = 15;
const OFF_MDX_FLAG: usize = 28;
const OFF_LANGUAGE_DRIVER: usize = 29;
const OFF_CHECK_1: usize = 30;

/// Parsed table header.
///
/// Layout (32 bytes, little-endian):
/// - version: 1 byte @0
/// - last update YY MM DD: 3 bytes @1
/// - record count: 4 bytes @4
/// - header length: 2 bytes @8
/// - record length: 2 bytes @10
/// - reserved check word: 2 bytes @12 (must be zero)
/// - unfinished transaction: 1 byte @14
/// - encryption flag: 1 byte @15
/// - mdx / table flag: 1 byte @28
/// - language driver: 1 byte @29
/// - second check word: 2 bytes @30
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableHeader {
    /// Path of the table file.
    pub path: PathBuf,
    /// Lowercased file stem.
    pub table_name: String,
    /// Raw version byte.
    pub version: u8,
    /// Last update as (day, month, year).
    pub last_update: (u8, u8, u16),
    /// Number of rows, deleted ones included.
    pub record_count: u32,
    /// Offset of the first row.
    pub header_length: u16,
    /// Bytes per row, deletion marker included.
    pub record_length: u16,
    pub unfinished_transaction: u8,
    pub encryption_flag: u8,
    pub mdx_flag: u8,
    pub language_driver: u8,
    /// The two reserved check words at offsets 12 and 30.
    pub reserved_check: (u16, u16),
    /// Language driver name stored by dBASE 7.
    pub language_driver_name: Option<String>,
    /// Resolved code page.
    pub code_page: u32,
    /// Memo file on disk, when the table has memo fields and one was found.
    pub memo_file: Option<PathBuf>,
}

impl TableHeader {
    /// Parses the fixed 32-byte header.
    ///
    /// `code_page_fallback` replaces the default code page for tables that
    /// do not name a known language driver.
    pub fn parse(
        path: PathBuf,
        data: &[u8; HEADER_SIZE],
        code_page_fallback: Option<u32>,
    ) -> Self {
        let table_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let yy = data[OFF_DATE];
        let year = if yy > 70 { 1900 + yy as u16 } else { 2000 + yy as u16 };
        let language_driver = data[OFF_LANGUAGE_DRIVER];

        Self {
            path,
            table_name,
            version: data[OFF_VERSION],
            last_update: (data[OFF_DATE + 2], data[OFF_DATE + 1], year),
            record_count: read_u32(data, OFF_RECORD_COUNT),
            header_length: read_u16(data, OFF_HEADER_LENGTH),
            record_length: read_u16(data, OFF_RECORD_LENGTH),
            unfinished_transaction: data[OFF_TRANSACTION],
            encryption_flag: data[OFF_ENCRYPTION],
            mdx_flag: data[OFF_MDX_FLAG],
            language_driver,
            reserved_check: (read_u16(data, OFF_CHECK_0), read_u16(data, OFF_CHECK_1)),
            language_driver_name: None,
            code_page: codepage::resolve(language_driver, code_page_fallback),
            memo_file: None,
        }
    }

    /// Returns true if the reserved check word is zero.
    pub fn is_valid(&self) -> bool {
        self.reserved_check.0 == 0
    }

    /// Candidate product names for the version byte.
    pub fn version_names(&self) -> &'static [&'static str] {
        version::names(self.version)
    }

    /// Human-readable version, e.g. `"dBASE IV, dBASE 5 with memo-fields"`.
    pub fn version_name(&self) -> String {
        format!(
            "{} {} memo-fields",
            self.version_names().join(", "),
            if self.has_memo() { "with" } else { "without" }
        )
    }

    /// Layout family.
    pub fn family(&self) -> TableFamily {
        TableFamily::of(self.version)
    }

    pub fn is_dbase7(&self) -> bool {
        self.family() == TableFamily::Dbase7
    }

    pub fn is_visual_foxpro(&self) -> bool {
        self.family() == TableFamily::VisualFoxPro
    }

    /// Returns true if the table declares memo fields.
    pub fn has_memo(&self) -> bool {
        version::has_memo(self.version, self.mdx_flag)
    }

    /// Memo file flavour for this version, only when the table has memos.
    pub fn memo_format(&self) -> Option<MemoFormat> {
        if self.has_memo() {
            MemoFormat::of(self.version)
        } else {
            None
        }
    }

    /// Number of column descriptors implied by the header length.
    pub fn column_count(&self) -> usize {
        self.family().column_count(self.header_length)
    }

    /// Code page name, e.g. `cp866`.
    pub fn code_page_name(&self) -> String {
        codepage::name(self.code_page)
    }

    /// Last update as a calendar date, if the stored triple is valid.
    pub fn last_update_date(&self) -> Option<NaiveDate> {
        let (day, month, year) = self.last_update;
        NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
    }
}

fn read_u32(data: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]])
}

fn read_u16(data: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([data[off], data[off + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_header(version: u8, columns: usize) -> [u8; HEADER_SIZE] {
        let mut data = [0u8; HEADER_SIZE];
        data[0] = version;
        data[1] = 124;
        data[2] = 3;
        data[3] = 15;
        data[4..8].copy_from_slice(&1000u32.to_le_bytes());
        data[8..10].copy_from_slice(&((33 + 32 * columns) as u16).to_le_bytes());
        data[10..12].copy_from_slice(&42u16.to_le_bytes());
        data[29] = 201;
        data
    }

    #[test]
    fn test_parse_fields() {
        let path = PathBuf::from("/data/People.DBF");
        let header = TableHeader::parse(path, &raw_header(0x83, 4), None);
        assert_eq!(header.table_name, "people");
        assert_eq!(header.version, 0x83);
        assert_eq!(header.last_update, (15, 3, 2024));
        assert_eq!(header.record_count, 1000);
        assert_eq!(header.header_length, 161);
        assert_eq!(header.record_length, 42);
        assert_eq!(header.language_driver, 201);
        assert_eq!(header.code_page, 1251);
        assert_eq!(header.code_page_name(), "cp1251");
        assert_eq!(header.column_count(), 4);
        assert!(header.is_valid());
        assert!(header.has_memo());
        assert_eq!(header.memo_format(), Some(MemoFormat::Dbt));
    }

    #[test]
    fn test_year_pivot() {
        let mut data = raw_header(0x03, 1);
        data[1] = 71;
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &data, None);
        assert_eq!(header.last_update.2, 1971);

        data[1] = 70;
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &data, None);
        assert_eq!(header.last_update.2, 2070);

        data[1] = 5;
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &data, None);
        assert_eq!(header.last_update.2, 2005);
    }

    #[test]
    fn test_last_update_date() {
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &raw_header(0x03, 1), None);
        assert_eq!(header.last_update_date(), NaiveDate::from_ymd_opt(2024, 3, 15));

        let mut data = raw_header(0x03, 1);
        data[2] = 13;
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &data, None);
        assert!(header.last_update_date().is_none());
    }

    #[test]
    fn test_check_words() {
        let mut data = raw_header(0x03, 1);
        data[12..14].copy_from_slice(&7u16.to_le_bytes());
        data[30..32].copy_from_slice(&9u16.to_le_bytes());
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &data, None);
        assert_eq!(header.reserved_check, (7, 9));
        assert!(!header.is_valid());
    }

    #[test]
    fn test_version_name() {
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &raw_header(0x03, 1), None);
        assert_eq!(
            header.version_name(),
            "dBASE III, dBASE IV, dBASE 5, FoxPro, FoxBASE+ without memo-fields"
        );

        let header = TableHeader::parse(PathBuf::from("t.dbf"), &raw_header(0x8B, 1), None);
        assert_eq!(header.version_name(), "dBASE IV, dBASE 5 with memo-fields");
    }

    #[test]
    fn test_visual_foxpro_memo_flag() {
        let mut data = raw_header(0x30, 0);
        data[28] = 0x02;
        data[8..10].copy_from_slice(&(296u16 + 64).to_le_bytes());
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &data, None);
        assert!(header.is_visual_foxpro());
        assert!(header.has_memo());
        assert_eq!(header.memo_format(), Some(MemoFormat::Fpt));
        assert_eq!(header.column_count(), 2);

        data[28] = 0x01;
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &data, None);
        assert!(!header.has_memo());
        assert_eq!(header.memo_format(), None);
    }

    #[test]
    fn test_code_page_fallback() {
        let mut data = raw_header(0x03, 1);
        data[29] = 0;
        let header = TableHeader::parse(PathBuf::from("t.dbf"), &data, None);
        assert_eq!(header.code_page, 866);

        let header = TableHeader::parse(PathBuf::from("t.dbf"), &data, Some(1252));
        assert_eq!(header.code_page, 1252);
    }
}
