//! Column descriptors.

use crate::version::TableFamily;
use serde::{Deserialize, Serialize};

/// Column type, from the descriptor's type letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// `C`: fixed-width text.
    Character,
    /// `N`: numeric text.
    Numeric,
    /// `F`: float text.
    Float,
    /// `Y`: 8-byte currency.
    Currency,
    /// `I`: 4-byte signed integer.
    Integer,
    /// `D`: `YYYYMMDD` text.
    Date,
    /// `T`: Julian day + milliseconds.
    DateTime,
    /// `@`: same encoding as `T`.
    Timestamp,
    /// `L`: one-letter logical.
    Logical,
    /// `M`: text memo reference.
    Memo,
    /// `P`: picture memo reference.
    Picture,
    /// `G`: OLE memo reference.
    General,
    /// `0`: null-flag bitmask.
    NullFlags,
    /// Any other type letter.
    Other(u8),
}

impl ColumnType {
    /// Maps a descriptor type byte.
    pub fn from_code(code: u8) -> Self {
        match code {
            b'C' => ColumnType::Character,
            b'N' => ColumnType::Numeric,
            b'F' => ColumnType::Float,
            b'Y' => ColumnType::Currency,
            b'I' => ColumnType::Integer,
            b'D' => ColumnType::Date,
            b'T' => ColumnType::DateTime,
            b'@' => ColumnType::Timestamp,
            b'L' => ColumnType::Logical,
            b'M' => ColumnType::Memo,
            b'P' => ColumnType::Picture,
            b'G' => ColumnType::General,
            b'0' => ColumnType::NullFlags,
            other => ColumnType::Other(other),
        }
    }

    /// Returns the descriptor type byte.
    pub fn code(&self) -> u8 {
        match self {
            ColumnType::Character => b'C',
            ColumnType::Numeric => b'N',
            ColumnType::Float => b'F',
            ColumnType::Currency => b'Y',
            ColumnType::Integer => b'I',
            ColumnType::Date => b'D',
            ColumnType::DateTime => b'T',
            ColumnType::Timestamp => b'@',
            ColumnType::Logical => b'L',
            ColumnType::Memo => b'M',
            ColumnType::Picture => b'P',
            ColumnType::General => b'G',
            ColumnType::NullFlags => b'0',
            ColumnType::Other(code) => *code,
        }
    }

    /// Returns true for memo reference columns.
    pub fn is_memo(&self) -> bool {
        matches!(
            self,
            ColumnType::Memo | ColumnType::Picture | ColumnType::General
        )
    }

    /// Returns true if the slot holds binary data and must not be trimmed.
    pub fn is_raw_slot(&self) -> bool {
        self.is_memo()
            || matches!(
                self,
                ColumnType::NullFlags
                    | ColumnType::DateTime
                    | ColumnType::Timestamp
                    | ColumnType::Integer
                    | ColumnType::Currency
            )
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code() as char)
    }
}

/// Format-specific descriptor fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnExtras {
    /// dBASE III/IV and FoxPro 2.x carry nothing extra.
    None,
    /// dBASE 7 auto-increment counter.
    Dbase7 { auto_increment: u32 },
    /// Visual FoxPro field flags.
    VisualFoxPro(FoxProFlags),
}

/// Visual FoxPro field flags, decoded from the flag byte at offset 18.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoxProFlags {
    /// Raw flag byte.
    pub flag: u8,
    /// System column, hidden from users (flag `1`).
    pub system: bool,
    /// Column can store null (flags `2` and `6`).
    pub has_null: bool,
    /// Binary column, not transcoded by FoxPro (flags `4` and `6`).
    pub binary: bool,
    /// Auto-increment column (flag `12`).
    pub auto_increment: bool,
    /// Next auto-increment value.
    pub auto_increment_next: Option<u32>,
    /// Auto-increment step.
    pub auto_increment_step: Option<u8>,
}

impl FoxProFlags {
    fn parse(data: &[u8]) -> Self {
        let flag = data[18];
        let auto_increment = flag == 12;
        Self {
            flag,
            system: flag == 1,
            has_null: matches!(flag, 2 | 6),
            binary: matches!(flag, 4 | 6),
            auto_increment,
            auto_increment_next: auto_increment
                .then(|| u32::from_le_bytes([data[19], data[20], data[21], data[22]])),
            auto_increment_step: auto_increment.then(|| data[23]),
        }
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Lowercase, trimmed name.
    pub name: String,
    /// Column type.
    pub column_type: ColumnType,
    /// Width of the column's slot in each row.
    pub length: u16,
    /// Digits after the decimal point.
    pub decimal_places: u8,
    /// Production index flag.
    pub mdx_flag: u8,
    /// Format-specific fields.
    pub extras: ColumnExtras,
}

impl ColumnDescriptor {
    /// Parses one descriptor.
    ///
    /// Layout (32 bytes):
    /// - name: 11 bytes @0
    /// - type: 1 byte @11
    /// - length: 1 byte @16 (2 bytes for `C`)
    /// - decimals: 1 byte @17
    /// - Visual FoxPro flag @18, autoinc next u32 @19, step @23
    /// - mdx flag: 1 byte @31
    ///
    /// Layout (48 bytes, dBASE 7):
    /// - name: 32 bytes @0
    /// - type: 1 byte @32
    /// - length: 1 byte @33 (2 bytes for `C`)
    /// - decimals: 1 byte @34
    /// - mdx flag: 1 byte @37
    /// - autoinc: u32 @40
    ///
    /// `data` must be `family.descriptor_size()` bytes long.
    pub fn parse(family: TableFamily, data: &[u8]) -> Self {
        let (name_len, off_type, off_length, off_decimal, off_mdx) = match family {
            TableFamily::Dbase7 => (32, 32, 33, 34, 37),
            _ => (11, 11, 16, 17, 31),
        };

        let column_type = ColumnType::from_code(data[off_type]);
        let (length, decimal_places) = if column_type == ColumnType::Character {
            (
                u16::from_le_bytes([data[off_length], data[off_length + 1]]),
                0,
            )
        } else {
            (data[off_length] as u16, data[off_decimal])
        };

        let extras = match family {
            TableFamily::Dbase7 => ColumnExtras::Dbase7 {
                auto_increment: u32::from_le_bytes([data[40], data[41], data[42], data[43]]),
            },
            TableFamily::VisualFoxPro => ColumnExtras::VisualFoxPro(FoxProFlags::parse(data)),
            TableFamily::Classic => ColumnExtras::None,
        };

        Self {
            name: parse_name(&data[..name_len]),
            column_type,
            length,
            decimal_places,
            mdx_flag: data[off_mdx],
            extras,
        }
    }

    /// Returns the Visual FoxPro flags, if any.
    pub fn foxpro_flags(&self) -> Option<&FoxProFlags> {
        match &self.extras {
            ColumnExtras::VisualFoxPro(flags) => Some(flags),
            _ => None,
        }
    }

    /// Returns true if a null-flag column can mark this column null.
    pub fn has_null_flag(&self) -> bool {
        self.foxpro_flags().map(|f| f.has_null).unwrap_or(false)
    }

    /// Returns true for hidden system columns.
    pub fn is_system(&self) -> bool {
        self.foxpro_flags().map(|f| f.system).unwrap_or(false)
    }
}

/// Decodes a NUL-padded column name.
fn parse_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_lowercase()
}
