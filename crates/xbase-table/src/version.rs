//! Table version byte interpretation.
//!
//! One version byte can stand for several products, so a version maps to
//! an ordered list of names rather than a single value.

use serde::{Deserialize, Serialize};

pub const DBASE_7: &str = "dBASE 7";
pub const VISUAL_FOXPRO: &str = "Visual FoxPro";

/// Version byte to candidate product names, sorted by version.
static VERSIONS: &[(u8, &[&str])] = &[
    (0x02, &["FoxBase"]),
    (0x03, &["dBASE III", "dBASE IV", "dBASE 5", "FoxPro", "FoxBASE+"]),
    (0x04, &[DBASE_7]),
    (0x30, &[VISUAL_FOXPRO]),
    (0x31, &[VISUAL_FOXPRO]),
    (0x32, &[VISUAL_FOXPRO]),
    (0x43, &["dBASE IV", "dBASE 5"]),
    (0x63, &["dBASE IV", "dBASE 5"]),
    (0x83, &["dBASE III", "FoxBASE+", "FoxPro"]),
    (0x8B, &["dBASE IV", "dBASE 5"]),
    (0x8C, &[DBASE_7]),
    (0xCB, &["dBASE IV", "dBASE 5"]),
    (0xE5, &["SMT"]),
    (0xEB, &["dBASE IV", "dBASE 5"]),
    (0xF5, &["FoxPro"]),
    (0xFB, &["FoxBASE"]),
];

static UNKNOWN: &[&str] = &["Unknown"];

/// Versions whose tables carry memo fields (outside Visual FoxPro).
static MEMO_VERSIONS: &[u8] = &[0x83, 0x8B, 0x8C, 0xCB, 0xE5, 0xEB, 0xF5, 0xFB];

/// Visual FoxPro table flags marking an attached memo file.
static VFP_MEMO_FLAGS: &[u8] = &[2, 3, 6, 7];

/// Returns the candidate product names for a version byte.
///
/// Never empty: unrecognized versions yield `["Unknown"]`.
pub fn names(version: u8) -> &'static [&'static str] {
    VERSIONS
        .binary_search_by_key(&version, |&(v, _)| v)
        .map(|i| VERSIONS[i].1)
        .unwrap_or(UNKNOWN)
}

/// Returns true if the version byte is listed.
pub fn is_known(version: u8) -> bool {
    VERSIONS.binary_search_by_key(&version, |&(v, _)| v).is_ok()
}

/// Layout family of a table, derived from its version names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableFamily {
    /// dBASE III/IV/5, FoxBASE, FoxPro 2.x, SMT.
    Classic,
    /// dBASE 7: 48-byte column descriptors.
    Dbase7,
    /// Visual FoxPro: flag byte per column and a 263-byte backlink.
    VisualFoxPro,
}

impl TableFamily {
    /// Classifies a version byte.
    pub fn of(version: u8) -> Self {
        let names = names(version);
        if names.contains(&DBASE_7) {
            TableFamily::Dbase7
        } else if names.contains(&VISUAL_FOXPRO) {
            TableFamily::VisualFoxPro
        } else {
            TableFamily::Classic
        }
    }

    /// Size of one column descriptor in bytes.
    pub fn descriptor_size(&self) -> usize {
        match self {
            TableFamily::Dbase7 => 48,
            _ => 32,
        }
    }

    /// Bytes between the 32-byte header and the first descriptor.
    pub fn descriptor_prefix(&self) -> usize {
        match self {
            TableFamily::Dbase7 => 36,
            _ => 0,
        }
    }

    /// Bytes after the terminator that belong to the header.
    pub fn trailer_size(&self) -> usize {
        match self {
            TableFamily::VisualFoxPro => 263,
            _ => 0,
        }
    }

    /// Number of columns implied by the header length.
    pub fn column_count(&self, header_length: u16) -> usize {
        let header_length = header_length as usize;
        match self {
            TableFamily::Dbase7 => header_length.saturating_sub(68) / 48,
            TableFamily::VisualFoxPro => header_length.saturating_sub(296) / 32,
            TableFamily::Classic => header_length.saturating_sub(33) / 32,
        }
    }
}

/// Returns true if the table has memo fields.
pub fn has_memo(version: u8, mdx_flag: u8) -> bool {
    match TableFamily::of(version) {
        TableFamily::VisualFoxPro => VFP_MEMO_FLAGS.contains(&mdx_flag),
        _ => MEMO_VERSIONS.contains(&version),
    }
}

/// Memo file flavour, selected by the table version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoFormat {
    /// dBASE `.dbt`.
    Dbt,
    /// FoxPro `.fpt`.
    Fpt,
    /// SMT `.smt`.
    Smt,
}

impl MemoFormat {
    /// Returns the memo format for a version, if it has one.
    pub fn of(version: u8) -> Option<Self> {
        match version {
            0x83 | 0x8B | 0x8C | 0xCB | 0xEB | 0xFB => Some(MemoFormat::Dbt),
            0xF5 | 0x30 | 0x31 | 0x32 => Some(MemoFormat::Fpt),
            0xE5 => Some(MemoFormat::Smt),
            _ => None,
        }
    }

    /// File extension, lowercase and without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            MemoFormat::Dbt => "dbt",
            MemoFormat::Fpt => "fpt",
            MemoFormat::Smt => "smt",
        }
    }
}
