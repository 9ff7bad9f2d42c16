//! Field slot decoding.
//!
//! Each function takes the raw bytes of one column slot. Text-like slots
//! arrive already trimmed; binary slots arrive untouched.

use chrono::{Duration, NaiveDate};
use log::warn;
use xbase_common::Value;

/// Julian day number of 0001-01-01 minus one, the CE day-count origin.
const JULIAN_CE_OFFSET: i64 = 1_721_425;

/// Bytes stripped from both ends of text slots.
const TRIM_BYTES: &[u8] = b" \t\n\r\0\x0B";

/// Trims whitespace and NUL bytes from both ends.
pub fn trim(slot: &[u8]) -> &[u8] {
    let start = slot
        .iter()
        .position(|b| !TRIM_BYTES.contains(b))
        .unwrap_or(slot.len());
    let end = slot
        .iter()
        .rposition(|b| !TRIM_BYTES.contains(b))
        .map_or(start, |i| i + 1);
    &slot[start..end]
}

/// Decodes `N` and `F` text.
///
/// Integral columns keep the integer part of whatever number parses.
/// Unparsable text becomes null.
pub fn numeric(text: &[u8], decimal_places: u8) -> Value {
    let Ok(s) = std::str::from_utf8(text) else {
        warn!("numeric field is not ASCII: {:02x?}", text);
        return Value::Null;
    };
    if s.is_empty() {
        return Value::Null;
    }

    if decimal_places == 0 {
        if let Ok(v) = s.parse::<i64>() {
            return Value::Int(v);
        }
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if decimal_places > 0 {
                Value::Float(v)
            } else {
                Value::Int(v.trunc() as i64)
            }
        }
        _ => {
            warn!("unparsable numeric field {:?}", s);
            Value::Null
        }
    }
}

/// Decodes an 8-byte `Y` slot scaled by `10^decimal_places`.
pub fn currency(slot: &[u8], decimal_places: u8) -> Value {
    let Some(raw) = slot.get(..8) else {
        return Value::Null;
    };
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(raw);
    let scale = 10f64.powi(decimal_places as i32);
    let amount = u64::from_le_bytes(bytes) as f64 / scale;
    Value::Float((amount * scale).round() / scale)
}

/// Decodes a 4-byte signed `I` slot.
pub fn integer(slot: &[u8]) -> Value {
    match slot.get(..4) {
        Some(b) => Value::Int(i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64),
        None => Value::Null,
    }
}

/// Decodes a `D` slot.
pub fn date(text: &[u8]) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::Date(String::from_utf8_lossy(text).into_owned())
    }
}

/// Decodes a `T` or `@` slot into `YYYYMMDDHHMMSS`.
///
/// A 14-byte ASCII slot already holds the formatted value. Otherwise the
/// first 4 bytes are a Julian day number and the next 4 are milliseconds
/// since midnight.
pub fn datetime(slot: &[u8], blank_as_null: bool) -> Value {
    if slot.len() == 14 && slot.is_ascii() {
        return Value::DateTime(String::from_utf8_lossy(slot).into_owned());
    }
    let Some(b) = slot.get(..8) else {
        return Value::Null;
    };
    let julian_day = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
    let millis = u32::from_le_bytes([b[4], b[5], b[6], b[7]]);
    if blank_as_null && julian_day == 0 && millis == 0 {
        return Value::Null;
    }

    match julian_to_datetime(julian_day, millis) {
        Some(s) => Value::DateTime(s),
        None => {
            warn!("datetime out of range: day {}, ms {}", julian_day, millis);
            Value::Null
        }
    }
}

/// Formats a Julian day plus milliseconds as `YYYYMMDDHHMMSS`.
pub fn julian_to_datetime(julian_day: u32, millis: u32) -> Option<String> {
    let days = i32::try_from(julian_day as i64 - JULIAN_CE_OFFSET).ok()?;
    let date = NaiveDate::from_num_days_from_ce_opt(days)?;
    let dt = date.and_hms_opt(0, 0, 0)? + Duration::seconds((millis / 1000) as i64);
    Some(dt.format("%Y%m%d%H%M%S").to_string())
}

/// Decodes an `L` slot already converted to text.
///
/// `?` and blank are null; `t`, `y` and Cyrillic `д` in either case are true.
pub fn logical(text: &str) -> Value {
    if text.is_empty() || text == "?" {
        return Value::Null;
    }
    let lower = text.to_lowercase();
    Value::Bool(matches!(lower.as_str(), "t" | "y" | "д"))
}

/// Extracts the block index from a memo reference slot.
///
/// Visual FoxPro stores a 4-byte little-endian integer; every other
/// layout stores decimal text. Returns None for zero or unparsable slots.
pub fn memo_reference(slot: &[u8], binary: bool) -> Option<u32> {
    let block = if binary && slot.len() == 4 {
        u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]])
    } else {
        let text = trim(slot);
        if text.is_empty() {
            return None;
        }
        match std::str::from_utf8(text).ok().and_then(|s| s.parse::<u32>().ok()) {
            Some(v) => v,
            None => {
                warn!("unparsable memo reference {:02x?}", slot);
                return None;
            }
        }
    };
    (block != 0).then_some(block)
}

/// Returns true if bit `bit` is set in a little-endian null-flag mask.
pub fn null_bit(mask: &[u8], bit: usize) -> bool {
    mask.get(bit / 8)
        .map(|byte| byte & (1 << (bit % 8)) != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        assert_eq!(trim(b"  abc \0\0"), b"abc");
        assert_eq!(trim(b"    "), b"");
        assert_eq!(trim(b""), b"");
        assert_eq!(trim(b"a b"), b"a b");
    }

    #[test]
    fn test_numeric() {
        assert_eq!(numeric(b"42", 0), Value::Int(42));
        assert_eq!(numeric(b"-7", 0), Value::Int(-7));
        assert_eq!(numeric(b"3.25", 2), Value::Float(3.25));
        assert_eq!(numeric(b"3", 2), Value::Float(3.0));
        assert_eq!(numeric(b"1.9", 0), Value::Int(1));
        assert_eq!(numeric(b"", 0), Value::Null);
        assert_eq!(numeric(b"**", 0), Value::Null);
        assert_eq!(numeric(b"1,5", 1), Value::Null);
    }

    #[test]
    fn test_currency() {
        let slot = 123_456u64.to_le_bytes();
        assert_eq!(currency(&slot, 4), Value::Float(12.3456));
        assert_eq!(currency(&slot, 2), Value::Float(1234.56));
        assert_eq!(currency(&slot, 0), Value::Float(123456.0));
        assert_eq!(currency(&[1, 2], 4), Value::Null);
    }

    #[test]
    fn test_integer() {
        assert_eq!(integer(&(-5i32).to_le_bytes()), Value::Int(-5));
        assert_eq!(integer(&1_000_000i32.to_le_bytes()), Value::Int(1_000_000));
        assert_eq!(integer(&[0]), Value::Null);
    }

    #[test]
    fn test_date() {
        assert_eq!(date(b"20240315"), Value::Date("20240315".to_string()));
        assert_eq!(date(b""), Value::Null);
    }

    #[test]
    fn test_datetime_binary() {
        // 2440588 is 1970-01-01
        let mut slot = Vec::new();
        slot.extend_from_slice(&2_440_588u32.to_le_bytes());
        slot.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(datetime(&slot, true), Value::DateTime("19700101000000".to_string()));

        let mut slot = Vec::new();
        slot.extend_from_slice(&2_460_385u32.to_le_bytes());
        slot.extend_from_slice(&(45_296_999u32).to_le_bytes());
        assert_eq!(datetime(&slot, true), Value::DateTime("20240315123456".to_string()));
    }

    #[test]
    fn test_datetime_passthrough() {
        assert_eq!(
            datetime(b"20231231235959", true),
            Value::DateTime("20231231235959".to_string())
        );
    }

    #[test]
    fn test_datetime_blank() {
        assert_eq!(datetime(&[0u8; 8], true), Value::Null);
        assert_eq!(datetime(&[0u8; 3], true), Value::Null);
        assert_eq!(datetime(&[0x20; 8], true), Value::Null);
    }

    #[test]
    fn test_julian_epoch() {
        assert_eq!(julian_to_datetime(1_721_426, 0).as_deref(), Some("00010101000000"));
        assert_eq!(julian_to_datetime(2_451_545, 1_000).as_deref(), Some("20000101000001"));
    }

    #[test]
    fn test_logical() {
        assert_eq!(logical("T"), Value::Bool(true));
        assert_eq!(logical("y"), Value::Bool(true));
        assert_eq!(logical("Д"), Value::Bool(true));
        assert_eq!(logical("N"), Value::Bool(false));
        assert_eq!(logical("F"), Value::Bool(false));
        assert_eq!(logical("?"), Value::Null);
        assert_eq!(logical(""), Value::Null);
    }

    #[test]
    fn test_memo_reference() {
        assert_eq!(memo_reference(b"        12", false), Some(12));
        assert_eq!(memo_reference(b"         0", false), None);
        assert_eq!(memo_reference(b"          ", false), None);
        assert_eq!(memo_reference(b"abc", false), None);
        assert_eq!(memo_reference(&9u32.to_le_bytes(), true), Some(9));
        assert_eq!(memo_reference(&0u32.to_le_bytes(), true), None);
        // Ten-byte slots stay textual even in binary layouts
        assert_eq!(memo_reference(b"         3", true), Some(3));
    }

    #[test]
    fn test_null_bit() {
        assert!(!null_bit(&[0b10], 0));
        assert!(null_bit(&[0b10], 1));
        assert!(null_bit(&[0, 0b1], 8));
        assert!(!null_bit(&[0xFF], 8));
    }
}
