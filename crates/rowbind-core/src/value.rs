//! Dynamic SQL values.

use crate::error::{Error, TypeError};
use crate::types::ValueKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// A dynamically-typed SQL value.
///
/// This enum represents all values read from a cursor or bound into a
/// statement descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,

    /// Boolean value
    Bool(bool),

    /// 8-bit signed integer
    TinyInt(i8),

    /// 16-bit signed integer
    SmallInt(i16),

    /// 32-bit signed integer
    Int(i32),

    /// 64-bit signed integer
    BigInt(i64),

    /// 32-bit floating point
    Float(f32),

    /// 64-bit floating point
    Double(f64),

    /// Arbitrary precision decimal (stored as string)
    Decimal(String),

    /// Text string
    Text(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// Date (days since epoch)
    Date(i32),

    /// Time (microseconds since midnight)
    Time(i64),

    /// Timestamp (microseconds since epoch)
    Timestamp(i64),

    /// UUID (as 16 bytes)
    Uuid([u8; 16]),

    /// JSON value
    Json(serde_json::Value),
}

impl Value {
    /// Check if this value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::TinyInt(_) => "TINYINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Int(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::Float(_) => "REAL",
            Value::Double(_) => "DOUBLE",
            Value::Decimal(_) => "DECIMAL",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BLOB",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::Uuid(_) => "UUID",
            Value::Json(_) => "JSON",
        }
    }

    /// Runtime kind of this value (`None` for NULL).
    pub const fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => ValueKind::Bool,
            Value::TinyInt(_) => ValueKind::I8,
            Value::SmallInt(_) => ValueKind::I16,
            Value::Int(_) => ValueKind::I32,
            Value::BigInt(_) => ValueKind::I64,
            Value::Float(_) => ValueKind::F32,
            Value::Double(_) => ValueKind::F64,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Text(_) => ValueKind::Text,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Date(_) => ValueKind::Date,
            Value::Time(_) => ValueKind::Time,
            Value::Timestamp(_) => ValueKind::DateTime,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::Json(_) => ValueKind::Json,
        })
    }

    /// Try to convert this value to a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::TinyInt(v) => Some(*v != 0),
            Value::SmallInt(v) => Some(*v != 0),
            Value::Int(v) => Some(*v != 0),
            Value::BigInt(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Try to convert this value to an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(v) => Some(i64::from(*v)),
            Value::SmallInt(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::BigInt(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1 } else { 0 }),
            _ => None,
        }
    }

    /// Try to convert this value to an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            Value::TinyInt(v) => Some(f64::from(*v)),
            Value::SmallInt(v) => Some(f64::from(*v)),
            Value::Int(v) => Some(f64::from(*v)),
            Value::BigInt(v) => Some(*v as f64),
            Value::Decimal(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to read this value as a UUID.
    ///
    /// Accepts native UUIDs, 16-byte blobs and hyphenated hex text.
    pub fn as_uuid(&self) -> Option<[u8; 16]> {
        match self {
            Value::Uuid(u) => Some(*u),
            Value::Bytes(b) => <[u8; 16]>::try_from(b.as_slice()).ok(),
            Value::Text(s) => parse_uuid(s),
            _ => None,
        }
    }

    /// Convert this value to another runtime kind.
    ///
    /// This is the culture-invariant general conversion used when a cursor
    /// value is not directly assignable to a member: numbers are narrowed
    /// with range checks, text is parsed with `.` as the decimal separator,
    /// and every scalar renders to text. NULL converts to NULL.
    pub fn convert_to(&self, kind: ValueKind) -> crate::Result<Value> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        if self.kind() == Some(kind) {
            return Ok(self.clone());
        }

        let converted = match kind {
            ValueKind::Bool => self.coerce_bool().map(Value::Bool),
            ValueKind::Enum(repr) => return self.convert_to(repr.kind()),
            k if k.is_integer() => self.coerce_integer().and_then(|n| narrow_integer(n, k)),
            ValueKind::F32 => self.coerce_f64().map(|v| Value::Float(v as f32)),
            ValueKind::F64 => self.coerce_f64().map(Value::Double),
            ValueKind::Decimal => self.coerce_decimal().map(|d| Value::Decimal(d.to_string())),
            ValueKind::Text => self.render_text().map(Value::Text),
            ValueKind::Bytes => match self {
                Value::Text(s) => Some(Value::Bytes(s.as_bytes().to_vec())),
                Value::Uuid(u) => Some(Value::Bytes(u.to_vec())),
                _ => None,
            },
            ValueKind::Uuid => self.as_uuid().map(Value::Uuid),
            ValueKind::DateTime => match self {
                Value::Text(s) => parse_timestamp(s).map(|dt| Value::Timestamp(naive_to_micros(dt))),
                Value::Date(days) => days_to_date(*days)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| Value::Timestamp(naive_to_micros(dt))),
                _ => None,
            },
            ValueKind::Date => match self {
                Value::Text(s) => parse_timestamp(s).map(|dt| Value::Date(date_to_days(dt.date()))),
                Value::Timestamp(micros) => {
                    micros_to_naive(*micros).map(|dt| Value::Date(date_to_days(dt.date())))
                }
                _ => None,
            },
            ValueKind::Time => match self {
                Value::Text(s) => NaiveTime::from_str(s.trim())
                    .ok()
                    .map(|t| Value::Time(time_to_micros(t))),
                Value::Timestamp(micros) => {
                    micros_to_naive(*micros).map(|dt| Value::Time(time_to_micros(dt.time())))
                }
                _ => None,
            },
            ValueKind::Json => match self {
                Value::Text(s) => serde_json::from_str(s).ok().map(Value::Json),
                other => serde_json::to_value(other).ok().map(Value::Json),
            },
            _ => None,
        };

        converted.ok_or_else(|| {
            Error::Type(TypeError {
                expected: kind.name(),
                actual: self.describe(),
                column: None,
                rust_type: None,
            })
        })
    }

    /// Short description used in conversion errors.
    fn describe(&self) -> String {
        match self {
            Value::Text(s) | Value::Decimal(s) => format!("{} '{}'", self.type_name(), s),
            other => match other.render_text() {
                Some(text) => format!("{} {}", other.type_name(), text),
                None => other.type_name().to_string(),
            },
        }
    }

    fn coerce_bool(&self) -> Option<bool> {
        match self {
            Value::Text(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            Value::Float(v) => Some(*v != 0.0),
            Value::Double(v) => Some(*v != 0.0),
            Value::Decimal(s) => Decimal::from_str(s).ok().map(|d| !d.is_zero()),
            other => other.as_bool(),
        }
    }

    fn coerce_integer(&self) -> Option<i128> {
        match self {
            Value::Float(v) => float_to_integer(f64::from(*v)),
            Value::Double(v) => float_to_integer(*v),
            Value::Decimal(s) => Decimal::from_str(s).ok().and_then(|d| {
                d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
                    .to_i128()
            }),
            Value::Text(s) => s.trim().parse::<i128>().ok(),
            other => other.as_i64().map(i128::from),
        }
    }

    fn coerce_f64(&self) -> Option<f64> {
        match self {
            Value::Text(s) => s.trim().parse().ok(),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            other => other.as_f64(),
        }
    }

    fn coerce_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Text(s) | Value::Decimal(s) => Decimal::from_str(s.trim()).ok(),
            Value::Float(v) => Decimal::try_from(*v).ok(),
            Value::Double(v) => Decimal::try_from(*v).ok(),
            Value::Bool(v) => Some(if *v { Decimal::ONE } else { Decimal::ZERO }),
            other => other.as_i64().map(Decimal::from),
        }
    }

    /// Render this value as invariant text (`None` for NULL and invalid UTF-8).
    pub fn render_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(v) => Some(if *v { "True" } else { "False" }.to_string()),
            Value::TinyInt(v) => Some(v.to_string()),
            Value::SmallInt(v) => Some(v.to_string()),
            Value::Int(v) => Some(v.to_string()),
            Value::BigInt(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Double(v) => Some(v.to_string()),
            Value::Decimal(s) | Value::Text(s) => Some(s.clone()),
            Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
            Value::Date(days) => days_to_date(*days).map(|d| d.format("%Y-%m-%d").to_string()),
            Value::Time(micros) => micros_to_time(*micros).map(|t| t.format("%H:%M:%S%.f").to_string()),
            Value::Timestamp(micros) => {
                micros_to_naive(*micros).map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            Value::Uuid(u) => Some(format_uuid(u)),
            Value::Json(j) => Some(j.to_string()),
        }
    }
}

fn float_to_integer(v: f64) -> Option<i128> {
    if v.is_finite() {
        Some(v.round_ties_even() as i128)
    } else {
        None
    }
}

fn narrow_integer(n: i128, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::I8 => i8::try_from(n).ok().map(Value::TinyInt),
        ValueKind::U8 => u8::try_from(n).ok().map(|v| Value::SmallInt(i16::from(v))),
        ValueKind::I16 => i16::try_from(n).ok().map(Value::SmallInt),
        ValueKind::U16 => u16::try_from(n).ok().map(|v| Value::Int(i32::from(v))),
        ValueKind::I32 => i32::try_from(n).ok().map(Value::Int),
        ValueKind::U32 => u32::try_from(n).ok().map(|v| Value::BigInt(i64::from(v))),
        ValueKind::I64 => i64::try_from(n).ok().map(Value::BigInt),
        ValueKind::U64 => u64::try_from(n)
            .ok()
            .and_then(|v| i64::try_from(v).ok())
            .map(Value::BigInt),
        _ => None,
    }
}

/// Convert UUID bytes to hyphenated string format.
pub fn format_uuid(bytes: &[u8; 16]) -> String {
    let mut out = String::with_capacity(36);
    for (i, byte) in bytes.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// Parse a UUID from hex text, with or without hyphens and braces.
pub fn parse_uuid(text: &str) -> Option<[u8; 16]> {
    let hex: String = text
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .chars()
        .filter(|c| *c != '-')
        .collect();
    if hex.len() != 32 || !hex.is_ascii() {
        return None;
    }

    let mut bytes = [0u8; 16];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(bytes)
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::default()
}

pub(crate) fn naive_to_micros(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_micros()
}

pub(crate) fn micros_to_naive(micros: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(chrono::Duration::days(i64::from(days)))
}

fn time_to_micros(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) * MICROS_PER_SECOND
        + i64::from(time.nanosecond() / 1_000)
}

fn micros_to_time(micros: i64) -> Option<NaiveTime> {
    let secs = u32::try_from(micros.div_euclid(MICROS_PER_SECOND)).ok()?;
    let nanos = u32::try_from(micros.rem_euclid(MICROS_PER_SECOND) * 1_000).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::TinyInt(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::SmallInt(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::SmallInt(i16::from(v))
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(i32::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::BigInt(i64::from(v))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Value::Uuid(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(naive_to_micros(v))
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(date_to_days(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_integers() {
        assert_eq!(Value::from(1_i8), Value::TinyInt(1));
        assert_eq!(Value::from(2_i16), Value::SmallInt(2));
        assert_eq!(Value::from(3_i32), Value::Int(3));
        assert_eq!(Value::from(4_i64), Value::BigInt(4));
        assert_eq!(Value::from(5_u8), Value::SmallInt(5));
        assert_eq!(Value::from(6_u32), Value::BigInt(6));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(7_i32)), Value::Int(7));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn test_kind() {
        assert_eq!(Value::Null.kind(), None);
        assert_eq!(Value::Int(1).kind(), Some(ValueKind::I32));
        assert_eq!(Value::Timestamp(0).kind(), Some(ValueKind::DateTime));
        assert_eq!(Value::Uuid([0; 16]).kind(), Some(ValueKind::Uuid));
    }

    #[test]
    fn test_convert_same_kind_is_identity() {
        let v = Value::Text("abc".to_string());
        assert_eq!(v.convert_to(ValueKind::Text).unwrap(), v);
        assert_eq!(Value::Null.convert_to(ValueKind::I32).unwrap(), Value::Null);
    }

    #[test]
    fn test_convert_integer_widths() {
        assert_eq!(
            Value::BigInt(42).convert_to(ValueKind::I32).unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            Value::TinyInt(-3).convert_to(ValueKind::I64).unwrap(),
            Value::BigInt(-3)
        );
        assert!(Value::BigInt(i64::MAX).convert_to(ValueKind::I32).is_err());
        assert!(Value::Int(-1).convert_to(ValueKind::U8).is_err());
        assert_eq!(
            Value::Int(200).convert_to(ValueKind::U8).unwrap(),
            Value::SmallInt(200)
        );
    }

    #[test]
    fn test_convert_text_to_numbers_is_invariant() {
        assert_eq!(
            Value::Text(" 17 ".to_string()).convert_to(ValueKind::I32).unwrap(),
            Value::Int(17)
        );
        assert_eq!(
            Value::Text("2.5".to_string()).convert_to(ValueKind::F64).unwrap(),
            Value::Double(2.5)
        );
        assert!(Value::Text("2,5".to_string()).convert_to(ValueKind::F64).is_err());
        assert_eq!(
            Value::Text("100.00".to_string())
                .convert_to(ValueKind::Decimal)
                .unwrap(),
            Value::Decimal("100.00".to_string())
        );
    }

    #[test]
    fn test_convert_float_to_integer_rounds_half_even() {
        assert_eq!(
            Value::Double(2.5).convert_to(ValueKind::I32).unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            Value::Double(3.5).convert_to(ValueKind::I32).unwrap(),
            Value::Int(4)
        );
    }

    #[test]
    fn test_convert_to_text() {
        assert_eq!(
            Value::Bool(true).convert_to(ValueKind::Text).unwrap(),
            Value::Text("True".to_string())
        );
        assert_eq!(
            Value::Int(12).convert_to(ValueKind::Text).unwrap(),
            Value::Text("12".to_string())
        );
    }

    #[test]
    fn test_convert_timestamps() {
        let dt = NaiveDate::from_ymd_opt(2001, 1, 11)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let value = Value::from(dt);
        assert_eq!(
            Value::Text("2001-01-11 08:30:00".to_string())
                .convert_to(ValueKind::DateTime)
                .unwrap(),
            value
        );
        assert_eq!(
            value.convert_to(ValueKind::Text).unwrap(),
            Value::Text("2001-01-11 08:30:00".to_string())
        );
        assert_eq!(
            value.convert_to(ValueKind::Date).unwrap(),
            Value::from(NaiveDate::from_ymd_opt(2001, 1, 11).unwrap())
        );
    }

    #[test]
    fn test_date_out_of_range_is_type_error() {
        let err = Value::Date(i32::MAX)
            .convert_to(ValueKind::DateTime)
            .unwrap_err();
        assert!(err.is_type_error());
        assert!(Value::Date(i32::MIN).convert_to(ValueKind::DateTime).is_err());

        let midnight = Value::from(NaiveDate::from_ymd_opt(2001, 1, 11).unwrap())
            .convert_to(ValueKind::DateTime)
            .unwrap();
        assert_eq!(
            midnight,
            Value::from(
                NaiveDate::from_ymd_opt(2001, 1, 11)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_uuid_text_round_trip() {
        let uuid = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
            0x0f, 0x10,
        ];
        let text = format_uuid(&uuid);
        assert_eq!(text, "01020304-0506-0708-090a-0b0c0d0e0f10");
        assert_eq!(parse_uuid(&text), Some(uuid));
        assert_eq!(parse_uuid("{01020304-0506-0708-090A-0B0C0D0E0F10}"), Some(uuid));
        assert_eq!(parse_uuid("not-a-uuid"), None);
    }

    #[test]
    fn test_convert_error_names_target() {
        let err = Value::Text("abc".to_string())
            .convert_to(ValueKind::I64)
            .unwrap_err();
        assert_eq!(err.to_string(), "Type error: expected i64, found TEXT 'abc'");
    }
}
