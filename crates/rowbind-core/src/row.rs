//! Result rows and single-cell conversion.

use crate::Result;
use crate::error::{Error, TypeError};
use crate::types::ValueKind;
use crate::value::{Value, days_to_date, micros_to_naive};

/// One materialized result row: column names and values, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(names: Vec<String>, values: Vec<Value>) -> Self {
        Self { names, values }
    }

    /// Number of values in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at column `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Trait for converting from a `Value` to a typed value.
///
/// Conversion goes through [`Value::convert_to`], so text and numeric
/// widths are coerced the same way the mapper coerces member values.
pub trait FromValue: Sized {
    /// Convert from a Value, returning an error if the conversion fails.
    fn from_value(value: &Value) -> Result<Self>;
}

fn unexpected(expected: &'static str, value: &Value) -> Error {
    Error::Type(TypeError {
        expected,
        actual: value.type_name().to_string(),
        column: None,
        rust_type: Some(expected),
    })
}

macro_rules! impl_from_value {
    ($($ty:ty => $kind:expr, $pat:pat => $out:expr;)*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self> {
                    match value.convert_to($kind)? {
                        $pat => Ok($out),
                        other => Err(unexpected(stringify!($ty), &other)),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => ValueKind::Bool, Value::Bool(v) => v;
    i8 => ValueKind::I8, Value::TinyInt(v) => v;
    i16 => ValueKind::I16, Value::SmallInt(v) => v;
    i32 => ValueKind::I32, Value::Int(v) => v;
    i64 => ValueKind::I64, Value::BigInt(v) => v;
    f32 => ValueKind::F32, Value::Float(v) => v;
    f64 => ValueKind::F64, Value::Double(v) => v;
    String => ValueKind::Text, Value::Text(v) => v;
    Vec<u8> => ValueKind::Bytes, Value::Bytes(v) => v;
    [u8; 16] => ValueKind::Uuid, Value::Uuid(v) => v;
    serde_json::Value => ValueKind::Json, Value::Json(v) => v;
}

macro_rules! impl_from_value_unsigned {
    ($($ty:ty => $kind:expr;)*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self> {
                    let converted = value.convert_to($kind)?;
                    converted
                        .as_i64()
                        .and_then(|v| <$ty>::try_from(v).ok())
                        .ok_or_else(|| unexpected(stringify!($ty), &converted))
                }
            }
        )*
    };
}

impl_from_value_unsigned! {
    u8 => ValueKind::U8;
    u16 => ValueKind::U16;
    u32 => ValueKind::U32;
    u64 => ValueKind::U64;
}

impl FromValue for rust_decimal::Decimal {
    fn from_value(value: &Value) -> Result<Self> {
        match value.convert_to(ValueKind::Decimal)? {
            Value::Decimal(s) => s
                .parse()
                .map_err(|_| Error::Type(TypeError::new("decimal", format!("DECIMAL '{}'", s)))),
            other => Err(unexpected("decimal", &other)),
        }
    }
}

impl FromValue for chrono::NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self> {
        match value.convert_to(ValueKind::DateTime)? {
            Value::Timestamp(micros) => micros_to_naive(micros)
                .ok_or_else(|| Error::Type(TypeError::new("datetime", "timestamp out of range"))),
            other => Err(unexpected("datetime", &other)),
        }
    }
}

impl FromValue for chrono::NaiveDate {
    fn from_value(value: &Value) -> Result<Self> {
        match value.convert_to(ValueKind::Date)? {
            Value::Date(days) => days_to_date(days)
                .ok_or_else(|| Error::Type(TypeError::new("date", "date out of range"))),
            other => Err(unexpected("date", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}
