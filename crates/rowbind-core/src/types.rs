//! Logical type bridge.
//!
//! Three type vocabularies meet here:
//!
//! - [`ValueKind`] describes the runtime type of a Rust member or a [`Value`](crate::Value).
//! - [`LogicalType`] is the dialect-neutral type carried by column metadata.
//! - [`DialectType`] is the engine-specific column type tag.
//!
//! [`to_dialect_type`] and [`to_logical_type`] are total: anything without an
//! explicit mapping falls back to a text type.

use serde::{Deserialize, Serialize};

/// Underlying integer representation of an enumeration member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnumRepr {
    I8,
    U8,
    I16,
    I32,
    I64,
}

impl EnumRepr {
    /// The integer kind values are converted to before being handed to the record.
    pub const fn kind(self) -> ValueKind {
        match self {
            EnumRepr::I8 => ValueKind::I8,
            EnumRepr::U8 => ValueKind::U8,
            EnumRepr::I16 => ValueKind::I16,
            EnumRepr::I32 => ValueKind::I32,
            EnumRepr::I64 => ValueKind::I64,
        }
    }
}

/// Runtime type of a member or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Text,
    Bytes,
    Uuid,
    DateTime,
    Date,
    Time,
    Json,
    /// Enumeration stored as its underlying integer
    Enum(EnumRepr),
}

impl ValueKind {
    /// Human-readable name used in conversion errors.
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::U8 => "u8",
            ValueKind::I16 => "i16",
            ValueKind::U16 => "u16",
            ValueKind::I32 => "i32",
            ValueKind::U32 => "u32",
            ValueKind::I64 => "i64",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Decimal => "decimal",
            ValueKind::Text => "text",
            ValueKind::Bytes => "bytes",
            ValueKind::Uuid => "uuid",
            ValueKind::DateTime => "datetime",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
            ValueKind::Json => "json",
            ValueKind::Enum(_) => "enum",
        }
    }

    /// Check if this kind is an integer (enums excluded).
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            ValueKind::I8
                | ValueKind::U8
                | ValueKind::I16
                | ValueKind::U16
                | ValueKind::I32
                | ValueKind::U32
                | ValueKind::I64
                | ValueKind::U64
        )
    }
}

/// Dialect-neutral column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    AnsiString,
    AnsiStringFixedLength,
    Binary,
    Boolean,
    Byte,
    Currency,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    Object,
    SByte,
    Single,
    String,
    StringFixedLength,
    Time,
    UInt16,
    UInt32,
    UInt64,
    VarNumeric,
    Xml,
}

/// Engine-specific column type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialectType {
    BigInt,
    Bit,
    Char,
    DateTime,
    Decimal,
    Float,
    Int,
    Money,
    NChar,
    NVarChar,
    Real,
    TinyInt,
    UniqueIdentifier,
    VarBinary,
    VarChar,
    Variant,
}

impl DialectType {
    /// Get the SQL type name for this tag.
    pub const fn sql_name(self) -> &'static str {
        match self {
            DialectType::BigInt => "BIGINT",
            DialectType::Bit => "BIT",
            DialectType::Char => "CHAR",
            DialectType::DateTime => "DATETIME",
            DialectType::Decimal => "DECIMAL",
            DialectType::Float => "FLOAT",
            DialectType::Int => "INT",
            DialectType::Money => "MONEY",
            DialectType::NChar => "NCHAR",
            DialectType::NVarChar => "NVARCHAR",
            DialectType::Real => "REAL",
            DialectType::TinyInt => "TINYINT",
            DialectType::UniqueIdentifier => "UNIQUEIDENTIFIER",
            DialectType::VarBinary => "VARBINARY",
            DialectType::VarChar => "VARCHAR",
            DialectType::Variant => "SQL_VARIANT",
        }
    }
}

/// Map a logical type to its dialect tag.
///
/// 16/32-bit integers (signed or not) share `Int`, 64-bit integers share
/// `BigInt`, and every temporal type collapses to `DateTime`. Types without a
/// mapping become `VarChar`.
pub const fn to_dialect_type(logical: LogicalType) -> DialectType {
    match logical {
        LogicalType::AnsiString => DialectType::VarChar,
        LogicalType::AnsiStringFixedLength => DialectType::Char,
        LogicalType::Binary => DialectType::VarBinary,
        LogicalType::Boolean => DialectType::Bit,
        LogicalType::Byte | LogicalType::SByte => DialectType::TinyInt,
        LogicalType::Currency => DialectType::Money,
        LogicalType::Date | LogicalType::DateTime | LogicalType::Time => DialectType::DateTime,
        LogicalType::Decimal | LogicalType::VarNumeric => DialectType::Decimal,
        LogicalType::Double => DialectType::Float,
        LogicalType::Guid => DialectType::UniqueIdentifier,
        LogicalType::Int16 | LogicalType::Int32 | LogicalType::UInt16 | LogicalType::UInt32 => {
            DialectType::Int
        }
        LogicalType::Int64 | LogicalType::UInt64 => DialectType::BigInt,
        LogicalType::Object => DialectType::Variant,
        LogicalType::Single => DialectType::Real,
        LogicalType::String => DialectType::NVarChar,
        LogicalType::StringFixedLength => DialectType::NChar,
        LogicalType::DateTime2 | LogicalType::DateTimeOffset | LogicalType::Xml => {
            DialectType::VarChar
        }
    }
}

/// Pick the logical type for a runtime type.
///
/// `f32` maps to `Decimal`, not `Single`. Kinds without an explicit case
/// (unsigned integers, text, enums, ...) become `String`.
pub const fn to_logical_type(kind: ValueKind) -> LogicalType {
    match kind {
        ValueKind::I32 => LogicalType::Int32,
        ValueKind::I16 => LogicalType::Int16,
        ValueKind::I64 => LogicalType::Int64,
        ValueKind::DateTime => LogicalType::DateTime,
        ValueKind::F32 | ValueKind::Decimal => LogicalType::Decimal,
        ValueKind::F64 => LogicalType::Double,
        ValueKind::Uuid => LogicalType::Guid,
        ValueKind::Bool => LogicalType::Boolean,
        ValueKind::Bytes => LogicalType::Binary,
        _ => LogicalType::String,
    }
}

/// Trait for Rust types with a known runtime kind.
pub trait TypeInfo {
    /// The runtime kind of this Rust type.
    const KIND: ValueKind;

    /// Whether this type is nullable by default.
    const NULLABLE: bool = false;
}

/// Logical type of a Rust type; nullable wrappers are looked through.
pub const fn logical_type_of<T: TypeInfo>() -> LogicalType {
    to_logical_type(T::KIND)
}

macro_rules! impl_type_info {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl TypeInfo for $ty {
                const KIND: ValueKind = $kind;
            }
        )*
    };
}

impl_type_info! {
    bool => ValueKind::Bool,
    i8 => ValueKind::I8,
    u8 => ValueKind::U8,
    i16 => ValueKind::I16,
    u16 => ValueKind::U16,
    i32 => ValueKind::I32,
    u32 => ValueKind::U32,
    i64 => ValueKind::I64,
    u64 => ValueKind::U64,
    f32 => ValueKind::F32,
    f64 => ValueKind::F64,
    String => ValueKind::Text,
    Vec<u8> => ValueKind::Bytes,
    [u8; 16] => ValueKind::Uuid,
    rust_decimal::Decimal => ValueKind::Decimal,
    chrono::NaiveDateTime => ValueKind::DateTime,
    chrono::NaiveDate => ValueKind::Date,
    serde_json::Value => ValueKind::Json,
}

impl<T: TypeInfo> TypeInfo for Option<T> {
    const KIND: ValueKind = T::KIND;
    const NULLABLE: bool = true;
}
