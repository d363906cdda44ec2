//! Core types for rowbind.
//!
//! This crate provides the record-mapping half of the data-access core:
//!
//! - `Value` and the logical type bridge
//! - `Record` for name-based member access, with optional `ActiveRecord` state
//! - `TableMeta`/`ColumnMeta` and the `SchemaProvider` seam
//! - `Cursor` and the `DataMapper` that populates records from it
//! - `LazyList` for related collections fetched on first access

pub mod cursor;
pub mod error;
pub mod identifiers;
pub mod mapper;
pub mod record;
pub mod relationship;
pub mod row;
pub mod schema;
pub mod types;
pub mod value;

pub use cursor::{Cursor, RowCursor};
pub use error::{
    Error, MissingKeyError, QueryError, Result, SchemaError, SchemaErrorKind, TypeError,
};
pub use identifiers::{is_valid_identifier, qualify, quote_ident, quote_ident_mysql};
pub use mapper::{
    DataMapper, Enumerable, ItemCreatedHook, load, read_projection, read_record, to_list,
};
pub use record::{ActiveRecord, MemberInfo, MemberKind, MemberType, Record, RecordShape, RecordState};
pub use relationship::{LazyList, RelatedLoader};
pub use row::{FromValue, Row};
pub use schema::{ColumnMeta, SchemaProvider, SchemaRegistry, TableMeta, TableMetaBuilder};
pub use types::{
    DialectType, EnumRepr, LogicalType, TypeInfo, ValueKind, logical_type_of, to_dialect_type,
    to_logical_type,
};
pub use value::Value;
