//! rowbind - generic record mapping and statement synthesis for SQL data access.
//!
//! rowbind is the data-access core that sits between a record type and an
//! execution layer:
//!
//! - Cursor rows are mapped onto records by member name, with permissive
//!   type coercion
//! - INSERT, UPDATE and DELETE descriptors are synthesized from a record's
//!   properties and its table metadata
//! - Related collections are fetched lazily on first access
//!
//! # Quick Start
//!
//! ```
//! use rowbind::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Product {
//!     id: i32,
//!     name: String,
//! }
//!
//! impl Record for Product {
//!     const TABLE_NAME: &'static str = "Products";
//!
//!     fn members() -> &'static [MemberInfo] {
//!         const MEMBERS: &[MemberInfo] = &[
//!             MemberInfo::property("ProductID", MemberType::of::<i32>()),
//!             MemberInfo::property("ProductName", MemberType::of::<String>()),
//!         ];
//!         MEMBERS
//!     }
//!
//!     fn get(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "ProductID" => Some(self.id.into()),
//!             "ProductName" => Some(self.name.clone().into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, name: &str, value: Value) -> Result<()> {
//!         match name {
//!             "ProductID" => self.id = i32::from_value(&value)?,
//!             "ProductName" => self.name = String::from_value(&value)?,
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let registry = SchemaRegistry::new();
//! let product = Product { id: 7, name: "Chai".to_string() };
//!
//! let update = to_update_statement(&product, &registry)?;
//! let (sql, params) = update.to_sql(Dialect::Postgres)?;
//! assert_eq!(
//!     sql,
//!     "UPDATE \"Products\" SET \"ProductName\" = $1 WHERE \"ProductID\" = $2"
//! );
//! assert_eq!(params.len(), 2);
//! # Ok(())
//! # }
//! ```

pub use rowbind_core::{
    ActiveRecord, ColumnMeta, Cursor, DataMapper, DialectType, EnumRepr, Enumerable, Error,
    FromValue, ItemCreatedHook, LazyList, LogicalType, MemberInfo, MemberKind, MemberType,
    MissingKeyError, QueryError, Record, RecordShape, RecordState, RelatedLoader, Result, Row,
    RowCursor, SchemaError, SchemaErrorKind, SchemaProvider, SchemaRegistry, TableMeta,
    TableMetaBuilder, TypeError, TypeInfo, Value, ValueKind, is_valid_identifier, load,
    logical_type_of, qualify, quote_ident, quote_ident_mysql, read_projection, read_record,
    to_dialect_type, to_list, to_logical_type,
};

pub use rowbind_query::{
    Assignment, Constraint, ConstraintKind, DeleteStatement, Dialect, Executor, InsertStatement,
    QueryLoader, SelectStatement, Statement, UpdateStatement, build_delete, build_insert,
    build_update, select_where, to_constraint_list, to_delete_statement, to_insert_statement,
    to_update_statement,
};

/// Glob import for record definitions and the common operations.
pub mod prelude {
    pub use crate::{
        ActiveRecord,
        Cursor,
        DataMapper,
        Dialect,
        Enumerable,
        Error,
        Executor,
        FromValue,
        LazyList,
        MemberInfo,
        MemberType,
        QueryLoader,
        Record,
        RecordState,
        RelatedLoader,
        Result,
        Row,
        RowCursor,
        SchemaProvider,
        SchemaRegistry,
        Statement,
        TableMeta,
        Value,
        ValueKind,
        to_delete_statement,
        to_insert_statement,
        to_update_statement,
    };
}
