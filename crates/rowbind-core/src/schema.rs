//! Table and column metadata.
//!
//! Metadata is built once per record type, either by hand through
//! [`TableMeta::builder`] or by convention through [`TableMeta::from_record`],
//! and handed out by a [`SchemaProvider`]. The core never mutates it.

use crate::Result;
use crate::error::{Error, SchemaErrorKind};
use crate::identifiers::{is_valid_identifier, qualify};
use crate::record::{Record, RecordShape};
use crate::types::{LogicalType, to_logical_type};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Metadata about a table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name
    pub name: &'static str,
    /// Owning table, filled in by the table builder
    pub table: &'static str,
    /// Dialect-neutral type
    pub logical_type: LogicalType,
    pub primary_key: bool,
    pub auto_increment: bool,
    /// Never written by INSERT or UPDATE
    pub read_only: bool,
    /// Derived by the database
    pub computed: bool,
    pub nullable: bool,
    /// Default value expression (SQL)
    pub default: Option<&'static str>,
}

impl ColumnMeta {
    /// Create a column with minimal required data.
    pub const fn new(name: &'static str, logical_type: LogicalType) -> Self {
        Self {
            name,
            table: "",
            logical_type,
            primary_key: false,
            auto_increment: false,
            read_only: false,
            computed: false,
            nullable: false,
            default: None,
        }
    }

    /// Set whether this is a primary key.
    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    /// Set whether this column auto-increments.
    pub const fn auto_increment(mut self, value: bool) -> Self {
        self.auto_increment = value;
        self
    }

    /// Set whether this column is read-only.
    pub const fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    /// Set whether this column is computed.
    pub const fn computed(mut self, value: bool) -> Self {
        self.computed = value;
        self
    }

    /// Set whether this column is nullable.
    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set the default value expression.
    pub const fn default(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    /// Check if the column declares a default.
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Quoted `table.column` name.
    pub fn qualified_name(&self) -> String {
        qualify(self.table, self.name)
    }
}

/// Metadata about a table: ordered columns and at most one primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    name: &'static str,
    columns: Vec<ColumnMeta>,
    primary_key: Option<usize>,
}

impl TableMeta {
    /// Start building table metadata.
    pub fn builder(name: &'static str) -> TableMetaBuilder {
        TableMetaBuilder {
            name,
            columns: Vec::new(),
            primary_key: None,
        }
    }

    /// Derive table metadata from a record's properties.
    ///
    /// One column per property, typed through the logical type bridge. The
    /// primary key is `T::PRIMARY_KEY` when set, otherwise a property named
    /// `Id` or `<Type>Id` (case-insensitive). Integer primary keys
    /// auto-increment; nullable properties become nullable columns.
    pub fn from_record<T: Record>() -> Result<Self> {
        let shape = RecordShape::of::<T>();
        let pk = match T::PRIMARY_KEY {
            Some(name) => Some(name),
            None => conventional_key::<T>(&shape),
        };

        let mut builder = TableMeta::builder(T::TABLE_NAME);
        for member in shape.properties() {
            let is_pk = pk.is_some_and(|k| k.eq_ignore_ascii_case(member.name));
            let column = ColumnMeta::new(member.name, to_logical_type(member.ty.kind))
                .nullable(member.ty.nullable)
                .primary_key(is_pk)
                .auto_increment(is_pk && member.ty.kind.is_integer());
            builder = builder.column(column);
        }
        if let Some(pk) = pk {
            builder = builder.primary_key(pk);
        }
        builder.build()
    }

    /// Table name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Find a column by case-insensitive name.
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The primary-key column, if the table has one.
    pub fn primary_key(&self) -> Option<&ColumnMeta> {
        self.primary_key.and_then(|i| self.columns.get(i))
    }
}

fn conventional_key<T: Record>(shape: &RecordShape) -> Option<&'static str> {
    let type_name = std::any::type_name::<T>();
    let short = type_name.rsplit("::").next().unwrap_or(type_name);
    let prefixed = format!("{short}Id");
    shape
        .property("Id")
        .or_else(|| shape.property(&prefixed))
        .map(|m| m.name)
}

/// Builder for [`TableMeta`].
#[derive(Debug, Clone)]
pub struct TableMetaBuilder {
    name: &'static str,
    columns: Vec<ColumnMeta>,
    primary_key: Option<&'static str>,
}

impl TableMetaBuilder {
    /// Append a column.
    pub fn column(mut self, column: ColumnMeta) -> Self {
        self.columns.push(column);
        self
    }

    /// Name the primary-key column.
    ///
    /// Without this, the first column flagged `primary_key` is used.
    pub fn primary_key(mut self, name: &'static str) -> Self {
        self.primary_key = Some(name);
        self
    }

    /// Validate names and produce the table.
    pub fn build(self) -> Result<TableMeta> {
        if !is_valid_identifier(self.name) {
            return Err(Error::schema(
                SchemaErrorKind::InvalidIdentifier,
                format!("invalid table name '{}'", self.name),
            ));
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut columns = Vec::with_capacity(self.columns.len());
        for (i, mut column) in self.columns.into_iter().enumerate() {
            if !is_valid_identifier(column.name) {
                return Err(Error::schema(
                    SchemaErrorKind::InvalidIdentifier,
                    format!("invalid column name '{}' in table '{}'", column.name, self.name),
                ));
            }
            if seen.insert(column.name.to_ascii_lowercase(), i).is_some() {
                return Err(Error::schema(
                    SchemaErrorKind::DuplicateColumn,
                    format!("duplicate column '{}' in table '{}'", column.name, self.name),
                ));
            }
            column.table = self.name;
            columns.push(column);
        }

        let primary_key = match self.primary_key {
            Some(pk) => {
                let index = seen.get(&pk.to_ascii_lowercase()).copied().ok_or_else(|| {
                    Error::schema(
                        SchemaErrorKind::InvalidPrimaryKey,
                        format!("primary key '{}' is not a column of '{}'", pk, self.name),
                    )
                })?;
                Some(index)
            }
            None => columns.iter().position(|c| c.primary_key),
        };

        for (i, column) in columns.iter_mut().enumerate() {
            column.primary_key = Some(i) == primary_key;
        }

        Ok(TableMeta {
            name: self.name,
            columns,
            primary_key,
        })
    }
}

/// Source of table metadata for record types.
pub trait SchemaProvider {
    /// Look up the table for `T`, deriving and registering it when absent.
    fn resolve_or_create_table<T: Record>(&self) -> Result<Arc<TableMeta>>;
}

/// In-process table registry keyed by record type.
///
/// Tables can be registered explicitly; unregistered record types are
/// derived with [`TableMeta::from_record`] on first lookup.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: RwLock<HashMap<TypeId, Arc<TableMeta>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register explicit metadata for `T`, replacing any previous entry.
    pub fn register<T: Record>(&self, table: TableMeta) -> Arc<TableMeta> {
        let table = Arc::new(table);
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.insert(TypeId::of::<T>(), Arc::clone(&table));
        table
    }

    /// Registered metadata for `T`, without deriving it.
    pub fn get<T: Record>(&self) -> Option<Arc<TableMeta>> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.get(&TypeId::of::<T>()).cloned()
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SchemaProvider for SchemaRegistry {
    fn resolve_or_create_table<T: Record>(&self) -> Result<Arc<TableMeta>> {
        if let Some(table) = self.get::<T>() {
            return Ok(table);
        }

        let derived = TableMeta::from_record::<T>()?;
        tracing::debug!(
            table = derived.name(),
            columns = derived.columns().len(),
            primary_key = derived.primary_key().map(|c| c.name),
            "Derived table metadata from record"
        );

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let table = tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(derived));
        Ok(Arc::clone(table))
    }
}

impl<P: SchemaProvider> SchemaProvider for Arc<P> {
    fn resolve_or_create_table<T: Record>(&self) -> Result<Arc<TableMeta>> {
        (**self).resolve_or_create_table::<T>()
    }
}

impl<P: SchemaProvider> SchemaProvider for &P {
    fn resolve_or_create_table<T: Record>(&self) -> Result<Arc<TableMeta>> {
        (**self).resolve_or_create_table::<T>()
    }
}
