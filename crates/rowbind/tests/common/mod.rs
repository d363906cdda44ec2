#![allow(dead_code)]

use rowbind::prelude::*;
use rowbind::QueryError;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub product_id: i32,
    pub product_name: String,
    pub sku: [u8; 16],
    pub discontinued: bool,
    pub unit_price: Decimal,
    pub category_id: Option<i32>,
    pub state: Option<RecordState>,
}

impl Record for Product {
    const TABLE_NAME: &'static str = "Products";

    fn members() -> &'static [MemberInfo] {
        const MEMBERS: &[MemberInfo] = &[
            MemberInfo::property("ProductID", MemberType::of::<i32>()),
            MemberInfo::property("ProductName", MemberType::of::<String>()),
            MemberInfo::property("Sku", MemberType::of::<[u8; 16]>()),
            MemberInfo::property("Discontinued", MemberType::of::<bool>()),
            MemberInfo::property("UnitPrice", MemberType::of::<Decimal>()),
            MemberInfo::property("CategoryID", MemberType::of::<Option<i32>>()),
        ];
        MEMBERS
    }

    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "ProductID" => Some(self.product_id.into()),
            "ProductName" => Some(self.product_name.clone().into()),
            "Sku" => Some(self.sku.into()),
            "Discontinued" => Some(self.discontinued.into()),
            "UnitPrice" => Some(self.unit_price.into()),
            "CategoryID" => Some(self.category_id.into()),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "ProductID" => self.product_id = i32::from_value(&value)?,
            "ProductName" => self.product_name = String::from_value(&value)?,
            "Sku" => self.sku = <[u8; 16]>::from_value(&value)?,
            "Discontinued" => self.discontinued = bool::from_value(&value)?,
            "UnitPrice" => self.unit_price = Decimal::from_value(&value)?,
            "CategoryID" => self.category_id = Option::<i32>::from_value(&value)?,
            _ => {}
        }
        Ok(())
    }

    fn active_record(&self) -> Option<&dyn ActiveRecord> {
        self.state.as_ref().map(|s| s as &dyn ActiveRecord)
    }

    fn active_record_mut(&mut self) -> Option<&mut dyn ActiveRecord> {
        self.state.as_mut().map(|s| s as &mut dyn ActiveRecord)
    }
}

pub fn chai() -> Product {
    Product {
        product_id: 1,
        product_name: "Chai".to_string(),
        sku: [7; 16],
        discontinued: false,
        unit_price: Decimal::new(1800, 2),
        category_id: Some(1),
        state: None,
    }
}

pub fn product(id: i32, name: &str, category: i32) -> Product {
    Product {
        product_id: id,
        product_name: name.to_string(),
        sku: [id as u8; 16],
        category_id: Some(category),
        ..Product::default()
    }
}

/// Row with one column per property, as a select of the record would return.
pub fn row_of<T: Record>(item: &T) -> Row {
    let (names, values): (Vec<_>, Vec<_>) = item
        .to_values()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .unzip();
    Row::new(names, values)
}

/// In-memory execution layer.
///
/// Understands the filtered `SELECT *` the lazy loader issues and records
/// every executed statement.
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    dialect: Dialect,
    tables: HashMap<String, Vec<Row>>,
    queries: AtomicUsize,
    executed: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MemoryExecutor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn with_rows<T: Record>(mut self, items: &[T]) -> Self {
        self.tables
            .entry(T::TABLE_NAME.to_string())
            .or_default()
            .extend(items.iter().map(row_of));
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Split `SELECT * FROM "T" WHERE "C" = $1` into table and column.
    fn parse_select(sql: &str) -> Option<(&str, &str)> {
        let quote = if sql.contains('`') { '`' } else { '"' };
        let parts: Vec<&str> = sql.split(quote).collect();
        match parts.as_slice() {
            [_, table, _, column, ..] => Some((*table, *column)),
            _ => None,
        }
    }
}

impl Executor for MemoryExecutor {
    type Cursor = RowCursor;

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<RowCursor> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let (table, column) = Self::parse_select(sql).ok_or_else(|| {
            Error::Custom(format!("unsupported query: {sql}"))
        })?;
        let rows = self.tables.get(table).ok_or_else(|| {
            Error::Query(QueryError {
                sql: Some(sql.to_string()),
                message: format!("no such table: {table}"),
                source: None,
            })
        })?;

        let key = params.first().cloned().unwrap_or(Value::Null);
        let matching = rows
            .iter()
            .filter(|row| {
                row.column_names()
                    .position(|name| name == column)
                    .and_then(|i| row.get(i))
                    == Some(&key)
            })
            .cloned()
            .collect();
        Ok(RowCursor::new(matching))
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((sql.to_string(), params.to_vec()));
        Ok(1)
    }
}
