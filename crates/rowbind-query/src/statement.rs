//! Statement descriptors.
//!
//! Descriptors are immutable once built. They carry the target table, the
//! value assignments and the filter constraints, and render themselves as
//! parameterized SQL for the execution layer.

use crate::constraint::{Constraint, render_constraints};
use crate::dialect::Dialect;
use rowbind_core::{ColumnMeta, Error, LogicalType, Result, SchemaErrorKind, Value};
use serde::Serialize;

/// A statement that renders to SQL plus bound parameters.
pub trait Statement {
    /// Render with placeholders for `dialect`.
    fn to_sql(&self, dialect: Dialect) -> Result<(String, Vec<Value>)>;

    /// True when executing the statement could not change any row.
    fn is_noop(&self) -> bool {
        false
    }
}

/// One `column = value` assignment of an INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// Column name
    pub column: &'static str,
    /// Quoted `table.column` name
    pub qualified_name: String,
    pub value: Value,
    pub logical_type: LogicalType,
}

impl Assignment {
    pub(crate) fn new(column: &ColumnMeta, value: Value) -> Self {
        Self {
            column: column.name,
            qualified_name: column.qualified_name(),
            value,
            logical_type: column.logical_type,
        }
    }
}

/// INSERT descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertStatement {
    table: &'static str,
    assignments: Vec<Assignment>,
}

impl InsertStatement {
    pub(crate) fn new(table: &'static str, assignments: Vec<Assignment>) -> Self {
        Self { table, assignments }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }
}

impl Statement for InsertStatement {
    fn to_sql(&self, dialect: Dialect) -> Result<(String, Vec<Value>)> {
        let table = dialect.quote_identifier(self.table);
        if self.assignments.is_empty() {
            return Ok((format!("INSERT INTO {} DEFAULT VALUES", table), Vec::new()));
        }

        let columns: Vec<_> = self
            .assignments
            .iter()
            .map(|a| dialect.quote_identifier(a.column))
            .collect();
        let placeholders: Vec<_> = (1..=self.assignments.len())
            .map(|i| dialect.placeholder(i))
            .collect();
        let params = self.assignments.iter().map(|a| a.value.clone()).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );
        Ok((sql, params))
    }
}

/// UPDATE descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStatement {
    table: &'static str,
    assignments: Vec<Assignment>,
    constraints: Vec<Constraint>,
}

impl UpdateStatement {
    pub(crate) fn new(
        table: &'static str,
        assignments: Vec<Assignment>,
        constraints: Vec<Constraint>,
    ) -> Self {
        Self {
            table,
            assignments,
            constraints,
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

impl Statement for UpdateStatement {
    /// Fails when there is nothing to assign.
    fn to_sql(&self, dialect: Dialect) -> Result<(String, Vec<Value>)> {
        if self.assignments.is_empty() {
            return Err(Error::Custom(format!(
                "UPDATE of '{}' has no columns to set",
                self.table
            )));
        }

        let mut params = Vec::new();
        let mut set_clauses = Vec::new();

        for (i, assignment) in self.assignments.iter().enumerate() {
            set_clauses.push(format!(
                "{} = {}",
                dialect.quote_identifier(assignment.column),
                dialect.placeholder(i + 1)
            ));
            params.push(assignment.value.clone());
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            dialect.quote_identifier(self.table),
            set_clauses.join(", ")
        );
        let (filter, filter_params) = render_constraints(&self.constraints, dialect, params.len());
        sql.push_str(&filter);
        params.extend(filter_params);

        Ok((sql, params))
    }

    fn is_noop(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// DELETE descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteStatement {
    table: &'static str,
    constraints: Vec<Constraint>,
}

impl DeleteStatement {
    pub(crate) fn new(table: &'static str, constraints: Vec<Constraint>) -> Self {
        Self { table, constraints }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

impl Statement for DeleteStatement {
    fn to_sql(&self, dialect: Dialect) -> Result<(String, Vec<Value>)> {
        let (filter, params) = render_constraints(&self.constraints, dialect, 0);
        let sql = format!(
            "DELETE FROM {}{}",
            dialect.quote_identifier(self.table),
            filter
        );
        Ok((sql, params))
    }
}

/// Filtered `SELECT *` descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectStatement {
    table: &'static str,
    constraints: Vec<Constraint>,
}

impl SelectStatement {
    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

impl Statement for SelectStatement {
    fn to_sql(&self, dialect: Dialect) -> Result<(String, Vec<Value>)> {
        let (filter, params) = render_constraints(&self.constraints, dialect, 0);
        let sql = format!(
            "SELECT * FROM {}{}",
            dialect.quote_identifier(self.table),
            filter
        );
        Ok((sql, params))
    }
}

/// Select every row of the column's table where `column` equals `key`.
///
/// The column must belong to a built table.
pub fn select_where(column: &ColumnMeta, key: &Value) -> Result<SelectStatement> {
    if column.table.is_empty() {
        return Err(Error::schema(
            SchemaErrorKind::InvalidIdentifier,
            format!("column '{}' is not attached to a table", column.name),
        ));
    }
    Ok(SelectStatement {
        table: column.table,
        constraints: vec![Constraint::where_eq(column.name, key.clone())],
    })
}
