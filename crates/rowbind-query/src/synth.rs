//! INSERT, UPDATE and DELETE synthesis from a record and its table.
//!
//! The builders only read the record's property map and the resolved table
//! metadata. Creating the table is the schema provider's job.

use crate::constraint::{Constraint, ConstraintKind, to_constraint_list};
use crate::statement::{Assignment, DeleteStatement, InsertStatement, UpdateStatement};
use rowbind_core::{
    ColumnMeta, Error, MissingKeyError, Record, Result, SchemaErrorKind, SchemaProvider, TableMeta,
    Value,
};

/// Property map lookup, case-insensitive.
fn lookup<'a>(settings: &'a [(&'static str, Value)], name: &str) -> Option<&'a Value> {
    settings
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// `Where` constraint on the primary key holding the record's key value.
fn key_constraint(
    table: &TableMeta,
    pk: &ColumnMeta,
    settings: &[(&'static str, Value)],
) -> Result<Constraint> {
    let value = lookup(settings, pk.name).ok_or_else(|| {
        Error::MissingKey(MissingKeyError {
            table: table.name().to_string(),
            key: pk.name.to_string(),
        })
    })?;
    Ok(Constraint::new(ConstraintKind::Where, pk.name, value.clone()))
}

/// Build an INSERT for `item`.
///
/// Every property with a matching column is assigned unless the column is
/// auto-increment, read-only or computed, or declares a default and the
/// property is NULL.
#[tracing::instrument(level = "trace", skip(item, table), fields(table = table.name()))]
pub fn build_insert<T: Record>(item: &T, table: &TableMeta) -> InsertStatement {
    let mut assignments = Vec::new();
    for (name, value) in item.to_values() {
        let Some(column) = table.column(name) else {
            continue;
        };
        if column.auto_increment || column.read_only || column.computed {
            continue;
        }
        if column.has_default() && value.is_null() {
            continue;
        }
        assignments.push(Assignment::new(column, value));
    }

    tracing::debug!(
        table = table.name(),
        assignments = assignments.len(),
        "Built INSERT"
    );
    InsertStatement::new(table.name(), assignments)
}

/// Build an UPDATE for `item`, filtered on its primary key.
///
/// With the active-record capability only the dirty columns are assigned.
/// Otherwise every property with a matching column is assigned. Primary-key
/// and read-only columns are never assigned; computed columns are skipped
/// when diffing the full property set.
#[tracing::instrument(level = "trace", skip(item, table), fields(table = table.name()))]
pub fn build_update<T: Record>(item: &T, table: &TableMeta) -> Result<UpdateStatement> {
    let settings = item.to_values();
    let mut assignments = Vec::new();

    if let Some(active) = item.active_record() {
        for dirty in active.dirty_columns() {
            let Some(column) = table.column(&dirty) else {
                tracing::trace!(column = %dirty, "Dirty column not in table; skipping");
                continue;
            };
            if column.primary_key || column.read_only {
                continue;
            }
            match lookup(&settings, column.name) {
                Some(value) => assignments.push(Assignment::new(column, value.clone())),
                None => tracing::trace!(column = column.name, "Dirty column has no property; skipping"),
            }
        }
    } else {
        for (name, value) in &settings {
            let Some(column) = table.column(name) else {
                continue;
            };
            if column.computed || column.primary_key || column.read_only {
                continue;
            }
            assignments.push(Assignment::new(column, value.clone()));
        }
    }

    let pk = table.primary_key().ok_or_else(|| {
        Error::schema(
            SchemaErrorKind::InvalidPrimaryKey,
            format!("cannot update '{}': table has no primary key", table.name()),
        )
    })?;
    let constraint = key_constraint(table, pk, &settings)?;

    tracing::debug!(
        table = table.name(),
        assignments = assignments.len(),
        "Built UPDATE"
    );
    Ok(UpdateStatement::new(table.name(), assignments, vec![constraint]))
}

/// Build a DELETE for `item`.
///
/// Tables with a primary key are filtered on it alone. Without one, every
/// property becomes an equality constraint.
#[tracing::instrument(level = "trace", skip(item, table), fields(table = table.name()))]
pub fn build_delete<T: Record>(item: &T, table: &TableMeta) -> Result<DeleteStatement> {
    let constraints = match table.primary_key() {
        Some(pk) => vec![key_constraint(table, pk, &item.to_values())?],
        None => to_constraint_list(item),
    };

    tracing::debug!(
        table = table.name(),
        constraints = constraints.len(),
        "Built DELETE"
    );
    Ok(DeleteStatement::new(table.name(), constraints))
}

/// Resolve `T`'s table through `provider` and build an INSERT.
pub fn to_insert_statement<T: Record, P: SchemaProvider>(
    item: &T,
    provider: &P,
) -> Result<InsertStatement> {
    let table = provider.resolve_or_create_table::<T>()?;
    Ok(build_insert(item, &table))
}

/// Resolve `T`'s table through `provider` and build an UPDATE.
pub fn to_update_statement<T: Record, P: SchemaProvider>(
    item: &T,
    provider: &P,
) -> Result<UpdateStatement> {
    let table = provider.resolve_or_create_table::<T>()?;
    build_update(item, &table)
}

/// Resolve `T`'s table through `provider` and build a DELETE.
pub fn to_delete_statement<T: Record, P: SchemaProvider>(
    item: &T,
    provider: &P,
) -> Result<DeleteStatement> {
    let table = provider.resolve_or_create_table::<T>()?;
    build_delete(item, &table)
}
