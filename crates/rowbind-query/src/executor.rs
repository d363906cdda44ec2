//! Seam to the execution layer.

use crate::dialect::Dialect;
use crate::statement::{Statement, select_where};
use rowbind_core::{ColumnMeta, Cursor, DataMapper, Record, RelatedLoader, Result, Value};
use std::sync::Arc;

/// Executes rendered SQL. Implemented by the connection layer.
pub trait Executor {
    /// Cursor type returned by queries.
    type Cursor: Cursor;

    /// Dialect this executor expects placeholders in.
    fn dialect(&self) -> Dialect {
        Dialect::default()
    }

    /// Run a query and return a cursor over its rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Self::Cursor>;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Render a descriptor in this executor's dialect and run it.
    ///
    /// No-op statements are not sent and report zero affected rows.
    fn execute_statement<S: Statement>(&self, statement: &S) -> Result<u64>
    where
        Self: Sized,
    {
        if statement.is_noop() {
            tracing::debug!("Skipping statement with nothing to change");
            return Ok(0);
        }
        let (sql, params) = statement.to_sql(self.dialect())?;
        tracing::trace!(sql = %sql, params = params.len(), "Executing statement");
        self.execute(&sql, &params)
    }
}

impl<E: Executor> Executor for Arc<E> {
    type Cursor = E::Cursor;

    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Self::Cursor> {
        (**self).query(sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        (**self).execute(sql, params)
    }
}

/// [`RelatedLoader`] backed by an [`Executor`].
///
/// Renders the filtered select, runs it and maps the cursor into records.
#[derive(Debug)]
pub struct QueryLoader<E> {
    executor: Arc<E>,
    mapper: DataMapper,
}

impl<E> Clone for QueryLoader<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            mapper: self.mapper.clone(),
        }
    }
}

impl<E: Executor> QueryLoader<E> {
    pub fn new(executor: Arc<E>) -> Self {
        Self {
            executor,
            mapper: DataMapper::new(),
        }
    }

    /// Use `mapper` (and its item hook) for fetched rows.
    pub fn with_mapper(mut self, mapper: DataMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }
}

impl<T, E> RelatedLoader<T> for QueryLoader<E>
where
    T: Record + Default,
    E: Executor,
{
    fn select_where(&self, column: &ColumnMeta, key: &Value) -> Result<Vec<T>> {
        let (sql, params) = select_where(column, key)?.to_sql(self.executor.dialect())?;
        tracing::trace!(sql = %sql, "Fetching related rows");
        let mut cursor = self.executor.query(&sql, &params)?;
        self.mapper.map_all(&mut cursor)
    }
}
