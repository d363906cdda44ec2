//! Lazily resolved related collections.
//!
//! A [`LazyList`] stands in for the child rows of a one-to-many relationship.
//! It holds the foreign-key column and the parent's key value, and runs its
//! backing select on first access of any kind. The fetched sequence is kept
//! for the lifetime of the list and is never refreshed.
//!
//! Resolution is check-then-fetch-then-set without locking, so concurrent
//! first access from several threads may fetch more than once. Access a list
//! from one thread at a time.

use crate::Result;
use crate::error::Error;
use crate::schema::ColumnMeta;
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Query-layer handle that runs the filtered select behind a [`LazyList`].
pub trait RelatedLoader<T> {
    /// Select every row whose `column` equals `key`.
    fn select_where(&self, column: &ColumnMeta, key: &Value) -> Result<Vec<T>>;
}

impl<T, F> RelatedLoader<T> for F
where
    F: Fn(&ColumnMeta, &Value) -> Result<Vec<T>>,
{
    fn select_where(&self, column: &ColumnMeta, key: &Value) -> Result<Vec<T>> {
        self(column, key)
    }
}

/// A list of related records fetched once, on first access.
pub struct LazyList<T> {
    loader: Arc<dyn RelatedLoader<T>>,
    column: ColumnMeta,
    key: Value,
    loaded: OnceLock<Vec<T>>,
}

impl<T> LazyList<T> {
    /// Create an unresolved list of rows where `column` equals `key`.
    pub fn new(loader: Arc<dyn RelatedLoader<T>>, column: ColumnMeta, key: impl Into<Value>) -> Self {
        Self {
            loader,
            column,
            key: key.into(),
            loaded: OnceLock::new(),
        }
    }

    /// Foreign-key column the list filters on.
    pub fn column(&self) -> &ColumnMeta {
        &self.column
    }

    /// Key value the list filters on.
    pub fn key(&self) -> &Value {
        &self.key
    }

    /// Check if the backing select has run.
    pub fn is_resolved(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// The list always accepts writes.
    pub fn is_read_only(&self) -> bool {
        false
    }

    fn resolve(&self) -> Result<&Vec<T>> {
        if let Some(items) = self.loaded.get() {
            return Ok(items);
        }

        let items = self.loader.select_where(&self.column, &self.key)?;
        tracing::debug!(
            table = self.column.table,
            column = self.column.name,
            key = ?self.key,
            rows = items.len(),
            "Resolved related collection"
        );
        Ok(self.loaded.get_or_init(|| items))
    }

    fn resolve_mut(&mut self) -> Result<&mut Vec<T>> {
        self.resolve()?;
        self.loaded
            .get_mut()
            .ok_or_else(|| Error::Custom("related collection failed to resolve".to_string()))
    }

    /// Item at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Result<Option<&T>> {
        Ok(self.resolve()?.get(index))
    }

    /// Replace the item at `index`.
    pub fn set(&mut self, index: usize, item: T) -> Result<()> {
        let items = self.resolve_mut()?;
        let len = items.len();
        let slot = items.get_mut(index).ok_or_else(|| out_of_range(index, len))?;
        *slot = item;
        Ok(())
    }

    /// Insert `item` at `index`, shifting later items.
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        let items = self.resolve_mut()?;
        if index > items.len() {
            return Err(out_of_range(index, items.len()));
        }
        items.insert(index, item);
        Ok(())
    }

    /// Remove and return the item at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let items = self.resolve_mut()?;
        if index >= items.len() {
            return Err(out_of_range(index, items.len()));
        }
        Ok(items.remove(index))
    }

    /// Append `item`.
    pub fn push(&mut self, item: T) -> Result<()> {
        self.resolve_mut()?.push(item);
        Ok(())
    }

    /// Remove everything. The list stays resolved.
    pub fn clear(&mut self) -> Result<()> {
        self.resolve_mut()?.clear();
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.resolve()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.resolve()?.is_empty())
    }

    /// Iterate over the items.
    pub fn iter(&self) -> Result<std::slice::Iter<'_, T>> {
        Ok(self.resolve()?.iter())
    }

    /// Borrow the items as a slice.
    pub fn as_slice(&self) -> Result<&[T]> {
        Ok(self.resolve()?.as_slice())
    }

    /// Copy the items into a new vector.
    pub fn to_vec(&self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        Ok(self.resolve()?.clone())
    }
}

impl<T: PartialEq> LazyList<T> {
    /// Position of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Result<Option<usize>> {
        Ok(self.resolve()?.iter().position(|x| x == item))
    }

    pub fn contains(&self, item: &T) -> Result<bool> {
        Ok(self.resolve()?.contains(item))
    }

    /// Remove the first item equal to `item`. Returns whether one was found.
    pub fn remove(&mut self, item: &T) -> Result<bool> {
        let items = self.resolve_mut()?;
        match items.iter().position(|x| x == item) {
            Some(index) => {
                items.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn out_of_range(index: usize, len: usize) -> Error {
    Error::Custom(format!(
        "index {} out of range for related collection of length {}",
        index, len
    ))
}

impl<T: fmt::Debug> fmt::Debug for LazyList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyList")
            .field("column", &self.column.name)
            .field("key", &self.key)
            .field("loaded", &self.loaded.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogicalType;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingLoader {
        calls: Rc<Cell<usize>>,
        rows: Vec<i32>,
    }

    impl RelatedLoader<i32> for CountingLoader {
        fn select_where(&self, column: &ColumnMeta, key: &Value) -> Result<Vec<i32>> {
            assert_eq!(column.name, "OrderId");
            assert_eq!(key, &Value::Int(10));
            self.calls.set(self.calls.get() + 1);
            Ok(self.rows.clone())
        }
    }

    fn list(rows: Vec<i32>) -> (LazyList<i32>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let loader = CountingLoader {
            calls: Rc::clone(&calls),
            rows,
        };
        let column = ColumnMeta::new("OrderId", LogicalType::Int32);
        (LazyList::new(Arc::new(loader), column, 10), calls)
    }

    #[test]
    fn test_unresolved_until_first_access() {
        let (lazy, calls) = list(vec![1, 2]);
        assert!(!lazy.is_resolved());
        assert_eq!(calls.get(), 0);

        assert_eq!(lazy.len().unwrap(), 2);
        assert!(lazy.is_resolved());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_fetches_once() {
        let (mut lazy, calls) = list(vec![1, 2, 3]);
        assert_eq!(lazy.get(0).unwrap(), Some(&1));
        assert_eq!(lazy.get(1).unwrap(), Some(&2));
        assert_eq!(calls.get(), 1);

        lazy.push(4).unwrap();
        assert_eq!(lazy.get(3).unwrap(), Some(&4));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_write_access_resolves_first() {
        let (mut lazy, calls) = list(vec![5]);
        lazy.push(6).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(lazy.to_vec().unwrap(), vec![5, 6]);

        let (mut lazy, calls) = list(vec![5]);
        lazy.clear().unwrap();
        assert_eq!(calls.get(), 1);
        assert!(lazy.is_empty().unwrap());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_list_operations() {
        let (mut lazy, _) = list(vec![1, 2, 3]);

        lazy.insert(0, 0).unwrap();
        lazy.set(3, 30).unwrap();
        assert_eq!(lazy.as_slice().unwrap(), &[0, 1, 2, 30]);

        assert_eq!(lazy.index_of(&2).unwrap(), Some(2));
        assert!(lazy.contains(&30).unwrap());
        assert!(lazy.remove(&1).unwrap());
        assert!(!lazy.remove(&1).unwrap());
        assert_eq!(lazy.remove_at(0).unwrap(), 0);
        assert_eq!(lazy.iter().unwrap().copied().collect::<Vec<_>>(), vec![2, 30]);
        assert!(!lazy.is_read_only());
    }

    #[test]
    fn test_out_of_range() {
        let (mut lazy, _) = list(vec![1]);
        assert!(lazy.set(1, 9).is_err());
        assert!(lazy.insert(2, 9).is_err());
        assert!(lazy.remove_at(1).is_err());
        assert_eq!(lazy.get(5).unwrap(), None);
    }

    #[test]
    fn test_loader_errors_leave_list_unresolved() {
        let loader = |_: &ColumnMeta, _: &Value| -> Result<Vec<i32>> {
            Err(Error::Custom("offline".to_string()))
        };
        let lazy = LazyList::new(
            Arc::new(loader),
            ColumnMeta::new("OrderId", LogicalType::Int32),
            1,
        );
        assert!(lazy.len().is_err());
        assert!(!lazy.is_resolved());
    }
}
