//! Row mapper: populate records from a result cursor.
//!
//! Columns are matched to record members by case-insensitive name. Properties
//! are tried first, then an optional positional fallback name, then fields.
//! Columns without a matching member and NULL values are skipped.

use crate::Result;
use crate::cursor::Cursor;
use crate::error::{Error, TypeError};
use crate::record::{MemberInfo, Record, RecordShape};
use crate::row::FromValue;
use crate::types::{TypeInfo, ValueKind};
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Callback invoked with every record the mapper materializes.
pub type ItemCreatedHook = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Materializes records and scalars from cursors.
///
/// The mapper holds no per-call state and can be shared across threads.
#[derive(Clone, Default)]
pub struct DataMapper {
    on_item_created: Option<ItemCreatedHook>,
}

impl fmt::Debug for DataMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataMapper")
            .field("on_item_created", &self.on_item_created.is_some())
            .finish()
    }
}

impl DataMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked with each materialized item.
    pub fn on_item_created<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Any) + Send + Sync + 'static,
    {
        self.on_item_created = Some(Arc::new(hook));
        self
    }

    fn item_created(&self, item: &dyn Any) {
        if let Some(hook) = &self.on_item_created {
            hook(item);
        }
    }

    /// Read every remaining row into a fresh `T`.
    #[tracing::instrument(level = "trace", skip(self, cursor), fields(record = std::any::type_name::<T>()))]
    pub fn map_all<T, C>(&self, cursor: &mut C) -> Result<Vec<T>>
    where
        T: Record + Default,
        C: Cursor + ?Sized,
    {
        let mut items = Vec::new();
        while cursor.advance()? {
            let mut item = T::default();
            load(&*cursor, &mut item, None)?;
            self.item_created(&item);
            items.push(item);
        }
        tracing::debug!(
            table = T::TABLE_NAME,
            rows = items.len(),
            "Materialized records"
        );
        Ok(items)
    }

    /// Populate `item` from the cursor's current row.
    ///
    /// `fallback` supplies a member name per column position, used when the
    /// cursor's column name matches no property.
    pub fn map_one<T, C>(&self, cursor: &C, item: &mut T, fallback: Option<&[String]>) -> Result<()>
    where
        T: Record,
        C: Cursor + ?Sized,
    {
        load(cursor, item, fallback)
    }

    /// Read every remaining row as a `T`, one element per row.
    pub fn map_enumerable<T, C>(&self, cursor: &mut C, fallback: Option<&[String]>) -> Result<Vec<T>>
    where
        T: Enumerable,
        C: Cursor + ?Sized,
    {
        let mut items = Vec::new();
        while cursor.advance()? {
            let item = T::read(&*cursor, fallback)?;
            self.item_created(&item);
            items.push(item);
        }
        tracing::debug!(
            item = std::any::type_name::<T>(),
            rows = items.len(),
            "Materialized sequence"
        );
        Ok(items)
    }

    /// Read column 0 of every remaining row as a value type.
    ///
    /// 16/32/64-bit integers go through numeric conversion; every other type
    /// must already be stored as that type.
    pub fn map_scalar_sequence<T, C>(&self, cursor: &mut C) -> Result<Vec<T>>
    where
        T: FromValue + TypeInfo,
        C: Cursor + ?Sized,
    {
        let mut items = Vec::new();
        while cursor.advance()? {
            items.push(read_value_type::<T, C>(&*cursor)?);
        }
        tracing::debug!(
            item = std::any::type_name::<T>(),
            rows = items.len(),
            "Materialized scalar sequence"
        );
        Ok(items)
    }
}

fn read_value_type<T, C>(cursor: &C) -> Result<T>
where
    T: FromValue + TypeInfo,
    C: Cursor + ?Sized,
{
    let value = cursor.value(0)?;
    if matches!(T::KIND, ValueKind::I16 | ValueKind::I32 | ValueKind::I64) {
        return T::from_value(&value);
    }
    let stored = match &value {
        Value::Null => T::NULLABLE,
        v => stores_kind(v, T::KIND),
    };
    if stored {
        T::from_value(&value)
    } else {
        let mut err = TypeError::new(T::KIND.name(), value.type_name());
        if let Some(name) = cursor.column_name(0) {
            err = err.in_column(name);
        }
        err.rust_type = Some(std::any::type_name::<T>());
        Err(Error::Type(err))
    }
}

fn stores_kind(value: &Value, kind: ValueKind) -> bool {
    match (value, kind) {
        (Value::SmallInt(_), ValueKind::U8)
        | (Value::Int(_), ValueKind::U16)
        | (Value::BigInt(_), ValueKind::U32 | ValueKind::U64) => true,
        (v, k) => v.kind() == Some(k),
    }
}

/// Types [`DataMapper::map_enumerable`] can produce from one row.
///
/// Core scalars read column 0. Records implement this with [`read_record`];
/// projections with [`read_projection`] and an explicit constructor.
pub trait Enumerable: Sized + 'static {
    /// Build one element from the cursor's current row.
    fn read<C: Cursor + ?Sized>(cursor: &C, fallback: Option<&[String]>) -> Result<Self>;
}

macro_rules! impl_enumerable_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Enumerable for $ty {
                fn read<C: Cursor + ?Sized>(cursor: &C, _fallback: Option<&[String]>) -> Result<Self> {
                    read_scalar(cursor)
                }
            }

            impl Enumerable for Option<$ty> {
                fn read<C: Cursor + ?Sized>(cursor: &C, _fallback: Option<&[String]>) -> Result<Self> {
                    read_scalar(cursor)
                }
            }
        )*
    };
}

impl_enumerable_scalar!(
    String,
    i16,
    i32,
    i64,
    rust_decimal::Decimal,
    f64,
    chrono::NaiveDateTime,
    [u8; 16],
    bool,
);

fn read_scalar<T: FromValue, C: Cursor + ?Sized>(cursor: &C) -> Result<T> {
    let value = cursor.value(0)?;
    T::from_value(&value).map_err(|e| match (e, cursor.column_name(0)) {
        (Error::Type(te), Some(name)) => Error::Type(te.in_column(name)),
        (e, _) => e,
    })
}

/// Default-construct a record and populate it from the current row.
pub fn read_record<T, C>(cursor: &C, fallback: Option<&[String]>) -> Result<T>
where
    T: Record + Default,
    C: Cursor + ?Sized,
{
    let mut item = T::default();
    load(cursor, &mut item, fallback)?;
    Ok(item)
}

/// Read the named columns in `member_order` and hand them to `factory`.
///
/// Column names are matched case-insensitively; a missing column is an error.
pub fn read_projection<T, C, F>(cursor: &C, member_order: &[&str], factory: F) -> Result<T>
where
    C: Cursor + ?Sized,
    F: FnOnce(Vec<Value>) -> Result<T>,
{
    let mut values = Vec::with_capacity(member_order.len());
    for name in member_order {
        let index = column_index(cursor, name).ok_or_else(|| {
            Error::Custom(format!("column '{}' not found in result", name))
        })?;
        values.push(cursor.value(index)?);
    }
    factory(values)
}

fn column_index<C: Cursor + ?Sized>(cursor: &C, name: &str) -> Option<usize> {
    (0..cursor.column_count())
        .find(|&i| cursor.column_name(i).is_some_and(|c| c.eq_ignore_ascii_case(name)))
}

/// Read every remaining row into a fresh `T`.
pub fn to_list<T, C>(cursor: &mut C) -> Result<Vec<T>>
where
    T: Record + Default,
    C: Cursor + ?Sized,
{
    DataMapper::new().map_all(cursor)
}

/// Populate `item` from the cursor's current row.
///
/// After all columns are processed a record with the active-record
/// capability is marked loaded and not new.
pub fn load<T, C>(cursor: &C, item: &mut T, fallback: Option<&[String]>) -> Result<()>
where
    T: Record,
    C: Cursor + ?Sized,
{
    let shape = RecordShape::of::<T>();

    for i in 0..cursor.column_count() {
        let column = cursor.column_name(i).unwrap_or_default();

        let mut property = shape.property(column);
        if property.is_none() {
            if let Some(name) = fallback.and_then(|names| names.get(i)) {
                property = shape.properties().find(|m| m.name == name.as_str());
            }
        }
        let field = if property.is_none() {
            shape.field(column)
        } else {
            None
        };

        let Some(member) = property.or(field) else {
            tracing::trace!(column, "No member matches column; skipping");
            continue;
        };

        let value = cursor.value(i)?;
        if value.is_null() {
            tracing::trace!(column, member = member.name, "NULL value; leaving member unset");
            continue;
        }

        let assigned = if member.is_property() {
            coerce_property(cursor, i, member, value)
        } else {
            coerce_field(cursor, i, member, value)
        }
        .map_err(|e| match e {
            Error::Type(te) => Error::Type(te.in_column(column)),
            e => e,
        })?;

        item.set(member.name, assigned)?;
    }

    if let Some(active) = item.active_record_mut() {
        active.set_loaded(true);
        active.set_new(false);
    }
    Ok(())
}

/// Boolean read from its text form: only `"1"` and `"True"` are true.
fn bool_from_text(value: &Value) -> Value {
    let text = value.render_text().unwrap_or_default();
    Value::Bool(text == "1" || text == "True")
}

fn is_boolean_like(member: &MemberInfo, value: &Value) -> bool {
    matches!(value, Value::Bool(_))
        || (member.ty.kind == ValueKind::Bool && matches!(value, Value::Text(_)))
}

fn coerce_property<C: Cursor + ?Sized>(
    cursor: &C,
    index: usize,
    member: &MemberInfo,
    value: Value,
) -> Result<Value> {
    let kind = member.ty.kind;
    if is_boolean_like(member, &value) {
        let flag = bool_from_text(&value);
        return if kind == ValueKind::Bool {
            Ok(flag)
        } else {
            flag.convert_to(kind)
        };
    }
    match kind {
        ValueKind::Uuid => cursor.get_uuid(index).map(Value::Uuid),
        // Nullable and non-nullable enumerations both arrive as the
        // underlying integer
        ValueKind::Enum(repr) => value.convert_to(repr.kind()),
        _ if value.kind() == Some(kind) => Ok(value),
        _ => value.convert_to(kind),
    }
}

fn coerce_field<C: Cursor + ?Sized>(
    cursor: &C,
    index: usize,
    member: &MemberInfo,
    value: Value,
) -> Result<Value> {
    if is_boolean_like(member, &value) {
        return Ok(bool_from_text(&value));
    }
    match member.ty.kind {
        ValueKind::Uuid => cursor.get_uuid(index).map(Value::Uuid),
        ValueKind::Enum(repr) if member.ty.nullable => value.convert_to(repr.kind()),
        // Fields convert to the value's own type
        _ => Ok(value),
    }
}
