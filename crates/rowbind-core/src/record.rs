//! Record capability for name-based member access.
//!
//! A [`Record`] exposes its members by name so the mapper and the statement
//! synthesizer can work on any caller-defined type. Name lookup is
//! case-insensitive and resolved once per type into a [`RecordShape`].

use crate::Result;
use crate::types::{TypeInfo, ValueKind};
use crate::value::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Whether a member is a property or a plain field.
///
/// Properties are matched first, fields only when no property matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Field,
}

/// Declared type of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberType {
    /// Runtime kind of the member (the inner kind for `Option<T>`)
    pub kind: ValueKind,
    /// Whether the member is an `Option`
    pub nullable: bool,
}

impl MemberType {
    /// Non-nullable member of the given kind.
    pub const fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    /// Member type of a Rust type.
    pub const fn of<T: TypeInfo>() -> Self {
        Self {
            kind: T::KIND,
            nullable: T::NULLABLE,
        }
    }

    /// Mark this member as nullable.
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Check if the member is an enumeration.
    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, ValueKind::Enum(_))
    }
}

/// Metadata about one record member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberInfo {
    /// Member name as matched against column names
    pub name: &'static str,
    pub kind: MemberKind,
    pub ty: MemberType,
}

impl MemberInfo {
    /// Describe a property.
    pub const fn property(name: &'static str, ty: MemberType) -> Self {
        Self {
            name,
            kind: MemberKind::Property,
            ty,
        }
    }

    /// Describe a plain field.
    pub const fn field(name: &'static str, ty: MemberType) -> Self {
        Self {
            name,
            kind: MemberKind::Field,
            ty,
        }
    }

    /// Check if this member is a property.
    pub const fn is_property(&self) -> bool {
        matches!(self.kind, MemberKind::Property)
    }
}

/// Trait for types that can be read from and written to by member name.
///
/// # Example
///
/// ```
/// use rowbind_core::{MemberInfo, MemberType, Record, Result, Value, FromValue};
///
/// #[derive(Default)]
/// struct Tag {
///     id: i32,
///     label: String,
/// }
///
/// impl Record for Tag {
///     const TABLE_NAME: &'static str = "Tags";
///
///     fn members() -> &'static [MemberInfo] {
///         const MEMBERS: &[MemberInfo] = &[
///             MemberInfo::property("Id", MemberType::of::<i32>()),
///             MemberInfo::property("Label", MemberType::of::<String>()),
///         ];
///         MEMBERS
///     }
///
///     fn get(&self, name: &str) -> Option<Value> {
///         match name {
///             "Id" => Some(self.id.into()),
///             "Label" => Some(self.label.clone().into()),
///             _ => None,
///         }
///     }
///
///     fn set(&mut self, name: &str, value: Value) -> Result<()> {
///         match name {
///             "Id" => self.id = i32::from_value(&value)?,
///             "Label" => self.label = String::from_value(&value)?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Record: 'static {
    /// Name of the backing table.
    const TABLE_NAME: &'static str;

    /// Primary-key property, when it is neither `Id` nor `<TypeName>Id`.
    const PRIMARY_KEY: Option<&'static str> = None;

    /// All members in declaration order.
    fn members() -> &'static [MemberInfo];

    /// Read a member by its declared name.
    fn get(&self, name: &str) -> Option<Value>;

    /// Write a member by its declared name.
    ///
    /// The mapper converts `value` to the member's kind before calling this
    /// (enumerations arrive as their underlying integer). NULL is never
    /// passed by the mapper.
    fn set(&mut self, name: &str, value: Value) -> Result<()>;

    /// Property name to value map, in declaration order.
    ///
    /// Fields are not included.
    fn to_values(&self) -> Vec<(&'static str, Value)> {
        Self::members()
            .iter()
            .filter(|m| m.is_property())
            .filter_map(|m| self.get(m.name).map(|v| (m.name, v)))
            .collect()
    }

    /// The active-record capability, when this record carries one.
    fn active_record(&self) -> Option<&dyn ActiveRecord> {
        None
    }

    /// Mutable access to the active-record capability.
    fn active_record_mut(&mut self) -> Option<&mut dyn ActiveRecord> {
        None
    }
}

/// Optional dirty tracking and load state on a record.
pub trait ActiveRecord {
    /// Columns changed since the record was loaded.
    fn dirty_columns(&self) -> Vec<String>;

    fn is_loaded(&self) -> bool;

    fn is_new(&self) -> bool;

    fn set_loaded(&mut self, loaded: bool);

    fn set_new(&mut self, new: bool);
}

/// Plain active-record state a record can embed and delegate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordState {
    loaded: bool,
    new: bool,
    dirty: Vec<String>,
}

impl Default for RecordState {
    fn default() -> Self {
        Self {
            loaded: false,
            new: true,
            dirty: Vec::new(),
        }
    }
}

impl RecordState {
    /// Record a changed column. Repeated names are kept once.
    pub fn mark_dirty(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.dirty.iter().any(|c| c.eq_ignore_ascii_case(&column)) {
            self.dirty.push(column);
        }
    }

    /// Forget all changes.
    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }
}

impl ActiveRecord for RecordState {
    fn dirty_columns(&self) -> Vec<String> {
        self.dirty.clone()
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn is_new(&self) -> bool {
        self.new
    }

    fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    fn set_new(&mut self, new: bool) {
        self.new = new;
    }
}

/// Case-insensitive member index of a record type.
#[derive(Debug)]
pub struct RecordShape {
    members: &'static [MemberInfo],
    properties: HashMap<String, usize>,
    fields: HashMap<String, usize>,
}

impl RecordShape {
    fn build(members: &'static [MemberInfo]) -> Self {
        let mut properties = HashMap::new();
        let mut fields = HashMap::new();
        for (i, member) in members.iter().enumerate() {
            let index = match member.kind {
                MemberKind::Property => &mut properties,
                MemberKind::Field => &mut fields,
            };
            // First declaration wins when two members differ only by case
            index.entry(member.name.to_ascii_lowercase()).or_insert(i);
        }
        Self {
            members,
            properties,
            fields,
        }
    }

    /// Shape of `T`, resolved once and shared afterwards.
    pub fn of<T: Record>() -> Arc<RecordShape> {
        static CACHE: OnceLock<RwLock<HashMap<TypeId, Arc<RecordShape>>>> = OnceLock::new();
        let cache = CACHE.get_or_init(|| RwLock::new(HashMap::new()));

        {
            let shapes = cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(shape) = shapes.get(&TypeId::of::<T>()) {
                return Arc::clone(shape);
            }
        }

        let mut shapes = cache.write().unwrap_or_else(|e| e.into_inner());
        let shape = shapes.entry(TypeId::of::<T>()).or_insert_with(|| {
            tracing::trace!(
                record = std::any::type_name::<T>(),
                members = T::members().len(),
                "Resolved record shape"
            );
            Arc::new(RecordShape::build(T::members()))
        });
        Arc::clone(shape)
    }

    /// Find a property by case-insensitive name.
    pub fn property(&self, name: &str) -> Option<&'static MemberInfo> {
        let members = self.members;
        self.properties
            .get(&name.to_ascii_lowercase())
            .map(|&i| &members[i])
    }

    /// Find a field by case-insensitive name.
    pub fn field(&self, name: &str) -> Option<&'static MemberInfo> {
        let members = self.members;
        self.fields.get(&name.to_ascii_lowercase()).map(|&i| &members[i])
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &'static MemberInfo> {
        self.members.iter().filter(|m| m.is_property())
    }

    /// All members in declaration order.
    pub fn members(&self) -> &'static [MemberInfo] {
        self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::FromValue;
    use crate::types::EnumRepr;

    #[derive(Default)]
    struct Sample {
        id: i32,
        name: Option<String>,
        hits: i64,
        state: RecordState,
    }

    impl Record for Sample {
        const TABLE_NAME: &'static str = "Samples";

        fn members() -> &'static [MemberInfo] {
            const MEMBERS: &[MemberInfo] = &[
                MemberInfo::property("Id", MemberType::of::<i32>()),
                MemberInfo::property("Name", MemberType::of::<Option<String>>()),
                MemberInfo::field("hits", MemberType::of::<i64>()),
            ];
            MEMBERS
        }

        fn get(&self, name: &str) -> Option<Value> {
            match name {
                "Id" => Some(self.id.into()),
                "Name" => Some(self.name.clone().into()),
                "hits" => Some(self.hits.into()),
                _ => None,
            }
        }

        fn set(&mut self, name: &str, value: Value) -> Result<()> {
            match name {
                "Id" => self.id = i32::from_value(&value)?,
                "Name" => self.name = Option::<String>::from_value(&value)?,
                "hits" => self.hits = i64::from_value(&value)?,
                _ => {}
            }
            Ok(())
        }

        fn active_record(&self) -> Option<&dyn ActiveRecord> {
            Some(&self.state)
        }

        fn active_record_mut(&mut self) -> Option<&mut dyn ActiveRecord> {
            Some(&mut self.state)
        }
    }

    #[test]
    fn test_shape_lookup_ignores_case() {
        let shape = RecordShape::of::<Sample>();
        assert_eq!(shape.property("id").map(|m| m.name), Some("Id"));
        assert_eq!(shape.property("NAME").map(|m| m.name), Some("Name"));
        assert!(shape.property("hits").is_none());
        assert_eq!(shape.field("HITS").map(|m| m.name), Some("hits"));
        assert_eq!(shape.properties().count(), 2);
    }

    struct Measure;

    impl Record for Measure {
        const TABLE_NAME: &'static str = "Measures";

        fn members() -> &'static [MemberInfo] {
            const MEMBERS: &[MemberInfo] =
                &[MemberInfo::property("Größe", MemberType::of::<i32>())];
            MEMBERS
        }

        fn get(&self, _name: &str) -> Option<Value> {
            None
        }

        fn set(&mut self, _name: &str, _value: Value) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_shape_folds_ascii_letters_only() {
        let shape = RecordShape::of::<Measure>();
        assert_eq!(shape.property("GRößE").map(|m| m.name), Some("Größe"));
        assert!(shape.property("GRÖßE").is_none());
    }

    #[test]
    fn test_shape_is_cached() {
        let a = RecordShape::of::<Sample>();
        let b = RecordShape::of::<Sample>();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_to_values_lists_properties_in_order() {
        let sample = Sample {
            id: 4,
            name: None,
            hits: 9,
            state: RecordState::default(),
        };
        let values = sample.to_values();
        assert_eq!(
            values,
            vec![("Id", Value::Int(4)), ("Name", Value::Null)]
        );
    }

    #[test]
    fn test_member_type_of() {
        let ty = MemberType::of::<Option<String>>();
        assert_eq!(ty.kind, ValueKind::Text);
        assert!(ty.nullable);
        assert!(MemberType::new(ValueKind::Enum(EnumRepr::I32)).is_enum());
    }

    #[test]
    fn test_record_state() {
        let mut state = RecordState::default();
        assert!(state.is_new());
        assert!(!state.is_loaded());
        state.mark_dirty("Name");
        state.mark_dirty("name");
        assert_eq!(state.dirty_columns(), vec!["Name".to_string()]);
        state.mark_clean();
        assert!(state.dirty_columns().is_empty());
    }
}
