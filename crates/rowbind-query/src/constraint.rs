//! Filter constraints for UPDATE, DELETE and SELECT.
//!
//! Constraints are kept as an ordered list. The first one is expected to be
//! a `Where`; the rest are `And` or `Or`. Nothing enforces this ordering, so
//! the renderer treats a leading non-`Where` constraint as `Where`.

use crate::dialect::Dialect;
use rowbind_core::{Record, Value};
use serde::Serialize;

/// How a constraint joins the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstraintKind {
    Where,
    And,
    Or,
}

impl ConstraintKind {
    /// SQL keyword for this kind.
    pub const fn as_sql(self) -> &'static str {
        match self {
            ConstraintKind::Where => "WHERE",
            ConstraintKind::And => "AND",
            ConstraintKind::Or => "OR",
        }
    }
}

/// One equality predicate of a filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// Column the predicate targets
    pub column_name: String,
    /// Name of the bound parameter
    pub parameter_name: String,
    /// Value the column must equal
    pub parameter_value: Value,
    /// Raw filter fragment rendered on the left-hand side
    pub construction_fragment: String,
}

impl Constraint {
    /// Equality constraint on `column`. Parameter name and fragment are the
    /// column name.
    pub fn new(kind: ConstraintKind, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        Self {
            kind,
            parameter_name: column.clone(),
            construction_fragment: column.clone(),
            column_name: column,
            parameter_value: value.into(),
        }
    }

    /// Shorthand for a `Where` constraint.
    pub fn where_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(ConstraintKind::Where, column, value)
    }

    /// Shorthand for an `And` constraint.
    pub fn and_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(ConstraintKind::And, column, value)
    }

    /// Shorthand for an `Or` constraint.
    pub fn or_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(ConstraintKind::Or, column, value)
    }
}

/// Turn every property of `item` into an equality constraint.
///
/// The first property becomes `Where`, every later one `And`, in property
/// declaration order.
pub fn to_constraint_list<T: Record>(item: &T) -> Vec<Constraint> {
    item.to_values()
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let kind = if i == 0 {
                ConstraintKind::Where
            } else {
                ConstraintKind::And
            };
            Constraint::new(kind, name, value)
        })
        .collect()
}

/// Render constraints as a filter clause with a leading space.
///
/// Placeholders are numbered from `offset + 1`. NULL values render as
/// `IS NULL` and bind no parameter.
pub(crate) fn render_constraints(
    constraints: &[Constraint],
    dialect: Dialect,
    offset: usize,
) -> (String, Vec<Value>) {
    let mut sql = String::new();
    let mut params = Vec::new();

    for (i, constraint) in constraints.iter().enumerate() {
        let keyword = if i == 0 {
            if constraint.kind != ConstraintKind::Where {
                tracing::warn!(
                    kind = ?constraint.kind,
                    column = %constraint.column_name,
                    "First constraint is not WHERE; rendering as WHERE"
                );
            }
            ConstraintKind::Where.as_sql()
        } else {
            constraint.kind.as_sql()
        };

        let lhs = dialect.quote_identifier(&constraint.construction_fragment);
        if constraint.parameter_value.is_null() {
            sql.push_str(&format!(" {} {} IS NULL", keyword, lhs));
        } else {
            params.push(constraint.parameter_value.clone());
            let placeholder = dialect.placeholder(offset + params.len());
            sql.push_str(&format!(" {} {} = {}", keyword, lhs, placeholder));
        }
    }

    (sql, params)
}
