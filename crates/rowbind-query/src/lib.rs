//! Statement synthesis for rowbind.
//!
//! `rowbind-query` turns a record plus its table metadata into INSERT, UPDATE
//! and DELETE descriptors, renders them as parameterized SQL for a
//! [`Dialect`], and connects the lazy related collections of
//! `rowbind-core` to an [`Executor`].

pub mod constraint;
pub mod dialect;
pub mod executor;
pub mod statement;
pub mod synth;

pub use constraint::{Constraint, ConstraintKind, to_constraint_list};
pub use dialect::Dialect;
pub use executor::{Executor, QueryLoader};
pub use statement::{
    Assignment, DeleteStatement, InsertStatement, SelectStatement, Statement, UpdateStatement,
    select_where,
};
pub use synth::{
    build_delete, build_insert, build_update, to_delete_statement, to_insert_statement,
    to_update_statement,
};
