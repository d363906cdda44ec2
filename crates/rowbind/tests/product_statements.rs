mod common;

use common::{MemoryExecutor, Product, chai};
use rowbind::prelude::*;
use rowbind::{ConstraintKind, LogicalType, build_insert};

#[test]
fn product_table_is_derived_with_conventional_key() {
    let registry = SchemaRegistry::new();
    let table = registry.resolve_or_create_table::<Product>().unwrap();

    assert_eq!(table.name(), "Products");
    assert_eq!(table.columns().len(), 6);

    let pk = table.primary_key().unwrap();
    assert_eq!(pk.name, "ProductID");
    assert!(pk.auto_increment);
    assert_eq!(pk.logical_type, LogicalType::Int32);

    let category = table.column("categoryid").unwrap();
    assert!(category.nullable);
    assert_eq!(category.table, "Products");

    // Cached after the first resolution
    assert!(registry.get::<Product>().is_some());
    assert_eq!(registry.len(), 1);
}

#[test]
fn update_assigns_every_writable_column_and_filters_on_key() {
    let registry = SchemaRegistry::new();
    let stmt = to_update_statement(&chai(), &registry).unwrap();

    assert_eq!(stmt.table(), "Products");
    assert_eq!(stmt.assignments().len(), 5);
    assert!(stmt.assignments().iter().all(|a| a.column != "ProductID"));

    assert_eq!(stmt.constraints().len(), 1);
    let key = &stmt.constraints()[0];
    assert_eq!(key.kind, ConstraintKind::Where);
    assert_eq!(key.column_name, "ProductID");
    assert_eq!(key.parameter_value, Value::Int(1));
}

#[test]
fn update_of_active_record_assigns_dirty_columns_only() {
    let mut item = chai();
    let mut state = RecordState::default();
    state.mark_dirty("UnitPrice");
    item.state = Some(state);

    let registry = SchemaRegistry::new();
    let stmt = to_update_statement(&item, &registry).unwrap();
    let columns: Vec<_> = stmt.assignments().iter().map(|a| a.column).collect();
    assert_eq!(columns, vec!["UnitPrice"]);

    let (sql, params) = stmt.to_sql(Dialect::Postgres).unwrap();
    assert_eq!(
        sql,
        "UPDATE \"Products\" SET \"UnitPrice\" = $1 WHERE \"ProductID\" = $2"
    );
    assert_eq!(params[1], Value::Int(1));
}

#[test]
fn clean_active_record_update_is_skipped() {
    let mut item = chai();
    item.state = Some(RecordState::default());

    let registry = SchemaRegistry::new();
    let stmt = to_update_statement(&item, &registry).unwrap();
    assert!(stmt.assignments().is_empty());
    assert!(stmt.is_noop());
    assert!(stmt.to_sql(Dialect::Postgres).is_err());

    let executor = MemoryExecutor::new(Dialect::Postgres);
    assert_eq!(executor.execute_statement(&stmt).unwrap(), 0);
    assert!(executor.executed().is_empty());
}

#[test]
fn insert_skips_auto_increment_key() {
    let registry = SchemaRegistry::new();
    let stmt = to_insert_statement(&chai(), &registry).unwrap();

    let columns: Vec<_> = stmt.assignments().iter().map(|a| a.column).collect();
    assert_eq!(
        columns,
        vec!["ProductName", "Sku", "Discontinued", "UnitPrice", "CategoryID"]
    );
    assert_eq!(stmt.assignments()[1].logical_type, LogicalType::Guid);
    assert_eq!(stmt.assignments()[0].qualified_name, "\"Products\".\"ProductName\"");
}

#[test]
fn delete_filters_on_key_only() {
    let registry = SchemaRegistry::new();
    let stmt = to_delete_statement(&chai(), &registry).unwrap();

    assert_eq!(stmt.constraints().len(), 1);
    assert_eq!(stmt.constraints()[0].parameter_value, Value::Int(1));

    let (sql, params) = stmt.to_sql(Dialect::Sqlite).unwrap();
    assert_eq!(sql, "DELETE FROM \"Products\" WHERE \"ProductID\" = ?1");
    assert_eq!(params, vec![Value::Int(1)]);
}

#[test]
fn registered_table_overrides_derived_metadata() {
    let registry = SchemaRegistry::new();
    let table = TableMeta::builder("Products")
        .column(rowbind::ColumnMeta::new("ProductID", LogicalType::Int32).primary_key(true))
        .column(rowbind::ColumnMeta::new("ProductName", LogicalType::String).read_only(true))
        .column(rowbind::ColumnMeta::new("UnitPrice", LogicalType::Currency))
        .build()
        .unwrap();
    registry.register::<Product>(table);

    let insert = to_insert_statement(&chai(), &registry).unwrap();
    let columns: Vec<_> = insert.assignments().iter().map(|a| a.column).collect();
    // Key is not auto-increment here; read-only and unknown columns drop out
    assert_eq!(columns, vec!["ProductID", "UnitPrice"]);
    assert_eq!(insert.assignments()[1].logical_type, LogicalType::Currency);

    let resolved = registry.resolve_or_create_table::<Product>().unwrap();
    assert_eq!(build_insert(&chai(), &resolved), insert);
}

#[test]
fn statements_serialize_for_the_execution_layer() {
    let registry = SchemaRegistry::new();
    let stmt = to_update_statement(&chai(), &registry).unwrap();

    let json = serde_json::to_value(&stmt).unwrap();
    assert_eq!(json["table"], "Products");
    assert_eq!(json["assignments"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["constraints"][0]["column_name"], "ProductID");
}
