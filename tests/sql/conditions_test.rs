//! Filter parameters combined into WHERE clauses.

#[path = "../common/mod.rs"]
mod common;

use serde_json::{json, Value};

use autocrud::record::filters::{combine, combined_conditions, conditions_tree};
use autocrud::record::{Condition, Params};
use autocrud::schema::{CanonicalType, ReflectedColumn, ReflectedTable, TableKind};
use autocrud::sql::{ConditionsBuilder, Dialect, Select};

use common::validate_sql;

fn products() -> ReflectedTable {
    ReflectedTable::new(
        "products",
        TableKind::Table,
        vec![
            ReflectedColumn::new("id", CanonicalType::Integer, None, None, None).primary_key(true),
            ReflectedColumn::new("name", CanonicalType::Varchar, None, None, None),
            ReflectedColumn::new("price", CanonicalType::Decimal, None, Some(10), Some(2)),
            ReflectedColumn::new("visits", CanonicalType::Integer, None, None, None),
            ReflectedColumn::new("in_stock", CanonicalType::Boolean, None, None, None),
        ],
    )
}

fn where_clause(params: &Params, dialect: Dialect) -> Option<(String, Vec<Value>)> {
    let condition = combined_conditions(&products(), params);
    let ts = ConditionsBuilder::new(dialect).build(&condition)?;
    let stmt = ts.build(dialect);
    Some((stmt.sql, stmt.params))
}

#[test]
fn test_no_filters_no_where() {
    let params = Params::new().with("order", "id");
    assert!(where_clause(&params, Dialect::Postgres).is_none());
}

#[test]
fn test_plain_filters_are_anded() {
    let params = Params::new()
        .with("filter", "id,gt,1")
        .with("filter", "name,cs,duct");
    let (sql, params) = where_clause(&params, Dialect::Postgres).unwrap();
    assert_eq!(sql, "(\"id\" > $1 AND \"name\" LIKE $2)");
    assert_eq!(params, vec![json!(1), json!("%duct%")]);
}

#[test]
fn test_numbered_filters_are_ored() {
    let params = Params::new()
        .with("filter1", "id,eq,1")
        .with("filter2", "id,eq,2");
    let (sql, params) = where_clause(&params, Dialect::MySql).unwrap();
    assert_eq!(sql, "(`id` = ? OR `id` = ?)");
    assert_eq!(params, vec![json!(1), json!(2)]);
}

#[test]
fn test_nested_addresses() {
    // (visits IS NULL) AND ((id=1 AND in_stock) OR (id=2))
    let params = Params::new()
        .with("filter", "visits,is")
        .with("filter1", "id,eq,1")
        .with("filter1a", "in_stock,eq,1")
        .with("filter2", "id,eq,2");
    let (sql, params) = where_clause(&params, Dialect::Postgres).unwrap();
    assert_eq!(
        sql,
        "(\"visits\" IS NULL AND ((\"id\" = $1 AND \"in_stock\" = $2) OR \"id\" = $3))"
    );
    assert_eq!(params, vec![json!(1), json!(true), json!(2)]);
}

#[test]
fn test_address_runs_split_on_digits() {
    let tree = conditions_tree(
        &products(),
        &Params::new()
            .with("filter12", "id,eq,12")
            .with("filter12b3", "id,eq,123"),
    );
    let node = tree.get("12").unwrap();
    assert_eq!(node.values().len(), 1);
    let leaf = node.get("b").and_then(|b| b.get("3")).unwrap();
    assert_eq!(leaf.values().len(), 1);
    assert!(!combine(&tree).is_no());
}

#[test]
fn test_unparseable_filters_are_dropped() {
    let params = Params::new()
        .with("filter", "color,eq,red")
        .with("filter", "id,zz,1")
        .with("filter", "id")
        .with("filter", "id,le,5");
    let (sql, params) = where_clause(&params, Dialect::Sqlite).unwrap();
    assert_eq!(sql, "\"id\" <= ?");
    assert_eq!(params, vec![json!(5)]);
}

#[test]
fn test_negated_operators() {
    let params = Params::new()
        .with("filter", "name,nsw,A")
        .with("filter", "id,nin,1,2");
    let (sql, params) = where_clause(&params, Dialect::TSql).unwrap();
    assert_eq!(sql, "((NOT [name] LIKE @P1 ESCAPE '\\') AND (NOT [id] IN (@P2,@P3)))");
    assert_eq!(params, vec![json!("A%"), json!(1), json!(2)]);
}

#[test]
fn test_decimal_keeps_text() {
    let params = Params::new().with("filter", "price,bt,1.50,3.00");
    let (sql, params) = where_clause(&params, Dialect::Postgres).unwrap();
    assert_eq!(sql, "(\"price\" >= $1 AND \"price\" <= $2)");
    assert_eq!(params, vec![json!("1.50"), json!("3.00")]);
}

#[test]
fn test_conditions_render_inside_select_for_every_dialect() {
    let params = Params::new()
        .with("filter", "name,ew,x")
        .with("filter1", "in_stock,eq,true")
        .with("filter2", "visits,bt,1,10");
    for dialect in [Dialect::MySql, Dialect::Postgres, Dialect::TSql, Dialect::Sqlite] {
        let condition = combined_conditions(&products(), &params);
        let filter = ConditionsBuilder::new(dialect).build(&condition);
        let stmt = Select::from("products").filter(filter).build(dialect);
        validate_sql(&stmt.sql, dialect);
        assert_eq!(stmt.params.len(), 4, "{}", dialect);
    }
}

#[test]
fn test_no_condition_is_identity() {
    let id = Condition::from_filter(&products(), "id,eq,1");
    assert_eq!(Condition::No.and(id.clone()), id);
    assert_eq!(id.clone().or(Condition::No), id);
    assert!(Condition::No.not().is_no());
}
