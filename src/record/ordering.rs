//! `order` parameters.

use super::params::Params;
use crate::schema::ReflectedTable;
use crate::sql::OrderByExpr;

/// Primary key ascending, or every column ascending for keyless tables.
pub fn default_ordering(table: &ReflectedTable) -> Vec<OrderByExpr> {
    match table.pk() {
        Some(pk) => vec![OrderByExpr::asc(&pk.name)],
        None => table
            .columns()
            .map(|c| OrderByExpr::asc(&c.name))
            .collect(),
    }
}

/// Requested ordering: `order=column[,asc|desc]`, repeatable.
///
/// Unknown columns are skipped; with nothing left the default ordering applies.
pub fn column_ordering(table: &ReflectedTable, params: &Params) -> Vec<OrderByExpr> {
    let mut exprs = Vec::new();
    for order in params.get_all("order") {
        let mut parts = order.splitn(3, ',');
        let column = parts.next().unwrap_or_default();
        if !table.has_column(column) {
            continue;
        }
        let descending = parts
            .next()
            .is_some_and(|dir| dir.trim().to_uppercase().starts_with("DESC"));
        exprs.push(if descending {
            OrderByExpr::desc(column)
        } else {
            OrderByExpr::asc(column)
        });
    }
    if exprs.is_empty() {
        return default_ordering(table);
    }
    exprs
}
