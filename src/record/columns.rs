//! `include` / `exclude` column selection.
//!
//! Selectors are `*.*`, `table.*`, `table.column`, and for the table the
//! request is about also `*` and `column`. Only the first value of each
//! parameter counts. Mandatory columns (`mandatory` entries, `table.column`)
//! are added back in a final pass, whatever the selectors said.

use std::collections::HashSet;

use super::params::Params;
use crate::db::Row;
use crate::schema::{ReflectedDatabase, ReflectedTable};

fn selectors(params: &Params, name: &str) -> Option<HashSet<String>> {
    params
        .first(name)
        .map(|list| list.split(',').map(|s| s.trim().to_string()).collect())
}

fn matches(selectors: &HashSet<String>, table: &str, column: &str, primary: bool) -> bool {
    selectors.contains("*.*")
        || selectors.contains(&format!("{table}.*"))
        || selectors.contains(&format!("{table}.{column}"))
        || (primary && (selectors.contains("*") || selectors.contains(column)))
}

/// Selected column names of `table`, in table order.
pub fn column_names(table: &ReflectedTable, primary: bool, params: &Params) -> Vec<String> {
    let include = selectors(params, "include");
    let exclude = selectors(params, "exclude");
    let mandatory: HashSet<&str> = params.get_all("mandatory").iter().map(String::as_str).collect();
    let name = table.name();

    table
        .columns()
        .map(|c| c.name.as_str())
        .filter(|column| {
            let included = include
                .as_ref()
                .is_none_or(|s| matches(s, name, column, primary));
            let excluded = exclude
                .as_ref()
                .is_some_and(|s| matches(s, name, column, primary));
            (included && !excluded) || mandatory.contains(format!("{name}.{column}").as_str())
        })
        .map(str::to_string)
        .collect()
}

/// Drop the columns of `table` from `record`, keeping joined fields.
///
/// The engine reads every column for an empty selection, so records whose
/// selectors matched nothing are emptied here.
pub fn strip_columns(table: &ReflectedTable, record: &mut Row) {
    record.retain(|name, _| !table.has_column(name));
}

/// Add the key columns every requested join needs to `mandatory`.
///
/// Only applies when both `join` and `include` are given; without an
/// include list every column is selected anyway.
pub fn add_mandatory_columns(db: &ReflectedDatabase, table: &ReflectedTable, params: &mut Params) {
    if !params.contains("join") || !params.contains("include") {
        return;
    }
    let mut mandatory = Vec::new();
    for chain in params.get_all("join") {
        let mut t1 = table;
        for name in chain.split(',') {
            let Some(t2) = db.table(name) else {
                continue;
            };
            let fks1 = t1.fks_to(t2.name());
            let fks2 = t2.fks_to(t1.name());
            let junction = db.junction_between(t1.name(), t2.name()).is_some();
            if junction || !fks1.is_empty() {
                if let Some(pk) = t2.pk() {
                    mandatory.push(format!("{}.{}", t2.name(), pk.name));
                }
            }
            for fk in &fks1 {
                mandatory.push(format!("{}.{}", t1.name(), fk.name));
            }
            if junction || !fks2.is_empty() {
                if let Some(pk) = t1.pk() {
                    mandatory.push(format!("{}.{}", t1.name(), pk.name));
                }
            }
            for fk in &fks2 {
                mandatory.push(format!("{}.{}", t2.name(), fk.name));
            }
            t1 = t2;
        }
    }
    for column in mandatory {
        params.add("mandatory", column);
    }
}
