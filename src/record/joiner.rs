//! Relation expansion (`join` parameters).
//!
//! Join chains form a [`PathTree`] of table names. For every child table T2
//! of the current table T1 the relation is found from foreign keys:
//!
//! - T1 references T2: belongs-to, the record gains a `T2` object (or null)
//! - T2 references T1: has-many, the record gains a `T2` list
//! - neither, but a junction table references both: many-to-many, a `T2` list
//!
//! Each relation costs one batched query per level (two for many-to-many),
//! never one per record. Deeper levels are expanded on the fetched batch
//! before it is spliced onto the parent records.

use std::collections::HashMap;

use futures::future::BoxFuture;
use indexmap::IndexSet;
use serde_json::Value;
use tracing::debug;

use super::columns::{column_names, strip_columns};
use super::condition::{ColumnOperator, Condition};
use super::ordering::default_ordering;
use super::params::Params;
use super::path_tree::PathTree;
use crate::db::{GenericDb, JoinLimits, RequestContext, Row};
use crate::error::Result;
use crate::schema::{ReflectedColumn, ReflectedDatabase, ReflectedTable};
use crate::sql::OrderByExpr;

/// String form of a key value; `None` for null.
fn key_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn keys_of<'c>(records: &[Row], columns: impl IntoIterator<Item = &'c str> + Clone) -> Vec<String> {
    let mut keys = IndexSet::new();
    for record in records {
        for column in columns.clone() {
            if let Some(key) = record.get(column).and_then(key_of) {
                keys.insert(key);
            }
        }
    }
    keys.into_iter().collect()
}

/// Join chains from the `join` parameters, unknown tables skipped, limits applied.
pub fn join_tree(schema: &ReflectedDatabase, params: &Params, limits: &JoinLimits) -> PathTree<()> {
    let paths: Vec<Vec<String>> = params
        .get_all("join")
        .iter()
        .map(|chain| {
            chain
                .split(',')
                .map(str::trim)
                .filter(|name| schema.has_table(name))
                .map(str::to_string)
                .collect()
        })
        .collect();
    let mut tree = PathTree::new();
    for path in limits.apply(paths) {
        tree.touch(&path);
    }
    tree
}

/// Expands records with their related records.
#[derive(Debug, Clone, Copy)]
pub struct RelationJoiner<'a> {
    db: &'a GenericDb,
    schema: &'a ReflectedDatabase,
}

impl<'a> RelationJoiner<'a> {
    pub fn new(db: &'a GenericDb, schema: &'a ReflectedDatabase) -> Self {
        Self { db, schema }
    }

    /// Expand `records` of `table` with every requested join.
    pub async fn add_joins(
        &self,
        ctx: &RequestContext,
        table: &ReflectedTable,
        records: &mut Vec<Row>,
        params: &Params,
    ) -> Result<()> {
        let joins = join_tree(self.schema, params, &ctx.join_limits);
        if joins.is_empty() || records.is_empty() {
            return Ok(());
        }
        self.join_at(ctx, table, &joins, records, params).await
    }

    fn join_at<'s>(
        &'s self,
        ctx: &'s RequestContext,
        t1: &'s ReflectedTable,
        joins: &'s PathTree<()>,
        records: &'s mut Vec<Row>,
        params: &'s Params,
    ) -> BoxFuture<'s, Result<()>> {
        Box::pin(async move {
            for (name, child) in joins.children() {
                let Some(t2) = self.schema.table(name) else {
                    continue;
                };
                let fks1 = t1.fks_to(t2.name());
                let fks2 = t2.fks_to(t1.name());
                let junction = if fks1.is_empty() && fks2.is_empty() {
                    self.schema.junction_between(t1.name(), t2.name())
                } else {
                    None
                };
                if fks1.is_empty() && fks2.is_empty() && junction.is_none() {
                    debug!(from = t1.name(), to = t2.name(), "no relation, join skipped");
                    continue;
                }

                let columns = column_names(t2, false, params);
                let mut related = Vec::new();

                if !fks1.is_empty() {
                    let keys = keys_of(records, fks1.iter().map(|c| c.name.as_str()));
                    related.extend(self.db.read_many(ctx, t2, &columns, &keys).await?);
                }
                if !fks2.is_empty() {
                    let keys = self.pk_keys(t1, records);
                    related.extend(self.fetch_has_many(ctx, t2, &fks2, &columns, &keys).await?);
                }
                let mut pairs = Vec::new();
                if let Some(t3) = junction {
                    pairs = self.fetch_junction(ctx, t1, t2, t3, records).await?;
                    let keys: Vec<String> = pairs
                        .iter()
                        .map(|(_, k2)| k2.clone())
                        .collect::<IndexSet<_>>()
                        .into_iter()
                        .collect();
                    related.extend(self.db.read_many(ctx, t2, &columns, &keys).await?);
                }

                if !child.is_empty() && !related.is_empty() {
                    self.join_at(ctx, t2, child, &mut related, params).await?;
                }

                let shown = Shown::new(t2, columns.is_empty());
                if let Some(fk) = fks1.first() {
                    splice_belongs_to(&shown, fk, records, &related);
                }
                if !fks2.is_empty() {
                    splice_has_many(t1, &shown, &fks2, records, &related);
                }
                if junction.is_some() {
                    splice_many_to_many(t1, &shown, &pairs, records, &related);
                }
            }
            Ok(())
        })
    }

    fn pk_keys(&self, table: &ReflectedTable, records: &[Row]) -> Vec<String> {
        match table.pk() {
            Some(pk) => keys_of(records, [pk.name.as_str()]),
            None => Vec::new(),
        }
    }

    /// Ordering and limit of a capped fetch; uncapped fetches are unordered.
    fn cap(&self, ctx: &RequestContext, table: &ReflectedTable) -> (Vec<OrderByExpr>, Option<u64>) {
        match ctx.join_limits.max_records {
            Some(limit) => (default_ordering(table), Some(limit)),
            None => (Vec::new(), None),
        }
    }

    async fn fetch_has_many(
        &self,
        ctx: &RequestContext,
        t2: &ReflectedTable,
        fks: &[&ReflectedColumn],
        columns: &[String],
        keys: &[String],
    ) -> Result<Vec<Row>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let condition = fks.iter().fold(Condition::No, |acc, fk| {
            acc.or(Condition::column(fk, ColumnOperator::In, keys.join(",")))
        });
        let (ordering, limit) = self.cap(ctx, t2);
        self.db
            .list_all(ctx, t2, columns, &condition, &ordering, 0, limit)
            .await
    }

    /// `(t1 key, t2 key)` pairs from the junction table.
    async fn fetch_junction(
        &self,
        ctx: &RequestContext,
        t1: &ReflectedTable,
        t2: &ReflectedTable,
        t3: &ReflectedTable,
        records: &[Row],
    ) -> Result<Vec<(String, String)>> {
        let keys = self.pk_keys(t1, records);
        let fks1 = t3.fks_to(t1.name());
        let fks2 = t3.fks_to(t2.name());
        let (Some(fk1), Some(fk2)) = (fks1.first(), fks2.first()) else {
            return Ok(Vec::new());
        };
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let columns = vec![fk1.name.clone(), fk2.name.clone()];
        let condition = Condition::column(fk1, ColumnOperator::In, keys.join(","));
        let (ordering, limit) = self.cap(ctx, t3);
        let rows = self
            .db
            .list_all(ctx, t3, &columns, &condition, &ordering, 0, limit)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                let k1 = row.get(&fk1.name).and_then(key_of)?;
                let k2 = row.get(&fk2.name).and_then(key_of)?;
                Some((k1, k2))
            })
            .collect())
    }
}

/// Related table as spliced: whole rows, or only joined fields when the
/// column selection for it came out empty.
struct Shown<'t> {
    table: &'t ReflectedTable,
    hide_columns: bool,
}

impl<'t> Shown<'t> {
    fn new(table: &'t ReflectedTable, hide_columns: bool) -> Self {
        Self { table, hide_columns }
    }

    fn value(&self, row: &Row) -> Value {
        let mut row = row.clone();
        if self.hide_columns {
            strip_columns(self.table, &mut row);
        }
        Value::Object(row)
    }
}

fn by_pk<'r>(table: &ReflectedTable, related: &'r [Row]) -> HashMap<String, &'r Row> {
    let Some(pk) = table.pk() else {
        return HashMap::new();
    };
    related
        .iter()
        .filter_map(|row| Some((row.get(&pk.name).and_then(key_of)?, row)))
        .collect()
}

fn splice_belongs_to(t2: &Shown<'_>, fk: &ReflectedColumn, records: &mut [Row], related: &[Row]) {
    let index = by_pk(t2.table, related);
    for record in records.iter_mut() {
        let value = record
            .get(&fk.name)
            .and_then(key_of)
            .and_then(|key| index.get(&key))
            .map(|row| t2.value(row))
            .unwrap_or(Value::Null);
        record.insert(t2.table.name().to_string(), value);
    }
}

fn splice_has_many(
    t1: &ReflectedTable,
    t2: &Shown<'_>,
    fks: &[&ReflectedColumn],
    records: &mut [Row],
    related: &[Row],
) {
    let Some(pk) = t1.pk() else {
        return;
    };
    let mut groups: HashMap<String, Vec<Value>> = HashMap::new();
    for fk in fks {
        for row in related {
            if let Some(key) = row.get(&fk.name).and_then(key_of) {
                groups.entry(key).or_default().push(t2.value(row));
            }
        }
    }
    for record in records.iter_mut() {
        let list = record
            .get(&pk.name)
            .and_then(key_of)
            .and_then(|key| groups.get(&key).cloned())
            .unwrap_or_default();
        record.insert(t2.table.name().to_string(), Value::Array(list));
    }
}

fn splice_many_to_many(
    t1: &ReflectedTable,
    t2: &Shown<'_>,
    pairs: &[(String, String)],
    records: &mut [Row],
    related: &[Row],
) {
    let Some(pk) = t1.pk() else {
        return;
    };
    let index = by_pk(t2.table, related);
    for record in records.iter_mut() {
        let key = record.get(&pk.name).and_then(key_of);
        let list: Vec<Value> = pairs
            .iter()
            .filter(|(k1, _)| Some(k1) == key.as_ref())
            .filter_map(|(_, k2)| index.get(k2))
            .map(|row| t2.value(row))
            .collect();
        record.insert(t2.table.name().to_string(), Value::Array(list));
    }
}
