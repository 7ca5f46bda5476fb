//! Record operations on reflected tables.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::columns::{add_mandatory_columns, column_names, strip_columns};
use super::document::ListDocument;
use super::filters::combined_conditions;
use super::joiner::RelationJoiner;
use super::ordering::column_ordering;
use super::pagination::{has_page, page_limit, page_offset};
use super::params::Params;
use crate::db::{GenericDb, RequestContext, Row};
use crate::error::{Error, Result};
use crate::schema::{ReflectedDatabase, ReflectedTable, ReflectionService};

fn require_table<'d>(schema: &'d ReflectedDatabase, name: &str) -> Result<&'d ReflectedTable> {
    schema
        .table(name)
        .ok_or_else(|| Error::TableNotFound(name.to_string()))
}

/// Known columns of an input record. Update-like operations never touch
/// the primary key.
fn sanitize(table: &ReflectedTable, record: &Value, drop_pk: bool) -> Result<Row> {
    let Value::Object(fields) = record else {
        return Err(Error::InvalidInput(format!(
            "expected an object for '{}'",
            table.name()
        )));
    };
    let pk = table.pk().map(|c| c.name.as_str()).filter(|_| drop_pk);
    let mut row = Row::new();
    for (name, value) in fields {
        if !table.has_column(name) {
            debug!(table = table.name(), column = %name, "dropping unknown column");
            continue;
        }
        if pk == Some(name.as_str()) {
            continue;
        }
        row.insert(name.clone(), value.clone());
    }
    Ok(row)
}

fn check_counts(ids: &[String], records: &[Value]) -> Result<()> {
    if ids.len() != records.len() {
        return Err(Error::ArgumentCountMismatch {
            ids: ids.len(),
            records: records.len(),
        });
    }
    Ok(())
}

/// List, read, create, update, delete and increment records.
#[derive(Debug, Clone)]
pub struct RecordService {
    db: GenericDb,
    reflection: Arc<ReflectionService>,
}

impl RecordService {
    pub fn new(db: GenericDb, reflection: Arc<ReflectionService>) -> Self {
        Self { db, reflection }
    }

    pub fn db(&self) -> &GenericDb {
        &self.db
    }

    pub fn reflection(&self) -> &Arc<ReflectionService> {
        &self.reflection
    }

    pub async fn exists(&self, table: &str) -> Result<bool> {
        self.reflection.has_table(table).await
    }

    /// Matching records, with the total count for paged requests.
    pub async fn list(&self, ctx: &RequestContext, table: &str, params: &Params) -> Result<ListDocument> {
        let schema = self.reflection.database().await?;
        let table = require_table(&schema, table)?;
        let mut params = params.clone();
        add_mandatory_columns(&schema, table, &mut params);

        let columns = column_names(table, true, &params);
        let condition = combined_conditions(table, &params);
        let ordering = column_ordering(table, &params);
        let limit = page_limit(&params);
        let (offset, count) = if has_page(&params) {
            let count = self.db.count(ctx, table, &condition).await?;
            (page_offset(&params), Some(count))
        } else {
            (0, None)
        };

        let mut records = self
            .db
            .list_all(ctx, table, &columns, &condition, &ordering, offset, limit)
            .await?;
        RelationJoiner::new(&self.db, &schema)
            .add_joins(ctx, table, &mut records, &params)
            .await?;
        if columns.is_empty() {
            records.iter_mut().for_each(|r| strip_columns(table, r));
        }
        Ok(ListDocument::new(records, count))
    }

    /// One record by key, joins expanded.
    pub async fn read(&self, ctx: &RequestContext, table: &str, id: &str, params: &Params) -> Result<Row> {
        let schema = self.reflection.database().await?;
        let table = require_table(&schema, table)?;
        let mut params = params.clone();
        add_mandatory_columns(&schema, table, &mut params);

        let columns = column_names(table, true, &params);
        let record = self
            .db
            .read_one(ctx, table, &columns, id)
            .await?
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        let mut records = vec![record];
        RelationJoiner::new(&self.db, &schema)
            .add_joins(ctx, table, &mut records, &params)
            .await?;
        if columns.is_empty() {
            records.iter_mut().for_each(|r| strip_columns(table, r));
        }
        Ok(records.swap_remove(0))
    }

    /// Several records by key, `null` for keys that do not exist.
    pub async fn read_batch(
        &self,
        ctx: &RequestContext,
        table: &str,
        ids: &[String],
        params: &Params,
    ) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match self.read(ctx, table, id, params).await {
                Ok(row) => out.push(Value::Object(row)),
                Err(Error::RecordNotFound(_)) => out.push(Value::Null),
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    /// Insert a record and return its key.
    pub async fn create(&self, ctx: &RequestContext, table: &str, record: &Value) -> Result<Value> {
        let schema = self.reflection.database().await?;
        let table = require_table(&schema, table)?;
        let record = sanitize(table, record, false)?;
        self.db.create(ctx, table, &record).await
    }

    pub async fn create_batch(&self, ctx: &RequestContext, table: &str, records: &[Value]) -> Result<Vec<Value>> {
        let mut keys = Vec::with_capacity(records.len());
        for record in records {
            keys.push(self.create(ctx, table, record).await?);
        }
        Ok(keys)
    }

    /// Update a record, returning the affected row count.
    pub async fn update(&self, ctx: &RequestContext, table: &str, id: &str, record: &Value) -> Result<u64> {
        let schema = self.reflection.database().await?;
        let table = require_table(&schema, table)?;
        let record = sanitize(table, record, true)?;
        self.db.update(ctx, table, id, &record).await
    }

    pub async fn update_batch(
        &self,
        ctx: &RequestContext,
        table: &str,
        ids: &[String],
        records: &[Value],
    ) -> Result<Vec<u64>> {
        check_counts(ids, records)?;
        let mut counts = Vec::with_capacity(ids.len());
        for (id, record) in ids.iter().zip(records) {
            counts.push(self.update(ctx, table, id, record).await?);
        }
        Ok(counts)
    }

    /// Add numeric deltas to a record, returning the affected row count.
    pub async fn increment(&self, ctx: &RequestContext, table: &str, id: &str, record: &Value) -> Result<u64> {
        let schema = self.reflection.database().await?;
        let table = require_table(&schema, table)?;
        let record = sanitize(table, record, true)?;
        self.db.increment(ctx, table, id, &record).await
    }

    pub async fn increment_batch(
        &self,
        ctx: &RequestContext,
        table: &str,
        ids: &[String],
        records: &[Value],
    ) -> Result<Vec<u64>> {
        check_counts(ids, records)?;
        let mut counts = Vec::with_capacity(ids.len());
        for (id, record) in ids.iter().zip(records) {
            counts.push(self.increment(ctx, table, id, record).await?);
        }
        Ok(counts)
    }

    /// Delete a record, returning the affected row count.
    pub async fn delete(&self, ctx: &RequestContext, table: &str, id: &str) -> Result<u64> {
        let schema = self.reflection.database().await?;
        let table = require_table(&schema, table)?;
        self.db.delete(ctx, table, id).await
    }

    pub async fn delete_batch(&self, ctx: &RequestContext, table: &str, ids: &[String]) -> Result<Vec<u64>> {
        let mut counts = Vec::with_capacity(ids.len());
        for id in ids {
            counts.push(self.delete(ctx, table, id).await?);
        }
        Ok(counts)
    }
}
