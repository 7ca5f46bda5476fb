//! Generic query engine.
//!
//! `GenericDb` turns record operations on a reflected table into rendered
//! statements, runs them through the executor and normalizes values on the
//! way in (booleans, base64url binaries, numeric increments) and on the way
//! out (booleans, numbers, decimals).

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::context::RequestContext;
use super::executor::{Row, SqlExecutor};
use crate::error::{Error, Result};
use crate::record::condition::ColumnOperator;
use crate::record::Condition;
use crate::schema::{CanonicalType, ReflectedColumn, ReflectedTable};
use crate::sql::converter::decode_base64;
use crate::sql::{
    Assignment, ColumnConverter, ConditionsBuilder, Count, Delete, Dialect, Insert, OrderByExpr,
    Select, SelectItem, SqlDialect, Statement, TokenStream, Update,
};

/// Query engine over one database.
#[derive(Clone)]
pub struct GenericDb {
    executor: Arc<dyn SqlExecutor>,
    dialect: Dialect,
    conditions: ConditionsBuilder,
    converter: ColumnConverter,
}

impl std::fmt::Debug for GenericDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericDb")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

/// Loose truthiness of a database boolean.
fn truecast(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(*b),
        Value::Number(n) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Value::Bool(!matches!(
            s.trim().to_lowercase().as_str(),
            "" | "0" | "f" | "false"
        )),
        other => Value::Bool(!other.is_null()),
    }
}

fn numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(Value::from(i))
            } else {
                s.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
            }
        }
        _ => None,
    }
}

impl GenericDb {
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        let dialect = executor.dialect();
        Self {
            executor,
            dialect,
            conditions: ConditionsBuilder::new(dialect),
            converter: ColumnConverter::new(dialect),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run a statement returning rows.
    pub async fn query(&self, statement: &Statement) -> Result<Vec<Row>> {
        debug!(sql = %statement.sql, params = statement.params.len(), "query");
        self.executor
            .query(statement)
            .await
            .map_err(|e| Error::from(e).classify())
    }

    /// Run a statement returning the affected row count.
    pub async fn execute(&self, statement: &Statement) -> Result<u64> {
        debug!(sql = %statement.sql, params = statement.params.len(), "execute");
        self.executor
            .execute(statement)
            .await
            .map_err(|e| Error::from(e).classify())
    }

    // =========================================================================
    // Record operations
    // =========================================================================

    /// Insert a record and return its key (`null` for tables without a key).
    pub async fn create(&self, _ctx: &RequestContext, table: &ReflectedTable, record: &Row) -> Result<Value> {
        let mut insert = Insert::into(table.name());
        for (column, value) in self.input_values(table, record)? {
            insert = insert.value(&column.name, self.converter.param(column, value));
        }

        let Some(pk) = table.pk() else {
            self.execute(&insert.build(self.dialect)).await?;
            return Ok(Value::Null);
        };

        if let Some(supplied) = record.get(&pk.name).filter(|v| !v.is_null()) {
            self.execute(&insert.build(self.dialect)).await?;
            return Ok(coerce_key(pk, supplied.clone()));
        }

        let key = if self.dialect.supports_returning() || self.dialect.supports_output_inserted() {
            let rows = self.query(&insert.returning(&pk.name).build(self.dialect)).await?;
            rows.first()
                .and_then(|row| row.get(&pk.name).cloned())
                .unwrap_or(Value::Null)
        } else {
            self.execute(&insert.build(self.dialect)).await?;
            match self.dialect.last_insert_id_sql() {
                Some(sql) => {
                    let rows = self.query(&Statement::new(sql, vec![])).await?;
                    rows.first()
                        .and_then(|row| row.values().next().cloned())
                        .unwrap_or(Value::Null)
                }
                None => Value::Null,
            }
        };
        Ok(coerce_key(pk, key))
    }

    /// Read one record by key.
    pub async fn read_one(
        &self,
        ctx: &RequestContext,
        table: &ReflectedTable,
        columns: &[String],
        id: &str,
    ) -> Result<Option<Row>> {
        let Some(pk) = table.pk() else {
            return Ok(None);
        };
        let condition = self.restrict(ctx, table, Condition::column(pk, ColumnOperator::Eq, id));
        let statement = Select::from(table.name())
            .columns(self.select_items(table, columns))
            .filter(self.conditions.build(&condition))
            .build(self.dialect);
        let mut rows = self.query(&statement).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        let mut row = rows.swap_remove(0);
        self.convert_output(table, &mut row);
        Ok(Some(row))
    }

    /// Read the records with the given keys, in database order.
    pub async fn read_many(
        &self,
        ctx: &RequestContext,
        table: &ReflectedTable,
        columns: &[String],
        ids: &[String],
    ) -> Result<Vec<Row>> {
        let Some(pk) = table.pk() else {
            return Ok(Vec::new());
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let condition = self.restrict(ctx, table, Condition::column(pk, ColumnOperator::In, ids.join(",")));
        let statement = Select::from(table.name())
            .columns(self.select_items(table, columns))
            .filter(self.conditions.build(&condition))
            .build(self.dialect);
        let mut rows = self.query(&statement).await?;
        for row in &mut rows {
            self.convert_output(table, row);
        }
        Ok(rows)
    }

    /// Number of records matching `condition`.
    pub async fn count(&self, ctx: &RequestContext, table: &ReflectedTable, condition: &Condition) -> Result<u64> {
        let condition = self.restrict(ctx, table, condition.clone());
        let statement = Count::from(table.name())
            .filter(self.conditions.build(&condition))
            .build(self.dialect);
        let rows = self.query(&statement).await?;
        let count = rows
            .first()
            .and_then(|row| row.values().next())
            .and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .unwrap_or(0);
        Ok(count)
    }

    /// List records. `limit` of `Some(0)` returns nothing without querying.
    #[allow(clippy::too_many_arguments)]
    pub async fn list_all(
        &self,
        ctx: &RequestContext,
        table: &ReflectedTable,
        columns: &[String],
        condition: &Condition,
        ordering: &[OrderByExpr],
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Row>> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }
        let condition = self.restrict(ctx, table, condition.clone());
        let statement = Select::from(table.name())
            .columns(self.select_items(table, columns))
            .filter(self.conditions.build(&condition))
            .order_by(ordering.to_vec())
            .limit_offset(limit, offset)
            .build(self.dialect);
        let mut rows = self.query(&statement).await?;
        for row in &mut rows {
            self.convert_output(table, row);
        }
        Ok(rows)
    }

    /// Update a record, returning the affected row count.
    pub async fn update(&self, ctx: &RequestContext, table: &ReflectedTable, id: &str, record: &Row) -> Result<u64> {
        let assignments: Vec<Assignment> = self
            .input_values(table, record)?
            .into_iter()
            .map(|(column, value)| Assignment::set(&column.name, self.converter.param(column, value)))
            .collect();
        self.run_update(ctx, table, id, assignments).await
    }

    /// Add numeric deltas to columns. Non-numeric values are dropped.
    pub async fn increment(&self, ctx: &RequestContext, table: &ReflectedTable, id: &str, record: &Row) -> Result<u64> {
        let mut assignments = Vec::new();
        for (name, value) in record {
            let Some(column) = table.column(name) else {
                continue;
            };
            match numeric(value) {
                Some(delta) => {
                    let mut ts = TokenStream::new();
                    ts.param(delta);
                    assignments.push(Assignment::increment(&column.name, ts));
                }
                None => warn!(table = table.name(), column = %name, "ignoring non-numeric increment"),
            }
        }
        self.run_update(ctx, table, id, assignments).await
    }

    /// Delete a record, returning the affected row count.
    pub async fn delete(&self, ctx: &RequestContext, table: &ReflectedTable, id: &str) -> Result<u64> {
        let Some(pk) = table.pk() else {
            return Ok(0);
        };
        let condition = self.restrict(ctx, table, Condition::column(pk, ColumnOperator::Eq, id));
        let statement = Delete::from(table.name())
            .filter(self.conditions.build(&condition))
            .build(self.dialect);
        self.execute(&statement).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn run_update(
        &self,
        ctx: &RequestContext,
        table: &ReflectedTable,
        id: &str,
        assignments: Vec<Assignment>,
    ) -> Result<u64> {
        let Some(pk) = table.pk() else {
            return Ok(0);
        };
        if assignments.is_empty() {
            return Ok(0);
        }
        let condition = self.restrict(ctx, table, Condition::column(pk, ColumnOperator::Eq, id));
        let mut update = Update::table(table.name());
        for assignment in assignments {
            update = update.assign(assignment);
        }
        let statement = update
            .filter(self.conditions.build(&condition))
            .build(self.dialect);
        self.execute(&statement).await
    }

    fn restrict(&self, ctx: &RequestContext, table: &ReflectedTable, condition: Condition) -> Condition {
        condition.and(ctx.condition_for(table.name()))
    }

    fn select_items(&self, table: &ReflectedTable, columns: &[String]) -> Vec<SelectItem> {
        let selected: Vec<&ReflectedColumn> = if columns.is_empty() {
            table.columns().collect()
        } else {
            columns.iter().filter_map(|name| table.column(name)).collect()
        };
        selected
            .into_iter()
            .map(|column| self.converter.select_item(column))
            .collect()
    }

    /// Known columns of `record` with their values normalized for binding.
    fn input_values<'t>(&self, table: &'t ReflectedTable, record: &Row) -> Result<Vec<(&'t ReflectedColumn, Value)>> {
        let mut out = Vec::new();
        for (name, value) in record {
            let Some(column) = table.column(name) else {
                debug!(table = table.name(), column = %name, "dropping unknown column");
                continue;
            };
            let value = match (column.kind, value) {
                (CanonicalType::Boolean, Value::Bool(b)) => Value::from(i64::from(*b)),
                (kind, Value::String(s)) if kind.is_binary() => {
                    if decode_base64(s).is_none() {
                        return Err(Error::InvalidInput(format!(
                            "column '{}' expects base64, got '{}'",
                            column.name, s
                        )));
                    }
                    Value::String(s.clone())
                }
                (_, other) => other.clone(),
            };
            out.push((column, value));
        }
        Ok(out)
    }

    fn convert_output(&self, table: &ReflectedTable, row: &mut Row) {
        for (name, value) in row.iter_mut() {
            let Some(column) = table.column(name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let kind = column.kind;
            if kind.is_boolean() {
                *value = truecast(value);
            } else if kind.is_integer() {
                if let Some(i) = value.as_str().and_then(|s| s.trim().parse::<i64>().ok()) {
                    *value = Value::from(i);
                }
            } else if matches!(kind, CanonicalType::Float | CanonicalType::Double) {
                if let Some(n) = value
                    .as_str()
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .and_then(serde_json::Number::from_f64)
                {
                    *value = Value::Number(n);
                }
            } else if kind == CanonicalType::Decimal && self.dialect.formats_decimal_output() {
                if let Some(f) = value.as_f64() {
                    *value = Value::String(format!("{:.*}", column.scale as usize, f));
                }
            }
        }
    }
}

/// Integer keys come back as numbers whatever the driver returned.
fn coerce_key(pk: &ReflectedColumn, key: Value) -> Value {
    if !pk.kind.is_integer() {
        return key;
    }
    match &key {
        Value::String(s) => s.trim().parse::<i64>().map(Value::from).unwrap_or(key),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Value::from)
            .unwrap_or(key),
        _ => key,
    }
}
