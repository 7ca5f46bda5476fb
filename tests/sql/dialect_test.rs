//! Statements rendered by the engine for each dialect.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use serde_json::json;

use autocrud::db::{GenericDb, RequestContext};
use autocrud::record::Condition;
use autocrud::schema::{CanonicalType, ReflectedColumn, ReflectedTable, TableKind};
use autocrud::sql::{Dialect, OrderByExpr};

use common::{row, validate_sql, RecordingExecutor};

const ALL: [Dialect; 4] = [Dialect::MySql, Dialect::Postgres, Dialect::TSql, Dialect::Sqlite];

fn posts() -> ReflectedTable {
    ReflectedTable::new(
        "posts",
        TableKind::Table,
        vec![
            ReflectedColumn::new("id", CanonicalType::Integer, None, None, None)
                .nullable(false)
                .primary_key(true),
            ReflectedColumn::new("user_id", CanonicalType::Integer, None, None, None)
                .nullable(false)
                .references("users"),
            ReflectedColumn::new("category_id", CanonicalType::Integer, None, None, None)
                .nullable(false)
                .references("categories"),
            ReflectedColumn::new("content", CanonicalType::Varchar, None, None, None),
        ],
    )
}

fn categories() -> ReflectedTable {
    ReflectedTable::new(
        "categories",
        TableKind::Table,
        vec![
            ReflectedColumn::new("id", CanonicalType::Integer, None, None, None).primary_key(true),
            ReflectedColumn::new("name", CanonicalType::Varchar, None, None, None),
            ReflectedColumn::new("icon", CanonicalType::Blob, None, None, None),
        ],
    )
}

fn products() -> ReflectedTable {
    ReflectedTable::new(
        "products",
        TableKind::Table,
        vec![
            ReflectedColumn::new("id", CanonicalType::Integer, None, None, None).primary_key(true),
            ReflectedColumn::new("name", CanonicalType::Varchar, None, None, None),
            ReflectedColumn::new("visits", CanonicalType::Integer, None, None, None),
            ReflectedColumn::new("in_stock", CanonicalType::Boolean, None, None, None),
        ],
    )
}

fn engine(dialect: Dialect) -> (Arc<RecordingExecutor>, GenericDb) {
    let executor = Arc::new(RecordingExecutor::new(dialect));
    let db = GenericDb::new(executor.clone());
    (executor, db)
}

#[tokio::test]
async fn test_read_one_per_dialect() {
    let mut rendered = Vec::new();
    for dialect in ALL {
        let (executor, db) = engine(dialect);
        let found = db
            .read_one(&RequestContext::new(), &posts(), &[], "1")
            .await
            .unwrap();
        assert!(found.is_none());

        let statements = executor.statements();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].params, vec![json!(1)]);
        validate_sql(&statements[0].sql, dialect);
        rendered.push(format!("{}: {}", dialect, statements[0].sql));
    }
    insta::assert_snapshot!(rendered.join("\n"), @r#"
    mysql: SELECT `id`, `user_id`, `category_id`, `content` FROM `posts` WHERE `id` = ?
    postgres: SELECT "id", "user_id", "category_id", "content" FROM "posts" WHERE "id" = $1
    tsql: SELECT [id], [user_id], [category_id], [content] FROM [posts] WHERE [id] = @P1
    sqlite: SELECT "id", "user_id", "category_id", "content" FROM "posts" WHERE "id" = ?
    "#);
}

#[tokio::test]
async fn test_read_many_binds_every_key() {
    let (executor, db) = engine(Dialect::Postgres);
    let ids = vec!["1".to_string(), "2".to_string(), "5".to_string()];
    db.read_many(&RequestContext::new(), &posts(), &["id".to_string()], &ids)
        .await
        .unwrap();

    let statements = executor.statements();
    insta::assert_snapshot!(statements[0].sql, @r#"SELECT "id" FROM "posts" WHERE "id" IN ($1,$2,$3)"#);
    assert_eq!(statements[0].params, vec![json!(1), json!(2), json!(5)]);

    db.read_many(&RequestContext::new(), &posts(), &[], &[])
        .await
        .unwrap();
    assert_eq!(executor.calls(), 1);
}

#[tokio::test]
async fn test_paged_list_sqlserver() {
    let (executor, db) = engine(Dialect::TSql);
    let table = posts();
    let condition = Condition::from_filter(&table, "content,sw,a");
    db.list_all(
        &RequestContext::new(),
        &table,
        &["id".to_string(), "content".to_string()],
        &condition,
        &[OrderByExpr::asc("id")],
        10,
        Some(5),
    )
    .await
    .unwrap();

    let sql = executor.sql().remove(0);
    insta::assert_snapshot!(sql, @r"SELECT [id], [content] FROM [posts] WHERE [content] LIKE @P1 ESCAPE '\' ORDER BY [id] ASC OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY");
    validate_sql(&sql, Dialect::TSql);
}

#[tokio::test]
async fn test_paged_list_sqlite() {
    let (executor, db) = engine(Dialect::Sqlite);
    db.list_all(
        &RequestContext::new(),
        &posts(),
        &["id".to_string()],
        &Condition::No,
        &[OrderByExpr::asc("id"), OrderByExpr::desc("content")],
        10,
        Some(5),
    )
    .await
    .unwrap();

    insta::assert_snapshot!(executor.sql().remove(0), @r#"SELECT "id" FROM "posts" ORDER BY "id" ASC, "content" DESC LIMIT 5 OFFSET 10"#);
}

#[tokio::test]
async fn test_zero_limit_issues_no_query() {
    let (executor, db) = engine(Dialect::MySql);
    let rows = db
        .list_all(&RequestContext::new(), &posts(), &[], &Condition::No, &[], 0, Some(0))
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_create_returns_generated_key() {
    let record = row(json!({"user_id": 1, "category_id": 2, "content": "hi", "unknown": 5}));

    let (executor, db) = engine(Dialect::Postgres);
    executor.push_rows(vec![json!({"id": 3})]);
    let key = db.create(&RequestContext::new(), &posts(), &record).await.unwrap();
    assert_eq!(key, json!(3));
    insta::assert_snapshot!(executor.sql().join("\n"), @r#"INSERT INTO "posts" ("user_id", "category_id", "content") VALUES ($1, $2, $3) RETURNING "id""#);

    let (executor, db) = engine(Dialect::TSql);
    executor.push_rows(vec![json!({"id": "4"})]);
    let key = db.create(&RequestContext::new(), &posts(), &record).await.unwrap();
    assert_eq!(key, json!(4));
    insta::assert_snapshot!(executor.sql().join("\n"), @"INSERT INTO [posts] ([user_id], [category_id], [content]) OUTPUT INSERTED.[id] VALUES (@P1, @P2, @P3)");

    let (executor, db) = engine(Dialect::MySql);
    executor.push_rows(vec![json!({"LAST_INSERT_ID()": 5})]);
    let key = db.create(&RequestContext::new(), &posts(), &record).await.unwrap();
    assert_eq!(key, json!(5));
    insta::assert_snapshot!(executor.sql().join("\n"), @r"
    INSERT INTO `posts` (`user_id`, `category_id`, `content`) VALUES (?, ?, ?)
    SELECT LAST_INSERT_ID()
    ");
}

#[tokio::test]
async fn test_create_with_supplied_key_skips_returning() {
    let (executor, db) = engine(Dialect::Postgres);
    let record = row(json!({"id": 9, "user_id": 1, "category_id": 1, "content": "x"}));
    let key = db.create(&RequestContext::new(), &posts(), &record).await.unwrap();
    assert_eq!(key, json!(9));
    let sql = executor.sql();
    assert_eq!(sql.len(), 1);
    assert!(!sql[0].contains("RETURNING"));
}

#[tokio::test]
async fn test_binary_columns_travel_as_base64() {
    let (executor, db) = engine(Dialect::MySql);
    let record = row(json!({"name": "logo", "icon": "AAH_"}));
    executor.push_rows(vec![json!({"LAST_INSERT_ID()": 1})]);
    db.create(&RequestContext::new(), &categories(), &record)
        .await
        .unwrap();
    db.read_one(&RequestContext::new(), &categories(), &[], "1")
        .await
        .unwrap();

    let statements = executor.statements();
    insta::assert_snapshot!(statements[0].sql, @"INSERT INTO `categories` (`name`, `icon`) VALUES (?, FROM_BASE64(?))");
    assert_eq!(statements[0].params, vec![json!("logo"), json!("AAH/")]);
    insta::assert_snapshot!(statements[2].sql, @"SELECT `id`, `name`, TO_BASE64(`icon`) AS `icon` FROM `categories` WHERE `id` = ?");
}

#[tokio::test]
async fn test_boolean_input_is_wrapped() {
    let (executor, db) = engine(Dialect::MySql);
    let affected = db
        .update(&RequestContext::new(), &products(), "5", &row(json!({"in_stock": true})))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let statements = executor.statements();
    insta::assert_snapshot!(statements[0].sql, @"UPDATE `products` SET `in_stock` = IFNULL(IF(?,TRUE,FALSE),NULL) WHERE `id` = ?");
    assert_eq!(statements[0].params, vec![json!(1), json!(5)]);
}

#[tokio::test]
async fn test_increment_skips_non_numeric() {
    let (executor, db) = engine(Dialect::Sqlite);
    let delta = row(json!({"visits": "2", "name": "x"}));
    db.increment(&RequestContext::new(), &products(), "3", &delta)
        .await
        .unwrap();
    let statements = executor.statements();
    insta::assert_snapshot!(statements[0].sql, @r#"UPDATE "products" SET "visits" = "visits" + ? WHERE "id" = ?"#);
    assert_eq!(statements[0].params, vec![json!(2), json!(3)]);

    let affected = db
        .increment(&RequestContext::new(), &products(), "3", &row(json!({"name": "x"})))
        .await
        .unwrap();
    assert_eq!(affected, 0);
    assert_eq!(executor.calls(), 1);
}

#[tokio::test]
async fn test_request_conditions_restrict_every_statement() {
    let table = posts();
    let ctx = RequestContext::new()
        .with_condition("posts", Condition::from_filter(&table, "user_id,eq,1"));

    let (executor, db) = engine(Dialect::Postgres);
    db.delete(&ctx, &table, "7").await.unwrap();
    db.update(&ctx, &table, "7", &row(json!({"content": "x"})))
        .await
        .unwrap();
    executor.push_rows(vec![json!({"count": 4})]);
    let count = db.count(&ctx, &table, &Condition::No).await.unwrap();
    assert_eq!(count, 4);

    let sql = executor.sql();
    for statement in &sql {
        validate_sql(statement, Dialect::Postgres);
    }
    insta::assert_snapshot!(sql.join("\n"), @r#"
    DELETE FROM "posts" WHERE ("id" = $1 AND "user_id" = $2)
    UPDATE "posts" SET "content" = $1 WHERE ("id" = $2 AND "user_id" = $3)
    SELECT COUNT(*) FROM "posts" WHERE "user_id" = $1
    "#);
}

#[tokio::test]
async fn test_tables_without_key() {
    let (executor, db) = engine(Dialect::Sqlite);
    let log = ReflectedTable::new(
        "log",
        TableKind::Table,
        vec![ReflectedColumn::new("message", CanonicalType::Clob, None, None, None)],
    );
    let ctx = RequestContext::new();

    assert!(db.read_one(&ctx, &log, &[], "1").await.unwrap().is_none());
    assert!(db.read_many(&ctx, &log, &[], &["1".to_string()]).await.unwrap().is_empty());
    assert_eq!(db.update(&ctx, &log, "1", &row(json!({"message": "x"}))).await.unwrap(), 0);
    assert_eq!(db.delete(&ctx, &log, "1").await.unwrap(), 0);
    assert_eq!(executor.calls(), 0);

    let key = db.create(&ctx, &log, &row(json!({"message": "x"}))).await.unwrap();
    assert!(key.is_null());
    insta::assert_snapshot!(executor.sql().remove(0), @r#"INSERT INTO "log" ("message") VALUES (?)"#);
}
