//! Shared fixtures: a recording executor and an in-memory blog database.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use autocrud::db::{ExecutorResult, GenericDb, Row, SqlExecutor, SqliteExecutor};
use autocrud::schema::{DefinitionService, ReflectionService, SchemaReflector};
use autocrud::record::RecordService;
use autocrud::sql::{Dialect, Statement};

/// Executor that records every statement and replays canned results.
pub struct RecordingExecutor {
    dialect: Dialect,
    statements: Mutex<Vec<Statement>>,
    results: Mutex<VecDeque<Vec<Row>>>,
    affected: u64,
}

impl RecordingExecutor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            statements: Mutex::new(Vec::new()),
            results: Mutex::new(VecDeque::new()),
            affected: 1,
        }
    }

    /// Rows returned by the next query.
    pub fn push_rows(&self, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .map(|v| v.as_object().cloned().expect("row must be an object"))
            .collect();
        self.results.lock().unwrap().push_back(rows);
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    pub fn sql(&self) -> Vec<String> {
        self.statements().into_iter().map(|s| s.sql).collect()
    }

    pub fn calls(&self) -> usize {
        self.statements.lock().unwrap().len()
    }
}

#[async_trait]
impl SqlExecutor for RecordingExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn query(&self, statement: &Statement) -> ExecutorResult<Vec<Row>> {
        self.statements.lock().unwrap().push(statement.clone());
        Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn execute(&self, statement: &Statement) -> ExecutorResult<u64> {
        self.statements.lock().unwrap().push(statement.clone());
        Ok(self.affected)
    }
}

/// Parse generated SQL with sqlparser for the given dialect.
pub fn validate_sql(sql: &str, dialect: Dialect) {
    use sqlparser::dialect::{MsSqlDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
    use sqlparser::parser::Parser;

    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::TSql => Box::new(MsSqlDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
    };
    if let Err(e) = Parser::parse_sql(&*parser_dialect, sql) {
        panic!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql);
    }
}

pub const BLOG_SCHEMA: &str = r#"
CREATE TABLE categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(255) NOT NULL,
    icon BLOB NULL
);
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username VARCHAR(255) NOT NULL UNIQUE,
    password VARCHAR(255) NOT NULL
);
CREATE TABLE posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users (id),
    category_id INTEGER NOT NULL REFERENCES categories (id),
    content VARCHAR(255) NOT NULL
);
CREATE TABLE comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL REFERENCES posts (id),
    message VARCHAR(255) NOT NULL
);
CREATE TABLE tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(255) NOT NULL,
    is_important BOOLEAN NOT NULL
);
CREATE TABLE post_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL REFERENCES posts (id),
    tag_id INTEGER NOT NULL REFERENCES tags (id)
);
CREATE TABLE products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(255) NOT NULL,
    price DECIMAL(10,2) NOT NULL,
    visits INTEGER NULL,
    in_stock BOOLEAN NOT NULL
);
"#;

pub const BLOG_DATA: &str = r#"
INSERT INTO categories (name, icon) VALUES ('announcement', NULL), ('article', NULL);
INSERT INTO users (username, password) VALUES ('user1', 'pass1'), ('user2', 'pass2');
INSERT INTO posts (user_id, category_id, content) VALUES (1, 1, 'blog started'), (1, 2, 'It works!');
INSERT INTO comments (post_id, message) VALUES (1, 'great'), (1, 'fantastic');
INSERT INTO tags (name, is_important) VALUES ('funny', 0), ('important', 1);
INSERT INTO post_tags (post_id, tag_id) VALUES (1, 1), (1, 2);
INSERT INTO products (name, price, visits, in_stock) VALUES
    ('Product 1', 1.50, 0, 1),
    ('Product 2', 2.50, 0, 1),
    ('Product 3', 3.50, 0, 1),
    ('Product 4', 4.50, 0, 1),
    ('Product 5', 5.50, 0, 1),
    ('Product 6', 6.50, 0, 0),
    ('Product 7', 7.50, 0, 0),
    ('Product 8', 8.50, 0, 0),
    ('Product 9', 9.50, 0, 0),
    ('Product 10', 10.50, 0, 0),
    ('Product 11', 11.50, 0, 0);
"#;

/// The blog database, seeded, with its services.
pub struct Blog {
    pub executor: Arc<SqliteExecutor>,
    pub db: GenericDb,
    pub reflection: Arc<ReflectionService>,
    pub records: RecordService,
    pub definitions: DefinitionService,
}

pub async fn blog() -> Blog {
    let executor = SqliteExecutor::open_in_memory().expect("open in-memory database");
    executor.execute_batch(BLOG_SCHEMA).await.expect("create schema");
    executor.execute_batch(BLOG_DATA).await.expect("seed data");
    let executor = Arc::new(executor);

    let db = GenericDb::new(executor.clone());
    let reflector = SchemaReflector::new(db.clone(), "main");
    let reflection = Arc::new(ReflectionService::new(reflector, Duration::ZERO));
    let records = RecordService::new(db.clone(), Arc::clone(&reflection));
    let definitions = DefinitionService::new(db.clone(), Arc::clone(&reflection));
    Blog {
        executor,
        db,
        reflection,
        records,
        definitions,
    }
}

/// Convert a JSON object literal to a row.
pub fn row(value: Value) -> Row {
    value.as_object().cloned().expect("row must be an object")
}
