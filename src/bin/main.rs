//! autocrud CLI - run record operations against a SQLite database
//!
//! Usage:
//!   autocrud [--config autocrud.toml] [--database blog.db] <command>
//!
//! Examples:
//!   autocrud tables
//!   autocrud describe posts
//!   autocrud list posts -p filter=id,eq,1 -p join=comments -p join=tags
//!   autocrud read posts 1,2
//!   autocrud create posts '{"user_id":1,"category_id":1,"content":"hi"}'
//!   autocrud increment products 3 '{"visits":1}'

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use autocrud::cache::{self, MemoryCache, SchemaCache, SqliteCache};
use autocrud::config::{CacheBackend, Settings, SettingsError};
use autocrud::prelude::*;
use autocrud::schema::load_virtual_tables;

#[derive(Parser)]
#[command(name = "autocrud")]
#[command(about = "autocrud - CRUD over reflected database tables")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to AUTOCRUD_CONFIG, then ./autocrud.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the configured connection string
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List exposed tables
    Tables,

    /// Show the reflected definition of a table
    Describe { table: String },

    /// List records
    List {
        table: String,

        /// Request parameter as key=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Read records by key (comma separated for several)
    Read {
        table: String,
        id: String,

        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Create a record (or an array of records) from JSON
    Create { table: String, json: String },

    /// Update records by key from JSON
    Update {
        table: String,
        id: String,
        json: String,
    },

    /// Add numeric deltas to records by key
    Increment {
        table: String,
        id: String,
        json: String,
    },

    /// Delete records by key
    Delete { table: String, id: String },
}

struct App {
    records: RecordService,
    ctx: RequestContext,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("AUTOCRUD_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => return report(&Error::from(e), false),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let debug = settings.debug;
    let result = runtime.block_on(async {
        let app = connect(&settings, cli.database.as_deref())?;
        run(&app, cli.command).await
    });

    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to render output: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => report(&e, debug),
    }
}

fn report(error: &Error, debug: bool) -> ExitCode {
    let document = error.to_document(debug);
    match serde_json::to_string_pretty(&document) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}", error),
    }
    ExitCode::FAILURE
}

fn connect(settings: &Settings, database: Option<&std::path::Path>) -> Result<App> {
    let dialect = settings.database.dialect()?;
    if dialect != Dialect::Sqlite {
        return Err(SettingsError::UnsupportedDriver(settings.database.driver.clone()).into());
    }
    let path = match database {
        Some(path) => path.to_path_buf(),
        None => {
            let conn = settings.database.resolved_connection_string()?;
            if conn.is_empty() {
                return Err(SettingsError::InvalidConfig(
                    "no database: set database.connection_string or pass --database".to_string(),
                )
                .into());
            }
            PathBuf::from(conn)
        }
    };

    let executor = SqliteExecutor::open(&path)?;
    let db = GenericDb::new(Arc::new(executor));
    let reflector = SchemaReflector::new(db.clone(), settings.database.name.clone())
        .with_whitelist(settings.database.tables.clone());

    let mut reflection = ReflectionService::new(reflector, settings.cache.ttl());
    let backend: Option<Arc<dyn SchemaCache>> = match settings.cache.backend {
        CacheBackend::None => None,
        CacheBackend::Memory => Some(Arc::new(MemoryCache::new())),
        CacheBackend::Sqlite => {
            let cache_path = match settings.cache.resolved_path()? {
                Some(p) => p,
                None => SqliteCache::default_path()?,
            };
            Some(Arc::new(SqliteCache::open(cache_path)?))
        }
    };
    if let Some(backend) = backend {
        let key = cache::schema_key(
            &settings.database.driver,
            &settings.database.name,
            &path.display().to_string(),
        );
        reflection = reflection.with_cache(backend, key);
    }
    if let Some(file) = &settings.schema.virtual_tables {
        reflection = reflection.with_virtual_tables(load_virtual_tables(file)?);
    }

    let records = RecordService::new(db, Arc::new(reflection));
    let ctx = RequestContext::new().with_join_limits(settings.joins);
    Ok(App { records, ctx })
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::InvalidInput(e.to_string()))
}

fn parse_json(json: &str) -> Result<Value> {
    serde_json::from_str(json).map_err(|e| Error::InvalidInput(e.to_string()))
}

fn parse_params(pairs: &[String]) -> Result<Params> {
    pairs
        .iter()
        .map(|pair| {
            Params::parse_pair(pair)
                .ok_or_else(|| Error::InvalidInput(format!("expected key=value, got '{}'", pair)))
        })
        .collect::<Result<Vec<_>>>()
        .map(|pairs| pairs.into_iter().collect())
}

fn split_ids(id: &str) -> Vec<String> {
    id.split(',').map(|s| s.trim().to_string()).collect()
}

/// Records of a body: an array means a batch.
fn body_records(body: Value) -> (Vec<Value>, bool) {
    match body {
        Value::Array(items) => (items, true),
        other => (vec![other], false),
    }
}

async fn run(app: &App, command: Commands) -> Result<Value> {
    let records = &app.records;
    let ctx = &app.ctx;
    match command {
        Commands::Tables => to_value(records.reflection().table_names().await?),
        Commands::Describe { table } => {
            let definition = records
                .reflection()
                .table(&table)
                .await?
                .ok_or(Error::TableNotFound(table))?;
            to_value(definition)
        }
        Commands::List { table, params } => {
            to_value(records.list(ctx, &table, &parse_params(&params)?).await?)
        }
        Commands::Read { table, id, params } => {
            let params = parse_params(&params)?;
            let ids = split_ids(&id);
            if ids.len() > 1 {
                to_value(records.read_batch(ctx, &table, &ids, &params).await?)
            } else {
                to_value(records.read(ctx, &table, &id, &params).await?)
            }
        }
        Commands::Create { table, json } => match body_records(parse_json(&json)?) {
            (items, true) => to_value(records.create_batch(ctx, &table, &items).await?),
            (items, false) => to_value(records.create(ctx, &table, &items[0]).await?),
        },
        Commands::Update { table, id, json } => {
            let ids = split_ids(&id);
            match body_records(parse_json(&json)?) {
                (items, true) => to_value(records.update_batch(ctx, &table, &ids, &items).await?),
                (items, false) if ids.len() == 1 => {
                    to_value(records.update(ctx, &table, &ids[0], &items[0]).await?)
                }
                (items, false) => to_value(records.update_batch(ctx, &table, &ids, &items).await?),
            }
        }
        Commands::Increment { table, id, json } => {
            let ids = split_ids(&id);
            match body_records(parse_json(&json)?) {
                (items, true) => to_value(records.increment_batch(ctx, &table, &ids, &items).await?),
                (items, false) if ids.len() == 1 => {
                    to_value(records.increment(ctx, &table, &ids[0], &items[0]).await?)
                }
                (items, false) => to_value(records.increment_batch(ctx, &table, &ids, &items).await?),
            }
        }
        Commands::Delete { table, id } => {
            let ids = split_ids(&id);
            if ids.len() > 1 {
                to_value(records.delete_batch(ctx, &table, &ids).await?)
            } else {
                to_value(records.delete(ctx, &table, &id).await?)
            }
        }
    }
}
