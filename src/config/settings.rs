//! TOML-based configuration for autocrud.
//!
//! Supports a config file (autocrud.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! debug = false
//!
//! [database]
//! driver = "sqlite"
//! name = "blog"
//! connection_string = "${BLOG_DB}"
//! tables = ["posts", "comments"]
//!
//! [cache]
//! backend = "sqlite"      # memory | sqlite | none
//! path = "~/.autocrud/cache.db"
//! ttl_seconds = 10
//!
//! [joins]
//! max_depth = 3
//! max_tables = 10
//! max_records = 1000
//!
//! [schema]
//! virtual_tables = "virtual.json"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::db::JoinLimits;
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Include error sources in error documents.
    pub debug: bool,

    pub database: DatabaseSettings,

    pub cache: CacheSettings,

    pub joins: JoinLimits,

    pub schema: SchemaSettings,
}

/// Database connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Driver name (mysql, pgsql, sqlsrv, sqlite).
    pub driver: String,

    /// Database (catalog) name used by reflection.
    pub name: String,

    /// Connection string (supports ${ENV_VAR} expansion). For SQLite, a file path.
    pub connection_string: String,

    /// Tables to expose. Empty exposes all.
    pub tables: Vec<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            name: "main".to_string(),
            connection_string: String::new(),
            tables: Vec::new(),
        }
    }
}

impl DatabaseSettings {
    /// Get the dialect for the configured driver.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        Dialect::from_driver(&self.driver)
            .ok_or_else(|| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }
}

/// Where schema snapshots are kept between reflections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Sqlite,
    None,
}

/// Schema cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackend,

    /// Cache file for the sqlite backend. `~` expands to the home directory.
    pub path: Option<String>,

    /// Snapshot lifetime in seconds. 0 keeps the snapshot until refreshed
    /// and disables persistence.
    pub ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            path: None,
            ttl_seconds: 10,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Cache file path with `~` and environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let expanded = expand_env_vars(path)?;
        if let Some(rest) = expanded.strip_prefix("~/") {
            let home = dirs::home_dir().ok_or_else(|| {
                SettingsError::InvalidConfig("cannot resolve home directory".to_string())
            })?;
            return Ok(Some(home.join(rest)));
        }
        Ok(Some(PathBuf::from(expanded)))
    }
}

/// Schema configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// JSON file of virtual table definitions merged into the reflected schema.
    pub virtual_tables: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `AUTOCRUD_CONFIG`
    /// 2. `./autocrud.toml`
    /// 3. `~/.config/autocrud/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("AUTOCRUD_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("autocrud.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("autocrud").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }
        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
