//! Configuration module for autocrud.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, CacheBackend, CacheSettings, DatabaseSettings, SchemaSettings, Settings,
    SettingsError,
};
