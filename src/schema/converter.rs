//! Native <-> canonical type mapping.
//!
//! Reflection maps a native type in three stages: the dialect map keyed by
//! `type(size)`, the dialect map keyed by the bare type, then a map shared by
//! all dialects that folds the remaining JDBC-style names (`nchar`,
//! `longvarchar`, `numeric`, ...) onto the canonical vocabulary.

use std::sync::LazyLock;

use regex::Regex;

use super::types::CanonicalType;
use crate::error::{Error, Result};
use crate::sql::dialect::{Dialect, SqlDialect};

/// Cross-dialect normalization applied after the dialect map.
const SIMPLIFIED: &[(&str, &str)] = &[
    ("char", "varchar"),
    ("nchar", "varchar"),
    ("nvarchar", "varchar"),
    ("longvarchar", "clob"),
    ("longnvarchar", "clob"),
    ("nclob", "clob"),
    ("binary", "varbinary"),
    ("longvarbinary", "blob"),
    ("tinyint", "integer"),
    ("smallint", "integer"),
    ("real", "float"),
    ("numeric", "decimal"),
];

static NATIVE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9_ ]*)(\((\d+)(\s*,\s*(\d+))?\))?").unwrap());

fn lookup<'a>(map: &'a [(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    map.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Split a reported type such as `decimal(10,2)` or `int(11) unsigned` into
/// the bare name and its (up to two) size numbers.
pub fn split_native(native: &str) -> (String, Option<u32>, Option<u32>) {
    let lowered = native.trim().to_lowercase();
    match NATIVE_TYPE.captures(&lowered) {
        Some(caps) => {
            let name = caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            let first = caps.get(3).and_then(|m| m.as_str().parse().ok());
            let second = caps.get(5).and_then(|m| m.as_str().parse().ok());
            (name, first, second)
        }
        None => (lowered, None, None),
    }
}

/// Size string used as the `type(size)` lookup key: the length when the
/// catalog reported one, else `precision[,scale]`.
pub fn native_size(length: Option<u32>, precision: Option<u32>, scale: Option<u32>) -> String {
    match (length, precision) {
        (Some(length), _) => length.to_string(),
        (None, Some(p)) if p > 0 => match scale {
            Some(s) if s > 0 => format!("{},{}", p, s),
            _ => p.to_string(),
        },
        _ => String::new(),
    }
}

/// Maps native types of one dialect to and from canonical types.
#[derive(Debug, Clone, Copy)]
pub struct TypeConverter {
    dialect: Dialect,
}

impl TypeConverter {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Canonical type of a native type, `size` being the `native_size` string.
    pub fn to_canonical(&self, native: &str, size: &str) -> Result<CanonicalType> {
        let native = native.trim().to_lowercase();
        let map = self.dialect.native_type_map();

        let sized = if size.is_empty() {
            None
        } else {
            lookup(map, &format!("{}({})", native, size))
        };
        let mapped = sized
            .or_else(|| lookup(map, &native))
            .unwrap_or(native.as_str());
        let simplified = lookup(SIMPLIFIED, mapped).unwrap_or(mapped);

        simplified
            .parse()
            .map_err(|_| Error::UnsupportedType {
                native: if size.is_empty() {
                    native.clone()
                } else {
                    format!("{}({})", native, size)
                },
                dialect: self.dialect.to_string(),
            })
    }

    /// Native type name used in DDL for a canonical type (without size).
    pub fn from_canonical(&self, kind: CanonicalType) -> String {
        lookup(self.dialect.ddl_type_map(), kind.as_str())
            .unwrap_or(kind.as_str())
            .to_string()
    }

    /// Native DDL type including the size, e.g. `varchar(255)` or `decimal(10,2)`.
    ///
    /// Types whose DDL name already carries a size (`tinyint(1)`, `time(0)`)
    /// are returned as-is.
    pub fn ddl_type(&self, kind: CanonicalType, size: Option<&str>) -> String {
        let native = self.from_canonical(kind);
        match size {
            Some(size) if !native.contains('(') => format!("{}({})", native, size),
            _ => native,
        }
    }
}
