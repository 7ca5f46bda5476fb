//! Canonical column types.
//!
//! Every native type a dialect reports is normalized to one of these
//! fourteen names; schema edits map them back to native DDL types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LENGTH: u32 = 255;
pub const DEFAULT_PRECISION: u32 = 19;
pub const DEFAULT_SCALE: u32 = 4;

/// Portable column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    Integer,
    Bigint,
    Varchar,
    Clob,
    Varbinary,
    Blob,
    Decimal,
    Float,
    Double,
    Date,
    Time,
    Timestamp,
    Geometry,
    Boolean,
}

impl CanonicalType {
    pub const ALL: [CanonicalType; 14] = [
        CanonicalType::Integer,
        CanonicalType::Bigint,
        CanonicalType::Varchar,
        CanonicalType::Clob,
        CanonicalType::Varbinary,
        CanonicalType::Blob,
        CanonicalType::Decimal,
        CanonicalType::Float,
        CanonicalType::Double,
        CanonicalType::Date,
        CanonicalType::Time,
        CanonicalType::Timestamp,
        CanonicalType::Geometry,
        CanonicalType::Boolean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::Integer => "integer",
            CanonicalType::Bigint => "bigint",
            CanonicalType::Varchar => "varchar",
            CanonicalType::Clob => "clob",
            CanonicalType::Varbinary => "varbinary",
            CanonicalType::Blob => "blob",
            CanonicalType::Decimal => "decimal",
            CanonicalType::Float => "float",
            CanonicalType::Double => "double",
            CanonicalType::Date => "date",
            CanonicalType::Time => "time",
            CanonicalType::Timestamp => "timestamp",
            CanonicalType::Geometry => "geometry",
            CanonicalType::Boolean => "boolean",
        }
    }

    pub fn has_length(&self) -> bool {
        matches!(self, CanonicalType::Varchar | CanonicalType::Varbinary)
    }

    pub fn has_precision(&self) -> bool {
        matches!(self, CanonicalType::Decimal)
    }

    pub fn has_scale(&self) -> bool {
        matches!(self, CanonicalType::Decimal)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, CanonicalType::Blob | CanonicalType::Varbinary)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, CanonicalType::Boolean)
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self, CanonicalType::Geometry)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, CanonicalType::Integer | CanonicalType::Bigint)
    }

    /// Float, double and decimal.
    pub fn is_fractional(&self) -> bool {
        matches!(
            self,
            CanonicalType::Float | CanonicalType::Double | CanonicalType::Decimal
        )
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("not a canonical type: '{}'", s))
    }
}
