//! Reflected column descriptor.

use serde::{Deserialize, Serialize};

use super::types::{CanonicalType, DEFAULT_LENGTH, DEFAULT_PRECISION, DEFAULT_SCALE};

/// One column of a reflected (or virtual) table.
///
/// `length` is only meaningful for types with a length, `precision` and
/// `scale` only for decimals; the constructor fills type defaults and zeroes
/// the rest, so two columns built from the same input always compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColumnRecord", into = "ColumnRecord")]
pub struct ReflectedColumn {
    pub name: String,
    pub kind: CanonicalType,
    pub length: u32,
    pub precision: u32,
    pub scale: u32,
    pub nullable: bool,
    pub pk: bool,
    /// Referenced table name, empty if the column is not a foreign key.
    pub fk: String,
}

impl ReflectedColumn {
    pub fn new(
        name: impl Into<String>,
        kind: CanonicalType,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> Self {
        let length = if kind.has_length() {
            length.filter(|l| *l > 0).unwrap_or(DEFAULT_LENGTH)
        } else {
            0
        };
        let precision = if kind.has_precision() {
            precision.filter(|p| *p > 0).unwrap_or(DEFAULT_PRECISION)
        } else {
            0
        };
        let scale = if kind.has_scale() {
            scale.unwrap_or(DEFAULT_SCALE)
        } else {
            0
        };
        Self {
            name: name.into(),
            kind,
            length,
            precision,
            scale,
            nullable: true,
            pk: false,
            fk: String::new(),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn primary_key(mut self, pk: bool) -> Self {
        self.pk = pk;
        self
    }

    pub fn references(mut self, table: impl Into<String>) -> Self {
        self.fk = table.into();
        self
    }

    pub fn is_fk(&self) -> bool {
        !self.fk.is_empty()
    }

    /// Size suffix for DDL: `255`, `10,2` or nothing.
    pub fn size(&self) -> Option<String> {
        if self.kind.has_length() {
            Some(self.length.to_string())
        } else if self.kind.has_precision() {
            Some(format!("{},{}", self.precision, self.scale))
        } else {
            None
        }
    }
}

/// Serialized form: sizes only appear for types that carry them.
#[derive(Serialize, Deserialize)]
struct ColumnRecord {
    name: String,
    #[serde(rename = "type")]
    kind: CanonicalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<u32>,
    #[serde(default)]
    nullable: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pk: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    fk: String,
}

impl From<ColumnRecord> for ReflectedColumn {
    fn from(r: ColumnRecord) -> Self {
        ReflectedColumn::new(r.name, r.kind, r.length, r.precision, r.scale)
            .nullable(r.nullable)
            .primary_key(r.pk)
            .references(r.fk)
    }
}

impl From<ReflectedColumn> for ColumnRecord {
    fn from(c: ReflectedColumn) -> Self {
        ColumnRecord {
            length: c.kind.has_length().then_some(c.length),
            precision: c.kind.has_precision().then_some(c.precision),
            scale: c.kind.has_scale().then_some(c.scale),
            name: c.name,
            kind: c.kind,
            nullable: c.nullable,
            pk: c.pk,
            fk: c.fk,
        }
    }
}
