//! Per-column value and expression conversion.
//!
//! Binary columns travel as base64 text and geometry columns as WKT. Whether
//! the database or the engine does the conversion depends on the dialect;
//! this module asks the dialect and wraps expressions accordingly.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use super::dialect::{Dialect, SqlDialect};
use super::query::SelectItem;
use super::token::TokenStream;
use crate::schema::ReflectedColumn;

/// Convert base64url (`-_`, unpadded) to standard padded base64.
pub fn base64url_to_base64(value: &str) -> String {
    let mut out: String = value
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while out.len() % 4 != 0 {
        out.push('=');
    }
    out
}

/// Bytes of a base64 or base64url string.
pub fn decode_base64(value: &str) -> Option<Vec<u8>> {
    STANDARD.decode(base64url_to_base64(value)).ok()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnConverter {
    dialect: Dialect,
}

impl ColumnConverter {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Wrap a bound value written to or compared with `column`.
    pub fn input(&self, column: &ReflectedColumn, value: TokenStream) -> TokenStream {
        if column.kind.is_boolean() {
            self.dialect.convert_boolean_input(value)
        } else if column.kind.is_binary() {
            self.dialect.convert_binary_input(value)
        } else if column.kind.is_geometry() {
            self.dialect.convert_geometry_input(value)
        } else {
            value
        }
    }

    /// A single bind parameter for `column`, wrapped by [`ColumnConverter::input`].
    pub fn param(&self, column: &ReflectedColumn, value: Value) -> TokenStream {
        let value = match value {
            Value::String(text) if column.kind.is_binary() => self.binary_value(&text),
            other => other,
        };
        let mut ts = TokenStream::new();
        ts.param(value);
        self.input(column, ts)
    }

    /// Bind form of a base64url binary: standard base64, or hex for
    /// dialects that decode with `unhex`. Undecodable text is bound as given.
    fn binary_value(&self, text: &str) -> Value {
        if !self.dialect.binds_binary_as_hex() {
            return Value::String(base64url_to_base64(text));
        }
        match decode_base64(text) {
            Some(bytes) => Value::String(to_hex(&bytes)),
            None => Value::String(text.to_string()),
        }
    }

    /// SELECT list item for `column`, converted and aliased back when needed.
    pub fn select_item(&self, column: &ReflectedColumn) -> SelectItem {
        let converted = if column.kind.is_binary() {
            self.dialect.convert_binary_output(&column.name)
        } else if column.kind.is_geometry() {
            self.dialect.convert_geometry_output(&column.name)
        } else {
            None
        };
        match converted {
            Some(expr) => SelectItem::expr(expr, &column.name),
            None => SelectItem::column(&column.name),
        }
    }

    /// Bind value for a filter argument given as text.
    ///
    /// Numbers are bound as numbers so comparisons stay numeric; text that
    /// does not parse is bound as-is and left to the database.
    pub fn typed_value(&self, column: &ReflectedColumn, text: &str) -> Value {
        let kind = column.kind;
        if kind.is_integer() {
            if let Ok(n) = text.trim().parse::<i64>() {
                return Value::from(n);
            }
        } else if kind.is_fractional() && !kind.has_precision() {
            if let Some(n) = text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                return Value::Number(n);
            }
        } else if kind.is_boolean() {
            match text.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => return Value::Bool(true),
                "0" | "false" | "no" | "off" => return Value::Bool(false),
                _ => {}
            }
        }
        Value::String(text.to_string())
    }
}
