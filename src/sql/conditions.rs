//! Conditions builder - renders a [`Condition`] tree to a WHERE clause.
//!
//! Every value becomes a bind parameter. Compound conditions are always
//! parenthesized so the rendered tree never depends on operator precedence.

use serde_json::Value;

use super::converter::ColumnConverter;
use super::dialect::{Dialect, SqlDialect};
use super::token::{Token, TokenStream};
use crate::record::condition::{ColumnOperator, Condition};
use crate::schema::ReflectedColumn;

#[derive(Debug, Clone, Copy)]
pub struct ConditionsBuilder {
    dialect: Dialect,
    converter: ColumnConverter,
}

/// Escape LIKE wildcards so the value matches literally.
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

impl ConditionsBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            converter: ColumnConverter::new(dialect),
        }
    }

    /// Render `condition`. `None` when it places no restriction.
    pub fn build(&self, condition: &Condition) -> Option<TokenStream> {
        match condition {
            Condition::No => None,
            Condition::Column {
                column,
                operator,
                value,
            } => Some(self.column(column, *operator, value)),
            Condition::Spatial {
                column,
                operator,
                value,
            } => {
                let argument = operator
                    .takes_argument()
                    .then(|| Value::String(value.clone()));
                Some(
                    self.dialect
                        .emit_spatial_predicate(operator.function(), &column.name, argument),
                )
            }
            Condition::Not(inner) => {
                let inner = self.build(inner)?;
                let mut ts = TokenStream::new();
                ts.lparen()
                    .push(Token::Not)
                    .space()
                    .append(&inner)
                    .rparen();
                Some(ts)
            }
            Condition::And(items) => self.junction(items, Token::And),
            Condition::Or(items) => self.junction(items, Token::Or),
        }
    }

    fn junction(&self, items: &[Condition], keyword: Token) -> Option<TokenStream> {
        let parts: Vec<TokenStream> = items.iter().filter_map(|c| self.build(c)).collect();
        match parts.len() {
            0 => None,
            1 => parts.into_iter().next(),
            _ => {
                let mut ts = TokenStream::new();
                ts.lparen();
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        ts.space().push(keyword.clone()).space();
                    }
                    ts.append(part);
                }
                ts.rparen();
                Some(ts)
            }
        }
    }

    fn column(&self, column: &ReflectedColumn, operator: ColumnOperator, value: &str) -> TokenStream {
        let mut ts = TokenStream::new();
        match operator {
            ColumnOperator::Contains | ColumnOperator::StartsWith | ColumnOperator::EndsWith => {
                let escaped = escape_like(value);
                let pattern = match operator {
                    ColumnOperator::Contains => format!("%{}%", escaped),
                    ColumnOperator::StartsWith => format!("{}%", escaped),
                    _ => format!("%{}", escaped),
                };
                ts.ident(&column.name)
                    .space()
                    .push(Token::Like)
                    .space()
                    .param(Value::String(pattern));
                if self.dialect.requires_like_escape_clause() {
                    ts.raw(" ESCAPE '\\'");
                }
            }
            ColumnOperator::Eq
            | ColumnOperator::Lt
            | ColumnOperator::Le
            | ColumnOperator::Ge
            | ColumnOperator::Gt => {
                let op = match operator {
                    ColumnOperator::Eq => Token::Eq,
                    ColumnOperator::Lt => Token::Lt,
                    ColumnOperator::Le => Token::Lte,
                    ColumnOperator::Ge => Token::Gte,
                    _ => Token::Gt,
                };
                ts.ident(&column.name)
                    .space()
                    .push(op)
                    .space()
                    .append(&self.bound(column, value));
            }
            ColumnOperator::Between => {
                let bounds: Vec<&str> = value.split(',').collect();
                match bounds.as_slice() {
                    [low, high] => {
                        ts.lparen()
                            .ident(&column.name)
                            .space()
                            .push(Token::Gte)
                            .space()
                            .append(&self.bound(column, low))
                            .space()
                            .push(Token::And)
                            .space()
                            .ident(&column.name)
                            .space()
                            .push(Token::Lte)
                            .space()
                            .append(&self.bound(column, high))
                            .rparen();
                    }
                    _ => {
                        ts.raw(self.dialect.false_literal());
                    }
                }
            }
            ColumnOperator::In => {
                if value.is_empty() {
                    ts.raw(self.dialect.false_literal());
                } else {
                    ts.ident(&column.name)
                        .space()
                        .push(Token::In)
                        .space()
                        .lparen();
                    for (i, item) in value.split(',').enumerate() {
                        if i > 0 {
                            ts.comma();
                        }
                        ts.append(&self.bound(column, item));
                    }
                    ts.rparen();
                }
            }
            ColumnOperator::IsNull => {
                ts.ident(&column.name).space().push(Token::IsNull);
            }
        }
        ts
    }

    fn bound(&self, column: &ReflectedColumn, text: &str) -> TokenStream {
        self.converter
            .param(column, self.converter.typed_value(column, text))
    }
}
