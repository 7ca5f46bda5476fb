//! DML (Data Manipulation Language) support.
//!
//! This module provides builders for the single-table INSERT, UPDATE and
//! DELETE statements the record engine issues. Values arrive as token
//! streams (a bind parameter, possibly wrapped by a column conversion), so
//! nothing here ever formats a value into SQL text.
//!
//! # Examples
//!
//! ```ignore
//! use autocrud::sql::{Assignment, Delete, Dialect, Insert, Update};
//!
//! let insert = Insert::into("posts")
//!     .value("content", param("hello"))
//!     .returning("id");
//!
//! let update = Update::table("products")
//!     .assign(Assignment::increment("visits", param(1)))
//!     .filter(Some(where_clause));
//! ```

use super::dialect::{Dialect, SqlDialect};
use super::token::{Statement, Token, TokenStream};

// ============================================================================
// INSERT
// ============================================================================

/// INSERT statement.
#[derive(Debug, Clone, Default)]
#[must_use = "DML statements have no effect until rendered with build()"]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<TokenStream>,
    pub returning: Option<String>,
}

impl Insert {
    /// Create a new INSERT statement.
    pub fn into(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Add a column and its value expression.
    pub fn value(mut self, column: &str, value: TokenStream) -> Self {
        self.columns.push(column.into());
        self.values.push(value);
        self
    }

    /// Return the generated key column (RETURNING or OUTPUT INSERTED, per dialect).
    pub fn returning(mut self, column: &str) -> Self {
        self.returning = Some(column.into());
        self
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Insert)
            .space()
            .push(Token::Into)
            .space()
            .ident(&self.table);

        if !self.columns.is_empty() {
            ts.space().lparen();
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.ident(col);
            }
            ts.rparen();
        }

        // T-SQL: OUTPUT goes before VALUES
        if let Some(pk) = &self.returning {
            if dialect.supports_output_inserted() {
                ts.space()
                    .push(Token::Output)
                    .space()
                    .push(Token::Inserted)
                    .push(Token::Dot)
                    .ident(pk);
            }
        }

        if self.values.is_empty() {
            if dialect.supports_default_values() {
                ts.space()
                    .push(Token::Default)
                    .space()
                    .push(Token::Values);
            } else {
                ts.space().lparen().rparen().space().push(Token::Values).space().lparen().rparen();
            }
        } else {
            ts.space().push(Token::Values).space().lparen();
            for (i, val) in self.values.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(val);
            }
            ts.rparen();
        }

        if let Some(pk) = &self.returning {
            if dialect.supports_returning() {
                ts.space().push(Token::Returning).space().ident(pk);
            }
        }

        ts
    }

    pub fn build(&self, dialect: Dialect) -> Statement {
        self.to_tokens(dialect).build(dialect)
    }
}

// ============================================================================
// UPDATE
// ============================================================================

/// One entry of a SET clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `col = value`
    Set { column: String, value: TokenStream },
    /// `col = col + value`
    Increment { column: String, value: TokenStream },
}

impl Assignment {
    pub fn set(column: &str, value: TokenStream) -> Self {
        Assignment::Set {
            column: column.into(),
            value,
        }
    }

    pub fn increment(column: &str, value: TokenStream) -> Self {
        Assignment::Increment {
            column: column.into(),
            value,
        }
    }

    fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            Assignment::Set { column, value } => {
                ts.ident(column)
                    .space()
                    .push(Token::Eq)
                    .space()
                    .append(value);
            }
            Assignment::Increment { column, value } => {
                ts.ident(column)
                    .space()
                    .push(Token::Eq)
                    .space()
                    .ident(column)
                    .space()
                    .push(Token::Plus)
                    .space()
                    .append(value);
            }
        }
        ts
    }
}

/// UPDATE statement.
#[derive(Debug, Clone, Default)]
#[must_use = "DML statements have no effect until rendered with build()"]
pub struct Update {
    pub table: String,
    pub set: Vec<Assignment>,
    pub filter: Option<TokenStream>,
}

impl Update {
    /// Create a new UPDATE statement.
    pub fn table(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Add a SET entry.
    pub fn assign(mut self, assignment: Assignment) -> Self {
        self.set.push(assignment);
        self
    }

    /// Set the WHERE clause.
    pub fn filter(mut self, filter: Option<TokenStream>) -> Self {
        self.filter = filter;
        self
    }

    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Update)
            .space()
            .ident(&self.table)
            .space()
            .push(Token::Set)
            .space();
        for (i, assignment) in self.set.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&assignment.to_tokens());
        }

        if let Some(filter) = &self.filter {
            ts.space().push(Token::Where).space().append(filter);
        }

        ts
    }

    pub fn build(&self, dialect: Dialect) -> Statement {
        self.to_tokens().build(dialect)
    }
}

// ============================================================================
// DELETE
// ============================================================================

/// DELETE statement.
#[derive(Debug, Clone, Default)]
#[must_use = "DML statements have no effect until rendered with build()"]
pub struct Delete {
    pub table: String,
    pub filter: Option<TokenStream>,
}

impl Delete {
    /// Create a new DELETE statement.
    pub fn from(table: &str) -> Self {
        Self {
            table: table.into(),
            filter: None,
        }
    }

    /// Set the WHERE clause.
    pub fn filter(mut self, filter: Option<TokenStream>) -> Self {
        self.filter = filter;
        self
    }

    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Delete)
            .space()
            .push(Token::From)
            .space()
            .ident(&self.table);
        if let Some(filter) = &self.filter {
            ts.space().push(Token::Where).space().append(filter);
        }
        ts
    }

    pub fn build(&self, dialect: Dialect) -> Statement {
        self.to_tokens().build(dialect)
    }
}

// ============================================================================
// Tests
// ============================================================================
