//! Query builder - SELECT and COUNT over a single table.

use super::dialect::{Dialect, SqlDialect};
use super::token::{Statement, Token, TokenStream};

// =============================================================================
// Select Item (column expression with optional alias)
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectItem {
    pub expr: TokenStream,
    pub alias: Option<String>,
}

impl SelectItem {
    /// A plain quoted column.
    pub fn column(name: &str) -> Self {
        let mut expr = TokenStream::new();
        expr.ident(name);
        Self { expr, alias: None }
    }

    /// A converted expression, aliased back to the column name.
    pub fn expr(expr: TokenStream, alias: &str) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = self.expr.clone();
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// An ORDER BY column.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub column: String,
    pub dir: SortDir,
}

impl OrderByExpr {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Desc,
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.ident(&self.column).space().push(match self.dir {
            SortDir::Asc => Token::Asc,
            SortDir::Desc => Token::Desc,
        });
        ts
    }
}

// =============================================================================
// LIMIT / OFFSET
// =============================================================================

/// LIMIT and OFFSET clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitOffset {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl LimitOffset {
    /// Convert to token stream using dialect-specific pagination.
    ///
    /// Delegates to `SqlDialect::emit_limit_offset()` for the actual formatting.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        dialect.emit_limit_offset(self.limit, self.offset)
    }
}

// =============================================================================
// SELECT
// =============================================================================

/// A single-table SELECT.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct Select {
    pub table: String,
    pub columns: Vec<SelectItem>,
    pub filter: Option<TokenStream>,
    pub order_by: Vec<OrderByExpr>,
    pub limit_offset: Option<LimitOffset>,
}

impl Select {
    /// Start a SELECT from `table`.
    pub fn from(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Set the SELECT list. An empty list selects `*`.
    pub fn columns(mut self, items: impl IntoIterator<Item = SelectItem>) -> Self {
        self.columns = items.into_iter().collect();
        self
    }

    /// Set the WHERE clause (already rendered by the conditions builder).
    pub fn filter(mut self, filter: Option<TokenStream>) -> Self {
        self.filter = filter;
        self
    }

    /// Set the ORDER BY clause.
    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Set LIMIT and OFFSET. Nothing is emitted without a limit.
    pub fn limit_offset(mut self, limit: Option<u64>, offset: u64) -> Self {
        self.limit_offset = limit.map(|limit| LimitOffset {
            limit: Some(limit),
            offset: Some(offset),
        });
        self
    }

    /// Convert to token stream for a specific dialect.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Select).space();
        if self.columns.is_empty() {
            ts.push(Token::Star);
        }
        for (i, item) in self.columns.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&item.to_tokens());
        }

        ts.space().push(Token::From).space().ident(&self.table);

        if let Some(filter) = &self.filter {
            ts.space().push(Token::Where).space().append(filter);
        }

        // T-SQL requires ORDER BY for OFFSET FETCH syntax.
        let needs_order_by_placeholder = dialect.requires_order_by_for_offset()
            && self.order_by.is_empty()
            && self.limit_offset.is_some();

        if !self.order_by.is_empty() {
            ts.space().push(Token::OrderBy).space();
            for (i, order_expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&order_expr.to_tokens());
            }
        } else if needs_order_by_placeholder {
            // Row order is unspecified here; callers that page should pass an ordering.
            ts.space()
                .push(Token::OrderBy)
                .space()
                .lparen()
                .push(Token::Select)
                .space()
                .push(Token::Null)
                .rparen();
        }

        if let Some(lo) = &self.limit_offset {
            ts.space().append(&lo.to_tokens(dialect));
        }

        ts
    }

    /// Render SQL text and parameters.
    pub fn build(&self, dialect: Dialect) -> Statement {
        self.to_tokens(dialect).build(dialect)
    }
}

// =============================================================================
// COUNT
// =============================================================================

/// `SELECT COUNT(*) FROM t [WHERE ...]`
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct Count {
    pub table: String,
    pub filter: Option<TokenStream>,
}

impl Count {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.into(),
            filter: None,
        }
    }

    pub fn filter(mut self, filter: Option<TokenStream>) -> Self {
        self.filter = filter;
        self
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Select)
            .space()
            .push(Token::FunctionName("count".into()))
            .lparen()
            .push(Token::Star)
            .rparen()
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

// =============================================================================
// Tests
// =============================================================================
