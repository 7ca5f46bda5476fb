//! Condition algebra.
//!
//! A [`Condition`] is an immutable tree built from filter strings of the
//! form `column,operator[,value]`. [`Condition::No`] is the identity of
//! both `and` and `or`, so folds can start from it without special cases.

use tracing::warn;

use crate::schema::{ReflectedColumn, ReflectedTable};

/// Comparison operators on a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOperator {
    /// `cs`: contains string
    Contains,
    /// `sw`: starts with
    StartsWith,
    /// `ew`: ends with
    EndsWith,
    Eq,
    Lt,
    Le,
    Ge,
    Gt,
    /// `bt`: between two comma-separated bounds
    Between,
    /// `in`: one of a comma-separated list
    In,
    /// `is`: is null
    IsNull,
}

impl ColumnOperator {
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "cs" => ColumnOperator::Contains,
            "sw" => ColumnOperator::StartsWith,
            "ew" => ColumnOperator::EndsWith,
            "eq" => ColumnOperator::Eq,
            "lt" => ColumnOperator::Lt,
            "le" => ColumnOperator::Le,
            "ge" => ColumnOperator::Ge,
            "gt" => ColumnOperator::Gt,
            "bt" => ColumnOperator::Between,
            "in" => ColumnOperator::In,
            "is" => ColumnOperator::IsNull,
            _ => return None,
        })
    }

    pub fn code(&self) -> &'static str {
        match self {
            ColumnOperator::Contains => "cs",
            ColumnOperator::StartsWith => "sw",
            ColumnOperator::EndsWith => "ew",
            ColumnOperator::Eq => "eq",
            ColumnOperator::Lt => "lt",
            ColumnOperator::Le => "le",
            ColumnOperator::Ge => "ge",
            ColumnOperator::Gt => "gt",
            ColumnOperator::Between => "bt",
            ColumnOperator::In => "in",
            ColumnOperator::IsNull => "is",
        }
    }
}

/// Spatial predicates on a geometry column (`s` prefixed operators).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialOperator {
    Contains,
    Crosses,
    Disjoint,
    Equals,
    Intersects,
    Overlaps,
    Touches,
    Within,
    IsClosed,
    IsSimple,
    IsValid,
}

impl SpatialOperator {
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "co" => SpatialOperator::Contains,
            "cr" => SpatialOperator::Crosses,
            "di" => SpatialOperator::Disjoint,
            "eq" => SpatialOperator::Equals,
            "in" => SpatialOperator::Intersects,
            "ov" => SpatialOperator::Overlaps,
            "to" => SpatialOperator::Touches,
            "wi" => SpatialOperator::Within,
            "ic" => SpatialOperator::IsClosed,
            "is" => SpatialOperator::IsSimple,
            "iv" => SpatialOperator::IsValid,
            _ => return None,
        })
    }

    /// Predicate name without the `ST_` prefix.
    pub fn function(&self) -> &'static str {
        match self {
            SpatialOperator::Contains => "Contains",
            SpatialOperator::Crosses => "Crosses",
            SpatialOperator::Disjoint => "Disjoint",
            SpatialOperator::Equals => "Equals",
            SpatialOperator::Intersects => "Intersects",
            SpatialOperator::Overlaps => "Overlaps",
            SpatialOperator::Touches => "Touches",
            SpatialOperator::Within => "Within",
            SpatialOperator::IsClosed => "IsClosed",
            SpatialOperator::IsSimple => "IsSimple",
            SpatialOperator::IsValid => "IsValid",
        }
    }

    /// Whether the predicate compares against a WKT argument.
    pub fn takes_argument(&self) -> bool {
        !matches!(
            self,
            SpatialOperator::IsClosed | SpatialOperator::IsSimple | SpatialOperator::IsValid
        )
    }
}

/// Boolean predicate over the columns of one table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Condition {
    /// Matches everything; renders no WHERE clause.
    #[default]
    No,
    Column {
        column: ReflectedColumn,
        operator: ColumnOperator,
        value: String,
    },
    Spatial {
        column: ReflectedColumn,
        operator: SpatialOperator,
        value: String,
    },
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn column(column: &ReflectedColumn, operator: ColumnOperator, value: impl Into<String>) -> Self {
        Condition::Column {
            column: column.clone(),
            operator,
            value: value.into(),
        }
    }

    pub fn is_no(&self) -> bool {
        matches!(self, Condition::No)
    }

    /// Conjunction. `No` is the identity and an existing `And` is extended.
    pub fn and(self, other: Condition) -> Condition {
        match (self, other) {
            (Condition::No, other) => other,
            (this, Condition::No) => this,
            (Condition::And(mut items), other) => {
                items.push(other);
                Condition::And(items)
            }
            (this, other) => Condition::And(vec![this, other]),
        }
    }

    /// Disjunction. `No` is the identity and an existing `Or` is extended.
    pub fn or(self, other: Condition) -> Condition {
        match (self, other) {
            (Condition::No, other) => other,
            (this, Condition::No) => this,
            (Condition::Or(mut items), other) => {
                items.push(other);
                Condition::Or(items)
            }
            (this, other) => Condition::Or(vec![this, other]),
        }
    }

    /// Negation. The negation of `No` is `No`.
    pub fn not(self) -> Condition {
        match self {
            Condition::No => Condition::No,
            this => Condition::Not(Box::new(this)),
        }
    }

    /// Parse `column,operator[,value]` against `table`.
    ///
    /// Operators longer than two characters may carry an `n` prefix (negate)
    /// and then an `s` prefix (spatial), e.g. `neq`, `sin`, `nsco`. Anything
    /// that cannot be parsed yields `No`.
    pub fn from_filter(table: &ReflectedTable, filter: &str) -> Condition {
        let parts: Vec<&str> = filter.splitn(3, ',').collect();
        if parts.len() < 2 {
            warn!(table = table.name(), filter, "ignoring filter without operator");
            return Condition::No;
        }
        let Some(column) = table.column(parts[0]) else {
            warn!(table = table.name(), column = parts[0], "ignoring filter on unknown column");
            return Condition::No;
        };
        let value = parts.get(2).copied().unwrap_or_default().to_string();

        let mut op = parts[1];
        let mut negate = false;
        let mut spatial = false;
        if op.len() > 2 && op.starts_with('n') {
            negate = true;
            op = &op[1..];
        }
        if op.len() > 2 && op.starts_with('s') {
            spatial = true;
            op = &op[1..];
        }

        let condition = if spatial {
            SpatialOperator::from_code(op).map(|operator| Condition::Spatial {
                column: column.clone(),
                operator,
                value,
            })
        } else {
            ColumnOperator::from_code(op).map(|operator| Condition::Column {
                column: column.clone(),
                operator,
                value,
            })
        };

        match condition {
            Some(c) if negate => c.not(),
            Some(c) => c,
            None => {
                warn!(table = table.name(), operator = parts[1], "ignoring filter with unknown operator");
                Condition::No
            }
        }
    }
}
