use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::criteria::ColumnRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl ComparisonOp {
    /// The SQL fragment between the column and the placeholder. Symbolic
    /// operators bind tightly (`col=?`); keyword operators keep their
    /// surrounding spaces (`col LIKE ?`).
    pub fn sql(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "<>",
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterEqual => ">=",
            ComparisonOp::Less => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::Like => " LIKE ",
            ComparisonOp::NotLike => " NOT LIKE ",
            ComparisonOp::In => " IN ",
            ComparisonOp::NotIn => " NOT IN ",
            ComparisonOp::IsNull => " IS NULL",
            ComparisonOp::IsNotNull => " IS NOT NULL",
        }
    }

    pub fn takes_value(&self) -> bool {
        !matches!(self, ComparisonOp::IsNull | ComparisonOp::IsNotNull)
    }
}

/// A single WHERE condition. Predicates on a Criteria combine with AND;
/// disjunction is expressed by attaching a pre-formed `Raw` expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Compare {
        column: ColumnRef,
        op: ComparisonOp,
        value: Value,
        ignore_case: bool,
    },
    /// A pre-formed boolean expression, emitted verbatim. Carries no binds.
    Raw(String),
}

impl Predicate {
    pub fn compare(column: &str, op: ComparisonOp, value: Value) -> Self {
        Predicate::Compare {
            column: ColumnRef::parse(column),
            op,
            value,
            ignore_case: false,
        }
    }

    /// The qualifier owning this condition, used to partition multi-table
    /// deletes. Raw expressions belong to no table.
    pub fn table(&self) -> Option<&str> {
        match self {
            Predicate::Compare { column, .. } => column.qualifier(),
            Predicate::Raw(_) => None,
        }
    }
}
