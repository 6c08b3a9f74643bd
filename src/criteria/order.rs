use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// One ORDER BY term. The expression is kept as written by the caller and
/// only classified at compile time, because an alias it names may be
/// registered on the Criteria after the term is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTerm {
    pub expr: String,
    pub direction: Direction,
}

impl OrderTerm {
    pub fn ascending(expr: &str) -> Self {
        Self {
            expr: expr.to_string(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(expr: &str) -> Self {
        Self {
            expr: expr.to_string(),
            direction: Direction::Descending,
        }
    }
}
