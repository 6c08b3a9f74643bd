use serde::{Deserialize, Serialize};

use crate::criteria::ColumnRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    /// Rendered as an implicit comma join with the condition in WHERE.
    Inner,
    Left,
    Right,
}

impl JoinType {
    /// The explicit join keyword, or `None` for the implicit comma form.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            JoinType::Inner => None,
            JoinType::Left => Some("LEFT JOIN"),
            JoinType::Right => Some("RIGHT JOIN"),
        }
    }
}

/// One equi-join between two columns. Insertion order on the Criteria is
/// preserved and drives the generated join ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub left: ColumnRef,
    pub right: ColumnRef,
    pub kind: JoinType,
}

impl JoinSpec {
    pub fn new(left: &str, right: &str, kind: JoinType) -> Self {
        Self {
            left: ColumnRef::parse(left),
            right: ColumnRef::parse(right),
            kind,
        }
    }

    pub fn is_explicit(&self) -> bool {
        self.kind.keyword().is_some()
    }

    /// The condition as it appears in ON or WHERE: `left=right`.
    pub fn condition(&self) -> String {
        format!("{}={}", self.left.qualified(), self.right.qualified())
    }
}
