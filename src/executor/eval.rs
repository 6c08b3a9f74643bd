use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::criteria::{ColumnRef, ComparisonOp, Direction, OrderTerm, Predicate};
use crate::executor::Row;

/// Row-level evaluation of criteria predicates and orderings. Used by the
/// in-memory backend; bind values are taken straight from the predicate
/// instead of a placeholder list.
pub struct Eval;

impl Eval {
    /// True when the row satisfies the predicate. Raw fragments carry SQL
    /// this evaluator cannot interpret and never match.
    pub fn matches(predicate: &Predicate, fold_case: bool, row: &Row) -> bool {
        match predicate {
            Predicate::Raw(sql) => {
                warn!(%sql, "raw condition is not evaluated in memory");
                false
            }
            Predicate::Compare {
                column,
                op,
                value,
                ignore_case,
            } => {
                let stored = row.get(column.name()).cloned().unwrap_or(Value::Null);
                let fold = fold_case || *ignore_case;
                match op {
                    ComparisonOp::IsNull => stored.is_null(),
                    ComparisonOp::IsNotNull => !stored.is_null(),
                    ComparisonOp::Equal => Self::value_equal(&stored, value, fold),
                    ComparisonOp::NotEqual => {
                        !stored.is_null() && !Self::value_equal(&stored, value, fold)
                    }
                    ComparisonOp::Greater => {
                        matches!(Self::cmp_values(&stored, value), Some(Ordering::Greater))
                    }
                    ComparisonOp::GreaterEqual => matches!(
                        Self::cmp_values(&stored, value),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    ComparisonOp::Less => {
                        matches!(Self::cmp_values(&stored, value), Some(Ordering::Less))
                    }
                    ComparisonOp::LessEqual => matches!(
                        Self::cmp_values(&stored, value),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                    ComparisonOp::Like => Self::like(&stored, value, fold),
                    ComparisonOp::NotLike => {
                        !stored.is_null() && !Self::like(&stored, value, fold)
                    }
                    ComparisonOp::In => Self::in_list(&stored, value, fold),
                    ComparisonOp::NotIn => {
                        !stored.is_null() && !Self::in_list(&stored, value, fold)
                    }
                }
            }
        }
    }

    fn value_equal(a: &Value, b: &Value, fold: bool) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
            (Value::String(x), Value::String(y)) => {
                if fold {
                    x.eq_ignore_ascii_case(y)
                } else {
                    x == y
                }
            }
            _ => false,
        }
    }

    /// Partial ordering between a stored value and a bound one. Mixed types
    /// and nulls do not compare, matching SQL unknown.
    pub fn cmp_values(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = OrderedFloat(x.as_f64()?);
                let y = OrderedFloat(y.as_f64()?);
                Some(x.cmp(&y))
            }
            (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
            (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
            _ => None,
        }
    }

    fn like(stored: &Value, pattern: &Value, fold: bool) -> bool {
        let (Value::String(s), Value::String(p)) = (stored, pattern) else {
            return false;
        };
        Self::like_regex(p, fold).is_match(s)
    }

    fn in_list(stored: &Value, list: &Value, fold: bool) -> bool {
        match list {
            Value::Array(items) => items
                .iter()
                .any(|item| Self::value_equal(stored, item, fold)),
            other => Self::value_equal(stored, other, fold),
        }
    }

    /// `%` matches any run, `_` matches one char, everything else literal.
    fn like_regex(pattern: &str, fold: bool) -> Regex {
        let mut source = String::with_capacity(pattern.len() + 8);
        if fold {
            source.push_str("(?i)");
        }
        source.push('^');
        for ch in pattern.chars() {
            match ch {
                '%' => source.push_str(".*"),
                '_' => source.push('.'),
                ch if r"\^$.|?*+()[]{}".contains(ch) => {
                    source.push('\\');
                    source.push(ch);
                }
                ch => source.push(ch),
            }
        }
        source.push('$');
        Regex::new(&source).unwrap_or_else(|_| Regex::new("^$").unwrap())
    }

    /// Stable sort by the order terms, first term outermost. Unknown
    /// comparisons keep the incoming order.
    pub fn sort_rows(rows: &mut [Row], terms: &[OrderTerm]) {
        if terms.is_empty() {
            return;
        }
        rows.sort_by(|a, b| {
            for term in terms {
                let column = ColumnRef::parse(&term.expr);
                let left = a.get(column.name()).cloned().unwrap_or(Value::Null);
                let right = b.get(column.name()).cloned().unwrap_or(Value::Null);
                let ord = Self::cmp_values(&left, &right).unwrap_or(Ordering::Equal);
                let ord = match term.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }
}
