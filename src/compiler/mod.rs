pub mod select;
pub use select::*;

pub mod update;
pub use update::*;

pub mod delete;
pub use delete::*;

use serde_json::Value;

use crate::criteria::{ComparisonOp, Criteria, Predicate};
use crate::dialect::SqlDialect;
use crate::error::UnsupportedDialectFeature;

/// `/* comment */ ` right after the statement's leading keyword, or nothing.
pub(crate) fn comment_prefix(criteria: &Criteria) -> String {
    match criteria.comment() {
        Some(comment) => format!("/* {comment} */ "),
        None => String::new(),
    }
}

/// Renders one condition, appending its bind values to `params` in
/// placeholder order.
pub(crate) fn render_predicate(
    predicate: &Predicate,
    criteria: &Criteria,
    dialect: &dyn SqlDialect,
    params: &mut Vec<Value>,
) -> String {
    match predicate {
        Predicate::Raw(expression) => expression.clone(),
        Predicate::Compare {
            column,
            op,
            value,
            ignore_case,
        } => {
            let lhs = column.qualified();
            if !op.takes_value() {
                return format!("{}{}", lhs, op.sql());
            }
            if matches!(op, ComparisonOp::In | ComparisonOp::NotIn) {
                let values: Vec<Value> = match value {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                let placeholders = vec!["?"; values.len()].join(", ");
                params.extend(values);
                return format!("{}{}({})", lhs, op.sql(), placeholders);
            }
            let fold = (*ignore_case || criteria.is_ignore_case())
                && value.is_string()
                && dialect.supports_case_fold();
            params.push(value.clone());
            if fold {
                format!(
                    "{}{}{}",
                    dialect.case_fold(&lhs),
                    op.sql(),
                    dialect.case_fold("?")
                )
            } else {
                format!("{}{}?", lhs, op.sql())
            }
        }
    }
}

/// Every join kind must be expressible, and explicit joins must not be mixed
/// with implicit comma joins unless the dialect says it can cope.
pub(crate) fn check_joins(
    criteria: &Criteria,
    dialect: &dyn SqlDialect,
) -> Result<(), UnsupportedDialectFeature> {
    for join in criteria.joins() {
        if !dialect.supports_join(join.kind) {
            return Err(UnsupportedDialectFeature::JoinKind {
                dialect: dialect.name().to_string(),
                kind: join.kind,
            });
        }
    }
    let has_explicit = criteria.joins().iter().any(|join| join.is_explicit());
    let has_implicit = criteria.joins().iter().any(|join| !join.is_explicit());
    if has_explicit && has_implicit && !dialect.supports_mixed_join_styles() {
        return Err(UnsupportedDialectFeature::MixedJoinStyles {
            dialect: dialect.name().to_string(),
        });
    }
    Ok(())
}
