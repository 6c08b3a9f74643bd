use crate::criteria::JoinType;
use crate::dialect::{DeleteAliasStyle, PaginationStrategy, SqlDialect};

/// SQLite: no alias in DELETE, no RIGHT JOIN.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        format!("\"{identifier}\"")
    }

    fn pagination(&self) -> PaginationStrategy {
        PaginationStrategy::LimitOffset
    }

    fn delete_alias_style(&self) -> DeleteAliasStyle {
        DeleteAliasStyle::Unsupported
    }

    fn supports_join(&self, kind: JoinType) -> bool {
        kind != JoinType::Right
    }
}
