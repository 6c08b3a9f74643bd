use crate::dialect::{DeleteAliasStyle, PaginationStrategy, SqlDialect};

/// The default dialect: backtick quoting, trailing `LIMIT`/`OFFSET`,
/// `DELETE alias FROM table AS alias`. An offset renders as a bare
/// `OFFSET n` even without a limit; servers that require a `LIMIT`
/// alongside it need their own adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDialect;

impl SqlDialect for StandardDialect {
    fn name(&self) -> &str {
        "standard"
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        format!("`{identifier}`")
    }

    fn pagination(&self) -> PaginationStrategy {
        PaginationStrategy::LimitOffset
    }

    fn delete_alias_style(&self) -> DeleteAliasStyle {
        DeleteAliasStyle::RepeatAfterDelete
    }
}
