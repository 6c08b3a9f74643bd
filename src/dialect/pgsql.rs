use crate::dialect::{DeleteAliasStyle, PaginationStrategy, SqlDialect};

/// PostgreSQL: double-quote quoting, native `LIMIT`/`OFFSET`, and DELETE
/// aliases declared in FROM but never repeated after the keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgsqlDialect;

impl SqlDialect for PgsqlDialect {
    fn name(&self) -> &str {
        "pgsql"
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        format!("\"{identifier}\"")
    }

    fn pagination(&self) -> PaginationStrategy {
        PaginationStrategy::LimitOffset
    }

    fn delete_alias_style(&self) -> DeleteAliasStyle {
        DeleteAliasStyle::DeclareOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        let dialect = PgsqlDialect;
        assert_eq!(dialect.quote_identifier("book"), "\"book\"");
        assert_eq!(dialect.delete_alias_style(), DeleteAliasStyle::DeclareOnly);
    }
}
