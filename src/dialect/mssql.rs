use crate::dialect::{DeleteAliasStyle, PaginationStrategy, SqlDialect};

/// SQL Server: bracket quoting, `TOP` for plain limits, and row-number
/// emulation for offsets. The default collation compares strings
/// case-insensitively, so no case-fold function is emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlDialect;

impl SqlDialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        format!("[{identifier}]")
    }

    fn pagination(&self) -> PaginationStrategy {
        PaginationStrategy::TopWithRowNumber
    }

    fn delete_alias_style(&self) -> DeleteAliasStyle {
        DeleteAliasStyle::RepeatAfterDelete
    }

    fn supports_case_fold(&self) -> bool {
        false
    }
}
