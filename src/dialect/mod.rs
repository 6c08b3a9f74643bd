pub mod standard;
pub use standard::*;

pub mod pgsql;
pub use pgsql::*;

pub mod sqlite;
pub use sqlite::*;

pub mod mssql;
pub use mssql::*;

pub mod registry;
pub use registry::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::criteria::JoinType;

/// One compiled statement: SQL text plus its bind values, in placeholder
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CompiledQuery {
    pub fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

/// How a dialect limits result sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// Trailing `LIMIT n OFFSET m`.
    LimitOffset,
    /// Leading `TOP n` when only a limit is set; a row-number derived table
    /// when an offset is involved.
    TopWithRowNumber,
}

/// Whether and how a DELETE statement may carry a table alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAliasStyle {
    /// Alias omitted from the statement; WHERE keeps the caller's
    /// alias-qualified column names.
    Unsupported,
    /// `DELETE FROM table AS alias`.
    DeclareOnly,
    /// `DELETE alias FROM table AS alias`.
    RepeatAfterDelete,
}

/// The capability set a backend exposes to the compiler. The compiler
/// branches on capabilities, never on dialect identity.
pub trait SqlDialect: std::fmt::Debug + Send + Sync {
    /// The registry key, e.g. `"mssql"`.
    fn name(&self) -> &str;

    fn quote_identifier(&self, identifier: &str) -> String;

    fn pagination(&self) -> PaginationStrategy;

    fn delete_alias_style(&self) -> DeleteAliasStyle;

    /// Wraps an operand for case-insensitive comparison.
    fn case_fold(&self, expr: &str) -> String {
        format!("UPPER({expr})")
    }

    /// Dialects whose default collation already compares case-insensitively
    /// return false; the compiler then emits the raw comparison.
    fn supports_case_fold(&self) -> bool {
        true
    }

    fn supports_join(&self, _kind: JoinType) -> bool {
        true
    }

    /// Mixing explicit joins with implicit comma joins produces wrong
    /// results on every supported backend, so the default refuses it.
    fn supports_mixed_join_styles(&self) -> bool {
        false
    }
}
