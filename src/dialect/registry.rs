use std::sync::Arc;

use indexmap::IndexMap;

use crate::dialect::{MssqlDialect, PgsqlDialect, SqlDialect, SqliteDialect, StandardDialect};
use crate::error::QueryError;

/// Maps database names to dialect adapters. Passed explicitly to whoever
/// compiles; there is no process-wide registry.
#[derive(Clone, Default)]
pub struct DialectRegistry {
    dialects: IndexMap<String, Arc<dyn SqlDialect>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in dialect under its own name.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StandardDialect));
        registry.register(Arc::new(PgsqlDialect));
        registry.register(Arc::new(SqliteDialect));
        registry.register(Arc::new(MssqlDialect));
        registry
    }

    pub fn register(&mut self, dialect: Arc<dyn SqlDialect>) {
        self.dialects.insert(dialect.name().to_string(), dialect);
    }

    /// Binds an additional database name to an already-built adapter, e.g.
    /// `"bookstore"` to the standard dialect.
    pub fn register_as(&mut self, database: &str, dialect: Arc<dyn SqlDialect>) {
        self.dialects.insert(database.to_string(), dialect);
    }

    pub fn get(&self, database: &str) -> Result<&dyn SqlDialect, QueryError> {
        self.dialects
            .get(database)
            .map(Arc::as_ref)
            .ok_or_else(|| QueryError::UnknownDatabase(database.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(String::as_str)
    }
}
