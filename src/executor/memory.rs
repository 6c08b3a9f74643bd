use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::compiler::{compile_delete, compile_select, compile_update, delete::partition_by_table};
use crate::criteria::{Criteria, Predicate};
use crate::dialect::SqlDialect;
use crate::error::{MalformedQuery, QueryError};
use crate::executor::{Eval, Row};

/// In-memory backend that compiles a Criteria through a dialect, logs the
/// produced SQL, then applies the same semantics directly to its rows.
/// Joins are not materialized; each operation touches its own table.
#[derive(Debug, Default)]
pub struct MemoryDb {
    tables: IndexMap<String, Vec<Row>>,
    log: Vec<String>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, table: &str) -> &mut Self {
        self.tables.entry(table.to_string()).or_default();
        self
    }

    /// Loads rows from a JSON array of objects, returning how many landed.
    pub fn load_rows(&mut self, table: &str, rows: Value) -> usize {
        let Value::Array(items) = rows else { return 0 };
        let target = self.tables.entry(table.to_string()).or_default();
        let mut loaded = 0;
        for item in items {
            if let Value::Object(map) = item {
                target.push(Row(map));
                loaded += 1;
            }
        }
        loaded
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every statement compiled through this backend, oldest first.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn last_executed(&self) -> Option<&str> {
        self.log.last().map(String::as_str)
    }

    pub fn query_count(&self) -> usize {
        self.log.len()
    }

    pub fn select(
        &mut self,
        criteria: &Criteria,
        dialect: &dyn SqlDialect,
    ) -> Result<Vec<Row>, QueryError> {
        let compiled = compile_select(criteria, dialect)?;
        debug!(sql = %compiled.sql, "memory select");
        self.log.push(compiled.sql);

        let table = criteria
            .resolve_primary_table()
            .ok_or(MalformedQuery::UnknownTable)?;
        let mut rows: Vec<Row> = self
            .tables
            .get(&table)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| self.row_matches(criteria, row))
            .collect();
        Eval::sort_rows(&mut rows, criteria.order_terms());

        let (limit, offset) = criteria.validate_bounds()?;
        if let Some(offset) = offset {
            let skip = (offset as usize).min(rows.len());
            rows.drain(..skip);
        }
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    pub fn update(
        &mut self,
        selection: &Criteria,
        values: &Criteria,
        dialect: &dyn SqlDialect,
    ) -> Result<u64, QueryError> {
        let compiled = compile_update(selection, values, dialect)?;
        debug!(sql = %compiled.sql, "memory update");
        self.log.push(compiled.sql);

        let table = selection
            .resolve_primary_table()
            .or_else(|| values.resolve_primary_table())
            .ok_or(MalformedQuery::UnknownTable)?;
        let fold = selection.is_ignore_case();
        let mut changed = 0;
        if let Some(rows) = self.tables.get_mut(&table) {
            for row in rows.iter_mut() {
                let hit = selection
                    .predicates()
                    .iter()
                    .all(|p| Eval::matches(p, fold, row));
                if !hit {
                    continue;
                }
                let mut touched = false;
                for predicate in values.predicates() {
                    if let Predicate::Compare { column, value, .. } = predicate
                        && row.get(column.name()) != Some(value)
                    {
                        row.set(column.name(), value.clone());
                        touched = true;
                    }
                }
                if touched {
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    pub fn delete(
        &mut self,
        criteria: &Criteria,
        dialect: &dyn SqlDialect,
    ) -> Result<u64, QueryError> {
        let statements = compile_delete(criteria, dialect)?;
        let groups = partition_by_table(criteria)?;
        let fold = criteria.is_ignore_case();
        let mut total = 0;
        for ((qualifier, predicates), statement) in groups.iter().zip(statements) {
            debug!(sql = %statement.sql, "memory delete");
            self.log.push(statement.sql);
            let table = criteria
                .alias_table(qualifier)
                .unwrap_or(qualifier)
                .to_string();
            if let Some(rows) = self.tables.get_mut(&table) {
                let before = rows.len();
                rows.retain(|row| !predicates.iter().all(|p| Eval::matches(p, fold, row)));
                total += (before - rows.len()) as u64;
            }
        }
        Ok(total)
    }

    fn row_matches(&self, criteria: &Criteria, row: &Row) -> bool {
        let fold = criteria.is_ignore_case();
        criteria
            .predicates()
            .iter()
            .all(|p| Eval::matches(p, fold, row))
    }
}
