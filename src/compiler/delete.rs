use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::compiler::{comment_prefix, render_predicate};
use crate::criteria::{Criteria, Predicate};
use crate::dialect::{CompiledQuery, DeleteAliasStyle, SqlDialect};
use crate::error::{MalformedQuery, QueryError};

/// Groups the conditions by their owning qualifier, in first-referenced
/// order. Raw conditions carry no qualifier and attach to the primary
/// table's group.
pub(crate) fn partition_by_table<'a>(
    criteria: &'a Criteria,
) -> Result<IndexMap<String, Vec<&'a Predicate>>, MalformedQuery> {
    let mut groups: IndexMap<String, Vec<&Predicate>> = IndexMap::new();
    for predicate in criteria.predicates() {
        let qualifier = match predicate.table() {
            Some(qualifier) => qualifier.to_string(),
            None => criteria
                .resolve_primary_table()
                .ok_or(MalformedQuery::UnknownTable)?,
        };
        groups.entry(qualifier).or_default().push(predicate);
    }
    Ok(groups)
}

/// Compiles a Criteria into one DELETE per referenced table.
///
/// Refuses unconditional deletes and deletes across a join. Conditions on
/// several tables become independent statements, each carrying only its own
/// table's conditions, issued in first-referenced order.
pub fn compile_delete(
    criteria: &Criteria,
    dialect: &dyn SqlDialect,
) -> Result<Vec<CompiledQuery>, QueryError> {
    debug!(dialect = dialect.name(), "compiling DELETE");
    if criteria.predicates().is_empty() {
        return Err(MalformedQuery::UnconditionalDelete.into());
    }
    if !criteria.joins().is_empty() {
        return Err(MalformedQuery::DeleteWithJoin.into());
    }
    criteria.validate_bounds()?;

    let mut statements = vec![];
    for (qualifier, predicates) in partition_by_table(criteria)? {
        let (table, alias) = match criteria.alias_table(&qualifier) {
            Some(table) => (table.to_string(), Some(qualifier.clone())),
            None => (qualifier.clone(), None),
        };
        let quoted = dialect.quote_identifier(&table);
        let comment = comment_prefix(criteria);

        let mut sql = match (&alias, dialect.delete_alias_style()) {
            (Some(alias), DeleteAliasStyle::RepeatAfterDelete) => {
                format!("DELETE {comment}{alias} FROM {quoted} AS {alias}")
            }
            (Some(alias), DeleteAliasStyle::DeclareOnly) => {
                format!("DELETE {comment}FROM {quoted} AS {alias}")
            }
            // Alias dropped from the statement; the WHERE clause below still
            // uses the caller's alias-qualified column names.
            _ => format!("DELETE {comment}FROM {quoted}"),
        };

        let mut params: Vec<Value> = vec![];
        let where_parts: Vec<String> = predicates
            .iter()
            .map(|predicate| render_predicate(predicate, criteria, dialect, &mut params))
            .collect();
        sql.push_str(&format!(" WHERE {}", where_parts.join(" AND ")));

        trace!(%sql, "compiled DELETE");
        statements.push(CompiledQuery::new(sql, params));
    }
    Ok(statements)
}
