use serde_json::Value;
use tracing::{debug, trace};

use crate::compiler::{comment_prefix, render_predicate};
use crate::criteria::{Criteria, Predicate};
use crate::dialect::{CompiledQuery, SqlDialect};
use crate::error::{MalformedQuery, QueryError};

/// Compiles an UPDATE from two Criteria: `selection` picks the target rows
/// (and carries the comment), `values` supplies the new column values as
/// equality conditions. Bind order is SET values first, WHERE values after.
///
/// Whether the new values actually differ from the persisted ones is not
/// detected here; the executor's affected-row count reports that.
pub fn compile_update(
    selection: &Criteria,
    values: &Criteria,
    dialect: &dyn SqlDialect,
) -> Result<CompiledQuery, QueryError> {
    debug!(dialect = dialect.name(), "compiling UPDATE");
    selection.validate_bounds()?;
    let table = selection
        .resolve_primary_table()
        .or_else(|| values.resolve_primary_table())
        .ok_or(MalformedQuery::UnknownTable)?;

    let mut params: Vec<Value> = vec![];
    let mut set_parts = vec![];
    for predicate in values.predicates() {
        match predicate {
            Predicate::Compare { column, value, .. } => {
                set_parts.push(format!("{}=?", dialect.quote_identifier(column.name())));
                params.push(value.clone());
            }
            Predicate::Raw(_) => return Err(MalformedQuery::RawUpdateValue.into()),
        }
    }
    if set_parts.is_empty() {
        return Err(MalformedQuery::EmptyUpdate.into());
    }

    let mut sql = format!(
        "UPDATE {}{} SET {}",
        comment_prefix(selection),
        dialect.quote_identifier(&table),
        set_parts.join(", ")
    );
    let where_parts: Vec<String> = selection
        .predicates()
        .iter()
        .map(|predicate| render_predicate(predicate, selection, dialect, &mut params))
        .collect();
    if !where_parts.is_empty() {
        sql.push_str(&format!(" WHERE {}", where_parts.join(" AND ")));
    }

    trace!(%sql, "compiled UPDATE");
    Ok(CompiledQuery::new(sql, params))
}
