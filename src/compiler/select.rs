use serde_json::Value;
use tracing::{debug, trace};

use crate::compiler::{check_joins, comment_prefix, render_predicate};
use crate::criteria::{ColumnRef, Criteria, OrderTerm, SelectItem};
use crate::dialect::{CompiledQuery, PaginationStrategy, SqlDialect};
use crate::error::{MalformedQuery, QueryError};

/// An order term after resolution against the Criteria's alias bindings.
enum ResolvedOrder {
    /// A computed-column alias: rendered as the bare alias at the top level,
    /// but as the underlying expression inside window ordering.
    Alias { name: String, expression: String },
    Plain(String),
}

fn resolve_order_term(term: &OrderTerm, criteria: &Criteria) -> Result<ResolvedOrder, MalformedQuery> {
    if let Some(expression) = criteria.as_columns().get(&term.expr) {
        return Ok(ResolvedOrder::Alias {
            name: term.expr.clone(),
            expression: expression.clone(),
        });
    }
    if ColumnRef::looks_like_column(&term.expr)
        && !term.expr.contains('.')
        && !criteria.select_columns().is_empty()
    {
        let selected = criteria.select_columns().iter().any(|item| match item {
            SelectItem::Column(column) => column.name() == term.expr,
            SelectItem::Raw(_) => false,
        });
        if !selected {
            return Err(MalformedQuery::UnresolvedAlias(term.expr.clone()));
        }
    }
    Ok(ResolvedOrder::Plain(term.expr.clone()))
}

/// FROM clause plus the conditions contributed by implicit comma joins.
/// Explicit joins render inline; implicit join tables are appended after
/// them, comma-separated, with their conditions pushed into WHERE.
fn build_from(criteria: &Criteria, table: &str) -> (String, Vec<String>) {
    let mut from = match criteria
        .aliases()
        .iter()
        .find(|(_, target)| target.as_str() == table)
    {
        Some((alias, _)) => format!("{table} AS {alias}"),
        None => table.to_string(),
    };
    let mut comma_tables = vec![];
    let mut conditions = vec![];
    for join in criteria.joins() {
        let qualifier = join.right.qualifier().unwrap_or_else(|| join.right.name());
        let target = match criteria.alias_table(qualifier) {
            Some(real) => format!("{real} AS {qualifier}"),
            None => qualifier.to_string(),
        };
        match join.kind.keyword() {
            Some(keyword) => {
                from.push_str(&format!(" {keyword} {target} ON ({})", join.condition()));
            }
            None => {
                comma_tables.push(target);
                conditions.push(join.condition());
            }
        }
    }
    for target in comma_tables {
        from.push_str(&format!(", {target}"));
    }
    (from, conditions)
}

/// The top-level select list: plain columns (uniformly aliased when the
/// needs-aliases condition holds), then computed columns under `AS alias`.
/// An empty list renders as `*`.
fn build_select_list(criteria: &Criteria) -> Vec<String> {
    let needs_aliases = criteria.needs_select_aliases();
    let mut parts: Vec<String> = criteria
        .select_columns()
        .iter()
        .map(|item| match item {
            SelectItem::Column(column) if needs_aliases => {
                format!("{} AS {}", column.qualified(), column.flat_alias())
            }
            other => other.sql(),
        })
        .collect();
    for (alias, expression) in criteria.as_columns() {
        parts.push(format!("{expression} AS {alias}"));
    }
    if parts.is_empty() {
        parts.push("*".to_string());
    }
    parts
}

/// Compiles a Criteria into one SELECT statement for the given dialect.
pub fn compile_select(
    criteria: &Criteria,
    dialect: &dyn SqlDialect,
) -> Result<CompiledQuery, QueryError> {
    debug!(dialect = dialect.name(), "compiling SELECT");
    let (limit, offset) = criteria.validate_bounds()?;
    check_joins(criteria, dialect)?;
    let table = criteria
        .resolve_primary_table()
        .ok_or(MalformedQuery::UnknownTable)?;

    if dialect.pagination() == PaginationStrategy::TopWithRowNumber {
        if let Some(offset) = offset {
            return compile_row_number_select(criteria, dialect, &table, limit, offset);
        }
    }

    let mut params: Vec<Value> = vec![];
    let (from, mut where_parts) = build_from(criteria, &table);
    for predicate in criteria.predicates() {
        where_parts.push(render_predicate(predicate, criteria, dialect, &mut params));
    }

    let mut order_parts = vec![];
    for term in criteria.order_terms() {
        let rendered = match resolve_order_term(term, criteria)? {
            ResolvedOrder::Alias { name, .. } => name,
            ResolvedOrder::Plain(expression) => expression,
        };
        order_parts.push(format!("{rendered} {}", term.direction.keyword()));
    }

    let mut sql = format!("SELECT {}", comment_prefix(criteria));
    if criteria.is_distinct() {
        sql.push_str("DISTINCT ");
    }
    if dialect.pagination() == PaginationStrategy::TopWithRowNumber {
        if let Some(limit) = limit {
            sql.push_str(&format!("TOP {limit} "));
        }
    }
    sql.push_str(&build_select_list(criteria).join(", "));
    sql.push_str(&format!(" FROM {from}"));
    if !where_parts.is_empty() {
        sql.push_str(&format!(" WHERE {}", where_parts.join(" AND ")));
    }
    if !order_parts.is_empty() {
        sql.push_str(&format!(" ORDER BY {}", order_parts.join(", ")));
    }
    if dialect.pagination() == PaginationStrategy::LimitOffset {
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
    }

    trace!(%sql, "compiled SELECT");
    Ok(CompiledQuery::new(sql, params))
}

/// Offset pagination on a dialect without native offset support: the whole
/// query nests inside a derived table that also computes a row number over
/// the original ordering, and the outer query filters on that number.
fn compile_row_number_select(
    criteria: &Criteria,
    dialect: &dyn SqlDialect,
    table: &str,
    limit: Option<i64>,
    offset: i64,
) -> Result<CompiledQuery, QueryError> {
    let mut params: Vec<Value> = vec![];
    let (from, mut where_parts) = build_from(criteria, table);
    for predicate in criteria.predicates() {
        where_parts.push(render_predicate(predicate, criteria, dialect, &mut params));
    }

    // The window orders by the original ORDER BY sequence, substituting the
    // underlying expression for computed aliases. Without an ORDER BY the
    // first select column stands in for the primary key.
    let mut window_order = vec![];
    for term in criteria.order_terms() {
        let rendered = match resolve_order_term(term, criteria)? {
            ResolvedOrder::Alias { expression, .. } => expression,
            ResolvedOrder::Plain(expression) => expression,
        };
        window_order.push(format!("{rendered} {}", term.direction.keyword()));
    }
    if window_order.is_empty() {
        let default = criteria.select_columns().iter().find_map(|item| match item {
            SelectItem::Column(column) => Some(column.qualified()),
            SelectItem::Raw(_) => None,
        });
        window_order.push(default.unwrap_or_else(|| "(SELECT NULL)".to_string()));
    }

    let mut inner = vec![format!(
        "ROW_NUMBER() OVER(ORDER BY {}) AS {}",
        window_order.join(", "),
        dialect.quote_identifier("RowNumber")
    )];
    let mut outer = vec![];
    for (index, item) in criteria.select_columns().iter().enumerate() {
        let alias = match item {
            SelectItem::Column(column) => column.qualified(),
            SelectItem::Raw(_) => format!("col_{index}"),
        };
        let quoted = dialect.quote_identifier(&alias);
        inner.push(format!("{} AS {}", item.sql(), quoted));
        outer.push(quoted);
    }
    for (alias, expression) in criteria.as_columns() {
        let quoted = dialect.quote_identifier(alias);
        inner.push(format!("{expression} AS {quoted}"));
        outer.push(quoted);
    }
    // An empty select list still has to expose the data columns through the
    // derived table, not just the row number.
    if outer.is_empty() {
        inner.push("*".to_string());
        outer.push("*".to_string());
    }

    let mut inner_sql = String::from("SELECT ");
    if criteria.is_distinct() {
        inner_sql.push_str("DISTINCT ");
    }
    inner_sql.push_str(&inner.join(", "));
    inner_sql.push_str(&format!(" FROM {from}"));
    if !where_parts.is_empty() {
        inner_sql.push_str(&format!(" WHERE {}", where_parts.join(" AND ")));
    }

    let filter = match limit {
        Some(limit) => format!("RowNumber BETWEEN {} AND {}", offset + 1, offset + limit),
        None => format!("RowNumber > {offset}"),
    };
    let sql = format!(
        "SELECT {}{} FROM ({}) AS derivedb WHERE {}",
        comment_prefix(criteria),
        outer.join(", "),
        inner_sql,
        filter
    );

    trace!(%sql, "compiled windowed SELECT");
    Ok(CompiledQuery::new(sql, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{ComparisonOp, JoinType};
    use crate::dialect::{MssqlDialect, PgsqlDialect, SqliteDialect, StandardDialect};
    use crate::error::UnsupportedDialectFeature;
    use serde_json::json;
    use test_case::test_case;

    const PUBLISHER_NAME: &str =
        "(SELECT MAX(publisher.NAME) FROM publisher WHERE publisher.ID = book.PUBLISHER_ID)";

    fn book_criteria() -> Criteria {
        let mut c = Criteria::new();
        c.set_primary_table("book");
        c.add_select_column("book.ID");
        c.add_select_column("book.TITLE");
        c
    }

    #[test]
    fn test_simple_select() {
        let c = book_criteria();
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(compiled.sql, "SELECT book.ID, book.TITLE FROM book");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn test_select_star_when_no_columns() {
        let mut c = Criteria::new();
        c.add("book.TITLE", json!("War And Peace"));
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM book WHERE book.TITLE=?");
        assert_eq!(compiled.params, vec![json!("War And Peace")]);
    }

    #[test]
    fn test_distinct() {
        let mut c = book_criteria();
        c.set_distinct(true);
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(compiled.sql, "SELECT DISTINCT book.ID, book.TITLE FROM book");
    }

    #[test]
    fn test_comment_after_leading_keyword() {
        let mut c = Criteria::new();
        c.set_comment("Foo");
        c.add_select_column("book.ID");
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(compiled.sql, "SELECT /* Foo */ book.ID FROM book");
    }

    #[test]
    fn test_implicit_join_renders_as_comma() {
        let mut c = book_criteria();
        c.add_join("book.AUTHOR_ID", "author.ID");
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT book.ID, book.TITLE FROM book, author WHERE book.AUTHOR_ID=author.ID"
        );
    }

    #[test]
    fn test_explicit_left_join() {
        let mut c = book_criteria();
        c.add_join_with("book.PUBLISHER_ID", "publisher.ID", JoinType::Left);
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT book.ID, book.TITLE FROM book LEFT JOIN publisher ON (book.PUBLISHER_ID=publisher.ID)"
        );
    }

    #[test]
    fn test_mixed_join_styles_are_refused() {
        let mut c = book_criteria();
        c.add_join_with("book.PUBLISHER_ID", "publisher.ID", JoinType::Left);
        c.add_join("book.AUTHOR_ID", "author.ID");
        let err = compile_select(&c, &StandardDialect).unwrap_err();
        assert_eq!(
            err,
            QueryError::Unsupported(UnsupportedDialectFeature::MixedJoinStyles {
                dialect: "standard".to_string()
            })
        );
    }

    #[test]
    fn test_right_join_refused_on_sqlite() {
        let mut c = book_criteria();
        c.add_join_with("book.AUTHOR_ID", "author.ID", JoinType::Right);
        let err = compile_select(&c, &SqliteDialect).unwrap_err();
        assert!(err.is_unsupported());
        assert!(compile_select(&c, &StandardDialect).is_ok());
    }

    #[test]
    fn test_needs_aliases_applies_uniformly() {
        let mut c = Criteria::new();
        c.set_primary_table("book");
        c.add_select_column("book.ID");
        c.add_select_column("author.ID");
        c.add_join("book.AUTHOR_ID", "author.ID");
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT book.ID AS book_ID, author.ID AS author_ID FROM book, author WHERE book.AUTHOR_ID=author.ID"
        );
    }

    #[test]
    fn test_as_column_appended_with_alias() {
        let mut c = book_criteria();
        c.add_as_column("PublisherName", PUBLISHER_NAME);
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(
            compiled.sql,
            format!("SELECT book.ID, book.TITLE, {PUBLISHER_NAME} AS PublisherName FROM book")
        );
    }

    #[test]
    fn test_order_by_directions() {
        let mut c = book_criteria();
        c.add_descending_order_by_column("book.TITLE");
        c.add_ascending_order_by_column("book.ID");
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT book.ID, book.TITLE FROM book ORDER BY book.TITLE DESC, book.ID ASC"
        );
    }

    #[test]
    fn test_order_by_computed_alias_uses_alias_at_top_level() {
        let mut c = book_criteria();
        c.add_as_column("PublisherName", PUBLISHER_NAME);
        c.add_descending_order_by_column("PublisherName");
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert!(compiled.sql.ends_with("ORDER BY PublisherName DESC"));
    }

    #[test]
    fn test_order_by_unresolved_alias() {
        let mut c = book_criteria();
        c.add_ascending_order_by_column("Nonexistent");
        let err = compile_select(&c, &StandardDialect).unwrap_err();
        assert_eq!(
            err,
            QueryError::Malformed(MalformedQuery::UnresolvedAlias("Nonexistent".to_string()))
        );
    }

    #[test]
    fn test_order_by_bare_column_passes_with_star_select() {
        let mut c = Criteria::new();
        c.set_primary_table("book");
        c.add_ascending_order_by_column("TITLE");
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM book ORDER BY TITLE ASC");
    }

    #[test]
    fn test_order_by_selected_bare_column_is_fine() {
        let mut c = Criteria::new();
        c.set_primary_table("book");
        c.add_select_column("book.TITLE");
        c.add_ascending_order_by_column("TITLE");
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert!(compiled.sql.ends_with("ORDER BY TITLE ASC"));
    }

    #[test_case(&StandardDialect; "standard")]
    #[test_case(&PgsqlDialect; "pgsql")]
    #[test_case(&SqliteDialect; "sqlite")]
    fn test_limit_offset_dialects(dialect: &dyn SqlDialect) {
        let mut c = book_criteria();
        c.set_limit(20).set_offset(20);
        let compiled = compile_select(&c, dialect).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT book.ID, book.TITLE FROM book LIMIT 20 OFFSET 20"
        );
    }

    #[test]
    fn test_zero_offset_is_dropped() {
        let mut c = book_criteria();
        c.set_limit(20).set_offset(0);
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(compiled.sql, "SELECT book.ID, book.TITLE FROM book LIMIT 20");
    }

    #[test]
    fn test_negative_limit_is_malformed() {
        let mut c = book_criteria();
        c.set_limit(-3);
        let err = compile_select(&c, &StandardDialect).unwrap_err();
        assert_eq!(err, QueryError::Malformed(MalformedQuery::NegativeLimit(-3)));
    }

    #[test]
    fn test_no_table_is_malformed() {
        let c = Criteria::new();
        let err = compile_select(&c, &StandardDialect).unwrap_err();
        assert_eq!(err, QueryError::Malformed(MalformedQuery::UnknownTable));
    }

    #[test]
    fn test_mssql_top_without_offset() {
        let mut c = book_criteria();
        c.add_select_column("publisher.NAME");
        c.add_as_column("PublisherName", PUBLISHER_NAME);
        c.add_join_with("book.PUBLISHER_ID", "publisher.ID", JoinType::Left);
        c.set_offset(0);
        c.set_limit(20);
        let compiled = compile_select(&c, &MssqlDialect).unwrap();
        assert_eq!(
            compiled.sql,
            format!(
                "SELECT TOP 20 book.ID, book.TITLE, publisher.NAME, {PUBLISHER_NAME} AS PublisherName \
                 FROM book LEFT JOIN publisher ON (book.PUBLISHER_ID=publisher.ID)"
            )
        );
    }

    #[test]
    fn test_mssql_row_number_with_offset() {
        let mut c = book_criteria();
        c.add_select_column("publisher.NAME");
        c.add_as_column("PublisherName", PUBLISHER_NAME);
        c.add_join_with("book.PUBLISHER_ID", "publisher.ID", JoinType::Left);
        c.set_offset(20);
        c.set_limit(20);
        let compiled = compile_select(&c, &MssqlDialect).unwrap();
        assert_eq!(
            compiled.sql,
            format!(
                "SELECT [book.ID], [book.TITLE], [publisher.NAME], [PublisherName] FROM (\
                 SELECT ROW_NUMBER() OVER(ORDER BY book.ID) AS [RowNumber], \
                 book.ID AS [book.ID], book.TITLE AS [book.TITLE], publisher.NAME AS [publisher.NAME], \
                 {PUBLISHER_NAME} AS [PublisherName] \
                 FROM book LEFT JOIN publisher ON (book.PUBLISHER_ID=publisher.ID)\
                 ) AS derivedb WHERE RowNumber BETWEEN 21 AND 40"
            )
        );
    }

    #[test]
    fn test_mssql_row_number_orders_by_expression_not_alias() {
        let mut c = book_criteria();
        c.add_as_column("PublisherName", PUBLISHER_NAME);
        c.add_descending_order_by_column("PublisherName");
        c.add_ascending_order_by_column("book.TITLE");
        c.set_offset(20);
        c.set_limit(20);
        let compiled = compile_select(&c, &MssqlDialect).unwrap();
        assert!(compiled.sql.contains(&format!(
            "ROW_NUMBER() OVER(ORDER BY {PUBLISHER_NAME} DESC, book.TITLE ASC) AS [RowNumber]"
        )));
        assert!(compiled.sql.ends_with("WHERE RowNumber BETWEEN 21 AND 40"));
    }

    #[test]
    fn test_row_number_bounds_track_offset_not_direction() {
        let mut asc = book_criteria();
        asc.add_ascending_order_by_column("book.ID");
        asc.set_limit(20);
        asc.set_offset(20);
        let asc_sql = compile_select(&asc, &MssqlDialect).unwrap().sql;

        let mut desc = book_criteria();
        desc.add_descending_order_by_column("book.ID");
        desc.set_limit(20);
        desc.set_offset(20);
        let desc_sql = compile_select(&desc, &MssqlDialect).unwrap().sql;

        assert!(asc_sql.contains("OVER(ORDER BY book.ID ASC)"));
        assert!(desc_sql.contains("OVER(ORDER BY book.ID DESC)"));
        assert!(asc_sql.ends_with("BETWEEN 21 AND 40"));
        assert!(desc_sql.ends_with("BETWEEN 21 AND 40"));
    }

    #[test]
    fn test_mssql_row_number_star_select_keeps_data_columns() {
        let mut c = Criteria::new();
        c.set_primary_table("book");
        c.set_limit(5);
        c.set_offset(5);
        let compiled = compile_select(&c, &MssqlDialect).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM (\
             SELECT ROW_NUMBER() OVER(ORDER BY (SELECT NULL)) AS [RowNumber], * \
             FROM book) AS derivedb WHERE RowNumber BETWEEN 6 AND 10"
        );
    }

    #[test]
    fn test_mssql_offset_without_limit() {
        let mut c = book_criteria();
        c.set_offset(10);
        let compiled = compile_select(&c, &MssqlDialect).unwrap();
        assert!(compiled.sql.ends_with("WHERE RowNumber > 10"));
    }

    #[test]
    fn test_row_number_where_params_survive() {
        let mut c = book_criteria();
        c.add_with("book.TITLE", json!("War%"), ComparisonOp::Like);
        c.set_limit(5);
        c.set_offset(5);
        let compiled = compile_select(&c, &MssqlDialect).unwrap();
        assert!(compiled.sql.contains("WHERE book.TITLE LIKE ?"));
        assert_eq!(compiled.params, vec![json!("War%")]);
    }

    #[test]
    fn test_primary_table_alias_in_from() {
        let mut c = Criteria::new();
        c.set_primary_table("book");
        c.add_alias("b", "book");
        c.add("b.TITLE", json!("War And Peace"));
        let compiled = compile_select(&c, &StandardDialect).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM book AS b WHERE b.TITLE=?"
        );
    }

    #[test]
    fn test_mssql_skips_case_fold() {
        let mut c = book_criteria();
        c.set_ignore_case(true);
        c.add_with("book.TITLE", json!("war%"), ComparisonOp::Like);
        let compiled = compile_select(&c, &MssqlDialect).unwrap();
        assert!(compiled.sql.contains("WHERE book.TITLE LIKE ?"));
        assert!(!compiled.sql.contains("UPPER"));
    }
}
