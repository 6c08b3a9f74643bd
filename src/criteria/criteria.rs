use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::criteria::{ColumnRef, ComparisonOp, JoinSpec, JoinType, OrderTerm, Predicate};
use crate::error::MalformedQuery;

/// One entry of the select list: a plain column or a raw expression such as
/// `substring(book.TITLE from 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    Column(ColumnRef),
    Raw(String),
}

impl SelectItem {
    pub fn parse(raw: &str) -> Self {
        if ColumnRef::looks_like_column(raw) {
            SelectItem::Column(ColumnRef::parse(raw))
        } else {
            SelectItem::Raw(raw.to_string())
        }
    }

    pub fn sql(&self) -> String {
        match self {
            SelectItem::Column(column) => column.qualified(),
            SelectItem::Raw(expr) => expr.clone(),
        }
    }
}

/// The mutable query descriptor. Callers accumulate clauses in any order and
/// hand the finished Criteria to a dialect compiler, which reads it without
/// mutating it. One writer at a time; independent queries need independent
/// Criteria instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    primary_table: Option<String>,
    select_columns: Vec<SelectItem>,
    as_columns: IndexMap<String, String>,
    predicates: Vec<Predicate>,
    joins: Vec<JoinSpec>,
    order_terms: Vec<OrderTerm>,
    aliases: IndexMap<String, String>,
    distinct: bool,
    ignore_case: bool,
    limit: Option<i64>,
    offset: Option<i64>,
    comment: Option<String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_primary_table(&mut self, table: &str) -> &mut Self {
        self.primary_table = Some(table.to_string());
        self
    }

    pub fn add_select_column(&mut self, column: &str) -> &mut Self {
        self.select_columns.push(SelectItem::parse(column));
        self
    }

    /// Registers a computed column surfaced under `alias`, e.g. a correlated
    /// subquery. Participates in ORDER BY resolution by name.
    pub fn add_as_column(&mut self, alias: &str, expression: &str) -> &mut Self {
        self.as_columns
            .insert(alias.to_string(), expression.to_string());
        self
    }

    /// Adds an equality condition. Conditions combine with AND.
    pub fn add(&mut self, column: &str, value: Value) -> &mut Self {
        self.add_with(column, value, ComparisonOp::Equal)
    }

    pub fn add_with(&mut self, column: &str, value: Value, op: ComparisonOp) -> &mut Self {
        self.predicates.push(Predicate::Compare {
            column: ColumnRef::parse(column),
            op,
            value,
            ignore_case: false,
        });
        self
    }

    /// Attaches a pre-formed boolean expression verbatim. This is the only
    /// way to express disjunction at this layer.
    pub fn add_raw(&mut self, expression: &str) -> &mut Self {
        self.predicates.push(Predicate::Raw(expression.to_string()));
        self
    }

    pub fn add_predicate(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds an implicit (comma) join.
    pub fn add_join(&mut self, left: &str, right: &str) -> &mut Self {
        self.add_join_with(left, right, JoinType::Inner)
    }

    pub fn add_join_with(&mut self, left: &str, right: &str, kind: JoinType) -> &mut Self {
        self.joins.push(JoinSpec::new(left, right, kind));
        self
    }

    pub fn add_ascending_order_by_column(&mut self, expr: &str) -> &mut Self {
        self.order_terms.push(OrderTerm::ascending(expr));
        self
    }

    pub fn add_descending_order_by_column(&mut self, expr: &str) -> &mut Self {
        self.order_terms.push(OrderTerm::descending(expr));
        self
    }

    /// Binds `alias` to a table name for this query.
    pub fn add_alias(&mut self, alias: &str, table: &str) -> &mut Self {
        self.aliases.insert(alias.to_string(), table.to_string());
        self
    }

    pub fn set_distinct(&mut self, distinct: bool) -> &mut Self {
        self.distinct = distinct;
        self
    }

    pub fn set_ignore_case(&mut self, ignore_case: bool) -> &mut Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn set_comment(&mut self, comment: &str) -> &mut Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn select_columns(&self) -> &[SelectItem] {
        &self.select_columns
    }

    pub fn as_columns(&self) -> &IndexMap<String, String> {
        &self.as_columns
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    pub fn order_terms(&self) -> &[OrderTerm] {
        &self.order_terms
    }

    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    pub fn alias_table(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn primary_table(&self) -> Option<&str> {
        self.primary_table.as_deref()
    }

    /// The table this query runs against: explicit if set, else the
    /// qualifier of the first condition, else the qualifier of the first
    /// plain select column, else the left side of the first join.
    pub fn resolve_primary_table(&self) -> Option<String> {
        if let Some(table) = &self.primary_table {
            return Some(table.clone());
        }
        if let Some(qualifier) = self.predicates.iter().find_map(Predicate::table) {
            return Some(qualifier.to_string());
        }
        let selected = self.select_columns.iter().find_map(|item| match item {
            SelectItem::Column(column) => column.qualifier(),
            SelectItem::Raw(_) => None,
        });
        if let Some(qualifier) = selected {
            return Some(qualifier.to_string());
        }
        self.joins
            .first()
            .and_then(|join| join.left.qualifier())
            .map(str::to_string)
    }

    /// Whether the select list holds two columns with the same unqualified
    /// name under different qualifiers. When true every select column must
    /// be aliased, uniformly.
    pub fn needs_select_aliases(&self) -> bool {
        let mut seen: HashMap<&str, String> = HashMap::new();
        for item in &self.select_columns {
            if let SelectItem::Column(column) = item {
                match seen.get(column.name()) {
                    Some(qualified) if *qualified != column.qualified() => return true,
                    Some(_) => {}
                    None => {
                        seen.insert(column.name(), column.qualified());
                    }
                }
            }
        }
        false
    }

    /// Limit and offset, if present, must be non-negative. An offset of
    /// zero is treated as absent.
    pub fn validate_bounds(&self) -> Result<(Option<i64>, Option<i64>), MalformedQuery> {
        if let Some(limit) = self.limit {
            if limit < 0 {
                return Err(MalformedQuery::NegativeLimit(limit));
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(MalformedQuery::NegativeOffset(offset));
            }
        }
        let offset = self.offset.filter(|offset| *offset > 0);
        Ok((self.limit, offset))
    }
}
