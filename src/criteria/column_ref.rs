use std::fmt::Display;
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches a plain, optionally dot-qualified identifier. Anything else
/// (parentheses, spaces, operators) is a raw expression.
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

/// A table-qualified or alias-qualified column reference.
///
/// Equality and hashing go through the qualified name string, so
/// `ColumnRef::parse("book.TITLE")` equals `ColumnRef::new("book", "TITLE")`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRef {
    qualifier: Option<String>,
    name: String,
}

impl ColumnRef {
    pub fn new(qualifier: &str, name: &str) -> Self {
        Self {
            qualifier: Some(qualifier.to_string()),
            name: name.to_string(),
        }
    }

    pub fn unqualified(name: &str) -> Self {
        Self {
            qualifier: None,
            name: name.to_string(),
        }
    }

    /// Splits `"table.column"` at the last dot. A bare name stays
    /// unqualified.
    pub fn parse(raw: &str) -> Self {
        match raw.rsplit_once('.') {
            Some((qualifier, name)) => Self::new(qualifier, name),
            None => Self::unqualified(raw),
        }
    }

    /// Whether `raw` looks like a column reference at all, as opposed to a
    /// raw SQL expression such as `substring(book.TITLE from 1)`.
    pub fn looks_like_column(raw: &str) -> bool {
        IDENTIFIER.is_match(raw)
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified(&self) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{}.{}", qualifier, self.name),
            None => self.name.clone(),
        }
    }

    /// The alias used when the needs-aliases condition forces uniform
    /// column aliasing: `book.ID` becomes `book_ID`.
    pub fn flat_alias(&self) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{}_{}", qualifier, self.name),
            None => self.name.clone(),
        }
    }
}

impl PartialEq for ColumnRef {
    fn eq(&self, other: &Self) -> bool {
        self.qualified() == other.qualified()
    }
}

impl Eq for ColumnRef {}

impl Hash for ColumnRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualified().hash(state);
    }
}

impl Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified())
    }
}
