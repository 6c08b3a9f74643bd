use thiserror::Error;

use crate::criteria::JoinType;

/// A Criteria that cannot be turned into a statement on any dialect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedQuery {
    #[error("refusing to compile a DELETE without conditions")]
    UnconditionalDelete,
    #[error("DELETE across a join is not supported")]
    DeleteWithJoin,
    #[error("unresolved alias '{0}' in order term")]
    UnresolvedAlias(String),
    #[error("limit must be non-negative, got {0}")]
    NegativeLimit(i64),
    #[error("offset must be non-negative, got {0}")]
    NegativeOffset(i64),
    #[error("unable to determine the table to query")]
    UnknownTable,
    #[error("update values must be column/value pairs, found a raw expression")]
    RawUpdateValue,
    #[error("UPDATE requires at least one column value")]
    EmptyUpdate,
}

/// A Criteria that is well formed but asks for something the target
/// dialect cannot express. Never downgraded to an approximate shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnsupportedDialectFeature {
    #[error("{dialect} cannot mix explicit and implicit joins in one statement")]
    MixedJoinStyles { dialect: String },
    #[error("{dialect} does not support {kind:?} joins")]
    JoinKind { dialect: String, kind: JoinType },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Malformed(#[from] MalformedQuery),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedDialectFeature),
    #[error("no dialect registered for database '{0}'")]
    UnknownDatabase(String),
}

/// Wraps the compile path and the backend path of a statement run so that
/// execution-time failures propagate unmodified.
#[derive(Debug, Error)]
pub enum ExecutorError<E: std::error::Error> {
    #[error(transparent)]
    Compile(#[from] QueryError),
    #[error("backend execution failed: {0}")]
    Backend(E),
}

impl QueryError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, QueryError::Malformed(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, QueryError::Unsupported(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_messages() {
        let err = QueryError::from(MalformedQuery::UnconditionalDelete);
        assert!(err.is_malformed());
        assert_eq!(
            err.to_string(),
            "refusing to compile a DELETE without conditions"
        );
    }

    #[test]
    fn test_unsupported_join_kind_message() {
        let err = QueryError::from(UnsupportedDialectFeature::JoinKind {
            dialect: "sqlite".to_string(),
            kind: JoinType::Right,
        });
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("sqlite"));
    }
}
