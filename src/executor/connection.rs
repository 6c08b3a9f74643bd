use serde_json::Value;
use thiserror::Error;

/// Result of executing one statement on a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub statement: String,
}

/// Narrow capability a backend must provide to run compiled queries.
/// Statements arrive fully rendered with `?` placeholders and the bind
/// values in placeholder order.
pub trait Connection {
    type Error: std::error::Error;

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecOutcome, Self::Error>;
    fn begin_transaction(&mut self) -> Result<(), Self::Error>;
    fn commit(&mut self) -> Result<(), Self::Error>;
    fn rollback(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

/// Connection double that records every statement instead of running it.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    statements: Vec<(String, Vec<Value>)>,
    rows_affected: u64,
    fail_with: Option<String>,
    in_transaction: bool,
    commits: usize,
    rollbacks: usize,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report this affected-row count from every execute call.
    pub fn with_rows_affected(mut self, rows: u64) -> Self {
        self.rows_affected = rows;
        self
    }

    /// Fail every execute call with the given message.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn statements(&self) -> &[(String, Vec<Value>)] {
        &self.statements
    }

    pub fn last_executed(&self) -> Option<&str> {
        self.statements.last().map(|(sql, _)| sql.as_str())
    }

    pub fn query_count(&self) -> usize {
        self.statements.len()
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks
    }
}

impl Connection for RecordingConnection {
    type Error = BackendError;

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecOutcome, Self::Error> {
        if let Some(message) = &self.fail_with {
            return Err(BackendError(message.clone()));
        }
        self.statements.push((sql.to_string(), params.to_vec()));
        Ok(ExecOutcome {
            rows_affected: self.rows_affected,
            statement: sql.to_string(),
        })
    }

    fn begin_transaction(&mut self) -> Result<(), Self::Error> {
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        self.in_transaction = false;
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), Self::Error> {
        self.in_transaction = false;
        self.rollbacks += 1;
        Ok(())
    }
}
