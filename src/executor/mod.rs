pub mod connection;
pub use connection::*;

pub mod row;
pub use row::*;

pub mod eval;
pub use eval::*;

pub mod memory;
pub use memory::*;


use tracing::debug;

use crate::compiler::{compile_delete, compile_update};
use crate::criteria::Criteria;
use crate::dialect::SqlDialect;
use crate::error::ExecutorError;

/// Compiles and executes an UPDATE, reporting the backend's affected-row
/// count. A count of zero means the supplied values matched the persisted
/// ones; the compiler does not detect that itself.
pub fn run_update<C: Connection>(
    selection: &Criteria,
    values: &Criteria,
    dialect: &dyn SqlDialect,
    connection: &mut C,
) -> Result<u64, ExecutorError<C::Error>> {
    let compiled = compile_update(selection, values, dialect)?;
    let outcome = connection
        .execute(&compiled.sql, &compiled.params)
        .map_err(ExecutorError::Backend)?;
    debug!(rows = outcome.rows_affected, "executed UPDATE");
    Ok(outcome.rows_affected)
}

/// Compiles and executes a DELETE. A Criteria spanning several tables
/// compiles into several statements; those run inside one transaction and
/// roll back together if any of them fails.
pub fn run_delete<C: Connection>(
    criteria: &Criteria,
    dialect: &dyn SqlDialect,
    connection: &mut C,
) -> Result<u64, ExecutorError<C::Error>> {
    let statements = compile_delete(criteria, dialect)?;
    let transactional = statements.len() > 1;
    if transactional {
        connection
            .begin_transaction()
            .map_err(ExecutorError::Backend)?;
    }
    let mut total = 0;
    for statement in &statements {
        match connection.execute(&statement.sql, &statement.params) {
            Ok(outcome) => total += outcome.rows_affected,
            Err(err) => {
                if transactional {
                    let _ = connection.rollback();
                }
                return Err(ExecutorError::Backend(err));
            }
        }
    }
    if transactional {
        connection.commit().map_err(ExecutorError::Backend)?;
    }
    debug!(rows = total, statements = statements.len(), "executed DELETE");
    Ok(total)
}
