pub mod error;
pub use error::{ExecutorError, MalformedQuery, QueryError, UnsupportedDialectFeature};

pub mod criteria;
pub use criteria::{ColumnRef, ComparisonOp, Criteria, Direction, JoinType, OrderTerm, Predicate};

pub mod dialect;
pub use dialect::{
    CompiledQuery, DialectRegistry, MssqlDialect, PgsqlDialect, SqlDialect, SqliteDialect,
    StandardDialect,
};

pub mod compiler;
pub use compiler::{compile_delete, compile_select, compile_update};

pub mod executor;
pub use executor::{Connection, MemoryDb, RecordingConnection, run_delete, run_update};
