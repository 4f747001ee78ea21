//! Storage collaborators
//!
//! A gateway talks to its database through three narrow seams: schema
//! management, statement execution and transaction demarcation. Storage
//! crates implement all three on one connection type, which then satisfies
//! [`Connection`] through the blanket impl.

use crate::errors::{GatewayError, Result};
use crate::row::Fields;
use crate::schema::TableSchema;
use crate::statement::Statement;

/// Table lifecycle operations
pub trait SchemaManager {
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Create `schema` as declared (primary key, defaults, nullability)
    fn create_table(&self, schema: &TableSchema) -> Result<()>;

    /// Delete all rows and restart identity generation
    fn truncate_table(&self, table: &str) -> Result<()>;
}

/// Statement execution
pub trait QueryExecutor {
    /// Run a query and return every result row keyed by column name
    fn fetch(&self, statement: &Statement) -> Result<Vec<Fields>>;

    /// Run a statement and return the number of affected rows
    fn execute(&self, statement: &Statement) -> Result<u64>;

    /// Identity generated by the most recent insert on this connection
    fn last_insert_id(&self) -> Result<i64>;
}

/// Transaction demarcation
///
/// `work` runs inside a transaction that commits when it returns `Ok` and
/// rolls back when it returns `Err`; the error is handed back unchanged.
/// Implementations must support nesting: an inner transaction commits or
/// rolls back only its own work.
pub trait TransactionRunner {
    fn transactional(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()>;
}

/// Everything a gateway needs from a database connection
pub trait Connection: SchemaManager + QueryExecutor + TransactionRunner + Send + Sync {}

impl<T> Connection for T where T: SchemaManager + QueryExecutor + TransactionRunner + Send + Sync {}

/// Run `work` in a transaction and return its value
///
/// # Errors
///
/// Returns whatever `work` or the runner fails with.
pub fn in_transaction<T>(
    runner: &(impl TransactionRunner + ?Sized),
    work: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let mut work = Some(work);
    let mut output = None;

    runner.transactional(&mut || {
        let work = work.take().ok_or_else(|| GatewayError::Internal {
            message: "transaction body invoked twice".to_string(),
        })?;
        output = Some(work()?);
        Ok(())
    })?;

    output.ok_or_else(|| GatewayError::Internal {
        message: "transaction committed without running its body".to_string(),
    })
}
