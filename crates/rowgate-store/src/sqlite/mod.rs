//! SQLite collaborator
//!
//! `SqliteConnection` wraps one `rusqlite::Connection` and implements every
//! collaborator trait a gateway needs, so `Arc<SqliteConnection>` can be
//! handed straight to a `GatewayContext`.
//!
//! Transactions nest: the outermost level is `BEGIN IMMEDIATE`/`COMMIT`,
//! inner levels are savepoints, so a failed inner unit (one seed row) can be
//! rolled back together with everything around it.
//!
//! A transaction belongs to the thread that opened it. While it is open,
//! statements and transactions from other threads wait until the outermost
//! level ends, so they never run inside someone else's transaction.

pub mod ddl;
mod values;

use std::path::Path;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use rowgate_core::collaborators::{QueryExecutor, SchemaManager, TransactionRunner};
use rowgate_core::row::Fields;
use rowgate_core::schema::TableSchema;
use rowgate_core::statement::{quote_ident, Statement};
use rusqlite::{params_from_iter, OptionalExtension};

use crate::db;
use crate::errors::{from_rusqlite, lock_poisoned, schema_error, Result};

pub struct SqliteConnection {
    conn: Mutex<rusqlite::Connection>,
    tx: Mutex<TxState>,
    tx_ended: Condvar,
}

/// Owner and nesting level of the open transaction
#[derive(Debug, Default)]
struct TxState {
    owner: Option<ThreadId>,
    depth: usize,
}

impl SqliteConnection {
    /// Wrap an already configured connection
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            tx: Mutex::new(TxState::default()),
            tx_ended: Condvar::new(),
        }
    }

    /// Open and configure a database file
    ///
    /// # Errors
    ///
    /// `Persistence` if the file cannot be opened or configured.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn)?;
        Ok(Self::new(conn))
    }

    /// Open and configure a private in-memory database
    ///
    /// # Errors
    ///
    /// `Persistence` if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        db::configure(&conn)?;
        Ok(Self::new(conn))
    }

    /// Give the wrapped connection back
    ///
    /// # Errors
    ///
    /// `Concurrency` if the lock was poisoned.
    pub fn into_inner(self) -> Result<rusqlite::Connection> {
        self.conn.into_inner().map_err(|_| lock_poisoned())
    }

    /// Current transaction nesting level, 0 outside transactions
    pub fn transaction_depth(&self) -> usize {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).depth
    }

    /// Transaction state once no other thread owns a transaction
    fn wait_turn(&self) -> Result<MutexGuard<'_, TxState>> {
        let me = thread::current().id();
        let state = self.tx.lock().map_err(|_| lock_poisoned())?;
        self.tx_ended
            .wait_while(state, |s| matches!(s.owner, Some(owner) if owner != me))
            .map_err(|_| lock_poisoned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, rusqlite::Connection>> {
        let _turn = self.wait_turn()?;
        self.conn.lock().map_err(|_| lock_poisoned())
    }

    /// Enter one transaction level on the current thread, returning the
    /// level entered
    fn enter(&self) -> Result<usize> {
        let mut state = self.wait_turn()?;
        state.owner = Some(thread::current().id());
        state.depth += 1;
        Ok(state.depth - 1)
    }

    fn batch(&self, sql: &str) -> Result<()> {
        self.lock()?.execute_batch(sql).map_err(from_rusqlite)
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("depth", &self.transaction_depth())
            .finish_non_exhaustive()
    }
}

impl SchemaManager for SqliteConnection {
    fn table_exists(&self, table: &str) -> Result<bool> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }

    fn create_table(&self, schema: &TableSchema) -> Result<()> {
        let sql = ddl::create_table_sql(schema)?;
        tracing::debug!(table = schema.name(), sql = sql.as_str(), "creating table");

        self.lock()?
            .execute_batch(&sql)
            .map_err(|e| schema_error(schema.name(), e))
    }

    fn truncate_table(&self, table: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(&format!("DELETE FROM {}", quote_ident(table)), [])
            .map_err(|e| schema_error(table, e))?;

        // sqlite_sequence only exists once some AUTOINCREMENT table has been created
        let has_sequence: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        if has_sequence.is_some() {
            conn.execute("DELETE FROM sqlite_sequence WHERE name = ?1", [table])
                .map_err(|e| schema_error(table, e))?;
        }

        Ok(())
    }
}

impl QueryExecutor for SqliteConnection {
    fn fetch(&self, statement: &Statement) -> Result<Vec<Fields>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(statement.sql()).map_err(from_rusqlite)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let params = statement.params().iter().map(values::to_sql);
        let mut rows = stmt.query(params_from_iter(params)).map_err(from_rusqlite)?;

        let mut fetched = Vec::new();
        while let Some(row) = rows.next().map_err(from_rusqlite)? {
            let mut fields = Fields::new();
            for (i, column) in columns.iter().enumerate() {
                let value: rusqlite::types::Value = row.get(i).map_err(from_rusqlite)?;
                fields.insert(column.clone(), values::from_sql(value));
            }
            fetched.push(fields);
        }

        Ok(fetched)
    }

    fn execute(&self, statement: &Statement) -> Result<u64> {
        let conn = self.lock()?;
        let params = statement.params().iter().map(values::to_sql);
        let affected = conn
            .execute(statement.sql(), params_from_iter(params))
            .map_err(from_rusqlite)?;
        Ok(affected as u64)
    }

    fn last_insert_id(&self) -> Result<i64> {
        Ok(self.lock()?.last_insert_rowid())
    }
}

/// Leaves one transaction level however it ends; the outermost level
/// releases ownership and wakes waiting threads
struct LevelGuard<'a>(&'a SqliteConnection);

impl Drop for LevelGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.0.tx.lock().unwrap_or_else(PoisonError::into_inner);
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            state.owner = None;
            self.0.tx_ended.notify_all();
        }
    }
}

impl TransactionRunner for SqliteConnection {
    fn transactional(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        let depth = self.enter()?;
        let _guard = LevelGuard(self);

        let (begin, commit, rollback) = if depth == 0 {
            (
                "BEGIN IMMEDIATE".to_string(),
                "COMMIT".to_string(),
                "ROLLBACK".to_string(),
            )
        } else {
            let savepoint = format!("rowgate_sp_{}", depth);
            (
                format!("SAVEPOINT {}", savepoint),
                format!("RELEASE {}", savepoint),
                format!("ROLLBACK TO {0}; RELEASE {0}", savepoint),
            )
        };

        self.batch(&begin)?;
        let outcome = work().and_then(|()| self.batch(&commit));

        if let Err(err) = &outcome {
            if let Err(rollback_err) = self.batch(&rollback) {
                tracing::warn!(
                    depth,
                    error = %err,
                    rollback_error = %rollback_err,
                    "rollback failed"
                );
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowgate_core::collaborators::in_transaction;
    use rowgate_core::errors::GatewayError;
    use rowgate_core::fields;
    use rowgate_core::schema::Column;
    use rowgate_core::value::{ColumnType, Value};

    fn connection_with_table() -> SqliteConnection {
        let conn = SqliteConnection::open_in_memory().unwrap();
        let schema =
            TableSchema::with_columns("notes", vec![Column::new("body", ColumnType::Text)]).unwrap();
        conn.create_table(&schema).unwrap();
        conn
    }

    fn insert(conn: &SqliteConnection, body: &str) -> Result<u64> {
        conn.execute(&Statement::new(
            "INSERT INTO \"notes\" (\"body\") VALUES (?)",
            vec![Value::from(body)],
        ))
    }

    fn count(conn: &SqliteConnection) -> i64 {
        let rows = conn
            .fetch(&Statement::new("SELECT COUNT(*) AS n FROM \"notes\"", vec![]))
            .unwrap();
        rows[0]["n"].as_i64().unwrap()
    }

    #[test]
    fn test_table_exists_after_create() {
        let conn = connection_with_table();
        assert!(conn.table_exists("notes").unwrap());
        assert!(!conn.table_exists("missing").unwrap());
    }

    #[test]
    fn test_fetch_keys_rows_by_column() {
        let conn = connection_with_table();
        insert(&conn, "hello").unwrap();

        let rows = conn
            .fetch(&Statement::new("SELECT * FROM \"notes\"", vec![]))
            .unwrap();
        assert_eq!(rows, vec![fields! { "id" => 1_i64, "body" => "hello" }]);
    }

    #[test]
    fn test_rollback_discards_work() {
        let conn = connection_with_table();

        let err = in_transaction::<()>(&conn, || {
            insert(&conn, "doomed")?;
            Err(GatewayError::ExpiredRow)
        })
        .unwrap_err();

        assert_eq!(err, GatewayError::ExpiredRow);
        assert_eq!(count(&conn), 0);
        assert_eq!(conn.transaction_depth(), 0);
    }

    #[test]
    fn test_inner_failure_rolls_back_only_inner_work() {
        let conn = connection_with_table();

        in_transaction(&conn, || {
            insert(&conn, "outer")?;
            let inner = in_transaction::<()>(&conn, || {
                insert(&conn, "inner")?;
                Err(GatewayError::ExpiredRow)
            });
            assert!(inner.is_err());
            Ok(())
        })
        .unwrap();

        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn test_outer_failure_rolls_back_committed_savepoints() {
        let conn = connection_with_table();

        let result = in_transaction::<()>(&conn, || {
            in_transaction(&conn, || insert(&conn, "first"))?;
            in_transaction(&conn, || insert(&conn, "second"))?;
            Err(GatewayError::ExpiredRow)
        });

        assert!(result.is_err());
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn test_truncate_restarts_identities() {
        let conn = connection_with_table();
        insert(&conn, "a").unwrap();
        insert(&conn, "b").unwrap();

        conn.truncate_table("notes").unwrap();
        insert(&conn, "c").unwrap();

        assert_eq!(conn.last_insert_id().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_create_is_a_schema_error() {
        let conn = connection_with_table();
        let schema = TableSchema::new("notes");

        let err = conn.create_table(&schema).unwrap_err();
        assert!(matches!(err, GatewayError::Schema { .. }));
    }

    #[test]
    fn test_other_threads_wait_for_an_open_transaction() {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let conn = connection_with_table();
        let (opened, wait_opened) = mpsc::channel();
        let shared = &conn;

        thread::scope(|scope| {
            let owner = scope.spawn(move || {
                let conn = shared;
                in_transaction::<()>(conn, || {
                    insert(conn, "doomed")?;
                    opened.send(()).unwrap();
                    thread::sleep(Duration::from_millis(50));
                    Err(GatewayError::ExpiredRow)
                })
            });

            let other = scope.spawn(move || {
                let conn = shared;
                wait_opened.recv().unwrap();
                in_transaction(conn, || insert(conn, "kept"))
            });

            assert!(owner.join().unwrap().is_err());
            assert_eq!(other.join().unwrap(), Ok(1));
        });

        let rows = conn
            .fetch(&Statement::new("SELECT \"body\" FROM \"notes\"", vec![]))
            .unwrap();
        assert_eq!(rows, vec![fields! { "body" => "kept" }]);
        assert_eq!(conn.transaction_depth(), 0);
    }
}
