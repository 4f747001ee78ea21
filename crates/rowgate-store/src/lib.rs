//! Rowgate Store - SQLite backend for table gateways
//!
//! Provides:
//! - Connection open/configure helpers
//! - `SqliteConnection`, implementing the schema, query and transaction
//!   collaborators `rowgate-core` gateways run on
//! - DDL generation from table schemas

pub mod db;
pub mod errors;
pub mod sqlite;

// Re-export key types
pub use errors::Result;
pub use sqlite::SqliteConnection;
