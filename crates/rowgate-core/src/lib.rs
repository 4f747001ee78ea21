//! Rowgate Core - table gateways over pluggable storage
//!
//! This crate provides the storage-agnostic half of rowgate:
//! - Row objects and typed records hydrated from raw column data
//! - Declarative table schemas with an implied `id` primary key
//! - Table gateways that bootstrap (create + seed) and query one table
//! - Table name inference and suffixing
//! - Parameterized statements and composite predicates
//! - Collaborator traits a storage backend implements
//!
//! Storage backends live in their own crates (`rowgate-store` for SQLite).

pub mod collaborators;
pub mod context;
pub mod errors;
pub mod gateway;
pub mod hydrator;
pub mod logging_facility;
pub mod naming;
pub mod row;
pub mod schema;
pub mod statement;
pub mod value;

// Paths the exported logging macros expand to
#[doc(hidden)]
pub mod __private {
    pub use rowgate_core_types::schema;
    pub use tracing;
}

// Re-export commonly used types
pub use collaborators::{Connection, QueryExecutor, SchemaManager, TransactionRunner};
pub use context::{GatewayConfig, GatewayContext};
pub use errors::{ExError, ExErrorKind, GatewayError, InitPhase, Result};
pub use gateway::{RowIter, TableDefinition, TableGateway, Target};
pub use hydrator::Hydrator;
pub use naming::TableNaming;
pub use row::{Fields, Record, Row, Slot};
pub use schema::{Column, ColumnTypes, TableSchema};
pub use statement::{Condition, PredicateBuilder, Statement};
pub use value::{ColumnType, Value};
