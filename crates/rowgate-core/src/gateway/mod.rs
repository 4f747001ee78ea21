//! Table gateways
//!
//! A [`TableGateway`] owns one physical table: it makes sure the table
//! exists (creating and seeding it on first use) and offers row-level
//! create/find/update/delete plus lazy queries that yield hydrated records.
//!
//! ## Responsibilities
//!
//! - Table bootstrap: existence check, creation, seeding
//! - Row lifecycle, including keeping passed-in records in sync
//! - Boundary logging for every operation
//!
//! ## Non-Responsibilities
//!
//! - SQL dialects and drivers (handled by collaborator implementations)
//! - Schema migrations of existing tables

pub mod cursor;
pub mod definition;
pub mod table;
pub mod target;

pub use cursor::RowIter;
pub use definition::TableDefinition;
pub use table::TableGateway;
pub use target::Target;
