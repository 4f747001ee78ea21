//! Error handling for rowgate-store
//!
//! Maps rusqlite failures onto the core gateway error taxonomy

use rowgate_core::errors::GatewayError;

pub use rowgate_core::errors::Result;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> GatewayError {
    GatewayError::persistence("sqlite", err.to_string())
}

/// Create a schema error for DDL failures on `table`
pub fn schema_error(table: &str, err: rusqlite::Error) -> GatewayError {
    GatewayError::Schema {
        table: table.to_string(),
        message: err.to_string(),
    }
}

/// Create an error for a connection mutex poisoned by a panicking holder
pub fn lock_poisoned() -> GatewayError {
    GatewayError::Concurrency {
        message: "SQLite connection lock poisoned".to_string(),
    }
}
