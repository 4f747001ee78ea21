//! Shared fixtures for gateway integration tests
#![allow(dead_code)]

use std::sync::Arc;

use rowgate_core::fields;
use rowgate_core::gateway::TableDefinition;
use rowgate_core::row::{Fields, Record, Row, Slot};
use rowgate_core::schema::Column;
use rowgate_core::value::ColumnType;
use rowgate_core::{GatewayConfig, GatewayContext};
use rowgate_store::SqliteConnection;

pub const UNKNOWN_ID: i64 = 9001;

/// One member of the band, with typed slots
#[derive(Debug, Default)]
pub struct Beatle {
    row: Row,
    pub name: String,
    pub best: bool,
}

impl Record for Beatle {
    fn row(&self) -> &Row {
        &self.row
    }

    fn row_mut(&mut self) -> &mut Row {
        &mut self.row
    }

    fn slots() -> Vec<Slot<Self>> {
        vec![
            Slot::new("name", |b: &mut Beatle, v| {
                b.name = v.as_str().unwrap_or_default().to_string()
            }),
            Slot::new("isBestBeatle", |b: &mut Beatle, v| {
                b.best = v.as_bool().unwrap_or_default()
            }),
        ]
    }
}

pub struct BeatlesMembersTable;

impl TableDefinition for BeatlesMembersTable {
    type Record = Beatle;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", ColumnType::String),
            Column::new("is_best_beatle", ColumnType::Boolean).default_value(false),
        ]
    }

    fn seed_rows() -> Vec<Fields> {
        vec![
            fields! { "name" => "John Lennon", "is_best_beatle" => true },
            fields! { "name" => "Paul McCartney", "is_best_beatle" => false },
            fields! { "name" => "George Harrison", "is_best_beatle" => false },
            fields! { "name" => "Ringo Starr", "is_best_beatle" => false },
        ]
    }
}

/// Seeds two rows; the second violates `name NOT NULL`
pub struct BrokenSeedTable;

impl TableDefinition for BrokenSeedTable {
    type Record = Row;

    fn columns() -> Vec<Column> {
        vec![Column::new("name", ColumnType::String)]
    }

    fn seed_rows() -> Vec<Fields> {
        vec![
            fields! { "name" => "fine" },
            fields! { "name" => None::<String> },
        ]
    }
}

/// Untyped table with nothing to seed
pub struct AwesomeDataTable;

impl TableDefinition for AwesomeDataTable {
    type Record = Row;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("label", ColumnType::Text),
            Column::new("score", ColumnType::Integer).nullable(),
        ]
    }
}

pub fn sqlite() -> Arc<SqliteConnection> {
    Arc::new(SqliteConnection::open_in_memory().unwrap())
}

pub fn context() -> GatewayContext {
    GatewayContext::new(sqlite())
}

pub fn context_with_page_size(page_size: usize) -> GatewayContext {
    GatewayContext::with_config(sqlite(), GatewayConfig { page_size }).unwrap()
}
