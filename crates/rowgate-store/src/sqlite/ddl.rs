//! DDL generation
//!
//! Renders a [`TableSchema`] as a SQLite `CREATE TABLE` statement. The
//! autoincrement `id` key maps to `INTEGER PRIMARY KEY AUTOINCREMENT` so
//! identities are never reused, and `sqlite_sequence` tracks them.

use rowgate_core::errors::{GatewayError, Result};
use rowgate_core::schema::{Column, TableSchema};
use rowgate_core::statement::quote_ident;
use rowgate_core::value::{ColumnType, Value};

/// Length used for string columns declared without one
const DEFAULT_STRING_LENGTH: u32 = 255;

pub fn create_table_sql(schema: &TableSchema) -> Result<String> {
    let definitions = schema
        .columns()
        .iter()
        .map(|column| column_definition(schema, column))
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "CREATE TABLE {} (\n    {}\n)",
        quote_ident(schema.name()),
        definitions.join(",\n    ")
    ))
}

fn column_definition(schema: &TableSchema, column: &Column) -> Result<String> {
    let name = quote_ident(column.name());
    let is_key = schema.primary_key().iter().any(|k| k == column.name());

    if is_key && column.is_autoincrement() {
        return Ok(format!("{} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL", name));
    }

    let mut definition = format!("{} {}", name, sql_type(column));
    if !column.is_nullable() {
        definition.push_str(" NOT NULL");
    }
    if let Some(default) = column.default() {
        definition.push_str(" DEFAULT ");
        definition.push_str(&default_literal(schema, column, default)?);
    }
    if column.is_unsigned() && matches!(column.column_type(), ColumnType::Integer | ColumnType::BigInt) {
        definition.push_str(&format!(" CHECK ({} >= 0)", name));
    }

    Ok(definition)
}

fn sql_type(column: &Column) -> String {
    match column.column_type() {
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Float => "REAL".to_string(),
        ColumnType::String => format!(
            "VARCHAR({})",
            column.max_length().unwrap_or(DEFAULT_STRING_LENGTH)
        ),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::Blob => "BLOB".to_string(),
    }
}

fn default_literal(schema: &TableSchema, column: &Column, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Boolean(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Real(f) if f.is_finite() => Ok(format!("{:?}", f)),
        Value::Real(_) => Err(GatewayError::invalid_configuration(format!(
            "column \"{}\" of table \"{}\" has a non-finite default",
            column.name(),
            schema.name()
        ))),
        Value::Text(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
        Value::Blob(b) => Ok(format!("X'{}'", hex::encode(b))),
    }
}
