//! Schema descriptors
//!
//! A [`TableSchema`] declares the physical table a gateway owns. Every
//! schema starts with the unsigned autoincrement `id` primary key; table
//! definitions extend it with their own columns and can never redeclare `id`.

use std::collections::{BTreeMap, HashSet};

use crate::errors::{GatewayError, Result};
use crate::row::{Fields, ID_COLUMN};
use crate::value::{ColumnType, Value};

/// One declared column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    nullable: bool,
    default: Option<Value>,
    autoincrement: bool,
    unsigned: bool,
    length: Option<u32>,
}

impl Column {
    /// A NOT NULL column without a default
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
            autoincrement: false,
            unsigned: false,
            length: None,
        }
    }

    fn identity() -> Self {
        Self {
            autoincrement: true,
            unsigned: true,
            ..Self::new(ID_COLUMN, ColumnType::Integer)
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_autoincrement(&self) -> bool {
        self.autoincrement
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    pub fn max_length(&self) -> Option<u32> {
        self.length
    }
}

/// Declarative definition of one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<String>,
}

impl TableSchema {
    /// Base descriptor: just the `id` primary key
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![Column::identity()],
            primary_key: vec![ID_COLUMN.to_string()],
        }
    }

    /// Base descriptor extended with `columns`, in declaration order
    ///
    /// Fails with `InvalidConfiguration` on an empty column name, a
    /// redeclared `id` or a duplicate column.
    pub fn with_columns(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = Column>,
    ) -> Result<Self> {
        let mut schema = Self::new(name);
        let mut seen: HashSet<String> = schema.columns.iter().map(|c| c.name.clone()).collect();

        for column in columns {
            if column.name.trim().is_empty() {
                return Err(GatewayError::invalid_configuration(format!(
                    "table \"{}\" declares a column with an empty name",
                    schema.name
                )));
            }
            if !seen.insert(column.name.clone()) {
                return Err(GatewayError::invalid_configuration(format!(
                    "table \"{}\" declares column \"{}\" more than once",
                    schema.name, column.name
                )));
            }
            schema.columns.push(column);
        }

        Ok(schema)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn column_types(&self) -> ColumnTypes {
        ColumnTypes(
            self.columns
                .iter()
                .map(|c| (c.name.clone(), c.column_type))
                .collect(),
        )
    }

    /// Declared default of every column, NULL where none is declared
    pub fn default_values(&self) -> Fields {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.default.clone().unwrap_or(Value::Null)))
            .collect()
    }
}

/// Column name to declared type, derived once from a schema
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnTypes(BTreeMap<String, ColumnType>);

impl ColumnTypes {
    pub fn get(&self, column: &str) -> Option<ColumnType> {
        self.0.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.0.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl FromIterator<(String, ColumnType)> for ColumnTypes {
    fn from_iter<I: IntoIterator<Item = (String, ColumnType)>>(iter: I) -> Self {
        ColumnTypes(iter.into_iter().collect())
    }
}
