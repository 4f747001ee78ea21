use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use crate::collaborators::{in_transaction, Connection};
use crate::context::{self, GatewayContext};
use crate::errors::{GatewayError, InitPhase, Result};
use crate::hydrator::Hydrator;
use crate::naming::TableNaming;
use crate::row::{Fields, Record, ID_COLUMN};
use crate::schema::{ColumnTypes, TableSchema};
use crate::statement::{Condition, PredicateBuilder, StatementBuilder};
use crate::value::Value;
use crate::{log_op_end, log_op_error, log_op_start};

use super::cursor::RowIter;
use super::definition::TableDefinition;
use super::target::Target;

/// Gateway to the table described by `D`
///
/// Construction brings the table up: if it does not exist yet it is created
/// and seeded with `D::seed_rows()` in one transaction. An existing table is
/// used as is, so construction is idempotent.
pub struct TableGateway<D: TableDefinition> {
    context: GatewayContext,
    table_name: String,
    suffix: Option<String>,
    schema: TableSchema,
    column_types: Arc<ColumnTypes>,
    hydrator: Hydrator<D::Record>,
    _definition: PhantomData<fn() -> D>,
}

impl<D: TableDefinition> TableGateway<D> {
    /// Open the table named after `D`
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration`: malformed column declarations
    /// - `TableInitialization`: table creation or seeding failed
    /// - collaborator errors from the existence check, unchanged
    pub fn new(context: GatewayContext) -> Result<Self> {
        Self::open(context, TableNaming::Inferred)
    }

    /// Open the table named after `D`, extended with `suffix`
    ///
    /// # Errors
    ///
    /// As [`TableGateway::new`], plus `InvalidConfiguration` for a suffix
    /// made only of delimiters.
    pub fn with_suffix(context: GatewayContext, suffix: &str) -> Result<Self> {
        Self::open(context, TableNaming::Suffixed(suffix.to_string()))
    }

    /// Open a table by explicit name
    ///
    /// # Errors
    ///
    /// As [`TableGateway::new`].
    pub fn with_table_name(context: GatewayContext, table_name: &str) -> Result<Self> {
        Self::open(context, TableNaming::Explicit(table_name.to_string()))
    }

    /// Open the table named after `D` on the registered default context
    ///
    /// # Errors
    ///
    /// `NotConfigured` if no default context is registered, otherwise as
    /// [`TableGateway::new`].
    pub fn open_default() -> Result<Self> {
        Self::new(context::default_context()?)
    }

    /// # Errors
    ///
    /// As [`TableGateway::new`].
    pub fn open(context: GatewayContext, naming: TableNaming) -> Result<Self> {
        let table_name = naming.resolve(D::type_name())?;
        let suffix = naming.suffix()?;
        let schema = TableSchema::with_columns(table_name.clone(), D::columns())?;
        let column_types = Arc::new(schema.column_types());

        let gateway = Self {
            context,
            table_name,
            suffix,
            schema,
            hydrator: Hydrator::new(Arc::clone(&column_types)),
            column_types,
            _definition: PhantomData,
        };

        gateway.instrumented("initialize", || gateway.initialize())?;
        Ok(gateway)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Normalized suffix for gateways opened with one
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn column_types(&self) -> &ColumnTypes {
        &self.column_types
    }

    /// Insert a row and return it as a record
    ///
    /// Any `id` in `fields` is ignored. The record holds the declared
    /// defaults overlaid with `fields` and the generated id; the row is not
    /// read back.
    ///
    /// # Errors
    ///
    /// `UnknownColumn` for undeclared columns, collaborator errors otherwise.
    pub fn create(&self, fields: Fields) -> Result<D::Record> {
        self.instrumented("create", || self.insert(fields))
    }

    /// Load the row with identity `id`
    ///
    /// # Errors
    ///
    /// `RowNotFound` if no such row exists.
    pub fn find(&self, id: i64) -> Result<D::Record> {
        self.instrumented("find", || {
            let statement = self.statements().select_by_id(id);
            match self.connection().fetch(&statement)?.into_iter().next() {
                Some(raw) => self.hydrator.instantiate(raw),
                None => Err(GatewayError::RowNotFound {
                    table: self.table_name.clone(),
                    id,
                }),
            }
        })
    }

    /// Write `fields` to the addressed row
    ///
    /// Returns `false` without touching storage when `fields` is empty once
    /// `id` is removed, and `false` when no row was affected. A record
    /// target is re-hydrated with its previous snapshot overlaid with
    /// `fields`.
    ///
    /// # Errors
    ///
    /// `ExpiredRow` for an expired record target, `UnknownColumn` for
    /// undeclared columns, collaborator errors otherwise.
    pub fn update<'r>(
        &self,
        target: impl Into<Target<'r, D::Record>>,
        mut fields: Fields,
    ) -> Result<bool>
    where
        D::Record: 'r,
    {
        let target = target.into();
        self.instrumented("update", || {
            fields.remove(ID_COLUMN);
            if fields.is_empty() {
                return Ok(false);
            }

            let id = target.id()?;
            let fields = self.native_fields(fields)?;
            let statement = self.statements().update(id, &fields)?;
            let conn = self.connection();
            let affected = in_transaction(conn, || conn.execute(&statement))?;
            if affected == 0 {
                return Ok(false);
            }

            if let Target::Record(record) = target {
                let mut synced = record.to_fields().clone();
                synced.extend(fields);
                synced.insert(ID_COLUMN.to_string(), Value::Integer(id));
                self.hydrator.hydrate(record, synced, false)?;
            }
            Ok(true)
        })
    }

    /// Delete the addressed row
    ///
    /// Returns whether a row was deleted. A record target is expired on
    /// success.
    ///
    /// # Errors
    ///
    /// `ExpiredRow` for an expired record target, collaborator errors
    /// otherwise.
    pub fn delete<'r>(&self, target: impl Into<Target<'r, D::Record>>) -> Result<bool>
    where
        D::Record: 'r,
    {
        let target = target.into();
        self.instrumented("delete", || {
            let id = target.id()?;
            let statement = self.statements().delete(id);
            let conn = self.connection();
            let affected = in_transaction(conn, || conn.execute(&statement))?;
            if affected == 0 {
                return Ok(false);
            }

            if let Target::Record(record) = target {
                let expired: Fields = [(ID_COLUMN.to_string(), Value::Integer(0))].into();
                self.hydrator.hydrate(record, expired, false)?;
            }
            Ok(true)
        })
    }

    /// Every row, ascending by id
    pub fn all(&self) -> RowIter<'_, D> {
        RowIter::new(self, None)
    }

    /// Rows whose `column` equals `value`, ascending by id
    ///
    /// # Errors
    ///
    /// `UnknownColumn` if `column` is not declared.
    pub fn where_eq(&self, column: &str, value: impl Into<Value>) -> Result<RowIter<'_, D>> {
        self.where_expression(|qb| qb.and([qb.eq(column, value)]))
    }

    /// Rows matching the condition built by `expression`, ascending by id
    ///
    /// ```ignore
    /// let starrs = gateway.where_expression(|qb| {
    ///     qb.and([qb.like("name", "%Starr"), qb.eq("is_best_beatle", false)])
    /// })?;
    /// ```
    ///
    /// # Errors
    ///
    /// `UnknownColumn` if the condition references an undeclared column.
    pub fn where_expression<F>(&self, expression: F) -> Result<RowIter<'_, D>>
    where
        F: FnOnce(&PredicateBuilder) -> Condition,
    {
        let condition = expression(&PredicateBuilder::new());
        self.statements().check_condition(&condition)?;
        Ok(RowIter::new(self, Some(condition)))
    }

    /// Number of rows in the table
    ///
    /// # Errors
    ///
    /// Collaborator errors, or `Internal` if the count is not an integer.
    pub fn count(&self) -> Result<u64> {
        self.instrumented("count", || {
            let rows = self.connection().fetch(&self.statements().count())?;
            rows.into_iter()
                .next()
                .and_then(|row| row.values().next().and_then(Value::as_i64))
                .and_then(|count| u64::try_from(count).ok())
                .ok_or_else(|| GatewayError::Internal {
                    message: format!("COUNT(*) on \"{}\" returned no integer", self.table_name),
                })
        })
    }

    /// Delete every row and restart identity generation
    ///
    /// # Errors
    ///
    /// Collaborator errors.
    pub fn clear(&self) -> Result<()> {
        self.instrumented("clear", || {
            let conn = self.connection();
            in_transaction(conn, || conn.truncate_table(&self.table_name))
        })
    }

    pub(crate) fn page_size(&self) -> usize {
        self.context.config().page_size
    }

    pub(crate) fn hydrator(&self) -> &Hydrator<D::Record> {
        &self.hydrator
    }

    pub(crate) fn fetch_page(
        &self,
        filter: Option<&Condition>,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<Fields>> {
        let statement = self.statements().select_page(filter, after_id, limit)?;
        self.connection().fetch(&statement)
    }

    fn connection(&self) -> &dyn Connection {
        self.context.connection()
    }

    fn statements(&self) -> StatementBuilder<'_> {
        StatementBuilder::new(&self.table_name, &self.column_types)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.connection();

        if conn.table_exists(&self.table_name)? {
            tracing::debug!(table = self.table_name.as_str(), "table exists");
            return Ok(());
        }

        conn.create_table(&self.schema)
            .map_err(|e| GatewayError::initialization(&self.table_name, InitPhase::Creation, e))?;
        tracing::debug!(
            table = self.table_name.as_str(),
            phase = InitPhase::Creation.as_str(),
            "table created"
        );

        let seeds = D::seed_rows();
        if seeds.is_empty() {
            return Ok(());
        }

        let seed_len = seeds.len();
        in_transaction(conn, || {
            for fields in seeds {
                self.insert(fields)?;
            }
            Ok(())
        })
        .map_err(|e| GatewayError::initialization(&self.table_name, InitPhase::Seeding, e))?;
        tracing::debug!(
            table = self.table_name.as_str(),
            phase = InitPhase::Seeding.as_str(),
            seed_len,
            "table seeded"
        );

        Ok(())
    }

    fn insert(&self, mut fields: Fields) -> Result<D::Record> {
        fields.remove(ID_COLUMN);
        let fields = self.native_fields(fields)?;
        let statement = self.statements().insert(&fields)?;
        let mut merged = self.hydrator.to_native(self.schema.default_values())?;
        merged.extend(fields);

        let conn = self.connection();
        let id = in_transaction(conn, || {
            conn.execute(&statement)?;
            conn.last_insert_id()
        })?;

        merged.insert(ID_COLUMN.to_string(), Value::Integer(id));
        let mut record = D::Record::default();
        self.hydrator.hydrate(&mut record, merged, false)?;
        Ok(record)
    }

    /// Caller values in their columns' native form, checked before any write
    fn native_fields(&self, fields: Fields) -> Result<Fields> {
        self.statements().check_fields(&fields)?;
        self.hydrator.to_native(fields)
    }

    fn instrumented<T>(&self, op: &'static str, work: impl FnOnce() -> Result<T>) -> Result<T> {
        log_op_start!(op, table = self.table_name.as_str());
        let start = Instant::now();

        match work() {
            Ok(value) => {
                log_op_end!(
                    op,
                    duration_ms = start.elapsed().as_millis() as u64,
                    table = self.table_name.as_str()
                );
                Ok(value)
            }
            Err(err) => {
                log_op_error!(
                    op,
                    &err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    table = self.table_name.as_str()
                );
                Err(err)
            }
        }
    }
}

impl<D: TableDefinition> std::fmt::Display for TableGateway<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.table_name)
    }
}

impl<D: TableDefinition> std::fmt::Debug for TableGateway<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableGateway")
            .field("table_name", &self.table_name)
            .field("suffix", &self.suffix)
            .field("schema", &self.schema)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
