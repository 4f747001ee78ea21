use crate::naming::short_type_name;
use crate::row::{Fields, Record};
use crate::schema::Column;

/// Static description of a table a gateway manages
///
/// The `id` primary key is implied; `columns` lists the rest in declaration
/// order. The table name is inferred from [`TableDefinition::type_name`]
/// unless the gateway is opened with an explicit name.
///
/// ```
/// use rowgate_core::fields;
/// use rowgate_core::gateway::TableDefinition;
/// use rowgate_core::row::{Fields, Row};
/// use rowgate_core::schema::Column;
/// use rowgate_core::value::ColumnType;
///
/// struct BeatlesMembersTable;
///
/// impl TableDefinition for BeatlesMembersTable {
///     type Record = Row;
///
///     fn columns() -> Vec<Column> {
///         vec![
///             Column::new("name", ColumnType::String),
///             Column::new("is_best_beatle", ColumnType::Boolean).default_value(false),
///         ]
///     }
///
///     fn seed_rows() -> Vec<Fields> {
///         vec![fields! { "name" => "John Lennon", "is_best_beatle" => true }]
///     }
/// }
///
/// assert_eq!(BeatlesMembersTable::type_name(), "BeatlesMembersTable");
/// ```
pub trait TableDefinition: 'static {
    /// Record type produced by the gateway
    type Record: Record;

    fn columns() -> Vec<Column>;

    /// Rows inserted, in order, right after the table is created
    fn seed_rows() -> Vec<Fields> {
        Vec::new()
    }

    fn type_name() -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}
