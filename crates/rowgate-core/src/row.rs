//! Row objects
//!
//! A [`Row`] is the gateway's record of one persisted table row: an identity
//! plus a snapshot of the column values the gateway last confirmed. Typed
//! rows embed a `Row` and implement [`Record`], declaring which columns they
//! want written into their own fields.

use std::collections::BTreeMap;

use crate::errors::{GatewayError, Result};
use crate::value::Value;

/// Column name to value mapping, ordered by column name
pub type Fields = BTreeMap<String, Value>;

/// Name of the identity column every table carries
pub const ID_COLUMN: &str = "id";

/// Build a [`Fields`] map
///
/// ```
/// use rowgate_core::fields;
/// use rowgate_core::value::Value;
///
/// let fields = fields! { "name" => "Ringo Starr", "is_best_beatle" => false };
/// assert_eq!(fields["is_best_beatle"], Value::Boolean(false));
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::row::Fields::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::row::Fields::new();
        $(
            fields.insert(
                ::std::string::String::from($column),
                $crate::value::Value::from($value),
            );
        )+
        fields
    }};
}

/// One table row as last confirmed by the gateway
///
/// There is no public mutation: only hydration changes a row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    identity: Option<i64>,
    fields: Fields,
}

impl Row {
    /// The row's identity
    ///
    /// Fails with [`GatewayError::ExpiredRow`] if the row was deleted or
    /// never persisted.
    pub fn id(&self) -> Result<i64> {
        self.identity.ok_or(GatewayError::ExpiredRow)
    }

    pub fn is_expired(&self) -> bool {
        self.identity.is_none()
    }

    /// Snapshot of the last hydrated values, including `id`
    pub fn to_fields(&self) -> &Fields {
        &self.fields
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Start a new snapshot holding only the identity
    ///
    /// Identities below 1 expire the row.
    pub(crate) fn reset(&mut self, identity: i64) {
        self.identity = (identity > 0).then_some(identity);
        self.fields.clear();
        self.fields
            .insert(ID_COLUMN.to_string(), Value::Integer(identity));
    }

    pub(crate) fn set_field(&mut self, column: String, value: Value) {
        self.fields.insert(column, value);
    }
}

/// Setter writing one hydrated value into a typed row
pub type SlotSetter<R> = fn(&mut R, &Value);

/// A named, writable slot on a typed row
pub struct Slot<R> {
    name: &'static str,
    set: SlotSetter<R>,
}

impl<R> Slot<R> {
    pub fn new(name: &'static str, set: SlotSetter<R>) -> Self {
        Self { name, set }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn setter(&self) -> SlotSetter<R> {
        self.set
    }
}

impl<R> Clone for Slot<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Slot<R> {}

/// A row type the gateway can produce
///
/// Instances start from `Default` (an expired, empty row) and are filled in
/// by the hydrator. Columns are matched to [`Record::slots`] by exact name
/// first, then by the camelCase form of a snake_case column.
///
/// ```
/// use rowgate_core::row::{Record, Row, Slot};
///
/// #[derive(Default)]
/// struct Beatle {
///     row: Row,
///     name: String,
///     best: bool,
/// }
///
/// impl Record for Beatle {
///     fn row(&self) -> &Row {
///         &self.row
///     }
///
///     fn row_mut(&mut self) -> &mut Row {
///         &mut self.row
///     }
///
///     fn slots() -> Vec<Slot<Self>> {
///         vec![
///             Slot::new("name", |b: &mut Beatle, v| {
///                 b.name = v.as_str().unwrap_or_default().to_string()
///             }),
///             Slot::new("isBestBeatle", |b: &mut Beatle, v| {
///                 b.best = v.as_bool().unwrap_or_default()
///             }),
///         ]
///     }
/// }
/// ```
pub trait Record: Default {
    fn row(&self) -> &Row;

    fn row_mut(&mut self) -> &mut Row;

    /// Writable slots, consulted once when a hydrator is built
    fn slots() -> Vec<Slot<Self>> {
        Vec::new()
    }

    fn id(&self) -> Result<i64> {
        self.row().id()
    }

    fn to_fields(&self) -> &Fields {
        self.row().to_fields()
    }
}

impl Record for Row {
    fn row(&self) -> &Row {
        self
    }

    fn row_mut(&mut self) -> &mut Row {
        self
    }
}
