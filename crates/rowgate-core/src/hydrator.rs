//! Row hydration
//!
//! Writes raw column data (as returned by storage) into a record: the
//! identity, the snapshot behind `to_fields()`, and whichever typed slots
//! the record declares. Slot lookup is exact name first, then the camelCase
//! form of a snake_case column (`is_best_beatle` fills `isBestBeatle`).

use std::collections::HashMap;
use std::sync::Arc;

use convert_case::{Case, Casing};

use crate::errors::{GatewayError, Result};
use crate::row::{Fields, Record, SlotSetter, ID_COLUMN};
use crate::schema::ColumnTypes;
use crate::value::Value;

pub struct Hydrator<R: Record> {
    column_types: Arc<ColumnTypes>,
    slots: HashMap<&'static str, SlotSetter<R>>,
}

impl<R: Record> Hydrator<R> {
    pub fn new(column_types: Arc<ColumnTypes>) -> Self {
        let slots = R::slots()
            .into_iter()
            .map(|slot| (slot.name(), slot.setter()))
            .collect();

        Self {
            column_types,
            slots,
        }
    }

    pub fn column_types(&self) -> &ColumnTypes {
        &self.column_types
    }

    /// Replace `record`'s state with `raw`
    ///
    /// A missing or NULL `id` expires the record. With `convert_values`
    /// each value with a declared column type is converted to that type's
    /// native form before it is stored.
    ///
    /// # Errors
    ///
    /// `ValueConversion` if `id` or a typed value cannot be converted. The
    /// record is left untouched in that case.
    pub fn hydrate(&self, record: &mut R, mut raw: Fields, convert_values: bool) -> Result<()> {
        let id = coerce_id(raw.remove(ID_COLUMN).unwrap_or_default())?;
        let values = if convert_values {
            self.to_native(raw)?
        } else {
            raw
        };

        record.row_mut().reset(id);
        for (column, value) in values {
            if let Some(set) = self.slot_for(&column) {
                set(record, &value);
            }
            record.row_mut().set_field(column, value);
        }

        Ok(())
    }

    /// A fresh record hydrated from `raw`, with value conversion
    ///
    /// # Errors
    ///
    /// Same as [`Hydrator::hydrate`].
    pub fn instantiate(&self, raw: Fields) -> Result<R> {
        let mut record = R::default();
        self.hydrate(&mut record, raw, true)?;
        Ok(record)
    }

    /// `raw` with every declared column converted to its native form
    pub(crate) fn to_native(&self, raw: Fields) -> Result<Fields> {
        raw.into_iter()
            .map(|(column, value)| match self.column_types.get(&column) {
                Some(column_type) => {
                    let value = column_type.to_native(&column, value)?;
                    Ok((column, value))
                }
                None => Ok((column, value)),
            })
            .collect()
    }

    fn slot_for(&self, column: &str) -> Option<SlotSetter<R>> {
        if let Some(set) = self.slots.get(column) {
            return Some(*set);
        }
        if column.contains('_') {
            return self.slots.get(column.to_case(Case::Camel).as_str()).copied();
        }
        None
    }
}

impl<R: Record> std::fmt::Debug for Hydrator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut slots: Vec<&str> = self.slots.keys().copied().collect();
        slots.sort_unstable();
        f.debug_struct("Hydrator")
            .field("column_types", &self.column_types)
            .field("slots", &slots)
            .finish()
    }
}

/// Identity as an integer; NULL means "no identity"
pub(crate) fn coerce_id(value: Value) -> Result<i64> {
    match value {
        Value::Null => Ok(0),
        Value::Integer(id) => Ok(id),
        Value::Boolean(b) => Ok(i64::from(b)),
        Value::Real(f) => Ok(f.trunc() as i64),
        Value::Text(s) => s.trim().parse::<i64>().map_err(|_| id_conversion(format!(
            "'{}' is not an integer",
            s
        ))),
        Value::Blob(_) => Err(id_conversion("unexpected blob value".to_string())),
    }
}

fn id_conversion(reason: String) -> GatewayError {
    GatewayError::ValueConversion {
        column: ID_COLUMN.to_string(),
        column_type: "integer".to_string(),
        reason,
    }
}
