use crate::errors::Result;
use crate::row::Record;

/// Row addressed by `update` and `delete`
///
/// Passing a record (rather than its id) lets the gateway keep it in sync:
/// it is re-hydrated after an update and expired after a delete.
#[derive(Debug)]
pub enum Target<'a, R> {
    Id(i64),
    Record(&'a mut R),
}

impl<R: Record> Target<'_, R> {
    /// Resolve the identity without touching storage
    ///
    /// # Errors
    ///
    /// `ExpiredRow` for an expired record.
    pub fn id(&self) -> Result<i64> {
        match self {
            Target::Id(id) => Ok(*id),
            Target::Record(record) => record.id(),
        }
    }
}

impl<R> From<i64> for Target<'_, R> {
    fn from(id: i64) -> Self {
        Target::Id(id)
    }
}

impl<R> From<i32> for Target<'_, R> {
    fn from(id: i32) -> Self {
        Target::Id(i64::from(id))
    }
}

impl<'a, R> From<&'a mut R> for Target<'a, R> {
    fn from(record: &'a mut R) -> Self {
        Target::Record(record)
    }
}
