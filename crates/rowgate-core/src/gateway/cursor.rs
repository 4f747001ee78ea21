use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::errors::Result;
use crate::hydrator::coerce_id;
use crate::row::{Fields, ID_COLUMN};
use crate::statement::Condition;

use super::definition::TableDefinition;
use super::table::TableGateway;

/// Lazy, id-ordered sequence of records
///
/// Rows are fetched one page at a time (`id > last seen`, ascending, at most
/// `page_size` rows), so no statement stays open between pages and the
/// gateway can be used for writes mid-iteration. Rows inserted ahead of the
/// cursor during iteration are yielded; rows behind it are not.
///
/// A failure is yielded once as `Err`; the iterator is exhausted after it.
pub struct RowIter<'g, D: TableDefinition> {
    gateway: &'g TableGateway<D>,
    filter: Option<Condition>,
    last_id: i64,
    buffer: VecDeque<Fields>,
    exhausted: bool,
}

impl<'g, D: TableDefinition> RowIter<'g, D> {
    pub(crate) fn new(gateway: &'g TableGateway<D>, filter: Option<Condition>) -> Self {
        Self {
            gateway,
            filter,
            last_id: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fill(&mut self) -> Result<()> {
        let page_size = self.gateway.page_size();
        let page = self
            .gateway
            .fetch_page(self.filter.as_ref(), self.last_id, page_size)?;

        tracing::debug!(
            table = self.gateway.table_name(),
            after_id = self.last_id,
            row_count = page.len(),
            "fetched page"
        );

        if page.len() < page_size {
            self.exhausted = true;
        }
        self.buffer.extend(page);
        Ok(())
    }

    fn next_record(&mut self) -> Option<Result<D::Record>> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(err) = self.fill() {
                return Some(Err(err));
            }
        }

        let raw = self.buffer.pop_front()?;
        let id = match coerce_id(raw.get(ID_COLUMN).cloned().unwrap_or_default()) {
            Ok(id) => id,
            Err(err) => return Some(Err(err)),
        };
        self.last_id = self.last_id.max(id);

        Some(self.gateway.hydrator().instantiate(raw))
    }
}

impl<D: TableDefinition> Iterator for RowIter<'_, D> {
    type Item = Result<D::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.next_record();
        if matches!(item, Some(Err(_))) {
            self.exhausted = true;
            self.buffer.clear();
        }
        item
    }
}

impl<D: TableDefinition> FusedIterator for RowIter<'_, D> {}

impl<D: TableDefinition> std::fmt::Debug for RowIter<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowIter")
            .field("table", &self.gateway.table_name())
            .field("filter", &self.filter)
            .field("last_id", &self.last_id)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
