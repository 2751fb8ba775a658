//! Operator execution implementations.
//!
//! Executable operators consume and produce batches of rows in a
//! pull-based iterator model. Blocking operators (sort, aggregate, join
//! build side, window) materialize their input on the first pull and then
//! hand out batches from a `RowBuffer`.

mod aggregate;
mod expand;
mod generate;
mod join;
mod projection;
mod scan;
mod sort;
mod union;
mod window;

use std::fmt;

use flint_common::FlintResult;

use super::Row;
use crate::schema::SchemaRef;

pub use aggregate::HashAggregateExec;
pub use expand::ExpandExec;
pub use generate::GenerateExec;
pub use join::{HashJoinExec, NestedLoopJoinExec};
pub use projection::{FilterExec, ProjectionExec};
pub use scan::{ScanExec, ValuesExec};
pub use sort::{LimitExec, SortExec, TakeOrderedAndProjectExec};
pub use union::UnionExec;
pub use window::WindowExec;

/// Trait for executable operators.
pub trait Operator: fmt::Debug {
    /// Returns the output schema.
    fn schema(&self) -> SchemaRef;

    /// Returns the next batch of rows, or None if exhausted.
    ///
    /// Returned batches are never empty.
    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>>;
}

/// Boxed executable operator.
pub type BoxedOperator = Box<dyn Operator>;

/// Pulls every remaining row out of an operator.
pub fn collect_rows(op: &mut dyn Operator) -> FlintResult<Vec<Row>> {
    let mut rows = Vec::new();
    while let Some(batch) = op.next_batch()? {
        rows.extend(batch);
    }
    Ok(rows)
}

/// Materialized output handed out in batches.
#[derive(Debug, Default)]
pub(crate) struct RowBuffer {
    rows: Option<std::vec::IntoIter<Row>>,
}

impl RowBuffer {
    /// Returns true once rows have been loaded.
    pub(crate) fn is_loaded(&self) -> bool {
        self.rows.is_some()
    }

    /// Loads the rows to emit.
    pub(crate) fn load(&mut self, rows: Vec<Row>) {
        self.rows = Some(rows.into_iter());
    }

    /// Returns the next batch of up to `batch_size` rows.
    pub(crate) fn next_batch(&mut self, batch_size: usize) -> Option<Vec<Row>> {
        let rows = self.rows.as_mut()?;
        let batch: Vec<Row> = rows.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[test]
    fn test_row_buffer() {
        let mut buffer = RowBuffer::default();
        assert!(!buffer.is_loaded());
        assert!(buffer.next_batch(2).is_none());

        buffer.load(vec![row![1], row![2], row![3]]);
        assert!(buffer.is_loaded());
        assert_eq!(buffer.next_batch(2).map(|b| b.len()), Some(2));
        assert_eq!(buffer.next_batch(2).map(|b| b.len()), Some(1));
        assert!(buffer.next_batch(2).is_none());
    }
}
