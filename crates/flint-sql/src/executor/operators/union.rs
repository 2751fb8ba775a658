//! Union operator.

use std::collections::HashSet;

use flint_common::{FlintError, FlintResult};

use super::{BoxedOperator, Operator};
use crate::executor::Row;
use crate::schema::SchemaRef;

/// Concatenates two inputs, optionally removing duplicate rows.
///
/// Deduplication keeps the first occurrence, so output order is the order
/// in which distinct rows first appear across left then right.
#[derive(Debug)]
pub struct UnionExec {
    left: BoxedOperator,
    right: BoxedOperator,
    /// Keep duplicates.
    all: bool,
    schema: SchemaRef,
    /// Rows already emitted, when deduplicating.
    seen: HashSet<Row>,
    left_done: bool,
}

impl UnionExec {
    /// Creates a new union operator.
    pub fn try_new(
        left: BoxedOperator,
        right: BoxedOperator,
        all: bool,
        schema: SchemaRef,
    ) -> FlintResult<Self> {
        let (lw, rw) = (left.schema().len(), right.schema().len());
        if lw != rw {
            return Err(FlintError::malformed(format!(
                "union inputs have {} and {} columns",
                lw, rw
            )));
        }
        Ok(Self {
            left,
            right,
            all,
            schema,
            seen: HashSet::new(),
            left_done: false,
        })
    }

    fn dedup(&mut self, batch: Vec<Row>) -> Vec<Row> {
        if self.all {
            return batch;
        }
        batch
            .into_iter()
            .filter(|row| self.seen.insert(row.clone()))
            .collect()
    }
}

impl Operator for UnionExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        loop {
            let batch = if self.left_done {
                self.right.next_batch()?
            } else {
                match self.left.next_batch()? {
                    Some(batch) => Some(batch),
                    None => {
                        self.left_done = true;
                        continue;
                    }
                }
            };

            match batch {
                Some(batch) => {
                    let batch = self.dedup(batch);
                    if !batch.is_empty() {
                        return Ok(Some(batch));
                    }
                }
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{people, people2, render, scan, small_batch_ctx};
    use super::super::ScanExec;
    use super::*;

    #[test]
    fn test_union_dedups_first_occurrence() {
        let ctx = small_batch_ctx();
        let union = UnionExec::try_new(
            scan(people(), &ctx),
            scan(people2(), &ctx),
            false,
            people().schema().clone(),
        )
        .unwrap();
        assert_eq!(
            render(Box::new(union)),
            "[a,2,0],[bbb,2,1],[c,3,0],[ddd,4,1],[e,5,1],[fff,6,1],[null,7,0]"
        );
    }

    #[test]
    fn test_union_all_keeps_duplicates() {
        let ctx = small_batch_ctx();
        let union = UnionExec::try_new(
            scan(people(), &ctx),
            scan(people(), &ctx),
            true,
            people().schema().clone(),
        )
        .unwrap();
        let rendered = render(Box::new(union));
        assert_eq!(rendered.matches("[a,2,0]").count(), 2);
        assert_eq!(rendered.matches("],[").count(), 9);
    }

    #[test]
    fn test_union_dedups_within_one_side() {
        let ctx = small_batch_ctx();
        let union = UnionExec::try_new(
            scan(people(), &ctx),
            scan(people(), &ctx),
            false,
            people().schema().clone(),
        )
        .unwrap();
        assert_eq!(
            render(Box::new(union)),
            "[a,2,0],[bbb,2,1],[c,3,0],[ddd,4,1],[e,5,1]"
        );
    }

    #[test]
    fn test_union_width_mismatch() {
        let ctx = small_batch_ctx();
        let narrow = ScanExec::new(people(), ctx.clone()).with_projection(vec![0]);
        let result = UnionExec::try_new(
            scan(people(), &ctx),
            Box::new(narrow),
            true,
            people().schema().clone(),
        );
        assert!(matches!(result, Err(FlintError::MalformedPlan { .. })));
    }
}
