//! Ordering operators: sort, limit and top-K.

use std::sync::Arc;

use flint_common::FlintResult;

use super::{BoxedOperator, Operator, RowBuffer};
use crate::executor::{compare_sort_keys, evaluate_row, evaluate_sort_keys, Row, Value};
use crate::physical::{ExecutionContext, PhysicalExpr, PhysicalSortExpr};
use crate::schema::SchemaRef;

/// Rows paired with their evaluated sort keys.
type Keyed = Vec<(Vec<Value>, Row)>;

fn sort_keyed(order_by: &[PhysicalSortExpr], rows: &mut Keyed) {
    // `sort_by` is stable: equal keys keep arrival order
    rows.sort_by(|a, b| compare_sort_keys(order_by, &a.0, &b.0));
}

/// Sort operator for ordering results.
#[derive(Debug)]
pub struct SortExec {
    /// Child operator.
    child: BoxedOperator,
    /// Sort expressions.
    order_by: Vec<PhysicalSortExpr>,
    /// Buffered and sorted rows.
    sorted: RowBuffer,
    ctx: Arc<ExecutionContext>,
}

impl SortExec {
    /// Creates a new sort operator.
    pub fn new(
        child: BoxedOperator,
        order_by: Vec<PhysicalSortExpr>,
        ctx: Arc<ExecutionContext>,
    ) -> Self {
        Self {
            child,
            order_by,
            sorted: RowBuffer::default(),
            ctx,
        }
    }

    fn sort(&mut self) -> FlintResult<Vec<Row>> {
        let mut keyed: Keyed = Vec::new();
        while let Some(batch) = self.child.next_batch()? {
            for row in batch {
                keyed.push((evaluate_sort_keys(&self.order_by, &row, &self.ctx)?, row));
            }
        }
        sort_keyed(&self.order_by, &mut keyed);
        Ok(keyed.into_iter().map(|(_, row)| row).collect())
    }
}

impl Operator for SortExec {
    fn schema(&self) -> SchemaRef {
        self.child.schema()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        if !self.sorted.is_loaded() {
            let rows = self.sort()?;
            self.sorted.load(rows);
        }
        Ok(self.sorted.next_batch(self.ctx.batch_size()))
    }
}

/// Limit operator that skips `offset` rows and then returns at most
/// `fetch` rows.
#[derive(Debug)]
pub struct LimitExec {
    /// Child operator.
    child: BoxedOperator,
    /// Rows to skip.
    offset: usize,
    /// Maximum rows to return.
    fetch: Option<usize>,
    /// Rows skipped so far.
    skipped: usize,
    /// Rows returned so far.
    returned: usize,
}

impl LimitExec {
    /// Creates a new limit operator.
    pub fn new(child: BoxedOperator, offset: usize, fetch: Option<usize>) -> Self {
        Self {
            child,
            offset,
            fetch,
            skipped: 0,
            returned: 0,
        }
    }

    fn exhausted(&self) -> bool {
        self.fetch.is_some_and(|fetch| self.returned >= fetch)
    }
}

impl Operator for LimitExec {
    fn schema(&self) -> SchemaRef {
        self.child.schema()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        while !self.exhausted() {
            let Some(batch) = self.child.next_batch()? else {
                return Ok(None);
            };

            let skip = (self.offset - self.skipped).min(batch.len());
            self.skipped += skip;

            let available = batch.len() - skip;
            let take = match self.fetch {
                Some(fetch) => available.min(fetch - self.returned),
                None => available,
            };
            if take == 0 {
                continue;
            }
            self.returned += take;
            return Ok(Some(batch.into_iter().skip(skip).take(take).collect()));
        }
        Ok(None)
    }
}

/// Top-K selection followed by an optional projection.
///
/// Keeps a buffer of candidate rows that is sorted and truncated to `limit`
/// whenever it grows past twice the limit, so the output equals a full
/// stable sort followed by truncation.
#[derive(Debug)]
pub struct TakeOrderedAndProjectExec {
    /// Child operator.
    child: BoxedOperator,
    /// Number of rows to keep.
    limit: usize,
    /// Sort expressions.
    order_by: Vec<PhysicalSortExpr>,
    /// Projection applied to the kept rows.
    projection: Option<Vec<PhysicalExpr>>,
    /// Output schema.
    schema: SchemaRef,
    top_rows: RowBuffer,
    ctx: Arc<ExecutionContext>,
}

impl TakeOrderedAndProjectExec {
    /// Creates a new top-K operator.
    pub fn new(
        child: BoxedOperator,
        limit: usize,
        order_by: Vec<PhysicalSortExpr>,
        projection: Option<Vec<PhysicalExpr>>,
        schema: SchemaRef,
        ctx: Arc<ExecutionContext>,
    ) -> Self {
        Self {
            child,
            limit,
            order_by,
            projection,
            schema,
            top_rows: RowBuffer::default(),
            ctx,
        }
    }

    fn collect_top(&mut self) -> FlintResult<Vec<Row>> {
        let mut buffer: Keyed = Vec::new();
        let threshold = self.limit.saturating_mul(2);

        while let Some(batch) = self.child.next_batch()? {
            for row in batch {
                buffer.push((evaluate_sort_keys(&self.order_by, &row, &self.ctx)?, row));
                if buffer.len() > threshold {
                    // Earlier arrivals stay ahead of later ties across trims
                    sort_keyed(&self.order_by, &mut buffer);
                    buffer.truncate(self.limit);
                }
            }
        }

        sort_keyed(&self.order_by, &mut buffer);
        buffer.truncate(self.limit);

        buffer
            .into_iter()
            .map(|(_, row)| match &self.projection {
                Some(exprs) => evaluate_row(exprs, &row, &self.ctx),
                None => Ok(row),
            })
            .collect()
    }
}

impl Operator for TakeOrderedAndProjectExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        if !self.top_rows.is_loaded() {
            let rows = self.collect_top()?;
            self.top_rows.load(rows);
        }
        Ok(self.top_rows.next_batch(self.ctx.batch_size()))
    }
}
