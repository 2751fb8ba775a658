//! Window operator.

use std::cmp::Ordering;
use std::sync::Arc;

use flint_common::{FlintError, FlintResult};

use super::{BoxedOperator, Operator, RowBuffer};
use crate::executor::{
    compare_sort_keys, evaluate_expr, evaluate_sort_keys, Accumulator, Row, Value,
};
use crate::physical::{
    ExecutionContext, PhysicalExpr, PhysicalSortExpr, PhysicalWindowExpr, WindowFunc,
};
use crate::schema::SchemaRef;
use crate::types::DataType;

/// A buffered input row with its evaluated partition and order keys.
#[derive(Debug)]
struct KeyedRow {
    partition: Vec<Value>,
    order: Vec<Value>,
    row: Row,
}

/// Window operator.
///
/// Materializes the input, sorts it by partition keys and then by the
/// window ordering (stable, so input order breaks ties) and appends one
/// column per window expression. Aggregates see the whole partition when
/// there is no ordering, otherwise every row up to and including the
/// current row's peers.
#[derive(Debug)]
pub struct WindowExec {
    /// Child operator.
    child: BoxedOperator,
    partition_by: Vec<PhysicalExpr>,
    order_by: Vec<PhysicalSortExpr>,
    window_exprs: Vec<PhysicalWindowExpr>,
    /// Output schema.
    schema: SchemaRef,
    results: RowBuffer,
    ctx: Arc<ExecutionContext>,
}

impl WindowExec {
    /// Creates a new window operator.
    pub fn new(
        child: BoxedOperator,
        partition_by: Vec<PhysicalExpr>,
        order_by: Vec<PhysicalSortExpr>,
        window_exprs: Vec<PhysicalWindowExpr>,
        schema: SchemaRef,
        ctx: Arc<ExecutionContext>,
    ) -> Self {
        Self {
            child,
            partition_by,
            order_by,
            window_exprs,
            schema,
            results: RowBuffer::default(),
            ctx,
        }
    }

    fn compute(&mut self) -> FlintResult<Vec<Row>> {
        let mut keyed = Vec::new();
        while let Some(batch) = self.child.next_batch()? {
            for row in batch {
                let partition = self
                    .partition_by
                    .iter()
                    .map(|e| evaluate_expr(e, &row, &self.ctx))
                    .collect::<FlintResult<Vec<_>>>()?;
                let order = evaluate_sort_keys(&self.order_by, &row, &self.ctx)?;
                keyed.push(KeyedRow {
                    partition,
                    order,
                    row,
                });
            }
        }

        let order_by = &self.order_by;
        keyed.sort_by(|a, b| {
            a.partition
                .cmp(&b.partition)
                .then_with(|| compare_sort_keys(order_by, &a.order, &b.order))
        });

        let mut accumulators = self.window_accumulators()?;
        let mut output = Vec::with_capacity(keyed.len());
        let mut start = 0;
        while start < keyed.len() {
            let len = keyed[start..]
                .iter()
                .take_while(|k| k.partition == keyed[start].partition)
                .count();
            let partition = &keyed[start..start + len];
            let peer_ends = self.peer_ends(partition);

            let mut columns = Vec::with_capacity(self.window_exprs.len());
            for (window, acc) in self.window_exprs.iter().zip(accumulators.iter_mut()) {
                columns.push(self.evaluate_window(window, acc.as_mut(), partition, &peer_ends)?);
            }

            for (i, keyed_row) in partition.iter().enumerate() {
                let mut values = keyed_row.row.values().to_vec();
                values.extend(columns.iter().map(|column| column[i].clone()));
                output.push(Row::new(values));
            }
            start += len;
        }
        Ok(output)
    }

    /// One accumulator per aggregate window expression.
    fn window_accumulators(&self) -> FlintResult<Vec<Option<Accumulator>>> {
        let input_schema = self.child.schema();
        self.window_exprs
            .iter()
            .map(|window| match window.func {
                WindowFunc::Aggregate(func) => {
                    let arg_type = window
                        .args
                        .first()
                        .map(|arg| arg.data_type(&input_schema))
                        .unwrap_or(DataType::Null);
                    Accumulator::for_function(func, false, &arg_type, &self.ctx.settings).map(Some)
                }
                _ => Ok(None),
            })
            .collect()
    }

    /// For each row, the exclusive end of its peer group.
    fn peer_ends(&self, partition: &[KeyedRow]) -> Vec<usize> {
        let mut ends = vec![partition.len(); partition.len()];
        if self.order_by.is_empty() {
            return ends;
        }
        let mut group_start = 0;
        for i in 1..=partition.len() {
            let boundary = i == partition.len()
                || compare_sort_keys(&self.order_by, &partition[group_start].order, &partition[i].order)
                    != Ordering::Equal;
            if boundary {
                for end in &mut ends[group_start..i] {
                    *end = i;
                }
                group_start = i;
            }
        }
        ends
    }

    fn evaluate_window(
        &self,
        window: &PhysicalWindowExpr,
        acc: Option<&mut Accumulator>,
        partition: &[KeyedRow],
        peer_ends: &[usize],
    ) -> FlintResult<Vec<Value>> {
        match window.func {
            WindowFunc::RowNumber => (1..=partition.len()).map(ordinal).collect(),
            WindowFunc::Rank => {
                let mut ranks = Vec::with_capacity(partition.len());
                let mut rank = 1;
                for i in 0..partition.len() {
                    if i > 0 && peer_ends[i - 1] == i {
                        rank = i + 1;
                    }
                    ranks.push(ordinal(rank)?);
                }
                Ok(ranks)
            }
            WindowFunc::DenseRank => {
                let mut ranks = Vec::with_capacity(partition.len());
                let mut rank = 1;
                for i in 0..partition.len() {
                    if i > 0 && peer_ends[i - 1] == i {
                        rank += 1;
                    }
                    ranks.push(ordinal(rank)?);
                }
                Ok(ranks)
            }
            WindowFunc::Lag => self.offset_values(window, partition, -1),
            WindowFunc::Lead => self.offset_values(window, partition, 1),
            WindowFunc::Aggregate(_) => {
                let acc = acc.ok_or_else(|| FlintError::internal("window aggregate without accumulator"))?;
                self.running_aggregate(window, acc, partition, peer_ends)
            }
        }
    }

    /// `lag`/`lead`: the argument evaluated `offset` rows away, or the default.
    fn offset_values(
        &self,
        window: &PhysicalWindowExpr,
        partition: &[KeyedRow],
        direction: i64,
    ) -> FlintResult<Vec<Value>> {
        let expr = window.args.first().ok_or_else(|| {
            FlintError::malformed(format!("{} requires an argument", window.func))
        })?;

        let mut values = Vec::with_capacity(partition.len());
        for (i, current) in partition.iter().enumerate() {
            let offset = match window.args.get(1) {
                Some(offset) => evaluate_expr(offset, &current.row, &self.ctx)?
                    .to_i64()
                    .ok_or_else(|| {
                        FlintError::invalid_argument(format!(
                            "{} offset must be an integer",
                            window.func
                        ))
                    })?,
                None => 1,
            };
            let target = i64::try_from(i)
                .ok()
                .and_then(|i| offset.checked_mul(direction).and_then(|d| i.checked_add(d)))
                .and_then(|t| usize::try_from(t).ok())
                .filter(|&t| t < partition.len());

            values.push(match (target, window.args.get(2)) {
                (Some(t), _) => evaluate_expr(expr, &partition[t].row, &self.ctx)?,
                (None, Some(default)) => evaluate_expr(default, &current.row, &self.ctx)?,
                (None, None) => Value::Null,
            });
        }
        Ok(values)
    }

    fn running_aggregate(
        &self,
        window: &PhysicalWindowExpr,
        acc: &mut Accumulator,
        partition: &[KeyedRow],
        peer_ends: &[usize],
    ) -> FlintResult<Vec<Value>> {
        acc.reset()?;
        let mut values = Vec::with_capacity(partition.len());
        let mut consumed = 0;
        for &end in peer_ends {
            while consumed < end {
                let args = window
                    .args
                    .iter()
                    .map(|e| evaluate_expr(e, &partition[consumed].row, &self.ctx))
                    .collect::<FlintResult<Vec<_>>>()?;
                acc.update(&args)?;
                consumed += 1;
            }
            values.push(acc.result());
        }
        Ok(values)
    }
}

fn ordinal(n: usize) -> FlintResult<Value> {
    i32::try_from(n)
        .map(Value::Int)
        .map_err(|_| FlintError::invalid_argument("window partition too large"))
}

impl Operator for WindowExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        if !self.results.is_loaded() {
            let rows = self.compute()?;
            self.results.load(rows);
        }
        Ok(self.results.next_batch(self.ctx.batch_size()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{people, render, scan, small_batch_ctx};
    use super::*;
    use crate::physical::{AggregateFunc, PhysicalOperator, ScanOperator, WindowPhysicalOperator};

    fn window(
        partition_by: Vec<PhysicalExpr>,
        order_by: Vec<PhysicalSortExpr>,
        window_exprs: Vec<PhysicalWindowExpr>,
    ) -> WindowExec {
        let ctx = small_batch_ctx();
        let input = Arc::new(PhysicalOperator::Scan(ScanOperator::new(
            "people",
            people().schema().as_ref().clone(),
        )));
        let plan = WindowPhysicalOperator::new(
            input,
            partition_by.clone(),
            order_by.clone(),
            window_exprs.clone(),
        );
        WindowExec::new(
            scan(people(), &ctx),
            partition_by,
            order_by,
            window_exprs,
            plan.schema,
            ctx,
        )
    }

    #[test]
    fn test_row_number_and_ranks() {
        let op = window(
            vec![],
            vec![PhysicalSortExpr::asc(PhysicalExpr::column("age", 1))],
            vec![
                PhysicalWindowExpr::new(WindowFunc::RowNumber, vec![], "rn"),
                PhysicalWindowExpr::new(WindowFunc::Rank, vec![], "rank"),
                PhysicalWindowExpr::new(WindowFunc::DenseRank, vec![], "dense"),
            ],
        );
        assert_eq!(
            render(Box::new(op)),
            "[a,2,0,1,1,1],[bbb,2,1,2,1,1],[c,3,0,3,3,2],[ddd,4,1,4,4,3],[e,5,1,5,5,4]"
        );
    }

    #[test]
    fn test_partitioned_lag_lead() {
        let op = window(
            vec![PhysicalExpr::column("sex", 2)],
            vec![PhysicalSortExpr::desc(PhysicalExpr::column("age", 1))],
            vec![
                PhysicalWindowExpr::new(
                    WindowFunc::Lag,
                    vec![PhysicalExpr::column("name", 0)],
                    "prev",
                ),
                PhysicalWindowExpr::new(
                    WindowFunc::Lead,
                    vec![
                        PhysicalExpr::column("age", 1),
                        PhysicalExpr::lit_i64(2),
                        PhysicalExpr::lit_i64(-1),
                    ],
                    "next2",
                ),
            ],
        );
        assert_eq!(
            render(Box::new(op)),
            "[c,3,0,null,-1],[a,2,0,c,-1],[e,5,1,null,2],[ddd,4,1,e,-1],[bbb,2,1,ddd,-1]"
        );
    }

    #[test]
    fn test_aggregate_frames() {
        let op = window(
            vec![PhysicalExpr::column("sex", 2)],
            vec![],
            vec![PhysicalWindowExpr::new(
                WindowFunc::Aggregate(AggregateFunc::Sum),
                vec![PhysicalExpr::column("age", 1)],
                "total",
            )],
        );
        assert_eq!(
            render(Box::new(op)),
            "[a,2,0,5],[c,3,0,5],[bbb,2,1,11],[ddd,4,1,11],[e,5,1,11]"
        );

        // Running sum includes peers of the current row
        let op = window(
            vec![],
            vec![PhysicalSortExpr::asc(PhysicalExpr::column("age", 1))],
            vec![PhysicalWindowExpr::new(
                WindowFunc::Aggregate(AggregateFunc::Sum),
                vec![PhysicalExpr::column("age", 1)],
                "running",
            )],
        );
        assert_eq!(
            render(Box::new(op)),
            "[a,2,0,4],[bbb,2,1,4],[c,3,0,7],[ddd,4,1,11],[e,5,1,16]"
        );
    }

    #[test]
    fn test_lag_without_argument_fails() {
        let mut op = window(
            vec![],
            vec![],
            vec![PhysicalWindowExpr::new(WindowFunc::Lag, vec![], "prev")],
        );
        assert!(matches!(
            op.next_batch(),
            Err(FlintError::MalformedPlan { .. })
        ));
    }
}
