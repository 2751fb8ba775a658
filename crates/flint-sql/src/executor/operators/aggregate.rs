//! Hash aggregate operator.

use std::collections::HashMap;
use std::sync::Arc;

use flint_common::FlintResult;

use super::{BoxedOperator, Operator, RowBuffer};
use crate::executor::{evaluate_expr, evaluate_predicate, Accumulator, Row, Value};
use crate::physical::{ExecutionContext, PhysicalAggregateExpr, PhysicalExpr};
use crate::schema::SchemaRef;

/// Hash aggregate operator for grouping and aggregation.
///
/// Null group keys form one group. Groups are emitted in the order their
/// first row arrived.
#[derive(Debug)]
pub struct HashAggregateExec {
    /// Child operator.
    child: BoxedOperator,
    /// Group by expressions.
    group_by: Vec<PhysicalExpr>,
    /// Aggregate expressions.
    aggregates: Vec<PhysicalAggregateExpr>,
    /// Output schema.
    schema: SchemaRef,
    /// Aggregated output.
    results: RowBuffer,
    ctx: Arc<ExecutionContext>,
}

/// Groups in arrival order plus an index by key.
#[derive(Debug, Default)]
struct GroupTable {
    index: HashMap<Vec<Value>, usize>,
    groups: Vec<(Vec<Value>, Vec<Accumulator>)>,
}

impl HashAggregateExec {
    /// Creates a new hash aggregate operator.
    pub fn new(
        child: BoxedOperator,
        group_by: Vec<PhysicalExpr>,
        aggregates: Vec<PhysicalAggregateExpr>,
        schema: SchemaRef,
        ctx: Arc<ExecutionContext>,
    ) -> Self {
        Self {
            child,
            group_by,
            aggregates,
            schema,
            results: RowBuffer::default(),
            ctx,
        }
    }

    fn new_accumulators(&self) -> FlintResult<Vec<Accumulator>> {
        let input_schema = self.child.schema();
        self.aggregates
            .iter()
            .map(|agg| Accumulator::try_new(agg, &input_schema, &self.ctx.settings))
            .collect()
    }

    fn aggregate(&mut self) -> FlintResult<Vec<Row>> {
        let mut table = GroupTable::default();

        while let Some(batch) = self.child.next_batch()? {
            for row in &batch {
                let key = self
                    .group_by
                    .iter()
                    .map(|e| evaluate_expr(e, row, &self.ctx))
                    .collect::<FlintResult<Vec<_>>>()?;

                let slot = match table.index.get(&key) {
                    Some(&slot) => slot,
                    None => {
                        let slot = table.groups.len();
                        table.groups.push((key.clone(), self.new_accumulators()?));
                        table.index.insert(key, slot);
                        slot
                    }
                };
                let accumulators = &mut table.groups[slot].1;

                for (agg, acc) in self.aggregates.iter().zip(accumulators.iter_mut()) {
                    if let Some(filter) = &agg.filter {
                        if !evaluate_predicate(filter, row, &self.ctx)? {
                            continue;
                        }
                    }
                    let args = agg
                        .args
                        .iter()
                        .map(|e| evaluate_expr(e, row, &self.ctx))
                        .collect::<FlintResult<Vec<_>>>()?;
                    acc.update(&args)?;
                }
            }
        }

        // A global aggregate over empty input still yields one row
        if table.groups.is_empty() && self.group_by.is_empty() {
            table.groups.push((Vec::new(), self.new_accumulators()?));
        }

        Ok(table
            .groups
            .into_iter()
            .map(|(key, accumulators)| {
                let mut values = key;
                values.extend(accumulators.into_iter().map(|mut acc| acc.result()));
                Row::new(values)
            })
            .collect())
    }
}

impl Operator for HashAggregateExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        if !self.results.is_loaded() {
            let rows = self.aggregate()?;
            self.results.load(rows);
        }
        Ok(self.results.next_batch(self.ctx.batch_size()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{people, render, scan, small_batch_ctx};
    use super::*;
    use crate::physical::{AggregateFunc, BinaryOp};
    use crate::schema::{Field, Schema};
    use crate::table::Table;
    use crate::types::DataType;

    fn count_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::nullable("sex", DataType::Int),
            Field::not_null("count", DataType::BigInt),
        ]))
    }

    #[test]
    fn test_group_by_count() {
        let ctx = small_batch_ctx();
        let agg = HashAggregateExec::new(
            scan(people(), &ctx),
            vec![PhysicalExpr::column("sex", 2)],
            vec![PhysicalAggregateExpr::count_star("count")],
            count_schema(),
            ctx,
        );
        assert_eq!(render(Box::new(agg)), "[0,2],[1,3]");
    }

    #[test]
    fn test_aggregate_filter_and_distinct() {
        let ctx = small_batch_ctx();
        let adults = PhysicalExpr::binary(
            PhysicalExpr::column("age", 1),
            BinaryOp::Gt,
            PhysicalExpr::lit_i64(2),
        );
        let schema = Arc::new(Schema::new(vec![
            Field::not_null("older", DataType::BigInt),
            Field::not_null("ages", DataType::BigInt),
            Field::nullable("total", DataType::BigInt),
        ]));
        let agg = HashAggregateExec::new(
            scan(people(), &ctx),
            vec![],
            vec![
                PhysicalAggregateExpr::count_star("older").with_filter(adults),
                PhysicalAggregateExpr::new(
                    AggregateFunc::Count,
                    vec![PhysicalExpr::column("age", 1)],
                    true,
                    "ages",
                ),
                PhysicalAggregateExpr::new(
                    AggregateFunc::Sum,
                    vec![PhysicalExpr::column("age", 1)],
                    false,
                    "total",
                ),
            ],
            schema,
            ctx,
        );
        assert_eq!(render(Box::new(agg)), "[3,4,16]");
    }

    #[test]
    fn test_global_aggregate_on_empty_input() {
        let ctx = small_batch_ctx();
        let empty = Table::empty(people().schema().clone());
        let schema = Arc::new(Schema::new(vec![
            Field::not_null("count", DataType::BigInt),
            Field::nullable("max", DataType::Int),
        ]));
        let agg = HashAggregateExec::new(
            scan(empty, &ctx),
            vec![],
            vec![
                PhysicalAggregateExpr::count_star("count"),
                PhysicalAggregateExpr::new(
                    AggregateFunc::Max,
                    vec![PhysicalExpr::column("age", 1)],
                    false,
                    "max",
                ),
            ],
            schema,
            ctx,
        );
        assert_eq!(render(Box::new(agg)), "[0,null]");
    }

    #[test]
    fn test_grouped_aggregate_on_empty_input() {
        let ctx = small_batch_ctx();
        let empty = Table::empty(people().schema().clone());
        let agg = HashAggregateExec::new(
            scan(empty, &ctx),
            vec![PhysicalExpr::column("sex", 2)],
            vec![PhysicalAggregateExpr::count_star("count")],
            count_schema(),
            ctx,
        );
        assert_eq!(render(Box::new(agg)), "");
    }

    #[test]
    fn test_approx_count_distinct() {
        let ctx = small_batch_ctx();
        let schema = Arc::new(Schema::new(vec![Field::not_null(
            "approx",
            DataType::BigInt,
        )]));
        let agg = HashAggregateExec::new(
            scan(people(), &ctx),
            vec![],
            vec![PhysicalAggregateExpr::new(
                AggregateFunc::ApproxCountDistinct,
                vec![PhysicalExpr::column("age", 1)],
                false,
                "approx",
            )],
            schema,
            ctx,
        );
        assert_eq!(render(Box::new(agg)), "[4]");
    }
}
