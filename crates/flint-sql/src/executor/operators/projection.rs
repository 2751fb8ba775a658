//! Row-wise operators: projection and filter.

use std::sync::Arc;

use flint_common::FlintResult;

use super::{BoxedOperator, Operator};
use crate::executor::{evaluate_predicate, evaluate_row, Row};
use crate::physical::{ExecutionContext, PhysicalExpr};
use crate::schema::SchemaRef;

/// Filter operator that keeps rows whose predicate is TRUE.
#[derive(Debug)]
pub struct FilterExec {
    /// Child operator.
    child: BoxedOperator,
    /// Filter predicate.
    predicate: PhysicalExpr,
    ctx: Arc<ExecutionContext>,
}

impl FilterExec {
    /// Creates a new filter operator.
    pub fn new(child: BoxedOperator, predicate: PhysicalExpr, ctx: Arc<ExecutionContext>) -> Self {
        Self {
            child,
            predicate,
            ctx,
        }
    }
}

impl Operator for FilterExec {
    fn schema(&self) -> SchemaRef {
        self.child.schema()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        while let Some(batch) = self.child.next_batch()? {
            let mut kept = Vec::with_capacity(batch.len());
            for row in batch {
                if evaluate_predicate(&self.predicate, &row, &self.ctx)? {
                    kept.push(row);
                }
            }
            if !kept.is_empty() {
                return Ok(Some(kept));
            }
        }
        Ok(None)
    }
}

/// Projection operator that computes one output column per expression.
#[derive(Debug)]
pub struct ProjectionExec {
    /// Child operator.
    child: BoxedOperator,
    /// Projection expressions.
    exprs: Vec<PhysicalExpr>,
    /// Output schema.
    schema: SchemaRef,
    ctx: Arc<ExecutionContext>,
}

impl ProjectionExec {
    /// Creates a new projection operator.
    pub fn new(
        child: BoxedOperator,
        exprs: Vec<PhysicalExpr>,
        schema: SchemaRef,
        ctx: Arc<ExecutionContext>,
    ) -> Self {
        Self {
            child,
            exprs,
            schema,
            ctx,
        }
    }
}

impl Operator for ProjectionExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        match self.child.next_batch()? {
            Some(batch) => batch
                .iter()
                .map(|row| evaluate_row(&self.exprs, row, &self.ctx))
                .collect::<FlintResult<Vec<_>>>()
                .map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{people, people2, render, scan, small_batch_ctx};
    use super::*;
    use crate::physical::BinaryOp;
    use crate::schema::{Field, Schema};
    use crate::types::DataType;

    #[test]
    fn test_filter_skips_empty_batches() {
        let ctx = small_batch_ctx();
        let predicate = PhysicalExpr::binary(
            PhysicalExpr::column("age", 1),
            BinaryOp::GtEq,
            PhysicalExpr::lit_i64(5),
        );
        let filter = FilterExec::new(scan(people(), &ctx), predicate, ctx);
        assert_eq!(render(Box::new(filter)), "[e,5,1]");
    }

    #[test]
    fn test_filter_drops_unknown() {
        let ctx = small_batch_ctx();
        let predicate = PhysicalExpr::binary(
            PhysicalExpr::column("name", 0),
            BinaryOp::NotEq,
            PhysicalExpr::lit_str("a"),
        );
        let filter = FilterExec::new(scan(people2(), &ctx), predicate, ctx);
        assert_eq!(render(Box::new(filter)), "[c,3,0],[ddd,4,1],[fff,6,1]");
    }

    #[test]
    fn test_projection() {
        let ctx = small_batch_ctx();
        let schema = Arc::new(Schema::new(vec![
            Field::nullable("sex", DataType::Int),
            Field::nullable("older", DataType::Int),
        ]));
        let exprs = vec![
            PhysicalExpr::column("sex", 2),
            PhysicalExpr::binary(
                PhysicalExpr::column("age", 1),
                BinaryOp::Plus,
                PhysicalExpr::lit_i64(10),
            ),
        ];
        let projection = ProjectionExec::new(scan(people(), &ctx), exprs, schema, ctx);
        assert_eq!(
            render(Box::new(projection)),
            "[0,12],[1,12],[0,13],[1,14],[1,15]"
        );
    }
}
