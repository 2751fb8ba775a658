//! Leaf operators: view scans and inline values.

use std::sync::Arc;

use flint_common::FlintResult;

use super::Operator;
use crate::executor::{evaluate_row, Row};
use crate::physical::{ExecutionContext, PhysicalExpr};
use crate::schema::SchemaRef;
use crate::table::Table;

/// Scan operator that streams the rows of a resolved view.
#[derive(Debug)]
pub struct ScanExec {
    /// Output schema.
    schema: SchemaRef,
    /// Data to scan.
    table: Table,
    /// Projection indices.
    projection: Option<Vec<usize>>,
    /// Next row to emit.
    position: usize,
    ctx: Arc<ExecutionContext>,
}

impl ScanExec {
    /// Creates a scan over every column of `table`.
    pub fn new(table: Table, ctx: Arc<ExecutionContext>) -> Self {
        Self {
            schema: table.schema().clone(),
            table,
            projection: None,
            position: 0,
            ctx,
        }
    }

    /// Creates a scan with projection.
    pub fn with_projection(mut self, indices: Vec<usize>) -> Self {
        self.schema = Arc::new(self.schema.project(&indices));
        self.projection = Some(indices);
        self
    }

    /// Replaces the output schema; the plan's names win over the view's.
    pub fn with_schema(mut self, schema: SchemaRef) -> Self {
        self.schema = schema;
        self
    }
}

impl Operator for ScanExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        let rows = self.table.data();
        if self.position >= rows.len() {
            return Ok(None);
        }

        let end = (self.position + self.ctx.batch_size()).min(rows.len());
        let slice = &rows[self.position..end];
        self.position = end;

        let batch = match &self.projection {
            Some(indices) => slice.iter().map(|row| row.project(indices)).collect(),
            None => slice.to_vec(),
        };
        Ok(Some(batch))
    }
}

/// Values operator (inline rows of expressions).
#[derive(Debug)]
pub struct ValuesExec {
    /// Output schema.
    schema: SchemaRef,
    /// Rows of expressions.
    values: Vec<Vec<PhysicalExpr>>,
    /// Whether the rows were emitted.
    done: bool,
    ctx: Arc<ExecutionContext>,
}

impl ValuesExec {
    /// Creates a new values operator.
    pub fn new(schema: SchemaRef, values: Vec<Vec<PhysicalExpr>>, ctx: Arc<ExecutionContext>) -> Self {
        Self {
            schema,
            values,
            done: false,
            ctx,
        }
    }
}

impl Operator for ValuesExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        if self.done || self.values.is_empty() {
            return Ok(None);
        }
        self.done = true;

        let empty = Row::empty();
        let rows = self
            .values
            .iter()
            .map(|exprs| evaluate_row(exprs, &empty, &self.ctx))
            .collect::<FlintResult<Vec<_>>>()?;
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{people, render, small_batch_ctx};
    use super::*;
    use crate::schema::{Field, Schema};
    use crate::types::DataType;

    #[test]
    fn test_scan_batches() {
        let ctx = small_batch_ctx();
        let mut scan = ScanExec::new(people(), ctx);
        let sizes: Vec<usize> = std::iter::from_fn(|| scan.next_batch().unwrap())
            .map(|b| b.len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_scan_projection() {
        let ctx = small_batch_ctx();
        let scan = ScanExec::new(people(), ctx).with_projection(vec![2, 0]);
        assert_eq!(scan.schema().names(), vec!["sex", "name"]);
        assert_eq!(
            render(Box::new(scan)),
            "[0,a],[1,bbb],[0,c],[1,ddd],[1,e]"
        );
    }

    #[test]
    fn test_values_current_timestamp() {
        let ctx = small_batch_ctx();
        let schema = Arc::new(Schema::new(vec![
            Field::not_null("now", DataType::Timestamp),
            Field::not_null("again", DataType::Timestamp),
        ]));
        let mut values = ValuesExec::new(
            schema,
            vec![vec![PhysicalExpr::CurrentTimestamp, PhysicalExpr::CurrentTimestamp]],
            ctx.clone(),
        );
        let batch = values.next_batch().unwrap().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].get(0), batch[0].get(1));
        assert_eq!(batch[0].get(0), Some(&ctx.current_timestamp()));
        assert!(values.next_batch().unwrap().is_none());
    }
}
