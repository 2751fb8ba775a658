//! Expand operator for grouping sets.

use std::sync::Arc;

use flint_common::{FlintError, FlintResult};

use super::{BoxedOperator, Operator};
use crate::executor::{evaluate_row, Row};
use crate::physical::{ExecutionContext, PhysicalExpr};
use crate::schema::SchemaRef;

/// Emits every input row once per projection list.
#[derive(Debug)]
pub struct ExpandExec {
    child: BoxedOperator,
    projections: Vec<Vec<PhysicalExpr>>,
    schema: SchemaRef,
    ctx: Arc<ExecutionContext>,
}

impl ExpandExec {
    /// Creates an expand; every projection must match the output width.
    pub fn try_new(
        child: BoxedOperator,
        projections: Vec<Vec<PhysicalExpr>>,
        schema: SchemaRef,
        ctx: Arc<ExecutionContext>,
    ) -> FlintResult<Self> {
        if let Some(bad) = projections.iter().find(|p| p.len() != schema.len()) {
            return Err(FlintError::malformed(format!(
                "expand projection has {} expressions but the output has {} columns",
                bad.len(),
                schema.len()
            )));
        }
        Ok(Self {
            child,
            projections,
            schema,
            ctx,
        })
    }
}

impl Operator for ExpandExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        while let Some(batch) = self.child.next_batch()? {
            let mut output = Vec::with_capacity(batch.len() * self.projections.len());
            for row in &batch {
                for projection in &self.projections {
                    output.push(evaluate_row(projection, row, &self.ctx)?);
                }
            }
            if !output.is_empty() {
                return Ok(Some(output));
            }
        }
        Ok(None)
    }
}
