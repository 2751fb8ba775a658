//! Generate (explode) operator.

use std::sync::Arc;

use flint_common::{FlintError, FlintResult};

use super::{BoxedOperator, Operator};
use crate::executor::{evaluate_expr, Row, Value};
use crate::physical::{ExecutionContext, GenerateOperator, PhysicalExpr};
use crate::schema::SchemaRef;

/// Emits one row per element of an array-valued generator.
///
/// Each output row is the required child columns, then the 0-based
/// position (when enabled), then the element. A null or empty array drops
/// the input row unless `outer` is set, in which case one row with a null
/// position and element is emitted.
#[derive(Debug)]
pub struct GenerateExec {
    child: BoxedOperator,
    generator: PhysicalExpr,
    required_child_output: Vec<usize>,
    with_position: bool,
    outer: bool,
    schema: SchemaRef,
    ctx: Arc<ExecutionContext>,
}

impl GenerateExec {
    /// Creates the executable form of a generate node.
    pub fn from_physical(
        op: &GenerateOperator,
        child: BoxedOperator,
        ctx: Arc<ExecutionContext>,
    ) -> Self {
        Self {
            child,
            generator: op.generator.clone(),
            required_child_output: op.required_child_output.clone(),
            with_position: op.with_position,
            outer: op.outer,
            schema: op.schema.clone(),
            ctx,
        }
    }

    fn generate(&self, row: &Row, output: &mut Vec<Row>) -> FlintResult<()> {
        let value = evaluate_expr(&self.generator, row, &self.ctx)?;
        let elements = match &value {
            Value::Null => &[][..],
            Value::Array(elements) => elements.as_slice(),
            other => {
                return Err(FlintError::type_mismatch("ARRAY", other.data_type()));
            }
        };

        let carried = row.project(&self.required_child_output);
        if elements.is_empty() {
            if self.outer {
                let padding = if self.with_position { 2 } else { 1 };
                output.push(carried.pad_right(padding));
            }
            return Ok(());
        }

        for (pos, element) in elements.iter().enumerate() {
            let mut values = carried.values().to_vec();
            if self.with_position {
                let pos = i32::try_from(pos).map_err(|_| {
                    FlintError::invalid_argument("array too large to generate positions")
                })?;
                values.push(Value::Int(pos));
            }
            values.push(element.clone());
            output.push(Row::new(values));
        }
        Ok(())
    }
}

impl Operator for GenerateExec {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn next_batch(&mut self) -> FlintResult<Option<Vec<Row>>> {
        while let Some(batch) = self.child.next_batch()? {
            let mut output = Vec::new();
            for row in &batch {
                self.generate(row, &mut output)?;
            }
            if !output.is_empty() {
                return Ok(Some(output));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{render, small_batch_ctx};
    use super::super::ValuesExec;
    use super::*;
    use crate::functions::FunctionRegistry;
    use crate::physical::{PhysicalOperator, ValuesPhysicalOperator};
    use crate::schema::{Field, Schema};
    use crate::types::{DataType, Literal};
    use flint_common::ExecutionSettings;

    fn array_input(ctx: &Arc<ExecutionContext>) -> (BoxedOperator, Arc<PhysicalOperator>) {
        let schema = Schema::new(vec![
            Field::not_null("id", DataType::Int),
            Field::nullable("items", DataType::array(DataType::Int)),
        ]);
        let values = vec![
            vec![
                PhysicalExpr::lit_i64(1),
                PhysicalExpr::Cast {
                    expr: Box::new(PhysicalExpr::null()),
                    data_type: DataType::array(DataType::Int),
                },
            ],
            vec![PhysicalExpr::lit_i64(2), PhysicalExpr::null()],
            vec![PhysicalExpr::lit_i64(3), PhysicalExpr::null()],
        ];
        let plan = Arc::new(PhysicalOperator::Values(ValuesPhysicalOperator::new(
            values.clone(),
            schema.clone(),
        )));
        let exec = ValuesExec::new(Arc::new(schema), values, ctx.clone());
        (Box::new(exec), plan)
    }

    /// Row 1 yields `[10, 20]`, row 2 a null array and row 3 an empty one.
    fn generator() -> PhysicalExpr {
        PhysicalExpr::Case {
            operand: Some(Box::new(PhysicalExpr::column("id", 0))),
            when_then: vec![
                (
                    PhysicalExpr::lit_i64(1),
                    PhysicalExpr::function(
                        "array",
                        vec![
                            PhysicalExpr::literal(Literal::Integer(10)),
                            PhysicalExpr::literal(Literal::Integer(20)),
                        ],
                        DataType::array(DataType::Int),
                    ),
                ),
                (
                    PhysicalExpr::lit_i64(3),
                    PhysicalExpr::function("array", vec![], DataType::array(DataType::Int)),
                ),
            ],
            else_result: Some(Box::new(PhysicalExpr::column("items", 1))),
        }
    }

    fn bound_ctx() -> Arc<ExecutionContext> {
        let settings = ExecutionSettings {
            batch_size: 2,
            ..ExecutionSettings::default()
        };
        let mut ctx = ExecutionContext::new(settings, chrono::Utc::now());
        let registry = FunctionRegistry::with_builtins();
        ctx.bind_function("array", registry.get("array").unwrap());
        Arc::new(ctx)
    }

    #[test]
    fn test_posexplode() {
        let ctx = bound_ctx();
        let (input, plan) = array_input(&ctx);
        let op = GenerateOperator::new(plan, generator(), vec![0]).with_position();
        let generate = GenerateExec::from_physical(&op, input, ctx);
        assert_eq!(render(Box::new(generate)), "[1,0,10],[1,1,20]");
    }

    #[test]
    fn test_outer_keeps_null_arrays() {
        let ctx = bound_ctx();
        let (input, plan) = array_input(&ctx);
        let op = GenerateOperator::new(plan, generator(), vec![0]).outer();
        let generate = GenerateExec::from_physical(&op, input, ctx);
        assert_eq!(render(Box::new(generate)), "[1,10],[1,20],[2,null],[3,null]");
    }

    #[test]
    fn test_empty_array_drops_row() {
        let ctx = bound_ctx();
        let (input, plan) = array_input(&ctx);
        let op = GenerateOperator::new(plan, generator(), vec![0]);
        let generate = GenerateExec::from_physical(&op, input, ctx);
        assert_eq!(render(Box::new(generate)), "[1,10],[1,20]");
    }

    #[test]
    fn test_outer_empty_array_with_position() {
        let ctx = bound_ctx();
        let (input, plan) = array_input(&ctx);
        let op = GenerateOperator::new(plan, generator(), vec![0])
            .with_position()
            .outer();
        let generate = GenerateExec::from_physical(&op, input, ctx);
        assert_eq!(
            render(Box::new(generate)),
            "[1,0,10],[1,1,20],[2,null,null],[3,null,null]"
        );
    }

    #[test]
    fn test_non_array_generator_fails() {
        let ctx = small_batch_ctx();
        let (input, plan) = array_input(&ctx);
        let op = GenerateOperator::new(plan, PhysicalExpr::column("id", 0), vec![]);
        let mut generate = GenerateExec::from_physical(&op, input, ctx);
        assert!(matches!(
            generate.next_batch(),
            Err(FlintError::TypeMismatch { .. })
        ));
    }
}
