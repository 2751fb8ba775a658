//! Direct execution engine.
//!
//! Converts a physical plan into an executable operator tree, runs it to
//! completion and assembles the rows into a `Table`.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use flint_common::{ExecutionSettings, FlintError, FlintResult};
use tracing::{debug, warn};

use super::{
    collect_rows, BoxedOperator, ExpandExec, FilterExec, GenerateExec, HashAggregateExec,
    HashJoinExec, LimitExec, NestedLoopJoinExec, ProjectionExec, ScanExec, SortExec,
    TakeOrderedAndProjectExec, UnionExec, ValuesExec, WindowExec,
};
use crate::physical::{ExecutionCatalog, ExecutionContext, PhysicalOperator, PhysicalPlan};
use crate::table::Table;

/// Executes `plan` against `catalog` and returns the materialized result.
///
/// The current instant is captured once, so every `current_timestamp` and
/// `current_date` in the plan sees the same value.
pub fn execute_direct(
    plan: &PhysicalPlan,
    catalog: &dyn ExecutionCatalog,
    settings: &ExecutionSettings,
) -> FlintResult<Table> {
    QueryExecutor::new(catalog, settings.clone()).execute(plan)
}

/// Query executor that runs physical plans.
#[derive(Debug)]
pub struct QueryExecutor<'a> {
    /// View and function lookups.
    catalog: &'a dyn ExecutionCatalog,
    /// Execution settings.
    settings: ExecutionSettings,
    /// Executions slower than this are logged at warn level.
    slow_query_threshold: Option<Duration>,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(catalog: &'a dyn ExecutionCatalog, settings: ExecutionSettings) -> Self {
        Self {
            catalog,
            settings,
            slow_query_threshold: None,
        }
    }

    /// Warns about executions that take longer than `threshold`.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Executes a physical plan and returns all results.
    pub fn execute(&self, plan: &PhysicalPlan) -> FlintResult<Table> {
        self.execute_at(plan, Utc::now())
    }

    /// Executes a physical plan with time-valued expressions pinned to
    /// `instant`.
    pub fn execute_at(&self, plan: &PhysicalPlan, instant: DateTime<Utc>) -> FlintResult<Table> {
        let start = Instant::now();

        validate(plan.root())?;
        let ctx = Arc::new(self.bind(plan, instant)?);

        let mut root = self.build_operator(plan.root(), &ctx)?;
        let rows = collect_rows(root.as_mut())?;
        let table = Table::new(plan.schema(), rows);

        let elapsed = start.elapsed();
        debug!(
            rows = table.num_rows(),
            elapsed_us = elapsed.as_micros() as u64,
            "executed {} plan",
            plan.root().name()
        );
        if let Some(threshold) = self.slow_query_threshold {
            if elapsed > threshold {
                warn!(
                    "slow execution: {:?} (threshold {:?}) for {}",
                    elapsed,
                    threshold,
                    plan.metadata.sql.as_deref().unwrap_or("<plan>")
                );
            }
        }
        Ok(table)
    }

    /// Creates the execution context with every called function bound.
    fn bind(&self, plan: &PhysicalPlan, instant: DateTime<Utc>) -> FlintResult<ExecutionContext> {
        let mut names = Vec::new();
        let mut pending = vec![plan.root()];
        while let Some(op) = pending.pop() {
            for (expr, _) in op.expressions() {
                expr.collect_functions(&mut names);
            }
            pending.extend(op.children().into_iter().map(Arc::as_ref));
        }

        let mut ctx = ExecutionContext::new(self.settings.clone(), instant);
        for name in names.into_iter().collect::<BTreeSet<_>>() {
            let descriptor = self.catalog.lookup_function(&name)?;
            ctx.bind_function(name, descriptor);
        }
        Ok(ctx)
    }

    /// Builds an operator tree from a physical operator.
    pub fn build_operator(
        &self,
        op: &PhysicalOperator,
        ctx: &Arc<ExecutionContext>,
    ) -> FlintResult<BoxedOperator> {
        let ctx = ctx.clone();
        match op {
            PhysicalOperator::Scan(scan) => {
                let view = self.catalog.lookup_view(&scan.view_name)?;
                if !scan.view_schema.is_positionally_compatible(view.schema()) {
                    return Err(FlintError::malformed(format!(
                        "view '{}' has schema {} but the plan expects {}",
                        scan.view_name,
                        view.schema(),
                        scan.view_schema
                    )));
                }
                let exec = ScanExec::new(view, ctx).with_schema(scan.view_schema.clone());
                Ok(Box::new(match &scan.projection {
                    Some(indices) => exec.with_projection(indices.clone()),
                    None => exec,
                }))
            }

            PhysicalOperator::Values(values) => Ok(Box::new(ValuesExec::new(
                values.schema.clone(),
                values.values.clone(),
                ctx,
            ))),

            PhysicalOperator::Projection(proj) => {
                let child = self.build_operator(&proj.input, &ctx)?;
                Ok(Box::new(ProjectionExec::new(
                    child,
                    proj.exprs.clone(),
                    proj.schema.clone(),
                    ctx,
                )))
            }

            PhysicalOperator::Filter(filter) => {
                let child = self.build_operator(&filter.input, &ctx)?;
                Ok(Box::new(FilterExec::new(
                    child,
                    filter.predicate.clone(),
                    ctx,
                )))
            }

            PhysicalOperator::Generate(generate) => {
                let child = self.build_operator(&generate.input, &ctx)?;
                Ok(Box::new(GenerateExec::from_physical(generate, child, ctx)))
            }

            PhysicalOperator::HashAggregate(agg) => {
                let child = self.build_operator(&agg.input, &ctx)?;
                Ok(Box::new(HashAggregateExec::new(
                    child,
                    agg.group_by.clone(),
                    agg.aggregates.clone(),
                    agg.schema.clone(),
                    ctx,
                )))
            }

            PhysicalOperator::HashJoin(join) => {
                let left = self.build_operator(&join.left, &ctx)?;
                let right = self.build_operator(&join.right, &ctx)?;
                Ok(Box::new(
                    HashJoinExec::new(
                        left,
                        right,
                        join.join_type,
                        join.left_keys.clone(),
                        join.right_keys.clone(),
                        join.schema.clone(),
                        ctx,
                    )
                    .with_filter(join.filter.clone()),
                ))
            }

            PhysicalOperator::NestedLoopJoin(join) => {
                let left = self.build_operator(&join.left, &ctx)?;
                let right = self.build_operator(&join.right, &ctx)?;
                Ok(Box::new(NestedLoopJoinExec::new(
                    left,
                    right,
                    join.join_type,
                    join.condition.clone(),
                    join.schema.clone(),
                    ctx,
                )))
            }

            PhysicalOperator::Window(window) => {
                let child = self.build_operator(&window.input, &ctx)?;
                Ok(Box::new(WindowExec::new(
                    child,
                    window.partition_by.clone(),
                    window.order_by.clone(),
                    window.window_exprs.clone(),
                    window.schema.clone(),
                    ctx,
                )))
            }

            PhysicalOperator::Union(union) => {
                let left = self.build_operator(&union.left, &ctx)?;
                let right = self.build_operator(&union.right, &ctx)?;
                Ok(Box::new(UnionExec::try_new(
                    left,
                    right,
                    union.all,
                    union.schema.clone(),
                )?))
            }

            PhysicalOperator::Sort(sort) => {
                let child = self.build_operator(&sort.input, &ctx)?;
                Ok(Box::new(SortExec::new(child, sort.order_by.clone(), ctx)))
            }

            PhysicalOperator::Limit(limit) => {
                let child = self.build_operator(&limit.input, &ctx)?;
                Ok(Box::new(LimitExec::new(child, limit.offset, limit.fetch)))
            }

            PhysicalOperator::TakeOrderedAndProject(top) => {
                let child = self.build_operator(&top.input, &ctx)?;
                Ok(Box::new(TakeOrderedAndProjectExec::new(
                    child,
                    top.limit,
                    top.order_by.clone(),
                    top.projection.clone(),
                    top.schema.clone(),
                    ctx,
                )))
            }

            PhysicalOperator::Expand(expand) => {
                let child = self.build_operator(&expand.input, &ctx)?;
                Ok(Box::new(ExpandExec::try_new(
                    child,
                    expand.projections.clone(),
                    expand.schema.clone(),
                    ctx,
                )?))
            }
        }
    }
}

/// Checks the structural invariants of a plan before anything runs.
fn validate(op: &PhysicalOperator) -> FlintResult<()> {
    for (expr, width) in op.expressions() {
        if let Some(index) = expr.max_column_index() {
            if index >= width {
                return Err(FlintError::malformed(format!(
                    "{} references column {} of a {}-column input",
                    op.name(),
                    index,
                    width
                )));
            }
        }
    }

    match op {
        PhysicalOperator::Scan(scan) => {
            if let Some(&bad) = scan
                .projection
                .iter()
                .flatten()
                .find(|&&i| i >= scan.view_schema.len())
            {
                return Err(FlintError::malformed(format!(
                    "scan of '{}' projects column {} of {}",
                    scan.view_name,
                    bad,
                    scan.view_schema.len()
                )));
            }
        }
        PhysicalOperator::Values(values) => {
            if values.values.iter().any(|row| row.len() != values.schema.len()) {
                return Err(FlintError::malformed(
                    "values row width differs from its schema",
                ));
            }
        }
        PhysicalOperator::HashJoin(join) => {
            if join.left_keys.len() != join.right_keys.len() {
                return Err(FlintError::malformed(format!(
                    "hash join has {} left keys but {} right keys",
                    join.left_keys.len(),
                    join.right_keys.len()
                )));
            }
        }
        PhysicalOperator::Union(union) => {
            let (lw, rw) = (union.left.schema().len(), union.right.schema().len());
            if lw != rw {
                return Err(FlintError::malformed(format!(
                    "union inputs have {} and {} columns",
                    lw, rw
                )));
            }
        }
        PhysicalOperator::Expand(expand) => {
            if expand
                .projections
                .iter()
                .any(|p| p.len() != expand.schema.len())
            {
                return Err(FlintError::malformed(
                    "expand projection width differs from its schema",
                ));
            }
        }
        _ => {}
    }

    for child in op.children() {
        validate(child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Overload;
    use crate::physical::{
        AggregateFunc, BinaryOp, FilterPhysicalOperator, HashAggregateOperator,
        HashJoinOperator, MemoryCatalog, PhysicalAggregateExpr, PhysicalExpr, PhysicalSortExpr,
        ProjectionPhysicalOperator, ScanOperator, SortPhysicalOperator, UnionOperator,
        ValuesPhysicalOperator,
    };
    use crate::row;
    use crate::schema::{Field, Schema};
    use crate::types::{DataType, JoinType};
    use crate::Value;

    fn people_schema() -> Schema {
        Schema::new(vec![
            Field::nullable("name", DataType::Text),
            Field::nullable("age", DataType::Int),
            Field::nullable("sex", DataType::Int),
        ])
    }

    fn catalog() -> MemoryCatalog {
        let people = Table::new(
            Arc::new(people_schema()),
            vec![
                row!["a", 2, 0],
                row!["bbb", 2, 1],
                row!["c", 3, 0],
                row!["ddd", 4, 1],
                row!["e", 5, 1],
            ],
        );
        MemoryCatalog::with_views(vec![("people", people)])
    }

    fn scan() -> Arc<PhysicalOperator> {
        Arc::new(PhysicalOperator::Scan(ScanOperator::new(
            "people",
            people_schema(),
        )))
    }

    fn run(root: PhysicalOperator, catalog: &MemoryCatalog) -> FlintResult<Table> {
        execute_direct(
            &PhysicalPlan::new(root),
            catalog,
            &ExecutionSettings::default(),
        )
    }

    #[test]
    fn test_group_count_sorted() {
        let agg = HashAggregateOperator::new(
            scan(),
            vec![(PhysicalExpr::column("sex", 2), "sex".to_string())],
            vec![PhysicalAggregateExpr::count_star("count")],
        );
        let sort = SortPhysicalOperator::new(
            Arc::new(PhysicalOperator::HashAggregate(agg)),
            vec![PhysicalSortExpr::asc(PhysicalExpr::column("sex", 0))],
        );
        let table = run(PhysicalOperator::Sort(sort), &catalog()).unwrap();
        assert_eq!(table.to_string(), "[0,2],[1,3]");
        assert_eq!(table.schema().names(), vec!["sex", "count"]);
    }

    #[test]
    fn test_unresolved_view() {
        let scan = ScanOperator::new("missing", people_schema());
        let err = run(PhysicalOperator::Scan(scan), &catalog()).unwrap_err();
        assert!(matches!(err, FlintError::UnresolvedView { name } if name == "missing"));
    }

    #[test]
    fn test_incompatible_view_schema() {
        let schema = Schema::new(vec![Field::nullable("name", DataType::Text)]);
        let scan = ScanOperator::new("people", schema);
        let err = run(PhysicalOperator::Scan(scan), &catalog()).unwrap_err();
        assert!(matches!(err, FlintError::MalformedPlan { .. }));
    }

    #[test]
    fn test_column_out_of_range() {
        let filter = FilterPhysicalOperator::new(
            scan(),
            PhysicalExpr::column("ghost", 7).eq(PhysicalExpr::lit_i64(1)),
        );
        let err = run(PhysicalOperator::Filter(filter), &catalog()).unwrap_err();
        assert!(matches!(err, FlintError::MalformedPlan { .. }));
    }

    #[test]
    fn test_join_key_arity() {
        let join = HashJoinOperator::new(
            scan(),
            scan(),
            JoinType::Inner,
            vec![PhysicalExpr::column("name", 0)],
            vec![],
        );
        let err = run(PhysicalOperator::HashJoin(join), &catalog()).unwrap_err();
        assert!(matches!(err, FlintError::MalformedPlan { .. }));
    }

    #[test]
    fn test_union_width_mismatch() {
        let narrow = ScanOperator::new("people", people_schema()).with_projection(vec![0]);
        let union = UnionOperator::new(scan(), Arc::new(PhysicalOperator::Scan(narrow))).all();
        let err = run(PhysicalOperator::Union(union), &catalog()).unwrap_err();
        assert!(matches!(err, FlintError::MalformedPlan { .. }));
    }

    #[test]
    fn test_unresolved_function_fails_before_execution() {
        let proj = ProjectionPhysicalOperator::new(
            scan(),
            vec![(
                PhysicalExpr::function(
                    "hive_strlen",
                    vec![PhysicalExpr::column("name", 0)],
                    DataType::Int,
                ),
                "len".to_string(),
            )],
        );
        let err = run(PhysicalOperator::Projection(proj), &catalog()).unwrap_err();
        assert!(matches!(err, FlintError::UnresolvedFunction { name } if name == "hive_strlen"));
    }

    #[test]
    fn test_registered_function() {
        let mut catalog = catalog();
        catalog.register_function(
            "hive_strlen",
            vec![Overload::new(
                vec![DataType::Text],
                DataType::Int,
                |args: &[Value]| {
                    let len = args[0].as_str().map_or(0, str::len);
                    Ok(Value::Int(len as i32))
                },
            )],
        );
        let proj = ProjectionPhysicalOperator::new(
            scan(),
            vec![(
                PhysicalExpr::function(
                    "hive_strlen",
                    vec![PhysicalExpr::column("name", 0)],
                    DataType::Int,
                ),
                "len".to_string(),
            )],
        );
        let table = run(PhysicalOperator::Projection(proj), &catalog).unwrap();
        assert_eq!(table.to_string(), "[1],[3],[1],[3],[1]");
    }

    #[test]
    fn test_current_timestamp_is_pinned() {
        let values = ValuesPhysicalOperator::new(
            vec![vec![PhysicalExpr::CurrentTimestamp, PhysicalExpr::CurrentTimestamp]],
            Schema::new(vec![
                Field::not_null("a", DataType::Timestamp),
                Field::not_null("b", DataType::Timestamp),
            ]),
        );
        let plan = PhysicalPlan::new(PhysicalOperator::Values(values));
        let catalog = catalog();
        let instant = Utc::now();
        let table = QueryExecutor::new(&catalog, ExecutionSettings::default())
            .execute_at(&plan, instant)
            .unwrap();
        let row = &table.data()[0];
        assert_eq!(row.get(0), row.get(1));
        assert_eq!(row.get(0), Some(&Value::timestamp(instant)));
    }

    fn ratio_plan() -> PhysicalOperator {
        PhysicalOperator::Projection(ProjectionPhysicalOperator::new(
            scan(),
            vec![(
                PhysicalExpr::binary(
                    PhysicalExpr::column("age", 1),
                    BinaryOp::Divide,
                    PhysicalExpr::binary(
                        PhysicalExpr::column("sex", 2),
                        BinaryOp::Multiply,
                        PhysicalExpr::lit_i64(1),
                    ),
                ),
                "ratio".to_string(),
            )],
        ))
    }

    #[test]
    fn test_zero_divisor_yields_null() {
        let table = run(ratio_plan(), &catalog()).unwrap();
        assert_eq!(table.to_string(), "[null],[2.0],[null],[4.0],[5.0]");
    }

    #[test]
    fn test_operator_error_aborts() {
        let settings = ExecutionSettings {
            ansi_arithmetic: true,
            ..ExecutionSettings::default()
        };
        let err = execute_direct(&PhysicalPlan::new(ratio_plan()), &catalog(), &settings)
            .unwrap_err();
        assert!(matches!(err, FlintError::DivisionByZero));
    }

    #[test]
    fn test_global_aggregate_plan() {
        let agg = HashAggregateOperator::new(
            scan(),
            vec![],
            vec![PhysicalAggregateExpr::new(
                AggregateFunc::Max,
                vec![PhysicalExpr::column("age", 1)],
                false,
                "max_age",
            )],
        );
        let table = run(PhysicalOperator::HashAggregate(agg), &catalog()).unwrap();
        assert_eq!(table.to_string(), "[5]");
    }
}
