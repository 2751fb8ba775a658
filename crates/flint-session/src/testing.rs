//! Shared fixtures for unit tests.

use std::sync::{Arc, Once};

use flint_sql::physical::{
    HashAggregateOperator, PhysicalAggregateExpr, PhysicalExpr, PhysicalOperator, PhysicalPlan,
    PhysicalSortExpr, ProjectionPhysicalOperator, ScanOperator, SortPhysicalOperator,
    ValuesPhysicalOperator,
};
use flint_sql::{row, DataType, Field, Schema, Table};

static TRACING: Once = Once::new();

/// Installs a test subscriber so query logging shows up under `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn people() -> Table {
    let schema = Schema::new(vec![
        Field::nullable("name", DataType::Text),
        Field::nullable("age", DataType::Int),
        Field::nullable("sex", DataType::Int),
    ]);
    Table::new(
        Arc::new(schema),
        vec![
            row!["a", 2, 0],
            row!["bbb", 2, 1],
            row!["c", 3, 0],
            row!["ddd", 4, 1],
            row!["e", 5, 1],
        ],
    )
}

/// `select sex, count(*) from people group by sex order by sex`
pub fn group_count_plan() -> PhysicalPlan {
    let scan = Arc::new(PhysicalOperator::Scan(ScanOperator::new(
        "people",
        people().schema().as_ref().clone(),
    )));
    let aggregate = Arc::new(PhysicalOperator::HashAggregate(HashAggregateOperator::new(
        scan,
        vec![(PhysicalExpr::column("sex", 2), "sex".to_string())],
        vec![PhysicalAggregateExpr::count_star("count")],
    )));
    PhysicalPlan::new(PhysicalOperator::Sort(SortPhysicalOperator::new(
        aggregate,
        vec![PhysicalSortExpr::asc(PhysicalExpr::column("sex", 0))],
    )))
}

/// `select <name>(<arg>)`
pub fn call_plan(name: &str, arg: PhysicalExpr, return_type: DataType) -> PhysicalPlan {
    let values = Arc::new(PhysicalOperator::Values(ValuesPhysicalOperator::one_row()));
    PhysicalPlan::new(PhysicalOperator::Projection(ProjectionPhysicalOperator::new(
        values,
        vec![(
            PhysicalExpr::function(name, vec![arg], return_type),
            "result".to_string(),
        )],
    )))
}
