//! Direct execution benchmarks for flint.
//!
//! Benchmarks for:
//! - Filter and projection pipelines
//! - Hash aggregation and approximate distinct counts
//! - Hash joins
//! - Full sorts against top-K selection
//! - Concurrent sessions

use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flint_bench::utils::{cities_schema, generate_cities, generate_users, users_schema};
use flint_common::EngineConfig;
use flint_session::{Engine, Session};
use flint_sql::physical::{
    AggregateFunc, BinaryOp, FilterPhysicalOperator, HashAggregateOperator, HashJoinOperator,
    PhysicalAggregateExpr, PhysicalExpr, PhysicalOperator, PhysicalPlan, PhysicalSortExpr,
    ProjectionPhysicalOperator, ScanOperator, SortPhysicalOperator,
    TakeOrderedAndProjectOperator,
};
use flint_sql::JoinType;

const SIZES: [usize; 3] = [1_000, 10_000, 50_000];

fn users_scan() -> Arc<PhysicalOperator> {
    Arc::new(PhysicalOperator::Scan(ScanOperator::new("users", users_schema())))
}

fn session_with_users(engine: &Engine, size: usize) -> Arc<Session> {
    let session = engine.create_session();
    session
        .create_or_replace_temp_view("users", generate_users(size))
        .expect("Failed to register users");
    session
        .create_or_replace_temp_view("cities", generate_cities())
        .expect("Failed to register cities");
    session
}

/// `select name, age + 1 from users where age > 40`
fn filter_project_plan() -> PhysicalPlan {
    let filter = Arc::new(PhysicalOperator::Filter(FilterPhysicalOperator::new(
        users_scan(),
        PhysicalExpr::binary(
            PhysicalExpr::column("age", 2),
            BinaryOp::Gt,
            PhysicalExpr::lit_i64(40),
        ),
    )));
    PhysicalPlan::new(PhysicalOperator::Projection(ProjectionPhysicalOperator::new(
        filter,
        vec![
            (PhysicalExpr::column("name", 1), "name".to_string()),
            (
                PhysicalExpr::binary(
                    PhysicalExpr::column("age", 2),
                    BinaryOp::Plus,
                    PhysicalExpr::lit_i64(1),
                ),
                "next_age".to_string(),
            ),
        ],
    )))
}

/// `select city, count(*), approx_count_distinct(name) from users group by city`
fn aggregate_plan() -> PhysicalPlan {
    PhysicalPlan::new(PhysicalOperator::HashAggregate(HashAggregateOperator::new(
        users_scan(),
        vec![(PhysicalExpr::column("city", 3), "city".to_string())],
        vec![
            PhysicalAggregateExpr::count_star("count"),
            PhysicalAggregateExpr::new(
                AggregateFunc::ApproxCountDistinct,
                vec![PhysicalExpr::column("name", 1)],
                false,
                "names",
            ),
        ],
    )))
}

/// `select * from users join cities using (city)`
fn join_plan() -> PhysicalPlan {
    let cities = Arc::new(PhysicalOperator::Scan(ScanOperator::new(
        "cities",
        cities_schema(),
    )));
    PhysicalPlan::new(PhysicalOperator::HashJoin(HashJoinOperator::new(
        users_scan(),
        cities,
        JoinType::Inner,
        vec![PhysicalExpr::column("city", 3)],
        vec![PhysicalExpr::column("city", 0)],
    )))
}

fn age_order() -> Vec<PhysicalSortExpr> {
    vec![
        PhysicalSortExpr::desc(PhysicalExpr::column("age", 2)),
        PhysicalSortExpr::asc(PhysicalExpr::column("id", 0)),
    ]
}

/// `select * from users order by age desc, id`
fn sort_plan() -> PhysicalPlan {
    PhysicalPlan::new(PhysicalOperator::Sort(SortPhysicalOperator::new(
        users_scan(),
        age_order(),
    )))
}

/// `select * from users order by age desc, id limit 10`
fn top_k_plan() -> PhysicalPlan {
    PhysicalPlan::new(PhysicalOperator::TakeOrderedAndProject(
        TakeOrderedAndProjectOperator::new(users_scan(), 10, age_order()),
    ))
}

/// Benchmark each operator family at several input sizes.
fn bench_operators(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default()).expect("Failed to create engine");
    let plans = [
        ("filter_project", filter_project_plan()),
        ("aggregate", aggregate_plan()),
        ("hash_join", join_plan()),
        ("sort", sort_plan()),
        ("top_k", top_k_plan()),
    ];

    for (name, plan) in &plans {
        let mut group = c.benchmark_group(format!("direct/{}", name));
        for size in SIZES {
            let session = session_with_users(&engine, size);
            group.throughput(Throughput::Elements(size as u64));
            group.bench_with_input(BenchmarkId::from_parameter(size), plan, |b, plan| {
                b.iter(|| {
                    let table = session.execute_direct(black_box(plan)).expect("Execution failed");
                    black_box(table)
                });
            });
            session.close();
        }
        group.finish();
    }
}

/// Benchmark many sessions executing at once.
fn bench_concurrent_sessions(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct/concurrent");
    let engine = Engine::new(EngineConfig::default()).expect("Failed to create engine");
    let plan = aggregate_plan();

    for threads in [1, 4, 10] {
        let sessions: Vec<_> = (0..threads)
            .map(|_| session_with_users(&engine, 10_000))
            .collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &sessions,
            |b, sessions| {
                b.iter(|| {
                    thread::scope(|scope| {
                        for session in sessions {
                            let plan = &plan;
                            scope.spawn(move || {
                                black_box(session.execute_direct(plan).expect("Execution failed"))
                            });
                        }
                    });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_operators, bench_concurrent_sessions);
criterion_main!(benches);
