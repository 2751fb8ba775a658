//! Fixture tables, plans and functions.
//!
//! The plans here are what an external planner would produce for the SQL
//! constants next to them.

use std::sync::Arc;

use flint_common::{UdfError, GROUPING_ID_COLUMN};
use flint_sql::functions::Overload;
use flint_sql::physical::{
    ExpandOperator, GenerateOperator, HashAggregateOperator, HashJoinOperator,
    PhysicalAggregateExpr, PhysicalExpr, PhysicalOperator, PhysicalPlan, PhysicalSortExpr,
    PhysicalWindowExpr, ProjectionPhysicalOperator, ScanOperator, SortPhysicalOperator,
    UnionOperator, ValuesPhysicalOperator, WindowFunc, WindowPhysicalOperator,
};
use flint_sql::{row, DataType, Field, JoinType, Schema, Table, Value};

/// `select sex, count(*) from people group by sex order by sex`
pub const GROUP_COUNT_SQL: &str = "select sex, count(*) from people group by sex order by sex";
/// `select * from people left semi join people2 on people.name = people2.name`
pub const SEMI_JOIN_SQL: &str =
    "select * from people left semi join people2 on people.name = people2.name";
/// `select * from people left anti join people2 on people.name = people2.name`
pub const ANTI_JOIN_SQL: &str =
    "select * from people left anti join people2 on people.name = people2.name";
/// `select * from people union select * from people2`
pub const UNION_SQL: &str = "select * from people union select * from people2";
/// `select hive_strlen2('hyf_test'), hive_strlen2(100)`
pub const HIVE_STRLEN2_SQL: &str = "select hive_strlen2('hyf_test'), hive_strlen2(100)";

/// Schema shared by `people` and `people2`.
pub fn people_schema() -> Schema {
    Schema::new(vec![
        Field::nullable("name", DataType::Text),
        Field::nullable("age", DataType::Int),
        Field::nullable("sex", DataType::Int),
    ])
}

/// `(a,2,0),(bbb,2,1),(c,3,0),(ddd,4,1),(e,5,1)`
pub fn people() -> Table {
    Table::new(
        Arc::new(people_schema()),
        vec![
            row!["a", 2, 0],
            row!["bbb", 2, 1],
            row!["c", 3, 0],
            row!["ddd", 4, 1],
            row!["e", 5, 1],
        ],
    )
}

/// `(a,2,0),(c,3,0),(ddd,4,1),(fff,6,1),(null,7,0)`
pub fn people2() -> Table {
    Table::new(
        Arc::new(people_schema()),
        vec![
            row!["a", 2, 0],
            row!["c", 3, 0],
            row!["ddd", 4, 1],
            row!["fff", 6, 1],
            row![Value::Null, 7, 0],
        ],
    )
}

fn scan(view: &str) -> Arc<PhysicalOperator> {
    Arc::new(PhysicalOperator::Scan(ScanOperator::new(view, people_schema())))
}

fn name_key() -> Vec<PhysicalExpr> {
    vec![PhysicalExpr::column("name", 0)]
}

/// `select * from people`
pub fn scan_people() -> PhysicalPlan {
    PhysicalPlan::with_root(scan("people"))
}

/// Plan for [`GROUP_COUNT_SQL`].
pub fn group_count() -> PhysicalPlan {
    let aggregate = Arc::new(PhysicalOperator::HashAggregate(HashAggregateOperator::new(
        scan("people"),
        vec![(PhysicalExpr::column("sex", 2), "sex".to_string())],
        vec![PhysicalAggregateExpr::count_star("count(1)")],
    )));
    PhysicalPlan::new(PhysicalOperator::Sort(SortPhysicalOperator::new(
        aggregate,
        vec![PhysicalSortExpr::asc(PhysicalExpr::column("sex", 0))],
    )))
}

/// `people` joined with `people2` on name.
pub fn name_join(join_type: JoinType) -> PhysicalPlan {
    PhysicalPlan::new(PhysicalOperator::HashJoin(HashJoinOperator::new(
        scan("people"),
        scan("people2"),
        join_type,
        name_key(),
        name_key(),
    )))
}

/// Plan for [`UNION_SQL`].
pub fn union_people() -> PhysicalPlan {
    PhysicalPlan::new(PhysicalOperator::Union(UnionOperator::new(
        scan("people"),
        scan("people2"),
    )))
}

fn one_row() -> Arc<PhysicalOperator> {
    Arc::new(PhysicalOperator::Values(ValuesPhysicalOperator::one_row()))
}

/// Projection of `exprs` over a single empty row.
pub fn select(exprs: Vec<(PhysicalExpr, &str)>) -> PhysicalPlan {
    let exprs = exprs
        .into_iter()
        .map(|(expr, name)| (expr, name.to_string()))
        .collect();
    PhysicalPlan::new(PhysicalOperator::Projection(ProjectionPhysicalOperator::new(
        one_row(),
        exprs,
    )))
}

/// Plan for [`HIVE_STRLEN2_SQL`].
pub fn hive_strlen2() -> PhysicalPlan {
    select(vec![
        (
            PhysicalExpr::function(
                "hive_strlen2",
                vec![PhysicalExpr::lit_str("hyf_test")],
                DataType::Int,
            ),
            "a",
        ),
        (
            PhysicalExpr::function("hive_strlen2", vec![PhysicalExpr::lit_i64(100)], DataType::Int),
            "b",
        ),
    ])
}

/// Two overloads: string length for text, doubling for integers.
pub fn hive_strlen2_overloads() -> Vec<Overload> {
    vec![
        Overload::new(vec![DataType::Text], DataType::Int, |args: &[Value]| {
            match &args[0] {
                Value::String(s) => Ok(Value::Int(i32::try_from(s.chars().count())?)),
                _ => Ok(Value::Null),
            }
        }),
        Overload::new(vec![DataType::Int], DataType::Int, |args: &[Value]| {
            match &args[0] {
                Value::Int(v) => v
                    .checked_mul(2)
                    .map(Value::Int)
                    .ok_or_else(|| UdfError::from("integer overflow")),
                _ => Ok(Value::Null),
            }
        }),
    ]
}

/// `select current_timestamp, current_timestamp`
pub fn current_timestamps() -> PhysicalPlan {
    select(vec![
        (PhysicalExpr::CurrentTimestamp, "t1"),
        (PhysicalExpr::CurrentTimestamp, "t2"),
    ])
}

/// `select *, row_number() over (partition by sex order by age) from people`
pub fn row_number_by_sex() -> PhysicalPlan {
    PhysicalPlan::new(PhysicalOperator::Window(WindowPhysicalOperator::new(
        scan("people"),
        vec![PhysicalExpr::column("sex", 2)],
        vec![PhysicalSortExpr::asc(PhysicalExpr::column("age", 1))],
        vec![PhysicalWindowExpr::new(WindowFunc::RowNumber, vec![], "rn")],
    )))
}

/// `select sex, grouping_id, count(*) from people group by rollup(sex)`
pub fn rollup_count() -> PhysicalPlan {
    let expand = Arc::new(PhysicalOperator::Expand(ExpandOperator::rollup(
        scan("people"),
        vec![(PhysicalExpr::column("sex", 2), "sex".to_string())],
    )));
    PhysicalPlan::new(PhysicalOperator::HashAggregate(HashAggregateOperator::new(
        expand,
        vec![
            (PhysicalExpr::column("sex", 3), "sex".to_string()),
            (PhysicalExpr::column(GROUPING_ID_COLUMN, 4), "gid".to_string()),
        ],
        vec![PhysicalAggregateExpr::count_star("count(1)")],
    )))
}

/// `select explode(split('x y z', ' '))`
pub fn explode_split() -> PhysicalPlan {
    let generator = PhysicalExpr::function(
        "split",
        vec![PhysicalExpr::lit_str("x y z"), PhysicalExpr::lit_str(" ")],
        DataType::array(DataType::Text),
    );
    PhysicalPlan::new(PhysicalOperator::Generate(
        GenerateOperator::new(one_row(), generator, vec![]).with_position(),
    ))
}

/// Planner that knows every SQL constant of this module.
pub fn people_planner() -> crate::LookupPlanner {
    crate::LookupPlanner::new()
        .with(GROUP_COUNT_SQL, group_count())
        .with(SEMI_JOIN_SQL, name_join(JoinType::LeftSemi))
        .with(ANTI_JOIN_SQL, name_join(JoinType::LeftAnti))
        .with(UNION_SQL, union_people())
        .with(HIVE_STRLEN2_SQL, hive_strlen2())
}
