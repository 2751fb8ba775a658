//! Physical query plans.
//!
//! A physical plan is an immutable tree of operators with their
//! expressions and output schemas, produced by an external planner and
//! executed directly by the executor.

mod context;
mod expr;
mod operator;
mod plan;

pub use context::{ExecutionCatalog, ExecutionContext, MemoryCatalog};
pub use expr::{
    aggregate_return_type, AggregateFunc, BinaryOp, PhysicalAggregateExpr, PhysicalExpr,
    PhysicalSortExpr, PhysicalWindowExpr, UnaryOp, WindowFunc,
};
pub use operator::{
    join_schema, ExpandOperator, FilterPhysicalOperator, GenerateOperator,
    HashAggregateOperator, HashJoinOperator, LimitPhysicalOperator, NestedLoopJoinOperator,
    PhysicalOperator, ProjectionPhysicalOperator, ScanOperator, SortPhysicalOperator,
    TakeOrderedAndProjectOperator, UnionOperator, ValuesPhysicalOperator,
    WindowPhysicalOperator,
};
pub use plan::{PhysicalPlan, PlanMetadata};
