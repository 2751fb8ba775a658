//! Direct executor for physical plans.
//!
//! This module runs physical plans produced by an external planner and
//! materializes their output as a `Table`. It uses a pull-based iterator
//! model where operators produce batches of rows on demand.
//!
//! # Architecture
//!
//! The executor consists of:
//!
//! - **Value**: Runtime values (integers, strings, dates, arrays, etc.)
//! - **Row**: A single row of values
//! - **Operator**: Executable operators that produce batches of rows
//! - **Accumulator**: Aggregate state shared by hash aggregation and windows
//! - **QueryExecutor**: Validates a plan, binds its functions and drives it
//!
//! # Execution Model
//!
//! Operators use a pull-based iterator model:
//!
//! ```ignore
//! let mut operator = executor.build_operator(&plan.root, &ctx)?;
//! while let Some(batch) = operator.next_batch()? {
//!     // Process batch
//! }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use flint_sql::executor::execute_direct;
//!
//! let table = execute_direct(&plan, &catalog, &ExecutionSettings::default())?;
//! assert_eq!(table.to_string(), "[0,2],[1,3]");
//! ```

mod accumulator;
mod engine;
mod evaluator;
mod operators;
mod row;
mod value;

pub use accumulator::{Accumulator, DistinctSketch, SketchHasher};
pub use engine::{execute_direct, QueryExecutor};
pub use evaluator::{
    compare_sort_keys, evaluate_expr, evaluate_predicate, evaluate_row, evaluate_sort_keys,
};
pub use operators::*;
pub use row::Row;
pub use value::{Value, MICROS_PER_DAY};
