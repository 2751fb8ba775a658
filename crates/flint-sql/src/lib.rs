//! # flint-sql
//!
//! Physical plans and the direct execution engine for flint.
//!
//! This crate implements:
//! - The row/value model and result tables
//! - Physical expressions, operators and plans
//! - The scalar function invocation layer (overload resolution, coercion)
//! - The pull-based operator library
//! - `execute_direct`, which runs a plan to a materialized `Table`

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Data types and literals
pub mod types;

/// Schemas for operator outputs
pub mod schema;

/// Scalar function registry and invocation
pub mod functions;

/// Physical plan representation
pub mod physical;

/// Query execution
pub mod executor;

/// Materialized results
pub mod table;

pub use executor::{execute_direct, QueryExecutor, Row, Value};
pub use schema::{Field, Schema, SchemaRef};
pub use table::Table;
pub use types::{DataType, JoinType, Literal};
