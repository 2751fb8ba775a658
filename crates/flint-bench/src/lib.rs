//! flint performance benchmarks
//!
//! This crate contains benchmarks for the direct execution engine:
//! - Scans, filters and projections
//! - Hash aggregation, including approximate distinct counts
//! - Hash joins
//! - Sorting and top-K selection
//! - Concurrent sessions
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench -p flint-bench
//! ```

pub mod utils;
