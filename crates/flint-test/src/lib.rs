//! # flint-test
//!
//! Integration tests for flint.
//!
//! This crate contains:
//! - Fixture tables and physical plans shared by the integration tests
//! - A lookup-table planner standing in for an external SQL planner
//! - Logging setup for test runs

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Fixture tables and plans
pub mod fixtures;

/// SQL-text to plan lookup
pub mod planner;

pub use planner::LookupPlanner;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs a test subscriber honoring `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
