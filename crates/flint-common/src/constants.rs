//! System-wide constants and defaults.

/// Default number of rows per batch pulled between operators.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Default relative standard deviation for approximate distinct counts.
pub const DEFAULT_APPROX_DISTINCT_RSD: f64 = 0.05;

/// Smallest accepted relative standard deviation for approximate distinct counts.
pub const MIN_APPROX_DISTINCT_RSD: f64 = 0.01;

/// Largest accepted relative standard deviation for approximate distinct counts.
pub const MAX_APPROX_DISTINCT_RSD: f64 = 0.25;

/// Default threshold above which a direct execution is logged as slow, in milliseconds.
pub const DEFAULT_SLOW_QUERY_THRESHOLD_MS: u64 = 1000;

/// Name of the grouping id column appended by grouping-set expansion.
pub const GROUPING_ID_COLUMN: &str = "grouping_id";

/// Name of the position column emitted by positional generators.
pub const GENERATOR_POSITION_COLUMN: &str = "pos";

/// Name of the element column emitted by generators.
pub const GENERATOR_ELEMENT_COLUMN: &str = "col";
