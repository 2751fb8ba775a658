//! Implicit argument coercion.

use flint_common::{FlintError, FlintResult};

use crate::executor::Value;
use crate::types::DataType;

/// Cost of implicitly converting `actual` into `expected`.
///
/// Zero for an exact match, one step per position along the numeric
/// widening chain, one for date to timestamp and for null to any type.
/// Returns `None` when no implicit conversion exists.
pub fn coercion_cost(actual: &DataType, expected: &DataType) -> Option<u32> {
    if actual == expected {
        return Some(0);
    }
    match (actual, expected) {
        (DataType::Null, _) => Some(1),
        (DataType::Date, DataType::Timestamp) => Some(1),
        (DataType::Array(a), DataType::Array(e)) => coercion_cost(a, e),
        (a, e) => {
            let (from, to) = (a.numeric_rank()?, e.numeric_rank()?);
            (from < to).then(|| u32::from(to - from))
        }
    }
}

/// Converts `value` into `target` if an implicit conversion exists.
pub fn coerce_value(value: Value, target: &DataType) -> FlintResult<Value> {
    if value.matches_type(target) {
        return Ok(value);
    }
    let actual = value.data_type();
    match coercion_cost(&actual, target) {
        Some(_) => value.cast(target),
        None => Err(FlintError::type_mismatch(target, actual)),
    }
}
