//! Aggregate accumulators.
//!
//! One `Accumulator` holds the running state of one aggregate for one
//! group (or one window partition). NULL inputs are skipped by every
//! function except `count(*)`.

use std::collections::HashSet;
use std::fmt;
use std::hash::BuildHasher;

use flint_common::{ExecutionSettings, FlintError, FlintResult};
use hyperloglogplus::{HyperLogLog, HyperLogLogPlus};
use siphasher::sip::SipHasher13;

use super::Value;
use crate::physical::{AggregateFunc, PhysicalAggregateExpr};
use crate::schema::Schema;
use crate::types::DataType;

const SKETCH_KEY_0: u64 = 0x5a8c_21f0_9d4e_7b13;
const SKETCH_KEY_1: u64 = 0x0e61_b3d7_4c92_a85f;

/// Fixed-key SipHash-1-3 so sketches are reproducible across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SketchHasher;

impl BuildHasher for SketchHasher {
    type Hasher = SipHasher13;

    fn build_hasher(&self) -> SipHasher13 {
        SipHasher13::new_with_keys(SKETCH_KEY_0, SKETCH_KEY_1)
    }
}

/// HyperLogLog++ sketch for `approx_count_distinct`.
pub struct DistinctSketch {
    precision: u8,
    hll: HyperLogLogPlus<Value, SketchHasher>,
}

impl DistinctSketch {
    /// Creates an empty sketch with `2^precision` registers.
    pub fn new(precision: u8) -> FlintResult<Self> {
        let hll = HyperLogLogPlus::new(precision, SketchHasher).map_err(|e| {
            FlintError::invalid_argument(format!(
                "invalid sketch precision {}: {:?}",
                precision, e
            ))
        })?;
        Ok(Self { precision, hll })
    }

    /// Adds a value.
    pub fn insert(&mut self, value: &Value) {
        self.hll.insert(value);
    }

    /// Returns the estimated number of distinct values.
    pub fn estimate(&mut self) -> i64 {
        self.hll.count().round() as i64
    }
}

impl fmt::Debug for DistinctSketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistinctSketch")
            .field("precision", &self.precision)
            .finish_non_exhaustive()
    }
}

/// Accumulator for aggregate functions.
#[derive(Debug)]
pub struct Accumulator {
    /// The aggregate function.
    func: AggregateFunc,
    /// Values already seen, when DISTINCT.
    seen: Option<HashSet<Value>>,
    /// Accumulated state.
    state: AccumulatorState,
}

/// State for different aggregate functions.
#[derive(Debug)]
enum AccumulatorState {
    Count(i64),
    /// Integer sum; wraps on overflow unless `ansi`.
    SumInt { sum: Option<i64>, ansi: bool },
    SumFloat(Option<f64>),
    Avg { sum: f64, count: i64 },
    Min(Option<Value>),
    Max(Option<Value>),
    First(Option<Value>),
    Last(Option<Value>),
    BoolAnd(Option<bool>),
    BoolOr(Option<bool>),
    CollectList(Vec<Value>),
    ApproxDistinct(Box<DistinctSketch>),
}

impl Accumulator {
    /// Creates an accumulator for an aggregate expression over `input`.
    pub fn try_new(
        agg: &PhysicalAggregateExpr,
        input: &Schema,
        settings: &ExecutionSettings,
    ) -> FlintResult<Self> {
        let arg_type = agg
            .args
            .first()
            .map(|arg| arg.data_type(input))
            .unwrap_or(DataType::Null);
        Self::for_function(agg.func, agg.distinct, &arg_type, settings)
    }

    /// Creates an accumulator for `func` over an argument of `arg_type`.
    pub fn for_function(
        func: AggregateFunc,
        distinct: bool,
        arg_type: &DataType,
        settings: &ExecutionSettings,
    ) -> FlintResult<Self> {
        Ok(Self {
            func,
            seen: (distinct && func != AggregateFunc::CountStar).then(HashSet::new),
            state: Self::initial_state(func, arg_type, settings)?,
        })
    }

    fn initial_state(
        func: AggregateFunc,
        arg_type: &DataType,
        settings: &ExecutionSettings,
    ) -> FlintResult<AccumulatorState> {
        Ok(match func {
            AggregateFunc::Count | AggregateFunc::CountStar => AccumulatorState::Count(0),
            AggregateFunc::Sum if arg_type.is_integer() => AccumulatorState::SumInt {
                sum: None,
                ansi: settings.ansi_arithmetic,
            },
            AggregateFunc::Sum => AccumulatorState::SumFloat(None),
            AggregateFunc::Avg => AccumulatorState::Avg { sum: 0.0, count: 0 },
            AggregateFunc::Min => AccumulatorState::Min(None),
            AggregateFunc::Max => AccumulatorState::Max(None),
            AggregateFunc::First => AccumulatorState::First(None),
            AggregateFunc::Last => AccumulatorState::Last(None),
            AggregateFunc::BoolAnd => AccumulatorState::BoolAnd(None),
            AggregateFunc::BoolOr => AccumulatorState::BoolOr(None),
            AggregateFunc::CollectList => AccumulatorState::CollectList(Vec::new()),
            AggregateFunc::ApproxCountDistinct => AccumulatorState::ApproxDistinct(Box::new(
                DistinctSketch::new(settings.hll_precision())?,
            )),
        })
    }

    /// Returns the aggregate function.
    pub fn func(&self) -> AggregateFunc {
        self.func
    }

    /// Accumulates one row's evaluated arguments.
    pub fn update(&mut self, args: &[Value]) -> FlintResult<()> {
        if self.func == AggregateFunc::CountStar {
            if let AccumulatorState::Count(count) = &mut self.state {
                *count += 1;
            }
            return Ok(());
        }

        // count(a, b) counts rows where every argument is non-null
        if args.is_empty() || args.iter().any(Value::is_null) {
            return Ok(());
        }
        let value = match args {
            [single] => single.clone(),
            many => Value::Array(many.to_vec()),
        };

        if let Some(seen) = &mut self.seen {
            if !seen.insert(value.clone()) {
                return Ok(());
            }
        }
        self.accumulate(value)
    }

    fn accumulate(&mut self, value: Value) -> FlintResult<()> {
        match &mut self.state {
            AccumulatorState::Count(count) => {
                *count += 1;
            }
            AccumulatorState::SumInt { sum, ansi } => {
                let v = value
                    .to_i64()
                    .ok_or_else(|| FlintError::type_mismatch(DataType::BigInt, value.data_type()))?;
                let (total, overflowed) = sum.unwrap_or(0).overflowing_add(v);
                if overflowed && *ansi {
                    return Err(FlintError::invalid_argument("integer overflow in sum"));
                }
                *sum = Some(total);
            }
            AccumulatorState::SumFloat(sum) => {
                let v = numeric(&value)?;
                *sum = Some(sum.unwrap_or(0.0) + v);
            }
            AccumulatorState::Avg { sum, count } => {
                *sum += numeric(&value)?;
                *count += 1;
            }
            AccumulatorState::Min(min) => {
                if min.as_ref().map_or(true, |current| &value < current) {
                    *min = Some(value);
                }
            }
            AccumulatorState::Max(max) => {
                if max.as_ref().map_or(true, |current| &value > current) {
                    *max = Some(value);
                }
            }
            AccumulatorState::First(first) => {
                if first.is_none() {
                    *first = Some(value);
                }
            }
            AccumulatorState::Last(last) => {
                *last = Some(value);
            }
            AccumulatorState::BoolAnd(result) => {
                let b = boolean(&value)?;
                *result = Some(result.unwrap_or(true) && b);
            }
            AccumulatorState::BoolOr(result) => {
                let b = boolean(&value)?;
                *result = Some(result.unwrap_or(false) || b);
            }
            AccumulatorState::CollectList(values) => values.push(value),
            AccumulatorState::ApproxDistinct(sketch) => sketch.insert(&value),
        }
        Ok(())
    }

    /// Returns the current result.
    pub fn result(&mut self) -> Value {
        match &mut self.state {
            AccumulatorState::Count(count) => Value::BigInt(*count),
            AccumulatorState::SumInt { sum, .. } => sum.map(Value::BigInt).unwrap_or(Value::Null),
            AccumulatorState::SumFloat(sum) => sum.map(Value::Double).unwrap_or(Value::Null),
            AccumulatorState::Avg { sum, count } => {
                if *count == 0 {
                    Value::Null
                } else {
                    Value::Double(*sum / *count as f64)
                }
            }
            AccumulatorState::Min(v)
            | AccumulatorState::Max(v)
            | AccumulatorState::First(v)
            | AccumulatorState::Last(v) => v.clone().unwrap_or(Value::Null),
            AccumulatorState::BoolAnd(result) | AccumulatorState::BoolOr(result) => {
                result.map(Value::Boolean).unwrap_or(Value::Null)
            }
            AccumulatorState::CollectList(values) => Value::Array(values.clone()),
            AccumulatorState::ApproxDistinct(sketch) => Value::BigInt(sketch.estimate()),
        }
    }

    /// Resets the accumulator.
    pub fn reset(&mut self) -> FlintResult<()> {
        if let Some(seen) = &mut self.seen {
            seen.clear();
        }
        match &mut self.state {
            AccumulatorState::Count(count) => *count = 0,
            AccumulatorState::SumInt { sum, .. } => *sum = None,
            AccumulatorState::SumFloat(sum) => *sum = None,
            AccumulatorState::Avg { sum, count } => {
                *sum = 0.0;
                *count = 0;
            }
            AccumulatorState::Min(v)
            | AccumulatorState::Max(v)
            | AccumulatorState::First(v)
            | AccumulatorState::Last(v) => *v = None,
            AccumulatorState::BoolAnd(result) | AccumulatorState::BoolOr(result) => *result = None,
            AccumulatorState::CollectList(values) => values.clear(),
            AccumulatorState::ApproxDistinct(sketch) => {
                **sketch = DistinctSketch::new(sketch.precision)?;
            }
        }
        Ok(())
    }
}

fn numeric(value: &Value) -> FlintResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| FlintError::type_mismatch(DataType::Double, value.data_type()))
}

fn boolean(value: &Value) -> FlintResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| FlintError::type_mismatch(DataType::Boolean, value.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(func: AggregateFunc, arg_type: DataType) -> Accumulator {
        Accumulator::for_function(func, false, &arg_type, &ExecutionSettings::default()).unwrap()
    }

    fn feed(acc: &mut Accumulator, values: Vec<Value>) -> Value {
        for v in values {
            acc.update(&[v]).unwrap();
        }
        acc.result()
    }

    #[test]
    fn test_count_skips_nulls() {
        let mut count = acc(AggregateFunc::Count, DataType::Int);
        let result = feed(&mut count, vec![Value::int(1), Value::Null, Value::int(3)]);
        assert_eq!(result, Value::bigint(2));

        let mut star = acc(AggregateFunc::CountStar, DataType::Null);
        star.update(&[]).unwrap();
        star.update(&[]).unwrap();
        assert_eq!(star.result(), Value::bigint(2));
    }

    #[test]
    fn test_sum_types() {
        let mut int_sum = acc(AggregateFunc::Sum, DataType::Int);
        let result = feed(&mut int_sum, vec![Value::int(2), Value::int(3)]);
        assert!(matches!(result, Value::BigInt(5)));

        let mut float_sum = acc(AggregateFunc::Sum, DataType::Double);
        let result = feed(&mut float_sum, vec![Value::double(1.5), Value::double(2.0)]);
        assert!(matches!(result, Value::Double(f) if f == 3.5));

        let mut empty = acc(AggregateFunc::Sum, DataType::Int);
        assert!(empty.result().is_null());
    }

    #[test]
    fn test_sum_overflow_wraps() {
        let mut sum = acc(AggregateFunc::Sum, DataType::BigInt);
        let result = feed(&mut sum, vec![Value::bigint(i64::MAX), Value::bigint(1)]);
        assert!(matches!(result, Value::BigInt(i64::MIN)));
    }

    #[test]
    fn test_ansi_sum_overflow() {
        let settings = ExecutionSettings {
            ansi_arithmetic: true,
            ..ExecutionSettings::default()
        };
        let mut sum =
            Accumulator::for_function(AggregateFunc::Sum, false, &DataType::BigInt, &settings)
                .unwrap();
        sum.update(&[Value::bigint(i64::MAX)]).unwrap();
        assert!(sum.update(&[Value::bigint(1)]).is_err());
    }

    #[test]
    fn test_avg_min_max() {
        let values = vec![Value::int(2), Value::int(4), Value::Null, Value::int(9)];
        assert_eq!(
            feed(&mut acc(AggregateFunc::Avg, DataType::Int), values.clone()),
            Value::double(5.0)
        );
        assert_eq!(
            feed(&mut acc(AggregateFunc::Min, DataType::Int), values.clone()),
            Value::int(2)
        );
        assert_eq!(
            feed(&mut acc(AggregateFunc::Max, DataType::Int), values),
            Value::int(9)
        );
    }

    #[test]
    fn test_first_last_collect() {
        let values = vec![Value::string("a"), Value::string("b"), Value::string("c")];
        assert_eq!(
            feed(&mut acc(AggregateFunc::First, DataType::Text), values.clone()),
            Value::string("a")
        );
        assert_eq!(
            feed(&mut acc(AggregateFunc::Last, DataType::Text), values.clone()),
            Value::string("c")
        );
        assert_eq!(
            feed(&mut acc(AggregateFunc::CollectList, DataType::Text), values)
                .to_string(),
            "[a, b, c]"
        );
    }

    #[test]
    fn test_bool_aggregates() {
        let values = vec![Value::boolean(true), Value::boolean(false)];
        assert_eq!(
            feed(&mut acc(AggregateFunc::BoolAnd, DataType::Boolean), values.clone()),
            Value::boolean(false)
        );
        assert_eq!(
            feed(&mut acc(AggregateFunc::BoolOr, DataType::Boolean), values),
            Value::boolean(true)
        );
        let mut bad = acc(AggregateFunc::BoolAnd, DataType::Int);
        assert!(matches!(
            bad.update(&[Value::int(1)]),
            Err(FlintError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_distinct() {
        let mut count = Accumulator::for_function(
            AggregateFunc::Count,
            true,
            &DataType::Int,
            &ExecutionSettings::default(),
        )
        .unwrap();
        let result = feed(
            &mut count,
            vec![Value::int(1), Value::bigint(1), Value::int(2), Value::Null],
        );
        assert_eq!(result, Value::bigint(2));
    }

    #[test]
    fn test_approx_count_distinct() {
        let mut approx = acc(AggregateFunc::ApproxCountDistinct, DataType::Int);
        for i in 0..1000 {
            approx.update(&[Value::int(i % 100)]).unwrap();
        }
        let estimate = approx.result().to_i64().unwrap();
        assert!((95..=105).contains(&estimate), "estimate {}", estimate);

        let mut empty = acc(AggregateFunc::ApproxCountDistinct, DataType::Int);
        assert_eq!(empty.result(), Value::bigint(0));
    }

    #[test]
    fn test_reset() {
        let mut sum = acc(AggregateFunc::Sum, DataType::Int);
        sum.update(&[Value::int(3)]).unwrap();
        sum.reset().unwrap();
        assert!(sum.result().is_null());
        sum.update(&[Value::int(4)]).unwrap();
        assert_eq!(sum.result(), Value::bigint(4));
    }
}
