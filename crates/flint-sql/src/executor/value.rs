//! Runtime values for query execution.
//!
//! This module defines the `Value` type which represents runtime SQL values
//! during query execution.
//!
//! Equality and hashing treat the numeric family as one domain: `Int(10)`,
//! `BigInt(10)` and `Double(10.0)` are equal and hash identically, so they
//! land in the same group, join bucket or union slot. `Null` equals `Null`
//! here; predicates apply three-valued logic on top of this in the evaluator.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use flint_common::{FlintError, FlintResult};

use crate::types::{DataType, Literal};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Microseconds in one day.
pub const MICROS_PER_DAY: i64 = 86_400_000_000;

/// A runtime value during query execution.
#[derive(Debug, Clone)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 8-bit signed integer.
    TinyInt(i8),
    /// 16-bit signed integer.
    SmallInt(i16),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    BigInt(i64),
    /// 32-bit floating point.
    Float(f32),
    /// 64-bit floating point.
    Double(f64),
    /// String value.
    String(String),
    /// Date (days since epoch).
    Date(i32),
    /// Timestamp (microseconds since epoch, UTC).
    Timestamp(i64),
    /// Array of values.
    Array(Vec<Value>),
}

impl Value {
    /// Creates a NULL value.
    pub fn null() -> Self {
        Value::Null
    }

    /// Creates a boolean value.
    pub fn boolean(v: bool) -> Self {
        Value::Boolean(v)
    }

    /// Creates an integer value.
    pub fn int(v: i32) -> Self {
        Value::Int(v)
    }

    /// Creates a bigint value.
    pub fn bigint(v: i64) -> Self {
        Value::BigInt(v)
    }

    /// Creates a double value.
    pub fn double(v: f64) -> Self {
        Value::Double(v)
    }

    /// Creates a string value.
    pub fn string(v: impl Into<String>) -> Self {
        Value::String(v.into())
    }

    /// Creates an array value.
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(values)
    }

    /// Creates a timestamp value from a UTC instant.
    pub fn timestamp(instant: DateTime<Utc>) -> Self {
        Value::Timestamp(instant.timestamp_micros())
    }

    /// Creates a date value from a calendar date.
    pub fn date(date: NaiveDate) -> Self {
        Value::Date(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value belongs to the numeric family.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::TinyInt(_)
                | Value::SmallInt(_)
                | Value::Int(_)
                | Value::BigInt(_)
                | Value::Float(_)
                | Value::Double(_)
        )
    }

    /// Returns the boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is an array value.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Converts an integer-family value to an i64.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(i) => Some(*i as i64),
            Value::SmallInt(i) => Some(*i as i64),
            Value::Int(i) => Some(*i as i64),
            Value::BigInt(i) => Some(*i),
            _ => None,
        }
    }

    /// Converts a numeric value to an f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::TinyInt(i) => Some(*i as f64),
            Value::SmallInt(i) => Some(*i as f64),
            Value::Int(i) => Some(*i as f64),
            Value::BigInt(i) => Some(*i as f64),
            Value::Float(f) => Some(*f as f64),
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Converts this value to its string rendering.
    pub fn to_string_value(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Returns the calendar date of a date value.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => {
                NaiveDate::from_num_days_from_ce_opt(d.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
            }
            Value::Timestamp(t) => timestamp_from_micros(*t).map(|dt| dt.date_naive()),
            _ => None,
        }
    }

    /// Returns the UTC instant of a timestamp or date value.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => timestamp_from_micros(*t),
            Value::Date(d) => timestamp_from_micros((*d as i64).checked_mul(MICROS_PER_DAY)?),
            _ => None,
        }
    }

    /// Returns the data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Boolean(_) => DataType::Boolean,
            Value::TinyInt(_) => DataType::TinyInt,
            Value::SmallInt(_) => DataType::SmallInt,
            Value::Int(_) => DataType::Int,
            Value::BigInt(_) => DataType::BigInt,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::String(_) => DataType::Text,
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Array(values) => {
                let element = values
                    .iter()
                    .find(|v| !v.is_null())
                    .map(Value::data_type)
                    .unwrap_or(DataType::Null);
                DataType::array(element)
            }
        }
    }

    /// Returns true if this value may be stored in a column of `data_type`.
    ///
    /// NULL fits every type; no implicit widening is applied.
    pub fn matches_type(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Value::Null, _) => true,
            (Value::Array(values), DataType::Array(element)) => {
                values.iter().all(|v| v.matches_type(element))
            }
            (Value::Array(_), _) => false,
            (v, t) => &v.data_type() == t,
        }
    }

    /// Casts this value to the specified type.
    pub fn cast(&self, target: &DataType) -> FlintResult<Value> {
        if self.is_null() || target == &DataType::Null {
            return Ok(Value::Null);
        }
        if self.matches_type(target) {
            return Ok(self.clone());
        }

        let fail = || FlintError::Cast {
            value: self.to_string(),
            target: target.to_string(),
        };

        match target {
            DataType::Null => Ok(Value::Null),
            DataType::Boolean => match self {
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "t" | "yes" | "y" | "1" => Ok(Value::Boolean(true)),
                    "false" | "f" | "no" | "n" | "0" => Ok(Value::Boolean(false)),
                    _ => Err(fail()),
                },
                v => v
                    .to_f64()
                    .map(|f| Value::Boolean(f != 0.0))
                    .ok_or_else(fail),
            },
            DataType::TinyInt => self
                .cast_integral()
                .and_then(|i| i8::try_from(i).ok())
                .map(Value::TinyInt)
                .ok_or_else(fail),
            DataType::SmallInt => self
                .cast_integral()
                .and_then(|i| i16::try_from(i).ok())
                .map(Value::SmallInt)
                .ok_or_else(fail),
            DataType::Int => self
                .cast_integral()
                .and_then(|i| i32::try_from(i).ok())
                .map(Value::Int)
                .ok_or_else(fail),
            DataType::BigInt => self.cast_integral().map(Value::BigInt).ok_or_else(fail),
            DataType::Float => self
                .cast_floating()
                .map(|f| Value::Float(f as f32))
                .ok_or_else(fail),
            DataType::Double => self.cast_floating().map(Value::Double).ok_or_else(fail),
            DataType::Text => Ok(Value::String(self.to_string())),
            DataType::Date => match self {
                Value::String(s) => parse_date(s).map(Value::date).ok_or_else(fail),
                Value::Timestamp(t) => Ok(Value::Date(t.div_euclid(MICROS_PER_DAY) as i32)),
                _ => Err(fail()),
            },
            DataType::Timestamp => match self {
                Value::String(s) => parse_timestamp(s).map(Value::Timestamp).ok_or_else(fail),
                Value::Date(d) => Ok(Value::Timestamp(*d as i64 * MICROS_PER_DAY)),
                _ => Err(fail()),
            },
            DataType::Array(element) => match self {
                Value::Array(values) => values
                    .iter()
                    .map(|v| v.cast(element))
                    .collect::<FlintResult<Vec<_>>>()
                    .map(Value::Array),
                _ => Err(fail()),
            },
        }
    }

    fn cast_integral(&self) -> Option<i64> {
        match self {
            Value::Boolean(b) => Some(i64::from(*b)),
            Value::Float(_) | Value::Double(_) => {
                let f = self.to_f64()?;
                if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Some(f.trunc() as i64)
                } else {
                    None
                }
            }
            Value::String(s) => s.trim().parse().ok(),
            v => v.to_i64(),
        }
    }

    fn cast_floating(&self) -> Option<f64> {
        match self {
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse().ok(),
            v => v.to_f64(),
        }
    }

    /// Creates a Value from a Literal.
    ///
    /// Integer literals become `Int` when they fit in 32 bits.
    pub fn from_literal(lit: &Literal) -> Self {
        match lit {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Integer(i) => match i32::try_from(*i) {
                Ok(small) => Value::Int(small),
                Err(_) => Value::BigInt(*i),
            },
            Literal::Float(f) => Value::Double(*f),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Date(d) => Value::Date(*d),
            Literal::Timestamp(t) => Value::Timestamp(*t),
        }
    }

    /// Order of value kinds when comparing values of unrelated types.
    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::TinyInt(_)
            | Value::SmallInt(_)
            | Value::Int(_)
            | Value::BigInt(_)
            | Value::Float(_)
            | Value::Double(_) => 2,
            Value::String(_) => 3,
            Value::Date(_) => 4,
            Value::Timestamp(_) => 5,
            Value::Array(_) => 6,
        }
    }
}

fn timestamp_from_micros(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(micros)
}

/// Parses `YYYY-MM-DD`.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parses `YYYY-MM-DD[ HH:MM:SS[.f]]` (also with a `T` separator) into epoch micros.
pub(crate) fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_micros());
        }
    }
    parse_date(s)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_micros())
}

/// Numeric view used by equality, ordering and hashing.
enum Numeric {
    Integral(i64),
    Fractional(f64),
}

impl Numeric {
    fn of(value: &Value) -> Option<Numeric> {
        match value {
            Value::Float(_) | Value::Double(_) => {
                let f = value.to_f64()?;
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Some(Numeric::Integral(f as i64))
                } else {
                    Some(Numeric::Fractional(f))
                }
            }
            v => v.to_i64().map(Numeric::Integral),
        }
    }

    fn cmp(&self, other: &Numeric) -> Ordering {
        match (self, other) {
            (Numeric::Integral(a), Numeric::Integral(b)) => a.cmp(b),
            (Numeric::Integral(i), Numeric::Fractional(f)) => cmp_integral_fractional(*i, *f),
            (Numeric::Fractional(f), Numeric::Integral(i)) => {
                cmp_integral_fractional(*i, *f).reverse()
            }
            (Numeric::Fractional(x), Numeric::Fractional(y)) => match (x.is_nan(), y.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            },
        }
    }
}

/// Compares without rounding `i` through f64. A fractional never equals an
/// integral, which keeps `Eq` and `Hash` consistent.
fn cmp_integral_fractional(i: i64, f: f64) -> Ordering {
    // 2^63, the first f64 above every i64
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= I64_BOUND {
        return Ordering::Less;
    }
    if f < -I64_BOUND {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        ordering => ordering,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // NULL is considered less than any non-NULL value
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,

            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),

            (a, b) => match (Numeric::of(a), Numeric::of(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.kind_rank().cmp(&b.kind_rank()),
            },
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind_rank().hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::String(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Array(values) => values.hash(state),
            numeric => match Numeric::of(numeric) {
                Some(Numeric::Integral(i)) => i.hash(state),
                Some(Numeric::Fractional(f)) if f.is_nan() => f64::NAN.to_bits().hash(state),
                Some(Numeric::Fractional(f)) => f.to_bits().hash(state),
                None => {}
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::TinyInt(i) => write!(f, "{}", i),
            Value::SmallInt(i) => write!(f, "{}", i),
            Value::Int(i) => write!(f, "{}", i),
            Value::BigInt(i) => write!(f, "{}", i),
            Value::Float(v) => write_floating(f, *v as f64),
            Value::Double(v) => write_floating(f, *v),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => match self.to_naive_date() {
                Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
                None => write!(f, "date:{}", d),
            },
            Value::Timestamp(t) => match self.to_datetime() {
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
                None => write!(f, "ts:{}", t),
            },
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Renders floating values with a fractional part, e.g. `3.0`.
fn write_floating(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        write!(f, "NaN")
    } else if v.is_infinite() {
        write!(f, "{}", if v > 0.0 { "Infinity" } else { "-Infinity" })
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        write!(f, "{:.1}", v)
    } else {
        write!(f, "{}", v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
