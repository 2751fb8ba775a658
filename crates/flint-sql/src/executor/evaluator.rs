//! Expression evaluator for physical expressions.
//!
//! Evaluates a physical expression against one row. Scalar functions are
//! resolved through the descriptors bound in the `ExecutionContext`, and
//! `current_date` / `current_timestamp` read the context's instant, so
//! every occurrence in one execution agrees.

use std::cmp::Ordering;

use flint_common::{FlintError, FlintResult};

use super::{Row, Value};
use crate::physical::{BinaryOp, ExecutionContext, PhysicalExpr, PhysicalSortExpr, UnaryOp};
use crate::types::DataType;

/// Evaluates a physical expression on a single row.
pub fn evaluate_expr(expr: &PhysicalExpr, row: &Row, ctx: &ExecutionContext) -> FlintResult<Value> {
    match expr {
        PhysicalExpr::Column { name, index } => row.get(*index).cloned().ok_or_else(|| {
            FlintError::malformed(format!(
                "column '{}' at index {} is out of range for a row of width {}",
                name,
                index,
                row.num_columns()
            ))
        }),

        PhysicalExpr::Literal(lit) => Ok(Value::from_literal(lit)),

        PhysicalExpr::BinaryExpr { left, op, right } => {
            let left_val = evaluate_expr(left, row, ctx)?;
            // AND/OR short-circuit on a decided left side
            match (op, left_val.as_bool()) {
                (BinaryOp::And, Some(false)) => return Ok(Value::Boolean(false)),
                (BinaryOp::Or, Some(true)) => return Ok(Value::Boolean(true)),
                _ => {}
            }
            let right_val = evaluate_expr(right, row, ctx)?;
            evaluate_binary_op(op, &left_val, &right_val, ctx.settings.ansi_arithmetic)
        }

        PhysicalExpr::UnaryExpr { op, expr } => {
            let val = evaluate_expr(expr, row, ctx)?;
            evaluate_unary_op(op, &val, ctx.settings.ansi_arithmetic)
        }

        PhysicalExpr::IsNull(expr) => {
            let val = evaluate_expr(expr, row, ctx)?;
            Ok(Value::Boolean(val.is_null()))
        }

        PhysicalExpr::IsNotNull(expr) => {
            let val = evaluate_expr(expr, row, ctx)?;
            Ok(Value::Boolean(!val.is_null()))
        }

        PhysicalExpr::Cast { expr, data_type } => {
            let val = evaluate_expr(expr, row, ctx)?;
            val.cast(data_type)
        }

        PhysicalExpr::Case {
            operand,
            when_then,
            else_result,
        } => evaluate_case(operand.as_deref(), when_then, else_result.as_deref(), row, ctx),

        PhysicalExpr::ScalarFunction { name, args, .. } => {
            let arg_vals = args
                .iter()
                .map(|a| evaluate_expr(a, row, ctx))
                .collect::<FlintResult<Vec<_>>>()?;
            ctx.function(name)?.invoke(arg_vals)
        }

        PhysicalExpr::InList {
            expr,
            list,
            negated,
        } => {
            let val = evaluate_expr(expr, row, ctx)?;
            if val.is_null() {
                return Ok(Value::Null);
            }
            let mut saw_null = false;
            for item in list {
                let item = evaluate_expr(item, row, ctx)?;
                if item.is_null() {
                    saw_null = true;
                } else if item == val {
                    return Ok(Value::Boolean(!*negated));
                }
            }
            if saw_null {
                Ok(Value::Null)
            } else {
                Ok(Value::Boolean(*negated))
            }
        }

        PhysicalExpr::Between {
            expr,
            low,
            high,
            negated,
        } => {
            let val = evaluate_expr(expr, row, ctx)?;
            let low_val = evaluate_expr(low, row, ctx)?;
            let high_val = evaluate_expr(high, row, ctx)?;

            if val.is_null() || low_val.is_null() || high_val.is_null() {
                return Ok(Value::Null);
            }

            let in_range = val >= low_val && val <= high_val;
            Ok(Value::Boolean(if *negated { !in_range } else { in_range }))
        }

        PhysicalExpr::Like {
            expr,
            pattern,
            negated,
            case_insensitive,
        } => {
            let val = evaluate_expr(expr, row, ctx)?;
            let pattern_val = evaluate_expr(pattern, row, ctx)?;

            if val.is_null() || pattern_val.is_null() {
                return Ok(Value::Null);
            }

            let val_str = val.to_string_value().unwrap_or_default();
            let pattern_str = pattern_val.to_string_value().unwrap_or_default();

            let matches = match_like(&val_str, &pattern_str, *case_insensitive);
            Ok(Value::Boolean(if *negated { !matches } else { matches }))
        }

        PhysicalExpr::CurrentDate => Ok(ctx.current_date()),

        PhysicalExpr::CurrentTimestamp => Ok(ctx.current_timestamp()),
    }
}

/// Evaluates a predicate; only TRUE passes, NULL counts as false.
pub fn evaluate_predicate(expr: &PhysicalExpr, row: &Row, ctx: &ExecutionContext) -> FlintResult<bool> {
    let value = evaluate_expr(expr, row, ctx)?;
    match value {
        Value::Boolean(b) => Ok(b),
        Value::Null => Ok(false),
        other => Err(FlintError::type_mismatch(DataType::Boolean, other.data_type())),
    }
}

/// Evaluates a list of expressions into a row.
pub fn evaluate_row(exprs: &[PhysicalExpr], row: &Row, ctx: &ExecutionContext) -> FlintResult<Row> {
    exprs
        .iter()
        .map(|e| evaluate_expr(e, row, ctx))
        .collect::<FlintResult<Vec<_>>>()
        .map(Row::new)
}

/// Evaluates the sort keys of a row.
pub fn evaluate_sort_keys(
    order_by: &[PhysicalSortExpr],
    row: &Row,
    ctx: &ExecutionContext,
) -> FlintResult<Vec<Value>> {
    order_by
        .iter()
        .map(|s| evaluate_expr(&s.expr, row, ctx))
        .collect()
}

/// Compares two evaluated sort keys under the given ordering.
pub fn compare_sort_keys(order_by: &[PhysicalSortExpr], a: &[Value], b: &[Value]) -> Ordering {
    for (i, sort) in order_by.iter().enumerate() {
        let (x, y) = match (a.get(i), b.get(i)) {
            (Some(x), Some(y)) => (x, y),
            _ => break,
        };
        let ordering = match (x.is_null(), y.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => {
                if sort.nulls_first {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, true) => {
                if sort.nulls_first {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (false, false) => {
                if sort.asc {
                    x.cmp(y)
                } else {
                    y.cmp(x)
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Evaluates a binary operation.
///
/// Without `ansi`, integer arithmetic wraps to the result type and a zero
/// divisor yields NULL; with it both are errors.
fn evaluate_binary_op(op: &BinaryOp, left: &Value, right: &Value, ansi: bool) -> FlintResult<Value> {
    match op {
        // Three-valued logic
        BinaryOp::And => Ok(match (truth(left)?, truth(right)?) {
            (Some(false), _) | (_, Some(false)) => Value::Boolean(false),
            (Some(true), Some(true)) => Value::Boolean(true),
            _ => Value::Null,
        }),
        BinaryOp::Or => Ok(match (truth(left)?, truth(right)?) {
            (Some(true), _) | (_, Some(true)) => Value::Boolean(true),
            (Some(false), Some(false)) => Value::Boolean(false),
            _ => Value::Null,
        }),

        _ if left.is_null() || right.is_null() => Ok(Value::Null),

        // Comparison operators
        BinaryOp::Eq => Ok(Value::Boolean(left == right)),
        BinaryOp::NotEq => Ok(Value::Boolean(left != right)),
        BinaryOp::Lt => Ok(Value::Boolean(left < right)),
        BinaryOp::LtEq => Ok(Value::Boolean(left <= right)),
        BinaryOp::Gt => Ok(Value::Boolean(left > right)),
        BinaryOp::GtEq => Ok(Value::Boolean(left >= right)),

        // Arithmetic operators
        BinaryOp::Plus => {
            evaluate_arithmetic(left, right, ansi, i64::overflowing_add, |a, b| a + b)
        }
        BinaryOp::Minus => {
            evaluate_arithmetic(left, right, ansi, i64::overflowing_sub, |a, b| a - b)
        }
        BinaryOp::Multiply => {
            evaluate_arithmetic(left, right, ansi, i64::overflowing_mul, |a, b| a * b)
        }
        BinaryOp::Divide => {
            let l = numeric(left)?;
            let r = numeric(right)?;
            if r == 0.0 {
                return zero_divisor(ansi);
            }
            Ok(Value::Double(l / r))
        }
        BinaryOp::Modulo => {
            if right.to_f64() == Some(0.0) {
                return zero_divisor(ansi);
            }
            evaluate_arithmetic(left, right, ansi, i64::overflowing_rem, |a, b| a % b)
        }

        // String operators
        BinaryOp::Like | BinaryOp::ILike => {
            let val_str = left.to_string_value().unwrap_or_default();
            let pattern_str = right.to_string_value().unwrap_or_default();
            Ok(Value::Boolean(match_like(
                &val_str,
                &pattern_str,
                matches!(op, BinaryOp::ILike),
            )))
        }
        BinaryOp::Concat => {
            let l = left.to_string_value().unwrap_or_default();
            let r = right.to_string_value().unwrap_or_default();
            Ok(Value::String(format!("{}{}", l, r)))
        }

        // Bitwise operators
        BinaryOp::BitwiseAnd => evaluate_bitwise(left, right, |a, b| a & b),
        BinaryOp::BitwiseOr => evaluate_bitwise(left, right, |a, b| a | b),
        BinaryOp::BitwiseXor => evaluate_bitwise(left, right, |a, b| a ^ b),
    }
}

/// Boolean view of a predicate operand; NULL is unknown.
fn truth(value: &Value) -> FlintResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(*b)),
        other => Err(FlintError::type_mismatch(DataType::Boolean, other.data_type())),
    }
}

fn numeric(value: &Value) -> FlintResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| FlintError::type_mismatch("numeric", value.data_type()))
}

fn integral(value: &Value) -> FlintResult<i64> {
    value
        .to_i64()
        .ok_or_else(|| FlintError::type_mismatch("integer", value.data_type()))
}

fn zero_divisor(ansi: bool) -> FlintResult<Value> {
    if ansi {
        Err(FlintError::DivisionByZero)
    } else {
        Ok(Value::Null)
    }
}

/// Narrows an integer result to `data_type`, wrapping unless `ansi`.
fn narrow_integer(value: i64, data_type: &DataType, ansi: bool) -> FlintResult<Value> {
    let narrowed = match data_type {
        DataType::TinyInt => Value::TinyInt(value as i8),
        DataType::SmallInt => Value::SmallInt(value as i16),
        DataType::Int => Value::Int(value as i32),
        _ => Value::BigInt(value),
    };
    if ansi && narrowed.to_i64() != Some(value) {
        return Err(FlintError::invalid_argument(format!(
            "integer overflow: {} does not fit {}",
            value, data_type
        )));
    }
    Ok(narrowed)
}

/// Evaluates arithmetic; the result takes the common supertype of the
/// operand types.
fn evaluate_arithmetic<F, G>(
    left: &Value,
    right: &Value,
    ansi: bool,
    int_op: F,
    float_op: G,
) -> FlintResult<Value>
where
    F: Fn(i64, i64) -> (i64, bool),
    G: Fn(f64, f64) -> f64,
{
    let result_type = left
        .data_type()
        .common_supertype(&right.data_type())
        .filter(DataType::is_numeric)
        .ok_or_else(|| FlintError::type_mismatch(left.data_type(), right.data_type()))?;

    if result_type.is_floating() {
        let value = Value::Double(float_op(numeric(left)?, numeric(right)?));
        return value.cast(&result_type);
    }

    let (result, overflowed) = int_op(integral(left)?, integral(right)?);
    if overflowed && ansi {
        return Err(FlintError::invalid_argument(format!(
            "integer overflow in {} and {}",
            left, right
        )));
    }
    narrow_integer(result, &result_type, ansi)
}

fn evaluate_bitwise<F>(left: &Value, right: &Value, op: F) -> FlintResult<Value>
where
    F: Fn(i64, i64) -> i64,
{
    let result_type = left
        .data_type()
        .common_supertype(&right.data_type())
        .filter(DataType::is_integer)
        .unwrap_or(DataType::BigInt);
    Value::BigInt(op(integral(left)?, integral(right)?)).cast(&result_type)
}

/// Evaluates a unary operation.
fn evaluate_unary_op(op: &UnaryOp, val: &Value, ansi: bool) -> FlintResult<Value> {
    if val.is_null() {
        return Ok(Value::Null);
    }

    let overflow = || FlintError::invalid_argument(format!("integer overflow negating {}", val));
    match op {
        UnaryOp::Not => match val {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            other => Err(FlintError::type_mismatch(DataType::Boolean, other.data_type())),
        },
        UnaryOp::Minus => match val {
            Value::TinyInt(_) | Value::SmallInt(_) | Value::Int(_) | Value::BigInt(_) => {
                let i = integral(val)?;
                if ansi && i == i64::MIN {
                    return Err(overflow());
                }
                narrow_integer(i.wrapping_neg(), &val.data_type(), ansi).map_err(|_| overflow())
            }
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Double(f) => Ok(Value::Double(-f)),
            other => Err(FlintError::type_mismatch("numeric", other.data_type())),
        },
        UnaryOp::Plus => Ok(val.clone()),
        UnaryOp::BitwiseNot => {
            let i = integral(val)?;
            Value::BigInt(!i).cast(&val.data_type())
        }
    }
}

/// Evaluates a CASE expression.
fn evaluate_case(
    operand: Option<&PhysicalExpr>,
    when_then: &[(PhysicalExpr, PhysicalExpr)],
    else_result: Option<&PhysicalExpr>,
    row: &Row,
    ctx: &ExecutionContext,
) -> FlintResult<Value> {
    let operand_val = operand.map(|o| evaluate_expr(o, row, ctx)).transpose()?;

    for (when_expr, then_expr) in when_then {
        let when_val = evaluate_expr(when_expr, row, ctx)?;

        let matches = match operand_val {
            // Simple CASE: compare operand with WHEN values
            Some(ref op_val) => !op_val.is_null() && !when_val.is_null() && when_val == *op_val,
            // Searched CASE: evaluate WHEN as boolean
            None => when_val.as_bool() == Some(true),
        };

        if matches {
            return evaluate_expr(then_expr, row, ctx);
        }
    }

    match else_result {
        Some(else_expr) => evaluate_expr(else_expr, row, ctx),
        None => Ok(Value::Null),
    }
}

/// Matches a value against a SQL LIKE pattern (`%`, `_`, `\` escapes).
fn match_like(value: &str, pattern: &str, case_insensitive: bool) -> bool {
    let (value, pattern) = if case_insensitive {
        (value.to_lowercase(), pattern.to_lowercase())
    } else {
        (value.to_string(), pattern.to_string())
    };

    let value_chars: Vec<char> = value.chars().collect();
    let pattern_chars: Vec<char> = pattern.chars().collect();

    fn matches(v: &[char], p: &[char]) -> bool {
        match p.first() {
            None => v.is_empty(),
            Some('%') => (0..=v.len()).any(|i| matches(&v[i..], &p[1..])),
            Some('_') => !v.is_empty() && matches(&v[1..], &p[1..]),
            Some('\\') if p.len() > 1 => {
                v.first() == Some(&p[1]) && matches(&v[1..], &p[2..])
            }
            Some(c) => v.first() == Some(c) && matches(&v[1..], &p[1..]),
        }
    }

    matches(&value_chars, &pattern_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionRegistry;
    use crate::row;
    use crate::types::Literal;
    use chrono::{TimeZone, Utc};
    use flint_common::ExecutionSettings;

    fn ctx() -> ExecutionContext {
        ExecutionContext::default()
    }

    fn eval(expr: &PhysicalExpr) -> FlintResult<Value> {
        evaluate_expr(expr, &row!["bbb", 2, 1], &ctx())
    }

    fn col(index: usize) -> PhysicalExpr {
        PhysicalExpr::column(format!("c{}", index), index)
    }

    #[test]
    fn test_column_and_literal() {
        assert_eq!(eval(&col(0)).unwrap(), Value::string("bbb"));
        assert_eq!(eval(&PhysicalExpr::lit_i64(7)).unwrap(), Value::int(7));
        assert!(matches!(
            eval(&col(9)),
            Err(FlintError::MalformedPlan { .. })
        ));
    }

    #[test]
    fn test_arithmetic_types() {
        let sum = PhysicalExpr::binary(col(1), BinaryOp::Plus, col(2));
        assert!(matches!(eval(&sum).unwrap(), Value::Int(3)));

        let wide = PhysicalExpr::binary(
            col(1),
            BinaryOp::Multiply,
            PhysicalExpr::literal(Literal::Integer(10_000_000_000)),
        );
        assert!(matches!(eval(&wide).unwrap(), Value::BigInt(20_000_000_000)));

        let div = PhysicalExpr::binary(col(1), BinaryOp::Divide, PhysicalExpr::lit_i64(4));
        assert_eq!(eval(&div).unwrap(), Value::double(0.5));

        let float = PhysicalExpr::binary(
            col(1),
            BinaryOp::Minus,
            PhysicalExpr::literal(Literal::Float(0.5)),
        );
        assert_eq!(eval(&float).unwrap(), Value::double(1.5));
    }

    fn ansi_eval(expr: &PhysicalExpr) -> FlintResult<Value> {
        let settings = ExecutionSettings {
            ansi_arithmetic: true,
            ..ExecutionSettings::default()
        };
        let ctx = ExecutionContext::new(settings, Utc::now());
        evaluate_expr(expr, &row!["bbb", 2, 1], &ctx)
    }

    #[test]
    fn test_division_by_zero_is_null() {
        let div = PhysicalExpr::binary(
            PhysicalExpr::lit_i64(1),
            BinaryOp::Divide,
            PhysicalExpr::lit_i64(0),
        );
        assert_eq!(eval(&div).unwrap(), Value::Null);
        let rem = PhysicalExpr::binary(
            PhysicalExpr::lit_i64(5),
            BinaryOp::Modulo,
            PhysicalExpr::lit_i64(0),
        );
        assert_eq!(eval(&rem).unwrap(), Value::Null);
        let float_rem = PhysicalExpr::binary(
            PhysicalExpr::literal(Literal::Float(5.5)),
            BinaryOp::Modulo,
            PhysicalExpr::literal(Literal::Float(0.0)),
        );
        assert_eq!(eval(&float_rem).unwrap(), Value::Null);
    }

    #[test]
    fn test_ansi_division_by_zero() {
        let div = PhysicalExpr::binary(col(1), BinaryOp::Divide, PhysicalExpr::lit_i64(0));
        assert!(matches!(ansi_eval(&div), Err(FlintError::DivisionByZero)));
        let rem = PhysicalExpr::binary(col(1), BinaryOp::Modulo, PhysicalExpr::lit_i64(0));
        assert!(matches!(ansi_eval(&rem), Err(FlintError::DivisionByZero)));
    }

    #[test]
    fn test_integer_overflow_wraps() {
        let int_max = PhysicalExpr::literal(Literal::Integer(i32::MAX as i64));
        let sum = PhysicalExpr::binary(int_max, BinaryOp::Plus, PhysicalExpr::lit_i64(1));
        assert!(matches!(eval(&sum).unwrap(), Value::Int(i32::MIN)));

        let big_max = PhysicalExpr::literal(Literal::Integer(i64::MAX));
        let sum = PhysicalExpr::binary(big_max, BinaryOp::Plus, PhysicalExpr::lit_i64(1));
        assert!(matches!(eval(&sum).unwrap(), Value::BigInt(i64::MIN)));

        let int_min = PhysicalExpr::literal(Literal::Integer(i32::MIN as i64));
        let neg = PhysicalExpr::unary(UnaryOp::Minus, int_min);
        assert!(matches!(eval(&neg).unwrap(), Value::Int(i32::MIN)));
    }

    #[test]
    fn test_ansi_integer_overflow() {
        let int_max = PhysicalExpr::literal(Literal::Integer(i32::MAX as i64));
        let sum = PhysicalExpr::binary(int_max, BinaryOp::Plus, PhysicalExpr::lit_i64(1));
        assert!(matches!(
            ansi_eval(&sum),
            Err(FlintError::InvalidArgument { .. })
        ));

        let big_max = PhysicalExpr::literal(Literal::Integer(i64::MAX));
        let sum = PhysicalExpr::binary(big_max, BinaryOp::Plus, PhysicalExpr::lit_i64(1));
        assert!(matches!(
            ansi_eval(&sum),
            Err(FlintError::InvalidArgument { .. })
        ));
        assert!(matches!(
            ansi_eval(&PhysicalExpr::binary(col(1), BinaryOp::Plus, col(2))).unwrap(),
            Value::Int(3)
        ));
    }

    #[test]
    fn test_three_valued_logic() {
        let null = PhysicalExpr::null();
        let t = PhysicalExpr::lit_bool(true);
        let f = PhysicalExpr::lit_bool(false);

        let and_null = PhysicalExpr::binary(null.clone(), BinaryOp::And, t.clone());
        assert!(eval(&and_null).unwrap().is_null());
        let and_false = PhysicalExpr::binary(null.clone(), BinaryOp::And, f.clone());
        assert_eq!(eval(&and_false).unwrap(), Value::boolean(false));
        let or_true = PhysicalExpr::binary(null.clone(), BinaryOp::Or, t);
        assert_eq!(eval(&or_true).unwrap(), Value::boolean(true));

        let cmp = PhysicalExpr::binary(null, BinaryOp::Eq, PhysicalExpr::lit_i64(1));
        assert!(eval(&cmp).unwrap().is_null());
        assert!(!evaluate_predicate(&cmp, &row![1], &ctx()).unwrap());
    }

    #[test]
    fn test_in_list_and_between() {
        let in_list = PhysicalExpr::InList {
            expr: Box::new(col(1)),
            list: vec![PhysicalExpr::lit_i64(1), PhysicalExpr::lit_i64(2)],
            negated: false,
        };
        assert_eq!(eval(&in_list).unwrap(), Value::boolean(true));

        let not_in_with_null = PhysicalExpr::InList {
            expr: Box::new(col(1)),
            list: vec![PhysicalExpr::lit_i64(5), PhysicalExpr::null()],
            negated: true,
        };
        assert!(eval(&not_in_with_null).unwrap().is_null());

        let between = PhysicalExpr::Between {
            expr: Box::new(col(1)),
            low: Box::new(PhysicalExpr::lit_i64(2)),
            high: Box::new(PhysicalExpr::lit_i64(4)),
            negated: false,
        };
        assert_eq!(eval(&between).unwrap(), Value::boolean(true));
    }

    #[test]
    fn test_like() {
        assert!(match_like("hyf_test", "hyf%", false));
        assert!(match_like("abc", "a_c", false));
        assert!(!match_like("abc", "a_", false));
        assert!(match_like("ABC", "a%", true));
        assert!(match_like("50%", "50\\%", false));
        assert!(!match_like("500", "50\\%", false));
    }

    #[test]
    fn test_case() {
        let case = PhysicalExpr::Case {
            operand: Some(Box::new(col(2))),
            when_then: vec![
                (PhysicalExpr::lit_i64(0), PhysicalExpr::lit_str("f")),
                (PhysicalExpr::lit_i64(1), PhysicalExpr::lit_str("m")),
            ],
            else_result: None,
        };
        assert_eq!(eval(&case).unwrap(), Value::string("m"));
    }

    #[test]
    fn test_scalar_function_requires_binding() {
        let upper = PhysicalExpr::function("upper", vec![col(0)], DataType::Text);
        assert!(matches!(
            eval(&upper),
            Err(FlintError::UnresolvedFunction { .. })
        ));

        let mut ctx = ctx();
        let registry = FunctionRegistry::with_builtins();
        ctx.bind_function("upper", registry.get("upper").unwrap());
        let value = evaluate_expr(&upper, &row!["bbb"], &ctx).unwrap();
        assert_eq!(value, Value::string("BBB"));
    }

    #[test]
    fn test_current_time_uses_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 1, 2, 3).unwrap();
        let ctx = ExecutionContext::new(ExecutionSettings::default(), instant);
        let now = evaluate_expr(&PhysicalExpr::CurrentTimestamp, &Row::empty(), &ctx).unwrap();
        assert_eq!(now, Value::timestamp(instant));
        let today = evaluate_expr(&PhysicalExpr::CurrentDate, &Row::empty(), &ctx).unwrap();
        assert_eq!(today.to_string(), "2024-03-15");
    }

    #[test]
    fn test_compare_sort_keys() {
        let asc = vec![PhysicalSortExpr::asc(col(0))];
        let desc = vec![PhysicalSortExpr::desc(col(0))];
        let null = [Value::Null];
        let one = [Value::int(1)];
        let two = [Value::bigint(2)];

        assert_eq!(compare_sort_keys(&asc, &null, &one), Ordering::Less);
        assert_eq!(compare_sort_keys(&asc, &one, &two), Ordering::Less);
        assert_eq!(compare_sort_keys(&desc, &null, &one), Ordering::Greater);
        assert_eq!(compare_sort_keys(&desc, &one, &two), Ordering::Greater);
        assert_eq!(compare_sort_keys(&asc, &one, &one), Ordering::Equal);
    }
}
