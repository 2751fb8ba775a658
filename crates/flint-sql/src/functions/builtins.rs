//! Built-in scalar functions.
//!
//! Built-ins go through the same overload resolution as user functions.
//! Most are null-strict: any NULL argument yields NULL without invoking the
//! body.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Datelike;
use flint_common::UdfError;
use parking_lot::Mutex;
use regex::Regex;

use super::{FunctionRegistry, Overload, ParamType, ReturnType, Signature};
use crate::executor::Value;
use crate::types::DataType;

type UdfResult = Result<Value, UdfError>;

/// Builds a registry holding every built-in function.
pub fn builtin_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    register_string_functions(&mut registry);
    register_math_functions(&mut registry);
    register_null_functions(&mut registry);
    register_array_functions(&mut registry);
    register_datetime_functions(&mut registry);
    registry
}

/// Wraps a body so that any NULL argument short-circuits to NULL.
fn strict<F>(body: F) -> impl Fn(&[Value]) -> UdfResult + Send + Sync + 'static
where
    F: Fn(&[Value]) -> UdfResult + Send + Sync + 'static,
{
    move |args: &[Value]| {
        if args.iter().any(Value::is_null) {
            Ok(Value::Null)
        } else {
            body(args)
        }
    }
}

fn text(value: &Value) -> Result<&str, UdfError> {
    value
        .as_str()
        .ok_or_else(|| format!("expected STRING, got {}", value.data_type()).into())
}

fn integer(value: &Value) -> Result<i64, UdfError> {
    value
        .to_i64()
        .ok_or_else(|| format!("expected integer, got {}", value.data_type()).into())
}

fn floating(value: &Value) -> Result<f64, UdfError> {
    value
        .to_f64()
        .ok_or_else(|| format!("expected number, got {}", value.data_type()).into())
}

fn register_string_functions(registry: &mut FunctionRegistry) {
    registry.register(
        "upper",
        vec![Overload::new(
            vec![DataType::Text],
            DataType::Text,
            strict(|args| Ok(Value::string(text(&args[0])?.to_uppercase()))),
        )],
    );
    registry.register(
        "lower",
        vec![Overload::new(
            vec![DataType::Text],
            DataType::Text,
            strict(|args| Ok(Value::string(text(&args[0])?.to_lowercase()))),
        )],
    );
    registry.register(
        "trim",
        vec![Overload::new(
            vec![DataType::Text],
            DataType::Text,
            strict(|args| Ok(Value::string(text(&args[0])?.trim()))),
        )],
    );
    registry.register(
        "length",
        vec![Overload::new(
            vec![DataType::Text],
            DataType::Int,
            strict(|args| {
                let chars = text(&args[0])?.chars().count();
                Ok(Value::int(i32::try_from(chars)?))
            }),
        )],
    );
    registry.register(
        "concat",
        vec![Overload::variadic(
            vec![DataType::Text],
            DataType::Text,
            strict(|args| {
                let mut out = String::new();
                for arg in args {
                    out.push_str(text(arg)?);
                }
                Ok(Value::string(out))
            }),
        )],
    );

    let substring = vec![
        Overload::new(
            vec![DataType::Text, DataType::Int],
            DataType::Text,
            strict(|args| Ok(Value::string(substring(text(&args[0])?, integer(&args[1])?, None)))),
        ),
        Overload::new(
            vec![DataType::Text, DataType::Int, DataType::Int],
            DataType::Text,
            strict(|args| {
                let len = integer(&args[2])?;
                Ok(Value::string(substring(
                    text(&args[0])?,
                    integer(&args[1])?,
                    Some(len),
                )))
            }),
        ),
    ];
    registry.register("substring", substring.clone());
    registry.register("substr", substring);

    let patterns = Arc::new(PatternCache::default());
    let limited_patterns = patterns.clone();
    let split = vec![
        Overload::new(
            vec![DataType::Text, DataType::Text],
            DataType::array(DataType::Text),
            strict(move |args| split(&patterns, text(&args[0])?, text(&args[1])?, -1)),
        ),
        Overload::new(
            vec![DataType::Text, DataType::Text, DataType::Int],
            DataType::array(DataType::Text),
            strict(move |args| {
                split(
                    &limited_patterns,
                    text(&args[0])?,
                    text(&args[1])?,
                    integer(&args[2])?,
                )
            }),
        ),
    ];
    registry.register("split", split);
}

/// One-based substring; position 0 behaves like 1 and negative positions
/// count from the end.
fn substring(s: &str, pos: i64, len: Option<i64>) -> String {
    let chars: Vec<char> = s.chars().collect();
    let total = chars.len() as i64;
    let start = match pos {
        p if p > 0 => p - 1,
        0 => 0,
        p => (total + p).max(0),
    };
    if start >= total {
        return String::new();
    }
    let end = match len {
        Some(l) if l <= 0 => return String::new(),
        Some(l) => (start + l).min(total),
        None => total,
    };
    chars[start as usize..end as usize].iter().collect()
}

/// Last compiled `split` pattern.
#[derive(Debug, Default)]
struct PatternCache {
    last: Mutex<Option<(String, Regex)>>,
}

impl PatternCache {
    fn get(&self, pattern: &str) -> Result<Regex, regex::Error> {
        let mut last = self.last.lock();
        if let Some((cached, re)) = last.as_ref() {
            if cached == pattern {
                return Ok(re.clone());
            }
        }
        let re = Regex::new(pattern)?;
        *last = Some((pattern.to_string(), re.clone()));
        Ok(re)
    }
}

/// Splits around a regex; an empty pattern splits into characters. A
/// positive `limit` caps the number of parts.
fn split(patterns: &PatternCache, s: &str, pattern: &str, limit: i64) -> UdfResult {
    let parts: Vec<Value> = if pattern.is_empty() {
        let chars: Vec<String> = s.chars().map(String::from).collect();
        if limit > 0 && chars.len() as i64 > limit {
            let keep = (limit - 1) as usize;
            let mut parts: Vec<String> = chars[..keep].to_vec();
            parts.push(chars[keep..].concat());
            parts.into_iter().map(Value::String).collect()
        } else {
            chars.into_iter().map(Value::String).collect()
        }
    } else {
        let re = patterns.get(pattern)?;
        if limit > 0 {
            re.splitn(s, limit as usize).map(Value::string).collect()
        } else {
            re.split(s).map(Value::string).collect()
        }
    };
    Ok(Value::Array(parts))
}

fn register_math_functions(registry: &mut FunctionRegistry) {
    registry.register(
        "abs",
        vec![
            Overload::new(
                vec![DataType::Int],
                DataType::Int,
                strict(|args| {
                    let v = integer(&args[0])? as i32;
                    Ok(Value::int(v.wrapping_abs()))
                }),
            ),
            Overload::new(
                vec![DataType::BigInt],
                DataType::BigInt,
                strict(|args| {
                    let v = integer(&args[0])?;
                    Ok(Value::bigint(v.wrapping_abs()))
                }),
            ),
            Overload::new(
                vec![DataType::Double],
                DataType::Double,
                strict(|args| Ok(Value::double(floating(&args[0])?.abs()))),
            ),
        ],
    );

    let ceil = vec![
        Overload::new(
            vec![DataType::BigInt],
            DataType::BigInt,
            strict(|args| Ok(Value::bigint(integer(&args[0])?))),
        ),
        Overload::new(
            vec![DataType::Double],
            DataType::BigInt,
            strict(|args| Ok(Value::bigint(floating(&args[0])?.ceil() as i64))),
        ),
    ];
    registry.register("ceil", ceil.clone());
    registry.register("ceiling", ceil);

    registry.register(
        "floor",
        vec![
            Overload::new(
                vec![DataType::BigInt],
                DataType::BigInt,
                strict(|args| Ok(Value::bigint(integer(&args[0])?))),
            ),
            Overload::new(
                vec![DataType::Double],
                DataType::BigInt,
                strict(|args| Ok(Value::bigint(floating(&args[0])?.floor() as i64))),
            ),
        ],
    );

    registry.register(
        "round",
        vec![
            Overload::new(
                vec![DataType::Double],
                DataType::Double,
                strict(|args| Ok(Value::double(round_half_up(floating(&args[0])?, 0)))),
            ),
            Overload::new(
                vec![DataType::Double, DataType::Int],
                DataType::Double,
                strict(|args| {
                    let scale = integer(&args[1])?;
                    Ok(Value::double(round_half_up(floating(&args[0])?, scale)))
                }),
            ),
        ],
    );

    registry.register(
        "sqrt",
        vec![Overload::new(
            vec![DataType::Double],
            DataType::Double,
            strict(|args| Ok(Value::double(floating(&args[0])?.sqrt()))),
        )],
    );

    let power = vec![Overload::new(
        vec![DataType::Double, DataType::Double],
        DataType::Double,
        strict(|args| Ok(Value::double(floating(&args[0])?.powf(floating(&args[1])?)))),
    )];
    registry.register("power", power.clone());
    registry.register("pow", power);
}

fn round_half_up(value: f64, scale: i64) -> f64 {
    let scale = scale.clamp(-300, 300) as i32;
    let factor = 10f64.powi(scale);
    (value * factor).round() / factor
}

fn register_null_functions(registry: &mut FunctionRegistry) {
    registry.register(
        "coalesce",
        vec![Overload::with_signature(
            Signature::variadic(vec![ParamType::Any]),
            ReturnType::SameAsArgs,
            |args: &[Value]| {
                Ok(args
                    .iter()
                    .find(|v| !v.is_null())
                    .cloned()
                    .unwrap_or(Value::Null))
            },
        )],
    );
    registry.register(
        "nullif",
        vec![Overload::with_signature(
            Signature::exact(vec![ParamType::Any, ParamType::Any]),
            ReturnType::SameAsArgs,
            |args: &[Value]| {
                if !args[0].is_null() && args[0] == args[1] {
                    Ok(Value::Null)
                } else {
                    Ok(args[0].clone())
                }
            },
        )],
    );
}

fn register_array_functions(registry: &mut FunctionRegistry) {
    registry.register(
        "size",
        vec![Overload::with_signature(
            Signature::exact(vec![ParamType::AnyArray]),
            ReturnType::Fixed(DataType::Int),
            |args: &[Value]| match args[0].as_array() {
                Some(values) => Ok(Value::int(i32::try_from(values.len())?)),
                None => Ok(Value::int(-1)),
            },
        )],
    );
    registry.register(
        "array",
        vec![Overload::with_signature(
            Signature::variadic(vec![ParamType::Any]),
            ReturnType::ArrayOfArgs,
            |args: &[Value]| {
                let mut element = DataType::Null;
                for arg in args {
                    let arg_type = arg.data_type();
                    element = element.common_supertype(&arg_type).ok_or_else(|| {
                        format!("array elements mix {} and {}", element, arg_type)
                    })?;
                }
                Ok(Value::Array(args.to_vec()))
            },
        )],
    );
}

fn register_datetime_functions(registry: &mut FunctionRegistry) {
    fn date_part(name: &str, registry: &mut FunctionRegistry, part: fn(chrono::NaiveDate) -> i32) {
        let body = move |args: &[Value]| -> UdfResult {
            let date = args[0]
                .to_naive_date()
                .ok_or_else(|| format!("invalid date value {}", args[0]))?;
            Ok(Value::int(part(date)))
        };
        registry.register(
            name,
            vec![
                Overload::new(vec![DataType::Date], DataType::Int, strict(body)),
                Overload::new(vec![DataType::Timestamp], DataType::Int, strict(body)),
            ],
        );
    }

    date_part("year", registry, |d| d.year());
    date_part("month", registry, |d| d.month() as i32);
    date_part("dayofmonth", registry, |d| d.day() as i32);
    date_part("day", registry, |d| d.day() as i32);

    registry.register(
        "date_format",
        vec![Overload::new(
            vec![DataType::Timestamp, DataType::Text],
            DataType::Text,
            strict(|args| {
                let instant = args[0]
                    .to_datetime()
                    .ok_or_else(|| format!("invalid timestamp value {}", args[0]))?;
                let format = java_to_chrono_pattern(text(&args[1])?);
                let mut out = String::new();
                write!(out, "{}", instant.format(&format))
                    .map_err(|_| format!("invalid date format '{}'", text(&args[1]).unwrap_or("")))?;
                Ok(Value::string(out))
            }),
        )],
    );
}

/// Translates the common subset of Java `DateTimeFormatter` letters into a
/// chrono format string. Text inside single quotes is copied literally.
pub(crate) fn java_to_chrono_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }
        let spec = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('S', 1..=3) => "%3f",
            ('S', 4..=6) => "%6f",
            ('S', _) => "%9f",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('a', _) => "%p",
            ('D', _) => "%j",
            ('Z', _) | ('X', _) | ('x', _) => "%z",
            _ => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
                i += run;
                continue;
            }
        };
        out.push_str(spec);
        i += run;
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
