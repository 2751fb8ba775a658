//! Scalar function invocation.
//!
//! Functions are named descriptors holding one or more overloads. Each
//! overload declares its parameter types, its return type and an
//! implementation behind `Arc<dyn ScalarUdf>`. A call resolves an overload
//! from the runtime argument types:
//!
//! 1. an overload whose parameters match exactly wins;
//! 2. otherwise the overload with the lowest implicit coercion cost
//!    (numeric widening, date to timestamp, null to anything) wins;
//! 3. ties go to the overload registered first.
//!
//! Arguments are coerced to the chosen signature before invocation and the
//! result is checked against the declared return type.

mod builtins;
mod coercion;
mod registry;

use std::fmt;
use std::sync::Arc;

use flint_common::{FlintError, FlintResult, UdfError};
use tracing::trace;

use crate::executor::Value;
use crate::types::DataType;

pub use builtins::builtin_registry;
pub use coercion::{coerce_value, coercion_cost};
pub use registry::FunctionRegistry;

/// An external scalar function implementation.
pub trait ScalarUdf: Send + Sync {
    /// Invokes the function on already-coerced arguments.
    fn invoke(&self, args: &[Value]) -> Result<Value, UdfError>;
}

impl<F> ScalarUdf for F
where
    F: Fn(&[Value]) -> Result<Value, UdfError> + Send + Sync,
{
    fn invoke(&self, args: &[Value]) -> Result<Value, UdfError> {
        self(args)
    }
}

/// Declared type of one overload parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// A concrete type; narrower arguments are coerced into it.
    Exact(DataType),
    /// Any type, passed through unchanged.
    Any,
    /// Any array type, passed through unchanged.
    AnyArray,
}

impl ParamType {
    /// Cost of passing an argument of `actual` type, `None` if impossible.
    pub fn cost(&self, actual: &DataType) -> Option<u32> {
        match self {
            ParamType::Exact(expected) => coercion_cost(actual, expected),
            ParamType::Any => Some(0),
            ParamType::AnyArray => match actual {
                DataType::Array(_) => Some(0),
                DataType::Null => Some(1),
                _ => None,
            },
        }
    }
}

impl From<DataType> for ParamType {
    fn from(data_type: DataType) -> Self {
        ParamType::Exact(data_type)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Exact(t) => write!(f, "{}", t),
            ParamType::Any => write!(f, "ANY"),
            ParamType::AnyArray => write!(f, "ARRAY<ANY>"),
        }
    }
}

/// Declared result type of an overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    /// A fixed type.
    Fixed(DataType),
    /// The common type of the arguments.
    SameAsArgs,
    /// An array of the common type of the arguments.
    ArrayOfArgs,
}

impl ReturnType {
    /// Resolves the concrete result type for the given argument types.
    pub fn resolve(&self, arg_types: &[DataType]) -> DataType {
        match self {
            ReturnType::Fixed(t) => t.clone(),
            ReturnType::SameAsArgs => common_type(arg_types),
            ReturnType::ArrayOfArgs => DataType::array(common_type(arg_types)),
        }
    }
}

fn common_type(types: &[DataType]) -> DataType {
    types
        .iter()
        .try_fold(DataType::Null, |acc, t| acc.common_supertype(t))
        .unwrap_or(DataType::Null)
}

/// Parameter list of an overload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Parameter types in order.
    pub params: Vec<ParamType>,
    /// Whether the last parameter may appear any number of times,
    /// including not at all (`array()`).
    pub variadic: bool,
}

impl Signature {
    /// Creates a fixed-arity signature.
    pub fn exact(params: Vec<ParamType>) -> Self {
        Self {
            params,
            variadic: false,
        }
    }

    /// Creates a signature whose last parameter is variadic.
    pub fn variadic(params: Vec<ParamType>) -> Self {
        Self {
            params,
            variadic: true,
        }
    }

    /// Parameter type expected at position `i` for a call of any arity.
    fn param_at(&self, i: usize) -> Option<&ParamType> {
        match self.params.get(i) {
            Some(p) => Some(p),
            None if self.variadic => self.params.last(),
            None => None,
        }
    }

    /// Total coercion cost of a call, `None` if the call does not fit.
    pub fn cost(&self, arg_types: &[DataType]) -> Option<u32> {
        let arity_ok = if self.variadic {
            arg_types.len() + 1 >= self.params.len()
        } else {
            arg_types.len() == self.params.len()
        };
        if !arity_ok {
            return None;
        }
        arg_types.iter().enumerate().try_fold(0u32, |total, (i, actual)| {
            let param = self.param_at(i)?;
            Some(total + param.cost(actual)?)
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        if self.variadic {
            write!(f, "...")?;
        }
        write!(f, ")")
    }
}

/// One callable form of a function.
#[derive(Clone)]
pub struct Overload {
    /// Parameter list.
    pub signature: Signature,
    /// Declared result type.
    pub return_type: ReturnType,
    /// The implementation.
    pub implementation: Arc<dyn ScalarUdf>,
}

impl Overload {
    /// Creates a fixed-arity overload with concrete types.
    pub fn new<F>(params: Vec<DataType>, return_type: DataType, implementation: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, UdfError> + Send + Sync + 'static,
    {
        Self::from_udf(
            Signature::exact(params.into_iter().map(ParamType::Exact).collect()),
            ReturnType::Fixed(return_type),
            Arc::new(implementation),
        )
    }

    /// Creates an overload whose last parameter type repeats.
    pub fn variadic<F>(params: Vec<DataType>, return_type: DataType, implementation: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, UdfError> + Send + Sync + 'static,
    {
        Self::from_udf(
            Signature::variadic(params.into_iter().map(ParamType::Exact).collect()),
            ReturnType::Fixed(return_type),
            Arc::new(implementation),
        )
    }

    /// Creates an overload from an explicit signature and return type.
    pub fn with_signature<F>(signature: Signature, return_type: ReturnType, implementation: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, UdfError> + Send + Sync + 'static,
    {
        Self::from_udf(signature, return_type, Arc::new(implementation))
    }

    /// Creates an overload around an existing implementation.
    pub fn from_udf(
        signature: Signature,
        return_type: ReturnType,
        implementation: Arc<dyn ScalarUdf>,
    ) -> Self {
        Self {
            signature,
            return_type,
            implementation,
        }
    }

    /// Coerces `args` to this overload's parameters.
    fn coerce_args(&self, args: Vec<Value>) -> FlintResult<Vec<Value>> {
        args.into_iter()
            .enumerate()
            .map(|(i, arg)| match self.signature.param_at(i) {
                Some(ParamType::Exact(t)) => coerce_value(arg, t),
                _ => Ok(arg),
            })
            .collect()
    }
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload")
            .field("signature", &self.signature)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// A named function with its overloads.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    name: String,
    overloads: Vec<Overload>,
}

impl FunctionDescriptor {
    /// Creates a descriptor; later overloads replace earlier ones with the
    /// same signature.
    pub fn new(name: impl Into<String>, overloads: Vec<Overload>) -> Self {
        let mut descriptor = Self {
            name: name.into(),
            overloads: Vec::with_capacity(overloads.len()),
        };
        for overload in overloads {
            descriptor.add_overload(overload);
        }
        descriptor
    }

    /// Returns the function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the overloads in registration order.
    pub fn overloads(&self) -> &[Overload] {
        &self.overloads
    }

    /// Adds an overload, replacing any overload with an identical signature
    /// in place.
    pub fn add_overload(&mut self, overload: Overload) {
        match self
            .overloads
            .iter_mut()
            .find(|o| o.signature == overload.signature)
        {
            Some(existing) => *existing = overload,
            None => self.overloads.push(overload),
        }
    }

    /// Returns a copy of this descriptor with `other`'s overloads merged in.
    pub fn merged_with(&self, other: &FunctionDescriptor) -> FunctionDescriptor {
        let mut merged = self.clone();
        for overload in &other.overloads {
            merged.add_overload(overload.clone());
        }
        merged
    }

    /// Selects the overload for the given runtime argument types.
    pub fn resolve(&self, arg_types: &[DataType]) -> FlintResult<&Overload> {
        let mut best: Option<(u32, &Overload)> = None;
        for overload in &self.overloads {
            let Some(cost) = overload.signature.cost(arg_types) else {
                continue;
            };
            if cost == 0 {
                return Ok(overload);
            }
            // strict < keeps the earliest registered overload on ties
            if best.map_or(true, |(best_cost, _)| cost < best_cost) {
                best = Some((cost, overload));
            }
        }
        best.map(|(_, overload)| overload)
            .ok_or_else(|| FlintError::NoMatchingOverload {
                name: self.name.clone(),
                arg_types: arg_types
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Resolves, coerces, invokes and checks the result of one call.
    pub fn invoke(&self, args: Vec<Value>) -> FlintResult<Value> {
        let arg_types: Vec<DataType> = args.iter().map(Value::data_type).collect();
        let overload = self.resolve(&arg_types)?;
        trace!(function = %self.name, signature = %overload.signature, "invoking");

        let coerced = overload.coerce_args(args)?;
        let result = overload
            .implementation
            .invoke(&coerced)
            .map_err(|source| FlintError::InvocationError {
                name: self.name.clone(),
                source,
            })?;

        let coerced_types: Vec<DataType> = coerced.iter().map(Value::data_type).collect();
        let declared = overload.return_type.resolve(&coerced_types);
        conform_result(result, &declared)
    }
}

/// Checks a function result against its declared type, widening where the
/// coercion rules allow.
fn conform_result(result: Value, declared: &DataType) -> FlintResult<Value> {
    if result.matches_type(declared) || declared == &DataType::Null {
        return Ok(result);
    }
    match declared {
        DataType::Array(element) if element.as_ref() == &DataType::Null => Ok(result),
        _ if coercion_cost(&result.data_type(), declared).is_some() => {
            coerce_value(result, declared)
        }
        _ => Err(FlintError::type_mismatch(declared, result.data_type())),
    }
}
