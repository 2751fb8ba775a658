//! Physical expressions for execution.
//!
//! Physical expressions are fully resolved: columns are referenced by
//! position in the operator's input row, functions by name (bound against
//! the session catalog before execution) and literals by value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;
use crate::types::{DataType, Literal};

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Comparison
    /// Equal (`=`).
    Eq,
    /// Not equal (`<>`).
    NotEq,
    /// Less than.
    Lt,
    /// Less than or equal.
    LtEq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    GtEq,

    // Arithmetic
    /// Addition.
    Plus,
    /// Subtraction.
    Minus,
    /// Multiplication.
    Multiply,
    /// Division, always producing a double.
    Divide,
    /// Remainder.
    Modulo,

    // Logical
    /// Three-valued AND.
    And,
    /// Three-valued OR.
    Or,

    // String
    /// `LIKE` pattern match.
    Like,
    /// Case-insensitive `LIKE`.
    ILike,
    /// String concatenation (`||`).
    Concat,

    // Bitwise
    /// Bitwise AND.
    BitwiseAnd,
    /// Bitwise OR.
    BitwiseOr,
    /// Bitwise XOR.
    BitwiseXor,
}

impl BinaryOp {
    /// Returns true if this is a comparison operator.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    /// Returns true if this is a logical operator.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Returns true if this is an arithmetic operator.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Plus
                | BinaryOp::Minus
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::Modulo
        )
    }

    /// Returns the negation of this comparison operator.
    pub fn negate(&self) -> Option<BinaryOp> {
        match self {
            BinaryOp::Eq => Some(BinaryOp::NotEq),
            BinaryOp::NotEq => Some(BinaryOp::Eq),
            BinaryOp::Lt => Some(BinaryOp::GtEq),
            BinaryOp::LtEq => Some(BinaryOp::Gt),
            BinaryOp::Gt => Some(BinaryOp::LtEq),
            BinaryOp::GtEq => Some(BinaryOp::Lt),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Eq => write!(f, "="),
            BinaryOp::NotEq => write!(f, "<>"),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::LtEq => write!(f, "<="),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::GtEq => write!(f, ">="),
            BinaryOp::Plus => write!(f, "+"),
            BinaryOp::Minus => write!(f, "-"),
            BinaryOp::Multiply => write!(f, "*"),
            BinaryOp::Divide => write!(f, "/"),
            BinaryOp::Modulo => write!(f, "%"),
            BinaryOp::And => write!(f, "AND"),
            BinaryOp::Or => write!(f, "OR"),
            BinaryOp::Like => write!(f, "LIKE"),
            BinaryOp::ILike => write!(f, "ILIKE"),
            BinaryOp::Concat => write!(f, "||"),
            BinaryOp::BitwiseAnd => write!(f, "&"),
            BinaryOp::BitwiseOr => write!(f, "|"),
            BinaryOp::BitwiseXor => write!(f, "^"),
        }
    }
}

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical NOT.
    Not,
    /// Negation.
    Minus,
    /// Identity.
    Plus,
    /// Bitwise complement.
    BitwiseNot,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "NOT "),
            UnaryOp::Minus => write!(f, "-"),
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::BitwiseNot => write!(f, "~"),
        }
    }
}

/// Aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunc {
    /// Count of non-null argument rows.
    Count,
    /// Count of all rows.
    CountStar,
    /// Sum; integer inputs sum to BIGINT.
    Sum,
    /// Mean as a double.
    Avg,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// First non-null value seen.
    First,
    /// Last non-null value seen.
    Last,
    /// True when every input is true.
    BoolAnd,
    /// True when any input is true.
    BoolOr,
    /// Values collected into an array.
    CollectList,
    /// HyperLogLog++ estimate of distinct values.
    ApproxCountDistinct,
}

impl fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFunc::Count => write!(f, "count"),
            AggregateFunc::CountStar => write!(f, "count(*)"),
            AggregateFunc::Sum => write!(f, "sum"),
            AggregateFunc::Avg => write!(f, "avg"),
            AggregateFunc::Min => write!(f, "min"),
            AggregateFunc::Max => write!(f, "max"),
            AggregateFunc::First => write!(f, "first"),
            AggregateFunc::Last => write!(f, "last"),
            AggregateFunc::BoolAnd => write!(f, "bool_and"),
            AggregateFunc::BoolOr => write!(f, "bool_or"),
            AggregateFunc::CollectList => write!(f, "collect_list"),
            AggregateFunc::ApproxCountDistinct => write!(f, "approx_count_distinct"),
        }
    }
}

/// Window function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowFunc {
    /// Aggregate evaluated over the window frame.
    Aggregate(AggregateFunc),
    /// ROW_NUMBER().
    RowNumber,
    /// RANK().
    Rank,
    /// DENSE_RANK().
    DenseRank,
    /// LAG(expr, offset, default).
    Lag,
    /// LEAD(expr, offset, default).
    Lead,
}

impl fmt::Display for WindowFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowFunc::Aggregate(agg) => write!(f, "{}", agg),
            WindowFunc::RowNumber => write!(f, "row_number"),
            WindowFunc::Rank => write!(f, "rank"),
            WindowFunc::DenseRank => write!(f, "dense_rank"),
            WindowFunc::Lag => write!(f, "lag"),
            WindowFunc::Lead => write!(f, "lead"),
        }
    }
}

/// A physical expression that can be evaluated on a row.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalExpr {
    /// Column reference by index.
    Column {
        /// Column name for display.
        name: String,
        /// Column index in the input row.
        index: usize,
    },

    /// Literal value.
    Literal(Literal),

    /// Binary operation.
    BinaryExpr {
        /// Left operand.
        left: Box<PhysicalExpr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<PhysicalExpr>,
    },

    /// Unary operation.
    UnaryExpr {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        expr: Box<PhysicalExpr>,
    },

    /// IS NULL check.
    IsNull(Box<PhysicalExpr>),

    /// IS NOT NULL check.
    IsNotNull(Box<PhysicalExpr>),

    /// CAST expression.
    Cast {
        /// Expression to cast.
        expr: Box<PhysicalExpr>,
        /// Target data type.
        data_type: DataType,
    },

    /// CASE expression.
    Case {
        /// Optional operand for simple CASE.
        operand: Option<Box<PhysicalExpr>>,
        /// WHEN-THEN pairs.
        when_then: Vec<(PhysicalExpr, PhysicalExpr)>,
        /// ELSE result.
        else_result: Option<Box<PhysicalExpr>>,
    },

    /// Scalar function call, resolved by name at bind time.
    ScalarFunction {
        /// Function name.
        name: String,
        /// Arguments.
        args: Vec<PhysicalExpr>,
        /// Declared return type.
        return_type: DataType,
    },

    /// IN list check.
    InList {
        /// Expression to check.
        expr: Box<PhysicalExpr>,
        /// List of values.
        list: Vec<PhysicalExpr>,
        /// Whether negated (NOT IN).
        negated: bool,
    },

    /// BETWEEN check.
    Between {
        /// Expression to check.
        expr: Box<PhysicalExpr>,
        /// Lower bound.
        low: Box<PhysicalExpr>,
        /// Upper bound.
        high: Box<PhysicalExpr>,
        /// Whether negated.
        negated: bool,
    },

    /// LIKE pattern matching.
    Like {
        /// Expression to match.
        expr: Box<PhysicalExpr>,
        /// Pattern.
        pattern: Box<PhysicalExpr>,
        /// Whether negated.
        negated: bool,
        /// Case insensitive (ILIKE).
        case_insensitive: bool,
    },

    /// The date of the execution instant.
    CurrentDate,

    /// The execution instant.
    CurrentTimestamp,
}

impl PhysicalExpr {
    /// Creates a column reference.
    pub fn column(name: impl Into<String>, index: usize) -> Self {
        PhysicalExpr::Column {
            name: name.into(),
            index,
        }
    }

    /// Creates a literal expression.
    pub fn literal(lit: Literal) -> Self {
        PhysicalExpr::Literal(lit)
    }

    /// Creates a literal integer.
    pub fn lit_i64(value: i64) -> Self {
        PhysicalExpr::Literal(Literal::Integer(value))
    }

    /// Creates a literal boolean.
    pub fn lit_bool(value: bool) -> Self {
        PhysicalExpr::Literal(Literal::Boolean(value))
    }

    /// Creates a literal string.
    pub fn lit_str(value: impl Into<String>) -> Self {
        PhysicalExpr::Literal(Literal::String(value.into()))
    }

    /// Creates a NULL literal.
    pub fn null() -> Self {
        PhysicalExpr::Literal(Literal::Null)
    }

    /// Creates a binary expression.
    pub fn binary(left: PhysicalExpr, op: BinaryOp, right: PhysicalExpr) -> Self {
        PhysicalExpr::BinaryExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Creates a unary expression.
    pub fn unary(op: UnaryOp, expr: PhysicalExpr) -> Self {
        PhysicalExpr::UnaryExpr {
            op,
            expr: Box::new(expr),
        }
    }

    /// Creates an equality comparison.
    pub fn eq(self, other: PhysicalExpr) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    /// Creates a logical AND.
    pub fn and(self, other: PhysicalExpr) -> Self {
        Self::binary(self, BinaryOp::And, other)
    }

    /// Creates a CAST.
    pub fn cast(self, data_type: DataType) -> Self {
        PhysicalExpr::Cast {
            expr: Box::new(self),
            data_type,
        }
    }

    /// Creates a scalar function call.
    pub fn function(name: impl Into<String>, args: Vec<PhysicalExpr>, return_type: DataType) -> Self {
        PhysicalExpr::ScalarFunction {
            name: name.into(),
            args,
            return_type,
        }
    }

    /// Returns the output data type of this expression given an input schema.
    pub fn data_type(&self, schema: &Schema) -> DataType {
        match self {
            PhysicalExpr::Column { index, .. } => schema
                .field(*index)
                .map(|f| f.data_type.clone())
                .unwrap_or(DataType::Null),
            PhysicalExpr::Literal(lit) => lit.data_type(),
            PhysicalExpr::BinaryExpr { left, op, right } => {
                binary_op_return_type(op, &left.data_type(schema), &right.data_type(schema))
            }
            PhysicalExpr::UnaryExpr { op, expr } => match op {
                UnaryOp::Not => DataType::Boolean,
                UnaryOp::Minus | UnaryOp::Plus | UnaryOp::BitwiseNot => expr.data_type(schema),
            },
            PhysicalExpr::IsNull(_) | PhysicalExpr::IsNotNull(_) => DataType::Boolean,
            PhysicalExpr::Cast { data_type, .. } => data_type.clone(),
            PhysicalExpr::Case {
                when_then,
                else_result,
                ..
            } => when_then
                .iter()
                .map(|(_, then)| then.data_type(schema))
                .chain(else_result.iter().map(|e| e.data_type(schema)))
                .try_fold(DataType::Null, |acc, t| acc.common_supertype(&t))
                .unwrap_or(DataType::Null),
            PhysicalExpr::ScalarFunction { return_type, .. } => return_type.clone(),
            PhysicalExpr::InList { .. }
            | PhysicalExpr::Between { .. }
            | PhysicalExpr::Like { .. } => DataType::Boolean,
            PhysicalExpr::CurrentDate => DataType::Date,
            PhysicalExpr::CurrentTimestamp => DataType::Timestamp,
        }
    }

    /// Returns whether this expression may evaluate to NULL.
    pub fn nullable(&self, schema: &Schema) -> bool {
        match self {
            PhysicalExpr::Column { index, .. } => {
                schema.field(*index).map_or(true, |f| f.nullable)
            }
            PhysicalExpr::Literal(lit) => lit.is_null(),
            PhysicalExpr::IsNull(_)
            | PhysicalExpr::IsNotNull(_)
            | PhysicalExpr::CurrentDate
            | PhysicalExpr::CurrentTimestamp => false,
            _ => true,
        }
    }

    /// Returns the direct sub-expressions.
    pub fn children(&self) -> Vec<&PhysicalExpr> {
        match self {
            PhysicalExpr::Column { .. }
            | PhysicalExpr::Literal(_)
            | PhysicalExpr::CurrentDate
            | PhysicalExpr::CurrentTimestamp => vec![],
            PhysicalExpr::BinaryExpr { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            PhysicalExpr::UnaryExpr { expr, .. }
            | PhysicalExpr::IsNull(expr)
            | PhysicalExpr::IsNotNull(expr)
            | PhysicalExpr::Cast { expr, .. } => vec![expr.as_ref()],
            PhysicalExpr::Case {
                operand,
                when_then,
                else_result,
            } => {
                let mut children: Vec<&PhysicalExpr> = Vec::new();
                children.extend(operand.as_deref());
                for (when, then) in when_then {
                    children.push(when);
                    children.push(then);
                }
                children.extend(else_result.as_deref());
                children
            }
            PhysicalExpr::ScalarFunction { args, .. } => args.iter().collect(),
            PhysicalExpr::InList { expr, list, .. } => {
                let mut children = vec![expr.as_ref()];
                children.extend(list.iter());
                children
            }
            PhysicalExpr::Between {
                expr, low, high, ..
            } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
            PhysicalExpr::Like { expr, pattern, .. } => vec![expr.as_ref(), pattern.as_ref()],
        }
    }

    /// Returns the largest column index referenced, if any.
    pub fn max_column_index(&self) -> Option<usize> {
        let own = match self {
            PhysicalExpr::Column { index, .. } => Some(*index),
            _ => None,
        };
        self.children()
            .into_iter()
            .filter_map(PhysicalExpr::max_column_index)
            .chain(own)
            .max()
    }

    /// Appends the names of every scalar function called.
    pub fn collect_functions(&self, names: &mut Vec<String>) {
        if let PhysicalExpr::ScalarFunction { name, .. } = self {
            names.push(name.clone());
        }
        for child in self.children() {
            child.collect_functions(names);
        }
    }

    /// Returns true if this expression is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(self, PhysicalExpr::Literal(_))
    }

    /// Returns true if this expression is a column reference.
    pub fn is_column(&self) -> bool {
        matches!(self, PhysicalExpr::Column { .. })
    }

    /// Returns the display name for this expression.
    pub fn name(&self) -> String {
        match self {
            PhysicalExpr::Column { name, .. } => name.clone(),
            PhysicalExpr::Literal(lit) => format!("{}", lit),
            PhysicalExpr::BinaryExpr { left, op, right } => {
                format!("({} {} {})", left.name(), op, right.name())
            }
            PhysicalExpr::UnaryExpr { op, expr } => {
                format!("{}{}", op, expr.name())
            }
            PhysicalExpr::IsNull(expr) => format!("({} IS NULL)", expr.name()),
            PhysicalExpr::IsNotNull(expr) => format!("({} IS NOT NULL)", expr.name()),
            PhysicalExpr::Cast { expr, data_type } => {
                format!("CAST({} AS {})", expr.name(), data_type)
            }
            PhysicalExpr::Case { .. } => "CASE".to_string(),
            PhysicalExpr::ScalarFunction { name, args, .. } => {
                let args: Vec<String> = args.iter().map(PhysicalExpr::name).collect();
                format!("{}({})", name, args.join(", "))
            }
            PhysicalExpr::InList { expr, negated, .. } => {
                format!(
                    "({} {}IN (...))",
                    expr.name(),
                    if *negated { "NOT " } else { "" }
                )
            }
            PhysicalExpr::Between { expr, negated, .. } => {
                format!(
                    "({} {}BETWEEN ...)",
                    expr.name(),
                    if *negated { "NOT " } else { "" }
                )
            }
            PhysicalExpr::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
            } => {
                let op = if *case_insensitive { "ILIKE" } else { "LIKE" };
                format!(
                    "({} {}{} {})",
                    expr.name(),
                    if *negated { "NOT " } else { "" },
                    op,
                    pattern.name()
                )
            }
            PhysicalExpr::CurrentDate => "current_date()".to_string(),
            PhysicalExpr::CurrentTimestamp => "current_timestamp()".to_string(),
        }
    }
}

impl fmt::Display for PhysicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Returns the return type of a binary operation.
fn binary_op_return_type(op: &BinaryOp, left: &DataType, right: &DataType) -> DataType {
    match op {
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::And
        | BinaryOp::Or
        | BinaryOp::Like
        | BinaryOp::ILike => DataType::Boolean,

        BinaryOp::Divide => DataType::Double,
        BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Multiply | BinaryOp::Modulo => left
            .common_supertype(right)
            .unwrap_or(DataType::Double),

        BinaryOp::Concat => DataType::Text,

        BinaryOp::BitwiseAnd | BinaryOp::BitwiseOr | BinaryOp::BitwiseXor => left
            .common_supertype(right)
            .unwrap_or(DataType::BigInt),
    }
}

/// Physical aggregate expression.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalAggregateExpr {
    /// Aggregate function.
    pub func: AggregateFunc,
    /// Arguments.
    pub args: Vec<PhysicalExpr>,
    /// Whether DISTINCT.
    pub distinct: bool,
    /// Filter condition; rows where it is not TRUE are skipped.
    pub filter: Option<Box<PhysicalExpr>>,
    /// Output name.
    pub name: String,
}

impl PhysicalAggregateExpr {
    /// Creates a new aggregate expression.
    pub fn new(
        func: AggregateFunc,
        args: Vec<PhysicalExpr>,
        distinct: bool,
        name: impl Into<String>,
    ) -> Self {
        Self {
            func,
            args,
            distinct,
            filter: None,
            name: name.into(),
        }
    }

    /// Creates `count(*)`.
    pub fn count_star(name: impl Into<String>) -> Self {
        Self::new(AggregateFunc::CountStar, vec![], false, name)
    }

    /// Attaches a FILTER predicate.
    pub fn with_filter(mut self, filter: PhysicalExpr) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Returns the return type of this aggregate.
    pub fn return_type(&self, schema: &Schema) -> DataType {
        let arg_type = self
            .args
            .first()
            .map(|arg| arg.data_type(schema))
            .unwrap_or(DataType::Null);
        aggregate_return_type(self.func, &arg_type)
    }

    /// Returns whether the result may be NULL.
    pub fn nullable(&self) -> bool {
        !matches!(
            self.func,
            AggregateFunc::Count
                | AggregateFunc::CountStar
                | AggregateFunc::ApproxCountDistinct
                | AggregateFunc::CollectList
        )
    }
}

/// Result type of an aggregate over an argument of `arg_type`.
pub fn aggregate_return_type(func: AggregateFunc, arg_type: &DataType) -> DataType {
    match func {
        AggregateFunc::Count | AggregateFunc::CountStar | AggregateFunc::ApproxCountDistinct => {
            DataType::BigInt
        }
        AggregateFunc::Sum if arg_type.is_integer() => DataType::BigInt,
        AggregateFunc::Sum | AggregateFunc::Avg => DataType::Double,
        AggregateFunc::Min | AggregateFunc::Max | AggregateFunc::First | AggregateFunc::Last => {
            arg_type.clone()
        }
        AggregateFunc::BoolAnd | AggregateFunc::BoolOr => DataType::Boolean,
        AggregateFunc::CollectList => DataType::array(arg_type.clone()),
    }
}

impl fmt::Display for PhysicalAggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.func == AggregateFunc::CountStar {
            return write!(f, "count(*)");
        }
        write!(f, "{}(", self.func)?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")?;
        if let Some(filter) = &self.filter {
            write!(f, " FILTER (WHERE {})", filter)?;
        }
        Ok(())
    }
}

/// Window function expression.
///
/// `lag` and `lead` take `(expr, offset, default)`; offset defaults to 1 and
/// default to NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalWindowExpr {
    /// Window function.
    pub func: WindowFunc,
    /// Arguments.
    pub args: Vec<PhysicalExpr>,
    /// Output name.
    pub name: String,
}

impl PhysicalWindowExpr {
    /// Creates a new window expression.
    pub fn new(func: WindowFunc, args: Vec<PhysicalExpr>, name: impl Into<String>) -> Self {
        Self {
            func,
            args,
            name: name.into(),
        }
    }

    /// Returns the return type of this window function.
    pub fn return_type(&self, schema: &Schema) -> DataType {
        let arg_type = self
            .args
            .first()
            .map(|arg| arg.data_type(schema))
            .unwrap_or(DataType::Null);
        match self.func {
            WindowFunc::RowNumber | WindowFunc::Rank | WindowFunc::DenseRank => DataType::Int,
            WindowFunc::Lag | WindowFunc::Lead => arg_type,
            WindowFunc::Aggregate(func) => aggregate_return_type(func, &arg_type),
        }
    }
}

impl fmt::Display for PhysicalWindowExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(PhysicalExpr::name).collect();
        write!(f, "{}({})", self.func, args.join(", "))
    }
}

/// Sort expression for ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalSortExpr {
    /// Expression to sort by.
    pub expr: PhysicalExpr,
    /// Sort direction (true = ascending).
    pub asc: bool,
    /// Nulls first.
    pub nulls_first: bool,
}

impl PhysicalSortExpr {
    /// Creates a new sort expression.
    pub fn new(expr: PhysicalExpr, asc: bool, nulls_first: bool) -> Self {
        Self {
            expr,
            asc,
            nulls_first,
        }
    }

    /// Ascending, nulls first.
    pub fn asc(expr: PhysicalExpr) -> Self {
        Self::new(expr, true, true)
    }

    /// Descending, nulls last.
    pub fn desc(expr: PhysicalExpr) -> Self {
        Self::new(expr, false, false)
    }
}

impl fmt::Display for PhysicalSortExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.expr,
            if self.asc { "ASC" } else { "DESC" },
            if self.nulls_first {
                "NULLS FIRST"
            } else {
                "NULLS LAST"
            }
        )
    }
}
