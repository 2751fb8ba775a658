//! SQL data types.
//!
//! This module defines the data types, literals and join kinds used by
//! flint physical plans.

use std::fmt;

use serde::{Deserialize, Serialize};

/// SQL data types supported by flint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Type of an untyped NULL.
    Null,
    /// Boolean type.
    Boolean,
    /// 8-bit signed integer.
    TinyInt,
    /// 16-bit signed integer.
    SmallInt,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Unlimited text.
    Text,
    /// Date (days since the Unix epoch).
    Date,
    /// Timestamp (microseconds since the Unix epoch, UTC).
    Timestamp,
    /// Array of another type.
    Array(Box<DataType>),
}

impl DataType {
    /// Creates an array type.
    pub fn array(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }

    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Returns true if this type is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt | DataType::SmallInt | DataType::Int | DataType::BigInt
        )
    }

    /// Returns true if this type is a floating point type.
    pub fn is_floating(&self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// Returns true if this type is a string type.
    pub fn is_string(&self) -> bool {
        matches!(self, DataType::Text)
    }

    /// Returns true if this type is a temporal type.
    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::Timestamp)
    }

    /// Position of this type in the numeric widening chain
    /// TinyInt < SmallInt < Int < BigInt < Float < Double.
    pub fn numeric_rank(&self) -> Option<u8> {
        match self {
            DataType::TinyInt => Some(0),
            DataType::SmallInt => Some(1),
            DataType::Int => Some(2),
            DataType::BigInt => Some(3),
            DataType::Float => Some(4),
            DataType::Double => Some(5),
            _ => None,
        }
    }

    /// Returns the element type if this is an array type.
    pub fn element_type(&self) -> Option<&DataType> {
        match self {
            DataType::Array(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the narrowest type both operands widen to, if any.
    pub fn common_supertype(&self, other: &DataType) -> Option<DataType> {
        match (self, other) {
            (a, b) if a == b => Some(a.clone()),
            (DataType::Null, t) | (t, DataType::Null) => Some(t.clone()),
            (DataType::Date, DataType::Timestamp) | (DataType::Timestamp, DataType::Date) => {
                Some(DataType::Timestamp)
            }
            (DataType::Array(a), DataType::Array(b)) => {
                a.common_supertype(b).map(DataType::array)
            }
            (a, b) => match (a.numeric_rank(), b.numeric_rank()) {
                (Some(ra), Some(rb)) => Some(if ra >= rb { a.clone() } else { b.clone() }),
                _ => None,
            },
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Null => write!(f, "NULL"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::TinyInt => write!(f, "TINYINT"),
            DataType::SmallInt => write!(f, "SMALLINT"),
            DataType::Int => write!(f, "INT"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Text => write!(f, "STRING"),
            DataType::Date => write!(f, "DATE"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Array(inner) => write!(f, "ARRAY<{}>", inner),
        }
    }
}

/// A literal value in a physical plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// NULL value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Date literal (days since the Unix epoch).
    Date(i32),
    /// Timestamp literal (microseconds since the Unix epoch).
    Timestamp(i64),
}

impl Literal {
    /// Returns true if this is a NULL value.
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Returns the data type of this literal.
    ///
    /// Integers are `INT` when they fit in 32 bits, otherwise `BIGINT`.
    pub fn data_type(&self) -> DataType {
        match self {
            Literal::Null => DataType::Null,
            Literal::Boolean(_) => DataType::Boolean,
            Literal::Integer(i) => {
                if i32::try_from(*i).is_ok() {
                    DataType::Int
                } else {
                    DataType::BigInt
                }
            }
            Literal::Float(_) => DataType::Double,
            Literal::String(_) => DataType::Text,
            Literal::Date(_) => DataType::Date,
            Literal::Timestamp(_) => DataType::Timestamp,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Date(d) => write!(f, "DATE {}", d),
            Literal::Timestamp(t) => write!(f, "TIMESTAMP {}", t),
        }
    }
}

/// Join type for table joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    /// Inner join - only matching rows.
    Inner,
    /// Left outer join - all left rows, matching right rows.
    LeftOuter,
    /// Right outer join - all right rows, matching left rows.
    RightOuter,
    /// Full outer join - all rows from both tables.
    FullOuter,
    /// Left semi join - left rows with at least one match.
    LeftSemi,
    /// Left anti join - left rows with no match.
    LeftAnti,
    /// Cross join - cartesian product.
    Cross,
}

impl JoinType {
    /// Returns true if the output carries only the left columns.
    pub fn is_left_only(&self) -> bool {
        matches!(self, JoinType::LeftSemi | JoinType::LeftAnti)
    }

    /// Returns true if unmatched left rows are emitted padded with nulls.
    pub fn preserves_left(&self) -> bool {
        matches!(self, JoinType::LeftOuter | JoinType::FullOuter)
    }

    /// Returns true if unmatched right rows are emitted padded with nulls.
    pub fn preserves_right(&self) -> bool {
        matches!(self, JoinType::RightOuter | JoinType::FullOuter)
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "Inner"),
            JoinType::LeftOuter => write!(f, "LeftOuter"),
            JoinType::RightOuter => write!(f, "RightOuter"),
            JoinType::FullOuter => write!(f, "FullOuter"),
            JoinType::LeftSemi => write!(f, "LeftSemi"),
            JoinType::LeftAnti => write!(f, "LeftAnti"),
            JoinType::Cross => write!(f, "Cross"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_display() {
        assert_eq!(DataType::Int.to_string(), "INT");
        assert_eq!(DataType::array(DataType::Text).to_string(), "ARRAY<STRING>");
    }

    #[test]
    fn test_data_type_predicates() {
        assert!(DataType::Int.is_numeric());
        assert!(DataType::Float.is_numeric());
        assert!(!DataType::Text.is_numeric());
        assert!(DataType::BigInt.is_integer());
        assert!(DataType::Timestamp.is_temporal());
        assert!(!DataType::Int.is_temporal());
    }

    #[test]
    fn test_common_supertype() {
        assert_eq!(
            DataType::Int.common_supertype(&DataType::Double),
            Some(DataType::Double)
        );
        assert_eq!(
            DataType::Null.common_supertype(&DataType::Text),
            Some(DataType::Text)
        );
        assert_eq!(
            DataType::Date.common_supertype(&DataType::Timestamp),
            Some(DataType::Timestamp)
        );
        assert_eq!(DataType::Text.common_supertype(&DataType::Int), None);
    }

    #[test]
    fn test_literal_type() {
        assert_eq!(Literal::Integer(42).data_type(), DataType::Int);
        assert_eq!(Literal::Integer(1 << 40).data_type(), DataType::BigInt);
        assert_eq!(Literal::Null.data_type(), DataType::Null);
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Null.to_string(), "NULL");
        assert_eq!(Literal::Integer(42).to_string(), "42");
        assert_eq!(Literal::String("it's".to_string()).to_string(), "'it''s'");
        assert_eq!(Literal::Boolean(true).to_string(), "TRUE");
    }

    #[test]
    fn test_join_type_sides() {
        assert!(JoinType::LeftSemi.is_left_only());
        assert!(JoinType::FullOuter.preserves_left());
        assert!(JoinType::FullOuter.preserves_right());
        assert!(!JoinType::Inner.preserves_left());
    }
}
