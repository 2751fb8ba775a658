//! Row representation for query execution.
//!
//! This module defines the `Row` type which represents a single row of data
//! during query execution.

use std::fmt;

use flint_common::{FlintError, FlintResult};

use super::Value;
use crate::schema::Schema;

/// A single row of values.
///
/// Rows are fixed-arity and positional; the schema that describes them is
/// carried by the operator or table that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Row {
    /// The values in this row.
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row with the given values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Creates a row after checking it against a schema.
    ///
    /// Fails with `TypeMismatch` when the arity differs or a non-null value
    /// disagrees with its column type.
    pub fn try_new(schema: &Schema, values: Vec<Value>) -> FlintResult<Self> {
        if values.len() != schema.len() {
            return Err(FlintError::type_mismatch(
                format!("{} columns", schema.len()),
                format!("{} values", values.len()),
            ));
        }
        for (value, field) in values.iter().zip(schema.fields()) {
            if !value.matches_type(&field.data_type) {
                return Err(FlintError::type_mismatch(
                    format!("{} for column '{}'", field.data_type, field.name()),
                    value.data_type(),
                ));
            }
        }
        Ok(Self { values })
    }

    /// Creates an empty row.
    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    /// Creates a row with all NULL values.
    pub fn nulls(num_columns: usize) -> Self {
        Self {
            values: vec![Value::Null; num_columns],
        }
    }

    /// Returns the number of columns in this row.
    pub fn num_columns(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at the given index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Returns the values as a slice.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the row and returns the values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Projects this row to include only the specified columns.
    pub fn project(&self, indices: &[usize]) -> Row {
        let values = indices
            .iter()
            .map(|&i| self.values.get(i).cloned().unwrap_or(Value::Null))
            .collect();
        Row { values }
    }

    /// Concatenates this row with another row.
    pub fn concat(&self, other: &Row) -> Row {
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend(self.values.iter().cloned());
        values.extend(other.values.iter().cloned());
        Row { values }
    }

    /// Returns this row followed by `count` NULLs.
    pub fn pad_right(&self, count: usize) -> Row {
        self.concat(&Row::nulls(count))
    }

    /// Returns `count` NULLs followed by this row.
    pub fn pad_left(&self, count: usize) -> Row {
        Row::nulls(count).concat(self)
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

/// Builds a row from a list of values convertible into `Value`.
#[macro_export]
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        $crate::executor::Row::new(vec![$($crate::executor::Value::from($value)),*])
    };
}
