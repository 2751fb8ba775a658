//! Materialized, immutable result tables.

use std::fmt;
use std::sync::Arc;

use flint_common::FlintResult;

use crate::executor::{Row, Value};
use crate::schema::{Schema, SchemaRef};

/// A schema plus an ordered list of rows.
///
/// Tables are immutable and cheap to clone; clones share the same rows.
/// `to_string()` renders the rows joined by `,`, e.g. `[0,2],[1,3]`.
#[derive(Debug, Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

#[derive(Debug)]
struct TableInner {
    schema: SchemaRef,
    rows: Vec<Row>,
}

impl Table {
    /// Creates a table from rows already known to conform to `schema`.
    pub fn new(schema: SchemaRef, rows: Vec<Row>) -> Self {
        Self {
            inner: Arc::new(TableInner { schema, rows }),
        }
    }

    /// Creates a table, validating every row against the schema.
    pub fn try_new(schema: SchemaRef, rows: Vec<Vec<Value>>) -> FlintResult<Self> {
        let rows = rows
            .into_iter()
            .map(|values| Row::try_new(&schema, values))
            .collect::<FlintResult<Vec<_>>>()?;
        Ok(Self::new(schema, rows))
    }

    /// Creates an empty table.
    pub fn empty(schema: SchemaRef) -> Self {
        Self::new(schema, Vec::new())
    }

    /// Returns the schema.
    pub fn schema(&self) -> &SchemaRef {
        &self.inner.schema
    }

    /// Returns the rows in order.
    pub fn data(&self) -> &[Row] {
        &self.inner.rows
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.inner.rows.len()
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.inner.schema.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.inner.rows.is_empty()
    }

    /// Returns the values of one column.
    pub fn column(&self, index: usize) -> Option<Vec<Value>> {
        if index >= self.num_columns() {
            return None;
        }
        Some(
            self.inner
                .rows
                .iter()
                .map(|row| row.get(index).cloned().unwrap_or(Value::Null))
                .collect(),
        )
    }

    /// Returns true if both tables share the same underlying storage.
    pub fn ptr_eq(&self, other: &Table) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns a copy of this table whose schema is replaced positionally.
    pub fn with_schema(&self, schema: Schema) -> Self {
        Self::new(Arc::new(schema), self.inner.rows.clone())
    }

    /// Pretty prints the table as a text grid.
    pub fn display(&self) -> String {
        let mut output = String::new();

        let fields = self.inner.schema.fields();
        let mut col_widths: Vec<usize> = fields.iter().map(|f| f.name().len()).collect();

        for row in &self.inner.rows {
            for (i, val) in row.iter().enumerate() {
                if let Some(width) = col_widths.get_mut(i) {
                    *width = (*width).max(val.to_string().len());
                }
            }
        }

        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                output.push_str(" | ");
            }
            output.push_str(&format!("{:width$}", field.name(), width = col_widths[i]));
        }
        output.push('\n');

        for (i, width) in col_widths.iter().enumerate() {
            if i > 0 {
                output.push_str("-+-");
            }
            output.push_str(&"-".repeat(*width));
        }
        output.push('\n');

        for row in &self.inner.rows {
            for (i, val) in row.iter().enumerate() {
                if i > 0 {
                    output.push_str(" | ");
                }
                let width = col_widths.get(i).copied().unwrap_or(0);
                output.push_str(&format!("{:width$}", val.to_string(), width = width));
            }
            output.push('\n');
        }

        output.push_str(&format!("({} rows)\n", self.num_rows()));
        output
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.inner.rows == other.inner.rows
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.inner.rows.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}
