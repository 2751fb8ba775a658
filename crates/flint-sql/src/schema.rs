//! Schema representation for physical plans.
//!
//! Schemas describe the output columns of each operator. Columns are
//! addressed positionally during execution; names are kept for display
//! and for lookups by callers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use flint_common::{FlintError, FlintResult};

use crate::types::DataType;

/// A column in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// Optional table/relation qualifier.
    pub qualifier: Option<String>,
    /// Column name.
    pub name: String,
}

impl Column {
    /// Creates a new unqualified column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    /// Creates a new qualified column.
    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    /// Returns the fully qualified name.
    pub fn qualified_name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}.{}", q, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// A field in a schema (column + type + nullability).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Column identifier.
    pub column: Column,
    /// Data type.
    pub data_type: DataType,
    /// Whether NULL is allowed.
    pub nullable: bool,
}

impl Field {
    /// Creates a new field.
    pub fn new(column: Column, data_type: DataType, nullable: bool) -> Self {
        Self {
            column,
            data_type,
            nullable,
        }
    }

    /// Creates a new non-nullable field.
    pub fn not_null(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(Column::new(name), data_type, false)
    }

    /// Creates a new nullable field.
    pub fn nullable(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(Column::new(name), data_type, true)
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.column.name
    }

    /// Returns the qualified column name.
    pub fn qualified_name(&self) -> String {
        self.column.qualified_name()
    }

    /// Returns a copy of this field with the given qualifier.
    pub fn with_qualifier(&self, qualifier: impl Into<String>) -> Self {
        Self {
            column: Column::qualified(qualifier, self.column.name.clone()),
            ..self.clone()
        }
    }

    /// Returns a copy of this field that admits NULL.
    pub fn to_nullable(&self) -> Self {
        Self {
            nullable: true,
            ..self.clone()
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}{}",
            self.column,
            self.data_type,
            if self.nullable { "" } else { " NOT NULL" }
        )
    }
}

/// Schema describes the columns output by a plan node.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Fields in the schema.
    fields: Vec<Field>,
    /// Index by column name for fast lookup.
    index: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn empty() -> Self {
        Self {
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates a schema from a list of fields.
    ///
    /// Duplicate names are allowed (join outputs); lookups by name return
    /// the first field.
    pub fn new(fields: Vec<Field>) -> Self {
        let mut schema = Self {
            fields: Vec::with_capacity(fields.len()),
            index: HashMap::new(),
        };
        for field in fields {
            schema.add_field(field);
        }
        schema
    }

    /// Creates a schema, rejecting duplicate qualified names.
    pub fn try_new(fields: Vec<Field>) -> FlintResult<Self> {
        let mut seen = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if let Some(prev) = seen.insert(field.qualified_name(), i) {
                return Err(FlintError::invalid_argument(format!(
                    "duplicate column '{}' at positions {} and {}",
                    field.qualified_name(),
                    prev,
                    i
                )));
            }
        }
        Ok(Self::new(fields))
    }

    /// Adds a field to the schema.
    pub fn add_field(&mut self, field: Field) {
        let position = self.fields.len();
        self.index.entry(field.qualified_name()).or_insert(position);
        self.index
            .entry(field.column.name.clone())
            .or_insert(position);
        self.fields.push(field);
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field at the given index.
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Finds a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.index.get(name).and_then(|&i| self.fields.get(i))
    }

    /// Finds the index of a field by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Merges two schemas (for joins).
    pub fn merge(&self, other: &Schema) -> Self {
        let mut fields = self.fields.clone();
        fields.extend(other.fields.iter().cloned());
        Schema::new(fields)
    }

    /// Projects the schema to the specified column indices.
    pub fn project(&self, indices: &[usize]) -> Self {
        let fields: Vec<_> = indices
            .iter()
            .filter_map(|&i| self.fields.get(i).cloned())
            .collect();
        Schema::new(fields)
    }

    /// Returns a copy of this schema with every field nullable.
    pub fn to_nullable(&self) -> Self {
        Schema::new(self.fields.iter().map(Field::to_nullable).collect())
    }

    /// Returns the data types of all fields.
    pub fn data_types(&self) -> Vec<&DataType> {
        self.fields.iter().map(|f| &f.data_type).collect()
    }

    /// Returns the column names.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name()).collect()
    }

    /// Returns true if both schemas have the same arity and column types.
    pub fn is_positionally_compatible(&self, other: &Schema) -> bool {
        self.len() == other.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|(a, b)| a.data_type == b.data_type || b.data_type == DataType::Null)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        write!(f, "]")
    }
}

/// A reference-counted schema for sharing.
pub type SchemaRef = Arc<Schema>;
