//! Execution context and catalog access.
//!
//! The execution context carries what one `execute_direct` call needs at
//! runtime: the execution settings, the instant captured when the call
//! started and the function descriptors bound for the plan.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use flint_common::{CatalogSettings, ExecutionSettings, FlintError, FlintResult};

use crate::executor::Value;
use crate::functions::{FunctionDescriptor, FunctionRegistry, Overload};
use crate::table::Table;

/// Catalog interface for view and function lookups.
pub trait ExecutionCatalog: fmt::Debug + Send + Sync {
    /// Looks up a view by name.
    fn lookup_view(&self, name: &str) -> FlintResult<Table>;

    /// Looks up a scalar function by name.
    fn lookup_function(&self, name: &str) -> FlintResult<Arc<FunctionDescriptor>>;
}

/// Simple in-memory catalog with the built-in functions.
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    settings: CatalogSettings,
    views: HashMap<String, Table>,
    functions: FunctionRegistry,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self {
            settings: CatalogSettings::default(),
            views: HashMap::new(),
            functions: FunctionRegistry::with_builtins(),
        }
    }
}

impl MemoryCatalog {
    /// Creates a catalog holding only the built-in functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a view.
    pub fn register_view(&mut self, name: &str, table: Table) {
        self.views.insert(self.settings.normalize(name), table);
    }

    /// Registers function overloads, merging with existing ones.
    pub fn register_function(&mut self, name: &str, overloads: Vec<Overload>) {
        let name = self.settings.normalize(name);
        self.functions.register(name, overloads);
    }

    /// Creates a catalog from a list of views.
    pub fn with_views(views: Vec<(&str, Table)>) -> Self {
        let mut catalog = Self::new();
        for (name, table) in views {
            catalog.register_view(name, table);
        }
        catalog
    }
}

impl ExecutionCatalog for MemoryCatalog {
    fn lookup_view(&self, name: &str) -> FlintResult<Table> {
        self.views
            .get(&self.settings.normalize(name))
            .cloned()
            .ok_or_else(|| FlintError::UnresolvedView {
                name: name.to_string(),
            })
    }

    fn lookup_function(&self, name: &str) -> FlintResult<Arc<FunctionDescriptor>> {
        self.functions
            .get(&self.settings.normalize(name))
            .ok_or_else(|| FlintError::UnresolvedFunction {
                name: name.to_string(),
            })
    }
}

/// Execution context for one direct execution.
#[derive(Debug)]
pub struct ExecutionContext {
    /// Execution settings.
    pub settings: ExecutionSettings,
    /// Instant all time-valued expressions resolve to.
    instant: DateTime<Utc>,
    /// Functions bound for the plan being executed, keyed by call name.
    functions: HashMap<String, Arc<FunctionDescriptor>>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(ExecutionSettings::default(), Utc::now())
    }
}

impl ExecutionContext {
    /// Creates a context pinned to `instant`.
    pub fn new(settings: ExecutionSettings, instant: DateTime<Utc>) -> Self {
        Self {
            settings,
            instant,
            functions: HashMap::new(),
        }
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.settings.batch_size.max(1)
    }

    /// Returns the captured instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Value of `current_timestamp` for this execution.
    pub fn current_timestamp(&self) -> Value {
        Value::timestamp(self.instant)
    }

    /// Value of `current_date` for this execution.
    pub fn current_date(&self) -> Value {
        Value::date(self.instant.date_naive())
    }

    /// Binds a function descriptor under the name used in the plan.
    pub fn bind_function(&mut self, name: impl Into<String>, descriptor: Arc<FunctionDescriptor>) {
        self.functions.insert(name.into(), descriptor);
    }

    /// Returns true if `name` has been bound.
    pub fn is_bound(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the bound descriptor for `name`.
    pub fn function(&self, name: &str) -> FlintResult<&Arc<FunctionDescriptor>> {
        self.functions
            .get(name)
            .ok_or_else(|| FlintError::UnresolvedFunction {
                name: name.to_string(),
            })
    }
}
