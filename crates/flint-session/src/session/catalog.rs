//! Per-session catalog of temporary views and temporary functions.

use std::collections::HashMap;
use std::sync::Arc;

use flint_sql::functions::{FunctionDescriptor, FunctionRegistry, Overload};
use flint_sql::Table;

/// Temporary views and functions owned by one session.
///
/// Names are stored already normalized. Cloning copies the maps; tables
/// and descriptors are shared, so a clone is a cheap snapshot.
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionCatalog {
    views: HashMap<String, Table>,
    functions: FunctionRegistry,
}

impl SessionCatalog {
    /// Inserts or replaces a view, returning the previous one.
    pub(crate) fn insert_view(&mut self, name: String, table: Table) -> Option<Table> {
        self.views.insert(name, table)
    }

    pub(crate) fn contains_view(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    pub(crate) fn view(&self, name: &str) -> Option<Table> {
        self.views.get(name).cloned()
    }

    pub(crate) fn remove_view(&mut self, name: &str) -> bool {
        self.views.remove(name).is_some()
    }

    /// View names, sorted.
    pub(crate) fn view_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.views.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn register_function(&mut self, name: String, overloads: Vec<Overload>) {
        self.functions.register(name, overloads);
    }

    pub(crate) fn function(&self, name: &str) -> Option<Arc<FunctionDescriptor>> {
        self.functions.get(name)
    }

    pub(crate) fn remove_function(&mut self, name: &str) -> bool {
        self.functions.remove(name)
    }

    pub(crate) fn function_names(&self) -> Vec<String> {
        self.functions.names()
    }

    pub(crate) fn clear(&mut self) {
        self.views.clear();
        self.functions.clear();
    }
}
