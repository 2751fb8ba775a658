//! Function registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::{FunctionDescriptor, Overload};

/// Name to descriptor map.
///
/// Keys are stored exactly as given; callers normalize names (for example
/// lowercasing) before registering and looking up.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<FunctionDescriptor>>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in function.
    pub fn with_builtins() -> Self {
        super::builtin_registry()
    }

    /// Registers overloads under `name`, merging with any existing
    /// descriptor. Overloads with an identical signature are replaced.
    pub fn register(&mut self, name: impl Into<String>, overloads: Vec<Overload>) {
        let name = name.into();
        let incoming = FunctionDescriptor::new(name.clone(), overloads);
        let descriptor = match self.functions.get(&name) {
            Some(existing) => existing.merged_with(&incoming),
            None => incoming,
        };
        self.functions.insert(name, Arc::new(descriptor));
    }

    /// Looks up a function by name.
    pub fn get(&self, name: &str) -> Option<Arc<FunctionDescriptor>> {
        self.functions.get(name).cloned()
    }

    /// Returns true if a function with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Removes a function; returns true if it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.functions.remove(name).is_some()
    }

    /// Removes every function.
    pub fn clear(&mut self) {
        self.functions.clear();
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if no function is registered.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Value;
    use crate::types::DataType;

    #[test]
    fn test_register_and_merge() {
        let mut registry = FunctionRegistry::new();
        registry.register(
            "f",
            vec![Overload::new(vec![DataType::Text], DataType::Int, |_| {
                Ok(Value::int(1))
            })],
        );
        registry.register(
            "f",
            vec![Overload::new(vec![DataType::Int], DataType::Int, |_| {
                Ok(Value::int(2))
            })],
        );

        let f = registry.get("f").unwrap();
        assert_eq!(f.overloads().len(), 2);
        assert_eq!(f.invoke(vec![Value::string("x")]).unwrap(), Value::int(1));
        assert_eq!(f.invoke(vec![Value::int(0)]).unwrap(), Value::int(2));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut registry = FunctionRegistry::new();
        registry.register("g", vec![]);
        let snapshot = registry.clone();
        assert!(registry.remove("g"));
        assert!(!registry.contains("g"));
        assert!(snapshot.contains("g"));
        assert_eq!(snapshot.names(), vec!["g".to_string()]);
    }
}
