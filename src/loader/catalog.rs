//! Handler catalog
//!
//! The explicit registration table that binds the `handler` names used in
//! manifests to callbacks compiled into the binary.

use std::collections::HashMap;
use std::sync::Arc;

/// Name → callback table for one registry type
pub struct HandlerCatalog<C: ?Sized> {
    entries: HashMap<String, Arc<C>>,
}

impl<C: ?Sized> HandlerCatalog<C> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add a callback, replacing any previous entry under `name`
    pub fn insert(&mut self, name: impl Into<String>, callback: Arc<C>) -> &mut Self {
        self.entries.insert(name.into(), callback);
        self
    }

    pub fn with(mut self, name: impl Into<String>, callback: Arc<C>) -> Self {
        self.insert(name, callback);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<C>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: ?Sized> Default for HandlerCatalog<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::action::testing::Noop;
    use crate::registry::ActionCallback;

    #[test]
    fn test_catalog_lookup() {
        let catalog: HandlerCatalog<dyn ActionCallback> =
            HandlerCatalog::<dyn ActionCallback>::new().with("ping", Arc::new(Noop)).with("echo", Arc::new(Noop));

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("ping"));
        assert!(catalog.get("missing").is_none());
        assert_eq!(catalog.names(), vec!["echo", "ping"]);
    }
}
