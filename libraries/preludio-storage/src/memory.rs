//! In-memory store

use crate::{error::Result, KeyValueStore};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Session-local key-value store
///
/// Clones share the same entries, so two player sessions built from clones of
/// one `MemoryStore` observe each other's writes (this is how reload behavior
/// is exercised without a real medium).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.entries.borrow().contains_key(key))
    }
}
