//! Preludio Storage
//!
//! Durable key-value stores used to carry player state across reloads.
//!
//! The player core only needs a flat string-to-string store, the same shape
//! as a browser's `localStorage`. This crate defines that contract
//! ([`KeyValueStore`]) and ships the backends the hosts use:
//!
//! - [`MemoryStore`]: session-local map; clones share the same entries
//! - [`FileStore`]: one JSON document per key inside a directory (desktop, CLI)
//! - `LocalStorageStore`: browser `localStorage` (feature `wasm`)
//!
//! # Example
//!
//! ```rust
//! use preludio_storage::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set_string("player", r#"{"volume":70}"#).unwrap();
//! assert!(store.has_key("player").unwrap());
//!
//! store.delete("player").unwrap();
//! assert_eq!(store.get_string("player").unwrap(), None);
//! ```

mod error;
mod file;
mod memory;

#[cfg(feature = "wasm")]
mod local;

pub use error::{Result, StorageError};
pub use file::FileStore;
pub use memory::MemoryStore;

#[cfg(feature = "wasm")]
pub use local::LocalStorageStore;

use std::rc::Rc;

/// Flat key-value storage
///
/// Implementations are used from a single event loop and therefore carry no
/// `Send`/`Sync` bound; browser storage handles are not thread-safe either.
pub trait KeyValueStore {
    /// Retrieve a string value, `None` when the key is absent
    fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store a string value, replacing any previous one
    fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key; deleting an absent key is not an error
    fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists
    fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key)?.is_some())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        (**self).get_string(key)
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_string(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn has_key(&self, key: &str) -> Result<bool> {
        (**self).has_key(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        (**self).get_string(key)
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_string(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}
