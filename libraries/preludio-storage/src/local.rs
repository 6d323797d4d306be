//! Browser `localStorage` backend

use crate::{
    error::{Result, StorageError},
    KeyValueStore,
};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// Key-value store backed by `window.localStorage`
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Attach to the current window's `localStorage`
    ///
    /// Fails when there is no window (workers) or when storage is disabled
    /// (private browsing modes, blocked third-party storage).
    pub fn new() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::unavailable("no global window"))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::unavailable("localStorage is disabled"))?;
        Ok(Self { storage })
    }
}

fn js_error(value: JsValue) -> StorageError {
    StorageError::backend(format!("{value:?}"))
}

impl KeyValueStore for LocalStorageStore {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        // Quota errors surface here
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_error)
    }
}
