//! Browser `localStorage` backend (WASM only).

use super::{KeyValueStore, StorageError, StorageResult};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// Store backed by `window.localStorage`.
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    /// Open the window's local storage.
    pub fn open() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(js_message(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Other(js_message(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        // setItem only throws on QuotaExceededError in practice
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Quota(js_message(&e)))
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Other(js_message(&e)))
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let len = self
            .storage
            .length()
            .map_err(|e| StorageError::Other(js_message(&e)))?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = self
                .storage
                .key(i)
                .map_err(|e| StorageError::Other(js_message(&e)))?
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
