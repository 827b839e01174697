//! Key-value persistence for annotation data.
//!
//! Strokes and popups are persisted as JSON strings under
//! `${document_key}-strokes` and `${document_key}-popups`. Backends only
//! need string get/set/remove plus key enumeration.

mod memory;
mod migrate;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStore;
pub use migrate::{LEGACY_TAB_PREFIX, migrate_legacy_keys};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Suffix of the persisted stroke list for a document.
pub const STROKES_SUFFIX: &str = "-strokes";
/// Suffix of the persisted popup list for a document.
pub const POPUPS_SUFFIX: &str = "-popups";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded: {0}")]
    Quota(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Synchronous string key-value store.
///
/// Access is single-threaded; the engine owns its store exclusively.
pub trait KeyValueStore {
    /// Read a value.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// List every key in the store.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// List the keys ending with `suffix`.
    fn keys_with_suffix(&self, suffix: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.ends_with(suffix))
            .collect())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }

    fn keys_with_suffix(&self, suffix: &str) -> StorageResult<Vec<String>> {
        (**self).keys_with_suffix(suffix)
    }
}

/// Serialize `value` and store it under `key`.
pub fn write_json<S, T>(store: &mut S, key: &str, value: &T) -> StorageResult<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)
        .map_err(|e| StorageError::Serialization(format!("Failed to encode {}: {}", key, e)))?;
    store.set(key, &json)
}

/// Read and deserialize the value under `key`.
///
/// A missing key is `Ok(None)`; corrupt JSON is a `Serialization` error.
pub fn read_json<S, T>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", key, e))),
        None => Ok(None),
    }
}
