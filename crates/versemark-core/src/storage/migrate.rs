//! Migration of legacy tab-scoped keys to document-scoped keys.
//!
//! Older builds stored annotations under `tab-<tabId>-bible-annotations-...`,
//! which tied them to a tab rather than to the passage being annotated.

use super::{KeyValueStore, StorageResult};
use crate::document::PASSAGE_KEY_PREFIX;

/// Prefix of legacy tab-scoped keys.
pub const LEGACY_TAB_PREFIX: &str = "tab-";

/// Map a legacy key to its document-scoped equivalent.
fn migrated_key(key: &str) -> Option<&str> {
    if !key.starts_with(LEGACY_TAB_PREFIX) {
        return None;
    }
    key.find(PASSAGE_KEY_PREFIX).map(|at| &key[at..])
}

/// Move every legacy key to its document-scoped name.
///
/// An existing value under the new name wins; the legacy entry is dropped
/// either way. Returns the `(old, new)` pairs that were processed.
pub fn migrate_legacy_keys<S>(store: &mut S) -> StorageResult<Vec<(String, String)>>
where
    S: KeyValueStore + ?Sized,
{
    let mut migrated = Vec::new();
    for key in store.keys()? {
        let Some(new_key) = migrated_key(&key) else {
            continue;
        };
        let new_key = new_key.to_string();

        if store.get(&new_key)?.is_none() {
            if let Some(value) = store.get(&key)? {
                store.set(&new_key, &value)?;
            }
        }
        store.remove(&key)?;
        log::info!("Migrated legacy annotations {} -> {}", key, new_key);
        migrated.push((key, new_key));
    }
    Ok(migrated)
}
