//! Word-definition popups pinned to a document.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::DocumentKey;
use crate::storage::{KeyValueStore, POPUPS_SUFFIX, read_json, write_json};

/// Where a popup sits over the text, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PopupPosition {
    pub x: f64,
    pub y: f64,
    /// Dragged popups keep their position instead of following the word.
    #[serde(rename = "hasBeenDragged", default)]
    pub was_dragged: bool,
}

/// A word-definition popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub word: String,
    pub position: PopupPosition,
    #[serde(default)]
    pub timestamp: u64,
    pub id: String,
}

impl Popup {
    pub fn new(word: impl Into<String>, position: PopupPosition) -> Self {
        Self {
            word: word.into(),
            position,
            timestamp: crate::time::now_millis(),
            id: format!("word-popup-{}", Uuid::new_v4()),
        }
    }
}

/// Popups of every document, persisted under `${key}-popups`.
///
/// A document holds at most one popup per word.
#[derive(Debug, Clone, Default)]
pub struct PopupStore {
    popups: HashMap<DocumentKey, Vec<Popup>>,
}

impl PopupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn popups(&self, key: &DocumentKey) -> &[Popup] {
        self.popups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Insert or replace the popup for `popup.word`, then persist.
    pub fn save<S>(&mut self, store: &mut S, key: &DocumentKey, popup: Popup)
    where
        S: KeyValueStore + ?Sized,
    {
        let popups = self.popups.entry(key.clone()).or_default();
        match popups.iter_mut().find(|p| p.word == popup.word) {
            Some(existing) => *existing = popup,
            None => popups.push(popup),
        }
        self.persist(store, key);
    }

    /// Read a document's persisted popups into memory.
    ///
    /// Storage only fills documents not held in memory yet; after that
    /// memory wins and a disagreeing persisted list is rewritten. Corrupt
    /// data is logged and treated as no popups.
    pub fn load<S>(&mut self, store: &mut S, key: &DocumentKey) -> &[Popup]
    where
        S: KeyValueStore + ?Sized,
    {
        let persisted = match read_json::<_, Vec<Popup>>(store, &key.popups_key()) {
            Ok(popups) => popups,
            Err(e) => {
                log::warn!("Ignoring unreadable popups for {}: {}", key, e);
                None
            }
        };

        match self.popups.get(key) {
            Some(in_memory) => {
                let in_sync = match &persisted {
                    Some(popups) => popups == in_memory,
                    None => in_memory.is_empty(),
                };
                if !in_sync {
                    log::warn!("Stored popups for {} are stale, rewriting from memory", key);
                    self.persist(store, key);
                }
            }
            None => {
                self.popups.insert(key.clone(), persisted.unwrap_or_default());
            }
        }
        self.popups(key)
    }

    /// Drop the popup for `word`, returning it.
    pub fn remove<S>(&mut self, store: &mut S, key: &DocumentKey, word: &str) -> Option<Popup>
    where
        S: KeyValueStore + ?Sized,
    {
        let popups = self.popups.get_mut(key)?;
        let index = popups.iter().position(|p| p.word == word)?;
        let removed = popups.remove(index);
        self.persist(store, key);
        Some(removed)
    }

    /// Drop every popup of a document and its persisted entry.
    pub fn clear<S>(&mut self, store: &mut S, key: &DocumentKey) -> Vec<Popup>
    where
        S: KeyValueStore + ?Sized,
    {
        let cleared = self.popups.insert(key.clone(), Vec::new()).unwrap_or_default();
        if let Err(e) = store.remove(&key.popups_key()) {
            log::error!("Failed to remove popups of {}: {}", key, e);
        }
        cleared
    }

    /// Replace a document's popups and persist.
    pub fn restore<S>(&mut self, store: &mut S, key: &DocumentKey, popups: Vec<Popup>)
    where
        S: KeyValueStore + ?Sized,
    {
        let has_popups = !popups.is_empty();
        self.popups.insert(key.clone(), popups);
        if has_popups {
            self.persist(store, key);
        }
    }

    /// Drop every document's popups and every persisted popup list.
    pub fn clear_all<S>(&mut self, store: &mut S) -> BTreeMap<DocumentKey, Vec<Popup>>
    where
        S: KeyValueStore + ?Sized,
    {
        let cleared = self
            .popups
            .iter_mut()
            .filter(|(_, popups)| !popups.is_empty())
            .map(|(key, popups)| (key.clone(), std::mem::take(popups)))
            .collect();

        match store.keys_with_suffix(POPUPS_SUFFIX) {
            Ok(keys) => {
                for key in keys {
                    if let Err(e) = store.remove(&key) {
                        log::error!("Failed to remove {}: {}", key, e);
                    }
                }
            }
            Err(e) => log::error!("Failed to enumerate popup keys: {}", e),
        }
        cleared
    }

    fn persist<S>(&self, store: &mut S, key: &DocumentKey)
    where
        S: KeyValueStore + ?Sized,
    {
        if let Err(e) = write_json(store, &key.popups_key(), self.popups(key)) {
            log::error!("Failed to persist popups for {}: {}", key, e);
        }
    }
}
