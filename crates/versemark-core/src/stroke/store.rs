//! Per-document stroke history with a redo mirror.

use std::collections::{BTreeMap, HashMap};

use super::Stroke;
use crate::config::MAX_STROKES_PER_DOCUMENT;
use crate::document::DocumentKey;
use crate::storage::{KeyValueStore, STROKES_SUFFIX, StorageError, read_json, write_json};

/// Result of reading a document's persisted strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The persisted list filled a document not yet held in memory.
    Loaded(usize),
    /// Memory already matched storage.
    Unchanged,
    /// Storage disagreed with memory, so memory was written back.
    Rewritten(usize),
    /// Nothing persisted for this document.
    Missing,
    /// Persisted data could not be parsed; memory was left alone.
    Corrupt,
}

/// Committed strokes of every document, keyed by document identity.
///
/// Each document has a history stack and a redo stack. Every mutation
/// persists the history under `${key}-strokes`. Persistence failures are
/// logged and never roll back memory, which stays authoritative for the
/// session.
#[derive(Debug, Clone)]
pub struct StrokeStore {
    history: HashMap<DocumentKey, Vec<Stroke>>,
    redo: HashMap<DocumentKey, Vec<Stroke>>,
    capacity: usize,
}

impl Default for StrokeStore {
    fn default() -> Self {
        Self::new(MAX_STROKES_PER_DOCUMENT)
    }
}

impl StrokeStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: HashMap::new(),
            redo: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Committed strokes of a document, oldest first.
    pub fn strokes(&self, key: &DocumentKey) -> &[Stroke] {
        self.history.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Undone strokes of a document, most recently undone last.
    pub fn redo_strokes(&self, key: &DocumentKey) -> &[Stroke] {
        self.redo.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self, key: &DocumentKey) -> usize {
        self.strokes(key).len()
    }

    pub fn redo_len(&self, key: &DocumentKey) -> usize {
        self.redo_strokes(key).len()
    }

    /// Documents with strokes in memory.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentKey> {
        self.history
            .iter()
            .filter(|(_, strokes)| !strokes.is_empty())
            .map(|(key, _)| key)
    }

    /// Append a stroke, drop the document's redo stack and persist.
    ///
    /// Returns the committed stroke; recording it in the unified history is
    /// left to the caller.
    pub fn commit<S>(&mut self, store: &mut S, key: &DocumentKey, stroke: Stroke) -> &Stroke
    where
        S: KeyValueStore + ?Sized,
    {
        self.redo.remove(key);
        let strokes = self.history.entry(key.clone()).or_default();
        strokes.push(stroke);
        if strokes.len() > self.capacity {
            let excess = strokes.len() - self.capacity;
            strokes.drain(..excess);
            log::debug!("Evicted {} oldest stroke(s) from {}", excess, key);
        }
        self.persist(store, key);

        let strokes = self.strokes(key);
        &strokes[strokes.len() - 1]
    }

    /// Move the newest stroke to the redo stack. `false` when there is none.
    pub fn undo_last<S>(&mut self, store: &mut S, key: &DocumentKey) -> bool
    where
        S: KeyValueStore + ?Sized,
    {
        let Some(stroke) = self.history.get_mut(key).and_then(Vec::pop) else {
            return false;
        };
        self.redo.entry(key.clone()).or_default().push(stroke);
        self.persist(store, key);
        true
    }

    /// Move the most recently undone stroke back. `false` when there is none.
    pub fn redo_last<S>(&mut self, store: &mut S, key: &DocumentKey) -> bool
    where
        S: KeyValueStore + ?Sized,
    {
        let Some(stroke) = self.redo.get_mut(key).and_then(Vec::pop) else {
            return false;
        };
        self.history.entry(key.clone()).or_default().push(stroke);
        self.persist(store, key);
        true
    }

    /// Empty a document's stacks and remove its persisted entry.
    ///
    /// Returns the strokes that were committed so the caller can make the
    /// clear undoable.
    pub fn clear<S>(&mut self, store: &mut S, key: &DocumentKey) -> Vec<Stroke>
    where
        S: KeyValueStore + ?Sized,
    {
        self.redo.remove(key);
        let cleared = self.history.insert(key.clone(), Vec::new()).unwrap_or_default();
        if let Err(e) = store.remove(&key.strokes_key()) {
            log::error!("Failed to remove strokes of {}: {}", key, e);
        }
        cleared
    }

    /// Replace a document's history with `strokes` and persist.
    pub fn restore<S>(&mut self, store: &mut S, key: &DocumentKey, strokes: Vec<Stroke>)
    where
        S: KeyValueStore + ?Sized,
    {
        self.history.insert(key.clone(), strokes);
        self.persist(store, key);
    }

    /// Empty every document and remove every persisted stroke list.
    ///
    /// Returns the non-empty in-memory histories that were dropped.
    pub fn clear_all<S>(&mut self, store: &mut S) -> BTreeMap<DocumentKey, Vec<Stroke>>
    where
        S: KeyValueStore + ?Sized,
    {
        let cleared: BTreeMap<_, _> = self
            .history
            .iter_mut()
            .filter(|(_, strokes)| !strokes.is_empty())
            .map(|(key, strokes)| (key.clone(), std::mem::take(strokes)))
            .collect();
        self.redo.clear();

        match store.keys_with_suffix(STROKES_SUFFIX) {
            Ok(keys) => {
                for key in keys {
                    if let Err(e) = store.remove(&key) {
                        log::error!("Failed to remove {}: {}", key, e);
                    }
                }
            }
            Err(e) => log::error!("Failed to enumerate stroke keys: {}", e),
        }
        cleared
    }

    /// Reconcile a document with its persisted strokes.
    ///
    /// Storage only fills documents memory does not hold yet. Once a
    /// document is in memory it is authoritative: a stale or corrupt
    /// persisted list is overwritten with the in-memory one.
    pub fn load<S>(&mut self, store: &mut S, key: &DocumentKey) -> LoadOutcome
    where
        S: KeyValueStore + ?Sized,
    {
        let persisted: Result<Option<Vec<Stroke>>, LoadOutcome> =
            match read_json(store, &key.strokes_key()) {
                Ok(strokes) => Ok(strokes),
                Err(StorageError::Serialization(e)) => {
                    log::warn!("Ignoring corrupt strokes for {}: {}", key, e);
                    Err(LoadOutcome::Corrupt)
                }
                Err(e) => {
                    log::error!("Failed to read strokes for {}: {}", key, e);
                    Err(LoadOutcome::Missing)
                }
            };

        if let Some(in_memory) = self.history.get(key) {
            let in_sync = match &persisted {
                Ok(Some(strokes)) => strokes == in_memory,
                Ok(None) => in_memory.is_empty(),
                Err(_) => false,
            };
            if in_sync {
                return LoadOutcome::Unchanged;
            }
            let count = in_memory.len();
            log::warn!("Stored strokes for {} are stale, rewriting {} from memory", key, count);
            self.persist(store, key);
            return LoadOutcome::Rewritten(count);
        }

        match persisted {
            Ok(Some(strokes)) => {
                let count = strokes.len();
                self.history.insert(key.clone(), strokes);
                log::debug!("Loaded {} stroke(s) for {}", count, key);
                LoadOutcome::Loaded(count)
            }
            Ok(None) => LoadOutcome::Missing,
            Err(outcome) => outcome,
        }
    }

    fn persist<S>(&self, store: &mut S, key: &DocumentKey)
    where
        S: KeyValueStore + ?Sized,
    {
        if let Err(e) = write_json(store, &key.strokes_key(), self.strokes(key)) {
            log::error!("Failed to persist strokes for {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::stroke::{InputKind, StrokeKind};
    use crate::tools::DrawingSettings;
    use kurbo::Point;

    fn stroke(x: f64) -> Stroke {
        Stroke::new(
            &DrawingSettings::new(StrokeKind::Pen, "#000000", 2.0),
            vec![Point::new(x, 0.0), Point::new(x + 1.0, 1.0)],
            InputKind::Mouse,
        )
    }

    fn persisted(store: &MemoryStore, key: &DocumentKey) -> Option<Vec<Stroke>> {
        read_json(store, &key.strokes_key()).unwrap()
    }

    #[test]
    fn test_commit_persists() {
        let mut store = MemoryStore::new();
        let mut strokes = StrokeStore::default();
        let key = DocumentKey::new("doc");

        let committed = strokes.commit(&mut store, &key, stroke(1.0)).clone();
        assert_eq!(committed.points, stroke(1.0).points);
        assert_eq!(strokes.len(&key), 1);
        assert_eq!(persisted(&store, &key).unwrap(), vec![committed]);
    }

    #[test]
    fn test_undo_redo_conserves_strokes() {
        let mut store = MemoryStore::new();
        let mut strokes = StrokeStore::default();
        let key = DocumentKey::new("doc");
        for i in 0..5 {
            strokes.commit(&mut store, &key, stroke(i as f64));
        }
        let original = strokes.strokes(&key).to_vec();

        for _ in 0..3 {
            assert!(strokes.undo_last(&mut store, &key));
            assert_eq!(strokes.len(&key) + strokes.redo_len(&key), 5);
        }
        assert_eq!(strokes.strokes(&key), &original[..2]);
        assert_eq!(persisted(&store, &key).unwrap().len(), 2);

        for _ in 0..3 {
            assert!(strokes.redo_last(&mut store, &key));
        }
        assert_eq!(strokes.strokes(&key), original.as_slice());
        assert!(!strokes.redo_last(&mut store, &key));
    }

    #[test]
    fn test_undo_empty_fails() {
        let mut store = MemoryStore::new();
        let mut strokes = StrokeStore::default();
        assert!(!strokes.undo_last(&mut store, &DocumentKey::new("none")));
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut store = MemoryStore::new();
        let mut strokes = StrokeStore::default();
        let key = DocumentKey::new("doc");
        strokes.commit(&mut store, &key, stroke(0.0));
        strokes.undo_last(&mut store, &key);
        assert_eq!(strokes.redo_len(&key), 1);

        strokes.commit(&mut store, &key, stroke(2.0));
        assert_eq!(strokes.redo_len(&key), 0);
        assert!(!strokes.redo_last(&mut store, &key));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut store = MemoryStore::new();
        let mut strokes = StrokeStore::new(3);
        let key = DocumentKey::new("doc");
        for i in 0..5 {
            strokes.commit(&mut store, &key, stroke(i as f64));
        }
        let xs: Vec<f64> = strokes.strokes(&key).iter().map(|s| s.points[0].x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_documents_are_isolated() {
        let mut store = MemoryStore::new();
        let mut strokes = StrokeStore::default();
        let a = DocumentKey::new("a");
        let b = DocumentKey::new("b");
        strokes.commit(&mut store, &a, stroke(0.0));
        strokes.commit(&mut store, &b, stroke(1.0));

        strokes.undo_last(&mut store, &a);
        assert_eq!(strokes.len(&a), 0);
        assert_eq!(strokes.len(&b), 1);
    }

    #[test]
    fn test_clear_returns_strokes() {
        let mut store = MemoryStore::new();
        let mut strokes = StrokeStore::default();
        let key = DocumentKey::new("doc");
        strokes.commit(&mut store, &key, stroke(0.0));
        strokes.commit(&mut store, &key, stroke(1.0));
        let before = strokes.strokes(&key).to_vec();

        let cleared = strokes.clear(&mut store, &key);
        assert_eq!(cleared, before);
        assert_eq!(strokes.len(&key), 0);
        assert!(persisted(&store, &key).is_none());

        strokes.restore(&mut store, &key, cleared);
        assert_eq!(strokes.strokes(&key), before.as_slice());
        assert_eq!(persisted(&store, &key).unwrap(), before);
    }

    #[test]
    fn test_clear_all_removes_persisted_lists() {
        let mut store = MemoryStore::new();
        let mut strokes = StrokeStore::default();
        strokes.commit(&mut store, &DocumentKey::new("a"), stroke(0.0));
        strokes.commit(&mut store, &DocumentKey::new("b"), stroke(1.0));
        // Persisted but never loaded this session
        store.set("c-strokes", "[]").unwrap();
        store.set("a-popups", "[]").unwrap();

        let cleared = strokes.clear_all(&mut store);
        assert_eq!(cleared.len(), 2);
        assert!(store.keys_with_suffix(STROKES_SUFFIX).unwrap().is_empty());
        assert!(store.get("a-popups").unwrap().is_some());
        assert_eq!(strokes.documents().count(), 0);
    }

    #[test]
    fn test_persist_failure_keeps_memory() {
        let mut store = MemoryStore::with_quota(8);
        let mut strokes = StrokeStore::default();
        let key = DocumentKey::new("doc");

        strokes.commit(&mut store, &key, stroke(0.0));
        assert_eq!(strokes.len(&key), 1);
        assert!(store.is_empty());
        assert!(strokes.undo_last(&mut store, &key));
        assert_eq!(strokes.redo_len(&key), 1);
    }

    #[test]
    fn test_load_prefers_storage() {
        let mut store = MemoryStore::new();
        let key = DocumentKey::new("doc");
        let mut writer = StrokeStore::default();
        writer.commit(&mut store, &key, stroke(0.0));
        writer.commit(&mut store, &key, stroke(1.0));

        let mut reader = StrokeStore::default();
        assert_eq!(reader.load(&mut store, &key), LoadOutcome::Loaded(2));
        assert_eq!(reader.load(&mut store, &key), LoadOutcome::Unchanged);
        assert_eq!(reader.load(&mut store, &DocumentKey::new("other")), LoadOutcome::Missing);
    }

    #[test]
    fn test_load_keeps_memory_after_failed_write() {
        let mut store = MemoryStore::new();
        let key = DocumentKey::new("doc");
        let mut strokes = StrokeStore::default();
        strokes.commit(&mut store, &key, stroke(0.0));
        let used = store.used_bytes();

        // The second stroke only lives in memory
        store.set_quota(Some(used));
        strokes.commit(&mut store, &key, stroke(1.0));
        assert_eq!(persisted(&store, &key).unwrap().len(), 1);

        store.set_quota(None);
        assert_eq!(strokes.load(&mut store, &key), LoadOutcome::Rewritten(2));
        assert_eq!(strokes.len(&key), 2);
        assert_eq!(strokes.strokes(&key)[1].points[0].x, 1.0);
        assert_eq!(persisted(&store, &key).unwrap().len(), 2);
        assert_eq!(strokes.load(&mut store, &key), LoadOutcome::Unchanged);
    }

    #[test]
    fn test_load_after_clear_ignores_stale_storage() {
        let mut store = MemoryStore::new();
        let key = DocumentKey::new("doc");
        let mut strokes = StrokeStore::default();
        strokes.commit(&mut store, &key, stroke(0.0));
        strokes.clear(&mut store, &key);
        store.set(&key.strokes_key(), &serde_json::to_string(&vec![stroke(5.0)]).unwrap()).unwrap();

        assert_eq!(strokes.load(&mut store, &key), LoadOutcome::Rewritten(0));
        assert_eq!(strokes.len(&key), 0);
        assert_eq!(persisted(&store, &key).unwrap(), Vec::<Stroke>::new());
    }

    #[test]
    fn test_load_corrupt_keeps_memory() {
        let mut store = MemoryStore::new();
        let key = DocumentKey::new("doc");
        let mut strokes = StrokeStore::default();
        strokes.commit(&mut store, &key, stroke(0.0));
        store.set(&key.strokes_key(), "[{broken").unwrap();

        assert_eq!(strokes.load(&mut store, &key), LoadOutcome::Rewritten(1));
        assert_eq!(strokes.len(&key), 1);
        assert_eq!(persisted(&store, &key).unwrap().len(), 1);

        let mut fresh = StrokeStore::default();
        store.set("other-strokes", "[{broken").unwrap();
        assert_eq!(fresh.load(&mut store, &DocumentKey::new("other")), LoadOutcome::Corrupt);
        assert_eq!(fresh.documents().count(), 0);
    }
}
