//! In-memory tab shell.
//!
//! User-facing operations (`create_tab`, `close`, `switch_to`,
//! `open_passage`) record undoable actions through the attached history.
//! The [`TabHost`] methods are what undo/redo drive and never record.

use versemark_core::document::{ActiveDocument, DocumentMode, PassageSnapshot, TabId, TabSnapshot};
use versemark_core::history::{Action, HistoryHandle};
use versemark_core::host::{HostError, HostResult, TabHost};

/// Tab list with one active tab.
#[derive(Debug, Clone)]
pub struct TabManager {
    tabs: Vec<TabSnapshot>,
    active: Option<TabId>,
    next_id: u64,
    default_translation: String,
    history: Option<HistoryHandle>,
}

impl TabManager {
    /// An empty shell; call [`create_tab`](Self::create_tab) to open the
    /// first tab.
    pub fn new(default_translation: impl Into<String>) -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            next_id: 1,
            default_translation: default_translation.into(),
            history: None,
        }
    }

    /// Record user operations into `history`.
    pub fn attach_history(&mut self, history: HistoryHandle) {
        self.history = Some(history);
    }

    pub fn tabs(&self) -> &[TabSnapshot] {
        &self.tabs
    }

    pub fn tab(&self, id: TabId) -> Option<&TabSnapshot> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&TabSnapshot> {
        self.tab(self.active?)
    }

    fn tab_mut(&mut self, id: TabId) -> HostResult<&mut TabSnapshot> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(HostError::UnknownTab(id))
    }

    /// Context to record a tab operation in: the document shown before it,
    /// else the one shown after (an empty tab has none).
    fn context(&self, before: Option<ActiveDocument>) -> Option<ActiveDocument> {
        before.or_else(|| self.active_document())
    }

    fn record(&self, action: Action, context: Option<&ActiveDocument>) {
        if let Some(history) = &self.history {
            history.record_action(action, context);
        }
    }

    fn fresh_id(&mut self) -> TabId {
        let id = TabId(self.next_id);
        self.next_id += 1;
        id
    }

    // --- User operations ---

    /// Open a new empty tab and make it active.
    pub fn create_tab(&mut self) -> TabId {
        let before = self.active_document();
        let tab = TabSnapshot::new(self.fresh_id(), self.default_translation.clone());
        let id = tab.id;
        log::info!("Created tab {}", id);
        self.tabs.push(tab.clone());
        self.active = Some(id);

        let context = self.context(before);
        self.record(Action::TabCreate { tab }, context.as_ref());
        id
    }

    /// Close a tab, keeping a full snapshot so the close can be undone.
    pub fn close(&mut self, id: TabId) -> HostResult<()> {
        let snapshot = self.tab(id).cloned().ok_or(HostError::UnknownTab(id))?;
        let was_active = self.active == Some(id);
        let before = self.active_document();

        self.remove(id)?;
        let context = self.context(before);
        self.record(
            Action::TabClose {
                tab: snapshot,
                was_active,
            },
            context.as_ref(),
        );
        Ok(())
    }

    /// Make a tab active. `Ok(false)` if it already was.
    pub fn switch_to(&mut self, id: TabId) -> HostResult<bool> {
        if !self.has_tab(id) {
            return Err(HostError::UnknownTab(id));
        }
        let Some(from) = self.active.filter(|&from| from != id) else {
            self.active = Some(id);
            return Ok(false);
        };
        let before = self.active_document();
        self.active = Some(id);
        let context = self.context(before);
        self.record(Action::TabSwitch { from, to: id }, context.as_ref());
        Ok(true)
    }

    /// Load a passage into a tab.
    pub fn open_passage(&mut self, id: TabId, passage: PassageSnapshot) -> HostResult<()> {
        let before = self.active_document();
        let tab = self.tab_mut(id)?;
        let previous = std::mem::replace(&mut tab.passage, passage);
        tab.mode = DocumentMode::Bible;
        tab.passage.loaded = tab.passage.is_complete();
        let next = tab.passage.clone();
        log::info!("Tab {} now shows {} {:?}:{:?}", id, next.book, next.chapter, next.verse);

        let context = self.context(before);
        self.record(
            Action::PassageLoad {
                tab_id: id,
                previous,
                next,
            },
            context.as_ref(),
        );
        Ok(())
    }

    /// Switch a tab to media mode. Not undoable.
    pub fn open_media(&mut self, id: TabId, title: impl Into<String>, content: impl Into<String>) -> HostResult<()> {
        let tab = self.tab_mut(id)?;
        tab.mode = DocumentMode::Media;
        tab.media_title = Some(title.into());
        tab.media_content = Some(content.into());
        Ok(())
    }

    /// Remove a tab and pick the next active one: the tab now at the same
    /// position, else the previous one. Closing the last tab opens a fresh
    /// one without recording it.
    fn remove(&mut self, id: TabId) -> HostResult<()> {
        let index = self
            .tabs
            .iter()
            .position(|t| t.id == id)
            .ok_or(HostError::UnknownTab(id))?;
        self.tabs.remove(index);
        log::info!("Closed tab {}", id);

        if self.tabs.is_empty() {
            self.active = None;
            match self.history.clone() {
                Some(history) => {
                    history.run_automatic(|| self.create_tab());
                }
                None => {
                    self.create_tab();
                }
            }
            return Ok(());
        }
        if self.active == Some(id) {
            let next = index.min(self.tabs.len() - 1);
            self.active = Some(self.tabs[next].id);
        }
        Ok(())
    }
}

impl TabHost for TabManager {
    /// Bible tabs without a complete passage have nothing to annotate.
    fn active_document(&self) -> Option<ActiveDocument> {
        let tab = self.active_tab()?;
        if tab.mode == DocumentMode::Bible && !tab.passage.is_complete() {
            return None;
        }
        Some(ActiveDocument::for_tab(tab))
    }

    fn close_tab(&mut self, tab: TabId) -> HostResult<()> {
        self.remove(tab)
    }

    fn restore_tab(&mut self, snapshot: &TabSnapshot, make_active: bool) -> HostResult<()> {
        if !self.has_tab(snapshot.id) {
            self.tabs.push(snapshot.clone());
            self.next_id = self.next_id.max(snapshot.id.0 + 1);
        }
        if make_active || self.active.is_none() {
            self.active = Some(snapshot.id);
        }
        Ok(())
    }

    fn switch_tab(&mut self, tab: TabId) -> HostResult<()> {
        if !self.has_tab(tab) {
            return Err(HostError::UnknownTab(tab));
        }
        self.active = Some(tab);
        Ok(())
    }

    fn has_tab(&self, tab: TabId) -> bool {
        self.tab(tab).is_some()
    }

    fn show_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> HostResult<()> {
        self.tab_mut(tab)?.passage = passage.clone();
        Ok(())
    }

    fn load_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> HostResult<()> {
        let snapshot = self.tab_mut(tab)?;
        snapshot.passage = passage.clone();
        snapshot.passage.loaded = snapshot.passage.is_complete();
        Ok(())
    }
}
