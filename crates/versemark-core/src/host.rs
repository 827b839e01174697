//! Host seam: the tab shell the engine annotates.

use thiserror::Error;

use crate::document::{ActiveDocument, PassageSnapshot, TabId, TabSnapshot};
use crate::tools::ToolSettings;

/// Errors reported by host tab operations.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Unknown tab: {0}")]
    UnknownTab(TabId),
    #[error("Host operation failed: {0}")]
    Failed(String),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Tab shell hosting the annotation surfaces.
///
/// The tab methods are called while undo/redo dispatches an operation. Any
/// history recording they trigger is dropped by the recording gate, but
/// hosts should not record their own side effects from these entry points.
pub trait TabHost {
    /// The active tab and the document it shows, if any.
    fn active_document(&self) -> Option<ActiveDocument>;

    /// Close a tab.
    fn close_tab(&mut self, tab: TabId) -> HostResult<()>;

    /// Re-insert a previously closed or undone tab.
    fn restore_tab(&mut self, snapshot: &TabSnapshot, make_active: bool) -> HostResult<()>;

    /// Make a tab active.
    fn switch_tab(&mut self, tab: TabId) -> HostResult<()>;

    /// Whether the tab currently exists.
    fn has_tab(&self, tab: TabId) -> bool;

    /// Assign passage fields to a tab and re-render what it already holds.
    fn show_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> HostResult<()>;

    /// Assign passage fields to a tab and load its text again.
    fn load_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> HostResult<()>;

    /// Tool selection, colors or sizes changed.
    fn settings_changed(&mut self, _settings: &ToolSettings) {}

    /// Undo/redo availability changed.
    fn history_changed(&mut self, _can_undo: bool, _can_redo: bool) {}
}

/// Host with a single fixed document and no tabs.
///
/// Tab operations fail with [`HostError::UnknownTab`].
#[derive(Debug, Clone, Default)]
pub struct SingleDocumentHost {
    document: Option<ActiveDocument>,
}

impl SingleDocumentHost {
    pub fn new(document: ActiveDocument) -> Self {
        Self {
            document: Some(document),
        }
    }

    /// A host with nothing to annotate.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_document(&mut self, document: Option<ActiveDocument>) {
        self.document = document;
    }
}

impl TabHost for SingleDocumentHost {
    fn active_document(&self) -> Option<ActiveDocument> {
        self.document.clone()
    }

    fn close_tab(&mut self, tab: TabId) -> HostResult<()> {
        Err(HostError::UnknownTab(tab))
    }

    fn restore_tab(&mut self, snapshot: &TabSnapshot, _make_active: bool) -> HostResult<()> {
        Err(HostError::UnknownTab(snapshot.id))
    }

    fn switch_tab(&mut self, tab: TabId) -> HostResult<()> {
        if self.has_tab(tab) {
            Ok(())
        } else {
            Err(HostError::UnknownTab(tab))
        }
    }

    fn has_tab(&self, tab: TabId) -> bool {
        self.document.as_ref().is_some_and(|d| d.tab_id == tab)
    }

    fn show_passage(&mut self, tab: TabId, _passage: &PassageSnapshot) -> HostResult<()> {
        Err(HostError::UnknownTab(tab))
    }

    fn load_passage(&mut self, tab: TabId, _passage: &PassageSnapshot) -> HostResult<()> {
        Err(HostError::UnknownTab(tab))
    }
}
