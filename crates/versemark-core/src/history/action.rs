//! Recorded user actions and their inverse dispatch.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{DocumentKey, PassageSnapshot, TabId, TabSnapshot};
use crate::host::HostError;
use crate::popup::Popup;
use crate::storage::StorageError;
use crate::stroke::Stroke;
use crate::tools::ToolKind;

/// Errors raised while undoing or redoing an operation.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Host operation failed: {0}")]
    Host(#[from] HostError),
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),
    #[error("Operation has no document")]
    MissingDocument,
    #[error("Recorded stroke is not the newest {0} stroke of {1}")]
    StrokeOutOfSync(&'static str, DocumentKey),
}

/// Everything a clear-all removed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClearedData {
    /// Stroke lists that were in memory.
    pub strokes: BTreeMap<DocumentKey, Vec<Stroke>>,
    /// Popup lists that were in memory.
    pub popups: BTreeMap<DocumentKey, Vec<Popup>>,
    /// Raw persisted `-strokes`/`-popups` values, including documents never
    /// opened this session.
    pub persisted: BTreeMap<String, String>,
}

impl ClearedData {
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.popups.is_empty() && self.persisted.is_empty()
    }

    /// Total number of strokes held in memory when cleared.
    pub fn stroke_count(&self) -> usize {
        self.strokes.values().map(Vec::len).sum()
    }
}

/// Kind tag of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ToolChange,
    ColorChange,
    SizeChange,
    TabCreate,
    TabClose,
    TabSwitch,
    Clear,
    ClearAll,
    PassageLoad,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::ToolChange => "tool_change",
            ActionKind::ColorChange => "color_change",
            ActionKind::SizeChange => "size_change",
            ActionKind::TabCreate => "tab_create",
            ActionKind::TabClose => "tab_close",
            ActionKind::TabSwitch => "tab_switch",
            ActionKind::Clear => "clear",
            ActionKind::ClearAll => "clear_all",
            ActionKind::PassageLoad => "passage_load",
        };
        f.write_str(name)
    }
}

/// A discrete, reversible user action with its before/after state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Action {
    ToolChange {
        from: ToolKind,
        to: ToolKind,
    },
    ColorChange {
        tool: ToolKind,
        from: String,
        to: String,
    },
    SizeChange {
        from: f64,
        to: f64,
    },
    TabCreate {
        tab: TabSnapshot,
    },
    TabClose {
        tab: TabSnapshot,
        was_active: bool,
    },
    TabSwitch {
        from: TabId,
        to: TabId,
    },
    Clear {
        tab_id: TabId,
        document: DocumentKey,
        strokes: Vec<Stroke>,
        #[serde(default)]
        popups: Vec<Popup>,
    },
    ClearAll {
        cleared: ClearedData,
    },
    PassageLoad {
        tab_id: TabId,
        previous: PassageSnapshot,
        next: PassageSnapshot,
    },
}

/// Operations the inverse dispatch drives.
///
/// Implemented by the engine. Every call happens inside a restoring region,
/// so nothing done here is recorded.
pub trait ActionTarget {
    fn apply_tool(&mut self, tool: ToolKind);
    fn apply_color(&mut self, tool: ToolKind, color: &str);
    fn apply_pen_size(&mut self, size: f64);
    fn close_tab(&mut self, tab: TabId) -> Result<(), ReplayError>;
    fn restore_tab(&mut self, tab: &TabSnapshot, make_active: bool) -> Result<(), ReplayError>;
    fn switch_tab(&mut self, tab: TabId) -> Result<(), ReplayError>;
    /// Put cleared strokes and popups back into a document and repaint it.
    fn restore_document(
        &mut self,
        tab: TabId,
        key: &DocumentKey,
        strokes: &[Stroke],
        popups: &[Popup],
    ) -> Result<(), ReplayError>;
    /// Wipe a document's strokes, popups and raster without recording.
    fn wipe_document(&mut self, key: &DocumentKey) -> Result<(), ReplayError>;
    fn restore_all(&mut self, cleared: &ClearedData) -> Result<(), ReplayError>;
    fn wipe_all(&mut self) -> Result<(), ReplayError>;
    /// Reassign a tab's passage and re-render it.
    fn show_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> Result<(), ReplayError>;
    /// Reassign a tab's passage and load it again.
    fn reload_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> Result<(), ReplayError>;
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::ToolChange { .. } => ActionKind::ToolChange,
            Action::ColorChange { .. } => ActionKind::ColorChange,
            Action::SizeChange { .. } => ActionKind::SizeChange,
            Action::TabCreate { .. } => ActionKind::TabCreate,
            Action::TabClose { .. } => ActionKind::TabClose,
            Action::TabSwitch { .. } => ActionKind::TabSwitch,
            Action::Clear { .. } => ActionKind::Clear,
            Action::ClearAll { .. } => ActionKind::ClearAll,
            Action::PassageLoad { .. } => ActionKind::PassageLoad,
        }
    }

    /// Bring `target` back to the state before this action.
    pub fn restore_before<T>(&self, target: &mut T) -> Result<(), ReplayError>
    where
        T: ActionTarget + ?Sized,
    {
        match self {
            Action::ToolChange { from, .. } => target.apply_tool(*from),
            Action::ColorChange { tool, from, .. } => target.apply_color(*tool, from),
            Action::SizeChange { from, .. } => target.apply_pen_size(*from),
            Action::TabCreate { tab } => target.close_tab(tab.id)?,
            Action::TabClose { tab, was_active } => target.restore_tab(tab, *was_active)?,
            Action::TabSwitch { from, .. } => target.switch_tab(*from)?,
            Action::Clear {
                tab_id,
                document,
                strokes,
                popups,
            } => target.restore_document(*tab_id, document, strokes, popups)?,
            Action::ClearAll { cleared } => target.restore_all(cleared)?,
            Action::PassageLoad {
                tab_id, previous, ..
            } => target.show_passage(*tab_id, previous)?,
        }
        Ok(())
    }

    /// Apply this action to `target` again.
    pub fn reapply<T>(&self, target: &mut T) -> Result<(), ReplayError>
    where
        T: ActionTarget + ?Sized,
    {
        match self {
            Action::ToolChange { to, .. } => target.apply_tool(*to),
            Action::ColorChange { tool, to, .. } => target.apply_color(*tool, to),
            Action::SizeChange { to, .. } => target.apply_pen_size(*to),
            Action::TabCreate { tab } => target.restore_tab(tab, true)?,
            Action::TabClose { tab, .. } => target.close_tab(tab.id)?,
            Action::TabSwitch { to, .. } => target.switch_tab(*to)?,
            Action::Clear { document, .. } => target.wipe_document(document)?,
            Action::ClearAll { .. } => target.wipe_all()?,
            Action::PassageLoad { tab_id, next, .. } => target.reload_passage(*tab_id, next)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Target that logs every call.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail_tabs: bool,
    }

    impl Recorder {
        fn tab_call(&mut self, call: String, tab: TabId) -> Result<(), ReplayError> {
            self.calls.push(call);
            if self.fail_tabs {
                Err(HostError::UnknownTab(tab).into())
            } else {
                Ok(())
            }
        }
    }

    impl ActionTarget for Recorder {
        fn apply_tool(&mut self, tool: ToolKind) {
            self.calls.push(format!("tool {}", tool.name()));
        }
        fn apply_color(&mut self, tool: ToolKind, color: &str) {
            self.calls.push(format!("color {} {}", tool.name(), color));
        }
        fn apply_pen_size(&mut self, size: f64) {
            self.calls.push(format!("size {}", size));
        }
        fn close_tab(&mut self, tab: TabId) -> Result<(), ReplayError> {
            self.tab_call(format!("close {}", tab), tab)
        }
        fn restore_tab(&mut self, tab: &TabSnapshot, make_active: bool) -> Result<(), ReplayError> {
            self.tab_call(format!("restore {} {}", tab.id, make_active), tab.id)
        }
        fn switch_tab(&mut self, tab: TabId) -> Result<(), ReplayError> {
            self.tab_call(format!("switch {}", tab), tab)
        }
        fn restore_document(
            &mut self,
            tab: TabId,
            key: &DocumentKey,
            strokes: &[Stroke],
            _popups: &[Popup],
        ) -> Result<(), ReplayError> {
            self.calls.push(format!("restore_document {} {} {}", tab, key, strokes.len()));
            Ok(())
        }
        fn wipe_document(&mut self, key: &DocumentKey) -> Result<(), ReplayError> {
            self.calls.push(format!("wipe {}", key));
            Ok(())
        }
        fn restore_all(&mut self, cleared: &ClearedData) -> Result<(), ReplayError> {
            self.calls.push(format!("restore_all {}", cleared.strokes.len()));
            Ok(())
        }
        fn wipe_all(&mut self) -> Result<(), ReplayError> {
            self.calls.push("wipe_all".to_string());
            Ok(())
        }
        fn show_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> Result<(), ReplayError> {
            self.calls.push(format!("show {} {}", tab, passage.book));
            Ok(())
        }
        fn reload_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> Result<(), ReplayError> {
            self.calls.push(format!("reload {} {}", tab, passage.book));
            Ok(())
        }
    }

    fn both_ways(action: &Action) -> Vec<String> {
        let mut target = Recorder::default();
        action.restore_before(&mut target).unwrap();
        action.reapply(&mut target).unwrap();
        target.calls
    }

    #[test]
    fn test_settings_actions() {
        assert_eq!(
            both_ways(&Action::ToolChange {
                from: ToolKind::Pen,
                to: ToolKind::Highlight
            }),
            vec!["tool pen", "tool highlight"]
        );
        assert_eq!(
            both_ways(&Action::ColorChange {
                tool: ToolKind::Highlight,
                from: "#ffff00".into(),
                to: "#00ff00".into()
            }),
            vec!["color highlight #ffff00", "color highlight #00ff00"]
        );
        assert_eq!(
            both_ways(&Action::SizeChange { from: 4.0, to: 8.0 }),
            vec!["size 4", "size 8"]
        );
    }

    #[test]
    fn test_tab_actions() {
        let tab = TabSnapshot::new(TabId(3), "ESV");
        assert_eq!(
            both_ways(&Action::TabCreate { tab: tab.clone() }),
            vec!["close 3", "restore 3 true"]
        );
        assert_eq!(
            both_ways(&Action::TabClose {
                tab,
                was_active: false
            }),
            vec!["restore 3 false", "close 3"]
        );
        assert_eq!(
            both_ways(&Action::TabSwitch {
                from: TabId(1),
                to: TabId(2)
            }),
            vec!["switch 1", "switch 2"]
        );
    }

    #[test]
    fn test_clear_actions() {
        let clear = Action::Clear {
            tab_id: TabId(1),
            document: DocumentKey::new("doc"),
            strokes: Vec::new(),
            popups: Vec::new(),
        };
        assert_eq!(both_ways(&clear), vec!["restore_document 1 doc 0", "wipe doc"]);
        assert_eq!(
            both_ways(&Action::ClearAll {
                cleared: ClearedData::default()
            }),
            vec!["restore_all 0", "wipe_all"]
        );
    }

    #[test]
    fn test_passage_load() {
        let action = Action::PassageLoad {
            tab_id: TabId(4),
            previous: PassageSnapshot::new("Ruth", 1, 1, "ESV"),
            next: PassageSnapshot::new("John", 3, 16, "ESV"),
        };
        assert_eq!(both_ways(&action), vec!["show 4 Ruth", "reload 4 John"]);
    }

    #[test]
    fn test_host_failure_propagates() {
        let mut target = Recorder {
            fail_tabs: true,
            ..Default::default()
        };
        let result = Action::TabSwitch {
            from: TabId(1),
            to: TabId(2),
        }
        .restore_before(&mut target);
        assert!(matches!(result, Err(ReplayError::Host(HostError::UnknownTab(TabId(1))))));
    }

    #[test]
    fn test_action_json_layout() {
        let action = Action::ToolChange {
            from: ToolKind::Pen,
            to: ToolKind::Highlight,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "tool_change");
        assert_eq!(json["data"]["from"], "pen");
        assert_eq!(json["data"]["to"], "highlight");

        let parsed: Action =
            serde_json::from_str(r#"{"type":"size_change","data":{"from":2,"to":6}}"#).unwrap();
        assert_eq!(parsed, Action::SizeChange { from: 2.0, to: 6.0 });
        assert_eq!(parsed.kind(), ActionKind::SizeChange);
        assert_eq!(parsed.kind().to_string(), "size_change");
    }
}
