//! Unified history properties across the engine, tab shell and raster
//! pipeline.

mod common;

use common::{annotator, draw, draw_many, with_passage};
use versemark_core::document::{ActiveDocument, PassageSnapshot, TabId, TabSnapshot};
use versemark_core::engine::AnnotationEngine;
use versemark_core::history::{Action, Direction, HistoryHandle};
use versemark_core::host::{HostResult, TabHost};
use versemark_core::storage::MemoryStore;
use versemark_core::tools::ToolKind;
use versemark_app::TabManager;
use versemark_render::RasterPipeline;

#[test]
fn test_undo_redo_conserves_strokes() {
    let mut annotator = with_passage("Genesis", 1, 1);
    let key = annotator.engine().current_key().unwrap();
    draw_many(&mut annotator, 6);
    let committed = annotator.engine().strokes().strokes(&key).to_vec();

    for undone in 1..=4 {
        assert!(annotator.engine_mut().undo());
        let strokes = annotator.engine().strokes();
        assert_eq!(strokes.len(&key) + strokes.redo_len(&key), 6);
        assert_eq!(strokes.strokes(&key), &committed[..6 - undone]);
    }
    for _ in 0..4 {
        assert!(annotator.engine_mut().redo());
    }
    assert_eq!(annotator.engine().strokes().strokes(&key), committed.as_slice());
    assert_eq!(annotator.engine().strokes().redo_len(&key), 0);
}

#[test]
fn test_undo_follows_recording_order_across_kinds() {
    let mut annotator = with_passage("Genesis", 1, 1);
    draw(&mut annotator, &[(0.0, 0.0), (20.0, 20.0)]);
    annotator.engine_mut().set_pen_size(9.0);
    draw(&mut annotator, &[(40.0, 0.0), (60.0, 20.0)]);

    let engine = annotator.engine_mut();
    assert!(engine.undo());
    assert_eq!(engine.current_strokes().len(), 1);
    assert_eq!(engine.settings().pen_size, 9.0);

    assert!(engine.undo());
    assert_eq!(engine.current_strokes().len(), 1);
    assert_eq!(engine.settings().pen_size, 4.0);

    assert!(engine.undo());
    assert!(engine.current_strokes().is_empty());
}

#[test]
fn test_new_stroke_invalidates_redo() {
    let mut annotator = with_passage("Genesis", 1, 1);
    draw_many(&mut annotator, 2);
    assert!(annotator.engine_mut().undo());
    assert!(annotator.engine().can_redo());

    draw(&mut annotator, &[(5.0, 200.0), (90.0, 220.0)]);
    let key = annotator.engine().current_key().unwrap();
    assert_eq!(annotator.engine().strokes().redo_len(&key), 0);
    assert!(!annotator.engine_mut().redo());
    assert_eq!(annotator.engine().current_strokes().len(), 2);
}

#[test]
fn test_clear_is_undoable() {
    let mut annotator = with_passage("Genesis", 1, 1);
    draw_many(&mut annotator, 2);
    let before = annotator.engine().current_strokes().to_vec();

    assert!(annotator.engine_mut().clear_document());
    assert!(annotator.engine().current_strokes().is_empty());
    assert!(annotator.current_view().unwrap().visible.is_blank());

    assert!(annotator.engine_mut().undo());
    assert_eq!(annotator.engine().current_strokes(), before.as_slice());
    assert!(!annotator.current_view().unwrap().visible.is_blank());
}

#[test]
fn test_tab_switch_is_undoable() {
    let mut annotator = with_passage("Genesis", 1, 1);
    let first = annotator.tabs().active_id().unwrap();
    let second = annotator.create_tab();
    annotator
        .open_passage(PassageSnapshot::new("Exodus", 3, 14, "ESV"))
        .unwrap();

    assert!(annotator.switch_tab(first).unwrap());
    assert_eq!(annotator.tabs().active_id(), Some(first));

    assert!(annotator.engine_mut().undo());
    assert_eq!(annotator.tabs().active_id(), Some(second));
    assert!(annotator.engine_mut().redo());
    assert_eq!(annotator.tabs().active_id(), Some(first));
}

#[test]
fn test_empty_tab_records_nothing() {
    let mut annotator = annotator();
    annotator.engine_mut().set_tool(ToolKind::Highlight);
    draw(&mut annotator, &[(0.0, 0.0), (10.0, 10.0)]);
    assert!(annotator.engine().history().is_empty());
    assert!(!annotator.engine().can_undo());
}

/// Tab shell whose close callback tries to undo again.
struct UndoFromHandler {
    tabs: TabManager,
    history: HistoryHandle,
    nested: Vec<bool>,
}

impl TabHost for UndoFromHandler {
    fn active_document(&self) -> Option<ActiveDocument> {
        self.tabs.active_document()
    }

    fn close_tab(&mut self, tab: TabId) -> HostResult<()> {
        let nested = self.history.begin(Direction::Undo);
        self.nested.push(nested.is_some());
        if let Some(replay) = nested {
            self.history.finish(replay, Ok(()));
        }
        self.tabs.close_tab(tab)
    }

    fn restore_tab(&mut self, snapshot: &TabSnapshot, make_active: bool) -> HostResult<()> {
        self.tabs.restore_tab(snapshot, make_active)
    }

    fn switch_tab(&mut self, tab: TabId) -> HostResult<()> {
        self.tabs.switch_tab(tab)
    }

    fn has_tab(&self, tab: TabId) -> bool {
        self.tabs.has_tab(tab)
    }

    fn show_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> HostResult<()> {
        self.tabs.show_passage(tab, passage)
    }

    fn load_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> HostResult<()> {
        self.tabs.load_passage(tab, passage)
    }
}

#[test]
fn test_undo_inside_handler_is_ignored() {
    let history = HistoryHandle::default();
    let mut tabs = TabManager::new("ESV");
    tabs.attach_history(history.clone());
    let first = tabs.create_tab();
    tabs.open_passage(first, PassageSnapshot::new("John", 1, 1, "ESV")).unwrap();
    let second = tabs.create_tab();
    tabs.open_passage(second, PassageSnapshot::new("John", 1, 2, "ESV")).unwrap();

    let host = UndoFromHandler {
        tabs,
        history: history.clone(),
        nested: Vec::new(),
    };
    let mut engine = AnnotationEngine::with_history(
        history.clone(),
        Default::default(),
        MemoryStore::new(),
        host,
        RasterPipeline::new(),
    );
    let before = engine.history().len();
    assert!(matches!(
        engine.history().last().map(|op| op.kind),
        Some(versemark_core::history::OperationKind::Action(Action::PassageLoad { .. }))
    ));

    // Undo the passage load, then the tab creation, whose inverse closes the tab
    assert!(engine.undo());
    assert!(engine.undo());
    assert_eq!(engine.host().nested, vec![false]);
    assert_eq!(engine.history().len(), before - 2);
    assert!(!engine.host().tabs.has_tab(second));
}
