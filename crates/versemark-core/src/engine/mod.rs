//! The annotation engine.
//!
//! Owns every piece of annotation state (strokes, popups, tool settings,
//! the drawing state machine and the unified history) and drives the host
//! and renderer seams.

mod pointer;
mod replay;

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::document::{ActiveDocument, DocumentKey, TabId};
use crate::history::{Action, ClearedData, Direction, HistoryHandle, Operation, OperationKind, ReplayError};
use crate::host::TabHost;
use crate::input::DrawingInput;
use crate::popup::{Popup, PopupStore};
use crate::render::{Renderer, ViewSize};
use crate::storage::{KeyValueStore, POPUPS_SUFFIX, STROKES_SUFFIX, migrate_legacy_keys};
use crate::stroke::{LoadOutcome, Stroke, StrokeStore};
use crate::tools::{ToolKind, ToolSettings};

/// Annotation engine over a store, a tab host and a renderer.
pub struct AnnotationEngine<S, H, R> {
    config: EngineConfig,
    store: S,
    host: H,
    renderer: R,
    strokes: StrokeStore,
    popups: PopupStore,
    settings: ToolSettings,
    input: DrawingInput,
    history: HistoryHandle,
}

impl<S, H, R> AnnotationEngine<S, H, R>
where
    S: KeyValueStore,
    H: TabHost,
    R: Renderer,
{
    /// Create an engine with its own history.
    pub fn new(config: EngineConfig, store: S, host: H, renderer: R) -> Self {
        let history = HistoryHandle::new(config.history_capacity);
        Self::with_history(history, config, store, host, renderer)
    }

    /// Create an engine around an existing history handle, typically one
    /// already shared with the host.
    pub fn with_history(history: HistoryHandle, config: EngineConfig, mut store: S, host: H, renderer: R) -> Self {
        if config.migrate_legacy {
            match migrate_legacy_keys(&mut store) {
                Ok(migrated) if !migrated.is_empty() => {
                    log::info!("Migrated {} legacy annotation key(s)", migrated.len());
                }
                Ok(_) => {}
                Err(e) => log::warn!("Legacy annotation migration failed: {}", e),
            }
        }

        Self {
            strokes: StrokeStore::new(config.stroke_capacity),
            popups: PopupStore::new(),
            settings: ToolSettings::from_config(&config),
            input: DrawingInput::new(),
            config,
            store,
            host,
            renderer,
            history,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access for user-initiated tab operations.
    ///
    /// Call [`activate_current`](Self::activate_current) afterwards if the
    /// active document may have changed.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn strokes(&self) -> &StrokeStore {
        &self.strokes
    }

    pub fn popups(&self) -> &PopupStore {
        &self.popups
    }

    pub fn history(&self) -> &HistoryHandle {
        &self.history
    }

    pub fn input(&self) -> &DrawingInput {
        &self.input
    }

    /// Active tab and document, resolved fresh from the host.
    pub fn current_document(&self) -> Option<ActiveDocument> {
        self.host.active_document()
    }

    /// Active document key, resolved fresh from the host.
    pub fn current_key(&self) -> Option<DocumentKey> {
        self.current_document().map(|d| d.key)
    }

    /// Committed strokes of the active document.
    pub fn current_strokes(&self) -> &[Stroke] {
        match self.current_key() {
            Some(key) => self.strokes.strokes(&key),
            None => &[],
        }
    }

    // --- Tool settings ---

    /// Select a tool. Recorded as undoable.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        if self.settings.current_tool == tool {
            return false;
        }
        let from = self.settings.set_tool(tool);
        self.record_action(Action::ToolChange { from, to: tool });
        self.host.settings_changed(&self.settings);
        true
    }

    /// Change the pen or highlighter color. Recorded as undoable.
    pub fn set_color(&mut self, tool: ToolKind, color: &str) -> bool {
        if self.settings.color(tool).is_none_or(|current| current == color) {
            return false;
        }
        let Some(from) = self.settings.set_color(tool, color) else {
            return false;
        };
        self.record_action(Action::ColorChange {
            tool,
            from,
            to: color.to_string(),
        });
        self.host.settings_changed(&self.settings);
        true
    }

    /// Change the pen size. Recorded as undoable.
    pub fn set_pen_size(&mut self, size: f64) -> bool {
        if size.is_nan() || size <= 0.0 || self.settings.pen_size == size {
            return false;
        }
        let from = self.settings.set_pen_size(size);
        self.record_action(Action::SizeChange { from, to: size });
        self.host.settings_changed(&self.settings);
        true
    }

    /// Report the displayed font size; the highlighter and eraser follow it.
    pub fn set_font_size(&mut self, size: f64) {
        if size > 0.0 {
            self.settings.font_size = size;
        }
    }

    // --- Recording ---

    /// Record an action in the active document's context.
    ///
    /// Without an active document nothing is recorded.
    pub fn record_action(&mut self, action: Action) -> bool {
        let context = self.host.active_document();
        let recorded = self.history.record_action(action, context.as_ref());
        self.notify_history();
        recorded
    }

    /// Commit a stroke to a document and record it.
    ///
    /// Draws it onto the document's raster, persists it, then records a
    /// stroke operation unless a replay or automatic region is open.
    /// Strokes with fewer than two points are rejected.
    pub fn commit_stroke(&mut self, key: &DocumentKey, stroke: Stroke) -> bool {
        let tab_id = self.host.active_document().map(|d| d.tab_id);
        self.commit_stroke_from(tab_id, key, stroke)
    }

    /// Commit a stroke drawn in `tab_id`, which need not be active anymore.
    pub(crate) fn commit_stroke_from(
        &mut self,
        tab_id: Option<TabId>,
        key: &DocumentKey,
        stroke: Stroke,
    ) -> bool {
        if !stroke.is_drawable() {
            log::debug!("Rejected stroke with {} point(s)", stroke.points.len());
            return false;
        }
        self.renderer.commit(key, &stroke);

        let committed = self.strokes.commit(&mut self.store, key, stroke).clone();
        self.history.record(Operation::stroke(committed, tab_id, key.clone()));
        self.notify_history();
        true
    }

    // --- Undo / redo ---

    /// Undo the most recent operation. `false` when there is nothing to
    /// undo, a replay is already running, or the replay failed.
    pub fn undo(&mut self) -> bool {
        self.replay(Direction::Undo)
    }

    /// Redo the most recently undone operation.
    pub fn redo(&mut self) -> bool {
        self.replay(Direction::Redo)
    }

    /// Undo is possible: the unified history has entries, or the active
    /// document has strokes.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || !self.current_strokes().is_empty()
    }

    /// Redo is possible: the redo stack has entries, or the active document
    /// has undone strokes.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
            || self
                .current_key()
                .is_some_and(|key| self.strokes.redo_len(&key) > 0)
    }

    fn replay(&mut self, direction: Direction) -> bool {
        let Some(replay) = self.history.begin(direction) else {
            return false;
        };
        let result = self.dispatch(&replay.operation, direction);
        let done = self.history.finish(replay, result);
        self.notify_history();
        done
    }

    fn dispatch(&mut self, operation: &Operation, direction: Direction) -> Result<(), ReplayError> {
        match &operation.kind {
            OperationKind::Stroke(stroke) => {
                let key = operation
                    .document
                    .as_ref()
                    .ok_or(ReplayError::MissingDocument)?;
                self.replay_stroke(key, stroke, direction)
            }
            OperationKind::Action(action) => match direction {
                Direction::Undo => action.restore_before(self),
                Direction::Redo => action.reapply(self),
            },
        }
    }

    /// Move one stroke between a document's stacks and repaint it.
    ///
    /// The stroke on top of the source stack must be the recorded one;
    /// otherwise nothing moves and the replay fails.
    fn replay_stroke(
        &mut self,
        key: &DocumentKey,
        recorded: &Stroke,
        direction: Direction,
    ) -> Result<(), ReplayError> {
        let (top, stack) = match direction {
            Direction::Undo => (self.strokes.strokes(key).last(), "committed"),
            Direction::Redo => (self.strokes.redo_strokes(key).last(), "undone"),
        };
        if top != Some(recorded) {
            return Err(ReplayError::StrokeOutOfSync(stack, key.clone()));
        }
        match direction {
            Direction::Undo => self.strokes.undo_last(&mut self.store, key),
            Direction::Redo => self.strokes.redo_last(&mut self.store, key),
        };

        self.renderer.repaint(key, self.strokes.strokes(key));
        if self.strokes.len(key) == 0 {
            self.renderer.clear_visible(key);
        }
        Ok(())
    }

    fn notify_history(&mut self) {
        let (can_undo, can_redo) = (self.can_undo(), self.can_redo());
        self.host.history_changed(can_undo, can_redo);
    }

    // --- Rendering and loading ---

    /// Repaint a document from its strokes.
    ///
    /// Skipped while a gesture is drawing on that document.
    pub fn repaint(&mut self, key: &DocumentKey) -> bool {
        if self.input.is_drawing_on(key) {
            log::debug!("Repaint of {} skipped during a gesture", key);
            return false;
        }
        self.renderer.repaint(key, self.strokes.strokes(key));
        true
    }

    /// Resize a document view, repainting when its buffers changed.
    pub fn resize(&mut self, key: &DocumentKey, size: ViewSize) -> bool {
        if !self.renderer.resize(key, size) {
            return false;
        }
        self.repaint(key);
        true
    }

    /// Reconcile a document with storage, load its popups and repaint it.
    pub fn load_document(&mut self, key: &DocumentKey) -> LoadOutcome {
        let outcome = self.strokes.load(&mut self.store, key);
        self.popups.load(&mut self.store, key);
        self.repaint(key);
        outcome
    }

    /// Load and repaint whatever document the host now shows.
    pub fn activate_current(&mut self) -> Option<LoadOutcome> {
        let outcome = self.current_key().map(|key| self.load_document(&key));
        self.notify_history();
        outcome
    }

    // --- Clearing ---

    /// Clear the active document's strokes and popups. Undoable.
    pub fn clear_document(&mut self) -> bool {
        let Some(context) = self.host.active_document() else {
            return false;
        };
        let key = &context.key;
        let strokes = self.strokes.clear(&mut self.store, key);
        let popups = self.popups.clear(&mut self.store, key);
        self.renderer.wipe(key);
        log::info!("Cleared {} stroke(s) from {}", strokes.len(), key);

        self.history.record_action(
            Action::Clear {
                tab_id: context.tab_id,
                document: key.clone(),
                strokes,
                popups,
            },
            Some(&context),
        );
        self.notify_history();
        true
    }

    /// Clear every document, including ones only present in storage.
    /// Undoable.
    pub fn clear_all(&mut self) -> bool {
        let Some(context) = self.host.active_document() else {
            return false;
        };
        let persisted = self.persisted_annotations();
        let strokes = self.strokes.clear_all(&mut self.store);
        let popups = self.popups.clear_all(&mut self.store);
        self.renderer.wipe_all();

        let cleared = ClearedData {
            strokes,
            popups,
            persisted,
        };
        log::info!(
            "Cleared all annotations: {} stroke(s), {} stored key(s)",
            cleared.stroke_count(),
            cleared.persisted.len()
        );
        self.history
            .record_action(Action::ClearAll { cleared }, Some(&context));
        self.notify_history();
        true
    }

    /// Raw stored stroke and popup lists of every document.
    fn persisted_annotations(&self) -> BTreeMap<String, String> {
        let mut persisted = BTreeMap::new();
        for suffix in [STROKES_SUFFIX, POPUPS_SUFFIX] {
            let keys = match self.store.keys_with_suffix(suffix) {
                Ok(keys) => keys,
                Err(e) => {
                    log::error!("Failed to enumerate {} keys: {}", suffix, e);
                    continue;
                }
            };
            for key in keys {
                match self.store.get(&key) {
                    Ok(Some(value)) => {
                        persisted.insert(key, value);
                    }
                    Ok(None) => {}
                    Err(e) => log::error!("Failed to read {}: {}", key, e),
                }
            }
        }
        persisted
    }

    // --- Popups ---

    /// Save a popup on the active document, replacing one for the same word.
    pub fn save_popup(&mut self, popup: Popup) -> bool {
        let Some(key) = self.current_key() else {
            return false;
        };
        self.popups.save(&mut self.store, &key, popup);
        true
    }

    /// Remove the active document's popup for `word`.
    pub fn remove_popup(&mut self, word: &str) -> Option<Popup> {
        let key = self.current_key()?;
        self.popups.remove(&mut self.store, &key, word)
    }

    /// Popups of the active document.
    pub fn current_popups(&self) -> &[Popup] {
        match self.current_key() {
            Some(key) => self.popups.popups(&key),
            None => &[],
        }
    }
}
