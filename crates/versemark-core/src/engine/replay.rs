//! Inverse dispatch target: how each recorded action is reversed or
//! reapplied on the engine.
//!
//! Everything here runs inside the restoring region opened by undo/redo,
//! so none of it is recorded.

use super::AnnotationEngine;
use crate::document::{DocumentKey, PassageSnapshot, TabId, TabSnapshot};
use crate::history::{ActionTarget, ClearedData, ReplayError};
use crate::host::TabHost;
use crate::popup::Popup;
use crate::render::Renderer;
use crate::storage::KeyValueStore;
use crate::stroke::Stroke;
use crate::tools::ToolKind;

impl<S, H, R> ActionTarget for AnnotationEngine<S, H, R>
where
    S: KeyValueStore,
    H: TabHost,
    R: Renderer,
{
    fn apply_tool(&mut self, tool: ToolKind) {
        self.settings.set_tool(tool);
        self.host.settings_changed(&self.settings);
    }

    fn apply_color(&mut self, tool: ToolKind, color: &str) {
        self.settings.set_color(tool, color);
        self.host.settings_changed(&self.settings);
    }

    fn apply_pen_size(&mut self, size: f64) {
        self.settings.set_pen_size(size);
        self.host.settings_changed(&self.settings);
    }

    fn close_tab(&mut self, tab: TabId) -> Result<(), ReplayError> {
        self.host.close_tab(tab)?;
        self.activate_current();
        Ok(())
    }

    fn restore_tab(&mut self, tab: &TabSnapshot, make_active: bool) -> Result<(), ReplayError> {
        self.host.restore_tab(tab, make_active)?;
        self.activate_current();
        Ok(())
    }

    fn switch_tab(&mut self, tab: TabId) -> Result<(), ReplayError> {
        self.host.switch_tab(tab)?;
        self.activate_current();
        Ok(())
    }

    fn restore_document(
        &mut self,
        tab: TabId,
        key: &DocumentKey,
        strokes: &[Stroke],
        popups: &[Popup],
    ) -> Result<(), ReplayError> {
        self.strokes.restore(&mut self.store, key, strokes.to_vec());
        self.popups.restore(&mut self.store, key, popups.to_vec());

        // Show the restored document if its tab is elsewhere
        if self.current_key().as_ref() != Some(key) && self.host.has_tab(tab) {
            self.host.switch_tab(tab)?;
            self.activate_current();
        }
        self.repaint(key);
        Ok(())
    }

    fn wipe_document(&mut self, key: &DocumentKey) -> Result<(), ReplayError> {
        self.strokes.clear(&mut self.store, key);
        self.popups.clear(&mut self.store, key);
        self.renderer.wipe(key);
        Ok(())
    }

    fn restore_all(&mut self, cleared: &ClearedData) -> Result<(), ReplayError> {
        for (key, value) in &cleared.persisted {
            if let Err(e) = self.store.set(key, value) {
                log::error!("Failed to restore {}: {}", key, e);
            }
        }
        for (key, strokes) in &cleared.strokes {
            self.strokes.restore(&mut self.store, key, strokes.clone());
        }
        for (key, popups) in &cleared.popups {
            self.popups.restore(&mut self.store, key, popups.clone());
        }
        for key in cleared.strokes.keys() {
            self.repaint(key);
        }
        self.activate_current();
        Ok(())
    }

    fn wipe_all(&mut self) -> Result<(), ReplayError> {
        self.strokes.clear_all(&mut self.store);
        self.popups.clear_all(&mut self.store);
        self.renderer.wipe_all();
        Ok(())
    }

    fn show_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> Result<(), ReplayError> {
        self.host.show_passage(tab, passage)?;
        self.activate_current();
        Ok(())
    }

    fn reload_passage(&mut self, tab: TabId, passage: &PassageSnapshot) -> Result<(), ReplayError> {
        let gate = self.history.gate().clone();
        let _automatic = gate.automatic();
        self.host.load_passage(tab, passage)?;
        self.activate_current();
        Ok(())
    }
}
