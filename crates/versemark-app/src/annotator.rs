//! The assembled annotator: engine, tab shell and raster pipeline.

use versemark_core::document::{DocumentKey, PassageSnapshot, TabId};
use versemark_core::engine::AnnotationEngine;
use versemark_core::history::HistoryHandle;
use versemark_core::host::{HostError, HostResult};
use versemark_core::popup::{Popup, PopupPosition};
use versemark_core::render::ViewSize;
use versemark_core::storage::KeyValueStore;
use versemark_render::{DocumentView, RasterPipeline};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::session::SessionEvent;
use crate::shortcuts::{Command, Modifiers, ShortcutRegistry};
use crate::tabs::TabManager;

/// Engine type used by the application shell.
pub type AppEngine<S> = AnnotationEngine<S, TabManager, RasterPipeline>;

/// Annotation engine wired to a [`TabManager`] and a [`RasterPipeline`].
///
/// Tab operations go through here so the engine reloads whatever document
/// becomes active.
pub struct Annotator<S> {
    engine: AppEngine<S>,
    view: ViewSize,
}

impl<S: KeyValueStore> Annotator<S> {
    /// Build an annotator over `store` with one empty tab open.
    pub fn new(config: &AppConfig, store: S) -> Self {
        let history = HistoryHandle::new(config.engine.history_capacity);
        let mut tabs = TabManager::new(config.default_translation.clone());
        tabs.attach_history(history.clone());
        history.run_automatic(|| tabs.create_tab());

        let view = config.view_size();
        let renderer = RasterPipeline::with_default_size(view);
        let engine = AnnotationEngine::with_history(history, config.engine.clone(), store, tabs, renderer);

        let mut annotator = Self { engine, view };
        annotator.engine.activate_current();
        annotator
    }

    pub fn engine(&self) -> &AppEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AppEngine<S> {
        &mut self.engine
    }

    pub fn tabs(&self) -> &TabManager {
        self.engine.host()
    }

    /// Surfaces of the active document, if it has been drawn or repainted.
    pub fn current_view(&self) -> Option<&DocumentView> {
        let key = self.engine.current_key()?;
        self.engine.renderer().view(&key)
    }

    // --- Tabs ---

    pub fn create_tab(&mut self) -> TabId {
        let id = self.engine.host_mut().create_tab();
        self.engine.activate_current();
        id
    }

    pub fn close_tab(&mut self, id: TabId) -> HostResult<()> {
        self.engine.host_mut().close(id)?;
        self.engine.activate_current();
        Ok(())
    }

    pub fn switch_tab(&mut self, id: TabId) -> HostResult<bool> {
        let switched = self.engine.host_mut().switch_to(id)?;
        self.engine.activate_current();
        Ok(switched)
    }

    /// Load a passage into the active tab.
    pub fn open_passage(&mut self, passage: PassageSnapshot) -> HostResult<()> {
        let id = self.active_tab()?;
        self.engine.host_mut().open_passage(id, passage)?;
        self.engine.activate_current();
        Ok(())
    }

    /// Show media content in the active tab.
    pub fn open_media(&mut self, title: &str, content: &str) -> HostResult<()> {
        let id = self.active_tab()?;
        self.engine.host_mut().open_media(id, title, content)?;
        self.engine.activate_current();
        Ok(())
    }

    fn active_tab(&self) -> HostResult<TabId> {
        self.tabs()
            .active_id()
            .ok_or_else(|| HostError::Failed("no active tab".to_string()))
    }

    // --- Input ---

    /// Route a key press through the shortcut registry.
    pub fn press_key(&mut self, key: &str, modifiers: Modifiers) -> Option<Command> {
        let command = ShortcutRegistry::resolve(key, modifiers)?;
        match command {
            Command::Undo => self.engine.undo(),
            Command::Redo => self.engine.redo(),
        };
        Some(command)
    }

    /// Resize the active document's view.
    pub fn resize(&mut self, width: f64, content_height: f64) -> bool {
        self.view = ViewSize::new(width, content_height).with_device_pixel_ratio(self.view.device_pixel_ratio);
        self.engine.renderer_mut().set_default_size(self.view);
        let Some(key) = self.engine.current_key() else {
            return false;
        };
        self.engine.resize(&key, self.view)
    }

    /// Apply one recorded host event.
    pub fn apply(&mut self, event: &SessionEvent) -> AppResult<()> {
        match event {
            SessionEvent::Pointer(pointer) => {
                self.engine.handle_pointer(*pointer);
            }
            SessionEvent::TouchStart { touches, scroll_top } => {
                self.engine.touch_start(touches, *scroll_top);
            }
            SessionEvent::TouchEnd { remaining } => self.engine.touch_end(*remaining),
            SessionEvent::Tool(tool) => {
                self.engine.set_tool(*tool);
            }
            SessionEvent::Color { tool, color } => {
                self.engine.set_color(*tool, color);
            }
            SessionEvent::PenSize(size) => {
                self.engine.set_pen_size(*size);
            }
            SessionEvent::FontSize(size) => self.engine.set_font_size(*size),
            SessionEvent::Key { key, modifiers } => {
                self.press_key(key, *modifiers);
            }
            SessionEvent::Undo => {
                self.engine.undo();
            }
            SessionEvent::Redo => {
                self.engine.redo();
            }
            SessionEvent::Clear => {
                self.engine.clear_document();
            }
            SessionEvent::ClearAll => {
                self.engine.clear_all();
            }
            SessionEvent::CreateTab => {
                self.create_tab();
            }
            SessionEvent::CloseTab(id) => self.close_tab(*id)?,
            SessionEvent::SwitchTab(id) => {
                self.switch_tab(*id)?;
            }
            SessionEvent::OpenPassage(passage) => self.open_passage(passage.clone())?,
            SessionEvent::OpenMedia { title, content } => self.open_media(title, content)?,
            SessionEvent::SavePopup { word, x, y } => {
                let position = PopupPosition {
                    x: *x,
                    y: *y,
                    was_dragged: false,
                };
                self.engine.save_popup(Popup::new(word.clone(), position));
            }
            SessionEvent::RemovePopup(word) => {
                self.engine.remove_popup(word);
            }
            SessionEvent::Resize { width, content_height } => {
                self.resize(*width, *content_height);
            }
        }
        Ok(())
    }

    /// PNG of the active document's visible surface.
    pub fn export_png(&mut self) -> AppResult<Option<Vec<u8>>> {
        let Some(key) = self.engine.current_key() else {
            return Ok(None);
        };
        self.ensure_view(&key);
        Ok(Some(self.engine.renderer().export_png(&key)?))
    }

    fn ensure_view(&mut self, key: &DocumentKey) {
        if self.engine.renderer().view(key).is_none() {
            self.engine.resize(key, self.view);
        }
    }
}
