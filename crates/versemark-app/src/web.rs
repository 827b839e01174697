//! WebAssembly entry point and browser facade.

use kurbo::Point;
use versemark_core::document::{PassageSnapshot, TabId};
use versemark_core::input::PointerEvent;
use versemark_core::storage::LocalStore;
use versemark_core::stroke::InputKind;
use versemark_core::tools::ToolKind;
use wasm_bindgen::prelude::*;

use crate::annotator::Annotator;
use crate::config::AppConfig;
use crate::session::SessionEvent;
use crate::shortcuts::Modifiers;

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn tool(name: &str) -> Result<ToolKind, JsValue> {
    ToolKind::from_name(name).ok_or_else(|| JsValue::from_str(&format!("Unknown tool: {}", name)))
}

/// Annotator bound to `window.localStorage`, driven from page scripts.
#[wasm_bindgen]
pub struct WebAnnotator {
    inner: Annotator<LocalStore>,
}

#[wasm_bindgen]
impl WebAnnotator {
    /// Create an annotator. `config` is an optional JSON `AppConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<WebAnnotator, JsValue> {
        let config = match config {
            Some(json) => AppConfig::from_json(&json).map_err(to_js)?,
            None => AppConfig::default(),
        };
        let store = LocalStore::open().map_err(to_js)?;
        Ok(Self {
            inner: Annotator::new(&config, store),
        })
    }

    /// Apply one event in the session JSON format.
    pub fn apply_event(&mut self, json: &str) -> Result<(), JsValue> {
        let event: SessionEvent = serde_json::from_str(json).map_err(to_js)?;
        self.inner.apply(&event).map_err(to_js)
    }

    pub fn pointer_down(&mut self, id: i32, x: f64, y: f64, touch: bool) {
        let input = if touch { InputKind::Touch } else { InputKind::Mouse };
        self.inner.engine_mut().handle_pointer(PointerEvent::Down {
            id,
            position: Point::new(x, y),
            input,
        });
    }

    pub fn pointer_move(&mut self, id: i32, x: f64, y: f64) {
        self.inner.engine_mut().handle_pointer(PointerEvent::Move {
            id,
            position: Point::new(x, y),
        });
    }

    pub fn pointer_up(&mut self, id: i32) {
        self.inner.engine_mut().handle_pointer(PointerEvent::Up { id });
    }

    /// Two-finger scroll: returns the new scroll offset while scrolling.
    pub fn touch_move(&self, y0: f64, y1: f64) -> Option<f64> {
        self.inner
            .engine()
            .touch_move(&[Point::new(0.0, y0), Point::new(0.0, y1)])
    }

    pub fn key_down(&mut self, key: &str, ctrl: bool, meta: bool, shift: bool, alt: bool) -> bool {
        let modifiers = Modifiers { ctrl, meta, shift, alt };
        self.inner.press_key(key, modifiers).is_some()
    }

    pub fn undo(&mut self) -> bool {
        self.inner.engine_mut().undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.engine_mut().redo()
    }

    pub fn can_undo(&self) -> bool {
        self.inner.engine().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.engine().can_redo()
    }

    pub fn set_tool(&mut self, name: &str) -> Result<bool, JsValue> {
        Ok(self.inner.engine_mut().set_tool(tool(name)?))
    }

    pub fn set_color(&mut self, tool_name: &str, color: &str) -> Result<bool, JsValue> {
        Ok(self.inner.engine_mut().set_color(tool(tool_name)?, color))
    }

    pub fn set_pen_size(&mut self, size: f64) -> bool {
        self.inner.engine_mut().set_pen_size(size)
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.inner.engine_mut().set_font_size(size);
    }

    pub fn clear(&mut self) -> bool {
        self.inner.engine_mut().clear_document()
    }

    pub fn clear_all(&mut self) -> bool {
        self.inner.engine_mut().clear_all()
    }

    pub fn create_tab(&mut self) -> f64 {
        self.inner.create_tab().0 as f64
    }

    pub fn close_tab(&mut self, id: f64) -> Result<(), JsValue> {
        self.inner.close_tab(TabId(id as u64)).map_err(to_js)
    }

    pub fn switch_tab(&mut self, id: f64) -> Result<bool, JsValue> {
        self.inner.switch_tab(TabId(id as u64)).map_err(to_js)
    }

    pub fn open_passage(&mut self, book: &str, chapter: u32, verse: u32, translation: &str) -> Result<(), JsValue> {
        self.inner
            .open_passage(PassageSnapshot::new(book, chapter, verse, translation))
            .map_err(to_js)
    }

    pub fn resize(&mut self, width: f64, content_height: f64) -> bool {
        self.inner.resize(width, content_height)
    }

    /// RGBA bytes of the active document's visible surface, for `putImageData`.
    pub fn visible_pixels(&self) -> Option<Vec<u8>> {
        self.inner.current_view().map(|v| v.visible.as_raw().to_vec())
    }

    /// RGBA bytes of the in-progress stroke overlay.
    pub fn overlay_pixels(&self) -> Option<Vec<u8>> {
        self.inner.current_view().map(|v| v.overlay.as_raw().to_vec())
    }

    pub fn export_png(&mut self) -> Result<Option<Vec<u8>>, JsValue> {
        self.inner.export_png().map_err(to_js)
    }
}

#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("Logger already set: {}", e)));
    }

    log::info!("Starting Versemark (WASM)");
}
