//! Recorded host events and their replay.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use versemark_core::document::{PassageSnapshot, TabId};
use versemark_core::input::PointerEvent;
use versemark_core::storage::KeyValueStore;
use versemark_core::tools::ToolKind;

use crate::annotator::Annotator;
use crate::error::{AppError, AppResult};
use crate::shortcuts::Modifiers;

/// One host event, as a browser shell would deliver it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    Pointer(PointerEvent),
    TouchStart {
        touches: Vec<Point>,
        #[serde(default)]
        scroll_top: f64,
    },
    TouchEnd {
        remaining: usize,
    },
    Tool(ToolKind),
    Color {
        tool: ToolKind,
        color: String,
    },
    PenSize(f64),
    FontSize(f64),
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Undo,
    Redo,
    Clear,
    ClearAll,
    CreateTab,
    CloseTab(TabId),
    SwitchTab(TabId),
    /// Load a passage into the active tab.
    OpenPassage(PassageSnapshot),
    OpenMedia {
        title: String,
        content: String,
    },
    SavePopup {
        word: String,
        x: f64,
        y: f64,
    },
    RemovePopup(String),
    Resize {
        width: f64,
        content_height: f64,
    },
}

/// Parse a JSON array of events.
pub fn parse_session(json: &str) -> AppResult<Vec<SessionEvent>> {
    serde_json::from_str(json).map_err(|e| AppError::Session(e.to_string()))
}

/// Outcome of replaying a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    pub applied: usize,
    pub failed: usize,
    pub history_len: usize,
    pub redo_len: usize,
    pub tabs: usize,
    /// Strokes on the active document at the end.
    pub strokes: usize,
}

/// Apply every event in order. Failing events are logged and skipped.
pub fn replay_session<S>(annotator: &mut Annotator<S>, events: &[SessionEvent]) -> SessionReport
where
    S: KeyValueStore,
{
    let mut report = SessionReport::default();
    for (index, event) in events.iter().enumerate() {
        match annotator.apply(event) {
            Ok(()) => report.applied += 1,
            Err(e) => {
                log::warn!("Event {} failed: {}", index, e);
                report.failed += 1;
            }
        }
    }

    let engine = annotator.engine();
    report.history_len = engine.history().len();
    report.redo_len = engine.history().redo_len();
    report.tabs = annotator.tabs().tabs().len();
    report.strokes = engine.current_strokes().len();
    report
}
