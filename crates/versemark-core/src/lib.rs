//! Versemark Core Library
//!
//! Platform-agnostic annotation engine for passage and media documents:
//! freehand strokes, word popups, tool settings and a unified undo/redo
//! history shared by strokes and discrete user actions.

pub mod color;
pub mod config;
pub mod document;
pub mod engine;
pub mod history;
pub mod host;
pub mod input;
pub mod popup;
pub mod render;
pub mod storage;
pub mod stroke;
pub mod time;
pub mod tools;

pub use config::{ConfigError, EngineConfig};
pub use document::{ActiveDocument, DocumentKey, DocumentMode, PassageSnapshot, TabId, TabSnapshot};
pub use engine::AnnotationEngine;
pub use history::{Action, Direction, HistoryHandle, Operation, OperationKind, RecordingGate, ReplayError};
pub use host::{HostError, HostResult, SingleDocumentHost, TabHost};
pub use input::{GestureEvent, PointerEvent};
pub use popup::{Popup, PopupPosition, PopupStore};
pub use render::{NullRenderer, Renderer, ViewSize};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use stroke::{InputKind, Stroke, StrokeKind, StrokeStore};
pub use tools::{DrawingSettings, ToolKind, ToolSettings};
