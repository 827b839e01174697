//! Versemark Application
//!
//! Host-side shell around the annotation engine: configuration, an
//! in-memory tab shell, keyboard shortcuts, session replay and the browser
//! entry point.

mod annotator;
mod config;
mod error;
mod session;
mod shortcuts;
mod tabs;

pub use annotator::{AppEngine, Annotator};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use session::{SessionEvent, SessionReport, parse_session, replay_session};
pub use shortcuts::{Command, Modifiers, Shortcut, ShortcutRegistry};
pub use tabs::TabManager;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebAnnotator, run_wasm};
