//! Keyboard shortcut registry and documentation.

use serde::{Deserialize, Serialize};

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Undo,
    Redo,
}

/// Modifier keys held with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    /// Command key on macOS; treated like Ctrl.
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const CTRL: Self = Self {
        ctrl: true,
        meta: false,
        shift: false,
        alt: false,
    };

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub command: Command,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        command: Command,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, Command::Undo, "Undo"),
            Shortcut::new("Y", true, false, Command::Redo, "Redo"),
            Shortcut::new("Z", true, true, Command::Redo, "Redo"),
        ]
    }

    /// Map a key press to a command.
    ///
    /// Alt is never part of a binding, and Shift only combines with `z`.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<Command> {
        let key = key.to_ascii_lowercase();
        if modifiers.alt || (modifiers.shift && key != "z") || !modifiers.command() {
            return None;
        }
        match (key.as_str(), modifiers.shift) {
            ("z", false) => Some(Command::Undo),
            ("z", true) | ("y", false) => Some(Command::Redo),
            _ => None,
        }
    }

    /// Help text listing every shortcut.
    pub fn help() -> String {
        let mut text = String::from("Keyboard shortcuts:\n");
        for shortcut in Self::all() {
            text.push_str(&format!("  {:12} {}\n", shortcut.format(), shortcut.description));
        }
        text
    }
}
