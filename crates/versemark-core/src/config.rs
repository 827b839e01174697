//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::tools::ToolKind;

/// Maximum number of operations kept in the unified history.
pub const MAX_UNDO_HISTORY: usize = 1000;

/// Maximum number of strokes kept per document.
pub const MAX_STROKES_PER_DOCUMENT: usize = 1000;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Io { path: String, message: String },
    #[error("Invalid config: {0}")]
    Parse(String),
}

/// Tunables of the annotation engine.
///
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the unified undo log.
    pub history_capacity: usize,
    /// Capacity of each document's stroke history.
    pub stroke_capacity: usize,
    pub pen_color: String,
    pub highlighter_color: String,
    /// Pen width in CSS pixels.
    pub pen_size: f64,
    pub default_tool: ToolKind,
    /// Font size used to derive the highlighter width until the host reports one.
    pub font_size: f64,
    pub highlighter_min_size: f64,
    pub highlighter_font_factor: f64,
    pub eraser_factor: f64,
    pub eraser_min_size: f64,
    /// Move tab-scoped keys from older builds to document keys at start-up.
    pub migrate_legacy: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: MAX_UNDO_HISTORY,
            stroke_capacity: MAX_STROKES_PER_DOCUMENT,
            pen_color: "#ffff00".to_string(),
            highlighter_color: "#ffff00".to_string(),
            pen_size: 4.0,
            default_tool: ToolKind::Pen,
            font_size: 24.0,
            highlighter_min_size: 20.0,
            highlighter_font_factor: 1.5,
            eraser_factor: 1.3,
            eraser_min_size: 24.0,
            migrate_legacy: true,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 || self.stroke_capacity == 0 {
            return Err(ConfigError::Parse("capacities must be at least 1".to_string()));
        }
        if !(self.pen_size > 0.0 && self.font_size > 0.0) {
            return Err(ConfigError::Parse("sizes must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.history_capacity, 1000);
        assert_eq!(config.stroke_capacity, 1000);
        assert_eq!(config.pen_color, "#ffff00");
        assert_eq!(config.default_tool, ToolKind::Pen);
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r##"{"pen_size": 6, "pen_color": "#112233"}"##).unwrap();
        assert_eq!(config.pen_size, 6.0);
        assert_eq!(config.pen_color, "#112233");
        assert_eq!(config.history_capacity, 1000);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            EngineConfig::from_json(r#"{"history_capacity": 0}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"default_tool": "highlight"}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.default_tool, ToolKind::Highlight);
        assert!(matches!(
            EngineConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
