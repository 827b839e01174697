//! Tools and their drawing settings.

use peniko::Compose;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::stroke::StrokeKind;

/// Color the eraser carries; destination-out ignores it.
const ERASER_COLOR: &str = "#000";

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    #[serde(alias = "highlighter")]
    Highlight,
    #[serde(alias = "eraser")]
    Erase,
    /// Word selection; does not draw.
    Select,
}

impl ToolKind {
    /// Stroke kind produced by this tool, if it draws.
    pub fn stroke_kind(self) -> Option<StrokeKind> {
        match self {
            ToolKind::Pen => Some(StrokeKind::Pen),
            ToolKind::Highlight => Some(StrokeKind::Highlight),
            ToolKind::Erase => Some(StrokeKind::Erase),
            ToolKind::Select => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::Highlight => "highlight",
            ToolKind::Erase => "erase",
            ToolKind::Select => "select",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pen" => Some(ToolKind::Pen),
            "highlight" | "highlighter" => Some(ToolKind::Highlight),
            "erase" | "eraser" => Some(ToolKind::Erase),
            "select" => Some(ToolKind::Select),
            _ => None,
        }
    }
}

/// Settings snapshot a gesture is drawn with.
///
/// Captured when a gesture starts so later tool changes don't alter it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSettings {
    pub kind: StrokeKind,
    pub color: String,
    /// Line width in CSS pixels.
    pub size: f64,
}

impl DrawingSettings {
    pub fn new(kind: StrokeKind, color: impl Into<String>, size: f64) -> Self {
        Self {
            kind,
            color: color.into(),
            size,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.kind.alpha()
    }

    pub fn compose(&self) -> Compose {
        self.kind.compose()
    }
}

/// Current tool selection plus per-tool colors and sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    pub pen_color: String,
    pub highlighter_color: String,
    /// Pen width in CSS pixels.
    pub pen_size: f64,
    /// Font size of the displayed text; the highlighter follows it.
    pub font_size: f64,
    highlighter_min_size: f64,
    highlighter_font_factor: f64,
    eraser_factor: f64,
    eraser_min_size: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ToolSettings {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            current_tool: config.default_tool,
            pen_color: config.pen_color.clone(),
            highlighter_color: config.highlighter_color.clone(),
            pen_size: config.pen_size,
            font_size: config.font_size,
            highlighter_min_size: config.highlighter_min_size,
            highlighter_font_factor: config.highlighter_font_factor,
            eraser_factor: config.eraser_factor,
            eraser_min_size: config.eraser_min_size,
        }
    }

    /// Select a tool, returning the previous one.
    pub fn set_tool(&mut self, tool: ToolKind) -> ToolKind {
        std::mem::replace(&mut self.current_tool, tool)
    }

    /// Color of a tool that has one (pen and highlighter).
    pub fn color(&self, tool: ToolKind) -> Option<&str> {
        match tool {
            ToolKind::Pen => Some(&self.pen_color),
            ToolKind::Highlight => Some(&self.highlighter_color),
            ToolKind::Erase | ToolKind::Select => None,
        }
    }

    /// Set a tool's color, returning the previous one. `None` when the tool
    /// has no color.
    pub fn set_color(&mut self, tool: ToolKind, color: impl Into<String>) -> Option<String> {
        let slot = match tool {
            ToolKind::Pen => &mut self.pen_color,
            ToolKind::Highlight => &mut self.highlighter_color,
            ToolKind::Erase | ToolKind::Select => return None,
        };
        Some(std::mem::replace(slot, color.into()))
    }

    /// Set the pen size, returning the previous one.
    pub fn set_pen_size(&mut self, size: f64) -> f64 {
        std::mem::replace(&mut self.pen_size, size)
    }

    /// Highlighter width: a multiple of the font size with a floor.
    pub fn highlighter_size(&self) -> f64 {
        (self.font_size * self.highlighter_font_factor).max(self.highlighter_min_size)
    }

    /// Eraser width: a multiple of the highlighter width with a floor.
    pub fn eraser_size(&self) -> f64 {
        (self.highlighter_size() * self.eraser_factor).max(self.eraser_min_size)
    }

    /// Settings for a gesture with the current tool, `None` if it doesn't draw.
    pub fn drawing_settings(&self) -> Option<DrawingSettings> {
        let settings = match self.current_tool {
            ToolKind::Pen => DrawingSettings::new(StrokeKind::Pen, self.pen_color.clone(), self.pen_size),
            ToolKind::Highlight => DrawingSettings::new(
                StrokeKind::Highlight,
                self.highlighter_color.clone(),
                self.highlighter_size(),
            ),
            ToolKind::Erase => DrawingSettings::new(StrokeKind::Erase, ERASER_COLOR, self.eraser_size()),
            ToolKind::Select => return None,
        };
        Some(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_selection() {
        let mut settings = ToolSettings::default();
        assert_eq!(settings.current_tool, ToolKind::Pen);

        let previous = settings.set_tool(ToolKind::Highlight);
        assert_eq!(previous, ToolKind::Pen);
        assert_eq!(settings.current_tool, ToolKind::Highlight);
    }

    #[test]
    fn test_derived_sizes() {
        let mut settings = ToolSettings::default();
        // 24 * 1.5 = 36, eraser 36 * 1.3 = 46.8
        assert_eq!(settings.highlighter_size(), 36.0);
        assert!((settings.eraser_size() - 46.8).abs() < 1e-9);

        settings.font_size = 10.0;
        // Floors kick in: max(15, 20) = 20, max(26, 24) = 26
        assert_eq!(settings.highlighter_size(), 20.0);
        assert!((settings.eraser_size() - 26.0).abs() < 1e-9);
    }

    #[test]
    fn test_drawing_settings_per_tool() {
        let mut settings = ToolSettings::default();

        let pen = settings.drawing_settings().unwrap();
        assert_eq!(pen.kind, StrokeKind::Pen);
        assert_eq!(pen.size, 4.0);
        assert_eq!(pen.alpha(), 1.0);

        settings.set_tool(ToolKind::Highlight);
        let highlight = settings.drawing_settings().unwrap();
        assert_eq!(highlight.alpha(), 0.3);
        assert_eq!(highlight.compose(), Compose::SrcOver);

        settings.set_tool(ToolKind::Erase);
        let erase = settings.drawing_settings().unwrap();
        assert_eq!(erase.compose(), Compose::DestOut);

        settings.set_tool(ToolKind::Select);
        assert!(settings.drawing_settings().is_none());
    }

    #[test]
    fn test_set_color() {
        let mut settings = ToolSettings::default();
        assert_eq!(settings.set_color(ToolKind::Pen, "#ff0000").as_deref(), Some("#ffff00"));
        assert_eq!(settings.color(ToolKind::Pen), Some("#ff0000"));
        assert_eq!(settings.set_color(ToolKind::Erase, "#ff0000"), None);
    }

    #[test]
    fn test_tool_names() {
        for tool in [ToolKind::Pen, ToolKind::Highlight, ToolKind::Erase, ToolKind::Select] {
            assert_eq!(ToolKind::from_name(tool.name()), Some(tool));
        }
        assert_eq!(ToolKind::from_name("highlighter"), Some(ToolKind::Highlight));
        assert_eq!(ToolKind::from_name("laser"), None);
        assert_eq!(serde_json::to_string(&ToolKind::Highlight).unwrap(), "\"highlight\"");
    }
}
