//! Committed ink strokes.

mod path;
mod store;

pub use path::{DEFAULT_INTERPOLATE_DISTANCE, interpolate, stroke_path};
pub use store::{LoadOutcome, StrokeStore};

use kurbo::Point;
use peniko::Compose;
use serde::{Deserialize, Serialize};

use crate::tools::DrawingSettings;

/// Opacity applied to highlighter strokes.
pub const HIGHLIGHT_ALPHA: f64 = 0.3;

/// How a stroke is composited onto the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Pen,
    #[serde(alias = "highlighter")]
    Highlight,
    #[serde(alias = "eraser")]
    Erase,
}

impl StrokeKind {
    /// Global alpha used when drawing this kind.
    pub fn alpha(self) -> f64 {
        match self {
            StrokeKind::Highlight => HIGHLIGHT_ALPHA,
            StrokeKind::Pen | StrokeKind::Erase => 1.0,
        }
    }

    /// Compositing mode; erasing punches holes with destination-out.
    pub fn compose(self) -> Compose {
        match self {
            StrokeKind::Erase => Compose::DestOut,
            StrokeKind::Pen | StrokeKind::Highlight => Compose::SrcOver,
        }
    }
}

/// Device that produced a stroke. Touch input is smoothed on replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Mouse,
    Touch,
}

/// A committed ink gesture.
///
/// Points are device pixels on the full-content surface, independent of
/// scroll position. The JSON layout matches what earlier builds persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    #[serde(rename = "type")]
    pub kind: StrokeKind,
    /// CSS color string (`#rrggbb`, `rgba(...)`, or a named color).
    pub color: String,
    /// Line width in CSS pixels.
    pub size: f64,
    pub points: Vec<Point>,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "timestamp", default)]
    pub created_at: u64,
    #[serde(rename = "inputType", default)]
    pub input_kind: InputKind,
}

impl Stroke {
    /// Build a stroke from a settings snapshot and sampled points.
    pub fn new(settings: &DrawingSettings, points: Vec<Point>, input_kind: InputKind) -> Self {
        Self {
            kind: settings.kind,
            color: settings.color.clone(),
            size: settings.size,
            points,
            created_at: crate::time::now_millis(),
            input_kind,
        }
    }

    /// Strokes need at least two points to be drawn or persisted.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }

    /// Settings this stroke is drawn with.
    pub fn settings(&self) -> DrawingSettings {
        DrawingSettings::new(self.kind, self.color.clone(), self.size)
    }
}
