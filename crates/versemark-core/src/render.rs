//! Rendering seam.
//!
//! Each document view owns three surfaces: the offscreen raster (the full
//! content height, authoritative), the visible surface it is blitted to,
//! and a transient overlay for the stroke being drawn.

use kurbo::Point;

use crate::document::DocumentKey;
use crate::input::Gesture;
use crate::stroke::Stroke;
use crate::tools::DrawingSettings;

/// Geometry of a document view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSize {
    /// Width in CSS pixels.
    pub width: f64,
    /// Full content height in CSS pixels, not just the viewport.
    pub content_height: f64,
    /// Device pixel ratio (for HiDPI).
    pub device_pixel_ratio: f64,
}

impl Default for ViewSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            content_height: 600.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl ViewSize {
    pub fn new(width: f64, content_height: f64) -> Self {
        Self {
            width,
            content_height,
            device_pixel_ratio: 1.0,
        }
    }

    /// Set the device pixel ratio.
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    fn ratio(&self) -> f64 {
        if self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }

    /// Raster width in device pixels.
    pub fn device_width(&self) -> u32 {
        (self.width.max(0.0) * self.ratio()).round() as u32
    }

    /// Raster height in device pixels.
    pub fn device_height(&self) -> u32 {
        (self.content_height.max(0.0) * self.ratio()).round() as u32
    }

    /// Line width in device pixels for a CSS-pixel size.
    pub fn device_line_width(&self, size: f64) -> f64 {
        size * self.ratio()
    }
}

/// Raster backend driven by the engine.
///
/// Calls for a document without a view are no-ops.
pub trait Renderer {
    /// Set a view's geometry. Returns `true` when the buffers were
    /// reallocated and must be repainted.
    fn resize(&mut self, key: &DocumentKey, size: ViewSize) -> bool;

    /// Clear the offscreen surface, replay `strokes` in order, then blit the
    /// whole offscreen surface to the visible one.
    fn repaint(&mut self, key: &DocumentKey, strokes: &[Stroke]);

    /// Clear the visible surface only.
    fn clear_visible(&mut self, key: &DocumentKey);

    /// Clear every surface of a view.
    fn wipe(&mut self, key: &DocumentKey);

    /// Clear every surface of every view.
    fn wipe_all(&mut self);

    /// Redraw the overlay from scratch with the gesture's points.
    fn preview(&mut self, gesture: &Gesture);

    /// Erase a segment on the offscreen surface and blit it.
    fn erase_segment(&mut self, key: &DocumentKey, settings: &DrawingSettings, from: Point, to: Point);

    /// Draw a committed stroke onto the offscreen surface, blit it and
    /// clear the overlay.
    fn commit(&mut self, key: &DocumentKey, stroke: &Stroke);

    /// Clear the overlay.
    fn clear_overlay(&mut self, key: &DocumentKey);
}

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn resize(&mut self, _key: &DocumentKey, _size: ViewSize) -> bool {
        false
    }

    fn repaint(&mut self, _key: &DocumentKey, _strokes: &[Stroke]) {}

    fn clear_visible(&mut self, _key: &DocumentKey) {}

    fn wipe(&mut self, _key: &DocumentKey) {}

    fn wipe_all(&mut self) {}

    fn preview(&mut self, _gesture: &Gesture) {}

    fn erase_segment(&mut self, _key: &DocumentKey, _settings: &DrawingSettings, _from: Point, _to: Point) {}

    fn commit(&mut self, _key: &DocumentKey, _stroke: &Stroke) {}

    fn clear_overlay(&mut self, _key: &DocumentKey) {}
}
