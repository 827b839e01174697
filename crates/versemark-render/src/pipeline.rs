//! Per-document surfaces driven by the annotation engine.

use std::collections::HashMap;

use kurbo::Point;
use versemark_core::document::DocumentKey;
use versemark_core::input::Gesture;
use versemark_core::render::{Renderer, ViewSize};
use versemark_core::stroke::{Stroke, stroke_path};
use versemark_core::tools::DrawingSettings;

use crate::error::{RenderError, RenderResult};
use crate::export::encode_png;
use crate::raster::{draw_path, draw_segment, draw_stroke};
use crate::surface::Surface;

/// The three surfaces of one document view.
#[derive(Debug, Clone)]
pub struct DocumentView {
    size: ViewSize,
    /// Authoritative raster of the whole content height.
    pub offscreen: Surface,
    /// What the reader sees.
    pub visible: Surface,
    /// In-progress stroke preview.
    pub overlay: Surface,
}

impl DocumentView {
    pub fn new(size: ViewSize) -> Self {
        let (width, height) = (size.device_width(), size.device_height());
        Self {
            size,
            offscreen: Surface::new(width, height),
            visible: Surface::new(width, height),
            overlay: Surface::new(width, height),
        }
    }

    pub fn size(&self) -> ViewSize {
        self.size
    }

    fn scale(&self) -> f64 {
        self.size.device_line_width(1.0)
    }

    fn blit(&mut self) {
        self.visible.copy_from(&self.offscreen);
    }
}

/// CPU renderer keeping one [`DocumentView`] per document.
///
/// With a default size, views are created on first use; without one,
/// calls for documents that were never resized are ignored.
#[derive(Debug, Clone, Default)]
pub struct RasterPipeline {
    views: HashMap<DocumentKey, DocumentView>,
    default_size: Option<ViewSize>,
}

impl RasterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create views on demand with `size`.
    pub fn with_default_size(size: ViewSize) -> Self {
        Self {
            views: HashMap::new(),
            default_size: Some(size),
        }
    }

    /// Size used for views created from now on.
    pub fn set_default_size(&mut self, size: ViewSize) {
        self.default_size = Some(size);
    }

    pub fn view(&self, key: &DocumentKey) -> Option<&DocumentView> {
        self.views.get(key)
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentKey> {
        self.views.keys()
    }

    /// Encode a document's visible surface as PNG.
    pub fn export_png(&self, key: &DocumentKey) -> RenderResult<Vec<u8>> {
        let view = self
            .views
            .get(key)
            .ok_or_else(|| RenderError::UnknownDocument(key.to_string()))?;
        encode_png(&view.visible)
    }

    fn view_mut(&mut self, key: &DocumentKey) -> Option<&mut DocumentView> {
        if !self.views.contains_key(key) {
            let size = self.default_size?;
            log::debug!("Creating view for {}", key);
            self.views.insert(key.clone(), DocumentView::new(size));
        }
        self.views.get_mut(key)
    }
}

impl Renderer for RasterPipeline {
    fn resize(&mut self, key: &DocumentKey, size: ViewSize) -> bool {
        if self.views.get(key).is_some_and(|v| v.size == size) {
            return false;
        }
        log::debug!(
            "Resizing {} to {}x{} device pixels",
            key,
            size.device_width(),
            size.device_height()
        );
        self.views.insert(key.clone(), DocumentView::new(size));
        true
    }

    fn repaint(&mut self, key: &DocumentKey, strokes: &[Stroke]) {
        let Some(view) = self.view_mut(key) else {
            return;
        };
        let scale = view.scale();
        view.offscreen.clear();
        for stroke in strokes {
            draw_stroke(&mut view.offscreen, stroke, scale);
        }
        view.blit();
    }

    fn clear_visible(&mut self, key: &DocumentKey) {
        if let Some(view) = self.view_mut(key) {
            view.visible.clear();
        }
    }

    fn wipe(&mut self, key: &DocumentKey) {
        if let Some(view) = self.view_mut(key) {
            view.offscreen.clear();
            view.visible.clear();
            view.overlay.clear();
        }
    }

    fn wipe_all(&mut self) {
        for view in self.views.values_mut() {
            view.offscreen.clear();
            view.visible.clear();
            view.overlay.clear();
        }
    }

    fn preview(&mut self, gesture: &Gesture) {
        let Some(view) = self.view_mut(&gesture.document) else {
            return;
        };
        let scale = view.scale();
        view.overlay.clear();
        let path = stroke_path(&gesture.points, gesture.input_kind);
        draw_path(&mut view.overlay, &path, &gesture.settings, scale);
    }

    fn erase_segment(&mut self, key: &DocumentKey, settings: &DrawingSettings, from: Point, to: Point) {
        let Some(view) = self.view_mut(key) else {
            return;
        };
        let scale = view.scale();
        draw_segment(&mut view.offscreen, settings, from, to, scale);
        view.blit();
    }

    fn commit(&mut self, key: &DocumentKey, stroke: &Stroke) {
        let Some(view) = self.view_mut(key) else {
            return;
        };
        let scale = view.scale();
        draw_stroke(&mut view.offscreen, stroke, scale);
        view.blit();
        view.overlay.clear();
    }

    fn clear_overlay(&mut self, key: &DocumentKey) {
        if let Some(view) = self.view_mut(key) {
            view.overlay.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versemark_core::document::TabId;
    use versemark_core::stroke::{InputKind, StrokeKind};

    fn key() -> DocumentKey {
        DocumentKey::new("bible-annotations-John-3-16-null-ESV")
    }

    fn stroke(kind: StrokeKind, y: f64) -> Stroke {
        Stroke::new(
            &DrawingSettings::new(kind, "#3366ff", 6.0),
            vec![Point::new(4.0, y), Point::new(20.0, y + 4.0), Point::new(36.0, y)],
            InputKind::Touch,
        )
    }

    fn pipeline() -> RasterPipeline {
        let mut pipeline = RasterPipeline::new();
        pipeline.resize(&key(), ViewSize::new(40.0, 60.0));
        pipeline
    }

    #[test]
    fn test_repaint_is_idempotent() {
        let mut pipeline = pipeline();
        let strokes = vec![
            stroke(StrokeKind::Pen, 10.0),
            stroke(StrokeKind::Highlight, 12.0),
            stroke(StrokeKind::Erase, 30.0),
        ];

        pipeline.repaint(&key(), &strokes);
        let first = pipeline.view(&key()).unwrap().visible.clone();
        pipeline.repaint(&key(), &strokes);
        let second = &pipeline.view(&key()).unwrap().visible;

        assert!(!first.is_blank());
        assert_eq!(&first, second);
    }

    #[test]
    fn test_commit_matches_repaint() {
        let mut incremental = pipeline();
        let strokes = vec![stroke(StrokeKind::Pen, 10.0), stroke(StrokeKind::Highlight, 40.0)];
        for s in &strokes {
            incremental.commit(&key(), s);
        }

        let mut replayed = pipeline();
        replayed.repaint(&key(), &strokes);

        assert_eq!(
            incremental.view(&key()).unwrap().visible,
            replayed.view(&key()).unwrap().visible
        );
        assert!(incremental.view(&key()).unwrap().overlay.is_blank());
    }

    #[test]
    fn test_preview_only_touches_overlay() {
        let mut pipeline = pipeline();
        let gesture = Gesture {
            pointer_id: 1,
            tab_id: TabId(1),
            document: key(),
            settings: DrawingSettings::new(StrokeKind::Pen, "#000", 4.0),
            input_kind: InputKind::Mouse,
            points: vec![Point::new(5.0, 5.0), Point::new(30.0, 5.0)],
        };
        pipeline.preview(&gesture);

        let view = pipeline.view(&key()).unwrap();
        assert!(!view.overlay.is_blank());
        assert!(view.offscreen.is_blank());
        assert!(view.visible.is_blank());

        pipeline.clear_overlay(&key());
        assert!(pipeline.view(&key()).unwrap().overlay.is_blank());
    }

    #[test]
    fn test_clear_visible_keeps_offscreen() {
        let mut pipeline = pipeline();
        pipeline.repaint(&key(), &[stroke(StrokeKind::Pen, 10.0)]);
        pipeline.clear_visible(&key());

        let view = pipeline.view(&key()).unwrap();
        assert!(view.visible.is_blank());
        assert!(!view.offscreen.is_blank());
    }

    #[test]
    fn test_unknown_document_ignored_without_default() {
        let mut pipeline = RasterPipeline::new();
        let other = DocumentKey::new("other");
        pipeline.repaint(&other, &[stroke(StrokeKind::Pen, 10.0)]);
        assert!(pipeline.view(&other).is_none());
        assert!(matches!(pipeline.export_png(&other), Err(RenderError::UnknownDocument(_))));
    }

    #[test]
    fn test_default_size_creates_views() {
        let mut pipeline = RasterPipeline::with_default_size(ViewSize::new(10.0, 20.0).with_device_pixel_ratio(2.0));
        let other = DocumentKey::new("other");
        pipeline.clear_overlay(&other);
        let view = pipeline.view(&other).unwrap();
        assert_eq!((view.visible.width(), view.visible.height()), (20, 40));
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let mut pipeline = pipeline();
        assert!(!pipeline.resize(&key(), ViewSize::new(40.0, 60.0)));
        assert!(pipeline.resize(&key(), ViewSize::new(40.0, 80.0)));
        assert_eq!(pipeline.view(&key()).unwrap().offscreen.height(), 80);
    }

    #[test]
    fn test_wipe_all() {
        let mut pipeline = pipeline();
        pipeline.repaint(&key(), &[stroke(StrokeKind::Pen, 10.0)]);
        pipeline.wipe_all();
        let view = pipeline.view(&key()).unwrap();
        assert!(view.offscreen.is_blank() && view.visible.is_blank());
    }
}
