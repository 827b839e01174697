//! Pointer and touch handling.

use kurbo::Point;

use super::AnnotationEngine;
use crate::host::TabHost;
use crate::input::{GestureEvent, PointerEvent};
use crate::render::Renderer;
use crate::storage::KeyValueStore;
use crate::stroke::InputKind;

impl<S, H, R> AnnotationEngine<S, H, R>
where
    S: KeyValueStore,
    H: TabHost,
    R: Renderer,
{
    /// Feed a pointer event to the drawing state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> GestureEvent {
        match event {
            PointerEvent::Down { id, position, input } => self.pointer_down(id, position, input),
            PointerEvent::Move { id, position } => self.pointer_move(id, position),
            PointerEvent::Up { id } | PointerEvent::Cancel { id } => self.pointer_up(id),
        }
    }

    /// Start a gesture on the active document with the current tool.
    pub fn pointer_down(&mut self, id: i32, position: Point, input: InputKind) -> GestureEvent {
        let Some(target) = self.current_document() else {
            return GestureEvent::Ignored;
        };
        let settings = self.settings.drawing_settings();
        let event = self.input.begin(id, position, input, target, settings);
        if let (GestureEvent::Started, Some(gesture)) = (&event, self.input.gesture()) {
            self.renderer.clear_overlay(&gesture.document);
        }
        event
    }

    /// Extend the active gesture, updating the overlay or erasing directly.
    pub fn pointer_move(&mut self, id: i32, position: Point) -> GestureEvent {
        let event = self.input.extend(id, position);
        let Some(gesture) = self.input.gesture() else {
            return event;
        };
        match &event {
            GestureEvent::Preview => self.renderer.preview(gesture),
            GestureEvent::Erase { from, to } => {
                self.renderer
                    .erase_segment(&gesture.document, &gesture.settings, *from, *to)
            }
            _ => {}
        }
        event
    }

    /// Finish the active gesture, committing it when it has enough points.
    pub fn pointer_up(&mut self, id: i32) -> GestureEvent {
        let event = self.input.finish(id);
        match &event {
            GestureEvent::Committed {
                tab_id,
                document,
                stroke,
            } => {
                if self.current_document().is_none() {
                    log::warn!("No active document, dropping stroke on {}", document);
                    self.renderer.clear_overlay(document);
                    self.repaint(document);
                    return GestureEvent::Discarded {
                        document: document.clone(),
                    };
                }
                self.commit_stroke_from(Some(*tab_id), document, stroke.clone());
            }
            GestureEvent::Discarded { document } => {
                self.renderer.clear_overlay(document);
            }
            _ => {}
        }
        event
    }

    /// Touch start with the full touch list. Two touches start scrolling,
    /// which drops any gesture in progress.
    pub fn touch_start(&mut self, touches: &[Point], scroll_top: f64) -> bool {
        if !self.input.scroll_mut().touch_start(touches, scroll_top) {
            return false;
        }
        if let Some(gesture) = self.input.abandon() {
            log::debug!("Gesture abandoned for two-finger scroll");
            self.renderer.clear_overlay(&gesture.document);
            // Erase gestures draw straight onto the offscreen surface
            self.repaint(&gesture.document);
        }
        true
    }

    /// Touch move; returns the new scroll offset while scrolling.
    pub fn touch_move(&self, touches: &[Point]) -> Option<f64> {
        self.input.scroll().touch_move(touches)
    }

    /// Touch end with the number of touches still down.
    pub fn touch_end(&mut self, remaining: usize) {
        self.input.scroll_mut().touch_end(remaining);
    }

    pub fn touch_cancel(&mut self) {
        self.input.scroll_mut().cancel();
    }
}
