//! Drawing input: pointer gestures and two-finger scrolling.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::document::{ActiveDocument, DocumentKey, TabId};
use crate::stroke::{DEFAULT_INTERPOLATE_DISTANCE, InputKind, Stroke, StrokeKind, interpolate};
use crate::tools::DrawingSettings;

/// Pointer event from mouse, pen or touch, in device pixels on the
/// full-content surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum PointerEvent {
    Down {
        id: i32,
        position: Point,
        #[serde(default)]
        input: InputKind,
    },
    Move {
        id: i32,
        position: Point,
    },
    Up {
        id: i32,
    },
    /// Cancelled pointers finish exactly like released ones.
    Cancel {
        id: i32,
    },
}

/// An in-progress stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub pointer_id: i32,
    /// Tab and document the gesture started on.
    pub tab_id: TabId,
    pub document: DocumentKey,
    /// Settings captured when the gesture started.
    pub settings: DrawingSettings,
    pub input_kind: InputKind,
    pub points: Vec<Point>,
}

impl Gesture {
    pub fn is_erase(&self) -> bool {
        self.settings.kind == StrokeKind::Erase
    }
}

/// What the caller must do after feeding an event.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// Not for the drawing state machine.
    Ignored,
    /// A gesture started.
    Started,
    /// Redraw the overlay from the gesture's points.
    Preview,
    /// Erase this segment on the authoritative surface right away.
    Erase { from: Point, to: Point },
    /// Stationary sample, nothing changed.
    Unchanged,
    /// The gesture ended with a stroke to commit into `document`, shown in
    /// tab `tab_id` when it started.
    Committed {
        tab_id: TabId,
        document: DocumentKey,
        stroke: Stroke,
    },
    /// The gesture ended without enough points to make a stroke.
    Discarded { document: DocumentKey },
}

/// State of the drawing state machine.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Active(Gesture),
}

/// Pointer gesture lifecycle: idle, drawing, committed.
///
/// One gesture at a time; other pointers are ignored while it runs and
/// while a two-finger scroll is active.
#[derive(Debug, Clone, Default)]
pub struct DrawingInput {
    state: GestureState,
    scroll: TwoFingerScroll,
}

impl DrawingInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active gesture, if any.
    pub fn gesture(&self) -> Option<&Gesture> {
        match &self.state {
            GestureState::Active(gesture) => Some(gesture),
            GestureState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.gesture().is_some()
    }

    /// Whether a gesture is running on `document`.
    pub fn is_drawing_on(&self, document: &DocumentKey) -> bool {
        self.gesture().is_some_and(|g| &g.document == document)
    }

    pub fn scroll(&self) -> &TwoFingerScroll {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut TwoFingerScroll {
        &mut self.scroll
    }

    /// Start a gesture. `settings` is `None` when the current tool doesn't
    /// draw.
    pub fn begin(
        &mut self,
        pointer_id: i32,
        position: Point,
        input_kind: InputKind,
        target: ActiveDocument,
        settings: Option<DrawingSettings>,
    ) -> GestureEvent {
        if self.is_active() {
            log::trace!("Pointer {} ignored, a gesture is already active", pointer_id);
            return GestureEvent::Ignored;
        }
        if self.scroll.is_active() {
            return GestureEvent::Ignored;
        }
        let Some(settings) = settings else {
            return GestureEvent::Ignored;
        };

        self.state = GestureState::Active(Gesture {
            pointer_id,
            tab_id: target.tab_id,
            document: target.key,
            settings,
            input_kind,
            points: vec![position],
        });
        GestureEvent::Started
    }

    /// Add a sample to the active gesture.
    pub fn extend(&mut self, pointer_id: i32, position: Point) -> GestureEvent {
        let GestureState::Active(gesture) = &mut self.state else {
            return GestureEvent::Ignored;
        };
        if gesture.pointer_id != pointer_id {
            return GestureEvent::Ignored;
        }

        let last = gesture.points.last().copied();
        if last == Some(position) {
            return GestureEvent::Unchanged;
        }
        // Fast finger moves arrive sparsely
        if let (Some(from), InputKind::Touch) = (last, gesture.input_kind) {
            let filled = interpolate(from, position, DEFAULT_INTERPOLATE_DISTANCE);
            gesture.points.extend(filled);
        }
        gesture.points.push(position);

        match last {
            Some(from) if gesture.is_erase() => GestureEvent::Erase { from, to: position },
            _ => GestureEvent::Preview,
        }
    }

    /// End the active gesture on release or cancel.
    pub fn finish(&mut self, pointer_id: i32) -> GestureEvent {
        match &self.state {
            GestureState::Active(gesture) if gesture.pointer_id == pointer_id => {}
            _ => return GestureEvent::Ignored,
        }
        let GestureState::Active(gesture) = std::mem::take(&mut self.state) else {
            return GestureEvent::Ignored;
        };

        if gesture.points.len() < 2 {
            return GestureEvent::Discarded {
                document: gesture.document,
            };
        }
        let stroke = Stroke::new(&gesture.settings, gesture.points, gesture.input_kind);
        GestureEvent::Committed {
            tab_id: gesture.tab_id,
            document: gesture.document,
            stroke,
        }
    }

    /// Drop the active gesture without committing.
    pub fn abandon(&mut self) -> Option<Gesture> {
        match std::mem::take(&mut self.state) {
            GestureState::Active(gesture) => Some(gesture),
            GestureState::Idle => None,
        }
    }
}

/// Two-finger vertical scrolling, independent of drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TwoFingerScroll {
    start: Option<ScrollStart>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollStart {
    mid_y: f64,
    scroll_top: f64,
}

fn mid_y(touches: &[Point]) -> f64 {
    (touches[0].y + touches[1].y) / 2.0
}

impl TwoFingerScroll {
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    /// Touch start with the current touch list. Exactly two touches start a
    /// scroll; anything else stops it.
    pub fn touch_start(&mut self, touches: &[Point], scroll_top: f64) -> bool {
        self.start = (touches.len() == 2).then(|| ScrollStart {
            mid_y: mid_y(touches),
            scroll_top,
        });
        self.is_active()
    }

    /// Touch move; returns the new scroll offset while scrolling.
    pub fn touch_move(&self, touches: &[Point]) -> Option<f64> {
        let start = self.start?;
        if touches.len() != 2 {
            return None;
        }
        Some(start.scroll_top + (start.mid_y - mid_y(touches)))
    }

    /// Touch end with the number of touches still down.
    pub fn touch_end(&mut self, remaining: usize) {
        if remaining < 2 && self.start.take().is_some() {
            log::debug!("Two-finger scroll ended");
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}
