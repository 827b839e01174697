//! Shared helpers for the integration tests.

#![allow(dead_code)]

use kurbo::Point;
use versemark_app::{AppConfig, Annotator};
use versemark_core::document::PassageSnapshot;
use versemark_core::input::PointerEvent;
use versemark_core::storage::{KeyValueStore, MemoryStore};
use versemark_core::stroke::InputKind;

pub fn config() -> AppConfig {
    AppConfig {
        width: 200.0,
        content_height: 300.0,
        ..AppConfig::default()
    }
}

pub fn annotator() -> Annotator<MemoryStore> {
    Annotator::new(&config(), MemoryStore::new())
}

/// An annotator with `book chapter:verse` open in its first tab.
pub fn with_passage(book: &str, chapter: u32, verse: u32) -> Annotator<MemoryStore> {
    let mut annotator = annotator();
    annotator
        .open_passage(PassageSnapshot::new(book, chapter, verse, "ESV"))
        .unwrap();
    annotator
}

/// Draw one stroke through the pointer events.
pub fn draw<S: KeyValueStore>(annotator: &mut Annotator<S>, points: &[(f64, f64)]) {
    let engine = annotator.engine_mut();
    let (x, y) = points[0];
    engine.handle_pointer(PointerEvent::Down {
        id: 7,
        position: Point::new(x, y),
        input: InputKind::Mouse,
    });
    for &(x, y) in &points[1..] {
        engine.handle_pointer(PointerEvent::Move {
            id: 7,
            position: Point::new(x, y),
        });
    }
    engine.handle_pointer(PointerEvent::Up { id: 7 });
}

/// Draw `count` distinct horizontal strokes.
pub fn draw_many<S: KeyValueStore>(annotator: &mut Annotator<S>, count: usize) {
    for i in 0..count {
        let y = 10.0 + 12.0 * i as f64;
        draw(annotator, &[(10.0, y), (60.0, y), (110.0, y + 3.0)]);
    }
}
