//! Session replay, persistence and raster output.

mod common;

use common::{config, draw, draw_many, with_passage};
use versemark_app::{AppConfig, Annotator, Command, Modifiers, parse_session, replay_session};
use versemark_core::storage::{FileStore, KeyValueStore, MemoryStore};
use versemark_core::document::PassageSnapshot;

const SESSION: &str = r#"[
    {"event":"open_passage","data":{"book":"John","chapter":3,"verse":16,"translation":"ESV"}},
    {"event":"pointer","data":{"phase":"down","id":1,"position":{"x":10,"y":10},"input":"touch"}},
    {"event":"pointer","data":{"phase":"move","id":1,"position":{"x":40,"y":30}}},
    {"event":"pointer","data":{"phase":"move","id":1,"position":{"x":80,"y":12}}},
    {"event":"pointer","data":{"phase":"up","id":1}},
    {"event":"tool","data":"highlighter"},
    {"event":"pointer","data":{"phase":"down","id":2,"position":{"x":10,"y":60}}},
    {"event":"pointer","data":{"phase":"move","id":2,"position":{"x":120,"y":60}}},
    {"event":"pointer","data":{"phase":"up","id":2}},
    {"event":"key","data":{"key":"z","modifiers":{"ctrl":true}}},
    {"event":"key","data":{"key":"y","modifiers":{"meta":true}}},
    {"event":"save_popup","data":{"word":"loved","x":30,"y":12}},
    {"event":"close_tab","data":999}
]"#;

#[test]
fn test_replay_session() {
    let events = parse_session(SESSION).unwrap();
    let mut annotator = Annotator::new(&config(), MemoryStore::new());
    let report = replay_session(&mut annotator, &events);

    assert_eq!(report.applied, events.len() - 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.strokes, 2);
    // passage load, stroke, tool change, stroke
    assert_eq!(report.history_len, 4);
    assert_eq!(report.redo_len, 0);
    assert_eq!(annotator.engine().current_popups().len(), 1);
}

#[test]
fn test_annotations_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let app_config = AppConfig {
        storage_dir: Some(dir.path().to_path_buf()),
        ..config()
    };
    let passage = PassageSnapshot::new("Psalms", 23, 1, "ESV");

    {
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        let mut annotator = Annotator::new(&app_config, store);
        annotator.open_passage(passage.clone()).unwrap();
        draw_many(&mut annotator, 3);
    }

    let store = FileStore::new(dir.path().to_path_buf()).unwrap();
    assert_eq!(
        store.keys().unwrap(),
        vec!["bible-annotations-Psalms-23-1-null-ESV-strokes".to_string()]
    );
    let mut annotator = Annotator::new(&app_config, store);
    annotator.open_passage(passage).unwrap();
    assert_eq!(annotator.engine().current_strokes().len(), 3);
    assert!(!annotator.current_view().unwrap().visible.is_blank());
    // History is not persisted; only this session's passage load is in it
    assert_eq!(annotator.engine().history().len(), 1);
}

#[test]
fn test_repaint_is_stable() {
    let mut annotator = with_passage("Genesis", 1, 1);
    draw_many(&mut annotator, 3);
    let key = annotator.engine().current_key().unwrap();

    annotator.engine_mut().repaint(&key);
    let first = annotator.current_view().unwrap().visible.clone();
    annotator.engine_mut().repaint(&key);
    assert_eq!(&first, &annotator.current_view().unwrap().visible);
}

#[test]
fn test_export_png() {
    let mut annotator = with_passage("Genesis", 1, 1);
    draw(&mut annotator, &[(0.0, 0.0), (50.0, 50.0)]);
    let png = annotator.export_png().unwrap().unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (200, 300));
    assert_eq!(decoded.get_pixel(25, 25).0[3], 255);
}

#[test]
fn test_shortcuts_drive_history() {
    let mut annotator = with_passage("Genesis", 1, 1);
    draw_many(&mut annotator, 1);

    assert_eq!(annotator.press_key("z", Modifiers::CTRL), Some(Command::Undo));
    assert!(annotator.engine().current_strokes().is_empty());
    assert_eq!(
        annotator.press_key("z", Modifiers::CTRL.with_shift()),
        Some(Command::Redo)
    );
    assert_eq!(annotator.engine().current_strokes().len(), 1);
    assert_eq!(annotator.press_key("q", Modifiers::CTRL), None);
}

#[test]
fn test_storage_quota_does_not_lose_session_state() {
    let mut annotator = Annotator::new(&config(), MemoryStore::with_quota(64));
    annotator
        .open_passage(PassageSnapshot::new("Genesis", 1, 1, "ESV"))
        .unwrap();
    draw_many(&mut annotator, 4);

    assert_eq!(annotator.engine().current_strokes().len(), 4);
    assert!(annotator.engine().store().is_empty());
    assert!(annotator.engine_mut().undo());
    assert_eq!(annotator.engine().current_strokes().len(), 3);
}

#[test]
fn test_unsaved_stroke_survives_tab_round_trip() {
    let mut annotator = with_passage("Genesis", 1, 1);
    let first = annotator.tabs().active_id().unwrap();
    let key = annotator.engine().current_key().unwrap();
    draw(&mut annotator, &[(10.0, 10.0), (60.0, 10.0)]);
    let kept = annotator.engine().current_strokes()[0].clone();

    // Storage now holds exactly the first stroke; the second only lives in memory
    let used = annotator.engine().store().used_bytes();
    annotator.engine_mut().store_mut().set_quota(Some(used));
    draw(&mut annotator, &[(10.0, 40.0), (60.0, 40.0)]);
    assert_eq!(annotator.engine().current_strokes().len(), 2);

    annotator.create_tab();
    annotator.switch_tab(first).unwrap();
    assert_eq!(annotator.engine().current_key(), Some(key.clone()));
    assert_eq!(annotator.engine().current_strokes().len(), 2);

    // Tab switch, tab create, then the unsaved stroke
    for _ in 0..3 {
        assert!(annotator.engine_mut().undo());
    }
    assert_eq!(annotator.engine().strokes().strokes(&key), &[kept][..]);
}
