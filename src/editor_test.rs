#![allow(clippy::float_cmp)]

use chrono::{TimeZone, Utc};

use super::*;
use crate::clock::ManualClock;
use crate::doc::ElementKind;
use crate::storage::MemoryStorage;

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())
}

fn editor_with(route: &Route, clock: &ManualClock) -> EditorCore<MemoryStorage> {
    let mut editor = EditorCore::open(MemoryStorage::new(), &EditorConfig::default(), route, Box::new(clock.clone()));
    editor.resize(400.0, 400.0, 1.0);
    editor
}

fn editor(clock: &ManualClock) -> EditorCore<MemoryStorage> {
    editor_with(&Route::album("a1"), clock)
}

fn key(name: &str) -> Key {
    Key(name.to_owned())
}

/// Press and release at `at` to select whatever is there.
fn tap(editor: &mut EditorCore<MemoryStorage>, at: Point) {
    editor.pointer_down(1, at);
    editor.pointer_up(1);
}

// =============================================================
// Open / route
// =============================================================

#[test]
fn quick_photo_on_new_album_requests_capture_once() {
    let clock = clock();
    let route = Route { album_id: "q1".into(), quick_photo: true };
    let mut editor = editor_with(&route, &clock);
    assert!(editor.take_capture_request());
    assert!(!editor.take_capture_request());
}

#[test]
fn quick_photo_on_existing_album_does_not_request_capture() {
    let clock = clock();
    let mut first = editor(&clock);
    first.add_text("x");
    first.leave();
    let storage = first.model().store().storage().clone();

    let route = Route { album_id: "a1".into(), quick_photo: true };
    let mut editor = EditorCore::open(storage, &EditorConfig::default(), &route, Box::new(clock.clone()));
    assert!(!editor.take_capture_request());
}

#[test]
fn new_album_shows_first_page() {
    let clock = clock();
    let editor = editor(&clock);
    assert_eq!(editor.page_label(), "Page 1 of 1");
    assert!(editor.current_page().unwrap().is_empty());
    assert!(editor.is_saved());
}

// =============================================================
// Paging
// =============================================================

#[test]
fn go_next_on_last_page_grows_album() {
    let clock = clock();
    let mut editor = editor(&clock);
    assert!(editor.go_next());
    assert_eq!(editor.model().page_count(), 2);
    assert_eq!(editor.current_index(), 1);
    assert!(editor.go_prev());
    assert!(editor.go_next());
    assert_eq!(editor.model().page_count(), 2);
}

#[test]
fn add_page_moves_onto_it() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_page();
    editor.add_page();
    assert_eq!(editor.current_index(), 2);
    assert_eq!(editor.page_label(), "Page 3 of 3");
}

#[test]
fn deleting_current_last_page_clamps_index() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_page();
    editor.add_page();
    assert!(editor.delete_current_page());
    assert_eq!(editor.current_index(), 1);
    assert_eq!(editor.model().page_count(), 2);
}

#[test]
fn deleting_earlier_page_keeps_index_in_range_and_commits_edit() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_page();
    editor.add_page();
    editor.add_text("hello");
    tap(&mut editor, Point::new(200.0, 200.0));
    assert!(editor.begin_edit());
    editor.edit_input("bye");

    assert!(editor.delete_page(0));
    assert_eq!(editor.model().page_count(), 2);
    assert_eq!(editor.current_index(), 1);
    assert_eq!(editor.model().page(1).unwrap().texts[0].content, "bye");
    assert!(editor.model().page(0).unwrap().is_empty());
    assert!(!editor.surface().is_editing());
    assert!(editor.surface().selected().is_none());
}

#[test]
fn deleting_later_page_keeps_selection() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_page();
    editor.go_to_page(0);
    editor.add_sticker("⭐");
    tap(&mut editor, Point::new(200.0, 200.0));
    assert!(editor.delete_page(1));
    assert_eq!(editor.current_index(), 0);
    assert!(editor.surface().selected().is_some());
}

#[test]
fn only_page_cannot_be_deleted() {
    let clock = clock();
    let mut editor = editor(&clock);
    assert!(!editor.delete_current_page());
    assert_eq!(editor.model().page_count(), 1);
}

#[test]
fn go_to_page_closes_manager() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_page();
    editor.open_page_manager();
    assert!(editor.go_to_page(0));
    assert_eq!(editor.current_index(), 0);
    assert!(!editor.navigator().is_manager_open());
    assert!(!editor.go_to_page(9));
}

#[test]
fn swipe_left_on_empty_canvas_changes_page() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_page();
    editor.go_to_page(0);
    assert_eq!(editor.pointer_down(1, Point::new(350.0, 200.0)), PressTarget::Empty);
    assert!(editor.pointer_move(1, Point::new(200.0, 205.0)));
    editor.pointer_up(1);
    assert_eq!(editor.current_index(), 1);
}

#[test]
fn pointer_cancel_aborts_swipe_without_paging() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_page();
    editor.go_to_page(0);
    assert_eq!(editor.pointer_down(1, Point::new(350.0, 200.0)), PressTarget::Empty);
    assert!(editor.pointer_move(1, Point::new(100.0, 205.0)));
    assert!(editor.swipe().offset() < 0.0);

    editor.pointer_cancel(1);
    assert!(!editor.swipe().is_tracking());
    assert_eq!(editor.swipe().offset(), 0.0);
    editor.pointer_up(1);
    assert_eq!(editor.current_index(), 0);
    assert_eq!(editor.model().page_count(), 2);
}

#[test]
fn press_on_element_never_swipes() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_page();
    editor.go_to_page(0);
    editor.add_photo("data:x");
    assert_eq!(editor.pointer_down(1, Point::new(200.0, 200.0)), PressTarget::Element);
    editor.pointer_move(1, Point::new(100.0, 200.0));
    editor.pointer_up(1);
    assert_eq!(editor.current_index(), 0);
    assert!(!editor.swipe().is_tracking());
}

// =============================================================
// Element interaction
// =============================================================

#[test]
fn drag_updates_document() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_sticker("⭐");
    editor.pointer_down(1, Point::new(200.0, 200.0));
    editor.pointer_move(1, Point::new(300.0, 100.0));
    editor.pointer_up(1);
    let frame = editor.current_page().unwrap().stickers[0].frame;
    assert_eq!((frame.x, frame.y), (75.0, 25.0));
    assert!(!editor.is_saved());
}

#[test]
fn resize_floor_holds_with_invalid_configured_minimum() {
    let clock = clock();
    let config = EditorConfig::from_lookup(|key| match key {
        "SCRAPBOOK_MIN_ELEMENT_SIZE" => Ok("NaN".to_owned()),
        _ => Err(()),
    });
    let mut editor = EditorCore::open(MemoryStorage::new(), &config, &Route::album("a1"), Box::new(clock.clone()));
    editor.resize(400.0, 400.0, 1.0);
    editor.add_photo("data:x");
    tap(&mut editor, Point::new(200.0, 200.0));

    // Bottom-right handle of the 220px photo centered at (200, 200).
    editor.pointer_down(1, Point::new(310.0, 310.0));
    editor.pointer_move(1, Point::new(10.0, 10.0));
    editor.pointer_up(1);
    let frame = editor.current_page().unwrap().photos[0].frame;
    assert_eq!((frame.width, frame.height), (24.0, 24.0));
}

#[test]
fn tap_on_element_leaves_album_saved() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_sticker("⭐");
    assert!(editor.save());
    editor.pointer_down(1, Point::new(200.0, 200.0));
    editor.pointer_move(1, Point::new(200.0, 200.0));
    editor.pointer_up(1);
    assert!(editor.surface().selected().is_some());
    assert!(editor.is_saved());
}

#[test]
fn delete_key_removes_selected_element() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_sticker("⭐");
    tap(&mut editor, Point::new(200.0, 200.0));
    assert!(editor.on_key_down(&key("Delete")));
    assert!(editor.current_page().unwrap().is_empty());
    assert!(editor.surface().selected().is_none());
}

#[test]
fn caption_edit_with_keys() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_photo("data:x");
    tap(&mut editor, Point::new(200.0, 200.0));
    assert!(editor.begin_edit());
    editor.edit_input("beach");
    // Arrows belong to the text field while editing.
    assert!(!editor.on_key_down(&key("ArrowRight")));
    assert!(!editor.on_key_down(&key("Backspace")));
    assert!(editor.on_key_down(&key("Enter")));
    assert_eq!(editor.current_page().unwrap().photos[0].caption, "beach");
}

#[test]
fn escape_cancels_edit_then_deselects() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_text("hello");
    tap(&mut editor, Point::new(200.0, 200.0));
    editor.begin_edit();
    editor.edit_input("changed");
    assert!(editor.on_key_down(&key("Escape")));
    assert_eq!(editor.current_page().unwrap().texts[0].content, "hello");
    assert!(editor.surface().selected().is_some());
    assert!(editor.on_key_down(&key("Escape")));
    assert!(editor.surface().selected().is_none());
    assert!(!editor.on_key_down(&key("Escape")));
}

#[test]
fn page_change_commits_open_edit_to_original_page() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_text("hello");
    tap(&mut editor, Point::new(200.0, 200.0));
    editor.begin_edit();
    editor.edit_input("bye");
    assert!(editor.go_next());
    assert_eq!(editor.model().page(0).unwrap().texts[0].content, "bye");
    assert!(!editor.surface().is_editing());
}

#[test]
fn undo_drops_stale_selection() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_photo("data:x");
    editor.add_sticker("⭐");
    tap(&mut editor, Point::new(200.0, 200.0));
    assert_eq!(editor.surface().selected().map(|(k, _)| k), Some(ElementKind::Sticker));
    assert!(editor.undo_last());
    assert!(editor.surface().selected().is_none());
    assert_eq!(editor.current_page().unwrap().photos.len(), 1);
}

// =============================================================
// Drawing
// =============================================================

#[test]
fn finished_drawing_becomes_photo() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.set_drawing_mode(true);
    assert_eq!(editor.pointer_down(1, Point::new(10.0, 10.0)), PressTarget::Drawing);
    editor.pointer_move(1, Point::new(200.0, 300.0));
    editor.pointer_up(1);
    let id = editor.finish_drawing().unwrap();
    assert!(!editor.is_drawing());
    let photo = &editor.current_page().unwrap().photos[0];
    assert_eq!(photo.id, id);
    assert!(photo.src.starts_with("data:image/png;base64,"));
    assert_eq!((photo.frame.width, photo.frame.height), (400.0, 400.0));
}

#[test]
fn blank_drawing_adds_nothing() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.set_drawing_mode(true);
    editor.pointer_down(1, Point::new(10.0, 10.0));
    editor.pointer_up(1);
    editor.clear_drawing();
    assert!(editor.finish_drawing().is_none());
    assert!(!editor.is_drawing());
    assert!(editor.current_page().unwrap().is_empty());
}

#[test]
fn finish_outside_drawing_mode_is_ignored() {
    let clock = clock();
    let mut editor = editor(&clock);
    assert!(editor.finish_drawing().is_none());
}

#[test]
fn drawing_mode_blocks_swipe() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_page();
    editor.go_to_page(0);
    editor.set_drawing_mode(true);
    editor.pointer_down(1, Point::new(350.0, 200.0));
    editor.pointer_move(1, Point::new(50.0, 200.0));
    editor.pointer_up(1);
    assert_eq!(editor.current_index(), 0);
}

// =============================================================
// Persistence
// =============================================================

#[test]
fn autosave_runs_after_quiet_interval() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_text("x");
    assert_eq!(editor.next_deadline(), Some(clock.now_ms() + 2_000));
    clock.advance_ms(2_000);
    assert!(editor.tick());
    assert!(editor.is_saved());
    assert!(editor.is_saving_indicator_visible());
}

#[test]
fn leave_flushes_pending_changes() {
    let clock = clock();
    let mut editor = editor(&clock);
    editor.add_sticker("⭐");
    assert!(!editor.is_saved());
    assert!(editor.leave());
    assert!(editor.is_saved());
    assert_eq!(editor.model().store().storage().writes(), 1);
}
