#![allow(clippy::float_cmp)]

use super::*;

#[derive(Default)]
struct Recorder {
    updates: Vec<(ElementId, ElementPatch)>,
    deletes: Vec<ElementId>,
}

impl ElementSink for Recorder {
    fn update(&mut self, id: &ElementId, patch: ElementPatch) {
        self.updates.push((id.clone(), patch));
    }

    fn delete(&mut self, id: &ElementId) {
        self.deletes.push(id.clone());
    }
}

fn gesture() -> Gesture {
    Gesture::new(ElementId::from("photo-1"), 24.0)
}

fn viewport() -> Viewport {
    Viewport::new(400.0, 400.0, 1.0)
}

fn frame() -> Frame {
    Frame { x: 50.0, y: 50.0, width: 100.0, height: 80.0 }
}

fn last_patch(rec: &Recorder) -> &ElementPatch {
    &rec.updates.last().unwrap().1
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_moves_center_by_pointer_delta() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    assert!(g.pointer_down(1, HitPart::Body, Point::new(200.0, 200.0), &frame(), &viewport(), &mut rec));
    assert!(g.is_active());
    assert!(g.pointer_move(1, Point::new(240.0, 180.0), &viewport(), &mut rec));
    let patch = last_patch(&rec);
    assert_eq!(patch.x, Some(60.0));
    assert_eq!(patch.y, Some(45.0));
    assert!(patch.width.is_none());
}

#[test]
fn drag_is_relative_to_press_not_previous_move() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.pointer_down(1, HitPart::Body, Point::new(200.0, 200.0), &frame(), &viewport(), &mut rec);
    g.pointer_move(1, Point::new(220.0, 200.0), &viewport(), &mut rec);
    g.pointer_move(1, Point::new(240.0, 200.0), &viewport(), &mut rec);
    assert_eq!(last_patch(&rec).x, Some(60.0));
}

#[test]
fn drag_clamps_center_half_size_from_edges() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.pointer_down(1, HitPart::Body, Point::new(200.0, 200.0), &frame(), &viewport(), &mut rec);
    g.pointer_move(1, Point::new(-1000.0, 5000.0), &viewport(), &mut rec);
    let patch = last_patch(&rec);
    // Half width 50 of 400 -> 12.5%; half height 40 of 400 -> 90% on the far side.
    assert_eq!(patch.x, Some(12.5));
    assert_eq!(patch.y, Some(90.0));
}

#[test]
fn drag_results_stay_in_percent_range() {
    let vp = Viewport::new(100.0, 100.0, 1.0);
    let big = Frame { x: 50.0, y: 50.0, width: 300.0, height: 300.0 };
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.pointer_down(1, HitPart::Body, Point::new(50.0, 50.0), &big, &vp, &mut rec);
    for step in [-500.0, -20.0, 0.0, 37.0, 900.0] {
        g.pointer_move(1, Point::new(step, -step), &vp, &mut rec);
    }
    for (_, patch) in &rec.updates {
        let (x, y) = (patch.x.unwrap(), patch.y.unwrap());
        assert!((0.0..=100.0).contains(&x));
        assert!((0.0..=100.0).contains(&y));
    }
}

#[test]
fn drag_on_unmeasured_viewport_emits_nothing() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.pointer_down(1, HitPart::Body, Point::new(0.0, 0.0), &frame(), &Viewport::default(), &mut rec);
    assert!(!g.pointer_move(1, Point::new(10.0, 10.0), &Viewport::default(), &mut rec));
    assert!(rec.updates.is_empty());
}

#[test]
fn moves_from_other_pointers_are_ignored() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.pointer_down(1, HitPart::Body, Point::new(200.0, 200.0), &frame(), &viewport(), &mut rec);
    assert!(!g.pointer_move(2, Point::new(300.0, 300.0), &viewport(), &mut rec));
    assert!(g.pointer_up(2).is_none());
    assert!(g.is_active());
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_bottom_right_grows_with_delta() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    let part = HitPart::ResizeHandle(Corner::BottomRight);
    g.pointer_down(1, part, Point::new(250.0, 240.0), &frame(), &viewport(), &mut rec);
    g.pointer_move(1, Point::new(270.0, 250.0), &viewport(), &mut rec);
    let patch = last_patch(&rec);
    assert_eq!(patch.width, Some(120.0));
    assert_eq!(patch.height, Some(90.0));
    assert!(patch.x.is_none() && patch.y.is_none());
}

#[test]
fn resize_top_left_inverts_delta() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    let part = HitPart::ResizeHandle(Corner::TopLeft);
    g.pointer_down(1, part, Point::new(150.0, 160.0), &frame(), &viewport(), &mut rec);
    g.pointer_move(1, Point::new(140.0, 150.0), &viewport(), &mut rec);
    let patch = last_patch(&rec);
    assert_eq!(patch.width, Some(110.0));
    assert_eq!(patch.height, Some(90.0));
}

#[test]
fn resize_floors_at_min_size() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    let part = HitPart::ResizeHandle(Corner::TopRight);
    g.pointer_down(1, part, Point::new(250.0, 160.0), &frame(), &viewport(), &mut rec);
    g.pointer_move(1, Point::new(-500.0, 900.0), &viewport(), &mut rec);
    let patch = last_patch(&rec);
    assert_eq!(patch.width, Some(24.0));
    assert_eq!(patch.height, Some(24.0));
}

#[test]
fn resize_press_does_not_start_drag() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    let part = HitPart::ResizeHandle(Corner::BottomLeft);
    g.pointer_down(1, part, Point::new(150.0, 240.0), &frame(), &viewport(), &mut rec);
    assert!(matches!(g.state(), GestureState::Resizing { corner: Corner::BottomLeft, .. }));
    assert!(!g.pointer_down(1, HitPart::Body, Point::new(200.0, 200.0), &frame(), &viewport(), &mut rec));
}

// =============================================================
// Delete / session end
// =============================================================

#[test]
fn delete_button_emits_delete_and_stays_idle() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    assert!(g.pointer_down(1, HitPart::DeleteButton, Point::new(200.0, 140.0), &frame(), &viewport(), &mut rec));
    assert_eq!(rec.deletes, vec![ElementId::from("photo-1")]);
    assert_eq!(g.state(), &GestureState::Idle);
    assert!(!g.pointer_move(1, Point::new(300.0, 300.0), &viewport(), &mut rec));
    assert!(rec.updates.is_empty());
}

#[test]
fn pointer_up_releases_pointer_and_idles() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.pointer_down(7, HitPart::Body, Point::new(200.0, 200.0), &frame(), &viewport(), &mut rec);
    assert_eq!(g.pointer_up(7), Some(7));
    assert_eq!(g.state(), &GestureState::Idle);
}

#[test]
fn pointer_cancel_emits_nothing_further() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.pointer_down(3, HitPart::Body, Point::new(200.0, 200.0), &frame(), &viewport(), &mut rec);
    g.pointer_move(3, Point::new(210.0, 200.0), &viewport(), &mut rec);
    assert_eq!(g.pointer_cancel(3), Some(3));
    assert_eq!(rec.updates.len(), 1);
    assert!(!g.pointer_move(3, Point::new(260.0, 200.0), &viewport(), &mut rec));
}

#[test]
fn end_when_idle_releases_nothing() {
    let mut g = gesture();
    assert!(g.end().is_none());
}

// =============================================================
// Editing
// =============================================================

#[test]
fn editing_suspends_drag() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.begin_edit("hello", Some(20));
    assert!(!g.pointer_down(1, HitPart::Body, Point::new(200.0, 200.0), &frame(), &viewport(), &mut rec));
    assert!(g.is_editing());
}

#[test]
fn begin_edit_ends_active_session() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.pointer_down(1, HitPart::Body, Point::new(200.0, 200.0), &frame(), &viewport(), &mut rec);
    g.begin_edit("", None);
    assert!(!g.is_active());
    assert_eq!(g.draft(), Some(""));
}

#[test]
fn commit_emits_text_and_exits() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.begin_edit("old", Some(20));
    g.edit_input("a very long caption that keeps going");
    assert_eq!(g.draft(), Some("a very long caption "));
    assert!(g.commit_edit(&mut rec));
    assert_eq!(last_patch(&rec).text.as_deref(), Some("a very long caption "));
    assert!(!g.is_editing());
}

#[test]
fn cancel_emits_nothing() {
    let mut g = gesture();
    let mut rec = Recorder::default();
    g.begin_edit("old", None);
    g.edit_input("new");
    assert!(g.cancel_edit());
    assert!(!g.commit_edit(&mut rec));
    assert!(rec.updates.is_empty());
}
