#![allow(clippy::float_cmp)]

use chrono::TimeZone;
use serde_json::json;

use super::*;
use crate::consts::MIN_ELEMENT_SIZE;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

fn repair(raw: &Value) -> Repair {
    repair_album("a1", raw, MIN_ELEMENT_SIZE, now()).unwrap()
}

fn well_formed() -> Value {
    json!({
        "id": "a1",
        "name": "Trip",
        "createdAt": "2024-05-01T12:00:00Z",
        "pages": [{
            "id": "p1",
            "photos": [{"id": "photo-1", "x": 10, "y": 20, "width": 220, "height": 220, "src": "data:x", "caption": "hi"}],
            "stickers": [{"id": "sticker-1", "x": 50, "y": 50, "width": 60, "height": 60, "src": "⭐"}],
            "texts": [{"id": "text-1", "x": 30, "y": 70, "width": 160, "height": 48, "content": "hello", "fontSize": 24, "color": "#000"}]
        }]
    })
}

// =============================================================
// Well-formed input
// =============================================================

#[test]
fn well_formed_album_is_unchanged() {
    let r = repair(&well_formed());
    assert!(!r.changed);
    assert_eq!(r.dropped, 0);
    assert_eq!(r.album.name, "Trip");
    assert_eq!(r.album.created_at, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    let page = &r.album.pages[0];
    assert_eq!(page.id.as_str(), "p1");
    assert_eq!(page.photos[0].caption, "hi");
    assert_eq!(page.photos[0].frame.x, 10.0);
    assert_eq!(page.stickers[0].src, "⭐");
    assert_eq!(page.texts[0].content, "hello");
}

#[test]
fn repaired_album_round_trips_through_serde() {
    let r = repair(&well_formed());
    let value = serde_json::to_value(&r.album).unwrap();
    let again = repair(&value);
    assert!(!again.changed);
    assert_eq!(again.album, r.album);
}

#[test]
fn non_object_is_rejected() {
    assert!(repair_album("a1", &json!("garbage"), MIN_ELEMENT_SIZE, now()).is_none());
    assert!(repair_album("a1", &json!([1, 2]), MIN_ELEMENT_SIZE, now()).is_none());
}

// =============================================================
// Album-level repair
// =============================================================

#[test]
fn missing_pages_get_one_empty_page() {
    let r = repair(&json!({"id": "a1", "name": "Trip", "createdAt": "2024-05-01T12:00:00Z"}));
    assert!(r.changed);
    assert_eq!(r.album.pages.len(), 1);
    assert_eq!(r.album.pages[0].id.as_str(), "page-1");
}

#[test]
fn empty_pages_array_gets_one_page() {
    let r = repair(&json!({"id": "a1", "name": "Trip", "createdAt": "2024-05-01T12:00:00Z", "pages": []}));
    assert!(r.changed);
    assert_eq!(r.album.pages.len(), 1);
}

#[test]
fn id_comes_from_key() {
    let mut raw = well_formed();
    raw["id"] = json!("other");
    let r = repair(&raw);
    assert!(r.changed);
    assert_eq!(r.album.id, "a1");
}

#[test]
fn blank_name_falls_back() {
    let mut raw = well_formed();
    raw["name"] = json!("  ");
    let r = repair(&raw);
    assert!(r.changed);
    assert_eq!(r.album.name, "New Album");
}

#[test]
fn invalid_date_uses_now() {
    let mut raw = well_formed();
    raw["createdAt"] = json!("yesterday");
    let r = repair(&raw);
    assert!(r.changed);
    assert_eq!(r.album.created_at, now());
}

#[test]
fn epoch_millis_date_is_revived() {
    let mut raw = well_formed();
    raw["createdAt"] = json!(1_714_564_800_000_i64);
    let r = repair(&raw);
    assert!(r.changed);
    assert_eq!(r.album.created_at, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
}

// =============================================================
// Page-level repair
// =============================================================

#[test]
fn missing_collections_default_to_empty() {
    let r = repair(&json!({
        "id": "a1", "name": "Trip", "createdAt": "2024-05-01T12:00:00Z",
        "pages": [{"id": "p1", "photos": []}]
    }));
    assert!(r.changed);
    assert!(r.album.pages[0].stickers.is_empty());
    assert!(r.album.pages[0].texts.is_empty());
}

#[test]
fn malformed_collection_becomes_empty() {
    let mut raw = well_formed();
    raw["pages"][0]["stickers"] = json!("not an array");
    let r = repair(&raw);
    assert!(r.changed);
    assert!(r.album.pages[0].stickers.is_empty());
    assert_eq!(r.album.pages[0].photos.len(), 1);
}

#[test]
fn malformed_page_is_dropped() {
    let mut raw = well_formed();
    raw["pages"].as_array_mut().unwrap().push(json!(42));
    let r = repair(&raw);
    assert_eq!(r.dropped, 1);
    assert_eq!(r.album.pages.len(), 1);
}

#[test]
fn duplicate_page_ids_are_regenerated() {
    let r = repair(&json!({
        "id": "a1", "name": "Trip", "createdAt": "2024-05-01T12:00:00Z",
        "pages": [
            {"id": "p1", "photos": [], "stickers": [], "texts": []},
            {"id": "p1", "photos": [], "stickers": [], "texts": []}
        ]
    }));
    assert!(r.changed);
    assert_ne!(r.album.pages[0].id, r.album.pages[1].id);
}

// =============================================================
// Element-level repair
// =============================================================

#[test]
fn photo_without_src_is_dropped() {
    let mut raw = well_formed();
    raw["pages"][0]["photos"] = json!([{"id": "photo-1", "x": 10, "y": 20}]);
    let r = repair(&raw);
    assert_eq!(r.dropped, 1);
    assert!(r.album.pages[0].photos.is_empty());
}

#[test]
fn out_of_range_geometry_is_clamped() {
    let mut raw = well_formed();
    raw["pages"][0]["photos"] = json!([{"id": "photo-1", "x": 140, "y": -5, "width": 3, "height": 220, "src": "s"}]);
    let r = repair(&raw);
    assert!(r.changed);
    let frame = r.album.pages[0].photos[0].frame;
    assert_eq!(frame.x, 100.0);
    assert_eq!(frame.y, 0.0);
    assert_eq!(frame.width, 24.0);
    assert_eq!(frame.height, 220.0);
}

#[test]
fn missing_geometry_uses_defaults() {
    let mut raw = well_formed();
    raw["pages"][0]["photos"] = json!([{"id": "photo-1", "src": "s"}]);
    let r = repair(&raw);
    let frame = r.album.pages[0].photos[0].frame;
    assert_eq!(frame, Frame { x: 50.0, y: 50.0, width: 220.0, height: 220.0 });
}

#[test]
fn duplicate_element_ids_across_collections_are_regenerated() {
    let mut raw = well_formed();
    raw["pages"][0]["stickers"][0]["id"] = json!("photo-1");
    let r = repair(&raw);
    assert!(r.changed);
    let page = &r.album.pages[0];
    assert_eq!(page.photos[0].id.as_str(), "photo-1");
    assert_ne!(page.stickers[0].id.as_str(), "photo-1");
    assert!(page.stickers[0].id.as_str().starts_with("sticker-"));
}

#[test]
fn legacy_sticker_shape_is_converted() {
    let mut raw = well_formed();
    raw["pages"][0]["stickers"] = json!([{"id": "sticker-9", "type": "🌸", "x": 20, "y": 30, "size": 80}]);
    let r = repair(&raw);
    assert!(r.changed);
    let sticker = &r.album.pages[0].stickers[0];
    assert_eq!(sticker.src, "🌸");
    assert_eq!(sticker.frame, Frame { x: 20.0, y: 30.0, width: 80.0, height: 80.0 });
}

#[test]
fn text_missing_style_gets_defaults() {
    let mut raw = well_formed();
    raw["pages"][0]["texts"] = json!([{"id": "text-1", "x": 30, "y": 70, "width": 160, "height": 48, "content": "hi"}]);
    let r = repair(&raw);
    assert!(r.changed);
    let text = &r.album.pages[0].texts[0];
    assert_eq!(text.font_size, 24.0);
    assert_eq!(text.color, "#1F1A17");
}

#[test]
fn photo_without_caption_is_not_a_change() {
    let mut raw = well_formed();
    raw["pages"][0]["photos"][0].as_object_mut().unwrap().remove("caption");
    let r = repair(&raw);
    assert!(!r.changed);
    assert_eq!(r.album.pages[0].photos[0].caption, "");
}
