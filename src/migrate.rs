//! Load-time repair of stored albums.
//!
//! DESIGN
//! ======
//! Everything read from storage goes through [`repair_album`] exactly once.
//! It turns an arbitrary JSON value into an [`Album`] that satisfies every
//! model invariant, so the rest of the crate never re-checks shape:
//!
//! - at least one page; every page has `photos`, `stickers` and `texts` arrays
//! - element ids present and unique within their page
//! - centers within `[0, 100]`, sizes at or above the minimum floor
//! - `createdAt` revived from an ISO string (or epoch millis)
//!
//! Elements that cannot be salvaged (no image source, not an object) are
//! dropped. The older editor stored stickers as `{ type, size }`; those are
//! converted to `{ src, width, height }`.

#[cfg(test)]
#[path = "migrate_test.rs"]
mod migrate_test;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::consts::{
    DEFAULT_ALBUM_NAME, DEFAULT_CENTER_PCT, DEFAULT_FONT_SIZE, DEFAULT_PHOTO_SIZE, DEFAULT_STICKER_SIZE,
    DEFAULT_TEXT_COLOR, DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH, FIRST_PAGE_ID,
};
use crate::doc::{Album, ElementId, ElementKind, Frame, Page, PageId, Photo, Sticker, TextBox, normalize_name};

/// Outcome of repairing one stored album.
#[derive(Debug, Clone, PartialEq)]
pub struct Repair {
    pub album: Album,
    /// True when the repaired album differs from what was stored.
    pub changed: bool,
    /// Number of elements or pages discarded as unsalvageable.
    pub dropped: usize,
}

/// Repair the stored value of album `id`.
///
/// Returns `None` when the value is not a JSON object at all; callers treat
/// that as a missing album.
#[must_use]
pub fn repair_album(id: &str, raw: &Value, min_size: f64, now: DateTime<Utc>) -> Option<Repair> {
    let obj = raw.as_object()?;
    let mut repairer = Repairer { changed: false, dropped: 0, min_size };

    if obj.get("id").and_then(Value::as_str) != Some(id) {
        repairer.changed = true;
    }

    let name = match obj.get("name").and_then(Value::as_str).and_then(normalize_name) {
        Some(name) => {
            if obj.get("name").and_then(Value::as_str) != Some(name.as_str()) {
                repairer.changed = true;
            }
            name
        }
        None => {
            repairer.changed = true;
            DEFAULT_ALBUM_NAME.to_owned()
        }
    };

    let created_at = repairer.created_at(obj.get("createdAt"), now);
    let pages = repairer.pages(obj.get("pages"));

    Some(Repair {
        album: Album { id: id.to_owned(), name, pages, created_at },
        changed: repairer.changed,
        dropped: repairer.dropped,
    })
}

struct Repairer {
    changed: bool,
    dropped: usize,
    min_size: f64,
}

impl Repairer {
    fn created_at(&mut self, raw: Option<&Value>, now: DateTime<Utc>) -> DateTime<Utc> {
        let parsed = match raw {
            Some(Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(_) => None,
            },
            Some(Value::Number(n)) => {
                self.changed = true;
                n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis)
            }
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            self.changed = true;
            now
        })
    }

    fn pages(&mut self, raw: Option<&Value>) -> Vec<Page> {
        let mut pages = Vec::new();
        let mut seen = HashSet::new();

        match raw {
            Some(Value::Array(items)) => {
                for item in items {
                    let Some(page_obj) = item.as_object() else {
                        debug!("dropping malformed page");
                        self.dropped += 1;
                        self.changed = true;
                        continue;
                    };
                    let page = self.page(page_obj, &seen);
                    seen.insert(page.id.as_str().to_owned());
                    pages.push(page);
                }
            }
            _ => self.changed = true,
        }

        if pages.is_empty() {
            self.changed = true;
            pages.push(Page::new(PageId::from(FIRST_PAGE_ID)));
        }
        pages
    }

    fn page(&mut self, obj: &Map<String, Value>, seen_pages: &HashSet<String>) -> Page {
        let id = match obj.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() && !seen_pages.contains(id) => PageId::from(id),
            _ => {
                self.changed = true;
                PageId::generate()
            }
        };

        let mut page = Page::new(id);
        let mut seen = HashSet::new();

        for item in self.collection(obj, "photos") {
            if let Some(photo) = self.photo(item, &mut seen) {
                page.photos.push(photo);
            }
        }
        for item in self.collection(obj, "stickers") {
            if let Some(sticker) = self.sticker(item, &mut seen) {
                page.stickers.push(sticker);
            }
        }
        for item in self.collection(obj, "texts") {
            if let Some(text) = self.text(item, &mut seen) {
                page.texts.push(text);
            }
        }
        page
    }

    fn collection<'a>(&mut self, obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
        match obj.get(key) {
            Some(Value::Array(items)) => items,
            _ => {
                self.changed = true;
                &[]
            }
        }
    }

    fn photo(&mut self, raw: &Value, seen: &mut HashSet<String>) -> Option<Photo> {
        let obj = self.element_object(raw)?;
        let Some(src) = obj.get("src").and_then(Value::as_str) else {
            return self.drop_element("photo without src");
        };
        let caption = match obj.get("caption") {
            Some(Value::String(s)) => s.clone(),
            None => String::new(),
            Some(_) => {
                self.changed = true;
                String::new()
            }
        };
        Some(Photo {
            id: self.element_id(obj, ElementKind::Photo, seen),
            frame: self.frame(obj, DEFAULT_PHOTO_SIZE, DEFAULT_PHOTO_SIZE),
            src: src.to_owned(),
            caption,
        })
    }

    fn sticker(&mut self, raw: &Value, seen: &mut HashSet<String>) -> Option<Sticker> {
        let obj = self.element_object(raw)?;
        let src = match (obj.get("src").and_then(Value::as_str), obj.get("type").and_then(Value::as_str)) {
            (Some(src), _) => src,
            (None, Some(legacy)) => {
                self.changed = true;
                legacy
            }
            (None, None) => return self.drop_element("sticker without src"),
        };

        let mut frame = self.frame(obj, DEFAULT_STICKER_SIZE, DEFAULT_STICKER_SIZE);
        if !obj.contains_key("width") && !obj.contains_key("height") {
            if let Some(size) = obj.get("size").and_then(Value::as_f64).filter(|s| s.is_finite()) {
                frame.width = size.max(self.min_size);
                frame.height = frame.width;
            }
        }

        Some(Sticker { id: self.element_id(obj, ElementKind::Sticker, seen), frame, src: src.to_owned() })
    }

    fn text(&mut self, raw: &Value, seen: &mut HashSet<String>) -> Option<TextBox> {
        let obj = self.element_object(raw)?;
        let Some(content) = obj.get("content").and_then(Value::as_str) else {
            return self.drop_element("text without content");
        };
        let font_size = match obj.get("fontSize").and_then(Value::as_f64) {
            Some(size) if size.is_finite() && size > 0.0 => size,
            _ => {
                self.changed = true;
                DEFAULT_FONT_SIZE
            }
        };
        let color = match obj.get("color").and_then(Value::as_str) {
            Some(color) => color.to_owned(),
            None => {
                self.changed = true;
                DEFAULT_TEXT_COLOR.to_owned()
            }
        };
        Some(TextBox {
            id: self.element_id(obj, ElementKind::Text, seen),
            frame: self.frame(obj, DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT),
            content: content.to_owned(),
            font_size,
            color,
        })
    }

    fn element_object<'a>(&mut self, raw: &'a Value) -> Option<&'a Map<String, Value>> {
        match raw.as_object() {
            Some(obj) => Some(obj),
            None => self.drop_element("element is not an object"),
        }
    }

    fn drop_element<T>(&mut self, reason: &str) -> Option<T> {
        debug!(reason, "dropping malformed element");
        self.dropped += 1;
        self.changed = true;
        None
    }

    fn element_id(&mut self, obj: &Map<String, Value>, kind: ElementKind, seen: &mut HashSet<String>) -> ElementId {
        let id = match obj.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() && !seen.contains(id) => ElementId::from(id),
            _ => {
                self.changed = true;
                ElementId::generate(kind)
            }
        };
        seen.insert(id.as_str().to_owned());
        id
    }

    fn frame(&mut self, obj: &Map<String, Value>, default_width: f64, default_height: f64) -> Frame {
        Frame {
            x: self.coordinate(obj.get("x")),
            y: self.coordinate(obj.get("y")),
            width: self.dimension(obj.get("width"), default_width),
            height: self.dimension(obj.get("height"), default_height),
        }
    }

    fn coordinate(&mut self, raw: Option<&Value>) -> f64 {
        match raw.and_then(Value::as_f64) {
            Some(v) if (0.0..=100.0).contains(&v) => v,
            Some(v) if v.is_finite() => {
                self.changed = true;
                v.clamp(0.0, 100.0)
            }
            _ => {
                self.changed = true;
                DEFAULT_CENTER_PCT
            }
        }
    }

    fn dimension(&mut self, raw: Option<&Value>, default: f64) -> f64 {
        match raw.and_then(Value::as_f64) {
            Some(v) if v.is_finite() && v >= self.min_size => v,
            Some(v) if v.is_finite() => {
                self.changed = true;
                self.min_size
            }
            _ => {
                // Legacy stickers carry `size` instead; the caller overrides.
                self.changed = true;
                default
            }
        }
    }
}
