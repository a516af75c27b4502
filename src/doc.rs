//! Document model: albums, pages, and the elements placed on them.
//!
//! This module defines the persisted data types (`Album`, `Page`, `Photo`,
//! `Sticker`, `TextBox`), the tagged unions used to route mutations by kind
//! (`ElementKind`, `Element`, `ElementRef`), and the sparse update type
//! (`ElementPatch`) emitted by gestures.
//!
//! Element positions are centers in percent of the canvas; sizes are CSS
//! pixels. `Page` enforces the geometry invariants whenever a patch is
//! applied: centers are clamped into `[0, 100]` and sizes never drop below the
//! minimum floor.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    ALBUM_NAME_MAX_CHARS, CAPTION_MAX_CHARS, DEFAULT_ALBUM_NAME, DEFAULT_CENTER_PCT, DEFAULT_FONT_SIZE, DEFAULT_PHOTO_SIZE,
    DEFAULT_STICKER_SIZE, DEFAULT_TEXT_COLOR, DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH, FIRST_PAGE_ID,
};
use crate::geom::{Size, clamp_pct};

/// Identifier of an album; taken verbatim from the route.
pub type AlbumId = String;

/// Unique identifier for an element within its page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh id such as `photo-1b4e28ba-2fa1-11d2-883f-0016d3cca427`.
    #[must_use]
    pub fn generate(kind: ElementKind) -> Self {
        Self(format!("{}-{}", kind.prefix(), Uuid::new_v4()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a page within its album.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("page-{}", Uuid::new_v4()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PageId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which collection of a page an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Photo,
    Sticker,
    Text,
}

impl ElementKind {
    /// Order in which "undo last" inspects collections.
    pub const UNDO_PRIORITY: [ElementKind; 3] = [Self::Sticker, Self::Photo, Self::Text];

    fn prefix(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Sticker => "sticker",
            Self::Text => "text",
        }
    }
}

/// Position and size shared by every element.
///
/// `x`/`y` are the element center in percent of the canvas; `width`/`height`
/// are CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    /// A frame of the given size centered on the canvas.
    #[must_use]
    pub fn centered(width: f64, height: f64) -> Self {
        Self { x: DEFAULT_CENTER_PCT, y: DEFAULT_CENTER_PCT, width, height }
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Apply the geometric part of a patch, enforcing the invariants.
    /// Returns whether the frame moved or changed size.
    fn apply(&mut self, patch: &ElementPatch, min_size: f64) -> bool {
        let before = *self;
        if let Some(x) = patch.x {
            self.x = clamp_pct(x);
        }
        if let Some(y) = patch.y {
            self.y = clamp_pct(y);
        }
        if let Some(w) = patch.width.filter(|w| w.is_finite()) {
            self.width = w.max(min_size);
        }
        if let Some(h) = patch.height.filter(|h| h.is_finite()) {
            self.height = h.max(min_size);
        }
        *self != before
    }
}

/// A placed photo (captured, uploaded or drawn).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: ElementId,
    #[serde(flatten)]
    pub frame: Frame,
    /// Encoded image payload (data URL) or image reference.
    pub src: String,
    #[serde(default)]
    pub caption: String,
}

/// A placed sticker: an emoji glyph or an image reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: ElementId,
    #[serde(flatten)]
    pub frame: Frame,
    pub src: String,
}

/// A placed block of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    pub id: ElementId,
    #[serde(flatten)]
    pub frame: Frame,
    pub content: String,
    pub font_size: f64,
    pub color: String,
}

/// Lookup by id, shared by the three element collections.
pub trait Placed {
    fn id(&self) -> &ElementId;
}

impl Placed for Photo {
    fn id(&self) -> &ElementId {
        &self.id
    }
}

impl Placed for Sticker {
    fn id(&self) -> &ElementId {
        &self.id
    }
}

impl Placed for TextBox {
    fn id(&self) -> &ElementId {
        &self.id
    }
}

/// An owned element of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Photo(Photo),
    Sticker(Sticker),
    Text(TextBox),
}

impl Element {
    /// New photo with a fresh id, default size and no caption.
    #[must_use]
    pub fn photo(src: impl Into<String>) -> Self {
        Self::Photo(Photo {
            id: ElementId::generate(ElementKind::Photo),
            frame: Frame::centered(DEFAULT_PHOTO_SIZE, DEFAULT_PHOTO_SIZE),
            src: src.into(),
            caption: String::new(),
        })
    }

    /// New sticker with a fresh id and default size.
    #[must_use]
    pub fn sticker(src: impl Into<String>) -> Self {
        Self::Sticker(Sticker {
            id: ElementId::generate(ElementKind::Sticker),
            frame: Frame::centered(DEFAULT_STICKER_SIZE, DEFAULT_STICKER_SIZE),
            src: src.into(),
        })
    }

    /// New text box with a fresh id and default styling.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(TextBox {
            id: ElementId::generate(ElementKind::Text),
            frame: Frame::centered(DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT),
            content: content.into(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_TEXT_COLOR.to_owned(),
        })
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Photo(_) => ElementKind::Photo,
            Self::Sticker(_) => ElementKind::Sticker,
            Self::Text(_) => ElementKind::Text,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ElementId {
        self.as_element_ref().id()
    }

    #[must_use]
    pub fn frame(&self) -> &Frame {
        self.as_element_ref().frame()
    }

    #[must_use]
    pub fn as_element_ref(&self) -> ElementRef<'_> {
        match self {
            Self::Photo(p) => ElementRef::Photo(p),
            Self::Sticker(s) => ElementRef::Sticker(s),
            Self::Text(t) => ElementRef::Text(t),
        }
    }
}

/// A borrowed element of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementRef<'a> {
    Photo(&'a Photo),
    Sticker(&'a Sticker),
    Text(&'a TextBox),
}

impl<'a> ElementRef<'a> {
    #[must_use]
    pub fn kind(self) -> ElementKind {
        match self {
            Self::Photo(_) => ElementKind::Photo,
            Self::Sticker(_) => ElementKind::Sticker,
            Self::Text(_) => ElementKind::Text,
        }
    }

    #[must_use]
    pub fn id(self) -> &'a ElementId {
        match self {
            Self::Photo(p) => &p.id,
            Self::Sticker(s) => &s.id,
            Self::Text(t) => &t.id,
        }
    }

    #[must_use]
    pub fn frame(self) -> &'a Frame {
        match self {
            Self::Photo(p) => &p.frame,
            Self::Sticker(s) => &s.frame,
            Self::Text(t) => &t.frame,
        }
    }

    /// The editable text of the element: a photo's caption or a text box's
    /// content. Stickers have none.
    #[must_use]
    pub fn editable_text(self) -> Option<&'a str> {
        match self {
            Self::Photo(p) => Some(&p.caption),
            Self::Sticker(_) => None,
            Self::Text(t) => Some(&t.content),
        }
    }
}

/// Sparse update for an element. Only present fields are applied.
///
/// `text` targets a photo's caption or a text box's content; `font_size` and
/// `color` only apply to text boxes. Fields that do not apply to the target
/// kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ElementPatch {
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }
}

/// Outcome of [`Page::apply_patch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patched {
    /// No element of that kind has the id.
    Missing,
    /// Found, but the patch matched what was already there.
    Unchanged,
    Changed,
}

impl Patched {
    #[must_use]
    pub fn is_found(self) -> bool {
        self != Self::Missing
    }
}

/// One canvas's worth of placed elements.
///
/// Insertion order within each collection is z-order: later entries are drawn
/// on top and are the first removed by [`Page::pop_last`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    #[serde(default)]
    pub texts: Vec<TextBox>,
}

impl Page {
    /// An empty page with the given id.
    #[must_use]
    pub fn new(id: PageId) -> Self {
        Self { id, photos: Vec::new(), stickers: Vec::new(), texts: Vec::new() }
    }

    /// An empty page with a freshly generated id.
    #[must_use]
    pub fn blank() -> Self {
        Self::new(PageId::generate())
    }

    /// Total number of elements across all collections.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.photos.len() + self.stickers.len() + self.texts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    /// Whether any collection holds an element with this id.
    #[must_use]
    pub fn contains_id(&self, id: &ElementId) -> bool {
        self.elements().any(|el| el.id() == id)
    }

    /// Append an element to the end of its collection.
    pub fn push(&mut self, element: Element) {
        match element {
            Element::Photo(p) => self.photos.push(p),
            Element::Sticker(s) => self.stickers.push(s),
            Element::Text(t) => self.texts.push(t),
        }
    }

    /// Look up an element by kind and id.
    #[must_use]
    pub fn get(&self, kind: ElementKind, id: &ElementId) -> Option<ElementRef<'_>> {
        match kind {
            ElementKind::Photo => find(&self.photos, id).map(ElementRef::Photo),
            ElementKind::Sticker => find(&self.stickers, id).map(ElementRef::Sticker),
            ElementKind::Text => find(&self.texts, id).map(ElementRef::Text),
        }
    }

    /// Merge a patch into the matching element.
    pub fn apply_patch(&mut self, kind: ElementKind, id: &ElementId, patch: &ElementPatch, min_size: f64) -> Patched {
        let changed = match kind {
            ElementKind::Photo => {
                let Some(photo) = find_mut(&mut self.photos, id) else {
                    return Patched::Missing;
                };
                let moved = photo.frame.apply(patch, min_size);
                let captioned = patch
                    .text
                    .as_deref()
                    .is_some_and(|text| replace_if_different(&mut photo.caption, &truncate_chars(text, CAPTION_MAX_CHARS)));
                moved | captioned
            }
            ElementKind::Sticker => {
                let Some(sticker) = find_mut(&mut self.stickers, id) else {
                    return Patched::Missing;
                };
                sticker.frame.apply(patch, min_size)
            }
            ElementKind::Text => {
                let Some(text_box) = find_mut(&mut self.texts, id) else {
                    return Patched::Missing;
                };
                let mut changed = text_box.frame.apply(patch, min_size);
                if let Some(text) = &patch.text {
                    changed |= replace_if_different(&mut text_box.content, text);
                }
                if let Some(size) = patch.font_size.filter(|s| s.is_finite() && *s > 0.0) {
                    changed |= text_box.font_size.to_bits() != size.to_bits();
                    text_box.font_size = size;
                }
                if let Some(color) = &patch.color {
                    changed |= replace_if_different(&mut text_box.color, color);
                }
                changed
            }
        };
        if changed { Patched::Changed } else { Patched::Unchanged }
    }

    /// Remove an element by kind and id, returning it if it was present.
    pub fn remove(&mut self, kind: ElementKind, id: &ElementId) -> Option<Element> {
        match kind {
            ElementKind::Photo => take(&mut self.photos, id).map(Element::Photo),
            ElementKind::Sticker => take(&mut self.stickers, id).map(Element::Sticker),
            ElementKind::Text => take(&mut self.texts, id).map(Element::Text),
        }
    }

    /// Remove the most recently appended element of the first non-empty
    /// collection in [`ElementKind::UNDO_PRIORITY`] order.
    pub fn pop_last(&mut self) -> Option<Element> {
        ElementKind::UNDO_PRIORITY.into_iter().find_map(|kind| match kind {
            ElementKind::Sticker => self.stickers.pop().map(Element::Sticker),
            ElementKind::Photo => self.photos.pop().map(Element::Photo),
            ElementKind::Text => self.texts.pop().map(Element::Text),
        })
    }

    /// All elements in draw order (photos, then stickers, then texts); later
    /// elements sit on top.
    pub fn elements(&self) -> impl DoubleEndedIterator<Item = ElementRef<'_>> {
        self.photos
            .iter()
            .map(ElementRef::Photo)
            .chain(self.stickers.iter().map(ElementRef::Sticker))
            .chain(self.texts.iter().map(ElementRef::Text))
    }
}

/// Top-level user document: a named, ordered collection of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub pages: Vec<Page>,
    pub created_at: DateTime<Utc>,
}

impl Album {
    /// A new album with a single empty page.
    #[must_use]
    pub fn new(id: impl Into<AlbumId>, name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: normalize_name(name).unwrap_or_else(|| DEFAULT_ALBUM_NAME.to_owned()),
            pages: vec![Page::new(PageId::from(FIRST_PAGE_ID))],
            created_at,
        }
    }

    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Trim an album name and cap its length. `None` if nothing is left.
#[must_use]
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(truncate_chars(trimmed, ALBUM_NAME_MAX_CHARS))
}

/// Keep at most `max` characters of `s`.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn replace_if_different(slot: &mut String, value: &str) -> bool {
    if slot == value {
        return false;
    }
    value.clone_into(slot);
    true
}

fn find<'a, T: Placed>(items: &'a [T], id: &ElementId) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

fn find_mut<'a, T: Placed>(items: &'a mut [T], id: &ElementId) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.id() == id)
}

fn take<T: Placed>(items: &mut Vec<T>, id: &ElementId) -> Option<T> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(index))
}
