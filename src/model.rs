//! Authoritative in-memory album and every mutation on it.
//!
//! DESIGN
//! ======
//! `DocumentModel` is the only code that mutates an [`Album`]. Each operation
//! targets a page by index and an element by kind and id; a missing album,
//! page or element turns the call into a logged no-op so stale ids from a
//! race between a delete and a pending drag never crash the editor.
//!
//! Every successful mutation marks the [`Autosave`] dirty. The write itself
//! happens in [`DocumentModel::tick`] once the quiet interval has elapsed, or
//! immediately through [`DocumentModel::save`]. Both write the whole album,
//! so the latest snapshot always wins.
//!
//! ERROR HANDLING
//! ==============
//! Storage failures stop here: they are logged, the state stays dirty and the
//! autosave retries later. Nothing in this module returns an error.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use tracing::{debug, warn};

use crate::autosave::{Autosave, SaveTrigger};
use crate::clock::Clock;
use crate::config::EditorConfig;
use crate::doc::{Album, Element, ElementId, ElementKind, ElementPatch, Page, PageId, Patched, normalize_name};
use crate::drawing::DrawingImage;
use crate::storage::StoragePort;
use crate::store::AlbumStore;

/// How [`DocumentModel::open`] obtained its album.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opened {
    /// Read (and possibly repaired) from storage.
    Loaded,
    /// No stored record existed; a fresh album was created in memory.
    Synthesized,
}

/// The album being edited plus its persistence.
pub struct DocumentModel<S: StoragePort> {
    album: Option<Album>,
    store: AlbumStore<S>,
    autosave: Autosave,
    clock: Box<dyn Clock>,
    min_size: f64,
}

impl<S: StoragePort> DocumentModel<S> {
    /// A model with no album loaded yet.
    pub fn new(storage: S, config: &EditorConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            album: None,
            store: AlbumStore::new(storage, config),
            autosave: Autosave::new(config),
            clock,
            min_size: config.min_element_size,
        }
    }

    /// Load `album_id`, or synthesize an empty album when none is stored.
    ///
    /// A synthesized album is not written until its first mutation.
    pub fn open(&mut self, album_id: &str) -> Opened {
        let now = self.clock.now();
        self.autosave.reset();
        match self.store.load_album(album_id, now) {
            Some(album) => {
                self.album = Some(album);
                Opened::Loaded
            }
            None => {
                debug!(album_id = %album_id, "no stored album; starting a new one");
                self.album = Some(Album::new(album_id, "", now));
                Opened::Synthesized
            }
        }
    }

    #[must_use]
    pub fn album(&self) -> Option<&Album> {
        self.album.as_ref()
    }

    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.album.as_ref().and_then(|a| a.page(index))
    }

    /// Number of pages, zero while no album is loaded.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.album.as_ref().map_or(0, Album::page_count)
    }

    #[must_use]
    pub fn store(&self) -> &AlbumStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AlbumStore<S> {
        &mut self.store
    }

    #[must_use]
    pub fn autosave(&self) -> &Autosave {
        &self.autosave
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Append a photo with default geometry.
    pub fn add_photo(&mut self, page_index: usize, src: &str) -> Option<ElementId> {
        self.insert(page_index, Element::photo(src))
    }

    /// Append a sticker with default geometry.
    pub fn add_sticker(&mut self, page_index: usize, src: &str) -> Option<ElementId> {
        self.insert(page_index, Element::sticker(src))
    }

    /// Append a text box with default styling.
    pub fn add_text(&mut self, page_index: usize, content: &str) -> Option<ElementId> {
        self.insert(page_index, Element::text(content))
    }

    /// Append a finished drawing as an uncaptioned photo covering the canvas
    /// area it was drawn on.
    pub fn add_drawing(&mut self, page_index: usize, image: &DrawingImage) -> Option<ElementId> {
        let mut element = Element::photo(image.data_url.as_str());
        if let Element::Photo(photo) = &mut element {
            photo.frame.width = image.width.max(self.min_size);
            photo.frame.height = image.height.max(self.min_size);
        }
        self.insert(page_index, element)
    }

    /// Merge `patch` into an element. Returns whether anything was found.
    ///
    /// A patch that leaves the element as it was does not mark the album
    /// dirty.
    pub fn update_element(&mut self, page_index: usize, kind: ElementKind, id: &ElementId, patch: &ElementPatch) -> bool {
        let min_size = self.min_size;
        let Some(page) = self.page_mut(page_index) else {
            return false;
        };
        match page.apply_patch(kind, id, patch, min_size) {
            Patched::Missing => {
                debug!(page_index, element_id = %id, "update for missing element ignored");
                false
            }
            Patched::Unchanged => true,
            Patched::Changed => {
                self.touch();
                true
            }
        }
    }

    /// Remove an element. Returns whether it existed.
    pub fn delete_element(&mut self, page_index: usize, kind: ElementKind, id: &ElementId) -> bool {
        let Some(page) = self.page_mut(page_index) else {
            return false;
        };
        if page.remove(kind, id).is_none() {
            debug!(page_index, element_id = %id, "delete for missing element ignored");
            return false;
        }
        self.touch();
        true
    }

    /// Remove the most recently added element, checking stickers, then
    /// photos, then texts.
    pub fn undo_last(&mut self, page_index: usize) -> Option<Element> {
        let removed = self.page_mut(page_index)?.pop_last()?;
        self.touch();
        Some(removed)
    }

    /// Append an empty page and return its id.
    pub fn add_page(&mut self) -> Option<PageId> {
        let Some(album) = self.album.as_mut() else {
            debug!("add page before album loaded ignored");
            return None;
        };
        let page = Page::blank();
        let id = page.id.clone();
        album.pages.push(page);
        self.touch();
        Some(id)
    }

    /// Remove a page unless it is the only one. Returns whether it was removed.
    pub fn delete_page(&mut self, page_index: usize) -> bool {
        let Some(album) = self.album.as_mut() else {
            return false;
        };
        if album.pages.len() <= 1 || page_index >= album.pages.len() {
            debug!(page_index, pages = album.pages.len(), "page delete ignored");
            return false;
        }
        album.pages.remove(page_index);
        self.touch();
        true
    }

    /// Rename the album. Blank names are ignored.
    pub fn rename_album(&mut self, name: &str) -> bool {
        let Some(album) = self.album.as_mut() else {
            return false;
        };
        let Some(name) = normalize_name(name) else {
            return false;
        };
        if album.name == name {
            return false;
        }
        album.name = name;
        self.touch();
        true
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    /// Write the album now. Returns whether the write succeeded.
    pub fn save(&mut self, trigger: SaveTrigger) -> bool {
        let Some(album) = self.album.as_ref() else {
            return false;
        };
        let now_ms = self.clock.now_ms();
        match self.store.save_album(album) {
            Ok(()) => {
                self.autosave.record_saved(now_ms, trigger);
                true
            }
            Err(e) => {
                warn!(album_id = %album.id, error = %e, "album save failed; keeping changes in memory");
                self.autosave.record_failed(now_ms);
                false
            }
        }
    }

    /// Save if there are unsaved changes.
    pub fn flush(&mut self) -> bool {
        if self.is_dirty() { self.save(SaveTrigger::Manual) } else { true }
    }

    /// Drive the autosave timer. Returns whether an autosave was attempted.
    pub fn tick(&mut self) -> bool {
        let now_ms = self.clock.now_ms();
        self.autosave.expire_indicator(now_ms);
        if !self.autosave.is_due(now_ms) {
            return false;
        }
        self.save(SaveTrigger::Auto);
        true
    }

    /// Whether the transient "saving" indicator should be visible.
    #[must_use]
    pub fn is_saving_indicator_visible(&self) -> bool {
        self.autosave.is_indicator_visible(self.clock.now_ms())
    }

    fn insert(&mut self, page_index: usize, element: Element) -> Option<ElementId> {
        let Some(page) = self.page_mut(page_index) else {
            debug!(page_index, kind = ?element.kind(), "add to missing page ignored");
            return None;
        };
        let id = element.id().clone();
        page.push(element);
        self.touch();
        Some(id)
    }

    fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.album.as_mut().and_then(|a| a.page_mut(index))
    }

    fn touch(&mut self) {
        let now_ms = self.clock.now_ms();
        self.autosave.mark_dirty(now_ms);
    }
}
