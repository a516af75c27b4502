//! Editor core: the page-editor screen without any DOM.
//!
//! `EditorCore` composes the document model, the canvas surface, the page
//! navigator and the swipe tracker, and translates host input (pointer, key,
//! timer tick) into document operations. Surface requests are collected into
//! a `Vec<SurfaceEvent>` while the page is borrowed and applied to the model
//! afterwards, so every render sees a fully applied mutation.
//!
//! The host is expected to:
//! - forward pointer events in canvas CSS pixels,
//! - call [`EditorCore::resize`] when the container is measured,
//! - call [`EditorCore::tick`] from a timer (and may use
//!   [`EditorCore::next_deadline`] to schedule it),
//! - call [`EditorCore::leave`] before navigating back to the album list.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use tracing::{debug, warn};

use crate::autosave::SaveTrigger;
use crate::clock::Clock;
use crate::config::EditorConfig;
use crate::doc::{Album, ElementId, Page};
use crate::error::DrawingError;
use crate::geom::Point;
use crate::gesture::PointerId;
use crate::model::{DocumentModel, Opened};
use crate::nav::{NextPage, PageNavigator, SwipeOutcome, SwipeTracker};
use crate::storage::StoragePort;
use crate::surface::{CanvasSurface, ElementLayout, PressTarget, SurfaceEvent};

/// Entry parameters read from the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub album_id: String,
    /// Launch photo capture immediately (only honored for a new album).
    pub quick_photo: bool,
}

impl Route {
    #[must_use]
    pub fn album(album_id: impl Into<String>) -> Self {
        Self { album_id: album_id.into(), quick_photo: false }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// The page editor.
pub struct EditorCore<S: StoragePort> {
    model: DocumentModel<S>,
    surface: CanvasSurface,
    nav: PageNavigator,
    swipe: SwipeTracker,
    capture_requested: bool,
}

impl<S: StoragePort> EditorCore<S> {
    /// Open the album named by `route`, synthesizing it when absent.
    pub fn open(storage: S, config: &EditorConfig, route: &Route, clock: Box<dyn Clock>) -> Self {
        let mut model = DocumentModel::new(storage, config, clock);
        let opened = model.open(&route.album_id);
        Self {
            model,
            surface: CanvasSurface::new(config),
            nav: PageNavigator::new(),
            swipe: SwipeTracker::new(config),
            capture_requested: route.quick_photo && opened == Opened::Synthesized,
        }
    }

    #[must_use]
    pub fn model(&self) -> &DocumentModel<S> {
        &self.model
    }

    #[must_use]
    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    #[must_use]
    pub fn navigator(&self) -> &PageNavigator {
        &self.nav
    }

    #[must_use]
    pub fn swipe(&self) -> &SwipeTracker {
        &self.swipe
    }

    #[must_use]
    pub fn album(&self) -> Option<&Album> {
        self.model.album()
    }

    /// One-shot: whether the host should open photo capture now.
    pub fn take_capture_request(&mut self) -> bool {
        std::mem::take(&mut self.capture_requested)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.nav.index()
    }

    #[must_use]
    pub fn current_page(&self) -> Option<&Page> {
        self.model.page(self.nav.index())
    }

    /// Page counter text for the current page.
    #[must_use]
    pub fn page_label(&self) -> String {
        self.nav.label(self.model.page_count())
    }

    /// Pixel layout of the current page.
    #[must_use]
    pub fn layout(&self) -> Vec<ElementLayout> {
        self.current_page().map(|page| self.surface.layout(page)).unwrap_or_default()
    }

    // ── Element operations on the current page ──────────────────

    pub fn add_photo(&mut self, src: &str) -> Option<ElementId> {
        self.model.add_photo(self.nav.index(), src)
    }

    pub fn add_sticker(&mut self, src: &str) -> Option<ElementId> {
        self.model.add_sticker(self.nav.index(), src)
    }

    pub fn add_text(&mut self, content: &str) -> Option<ElementId> {
        self.model.add_text(self.nav.index(), content)
    }

    /// Remove the most recently added element on the current page.
    pub fn undo_last(&mut self) -> bool {
        let index = self.nav.index();
        if self.model.undo_last(index).is_none() {
            return false;
        }
        self.forget_missing_selection();
        true
    }

    /// Delete the selected element. Ignored while editing.
    pub fn delete_selected(&mut self) -> bool {
        let mut events = Vec::new();
        let deleted = self.surface.delete_selected(&mut events);
        self.apply(events);
        deleted
    }

    /// Start editing the selected photo caption or text box.
    pub fn begin_edit(&mut self) -> bool {
        let index = self.nav.index();
        match self.model.page(index) {
            Some(page) => self.surface.begin_edit(page),
            None => false,
        }
    }

    pub fn edit_input(&mut self, text: &str) {
        self.surface.edit_input(text);
    }

    pub fn commit_edit(&mut self) -> bool {
        let mut events = Vec::new();
        let committed = self.surface.commit_edit(&mut events);
        self.apply(events);
        committed
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.surface.cancel_edit()
    }

    // ── Pages ───────────────────────────────────────────────────

    /// Append a page and move onto it.
    pub fn add_page(&mut self) -> bool {
        self.release_page();
        if self.model.add_page().is_none() {
            return false;
        }
        let last = self.model.page_count().saturating_sub(1);
        self.nav.go_to(last, self.model.page_count());
        true
    }

    /// Delete page `index` unless it is the only one. Deleting the current
    /// or an earlier page re-clamps the current index.
    pub fn delete_page(&mut self, index: usize) -> bool {
        let count = self.model.page_count();
        if count <= 1 || index >= count {
            debug!(index, count, "page delete ignored");
            return false;
        }
        if index <= self.nav.index() {
            self.release_page();
        }
        if !self.model.delete_page(index) {
            return false;
        }
        self.nav.clamp(self.model.page_count());
        true
    }

    pub fn delete_current_page(&mut self) -> bool {
        self.delete_page(self.nav.index())
    }

    pub fn rename_album(&mut self, name: &str) -> bool {
        self.model.rename_album(name)
    }

    pub fn go_prev(&mut self) -> bool {
        if self.nav.index() == 0 {
            return false;
        }
        self.release_page();
        self.nav.go_prev()
    }

    /// Advance one page, appending a new page when on the last one.
    pub fn go_next(&mut self) -> bool {
        self.release_page();
        match self.nav.go_next(self.model.page_count()) {
            NextPage::Moved(_) => true,
            NextPage::NeedsNewPage => {
                if self.model.add_page().is_none() {
                    return false;
                }
                let count = self.model.page_count();
                self.nav.go_to(count - 1, count)
            }
        }
    }

    /// Jump to a page from the page manager, closing it.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        if index >= self.model.page_count() {
            return false;
        }
        if index != self.nav.index() {
            self.release_page();
        }
        self.nav.go_to(index, self.model.page_count())
    }

    pub fn open_page_manager(&mut self) {
        self.nav.open_manager();
    }

    pub fn close_page_manager(&mut self) {
        self.nav.close_manager();
    }

    // ── Input ───────────────────────────────────────────────────

    /// The canvas container was measured.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        self.surface.resize(width, height, dpr);
    }

    pub fn pointer_down(&mut self, pointer: PointerId, at: Point) -> PressTarget {
        if self.swipe.is_tracking() {
            return PressTarget::Ignored;
        }
        let index = self.nav.index();
        let Some(page) = self.model.page(index) else {
            return PressTarget::Ignored;
        };
        let mut events = Vec::new();
        let target = self.surface.pointer_down(page, pointer, at, &mut events);
        self.apply(events);
        if target == PressTarget::Empty {
            self.swipe.begin(pointer, at);
        }
        target
    }

    /// Returns whether anything visible changed.
    pub fn pointer_move(&mut self, pointer: PointerId, at: Point) -> bool {
        if self.swipe.is_tracking() {
            let width = self.surface.viewport().size.width;
            return self.swipe.update(pointer, at, width, self.nav.index(), self.model.page_count()).is_some();
        }
        let mut events = Vec::new();
        let changed = self.surface.pointer_move(pointer, at, &mut events);
        self.apply(events);
        changed
    }

    pub fn pointer_up(&mut self, pointer: PointerId) {
        if self.swipe.is_tracking() {
            let width = self.surface.viewport().size.width;
            match self.swipe.end(pointer, width, self.nav.index(), self.model.page_count()) {
                SwipeOutcome::Prev => {
                    self.go_prev();
                }
                SwipeOutcome::Next => {
                    self.go_next();
                }
                SwipeOutcome::SnapBack | SwipeOutcome::None => {}
            }
            return;
        }
        self.surface.pointer_up(pointer);
    }

    /// Abort any session; nothing further is committed.
    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        self.swipe.cancel();
        self.surface.pointer_cancel(pointer);
    }

    /// Handle a key press. Returns whether the key was used.
    pub fn on_key_down(&mut self, key: &Key) -> bool {
        let editing = self.surface.is_editing();
        match key.0.as_str() {
            "ArrowLeft" if !editing => self.go_prev(),
            "ArrowRight" if !editing => self.go_next(),
            "Enter" if editing => self.commit_edit(),
            "Escape" => {
                if editing {
                    self.surface.cancel_edit()
                } else if self.surface.selected().is_some() {
                    self.release_page();
                    true
                } else if self.nav.is_manager_open() {
                    self.nav.close_manager();
                    true
                } else {
                    false
                }
            }
            "Delete" | "Backspace" if !editing => self.delete_selected(),
            _ => false,
        }
    }

    // ── Drawing ─────────────────────────────────────────────────

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.surface.is_drawing()
    }

    /// Enter or leave drawing mode. Leaving discards unfinished strokes.
    pub fn set_drawing_mode(&mut self, on: bool) {
        if on {
            self.release_page();
            self.swipe.cancel();
        }
        self.surface.set_drawing_mode(on);
    }

    pub fn clear_drawing(&mut self) {
        if let Some(overlay) = self.surface.drawing_mut() {
            overlay.clear();
        }
    }

    /// Turn the drawing into a photo on the current page and leave drawing
    /// mode. A blank overlay just leaves drawing mode.
    pub fn finish_drawing(&mut self) -> Option<ElementId> {
        match self.try_finish_drawing() {
            Ok(id) => {
                self.surface.set_drawing_mode(false);
                id
            }
            Err(DrawingError::NotDrawing) => {
                debug!("finish drawing outside drawing mode ignored");
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to finish drawing");
                None
            }
        }
    }

    fn try_finish_drawing(&mut self) -> Result<Option<ElementId>, DrawingError> {
        let overlay = self.surface.drawing_mut().ok_or(DrawingError::NotDrawing)?;
        if overlay.is_blank() {
            return Ok(None);
        }
        let image = overlay.finish()?;
        Ok(self.model.add_drawing(self.nav.index(), &image))
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Explicit save. Returns whether the write succeeded.
    pub fn save(&mut self) -> bool {
        self.model.save(SaveTrigger::Manual)
    }

    /// Drive autosave. Returns whether an autosave was attempted.
    pub fn tick(&mut self) -> bool {
        self.model.tick()
    }

    /// Next timestamp (ms) at which [`EditorCore::tick`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.model.autosave().next_deadline()
    }

    #[must_use]
    pub fn is_saved(&self) -> bool {
        !self.model.is_dirty()
    }

    #[must_use]
    pub fn is_saving_indicator_visible(&self) -> bool {
        self.model.is_saving_indicator_visible()
    }

    /// Back to the album list: commit any open edit, drop drawing mode and
    /// flush unsaved changes. Returns whether everything is persisted.
    pub fn leave(&mut self) -> bool {
        self.release_page();
        self.swipe.cancel();
        self.surface.set_drawing_mode(false);
        self.model.flush()
    }

    // ── Internals ───────────────────────────────────────────────

    /// Commit an open edit and clear the selection before the shown page
    /// changes.
    fn release_page(&mut self) {
        let mut events = Vec::new();
        self.surface.deselect(&mut events);
        self.apply(events);
        self.surface.show_page();
    }

    fn apply(&mut self, events: Vec<SurfaceEvent>) {
        if events.is_empty() {
            return;
        }
        let index = self.nav.index();
        for event in events {
            match event {
                SurfaceEvent::Update { kind, id, patch } => {
                    self.model.update_element(index, kind, &id, &patch);
                }
                SurfaceEvent::Delete { kind, id } => {
                    self.model.delete_element(index, kind, &id);
                }
            }
        }
        self.forget_missing_selection();
    }

    fn forget_missing_selection(&mut self) {
        if let Some(page) = self.model.page(self.nav.index()) {
            self.surface.forget_missing(page);
        }
    }
}
