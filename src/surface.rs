//! Canvas surface: one page of elements over a measured container.
//!
//! The surface owns interaction state only. It lays elements out in pixel
//! space, hit-tests presses, keeps the single selection and its [`Gesture`],
//! and hosts the optional drawing overlay. Mutations leave through a
//! [`SurfaceSink`], tagged with the collection they belong to; the document
//! itself is only ever read here.
//!
//! Hit testing checks the selected element's resize handles and delete button
//! first, then element bodies from the top of the z-order down.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use crate::config::EditorConfig;
use crate::consts::{CAPTION_MAX_CHARS, DELETE_BUTTON_OFFSET_PX, DELETE_BUTTON_RADIUS_PX, HANDLE_RADIUS_PX};
use crate::doc::{ElementId, ElementKind, ElementPatch, ElementRef, Page};
use crate::drawing::DrawingOverlay;
use crate::geom::{Point, Rect, Viewport};
use crate::gesture::{Corner, ElementSink, Gesture, HitPart, PointerId};

/// Receiver for kind-tagged element mutations.
pub trait SurfaceSink {
    fn update_element(&mut self, kind: ElementKind, id: &ElementId, patch: ElementPatch);
    fn delete_element(&mut self, kind: ElementKind, id: &ElementId);
}

/// A recorded mutation request, for callers that apply them later.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Update { kind: ElementKind, id: ElementId, patch: ElementPatch },
    Delete { kind: ElementKind, id: ElementId },
}

impl SurfaceSink for Vec<SurfaceEvent> {
    fn update_element(&mut self, kind: ElementKind, id: &ElementId, patch: ElementPatch) {
        self.push(SurfaceEvent::Update { kind, id: id.clone(), patch });
    }

    fn delete_element(&mut self, kind: ElementKind, id: &ElementId) {
        self.push(SurfaceEvent::Delete { kind, id: id.clone() });
    }
}

/// Adds the collection discriminator to a gesture's untagged requests.
struct Tagged<'a, K: SurfaceSink> {
    kind: ElementKind,
    sink: &'a mut K,
}

impl<K: SurfaceSink> ElementSink for Tagged<'_, K> {
    fn update(&mut self, id: &ElementId, patch: ElementPatch) {
        self.sink.update_element(self.kind, id, patch);
    }

    fn delete(&mut self, id: &ElementId) {
        self.sink.delete_element(self.kind, id);
    }
}

/// Where an element sits on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementLayout {
    pub kind: ElementKind,
    pub id: ElementId,
    pub rect: Rect,
    pub selected: bool,
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub kind: ElementKind,
    pub id: ElementId,
    pub part: HitPart,
}

/// What a pointer press was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    /// An element consumed the press.
    Element,
    /// The drawing overlay started a stroke.
    Drawing,
    /// The press landed on empty canvas.
    Empty,
    /// The press was swallowed (e.g. a second pointer during a session).
    Ignored,
}

struct Selection {
    kind: ElementKind,
    gesture: Gesture,
}

/// Interaction state for the page currently shown.
pub struct CanvasSurface {
    viewport: Viewport,
    min_size: f64,
    selection: Option<Selection>,
    drawing: Option<DrawingOverlay>,
}

impl CanvasSurface {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self { viewport: Viewport::default(), min_size: config.min_element_size, selection: None, drawing: None }
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Re-measure the container. Element positions are percentages, so the
    /// layout follows automatically; the drawing raster is resized.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        self.viewport = Viewport::new(width, height, dpr);
        if let Some(overlay) = self.drawing.as_mut() {
            overlay.resize(&self.viewport);
        }
    }

    /// A different page is about to be shown. Drops selection and any
    /// session without emitting.
    pub fn show_page(&mut self) {
        self.selection = None;
        if let Some(overlay) = self.drawing.as_mut() {
            overlay.clear();
        }
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.drawing.is_some()
    }

    /// Enter or leave drawing mode. Entering ends element interaction and
    /// allocates a fresh overlay; leaving discards it.
    pub fn set_drawing_mode(&mut self, on: bool) {
        if on == self.is_drawing() {
            return;
        }
        if on {
            self.selection = None;
            self.drawing = Some(DrawingOverlay::new(&self.viewport));
        } else {
            self.drawing = None;
        }
    }

    #[must_use]
    pub fn drawing(&self) -> Option<&DrawingOverlay> {
        self.drawing.as_ref()
    }

    pub fn drawing_mut(&mut self) -> Option<&mut DrawingOverlay> {
        self.drawing.as_mut()
    }

    /// Currently selected element.
    #[must_use]
    pub fn selected(&self) -> Option<(ElementKind, &ElementId)> {
        self.selection.as_ref().map(|s| (s.kind, s.gesture.id()))
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.selection.as_ref().is_some_and(|s| s.gesture.is_editing())
    }

    /// Current edit draft, if editing.
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        self.selection.as_ref().and_then(|s| s.gesture.draft())
    }

    /// Whether a drag, resize or stroke session is in progress.
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.selection.as_ref().is_some_and(|s| s.gesture.is_active())
            || self.drawing.as_ref().is_some_and(DrawingOverlay::is_stroking)
    }

    /// Pixel rectangles of every element in draw order.
    #[must_use]
    pub fn layout(&self, page: &Page) -> Vec<ElementLayout> {
        let selected = self.selected();
        page.elements()
            .map(|el| ElementLayout {
                kind: el.kind(),
                id: el.id().clone(),
                rect: self.rect_of(el),
                selected: selected.is_some_and(|(kind, id)| kind == el.kind() && id == el.id()),
            })
            .collect()
    }

    /// Find what lies under `at`.
    #[must_use]
    pub fn hit_test(&self, page: &Page, at: Point) -> Option<Hit> {
        if let Some((kind, id)) = self.selected()
            && let Some(el) = page.get(kind, id)
        {
            let rect = self.rect_of(el);
            if let Some(part) = control_at(&rect, at) {
                return Some(Hit { kind, id: id.clone(), part });
            }
        }

        page.elements().rev().find(|el| self.rect_of(*el).contains(at)).map(|el| Hit {
            kind: el.kind(),
            id: el.id().clone(),
            part: HitPart::Body,
        })
    }

    /// Route a press. Presses on empty canvas deselect, committing any open
    /// edit first.
    pub fn pointer_down(&mut self, page: &Page, pointer: PointerId, at: Point, sink: &mut impl SurfaceSink) -> PressTarget {
        if let Some(overlay) = self.drawing.as_mut() {
            return if overlay.pointer_down(pointer, at) { PressTarget::Drawing } else { PressTarget::Ignored };
        }
        if self.selection.as_ref().is_some_and(|s| s.gesture.is_active()) {
            return PressTarget::Ignored;
        }

        let Some(hit) = self.hit_test(page, at) else {
            self.deselect(sink);
            return PressTarget::Empty;
        };

        if self.is_editing() {
            if self.selected().is_some_and(|(kind, id)| kind == hit.kind && *id == hit.id) {
                return PressTarget::Element;
            }
            self.commit_edit(sink);
        }

        let Some(frame) = page.get(hit.kind, &hit.id).map(|el| *el.frame()) else {
            return PressTarget::Ignored;
        };

        let same = self.selected().is_some_and(|(kind, id)| kind == hit.kind && *id == hit.id);
        if !same {
            self.selection = Some(Selection { kind: hit.kind, gesture: Gesture::new(hit.id.clone(), self.min_size) });
        }

        let viewport = self.viewport;
        if let Some(selection) = self.selection.as_mut() {
            let mut tagged = Tagged { kind: selection.kind, sink };
            selection.gesture.pointer_down(pointer, hit.part, at, &frame, &viewport, &mut tagged);
        }
        if hit.part == HitPart::DeleteButton {
            self.selection = None;
        }
        PressTarget::Element
    }

    /// Route a move to the active session. Returns whether anything changed.
    pub fn pointer_move(&mut self, pointer: PointerId, at: Point, sink: &mut impl SurfaceSink) -> bool {
        if let Some(overlay) = self.drawing.as_mut() {
            return overlay.pointer_move(pointer, at);
        }
        let viewport = self.viewport;
        match self.selection.as_mut() {
            Some(selection) => {
                let mut tagged = Tagged { kind: selection.kind, sink };
                selection.gesture.pointer_move(pointer, at, &viewport, &mut tagged)
            }
            None => false,
        }
    }

    /// End the session owned by `pointer`, returning the released pointer.
    pub fn pointer_up(&mut self, pointer: PointerId) -> Option<PointerId> {
        if let Some(overlay) = self.drawing.as_mut() {
            return overlay.pointer_up(pointer);
        }
        self.selection.as_mut().and_then(|s| s.gesture.pointer_up(pointer))
    }

    /// Abort the session owned by `pointer`. Nothing further is emitted.
    pub fn pointer_cancel(&mut self, pointer: PointerId) -> Option<PointerId> {
        if let Some(overlay) = self.drawing.as_mut() {
            return overlay.pointer_up(pointer);
        }
        self.selection.as_mut().and_then(|s| s.gesture.pointer_cancel(pointer))
    }

    /// Request deletion of the selected element. Ignored while editing.
    pub fn delete_selected(&mut self, sink: &mut impl SurfaceSink) -> bool {
        if self.is_editing() {
            return false;
        }
        let Some(selection) = self.selection.take() else {
            return false;
        };
        sink.delete_element(selection.kind, selection.gesture.id());
        true
    }

    /// Start editing the selected element's caption or text. Stickers have no
    /// editable text.
    pub fn begin_edit(&mut self, page: &Page) -> bool {
        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        let Some(el) = page.get(selection.kind, selection.gesture.id()) else {
            return false;
        };
        let Some(current) = el.editable_text() else {
            return false;
        };
        let limit = match el {
            ElementRef::Photo(_) => Some(CAPTION_MAX_CHARS),
            ElementRef::Sticker(_) | ElementRef::Text(_) => None,
        };
        selection.gesture.begin_edit(current, limit);
        true
    }

    /// Replace the edit draft.
    pub fn edit_input(&mut self, text: &str) {
        if let Some(selection) = self.selection.as_mut() {
            selection.gesture.edit_input(text);
        }
    }

    /// Emit the edit draft and leave edit mode; the element stays selected.
    pub fn commit_edit(&mut self, sink: &mut impl SurfaceSink) -> bool {
        match self.selection.as_mut() {
            Some(selection) => {
                let mut tagged = Tagged { kind: selection.kind, sink };
                selection.gesture.commit_edit(&mut tagged)
            }
            None => false,
        }
    }

    /// Leave edit mode without emitting.
    pub fn cancel_edit(&mut self) -> bool {
        self.selection.as_mut().is_some_and(|s| s.gesture.cancel_edit())
    }

    /// Clear the selection, committing an open edit first.
    pub fn deselect(&mut self, sink: &mut impl SurfaceSink) {
        self.commit_edit(sink);
        self.selection = None;
    }

    /// Drop the selection if its element no longer exists on `page`.
    pub fn forget_missing(&mut self, page: &Page) {
        let missing = self.selected().is_some_and(|(kind, id)| page.get(kind, id).is_none());
        if missing {
            self.selection = None;
        }
    }

    fn rect_of(&self, el: ElementRef<'_>) -> Rect {
        let frame = el.frame();
        Rect::from_center(self.viewport.pct_to_px(frame.x, frame.y), frame.size())
    }
}

fn control_at(rect: &Rect, at: Point) -> Option<HitPart> {
    let delete = Point::new(rect.center().x, rect.top - DELETE_BUTTON_OFFSET_PX);
    if delete.distance(at) <= DELETE_BUTTON_RADIUS_PX {
        return Some(HitPart::DeleteButton);
    }
    Corner::ALL
        .into_iter()
        .find(|corner| corner_point(rect, *corner).distance(at) <= HANDLE_RADIUS_PX)
        .map(HitPart::ResizeHandle)
}

fn corner_point(rect: &Rect, corner: Corner) -> Point {
    let x = if corner.is_right() { rect.right() } else { rect.left };
    let y = if corner.is_bottom() { rect.bottom() } else { rect.top };
    Point::new(x, y)
}
