//! Per-element gesture primitive: drag, corner resize, delete and text edit.
//!
//! A `Gesture` knows one element id and nothing about what kind of element it
//! is. It turns pointer sequences into sparse [`ElementPatch`] updates and
//! hands them to an [`ElementSink`]; it never touches the document itself.
//!
//! STATE MACHINE
//! =============
//! `Idle -> Dragging -> Idle`, `Idle -> Resizing(corner) -> Idle` and
//! `Idle -> Editing -> Idle`. At most one session is active at a time, so a
//! handle press never also starts a drag and a delete press starts nothing.
//! [`Gesture::end`] returns to `Idle` unconditionally and is the single exit
//! for both pointer-up and pointer-cancel.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::doc::{ElementId, ElementPatch, Frame, truncate_chars};
use crate::geom::{Point, Size, Viewport};

/// Host pointer identifier (the browser's `pointerId`).
pub type PointerId = i32;

/// Resize handle position on an element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    #[must_use]
    pub fn is_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight)
    }

    #[must_use]
    pub fn is_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }
}

/// Which part of an element a press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(Corner),
    DeleteButton,
}

/// Receiver for the two mutations a gesture can request.
pub trait ElementSink {
    fn update(&mut self, id: &ElementId, patch: ElementPatch);
    fn delete(&mut self, id: &ElementId);
}

/// Active session of a [`Gesture`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Moving the element by its body.
    Dragging {
        pointer: PointerId,
        /// Pointer position at press time.
        start_pointer: Point,
        /// Element center in pixels at press time.
        start_center: Point,
        /// Element size, needed for center clamping.
        size: Size,
    },
    /// Growing or shrinking the element from one corner around a fixed center.
    Resizing {
        pointer: PointerId,
        corner: Corner,
        start_pointer: Point,
        start_size: Size,
    },
    /// Editing the element's caption or text content. Drag is suspended.
    Editing {
        draft: String,
        max_chars: Option<usize>,
    },
}

/// Gesture handling for one element.
#[derive(Debug, Clone)]
pub struct Gesture {
    id: ElementId,
    state: GestureState,
    min_size: f64,
}

impl Gesture {
    #[must_use]
    pub fn new(id: ElementId, min_size: f64) -> Self {
        Self { id, state: GestureState::Idle, min_size }
    }

    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Whether a pointer session (drag or resize) is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. } | GestureState::Resizing { .. })
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self.state, GestureState::Editing { .. })
    }

    /// Current edit draft, if editing.
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            GestureState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Handle a press on `part` of the element. Returns whether the press was
    /// consumed.
    ///
    /// Ignored while editing or while another session is active.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        part: HitPart,
        at: Point,
        frame: &Frame,
        viewport: &Viewport,
        sink: &mut impl ElementSink,
    ) -> bool {
        if !matches!(self.state, GestureState::Idle) {
            return false;
        }
        match part {
            HitPart::DeleteButton => {
                sink.delete(&self.id);
            }
            HitPart::ResizeHandle(corner) => {
                self.state = GestureState::Resizing { pointer, corner, start_pointer: at, start_size: frame.size() };
            }
            HitPart::Body => {
                self.state = GestureState::Dragging {
                    pointer,
                    start_pointer: at,
                    start_center: viewport.pct_to_px(frame.x, frame.y),
                    size: frame.size(),
                };
            }
        }
        true
    }

    /// Handle pointer movement. Emits one update per move of the session's
    /// pointer; returns whether an update was emitted.
    pub fn pointer_move(&mut self, pointer: PointerId, at: Point, viewport: &Viewport, sink: &mut impl ElementSink) -> bool {
        match &self.state {
            GestureState::Dragging { pointer: p, start_pointer, start_center, size } if *p == pointer => {
                if viewport.size.is_empty() {
                    return false;
                }
                let delta = at.delta_from(*start_pointer);
                let moved = Point::new(start_center.x + delta.x, start_center.y + delta.y);
                let (x, y) = viewport.px_to_pct(viewport.clamp_center(moved, *size));
                sink.update(&self.id, ElementPatch::position(x, y));
                true
            }
            GestureState::Resizing { pointer: p, corner, start_pointer, start_size } if *p == pointer => {
                let delta = at.delta_from(*start_pointer);
                let dw = if corner.is_right() { delta.x } else { -delta.x };
                let dh = if corner.is_bottom() { delta.y } else { -delta.y };
                let width = (start_size.width + dw).max(self.min_size);
                let height = (start_size.height + dh).max(self.min_size);
                sink.update(&self.id, ElementPatch::size(width, height));
                true
            }
            _ => false,
        }
    }

    /// Pointer released. Ends the session if `pointer` owns it.
    pub fn pointer_up(&mut self, pointer: PointerId) -> Option<PointerId> {
        self.end_for(pointer)
    }

    /// Pointer sequence aborted. Ends the session without emitting anything
    /// beyond the updates already sent.
    pub fn pointer_cancel(&mut self, pointer: PointerId) -> Option<PointerId> {
        self.end_for(pointer)
    }

    /// End any pointer session unconditionally, returning the released
    /// pointer. Editing is left alone.
    pub fn end(&mut self) -> Option<PointerId> {
        let released = match self.state {
            GestureState::Dragging { pointer, .. } | GestureState::Resizing { pointer, .. } => Some(pointer),
            GestureState::Idle | GestureState::Editing { .. } => return None,
        };
        self.state = GestureState::Idle;
        released
    }

    /// Enter edit mode seeded with the element's current text. Any pointer
    /// session is ended first.
    pub fn begin_edit(&mut self, current: &str, max_chars: Option<usize>) {
        self.end();
        let draft = match max_chars {
            Some(max) => truncate_chars(current, max),
            None => current.to_owned(),
        };
        self.state = GestureState::Editing { draft, max_chars };
    }

    /// Replace the draft with `text`, truncated to the edit's limit.
    pub fn edit_input(&mut self, text: &str) {
        if let GestureState::Editing { draft, max_chars } = &mut self.state {
            *draft = match max_chars {
                Some(max) => truncate_chars(text, *max),
                None => text.to_owned(),
            };
        }
    }

    /// Emit the draft as a text update and leave edit mode. Returns false if
    /// not editing.
    pub fn commit_edit(&mut self, sink: &mut impl ElementSink) -> bool {
        match std::mem::take(&mut self.state) {
            GestureState::Editing { draft, .. } => {
                sink.update(&self.id, ElementPatch::text(draft));
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Leave edit mode without emitting anything.
    pub fn cancel_edit(&mut self) -> bool {
        if self.is_editing() {
            self.state = GestureState::Idle;
            true
        } else {
            false
        }
    }

    fn end_for(&mut self, pointer: PointerId) -> Option<PointerId> {
        match self.state {
            GestureState::Dragging { pointer: p, .. } | GestureState::Resizing { pointer: p, .. } if p == pointer => {
                self.end()
            }
            _ => None,
        }
    }
}
